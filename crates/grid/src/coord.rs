use serde::{Deserialize, Serialize};
use std::ops::Add;

/// Cube coordinate of a hex cell. Always satisfies `x + y + z == 0`.
///
/// Identifies a cell uniquely on the infinite plane; whether it lies inside a
/// finite grid is answered by [`HexLayout::is_in_range`](crate::HexLayout::is_in_range).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CubeCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Row-major offset coordinate used for instance indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OffsetCoord {
    pub col: i32,
    pub row: i32,
}

impl OffsetCoord {
    pub fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    pub fn to_cube(self) -> CubeCoord {
        CubeCoord::from_xz(self.col - self.row.div_euclid(2), self.row)
    }
}

/// Unit steps to the six neighbours, in the order consumers index overlays by:
/// right, left, north (row + 1), south (row - 1), north-east, south-west.
pub const NEIGHBOR_DIRECTIONS: [CubeCoord; 6] = [
    CubeCoord { x: 1, y: -1, z: 0 },
    CubeCoord { x: -1, y: 1, z: 0 },
    CubeCoord { x: 0, y: -1, z: 1 },
    CubeCoord { x: 0, y: 1, z: -1 },
    CubeCoord { x: 1, y: 0, z: -1 },
    CubeCoord { x: -1, y: 0, z: 1 },
];

impl CubeCoord {
    pub const ORIGIN: CubeCoord = CubeCoord { x: 0, y: 0, z: 0 };

    /// Panics if the components do not sum to zero.
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        assert!(x + y + z == 0, "cube coordinate ({x}, {y}, {z}) does not sum to zero");
        Self { x, y, z }
    }

    /// Build from the two independent axes; `y` is derived.
    pub fn from_xz(x: i32, z: i32) -> Self {
        Self { x, y: -x - z, z }
    }

    /// Offset coordinate: `col = x + floor(z / 2)`, `row = z`.
    pub fn to_offset(self) -> OffsetCoord {
        OffsetCoord {
            col: self.x + self.z.div_euclid(2),
            row: self.z,
        }
    }

    /// The six neighbours in [`NEIGHBOR_DIRECTIONS`] order.
    pub fn neighbors(self) -> [CubeCoord; 6] {
        NEIGHBOR_DIRECTIONS.map(|d| self + d)
    }

    /// Hex distance (number of steps) between two cells.
    pub fn distance(self, other: CubeCoord) -> u32 {
        let d = [
            (self.x - other.x).unsigned_abs(),
            (self.y - other.y).unsigned_abs(),
            (self.z - other.z).unsigned_abs(),
        ];
        d[0].max(d[1]).max(d[2])
    }

    /// Round a fractional cube position to the containing cell.
    ///
    /// Each axis is rounded independently. If the rounded triple does not sum
    /// to zero, the axis with the largest rounding delta is recomputed from
    /// the other two. Deltas are compared in the order x, y, z: x wins ties,
    /// z replaces y only when strictly larger.
    pub fn round(fx: f32, fy: f32, fz: f32) -> Self {
        let mut rx = fx.round();
        let mut ry = fy.round();
        let mut rz = fz.round();

        if rx + ry + rz != 0.0 {
            let dx = (fx - rx).abs();
            let dy = (fy - ry).abs();
            let dz = (fz - rz).abs();

            if dx >= dy && dx >= dz {
                rx = -ry - rz;
            } else if dz > dy {
                rz = -rx - ry;
            } else {
                ry = -rx - rz;
            }
        }

        Self {
            x: rx as i32,
            y: ry as i32,
            z: rz as i32,
        }
    }
}

impl Add for CubeCoord {
    type Output = CubeCoord;

    fn add(self, rhs: CubeCoord) -> CubeCoord {
        CubeCoord {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}
