use crate::coord::{CubeCoord, OffsetCoord};
use glam::Vec3;

/// `sqrt(3) / 2`: ratio of inner (center to edge) to outer (center to corner) radius.
pub const INNER_RADIUS_RATIO: f32 = 0.866_025_4;

/// Geometry of a finite `N × N` pointy-top hex grid lying on the `y = 0` plane,
/// centered on the world origin.
///
/// All conversions are pure functions of the outer radius and the grid size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexLayout {
    outer_radius: f32,
    inner_radius: f32,
    grid_size: u32,
    anchor: Vec3,
}

impl HexLayout {
    /// Create a layout. Panics on a non-positive radius or an empty grid.
    pub fn new(outer_radius: f32, grid_size: u32) -> Self {
        assert!(
            outer_radius.is_finite() && outer_radius > 0.0,
            "outer_radius must be positive"
        );
        assert!(grid_size > 0, "grid_size must be at least 1");
        let inner_radius = outer_radius * INNER_RADIUS_RATIO;
        let world_size = Self::compute_world_size(outer_radius, inner_radius, grid_size);
        Self {
            outer_radius,
            inner_radius,
            grid_size,
            anchor: world_size * -0.5,
        }
    }

    fn compute_world_size(outer_radius: f32, inner_radius: f32, grid_size: u32) -> Vec3 {
        let n = grid_size as f32;
        Vec3::new(n * inner_radius * 2.0, 0.0, n * outer_radius * 1.5)
    }

    pub fn outer_radius(&self) -> f32 {
        self.outer_radius
    }

    pub fn inner_radius(&self) -> f32 {
        self.inner_radius
    }

    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    /// Number of cells, `N²`.
    pub fn cell_count(&self) -> usize {
        self.grid_size as usize * self.grid_size as usize
    }

    /// World-space extent of the grid (`y` is always 0).
    pub fn world_size(&self) -> Vec3 {
        Self::compute_world_size(self.outer_radius, self.inner_radius, self.grid_size)
    }

    /// Top-left world anchor, `-0.5 * world_size`.
    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }

    /// World position of the center of cell `(col, row)`. Odd rows shift half a cell right.
    pub fn offset_to_world(&self, offset: OffsetCoord) -> Vec3 {
        let col = offset.col as f32;
        let row = offset.row as f32;
        let shift = row * 0.5 - offset.row.div_euclid(2) as f32;
        Vec3::new(
            self.anchor.x + (col + shift) * self.inner_radius * 2.0,
            0.0,
            self.anchor.z + row * self.outer_radius * 1.5,
        )
    }

    pub fn cube_to_offset(&self, cube: CubeCoord) -> OffsetCoord {
        cube.to_offset()
    }

    pub fn offset_to_cube(&self, offset: OffsetCoord) -> CubeCoord {
        offset.to_cube()
    }

    pub fn cube_to_world(&self, cube: CubeCoord) -> Vec3 {
        self.offset_to_world(cube.to_offset())
    }

    /// Whether the cell lies in `[0, N) × [0, N)` offset space.
    pub fn is_in_range(&self, cube: CubeCoord) -> bool {
        let o = cube.to_offset();
        let n = self.grid_size as i32;
        (0..n).contains(&o.col) && (0..n).contains(&o.row)
    }

    /// Instance index `row * N + col`, or `None` outside the grid.
    pub fn cube_to_index(&self, cube: CubeCoord) -> Option<usize> {
        if !self.is_in_range(cube) {
            return None;
        }
        let o = cube.to_offset();
        Some(o.row as usize * self.grid_size as usize + o.col as usize)
    }

    /// Cell containing a world position, or `None` if it falls outside the grid.
    ///
    /// The `y` component is ignored.
    pub fn world_to_cube(&self, position: Vec3) -> Option<CubeCoord> {
        let local = position - self.anchor;
        let across = local.x / (self.inner_radius * 2.0);
        let down = local.z / (self.outer_radius * 3.0);

        let fx = across - down;
        let fy = -across - down;
        let cube = CubeCoord::round(fx, fy, -fx - fy);

        self.is_in_range(cube).then_some(cube)
    }

    /// The six neighbours of `cube`, in fixed direction order. May lie outside the grid.
    pub fn neighbors(&self, cube: CubeCoord) -> [CubeCoord; 6] {
        cube.neighbors()
    }

    /// Intersect a ray with the `y = 0` plane and return the cell hit.
    ///
    /// `None` when the ray is parallel to the plane, points away from it, or
    /// hits outside the grid.
    pub fn ray_plane_intersect(&self, origin: Vec3, direction: Vec3) -> Option<CubeCoord> {
        if direction.y == 0.0 {
            return None;
        }
        let t = -origin.y / direction.y;
        if !t.is_finite() || t < 0.0 {
            return None;
        }
        self.world_to_cube(origin + direction * t)
    }

    /// Iterate every cell of the grid in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = OffsetCoord> + use<> {
        let n = self.grid_size as i32;
        (0..n).flat_map(move |row| (0..n).map(move |col| OffsetCoord::new(col, row)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> HexLayout {
        HexLayout::new(1.0, 10)
    }

    #[test]
    fn inner_radius_and_world_size() {
        let l = HexLayout::new(2.0, 4);
        assert!((l.inner_radius() - 2.0 * 0.866_025_4).abs() < 1e-6);
        let size = l.world_size();
        assert!((size.x - 4.0 * l.inner_radius() * 2.0).abs() < 1e-5);
        assert_eq!(size.y, 0.0);
        assert!((size.z - 4.0 * 2.0 * 1.5).abs() < 1e-5);
        assert_eq!(l.anchor(), size * -0.5);
    }

    #[test]
    fn offset_to_world_spacing() {
        let l = layout();
        let a = l.offset_to_world(OffsetCoord::new(0, 0));
        assert_eq!(a, Vec3::new(l.anchor().x, 0.0, l.anchor().z));

        let right = l.offset_to_world(OffsetCoord::new(1, 0));
        assert!((right.x - a.x - 2.0 * l.inner_radius()).abs() < 1e-5);

        // odd rows shift half a cell
        let odd = l.offset_to_world(OffsetCoord::new(0, 1));
        assert!((odd.x - a.x - l.inner_radius()).abs() < 1e-5);
        assert!((odd.z - a.z - 1.5).abs() < 1e-5);

        // even rows line up again
        let even = l.offset_to_world(OffsetCoord::new(0, 2));
        assert!((even.x - a.x).abs() < 1e-5);
    }

    #[test]
    fn world_to_cube_round_trip_whole_grid() {
        let l = layout();
        for o in l.cells() {
            let cube = o.to_cube();
            assert!(l.is_in_range(cube));
            let world = l.cube_to_world(cube);
            let back = l.world_to_cube(world).expect("cell center inside grid");
            assert_eq!(back, cube, "offset {o:?}");
            assert_eq!(back.x + back.y + back.z, 0);
        }
    }

    #[test]
    fn world_to_cube_inside_cell_not_just_center() {
        let l = layout();
        let cube = OffsetCoord::new(4, 5).to_cube();
        let center = l.cube_to_world(cube);
        let nudge = l.inner_radius() * 0.5;
        for d in [
            Vec3::new(nudge, 0.0, 0.0),
            Vec3::new(-nudge, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 0.4),
            Vec3::new(0.0, 0.0, -0.4),
        ] {
            assert_eq!(l.world_to_cube(center + d), Some(cube));
        }
    }

    #[test]
    fn world_to_cube_ignores_height() {
        let l = layout();
        let cube = OffsetCoord::new(2, 3).to_cube();
        let p = l.cube_to_world(cube) + Vec3::Y * 50.0;
        assert_eq!(l.world_to_cube(p), Some(cube));
    }

    #[test]
    fn world_to_cube_out_of_range() {
        let l = layout();
        assert_eq!(l.world_to_cube(Vec3::new(1000.0, 0.0, 0.0)), None);
        assert_eq!(l.world_to_cube(l.anchor() - Vec3::new(5.0, 0.0, 5.0)), None);
    }

    #[test]
    fn range_check_uses_offset_space() {
        let l = layout();
        assert!(l.is_in_range(OffsetCoord::new(0, 0).to_cube()));
        assert!(l.is_in_range(OffsetCoord::new(9, 9).to_cube()));
        assert!(!l.is_in_range(OffsetCoord::new(10, 0).to_cube()));
        assert!(!l.is_in_range(OffsetCoord::new(0, -1).to_cube()));
        assert!(!l.is_in_range(OffsetCoord::new(-1, 4).to_cube()));
    }

    #[test]
    fn offset_and_cube_convert_both_ways() {
        let l = layout();
        for offset in [OffsetCoord::new(0, 0), OffsetCoord::new(3, 1), OffsetCoord::new(2, 4)] {
            assert_eq!(l.cube_to_offset(l.offset_to_cube(offset)), offset);
        }
    }

    #[test]
    fn cube_to_index_is_row_major() {
        let l = layout();
        assert_eq!(l.cube_to_index(OffsetCoord::new(3, 2).to_cube()), Some(23));
        assert_eq!(l.cube_to_index(OffsetCoord::new(10, 2).to_cube()), None);
    }

    #[test]
    fn ray_hits_cell_below() {
        let l = layout();
        let cube = OffsetCoord::new(6, 7).to_cube();
        let target = l.cube_to_world(cube);
        let origin = target + Vec3::new(0.0, 8.0, 3.0);
        let dir = (target - origin).normalize();
        assert_eq!(l.ray_plane_intersect(origin, dir), Some(cube));
    }

    #[test]
    fn ray_parallel_to_plane_misses() {
        let l = layout();
        assert_eq!(
            l.ray_plane_intersect(Vec3::new(0.0, 5.0, 0.0), Vec3::new(1.0, 0.0, 0.0)),
            None
        );
    }

    #[test]
    fn ray_pointing_away_misses() {
        let l = layout();
        assert_eq!(
            l.ray_plane_intersect(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
            None
        );
    }

    #[test]
    fn ray_outside_grid_misses() {
        let l = layout();
        assert_eq!(
            l.ray_plane_intersect(Vec3::new(500.0, 5.0, 0.0), Vec3::new(0.0, -1.0, 0.0)),
            None
        );
    }

    #[test]
    fn cells_cover_grid_row_major() {
        let l = HexLayout::new(1.0, 3);
        let cells: Vec<OffsetCoord> = l.cells().collect();
        assert_eq!(cells.len(), 9);
        assert_eq!(cells[0], OffsetCoord::new(0, 0));
        assert_eq!(cells[1], OffsetCoord::new(1, 0));
        assert_eq!(cells[3], OffsetCoord::new(0, 1));
    }

    #[test]
    #[should_panic(expected = "grid_size")]
    fn empty_grid_panics() {
        HexLayout::new(1.0, 0);
    }
}
