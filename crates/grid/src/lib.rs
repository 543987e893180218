//! Hex grid: coordinate engine and per-cell grid model.
//!
//! Three coordinate spaces are involved:
//! - **offset** `(col, row)`: row-major addressing for instance buffers,
//! - **cube** `(x, y, z)` with `x + y + z == 0`: neighbour arithmetic,
//! - **world**: positions on the `y = 0` plane.
//!
//! # Invariants
//! - Every `CubeCoord` returned by a conversion sums to zero.
//! - `world_to_cube(cube_to_world(c)) == Some(c)` for every in-range cell.
//! - Geometric misses (outside the grid, ray parallel to the plane) are `None`,
//!   never errors.

pub mod coord;
pub mod layout;
pub mod model;
pub mod overlay;

pub use coord::{CubeCoord, NEIGHBOR_DIRECTIONS, OffsetCoord};
pub use layout::{HexLayout, INNER_RADIUS_RATIO};
pub use model::{CellColoring, GridModel};
pub use overlay::{HoverOverlay, OVERLAY_SLOTS, OverlayPlacement};

pub fn crate_info() -> &'static str {
    "hexmap-grid v0.1.0"
}
