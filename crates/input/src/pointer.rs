use glam::Vec3;
use hexmap_grid::{CubeCoord, HexLayout};

/// World-space ray under the pointer for one frame.
///
/// The windowing layer builds it from the mouse position and camera; this
/// crate only consumes it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerRay {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl PointerRay {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Straight down onto the ground plane at `(x, z)`.
    pub fn from_above(x: f32, z: f32) -> Self {
        Self::new(Vec3::new(x, 1.0, z), Vec3::NEG_Y)
    }

    /// Cell under the pointer, if the ray hits the ground plane inside the grid.
    pub fn pick(&self, layout: &HexLayout) -> Option<CubeCoord> {
        layout.ray_plane_intersect(self.origin, self.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_from_above_picks_cell_under_it() {
        let layout = HexLayout::new(1.0, 10);
        let cube = CubeCoord::from_xz(2, 3);
        let p = layout.cube_to_world(cube);
        assert_eq!(PointerRay::from_above(p.x, p.z).pick(&layout), Some(cube));
    }

    #[test]
    fn slanted_ray_hits_plane() {
        let layout = HexLayout::new(1.0, 10);
        let target = layout.cube_to_world(CubeCoord::from_xz(4, 4));
        let origin = target + Vec3::new(-3.0, 6.0, 2.0);
        let ray = PointerRay::new(origin, target - origin);
        assert_eq!(ray.pick(&layout), Some(CubeCoord::from_xz(4, 4)));
    }

    #[test]
    fn misses_yield_none() {
        let layout = HexLayout::new(1.0, 10);
        // parallel to the plane
        assert_eq!(PointerRay::new(Vec3::Y, Vec3::X).pick(&layout), None);
        // pointing away from the plane
        assert_eq!(PointerRay::new(Vec3::Y, Vec3::Y).pick(&layout), None);
        // off the grid
        assert_eq!(PointerRay::from_above(1000.0, 0.0).pick(&layout), None);
    }
}
