use crate::pointer::PointerRay;
use glam::Vec3;

/// A high-level action produced by the windowing layer each frame.
///
/// The map consumes actions, never raw input events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapAction {
    /// The pointer moved; pick the cell under this ray.
    Hover(PointerRay),
    /// The pointer left the map view.
    ClearHover,
    /// The streaming viewpoint moved to a new world position.
    MoveViewpoint(Vec3),
    /// The render target was resized.
    Resize { width: u32, height: u32 },
    /// No-op (used for input mapping that hasn't been bound yet).
    Noop,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hover_carries_ray() {
        let a = MapAction::Hover(PointerRay::from_above(1.0, 2.0));
        assert!(matches!(a, MapAction::Hover(r) if r.origin.x == 1.0 && r.origin.z == 2.0));
    }

    #[test]
    fn move_viewpoint() {
        let a = MapAction::MoveViewpoint(Vec3::new(0.0, 0.0, 5.0));
        assert!(matches!(a, MapAction::MoveViewpoint(_)));
    }

    #[test]
    fn resize_and_noop() {
        assert_eq!(
            MapAction::Resize {
                width: 800,
                height: 600
            },
            MapAction::Resize {
                width: 800,
                height: 600
            }
        );
        assert!(matches!(MapAction::Noop, MapAction::Noop));
    }
}
