use crate::coord::CubeCoord;
use crate::layout::HexLayout;
use glam::Vec3;

/// Number of overlay slots: the picked cell plus its six neighbours.
pub const OVERLAY_SLOTS: usize = 7;

/// One overlay marker: the cell it marks and, when inside the grid, where to draw it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayPlacement {
    pub cube: CubeCoord,
    pub position: Option<Vec3>,
}

/// Overlay markers around a picked cell.
///
/// Slot 0 is the picked cell; slots 1..=6 follow the neighbour order of
/// [`CubeCoord::neighbors`] (right, left, north, south, north-east, south-west).
/// Neighbours outside the grid keep their slot with `position: None` so slot
/// indices keep their direction meaning.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverOverlay {
    slots: [OverlayPlacement; OVERLAY_SLOTS],
}

impl HoverOverlay {
    pub fn around(layout: &HexLayout, picked: CubeCoord) -> Self {
        let place = |cube: CubeCoord| OverlayPlacement {
            cube,
            position: layout.is_in_range(cube).then(|| layout.cube_to_world(cube)),
        };
        let n = picked.neighbors();
        Self {
            slots: [
                place(picked),
                place(n[0]),
                place(n[1]),
                place(n[2]),
                place(n[3]),
                place(n[4]),
                place(n[5]),
            ],
        }
    }

    pub fn slots(&self) -> &[OverlayPlacement; OVERLAY_SLOTS] {
        &self.slots
    }

    /// Placements that are inside the grid, with their slot index.
    pub fn visible(&self) -> impl Iterator<Item = (usize, Vec3)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.position.map(|p| (i, p)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::OffsetCoord;

    #[test]
    fn interior_cell_has_all_slots() {
        let layout = HexLayout::new(1.0, 8);
        let picked = OffsetCoord::new(4, 4).to_cube();
        let overlay = HoverOverlay::around(&layout, picked);
        assert_eq!(overlay.visible().count(), 7);
        assert_eq!(overlay.slots()[0].cube, picked);
        assert_eq!(overlay.slots()[1].cube, picked.neighbors()[0]);
        assert_eq!(overlay.slots()[6].cube, picked.neighbors()[5]);
    }

    #[test]
    fn corner_cell_hides_outside_neighbors_but_keeps_slots() {
        let layout = HexLayout::new(1.0, 8);
        let picked = OffsetCoord::new(0, 0).to_cube();
        let overlay = HoverOverlay::around(&layout, picked);

        // left and south are outside the grid
        assert!(overlay.slots()[2].position.is_none());
        assert!(overlay.slots()[4].position.is_none());
        // right and north are inside
        assert!(overlay.slots()[1].position.is_some());
        assert!(overlay.slots()[3].position.is_some());

        let indices: Vec<usize> = overlay.visible().map(|(i, _)| i).collect();
        assert!(indices.contains(&0));
        assert!(!indices.contains(&2));
    }
}
