use crate::action::MapAction;
use hexmap_common::Color;
use hexmap_grid::{CubeCoord, GridModel, HoverOverlay};

/// Highlights the cell under the pointer, restoring the previous cell's color.
///
/// Must be the only writer of highlight colors; it remembers the original
/// color of the cell it last touched.
#[derive(Debug, Clone)]
pub struct HoverHighlighter {
    highlight: Color,
    current: Option<Highlighted>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Highlighted {
    index: usize,
    cube: CubeCoord,
    original: Color,
}

impl HoverHighlighter {
    pub const DEFAULT_HIGHLIGHT: Color = Color::rgb(1.0, 0.8, 0.0);

    pub fn new(highlight: Color) -> Self {
        Self {
            highlight,
            current: None,
        }
    }

    /// Cube coordinate of the highlighted cell.
    pub fn current(&self) -> Option<CubeCoord> {
        self.current.map(|h| h.cube)
    }

    /// Move the highlight to `picked` (or clear it for `None`).
    ///
    /// Returns the overlay around the picked cell. Picks outside the grid
    /// clear the highlight and return `None`.
    pub fn update<P>(
        &mut self,
        model: &mut GridModel<P>,
        picked: Option<CubeCoord>,
    ) -> Option<HoverOverlay> {
        let picked = picked.and_then(|cube| model.index_of(cube).map(|index| (cube, index)));

        match (self.current, picked) {
            (Some(h), Some((_, index))) if h.index == index => {}
            (previous, next) => {
                if let Some(h) = previous {
                    model.set_cell_color(h.index, h.original);
                }
                self.current = next.map(|(cube, index)| {
                    let original = model.cell_color(index);
                    model.set_cell_color(index, self.highlight);
                    tracing::trace!(?cube, index, "hover moved");
                    Highlighted {
                        index,
                        cube,
                        original,
                    }
                });
            }
        }

        picked.map(|(cube, _)| HoverOverlay::around(model.layout(), cube))
    }

    /// React to a frame's action. Non-pointer actions leave the highlight alone.
    pub fn handle<P>(&mut self, model: &mut GridModel<P>, action: MapAction) -> Option<HoverOverlay> {
        match action {
            MapAction::Hover(ray) => {
                let picked = ray.pick(model.layout());
                self.update(model, picked)
            }
            MapAction::ClearHover => {
                self.clear(model);
                None
            }
            MapAction::MoveViewpoint(_) | MapAction::Resize { .. } | MapAction::Noop => None,
        }
    }

    /// Restore the highlighted cell, if any.
    pub fn clear<P>(&mut self, model: &mut GridModel<P>) {
        self.update(model, None);
    }
}

impl Default for HoverHighlighter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_HIGHLIGHT)
    }
}
