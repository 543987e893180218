use crate::coord::CubeCoord;
use crate::layout::HexLayout;
use glam::Mat4;
use hexmap_common::{Color, Transform};

/// How cells are colored when the grid is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellColoring {
    Uniform(Color),
    /// Deterministic pseudo-random color per cell, reproducible for a given seed.
    Random { seed: u64 },
}

impl Default for CellColoring {
    fn default() -> Self {
        Self::Uniform(Color::WHITE)
    }
}

/// Per-cell instance data for an `N × N` hex grid.
///
/// Cells are stored row-major (`index = row * N + col`) in parallel arrays:
/// world transform, color, and an optional caller-defined payload. The grid
/// is built once and never resized. Indexing outside `[0, N²)` panics.
#[derive(Debug, Clone)]
pub struct GridModel<P = ()> {
    layout: HexLayout,
    transforms: Vec<Transform>,
    colors: Vec<Color>,
    payloads: Vec<Option<P>>,
    colors_dirty: bool,
}

impl<P> GridModel<P> {
    /// Build all `N²` cells from the layout's offset-to-world mapping.
    pub fn new(layout: HexLayout, coloring: CellColoring) -> Self {
        let _span = tracing::info_span!("grid_build", size = layout.grid_size()).entered();

        let transforms: Vec<Transform> = layout
            .cells()
            .map(|o| Transform::from_translation(layout.offset_to_world(o)))
            .collect();

        let colors = match coloring {
            CellColoring::Uniform(color) => vec![color; transforms.len()],
            CellColoring::Random { seed } => {
                let mut state = seed;
                (0..transforms.len())
                    .map(|_| {
                        let bits = splitmix64(&mut state);
                        Color::rgb(
                            channel(bits),
                            channel(bits >> 21),
                            channel(bits >> 42),
                        )
                    })
                    .collect()
            }
        };

        let payloads = (0..transforms.len()).map(|_| None).collect();

        tracing::debug!(cells = transforms.len(), "grid model built");

        Self {
            layout,
            transforms,
            colors,
            payloads,
            colors_dirty: true,
        }
    }

    pub fn layout(&self) -> &HexLayout {
        &self.layout
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    pub fn transform(&self, index: usize) -> &Transform {
        &self.transforms[index]
    }

    pub fn cell_color(&self, index: usize) -> Color {
        self.colors[index]
    }

    pub fn set_cell_color(&mut self, index: usize, color: Color) {
        self.colors[index] = color;
        self.colors_dirty = true;
    }

    pub fn cell_payload(&self, index: usize) -> Option<&P> {
        self.payloads[index].as_ref()
    }

    /// Store a payload, returning the previous one.
    pub fn set_cell_payload(&mut self, index: usize, value: P) -> Option<P> {
        self.payloads[index].replace(value)
    }

    /// Index of a cube coordinate, or `None` outside the grid.
    pub fn index_of(&self, cube: CubeCoord) -> Option<usize> {
        self.layout.cube_to_index(cube)
    }

    /// `(model matrix, color)` for every cell, in index order.
    pub fn instances(&self) -> impl Iterator<Item = (Mat4, Color)> + '_ {
        self.transforms
            .iter()
            .zip(&self.colors)
            .map(|(t, c)| (t.matrix(), *c))
    }

    /// Whether colors changed since the last call; resets the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.colors_dirty)
    }
}

impl GridModel<CubeCoord> {
    /// Store every cell's cube coordinate as its payload.
    pub fn populate_cube_payloads(&mut self) {
        let cells: Vec<_> = self.layout.cells().collect();
        for (index, offset) in cells.into_iter().enumerate() {
            self.payloads[index] = Some(offset.to_cube());
        }
    }
}

fn channel(bits: u64) -> f32 {
    (bits & 0xff) as f32 / 255.0
}

/// Splitmix64 step: advances `state` and returns the next output.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::OffsetCoord;

    fn model() -> GridModel {
        GridModel::new(HexLayout::new(1.0, 4), CellColoring::default())
    }

    #[test]
    fn builds_n_squared_cells() {
        let m = model();
        assert_eq!(m.len(), 16);
        assert!(!m.is_empty());
        assert!(m.instances().all(|(_, c)| c == Color::WHITE));
    }

    #[test]
    fn transforms_match_layout() {
        let m = model();
        let layout = *m.layout();
        // index 6 is (col 2, row 1)
        let expected = layout.offset_to_world(OffsetCoord::new(2, 1));
        assert_eq!(m.transform(6).position, expected);
        let (matrix, _) = m.instances().nth(6).unwrap();
        assert_eq!(matrix.w_axis.truncate(), expected);
    }

    #[test]
    fn color_set_and_get() {
        let mut m = model();
        assert!(m.take_dirty());
        assert!(!m.take_dirty());

        let red = Color::rgb(1.0, 0.0, 0.0);
        m.set_cell_color(5, red);
        assert_eq!(m.cell_color(5), red);
        assert_eq!(m.cell_color(4), Color::WHITE);
        assert!(m.take_dirty());
    }

    #[test]
    fn payload_set_and_get() {
        let mut m: GridModel<&'static str> =
            GridModel::new(HexLayout::new(1.0, 2), CellColoring::default());
        assert_eq!(m.cell_payload(3), None);
        assert_eq!(m.set_cell_payload(3, "hello"), None);
        assert_eq!(m.cell_payload(3), Some(&"hello"));
        assert_eq!(m.set_cell_payload(3, "again"), Some("hello"));
    }

    #[test]
    fn cube_payloads_match_index() {
        let mut m: GridModel<CubeCoord> =
            GridModel::new(HexLayout::new(1.0, 5), CellColoring::default());
        m.populate_cube_payloads();
        for index in 0..m.len() {
            let cube = *m.cell_payload(index).unwrap();
            assert_eq!(m.index_of(cube), Some(index));
        }
    }

    #[test]
    fn random_coloring_is_deterministic() {
        let layout = HexLayout::new(1.0, 3);
        let a: GridModel = GridModel::new(layout, CellColoring::Random { seed: 7 });
        let b: GridModel = GridModel::new(layout, CellColoring::Random { seed: 7 });
        let c: GridModel = GridModel::new(layout, CellColoring::Random { seed: 8 });
        let colors = |m: &GridModel| m.instances().map(|(_, c)| c).collect::<Vec<_>>();
        assert_eq!(colors(&a), colors(&b));
        assert_ne!(colors(&a), colors(&c));
        assert!(colors(&a).iter().all(|c| (0.0..=1.0).contains(&c.r)));
    }

    #[test]
    #[should_panic]
    fn out_of_bounds_index_panics() {
        let m = model();
        m.cell_color(16);
    }
}
