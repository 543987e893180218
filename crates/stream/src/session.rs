use crate::loader::{LoadEvent, LoadSummary, LoaderQueue};
use hexmap_assets::{TilePathScheme, TileSource};
use hexmap_common::{HexMapConfig, LoadMode, TileId, TileImage, TileKey};
use hexmap_render::{CompositorError, LayeredAtlas, TextureCompositor};
use tracing::Instrument;

/// Generation reserved for base-map loads. Tile cycles start at 1.
pub const BASE_GENERATION: u64 = 0;

/// Set of atlas layers that hold a loaded tile. One bit per layer.
///
/// Bits are only ever set; a layer stays complete for the session's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionMask {
    len: u32,
    words: Vec<u64>,
}

impl CompletionMask {
    pub fn new(len: u32) -> Self {
        Self {
            len,
            words: vec![0; (len as usize).div_ceil(64)],
        }
    }

    /// Mask with one bit per tile of a `span × span` grid.
    pub fn for_span(span: u32) -> Self {
        Self::new(span * span)
    }

    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Set `bit`. Returns true if it was not already set.
    pub fn set(&mut self, bit: u32) -> bool {
        assert!(bit < self.len, "bit {bit} out of range for mask of {}", self.len);
        let (word, mask) = Self::locate(bit);
        let fresh = self.words[word] & mask == 0;
        self.words[word] |= mask;
        fresh
    }

    pub fn is_set(&self, bit: u32) -> bool {
        if bit >= self.len {
            return false;
        }
        let (word, mask) = Self::locate(bit);
        self.words[word] & mask != 0
    }

    pub fn count(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.count() == self.len
    }

    /// The lowest 64 bits. Covers the whole mask for spans up to 8.
    pub fn bits(&self) -> u64 {
        self.words.first().copied().unwrap_or(0)
    }

    pub fn words(&self) -> &[u64] {
        &self.words
    }

    fn locate(bit: u32) -> (usize, u64) {
        ((bit / 64) as usize, 1u64 << (bit % 64))
    }
}

/// What [`TileSession::apply`] did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// A tile was copied into its layer.
    Copied { tile: TileId, layer: u32 },
    /// The base map was stored as the fallback texture.
    BaseStored,
    /// The fetch failed; nothing was written.
    Failed { key: TileKey },
    /// A cycle finished.
    Finished(LoadSummary),
    /// The event belongs to a superseded cycle and was dropped.
    Stale,
}

/// Load state shared across discovery cycles.
///
/// Every call to [`begin_cycle`](TileSession::begin_cycle) starts a new
/// generation; events carrying an older one are ignored, which is how a
/// viewpoint change supersedes a cycle still in flight.
#[derive(Debug, Clone)]
pub struct TileSession {
    span: u32,
    mode: LoadMode,
    paths: TilePathScheme,
    generation: u64,
    pending: Vec<TileId>,
    completion: CompletionMask,
    base_loaded: bool,
    map_ready: bool,
}

impl TileSession {
    pub fn new(span: u32, mode: LoadMode, paths: TilePathScheme) -> Self {
        assert!(span > 0, "span must be at least 1");
        Self {
            span,
            mode,
            paths,
            generation: BASE_GENERATION,
            pending: Vec::new(),
            completion: CompletionMask::for_span(span),
            base_loaded: false,
            map_ready: false,
        }
    }

    pub fn from_config(config: &HexMapConfig) -> Self {
        Self::new(
            config.tile_span,
            config.load_mode,
            TilePathScheme::from_config(config),
        )
    }

    pub fn span(&self) -> u32 {
        self.span
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Tiles of the current cycle not yet reported.
    pub fn pending(&self) -> &[TileId] {
        &self.pending
    }

    pub fn completion(&self) -> &CompletionMask {
        &self.completion
    }

    pub fn base_loaded(&self) -> bool {
        self.base_loaded
    }

    /// Whether the renderer should sample the atlas instead of the base map.
    pub fn map_ready(&self) -> bool {
        self.map_ready
    }

    /// Start a new cycle for `tiles` (in discovery order).
    ///
    /// Tiles already in the atlas are skipped. Panics if a tile lies outside
    /// the session's span.
    pub fn begin_cycle(&mut self, tiles: &[TileId]) -> LoaderQueue {
        self.generation += 1;
        self.pending = tiles
            .iter()
            .inspect(|t| assert!(t.in_span(self.span), "tile {t} outside span {}", self.span))
            .filter(|t| !self.completion.is_set(t.layer(self.span)))
            .copied()
            .collect();
        tracing::debug!(
            generation = self.generation,
            discovered = tiles.len(),
            pending = self.pending.len(),
            "tile cycle started"
        );
        LoaderQueue::new(
            self.pending.iter().copied().map(TileKey::Tile),
            self.mode,
            self.generation,
            self.paths.clone(),
        )
    }

    /// Queue for the low-resolution base map. Does not start a new cycle.
    pub fn base_map_queue(&self) -> LoaderQueue {
        LoaderQueue::new(
            [TileKey::Base],
            LoadMode::Sequential,
            BASE_GENERATION,
            self.paths.clone(),
        )
    }

    /// Fold one loader event into the session and the atlas.
    pub fn apply<A: LayeredAtlas>(
        &mut self,
        event: LoadEvent,
        compositor: &mut TextureCompositor<A>,
    ) -> Result<Applied, CompositorError> {
        let generation = event.generation();
        if generation == BASE_GENERATION {
            return Ok(self.apply_base(event, compositor));
        }
        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "dropping stale load event");
            return Ok(Applied::Stale);
        }

        match event {
            LoadEvent::Loaded {
                key: TileKey::Tile(tile),
                result,
                ..
            } => {
                self.pending.retain(|t| *t != tile);
                match result {
                    Ok(image) => {
                        let layer = tile.layer(self.span);
                        match compositor.copy_texture(&image, layer) {
                            Ok(()) => {
                                self.completion.set(layer);
                                Ok(Applied::Copied { tile, layer })
                            }
                            Err(e @ CompositorError::EmptyImage { .. }) => {
                                tracing::warn!(%tile, error = %e, "layer left unpopulated");
                                Ok(Applied::Failed {
                                    key: TileKey::Tile(tile),
                                })
                            }
                            Err(e) => Err(e),
                        }
                    }
                    Err(e) => {
                        tracing::debug!(%tile, error = %e, "layer left unpopulated");
                        Ok(Applied::Failed {
                            key: TileKey::Tile(tile),
                        })
                    }
                }
            }
            LoadEvent::Loaded {
                key: TileKey::Base,
                result,
                ..
            } => {
                // a base key in a tile cycle is handled like a base load
                Ok(self.store_base(result.ok(), compositor))
            }
            LoadEvent::Done { summary, .. } => {
                self.map_ready = true;
                tracing::info!(
                    generation,
                    loaded = summary.loaded,
                    failed = summary.failed,
                    complete = self.completion.count(),
                    "tile cycle finished"
                );
                Ok(Applied::Finished(summary))
            }
        }
    }

    fn apply_base<A: LayeredAtlas>(
        &mut self,
        event: LoadEvent,
        compositor: &mut TextureCompositor<A>,
    ) -> Applied {
        match event {
            LoadEvent::Loaded { key, result, .. } => match key {
                TileKey::Base => self.store_base(result.ok(), compositor),
                TileKey::Tile(_) => {
                    tracing::warn!(%key, "tile event tagged with the base generation");
                    Applied::Stale
                }
            },
            LoadEvent::Done { summary, .. } => Applied::Finished(summary),
        }
    }

    fn store_base<A: LayeredAtlas>(
        &mut self,
        image: Option<TileImage>,
        compositor: &mut TextureCompositor<A>,
    ) -> Applied {
        match image {
            Some(image) => {
                compositor.set_base_map(&image);
                self.base_loaded = true;
                Applied::BaseStored
            }
            None => Applied::Failed {
                key: TileKey::Base,
            },
        }
    }

    /// Run a full cycle for `tiles`, applying events as they arrive.
    pub async fn run_cycle<S, A>(
        &mut self,
        tiles: &[TileId],
        source: &S,
        compositor: &mut TextureCompositor<A>,
    ) -> Result<LoadSummary, CompositorError>
    where
        S: TileSource + ?Sized,
        A: LayeredAtlas,
    {
        let span = tracing::info_span!("tile_cycle", generation = self.generation + 1);
        let queue = self.begin_cycle(tiles);
        self.drive(queue, source, compositor).instrument(span).await
    }

    /// Fetch the base map and store it in the compositor.
    pub async fn load_base_map<S, A>(
        &mut self,
        source: &S,
        compositor: &mut TextureCompositor<A>,
    ) -> Result<bool, CompositorError>
    where
        S: TileSource + ?Sized,
        A: LayeredAtlas,
    {
        let queue = self.base_map_queue();
        self.drive(queue, source, compositor).await?;
        Ok(self.base_loaded)
    }

    async fn drive<S, A>(
        &mut self,
        queue: LoaderQueue,
        source: &S,
        compositor: &mut TextureCompositor<A>,
    ) -> Result<LoadSummary, CompositorError>
    where
        S: TileSource + ?Sized,
        A: LayeredAtlas,
    {
        let mut failure = None;
        let summary = queue
            .run(source, |event| {
                if failure.is_some() {
                    return;
                }
                if let Err(e) = self.apply(event, compositor) {
                    failure = Some(e);
                }
            })
            .await;
        match failure {
            Some(e) => Err(e),
            None => Ok(summary),
        }
    }
}
