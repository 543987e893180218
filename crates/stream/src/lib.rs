//! Tile streaming: which tiles a viewpoint needs, fetching them, and folding
//! the results into the atlas.
//!
//! # Invariants
//! - Discovery visits each tile at most once and only yields tiles in `[0, span)`.
//! - A loader queue fetches each key once and reports `Done` exactly once, last.
//! - Events from a superseded cycle never touch the atlas or the completion mask.
//! - Completion bits are only ever set.
//!
//! Everything here is executor-agnostic; callers drive the futures with
//! whatever executor they have (the CLI uses `futures::executor::block_on`).

mod budget;
mod discovery;
mod loader;
mod session;

pub use budget::{StreamConfig, StreamState, StreamStats};
pub use discovery::TileGrid;
pub use loader::{LoadEvent, LoadSummary, LoaderQueue};
pub use session::{Applied, BASE_GENERATION, CompletionMask, TileSession};

pub fn crate_info() -> &'static str {
    "hexmap-stream v0.1.0"
}
