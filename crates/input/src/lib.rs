//! Pointer input boundary: per-frame rays in, picked cells and hover state out.
//!
//! # Invariants
//! - Only rays cross the boundary; window events stay in the windowing layer.
//! - The hover highlighter is the single writer of highlight colors and
//!   always restores the previous cell before highlighting the next.

pub mod action;
pub mod hover;
pub mod pointer;

pub use action::MapAction;
pub use hover::HoverHighlighter;
pub use pointer::PointerRay;

pub fn crate_info() -> &'static str {
    "hexmap-input v0.1.0"
}
