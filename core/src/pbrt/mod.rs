//! Numeric helpers shared by every crate in the renderer.

mod common;
mod hash;
mod special;

// Re-export
pub use common::*;
pub use hash::*;
pub use special::*;
