//! Textures

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

mod bilerp;
mod constant;
mod imagemap;

// Re-export
pub use bilerp::*;
pub use constant::*;
pub use imagemap::*;
