//! Geometry

mod sphere;

// Re-export
pub use sphere::*;
