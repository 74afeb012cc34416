//! Integrator

mod common;
mod sampler_integrator;

use crate::app::Options;
use crate::scene::Scene;

// Re-export.
pub use common::*;
pub use sampler_integrator::*;

/// Integrator interface.
pub trait Integrator {
    /// Prepares per-scene state before rendering.
    ///
    /// * `scene` - The scene.
    fn preprocess(&mut self, scene: &Scene);

    /// Renders the scene and writes the image.
    ///
    /// * `scene`   - The scene.
    /// * `options` - Rendering options.
    fn render(&self, scene: &Scene, options: &Options) -> Result<(), String>;
}
