//! Light Distribution

mod power;
mod spatial;
mod uniform;

pub use power::*;
pub use spatial::*;
pub use uniform::*;

use crate::error::ErrorReporter;
use crate::geometry::*;
use crate::sampling::*;
use crate::scene::*;
use std::sync::Arc;

/// Light sampling strategy.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LightSampleStrategy {
    /// Sample all light sources uniformly.
    Uniform,

    /// Samples light sources according to their emitted power.
    Power,

    /// Estimates light contributions per voxel and samples accordingly.
    Spatial,
}

impl LightSampleStrategy {
    /// Parses a strategy name. Unknown names are reported as an error and
    /// fall back to `Spatial`.
    ///
    /// * `name`     - Strategy name.
    /// * `reporter` - Reports unknown names.
    pub fn parse(name: &str, reporter: &ErrorReporter) -> Self {
        match name {
            "uniform" => Self::Uniform,
            "power" => Self::Power,
            "spatial" => Self::Spatial,
            _ => {
                reporter.error(&format!(
                    "Light sample distribution type \"{}\" unknown. Using \"spatial\".",
                    name
                ));
                Self::Spatial
            }
        }
    }
}

/// Provides probability distributions for choosing a light source to sample
/// at a point in space.
pub trait LightDistribution {
    /// Returns the light selection distribution for a point. `None` if the
    /// scene has no lights.
    ///
    /// * `p` - The point.
    fn lookup(&self, p: &Point3f) -> Option<Arc<Distribution1D>>;
}

/// Atomic reference counted `LightDistribution`.
pub type ArcLightDistribution = Arc<dyn LightDistribution + Send + Sync>;

/// Returns a new `LightDistribution` for a scene.
///
/// * `strategy` - The strategy to use for light sampling.
/// * `scene`    - The scene.
pub fn create_light_sample_distribution(
    strategy: LightSampleStrategy,
    scene: &Scene,
) -> ArcLightDistribution {
    let strategy = if scene.lights.len() == 1 {
        LightSampleStrategy::Uniform
    } else {
        strategy
    };
    match strategy {
        LightSampleStrategy::Uniform => Arc::new(UniformLightDistribution::new(scene)),
        LightSampleStrategy::Power => Arc::new(PowerLightDistribution::new(scene)),
        LightSampleStrategy::Spatial => Arc::new(SpatialLightDistribution::new(scene, 64)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_strategy_falls_back_to_spatial() {
        let reporter = ErrorReporter::new(true);
        assert_eq!(
            LightSampleStrategy::parse("power", &reporter),
            LightSampleStrategy::Power
        );
        assert!(reporter.last_message().is_none());
        assert_eq!(
            LightSampleStrategy::parse("bvh", &reporter),
            LightSampleStrategy::Spatial
        );
        assert!(reporter
            .last_message()
            .map_or(false, |m| m.contains("\"bvh\" unknown")));
    }
}
