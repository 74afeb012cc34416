//! Light

use crate::geometry::*;
use crate::interaction::*;
use crate::pbrt::*;
use crate::scene::*;
use crate::spectrum::*;
use std::sync::Arc;

mod light_type;
mod visibility_tester;

// Re-export
pub use light_type::*;
pub use visibility_tester::*;

/// Return value for `Light::sample_li()`.
#[derive(Clone)]
pub struct Li {
    /// Incident direction.
    pub wi: Vector3f,

    /// Density with respect to solid angle.
    pub pdf: Float,

    /// Shadow ray endpoints.
    pub visibility: VisibilityTester,

    /// Radiance arriving at the reference point.
    pub value: Spectrum,
}

impl Li {
    /// Return a new `Li`.
    ///
    /// * `wi`         - Incident direction.
    /// * `pdf`        - Density with respect to solid angle.
    /// * `visibility` - Shadow ray endpoints.
    /// * `value`      - Radiance arriving at the reference point.
    pub fn new(wi: Vector3f, pdf: Float, visibility: VisibilityTester, value: Spectrum) -> Self {
        Self {
            wi,
            pdf,
            visibility,
            value,
        }
    }
}

/// Light trait provides common behavior.
pub trait Light {
    /// Initialize the light source before rendering begins.
    ///
    /// * `scene` - The scene.
    fn preprocess(&self, _scene: &Scene) {}

    /// Returns the type of light.
    fn get_type(&self) -> LightType;

    /// Samples an incident direction at a reference point. Returns `None` if
    /// the sample carries no radiance.
    ///
    /// * `hit` - The reference point.
    /// * `u`   - Sample value for Monte Carlo integration.
    fn sample_li(&self, hit: &Hit, u: &Point2f) -> Option<Li>;

    /// Return the total emitted power.
    fn power(&self) -> Spectrum;

    /// Returns the radiance along a ray that escapes the scene.
    ///
    /// * `ray` - The ray.
    fn le(&self, _ray: &Ray) -> Spectrum {
        Spectrum::new(0.0)
    }

    /// Returns the radiance an area light emits from a point on its surface.
    ///
    /// * `hit` - Point on the surface.
    /// * `w`   - Outgoing direction.
    fn l(&self, _hit: &Hit, _w: &Vector3f) -> Spectrum {
        Spectrum::new(0.0)
    }

    /// Returns the solid angle density of `sample_li()` for a direction.
    ///
    /// * `hit` - The reference point.
    /// * `wi`  - The incident direction.
    fn pdf_li(&self, hit: &Hit, wi: &Vector3f) -> Float;

    /// Returns whether light source is described by a delta distribution.
    fn is_delta_light(&self) -> bool {
        self.get_type().is_delta_light()
    }
}

/// Atomic reference counted `Light`.
pub type ArcLight = Arc<dyn Light + Send + Sync>;
