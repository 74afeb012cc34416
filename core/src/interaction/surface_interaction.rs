//! Surface Interactions

use super::Hit;
use crate::geometry::*;
use crate::light::ArcLight;
use crate::material::*;
use crate::pbrt::*;
use crate::reflection::TransportMode;
use crate::spectrum::*;
use bumpalo::Bump;

/// Shading geometry, possibly perturbed from the true geometry.
#[derive(Copy, Clone, Default)]
pub struct Shading {
    /// Surface normal.
    pub n: Normal3f,

    /// Parametric partial derivative of the point ∂p/∂u.
    pub dpdu: Vector3f,

    /// Parametric partial derivative of the point ∂p/∂v.
    pub dpdv: Vector3f,
}

/// Geometry of a particular point on a surface together with what is
/// attached to the surface.
#[derive(Clone, Default)]
pub struct SurfaceInteraction {
    /// The common interaction data.
    pub hit: Hit,

    /// The uv coordinates from surface parametrization.
    pub uv: Point2f,

    /// Parametric partial derivative of the point ∂p/∂u.
    pub dpdu: Vector3f,

    /// Parametric partial derivative of the point ∂p/∂v.
    pub dpdv: Vector3f,

    /// Shading geometry.
    pub shading: Shading,

    /// Material of the surface. `None` for surfaces that only separate media.
    pub material: Option<ArcMaterial>,

    /// Emission of the surface.
    pub area_light: Option<ArcLight>,
}

impl SurfaceInteraction {
    /// Create a new surface interaction. The normal is computed from the
    /// partial derivatives.
    ///
    /// * `p`                   - Point of interaction.
    /// * `p_error`             - Floating point error for ray intersection points.
    /// * `uv`                  - The uv coordinates from surface parametrization.
    /// * `wo`                  - The negative ray direction.
    /// * `dpdu`                - Parametric partial derivative of the point ∂p/∂u.
    /// * `dpdv`                - Parametric partial derivative of the point ∂p/∂v.
    /// * `time`                - Time when interaction occurred.
    /// * `reverse_orientation` - Flip the computed normal.
    pub fn new(
        p: Point3f,
        p_error: Vector3f,
        uv: Point2f,
        wo: Vector3f,
        dpdu: Vector3f,
        dpdv: Vector3f,
        time: Float,
        reverse_orientation: bool,
    ) -> Self {
        let mut n = Normal3f::from(dpdu.cross(&dpdv).normalize());
        if reverse_orientation {
            n = -n;
        }

        Self {
            hit: Hit::new(p, time, p_error, wo, n, None),
            uv,
            dpdu,
            dpdv,
            shading: Shading { n, dpdu, dpdv },
            material: None,
            area_light: None,
        }
    }

    /// Returns the emitted radiance of an area light surface in direction `w`.
    ///
    /// * `w` - Outgoing direction.
    pub fn le(&self, w: &Vector3f) -> Spectrum {
        self.area_light
            .as_ref()
            .map_or(Spectrum::new(0.0), |light| light.l(&self.hit, w))
    }

    /// Evaluates the material at this point. The BSDF and BSSRDF are
    /// allocated in `arena`.
    ///
    /// * `arena` - Per-sample allocator.
    /// * `mode`  - Transport mode.
    pub fn compute_scattering_functions<'arena>(
        &self,
        arena: &'arena Bump,
        mode: TransportMode,
    ) -> ScatteringFunctions<'arena> {
        match self.material.as_ref() {
            Some(material) => material.compute_scattering_functions(self, arena, mode),
            None => ScatteringFunctions::default(),
        }
    }
}
