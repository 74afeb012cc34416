//! BSSRDF Adapter
//!
//! Directional part of a separable BSSRDF at the exit point of a subsurface
//! path, exposed as a scattering model so the integrator can sample and
//! evaluate it like any other surface.

use super::*;
use crate::sampling::*;

/// Normalized Fresnel transmission lobe.
#[derive(Copy, Clone, Debug, Default)]
pub struct BSSRDFAdapterBxDF {
    /// Relative index of refraction of the medium below the boundary.
    eta: Float,

    /// Normalization so the lobe integrates to one against cosine.
    c: Float,
}

impl BSSRDFAdapterBxDF {
    /// Create a new `BSSRDFAdapterBxDF`.
    ///
    /// * `eta` - Relative index of refraction of the medium below the
    ///           boundary.
    pub fn new(eta: Float) -> Self {
        Self {
            eta,
            c: 1.0 - 2.0 * fresnel_moment1(1.0 / eta),
        }
    }
}

impl BxDFInterface for BSSRDFAdapterBxDF {
    fn f(&self, wo: &Vector3f, wi: &Vector3f, mode: TransportMode) -> Spectrum {
        if !same_hemisphere(wo, wi) {
            return Spectrum::new(0.0);
        }
        let mut f = (1.0 - fr_dielectric(cos_theta(wi), self.eta)) / (self.c * PI);
        if mode == TransportMode::Radiance {
            f *= sqr(self.eta);
        }
        Spectrum::new(f)
    }

    fn sample_f(
        &self,
        wo: &Vector3f,
        _uc: Float,
        u: &Point2f,
        mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Option<BSDFSample> {
        if !sample_flags.contains(BxDFReflTransFlags::REFLECTION) {
            return None;
        }
        let mut wi = cosine_sample_hemisphere(u);
        if wo.z < 0.0 {
            wi.z = -wi.z;
        }
        Some(BSDFSample::new(
            self.f(wo, &wi, mode),
            wi,
            cosine_hemisphere_pdf(abs_cos_theta(&wi)),
            BxDFFlags::DIFFUSE_REFLECTION,
        ))
    }

    fn pdf(
        &self,
        wo: &Vector3f,
        wi: &Vector3f,
        _mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Float {
        if !sample_flags.contains(BxDFReflTransFlags::REFLECTION) || !same_hemisphere(wo, wi) {
            return 0.0;
        }
        cosine_hemisphere_pdf(abs_cos_theta(wi))
    }

    fn flags(&self) -> BxDFFlags {
        BxDFFlags::DIFFUSE_REFLECTION
    }

    fn regularize(&mut self) {}
}
