//! Ideal Diffuse

use super::*;
use crate::sampling::*;

/// Lambertian reflection: light is scattered equally in all directions of
/// the hemisphere it arrived from.
#[derive(Copy, Clone, Debug, Default)]
pub struct DiffuseBxDF {
    /// Fraction of incident light that is scattered.
    r: Spectrum,
}

impl DiffuseBxDF {
    /// Create a new `DiffuseBxDF`.
    ///
    /// * `r` - Reflectance.
    pub fn new(r: Spectrum) -> Self {
        Self { r }
    }
}

impl BxDFInterface for DiffuseBxDF {
    fn f(&self, wo: &Vector3f, wi: &Vector3f, _mode: TransportMode) -> Spectrum {
        if same_hemisphere(wo, wi) {
            self.r * INV_PI
        } else {
            Spectrum::new(0.0)
        }
    }

    fn sample_f(
        &self,
        wo: &Vector3f,
        _uc: Float,
        u: &Point2f,
        _mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Option<BSDFSample> {
        if !sample_flags.contains(BxDFReflTransFlags::REFLECTION) {
            return None;
        }

        let mut wi = cosine_sample_hemisphere(u);
        if wo.z < 0.0 {
            wi.z = -wi.z;
        }
        let pdf = cosine_hemisphere_pdf(abs_cos_theta(&wi));
        Some(BSDFSample::new(
            self.r * INV_PI,
            wi,
            pdf,
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
            0.0
        } else {
            cosine_hemisphere_pdf(abs_cos_theta(wi))
        }
    }

    fn flags(&self) -> BxDFFlags {
        if self.r.is_black() {
            BxDFFlags::UNSET
        } else {
            BxDFFlags::DIFFUSE_REFLECTION
        }
    }

    fn regularize(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflection::test_util::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    #[test]
    fn albedo_equals_reflectance() {
        let bxdf = BxDF::Diffuse(DiffuseBxDF::new(Spectrum::new(0.5)));
        let wo = direction(0.6, 1.0);
        let albedo = sampled_albedo(&bxdf, &wo, TransportMode::Radiance, 1000);
        assert!(approx_eq!(f32, albedo[0], 0.5, epsilon = 1e-4));
    }

    #[test]
    fn pdf_integrates_to_one() {
        let bxdf = BxDF::Diffuse(DiffuseBxDF::new(Spectrum::new(0.8)));
        let integral = integrate_pdf(&bxdf, &direction(0.3, 0.2), 100_000);
        assert!(approx_eq!(f32, integral, 1.0, epsilon = 0.03));
    }

    #[test]
    fn black_reflectance_has_no_lobes() {
        assert_eq!(DiffuseBxDF::new(Spectrum::new(0.0)).flags(), BxDFFlags::UNSET);
    }

    proptest! {
        #[test]
        fn f_is_non_negative(t0 in 0.0..3.14_f32, p0 in 0.0..6.28_f32, t1 in 0.0..3.14_f32, p1 in 0.0..6.28_f32) {
            let bxdf = DiffuseBxDF::new(Spectrum::rgb(0.2, 0.5, 0.9));
            let f = bxdf.f(&direction(t0, p0), &direction(t1, p1), TransportMode::Radiance);
            prop_assert!(f[0] >= 0.0 && f[1] >= 0.0 && f[2] >= 0.0);
        }
    }
}
