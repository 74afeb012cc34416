//! Oren-Nayar Microfacet Model

use super::*;
use crate::sampling::*;

/// Rough diffuse scattering using the Oren-Nayar microfacet model, with an
/// optional diffuse transmission lobe.
#[derive(Copy, Clone, Debug, Default)]
pub struct RoughDiffuseBxDF {
    /// Reflectance.
    r: Spectrum,

    /// Transmittance.
    t: Spectrum,

    /// Precomputed parameter `A` where:
    ///               σ^2
    /// A = 1 - ---------------
    ///          2(σ^2 + 0.33)
    ///
    /// and σ is the standard deviation of the microfacet orientation angle.
    a: Float,

    /// Precomputed parameter `B` where:
    ///      0.45 * σ^2
    /// B = ------------
    ///      σ^2 + 0.09
    b: Float,
}

impl RoughDiffuseBxDF {
    /// Create a new `RoughDiffuseBxDF`.
    ///
    /// * `r`     - Reflectance.
    /// * `t`     - Transmittance.
    /// * `sigma` - Standard deviation of the microfacet orientation angle in
    ///             degrees.
    pub fn new(r: Spectrum, t: Spectrum, sigma: Float) -> Self {
        let sigma2 = sqr(radians(sigma));
        Self {
            r,
            t,
            a: 1.0 - sigma2 / (2.0 * (sigma2 + 0.33)),
            b: 0.45 * sigma2 / (sigma2 + 0.09),
        }
    }

    /// Returns the probabilities of choosing the reflection and transmission
    /// lobes.
    ///
    /// * `sample_flags` - Hemispheres that may be sampled.
    fn lobe_weights(&self, sample_flags: BxDFReflTransFlags) -> (Float, Float) {
        let pr = if sample_flags.contains(BxDFReflTransFlags::REFLECTION) {
            self.r.max_component_value()
        } else {
            0.0
        };
        let pt = if sample_flags.contains(BxDFReflTransFlags::TRANSMISSION) {
            self.t.max_component_value()
        } else {
            0.0
        };
        (pr, pt)
    }
}

impl BxDFInterface for RoughDiffuseBxDF {
    fn f(&self, wo: &Vector3f, wi: &Vector3f, _mode: TransportMode) -> Spectrum {
        let same = same_hemisphere(wo, wi);
        let scale = if same { self.r } else { self.t };
        if self.b == 0.0 || scale.is_black() {
            return scale * INV_PI;
        }

        let sin_theta_i = sin_theta(wi);
        let sin_theta_o = sin_theta(wo);

        // Compute cosine term of the Oren-Nayar model.
        let max_cos = if sin_theta_i > 0.0 && sin_theta_o > 0.0 {
            cos_d_phi(wi, wo).max(0.0)
        } else {
            0.0
        };

        // Compute sine and tangent terms of the Oren-Nayar model.
        let (sin_alpha, tan_beta) = if abs_cos_theta(wi) > abs_cos_theta(wo) {
            (sin_theta_o, sin_theta_i / abs_cos_theta(wi))
        } else {
            (sin_theta_i, sin_theta_o / abs_cos_theta(wo))
        };

        scale * INV_PI * (self.a + self.b * max_cos * sin_alpha * tan_beta)
    }

    fn sample_f(
        &self,
        wo: &Vector3f,
        uc: Float,
        u: &Point2f,
        mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Option<BSDFSample> {
        let (pr, pt) = self.lobe_weights(sample_flags);
        if pr == 0.0 && pt == 0.0 {
            return None;
        }

        let mut wi = cosine_sample_hemisphere(u);
        let reflect = uc < pr / (pr + pt);
        let (choice_pdf, flags) = if reflect {
            if wo.z < 0.0 {
                wi.z = -wi.z;
            }
            (pr / (pr + pt), BxDFFlags::DIFFUSE_REFLECTION)
        } else {
            if wo.z > 0.0 {
                wi.z = -wi.z;
            }
            (pt / (pr + pt), BxDFFlags::DIFFUSE_TRANSMISSION)
        };

        let pdf = cosine_hemisphere_pdf(abs_cos_theta(&wi)) * choice_pdf;
        Some(BSDFSample::new(self.f(wo, &wi, mode), wi, pdf, flags))
    }

    fn pdf(
        &self,
        wo: &Vector3f,
        wi: &Vector3f,
        _mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Float {
        let (pr, pt) = self.lobe_weights(sample_flags);
        if pr == 0.0 && pt == 0.0 {
            return 0.0;
        }
        let choice = if same_hemisphere(wo, wi) { pr } else { pt };
        choice / (pr + pt) * cosine_hemisphere_pdf(abs_cos_theta(wi))
    }

    fn flags(&self) -> BxDFFlags {
        let mut flags = BxDFFlags::UNSET;
        if !self.r.is_black() {
            flags |= BxDFFlags::DIFFUSE_REFLECTION;
        }
        if !self.t.is_black() {
            flags |= BxDFFlags::DIFFUSE_TRANSMISSION;
        }
        flags
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
    fn zero_sigma_is_lambertian() {
        let bxdf = RoughDiffuseBxDF::new(Spectrum::new(0.6), Spectrum::new(0.0), 0.0);
        let f = bxdf.f(&direction(0.4, 0.0), &direction(1.0, 2.0), TransportMode::Radiance);
        assert!(approx_eq!(f32, f[0], 0.6 * INV_PI, epsilon = 1e-6));
    }

    #[test]
    fn lobes_are_chosen_by_max_component() {
        let bxdf = BxDF::RoughDiffuse(RoughDiffuseBxDF::new(
            Spectrum::new(0.3),
            Spectrum::new(0.1),
            20.0,
        ));
        assert_eq!(
            bxdf.flags(),
            BxDFFlags::DIFFUSE_REFLECTION | BxDFFlags::DIFFUSE_TRANSMISSION
        );
        let wo = direction(0.5, 0.5);
        let u = Point2f::new(0.3, 0.7);
        let bs = bxdf
            .sample_f(&wo, 0.8, &u, TransportMode::Radiance, BxDFReflTransFlags::ALL)
            .unwrap();
        assert!(bs.is_transmission());
        assert!(bs.wi.z < 0.0);
        assert!(approx_eq!(
            f32,
            bs.pdf,
            bxdf.pdf(&wo, &bs.wi, TransportMode::Radiance, BxDFReflTransFlags::ALL),
            epsilon = 1e-6
        ));
        assert!(bxdf
            .sample_f(&wo, 0.1, &u, TransportMode::Radiance, BxDFReflTransFlags::TRANSMISSION)
            .unwrap()
            .is_transmission());
    }

    #[test]
    fn pdf_integrates_to_at_most_one() {
        let bxdf = BxDF::RoughDiffuse(RoughDiffuseBxDF::new(
            Spectrum::new(0.5),
            Spectrum::new(0.5),
            30.0,
        ));
        let integral = integrate_pdf(&bxdf, &direction(0.9, 0.0), 100_000);
        assert!(integral <= 1.03);
        assert!(integral > 0.97);
    }

    proptest! {
        #[test]
        fn f_is_non_negative(t0 in 0.0..3.14_f32, p0 in 0.0..6.28_f32, t1 in 0.0..3.14_f32, p1 in 0.0..6.28_f32, sigma in 0.0..90.0_f32) {
            let bxdf = RoughDiffuseBxDF::new(Spectrum::new(0.7), Spectrum::new(0.2), sigma);
            let f = bxdf.f(&direction(t0, p0), &direction(t1, p1), TransportMode::Radiance);
            prop_assert!(f[0] >= 0.0);
        }
    }
}
