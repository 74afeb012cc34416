//! Conductor

use super::*;
use crate::microfacet::TrowbridgeReitzDistribution;

/// Reflection from a metal, smooth or rough, using the complex Fresnel
/// equations per channel.
#[derive(Copy, Clone, Debug, Default)]
pub struct ConductorBxDF {
    /// Microfacet distribution.
    mf_distrib: TrowbridgeReitzDistribution,

    /// Real part of the index of refraction.
    eta: Spectrum,

    /// Absorption coefficient.
    k: Spectrum,
}

impl ConductorBxDF {
    /// Create a new `ConductorBxDF`.
    ///
    /// * `mf_distrib` - Microfacet distribution.
    /// * `eta`        - Real part of the index of refraction.
    /// * `k`          - Absorption coefficient.
    pub fn new(mf_distrib: TrowbridgeReitzDistribution, eta: Spectrum, k: Spectrum) -> Self {
        Self { mf_distrib, eta, k }
    }
}

impl BxDFInterface for ConductorBxDF {
    fn f(&self, wo: &Vector3f, wi: &Vector3f, _mode: TransportMode) -> Spectrum {
        if !same_hemisphere(wo, wi) || self.mf_distrib.effectively_specular() {
            return Spectrum::new(0.0);
        }

        let cos_theta_o = abs_cos_theta(wo);
        let cos_theta_i = abs_cos_theta(wi);
        if cos_theta_i == 0.0 || cos_theta_o == 0.0 {
            return Spectrum::new(0.0);
        }
        let wm = *wi + *wo;
        if wm.length_squared() == 0.0 {
            return Spectrum::new(0.0);
        }
        let wm = wm.normalize();

        let fr = fr_conductor(wo.abs_dot(&wm), &self.eta, &self.k);
        fr * (self.mf_distrib.d(&wm) * self.mf_distrib.g(wo, wi)
            / (4.0 * cos_theta_i * cos_theta_o))
    }

    fn sample_f(
        &self,
        wo: &Vector3f,
        _uc: Float,
        u: &Point2f,
        _mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Option<BSDFSample> {
        if !sample_flags.contains(BxDFReflTransFlags::REFLECTION) || wo.z == 0.0 {
            return None;
        }

        if self.mf_distrib.effectively_specular() {
            let wi = Vector3f::new(-wo.x, -wo.y, wo.z);
            let f = fr_conductor(abs_cos_theta(&wi), &self.eta, &self.k) / abs_cos_theta(&wi);
            return Some(BSDFSample::new(f, wi, 1.0, BxDFFlags::SPECULAR_REFLECTION));
        }

        let wm = self.mf_distrib.sample_wm(wo, u);
        let wi = reflect(wo, &wm);
        if !same_hemisphere(wo, &wi) {
            return None;
        }

        let pdf = self.mf_distrib.pdf(wo, &wm) / (4.0 * wo.abs_dot(&wm));
        let cos_theta_o = abs_cos_theta(wo);
        let cos_theta_i = abs_cos_theta(&wi);
        if cos_theta_i == 0.0 || cos_theta_o == 0.0 {
            return None;
        }

        let fr = fr_conductor(wo.abs_dot(&wm), &self.eta, &self.k);
        let f = fr
            * (self.mf_distrib.d(&wm) * self.mf_distrib.g(wo, &wi)
                / (4.0 * cos_theta_i * cos_theta_o));
        Some(BSDFSample::new(f, wi, pdf, BxDFFlags::GLOSSY_REFLECTION))
    }

    fn pdf(
        &self,
        wo: &Vector3f,
        wi: &Vector3f,
        _mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Float {
        if !sample_flags.contains(BxDFReflTransFlags::REFLECTION)
            || !same_hemisphere(wo, wi)
            || self.mf_distrib.effectively_specular()
        {
            return 0.0;
        }

        let wm = *wo + *wi;
        if wm.length_squared() == 0.0 {
            return 0.0;
        }
        let wm = face_forward(&wm.normalize(), &Vector3f::new(0.0, 0.0, 1.0));
        self.mf_distrib.pdf(wo, &wm) / (4.0 * wo.abs_dot(&wm))
    }

    fn flags(&self) -> BxDFFlags {
        if self.mf_distrib.effectively_specular() {
            BxDFFlags::SPECULAR_REFLECTION
        } else {
            BxDFFlags::GLOSSY_REFLECTION
        }
    }

    fn regularize(&mut self) {
        self.mf_distrib.regularize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflection::test_util::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    fn gold(alpha: Float) -> BxDF {
        BxDF::Conductor(ConductorBxDF::new(
            TrowbridgeReitzDistribution::new(alpha, alpha),
            Spectrum::rgb(0.143, 0.374, 1.442),
            Spectrum::rgb(3.983, 2.385, 1.603),
        ))
    }

    #[test]
    fn specular_mirror() {
        let bxdf = gold(0.0);
        let wo = direction(0.3, 1.0);
        let bs = bxdf
            .sample_f(&wo, 0.5, &Point2f::new(0.5, 0.5), TransportMode::Radiance, BxDFReflTransFlags::ALL)
            .unwrap();
        assert_eq!(bs.flags, BxDFFlags::SPECULAR_REFLECTION);
        assert_eq!(bs.pdf, 1.0);
        assert!(approx_eq!(f32, bs.wi.z, wo.z));
        assert_eq!(bxdf.pdf(&wo, &bs.wi, TransportMode::Radiance, BxDFReflTransFlags::ALL), 0.0);
        assert!(bxdf
            .sample_f(&wo, 0.5, &Point2f::new(0.5, 0.5), TransportMode::Radiance, BxDFReflTransFlags::TRANSMISSION)
            .is_none());
    }

    #[test]
    fn grazing_wo_gives_no_sample() {
        let wo = Vector3f::new(1.0, 0.0, 0.0);
        for bxdf in [gold(0.0), gold(0.3)] {
            let bs = bxdf.sample_f(&wo, 0.5, &Point2f::new(0.5, 0.5), TransportMode::Radiance, BxDFReflTransFlags::ALL);
            assert!(bs.is_none());
        }
    }

    #[test]
    fn energy_is_conserved() {
        for bxdf in [gold(0.0), gold(0.2), gold(0.7)] {
            for &theta in &[0.0, 0.8, 1.4] {
                let albedo = sampled_albedo(&bxdf, &direction(theta, 0.0), TransportMode::Radiance, 20_000);
                assert!(albedo.max_component_value() <= 1.0 + 1e-3, "{}", albedo);
            }
        }
    }

    #[test]
    fn rough_pdf_integrates_to_at_most_one() {
        let integral = integrate_pdf(&gold(0.4), &direction(0.4, 0.0), 200_000);
        assert!(integral <= 1.05, "{}", integral);
    }

    proptest! {
        #[test]
        fn f_is_non_negative(t0 in 0.0..3.14_f32, p0 in 0.0..6.28_f32, t1 in 0.0..3.14_f32, p1 in 0.0..6.28_f32) {
            let f = gold(0.3).f(&direction(t0, p0), &direction(t1, p1), TransportMode::Radiance);
            prop_assert!(f[0] >= 0.0 && f[1] >= 0.0 && f[2] >= 0.0);
        }
    }
}
