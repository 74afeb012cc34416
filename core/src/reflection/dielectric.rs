//! Dielectric Interface

use super::*;
use crate::microfacet::TrowbridgeReitzDistribution;

/// Scattering at the boundary between two dielectrics with a rough or
/// perfectly smooth interface.
#[derive(Copy, Clone, Debug, Default)]
pub struct DielectricBxDF {
    /// Relative index of refraction (inside over outside).
    eta: Float,

    /// Microfacet distribution.
    mf_distrib: TrowbridgeReitzDistribution,
}

impl DielectricBxDF {
    /// Create a new `DielectricBxDF`. An index of refraction of exactly 1 is
    /// nudged to 1.001 so the interface still reflects.
    ///
    /// * `eta`        - Relative index of refraction.
    /// * `mf_distrib` - Microfacet distribution.
    pub fn new(eta: Float, mf_distrib: TrowbridgeReitzDistribution) -> Self {
        let eta = if eta == 1.0 { 1.001 } else { eta };
        Self { eta, mf_distrib }
    }

    /// Returns the relative index of refraction.
    pub fn eta(&self) -> Float {
        self.eta
    }

    /// Returns the reflection and transmission lobe probabilities.
    ///
    /// * `r`            - Fresnel reflectance.
    /// * `sample_flags` - Hemispheres that may be sampled.
    fn lobe_weights(r: Float, sample_flags: BxDFReflTransFlags) -> (Float, Float) {
        let pr = if sample_flags.contains(BxDFReflTransFlags::REFLECTION) {
            r
        } else {
            0.0
        };
        let pt = if sample_flags.contains(BxDFReflTransFlags::TRANSMISSION) {
            1.0 - r
        } else {
            0.0
        };
        (pr, pt)
    }

    /// Returns the generalized half vector for a pair of directions, oriented
    /// to the upper hemisphere, and the relative index of refraction along
    /// the path. Returns `None` for degenerate or back facing configurations.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    fn half_vector(&self, wo: &Vector3f, wi: &Vector3f) -> Option<(Vector3f, Float)> {
        let cos_theta_o = cos_theta(wo);
        let cos_theta_i = cos_theta(wi);
        let reflect = cos_theta_i * cos_theta_o > 0.0;
        let etap = match (reflect, cos_theta_o > 0.0) {
            (true, _) => 1.0,
            (false, true) => self.eta,
            (false, false) => 1.0 / self.eta,
        };

        let wm = *wi * etap + *wo;
        if cos_theta_i == 0.0 || cos_theta_o == 0.0 || wm.length_squared() == 0.0 {
            return None;
        }
        let wm = face_forward(&wm.normalize(), &Vector3f::new(0.0, 0.0, 1.0));

        // Discard back facing microfacets.
        if wm.dot(wi) * cos_theta_i < 0.0 || wm.dot(wo) * cos_theta_o < 0.0 {
            return None;
        }
        Some((wm, etap))
    }

    /// Samples the perfectly smooth interface.
    fn sample_specular(
        &self,
        wo: &Vector3f,
        uc: Float,
        mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Option<BSDFSample> {
        if wo.z == 0.0 {
            return None;
        }
        let r = fr_dielectric(cos_theta(wo), self.eta);
        let (pr, pt) = Self::lobe_weights(r, sample_flags);
        if pr == 0.0 && pt == 0.0 {
            return None;
        }

        if uc < pr / (pr + pt) {
            let wi = Vector3f::new(-wo.x, -wo.y, wo.z);
            let fr = Spectrum::new(r / abs_cos_theta(&wi));
            Some(BSDFSample::new(
                fr,
                wi,
                pr / (pr + pt),
                BxDFFlags::SPECULAR_REFLECTION,
            ))
        } else {
            let (etap, wi) = refract(wo, &Vector3f::new(0.0, 0.0, 1.0), self.eta)?;
            let mut ft = Spectrum::new((1.0 - r) / abs_cos_theta(&wi));
            if mode == TransportMode::Radiance {
                ft /= sqr(etap);
            }
            Some(
                BSDFSample::new(ft, wi, pt / (pr + pt), BxDFFlags::SPECULAR_TRANSMISSION)
                    .with_eta(etap),
            )
        }
    }

    /// Samples the rough interface through its visible normals.
    fn sample_rough(
        &self,
        wo: &Vector3f,
        uc: Float,
        u: &Point2f,
        mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Option<BSDFSample> {
        let wm = self.mf_distrib.sample_wm(wo, u);
        let r = fr_dielectric(wo.dot(&wm), self.eta);
        let (pr, pt) = Self::lobe_weights(r, sample_flags);
        if pr == 0.0 && pt == 0.0 {
            return None;
        }

        if uc < pr / (pr + pt) {
            let wi = reflect(wo, &wm);
            if !same_hemisphere(wo, &wi) {
                return None;
            }
            let pdf = self.mf_distrib.pdf(wo, &wm) / (4.0 * wo.abs_dot(&wm)) * pr / (pr + pt);
            let f = Spectrum::new(
                self.mf_distrib.d(&wm) * self.mf_distrib.g(wo, &wi) * r
                    / (4.0 * cos_theta(&wi) * cos_theta(wo)),
            );
            Some(BSDFSample::new(f, wi, pdf, BxDFFlags::GLOSSY_REFLECTION))
        } else {
            let (etap, wi) = refract(wo, &wm, self.eta)?;
            if same_hemisphere(wo, &wi) || wi.z == 0.0 {
                return None;
            }

            let denom = sqr(wi.dot(&wm) + wo.dot(&wm) / etap);
            let dwm_dwi = wi.abs_dot(&wm) / denom;
            let pdf = self.mf_distrib.pdf(wo, &wm) * dwm_dwi * pt / (pr + pt);

            let mut ft = Spectrum::new(
                (1.0 - r)
                    * self.mf_distrib.d(&wm)
                    * self.mf_distrib.g(wo, &wi)
                    * (wi.dot(&wm) * wo.dot(&wm) / (cos_theta(&wi) * cos_theta(wo) * denom))
                        .abs(),
            );
            if mode == TransportMode::Radiance {
                ft /= sqr(etap);
            }
            Some(BSDFSample::new(ft, wi, pdf, BxDFFlags::GLOSSY_TRANSMISSION).with_eta(etap))
        }
    }
}

impl BxDFInterface for DielectricBxDF {
    fn f(&self, wo: &Vector3f, wi: &Vector3f, mode: TransportMode) -> Spectrum {
        if self.mf_distrib.effectively_specular() {
            return Spectrum::new(0.0);
        }
        let Some((wm, etap)) = self.half_vector(wo, wi) else {
            return Spectrum::new(0.0);
        };

        let cos_theta_o = cos_theta(wo);
        let cos_theta_i = cos_theta(wi);
        let fr = fr_dielectric(wo.dot(&wm), self.eta);
        if etap == 1.0 {
            Spectrum::new(
                self.mf_distrib.d(&wm) * self.mf_distrib.g(wo, wi) * fr
                    / (4.0 * cos_theta_i * cos_theta_o).abs(),
            )
        } else {
            let denom = sqr(wi.dot(&wm) + wo.dot(&wm) / etap) * cos_theta_i * cos_theta_o;
            let mut ft = self.mf_distrib.d(&wm)
                * (1.0 - fr)
                * self.mf_distrib.g(wo, wi)
                * (wi.dot(&wm) * wo.dot(&wm) / denom).abs();
            if mode == TransportMode::Radiance {
                ft /= sqr(etap);
            }
            Spectrum::new(ft)
        }
    }

    fn sample_f(
        &self,
        wo: &Vector3f,
        uc: Float,
        u: &Point2f,
        mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Option<BSDFSample> {
        if self.mf_distrib.effectively_specular() {
            self.sample_specular(wo, uc, mode, sample_flags)
        } else {
            self.sample_rough(wo, uc, u, mode, sample_flags)
        }
    }

    fn pdf(
        &self,
        wo: &Vector3f,
        wi: &Vector3f,
        _mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Float {
        if self.mf_distrib.effectively_specular() {
            return 0.0;
        }
        let Some((wm, etap)) = self.half_vector(wo, wi) else {
            return 0.0;
        };

        let r = fr_dielectric(wo.dot(&wm), self.eta);
        let (pr, pt) = Self::lobe_weights(r, sample_flags);
        if pr == 0.0 && pt == 0.0 {
            return 0.0;
        }

        if etap == 1.0 {
            self.mf_distrib.pdf(wo, &wm) / (4.0 * wo.abs_dot(&wm)) * pr / (pr + pt)
        } else {
            let denom = sqr(wi.dot(&wm) + wo.dot(&wm) / etap);
            let dwm_dwi = wi.abs_dot(&wm) / denom;
            self.mf_distrib.pdf(wo, &wm) * dwm_dwi * pt / (pr + pt)
        }
    }

    fn flags(&self) -> BxDFFlags {
        let lobe = if self.mf_distrib.effectively_specular() {
            BxDFFlags::SPECULAR
        } else {
            BxDFFlags::GLOSSY
        };
        BxDFFlags::REFLECTION | BxDFFlags::TRANSMISSION | lobe
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

    fn smooth_glass() -> BxDF {
        BxDF::Dielectric(DielectricBxDF::new(
            1.5,
            TrowbridgeReitzDistribution::new(0.0, 0.0),
        ))
    }

    fn rough_glass() -> BxDF {
        BxDF::Dielectric(DielectricBxDF::new(
            1.5,
            TrowbridgeReitzDistribution::new(0.3, 0.3),
        ))
    }

    #[test]
    fn unit_eta_is_nudged() {
        let bxdf = DielectricBxDF::new(1.0, TrowbridgeReitzDistribution::new(0.0, 0.0));
        assert_eq!(bxdf.eta(), 1.001);
    }

    #[test]
    fn grazing_wo_gives_no_specular_sample() {
        let wo = Vector3f::new(1.0, 0.0, 0.0);
        for uc in [0.0, 0.5, 0.999] {
            let bs = smooth_glass().sample_f(&wo, uc, &Point2f::new(0.5, 0.5), TransportMode::Radiance, BxDFReflTransFlags::ALL);
            assert!(bs.is_none());
        }
    }

    #[test]
    fn specular_pdf_is_zero_and_sample_carries_lobe_choice() {
        let bxdf = smooth_glass();
        let wo = direction(0.5, 0.3);
        let r = fr_dielectric(cos_theta(&wo), 1.5);

        let bs = bxdf
            .sample_f(&wo, 0.0, &Point2f::new(0.5, 0.5), TransportMode::Radiance, BxDFReflTransFlags::ALL)
            .unwrap();
        assert_eq!(bs.flags, BxDFFlags::SPECULAR_REFLECTION);
        assert!(approx_eq!(f32, bs.pdf, r, epsilon = 1e-6));
        assert_eq!(bxdf.pdf(&wo, &bs.wi, TransportMode::Radiance, BxDFReflTransFlags::ALL), 0.0);
        assert!(bxdf.f(&wo, &bs.wi, TransportMode::Radiance).is_black());

        let bs = bxdf
            .sample_f(&wo, 0.99, &Point2f::new(0.5, 0.5), TransportMode::Radiance, BxDFReflTransFlags::ALL)
            .unwrap();
        assert_eq!(bs.flags, BxDFFlags::SPECULAR_TRANSMISSION);
        assert!(approx_eq!(f32, bs.pdf, 1.0 - r, epsilon = 1e-6));
        assert_eq!(bs.eta, 1.5);
    }

    #[test]
    fn restricted_sampling_has_unit_pdf() {
        let bxdf = smooth_glass();
        let wo = direction(0.2, 0.0);
        let bs = bxdf
            .sample_f(&wo, 0.0, &Point2f::new(0.5, 0.5), TransportMode::Radiance, BxDFReflTransFlags::TRANSMISSION)
            .unwrap();
        assert!(bs.is_transmission());
        assert_eq!(bs.pdf, 1.0);
    }

    #[test]
    fn radiance_transmission_is_scaled_by_eta_squared() {
        let bxdf = smooth_glass();
        let wo = direction(0.4, 1.0);
        let u = Point2f::new(0.5, 0.5);
        let flags = BxDFReflTransFlags::TRANSMISSION;
        let radiance = bxdf.sample_f(&wo, 0.5, &u, TransportMode::Radiance, flags).unwrap();
        let importance = bxdf.sample_f(&wo, 0.5, &u, TransportMode::Importance, flags).unwrap();
        assert!(approx_eq!(
            f32,
            radiance.f[0] * 2.25,
            importance.f[0],
            epsilon = 1e-5
        ));
    }

    #[test]
    fn energy_is_conserved() {
        for bxdf in [smooth_glass(), rough_glass()] {
            for &theta in &[0.1, 0.7, 1.3] {
                let albedo = sampled_albedo(&bxdf, &direction(theta, 0.4), TransportMode::Radiance, 20_000);
                assert!(albedo[0] <= 1.0 + 1e-3, "{} at θ={}: {}", bxdf, theta, albedo);
            }
        }
    }

    #[test]
    fn rough_pdf_integrates_to_at_most_one() {
        let integral = integrate_pdf(&rough_glass(), &direction(0.5, 0.0), 200_000);
        assert!(integral <= 1.05, "{}", integral);
    }

    #[test]
    fn rough_sample_pdf_matches_pdf() {
        let bxdf = rough_glass();
        let wo = direction(0.6, 2.0);
        let mut rng = crate::rng::RNG::new(13);
        for _ in 0..200 {
            let uc = rng.uniform_float();
            let u = Point2f::new(rng.uniform_float(), rng.uniform_float());
            if let Some(bs) = bxdf.sample_f(&wo, uc, &u, TransportMode::Radiance, BxDFReflTransFlags::ALL) {
                let pdf = bxdf.pdf(&wo, &bs.wi, TransportMode::Radiance, BxDFReflTransFlags::ALL);
                assert!(approx_eq!(f32, bs.pdf, pdf, epsilon = 1e-3 * pdf.max(1.0)));
            }
        }
    }

    #[test]
    fn regularize_turns_specular_into_glossy() {
        let mut bxdf = smooth_glass();
        assert!(bxdf.flags().is_specular());
        bxdf.regularize();
        assert!(bxdf.flags().is_glossy());
    }

    proptest! {
        #[test]
        fn f_is_non_negative(t0 in 0.0..3.14_f32, p0 in 0.0..6.28_f32, t1 in 0.0..3.14_f32, p1 in 0.0..6.28_f32) {
            let f = rough_glass().f(&direction(t0, p0), &direction(t1, p1), TransportMode::Radiance);
            prop_assert!(f[0] >= 0.0);
        }
    }
}
