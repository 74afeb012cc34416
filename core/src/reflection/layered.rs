//! Layered BxDF
//!
//! A slab bounded by two scattering interfaces and optionally filled with
//! a scattering medium. Light transport inside the slab has no closed form,
//! so `f()`, `sample_f()` and `pdf()` are stochastic estimates computed by
//! a random walk between the interfaces. Every query seeds its own RNG from
//! a hash of its inputs, making results reproducible.

use super::*;
use crate::medium::HenyeyGreenstein;
use crate::rng::{ONE_MINUS_EPSILON, RNG};
use crate::sampling::*;

/// Dielectric coating over a diffuse base.
pub type CoatedDiffuseBxDF = LayeredBxDF<DielectricBxDF, DiffuseBxDF>;

/// Dielectric coating over a conductor.
pub type CoatedConductorBxDF = LayeredBxDF<DielectricBxDF, ConductorBxDF>;

/// Random walk controls.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LayeredBxDFConfig {
    /// Maximum number of scattering events in one walk.
    pub max_depth: usize,

    /// Number of walks averaged per query.
    pub n_samples: usize,

    /// Treat the bottom face like the top one by mirroring directions.
    pub two_sided: bool,

    /// Seed mixed into the per-query RNG.
    pub seed: i64,
}

impl Default for LayeredBxDFConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            n_samples: 1,
            two_sided: true,
            seed: 0,
        }
    }
}

/// Borrowed reference to either interface of the slab.
enum TopOrBottom<'a, T, B> {
    Top(&'a T),
    Bottom(&'a B),
}

impl<'a, T: BxDFInterface, B: BxDFInterface> TopOrBottom<'a, T, B> {
    fn f(&self, wo: &Vector3f, wi: &Vector3f, mode: TransportMode) -> Spectrum {
        match self {
            Self::Top(t) => t.f(wo, wi, mode),
            Self::Bottom(b) => b.f(wo, wi, mode),
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
        match self {
            Self::Top(t) => t.sample_f(wo, uc, u, mode, sample_flags),
            Self::Bottom(b) => b.sample_f(wo, uc, u, mode, sample_flags),
        }
    }

    fn pdf(
        &self,
        wo: &Vector3f,
        wi: &Vector3f,
        mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Float {
        match self {
            Self::Top(t) => t.pdf(wo, wi, mode, sample_flags),
            Self::Bottom(b) => b.pdf(wo, wi, mode, sample_flags),
        }
    }

    fn flags(&self) -> BxDFFlags {
        match self {
            Self::Top(t) => t.flags(),
            Self::Bottom(b) => b.flags(),
        }
    }
}

/// Returns a sample only if it is usable for continuing a walk.
#[inline]
fn usable(bs: Option<BSDFSample>) -> Option<BSDFSample> {
    bs.filter(|bs| !bs.f.is_black() && bs.pdf > 0.0 && bs.wi.z != 0.0)
}

/// Two interfaces separated by a slab of given thickness.
#[derive(Copy, Clone, Debug)]
pub struct LayeredBxDF<Top, Bottom> {
    /// Top interface.
    top: Top,

    /// Bottom interface.
    bottom: Bottom,

    /// Slab thickness.
    thickness: Float,

    /// Henyey-Greenstein asymmetry of the slab medium.
    g: Float,

    /// Single scattering albedo of the slab medium. Black means the slab
    /// neither scatters nor absorbs.
    albedo: Spectrum,

    /// Random walk controls.
    config: LayeredBxDFConfig,
}

impl<Top: BxDFInterface, Bottom: BxDFInterface> LayeredBxDF<Top, Bottom> {
    /// Create a new `LayeredBxDF`.
    ///
    /// * `top`       - Top interface.
    /// * `bottom`    - Bottom interface.
    /// * `thickness` - Slab thickness.
    /// * `albedo`    - Single scattering albedo of the slab medium.
    /// * `g`         - Henyey-Greenstein asymmetry of the slab medium.
    /// * `config`    - Random walk controls.
    pub fn new(
        top: Top,
        bottom: Bottom,
        thickness: Float,
        albedo: Spectrum,
        g: Float,
        config: LayeredBxDFConfig,
    ) -> Self {
        Self {
            top,
            bottom,
            thickness: thickness.max(Float::MIN_POSITIVE),
            g,
            albedo,
            config,
        }
    }

    /// Transmittance through the slab medium along `w` over height `dz`.
    ///
    /// * `dz` - Height difference.
    /// * `w`  - Direction.
    fn tr(dz: Float, w: &Vector3f) -> Float {
        if dz.abs() <= Float::MIN_POSITIVE {
            1.0
        } else {
            (-(dz / w.z).abs()).exp()
        }
    }

    /// Returns true if the slab medium scatters.
    fn has_medium(&self) -> bool {
        !self.albedo.is_black()
    }

    /// Returns the RNG for a query.
    ///
    /// * `wo`   - Outgoing direction.
    /// * `hash` - Hash of the remaining inputs.
    fn rng(&self, wo: &Vector3f, hash: u64) -> RNG {
        RNG::new_with_offset(hash_seeded(self.config.seed, &[wo.x, wo.y, wo.z]), hash)
    }
}

impl<Top: BxDFInterface, Bottom: BxDFInterface> BxDFInterface for LayeredBxDF<Top, Bottom> {
    fn f(&self, wo: &Vector3f, wi: &Vector3f, mode: TransportMode) -> Spectrum {
        let mut f = Spectrum::new(0.0);
        let (mut wo, mut wi) = (*wo, *wi);
        if self.config.two_sided && wo.z < 0.0 {
            wo = -wo;
            wi = -wi;
        }

        // Determine the entrance and exit interfaces.
        let entered_top = wo.z > 0.0;
        let enter_interface: TopOrBottom<Top, Bottom> = if entered_top {
            TopOrBottom::Top(&self.top)
        } else {
            TopOrBottom::Bottom(&self.bottom)
        };
        let same = same_hemisphere(&wo, &wi);
        let (exit_interface, non_exit_interface): (TopOrBottom<Top, Bottom>, TopOrBottom<Top, Bottom>) =
            if same ^ entered_top {
                (TopOrBottom::Bottom(&self.bottom), TopOrBottom::Top(&self.top))
            } else {
                (TopOrBottom::Top(&self.top), TopOrBottom::Bottom(&self.bottom))
            };
        let exit_z = if same ^ entered_top { 0.0 } else { self.thickness };
        let exit_specular = exit_interface.flags().is_specular();
        let non_exit_specular = non_exit_interface.flags().is_specular();

        // Reflection at the entrance interface.
        let n_samples = self.config.n_samples.max(1);
        if same {
            f = enter_interface.f(&wo, &wi, mode) * n_samples as Float;
        }

        let mut rng = self.rng(&wo, hash_floats(&[wi.x, wi.y, wi.z]));
        let mut r = || rng.uniform_float().min(ONE_MINUS_EPSILON);
        let phase = HenyeyGreenstein::new(self.g);

        for _ in 0..n_samples {
            // Transmission through the entrance interface.
            let uc = r();
            let u = Point2f::new(r(), r());
            let Some(wos) = usable(enter_interface.sample_f(
                &wo,
                uc,
                &u,
                mode,
                BxDFReflTransFlags::TRANSMISSION,
            )) else {
                continue;
            };

            // Direction through the exit interface used for next event
            // estimation toward `wi`.
            let uc = r();
            let u = Point2f::new(r(), r());
            let Some(wis) = usable(exit_interface.sample_f(
                &wi,
                uc,
                &u,
                !mode,
                BxDFReflTransFlags::TRANSMISSION,
            )) else {
                continue;
            };

            let mut beta = wos.f * abs_cos_theta(&wos.wi) / wos.pdf;
            let beta_exit = wis.f / wis.pdf;
            let mut z = if entered_top { self.thickness } else { 0.0 };
            let mut w = wos.wi;

            for depth in 0..self.config.max_depth {
                // Russian roulette.
                if depth > 3 && beta.max_component_value() < 0.25 {
                    let q = (1.0 - beta.max_component_value()).max(0.0);
                    if r() < q {
                        break;
                    }
                    beta /= 1.0 - q;
                }

                if self.has_medium() {
                    let sigma_t = 1.0;
                    let dz = sample_exponential(r(), sigma_t / abs_cos_theta(&w));
                    let zp = if w.z > 0.0 { z + dz } else { z - dz };
                    if zp == z {
                        continue;
                    }
                    if 0.0 < zp && zp < self.thickness {
                        // Scattering inside the slab; connect to the exit
                        // through the presampled direction.
                        let wt = if exit_specular {
                            1.0
                        } else {
                            power_heuristic(1, wis.pdf, 1, phase.p(&-w, &-wis.wi))
                        };
                        f += beta
                            * self.albedo
                            * beta_exit
                            * (phase.p(&-w, &-wis.wi) * wt * Self::tr(zp - exit_z, &wis.wi));

                        let (p, wp) = phase.sample_p(&-w, &Point2f::new(r(), r()));
                        if p == 0.0 || wp.z == 0.0 {
                            continue;
                        }
                        // The phase function is sampled exactly, so p / pdf = 1.
                        beta *= self.albedo;
                        w = wp;
                        z = zp;

                        if !exit_specular {
                            let f_exit = exit_interface.f(&-w, &wi, mode);
                            if !f_exit.is_black() {
                                let exit_pdf = exit_interface.pdf(
                                    &-w,
                                    &wi,
                                    mode,
                                    BxDFReflTransFlags::TRANSMISSION,
                                );
                                let wt = power_heuristic(1, p, 1, exit_pdf);
                                f += beta * f_exit * (Self::tr(zp - exit_z, &w) * wt);
                            }
                        }
                        continue;
                    }
                    z = clamp(zp, 0.0, self.thickness);
                } else {
                    z = if z == self.thickness { 0.0 } else { self.thickness };
                    beta *= Self::tr(self.thickness, &w);
                }

                if z == exit_z {
                    // Reflection back into the slab at the exit interface.
                    let uc = r();
                    let u = Point2f::new(r(), r());
                    let Some(bs) = usable(exit_interface.sample_f(
                        &-w,
                        uc,
                        &u,
                        mode,
                        BxDFReflTransFlags::REFLECTION,
                    )) else {
                        break;
                    };
                    beta *= bs.f * abs_cos_theta(&bs.wi) / bs.pdf;
                    w = bs.wi;
                } else {
                    if !non_exit_specular {
                        let wt = if exit_specular {
                            1.0
                        } else {
                            power_heuristic(
                                1,
                                wis.pdf,
                                1,
                                non_exit_interface.pdf(&-w, &-wis.wi, mode, BxDFReflTransFlags::ALL),
                            )
                        };
                        f += beta
                            * non_exit_interface.f(&-w, &-wis.wi, mode)
                            * beta_exit
                            * (abs_cos_theta(&wis.wi) * wt * Self::tr(self.thickness, &wis.wi));
                    }

                    let uc = r();
                    let u = Point2f::new(r(), r());
                    let Some(bs) = usable(non_exit_interface.sample_f(
                        &-w,
                        uc,
                        &u,
                        mode,
                        BxDFReflTransFlags::REFLECTION,
                    )) else {
                        break;
                    };
                    beta *= bs.f * abs_cos_theta(&bs.wi) / bs.pdf;
                    w = bs.wi;

                    if !exit_specular {
                        let f_exit = exit_interface.f(&-w, &wi, mode);
                        if !f_exit.is_black() {
                            let wt = if non_exit_specular {
                                1.0
                            } else {
                                let exit_pdf = exit_interface.pdf(
                                    &-w,
                                    &wi,
                                    mode,
                                    BxDFReflTransFlags::TRANSMISSION,
                                );
                                power_heuristic(1, bs.pdf, 1, exit_pdf)
                            };
                            f += beta * f_exit * (Self::tr(self.thickness, &bs.wi) * wt);
                        }
                    }
                }
            }
        }

        f / n_samples as Float
    }

    fn sample_f(
        &self,
        wo: &Vector3f,
        uc: Float,
        u: &Point2f,
        mode: TransportMode,
        _sample_flags: BxDFReflTransFlags,
    ) -> Option<BSDFSample> {
        let mut wo = *wo;
        let flip_wi = self.config.two_sided && wo.z < 0.0;
        if flip_wi {
            wo = -wo;
        }

        // Sample the entrance interface.
        let entered_top = wo.z > 0.0;
        let mut bs = if entered_top {
            self.top.sample_f(&wo, uc, u, mode, BxDFReflTransFlags::ALL)
        } else {
            self.bottom.sample_f(&wo, uc, u, mode, BxDFReflTransFlags::ALL)
        }?;
        if bs.f.is_black() || bs.pdf == 0.0 || bs.wi.z == 0.0 {
            return None;
        }
        if bs.is_reflection() {
            if flip_wi {
                bs.wi = -bs.wi;
            }
            return Some(bs);
        }
        let mut w = bs.wi;

        let mut rng = self.rng(&wo, hash_floats(&[uc, u.x, u.y]));
        let mut r = || rng.uniform_float().min(ONE_MINUS_EPSILON);

        let mut f = bs.f * abs_cos_theta(&bs.wi);
        let mut pdf = bs.pdf;
        let mut z = if entered_top { self.thickness } else { 0.0 };
        let phase = HenyeyGreenstein::new(self.g);

        for depth in 0..self.config.max_depth {
            // Russian roulette.
            let rr_beta = f.max_component_value() / pdf;
            if depth > 3 && rr_beta < 0.25 {
                let q = (1.0 - rr_beta).max(0.0);
                if r() < q {
                    return None;
                }
                pdf *= 1.0 - q;
            }
            if w.z == 0.0 {
                return None;
            }

            if self.has_medium() {
                let sigma_t = 1.0;
                let dz = sample_exponential(r(), sigma_t / abs_cos_theta(&w));
                let zp = if w.z > 0.0 { z + dz } else { z - dz };
                if zp == z {
                    return None;
                }
                if 0.0 < zp && zp < self.thickness {
                    let (p, wp) = phase.sample_p(&-w, &Point2f::new(r(), r()));
                    if p == 0.0 || wp.z == 0.0 {
                        return None;
                    }
                    f *= self.albedo * p;
                    pdf *= p;
                    w = wp;
                    z = zp;
                    continue;
                }
                z = clamp(zp, 0.0, self.thickness);
            } else {
                z = if z == self.thickness { 0.0 } else { self.thickness };
                f *= Self::tr(self.thickness, &w);
            }

            // Scatter at the interface the walk arrived at.
            let interface: TopOrBottom<Top, Bottom> = if z == 0.0 {
                TopOrBottom::Bottom(&self.bottom)
            } else {
                TopOrBottom::Top(&self.top)
            };
            let uc = r();
            let u = Point2f::new(r(), r());
            let bs = interface.sample_f(&-w, uc, &u, mode, BxDFReflTransFlags::ALL)?;
            if bs.f.is_black() || bs.pdf == 0.0 || bs.wi.z == 0.0 {
                return None;
            }
            f *= bs.f;
            pdf *= bs.pdf;
            w = bs.wi;

            // The walk has left the slab.
            if bs.is_transmission() {
                let flags = if same_hemisphere(&wo, &w) {
                    BxDFFlags::GLOSSY_REFLECTION
                } else {
                    BxDFFlags::GLOSSY_TRANSMISSION
                };
                if flip_wi {
                    w = -w;
                }
                let mut sample = BSDFSample::new(f, w, pdf, flags);
                sample.pdf_is_proportional = true;
                return Some(sample);
            }

            f *= abs_cos_theta(&bs.wi);
        }
        None
    }

    fn pdf(
        &self,
        wo: &Vector3f,
        wi: &Vector3f,
        mode: TransportMode,
        _sample_flags: BxDFReflTransFlags,
    ) -> Float {
        let (mut wo, mut wi) = (*wo, *wi);
        if self.config.two_sided && wo.z < 0.0 {
            wo = -wo;
            wi = -wi;
        }

        let mut rng = self.rng(&wo, hash_floats(&[wi.x, wi.y, wi.z]));
        let mut r = || rng.uniform_float().min(ONE_MINUS_EPSILON);

        let n_samples = self.config.n_samples.max(1);
        let entered_top = wo.z > 0.0;
        let same = same_hemisphere(&wo, &wi);
        let mut pdf_sum = 0.0;

        // Reflection at the entrance interface.
        if same {
            let reflection = BxDFReflTransFlags::REFLECTION;
            pdf_sum += n_samples as Float
                * if entered_top {
                    self.top.pdf(&wo, &wi, mode, reflection)
                } else {
                    self.bottom.pdf(&wo, &wi, mode, reflection)
                };
        }

        let all = BxDFReflTransFlags::ALL;
        for _ in 0..n_samples {
            if same {
                // TRT term.
                let (r_interface, t_interface): (TopOrBottom<Top, Bottom>, TopOrBottom<Top, Bottom>) =
                    if entered_top {
                        (TopOrBottom::Bottom(&self.bottom), TopOrBottom::Top(&self.top))
                    } else {
                        (TopOrBottom::Top(&self.top), TopOrBottom::Bottom(&self.bottom))
                    };

                let uc = r();
                let u = Point2f::new(r(), r());
                match usable(t_interface.sample_f(&wo, uc, &u, mode, all)) {
                    Some(wos) if !wos.is_reflection() => {
                        let uc = r();
                        let u = Point2f::new(r(), r());
                        match usable(t_interface.sample_f(&wi, uc, &u, !mode, all)) {
                            Some(wis) if !wis.is_reflection() => {
                                pdf_sum += r_interface.pdf(&-wos.wi, &-wis.wi, mode, all);
                            }
                            _ => {}
                        }
                    }
                    _ => pdf_sum += t_interface.pdf(&wo, &wi, mode, all),
                }
            } else {
                // TT term.
                let (to_interface, ti_interface): (TopOrBottom<Top, Bottom>, TopOrBottom<Top, Bottom>) =
                    if entered_top {
                        (TopOrBottom::Top(&self.top), TopOrBottom::Bottom(&self.bottom))
                    } else {
                        (TopOrBottom::Bottom(&self.bottom), TopOrBottom::Top(&self.top))
                    };

                let uc = r();
                let u = Point2f::new(r(), r());
                let Some(wos) = usable(to_interface.sample_f(&wo, uc, &u, mode, all))
                    .filter(|bs| !bs.is_reflection())
                else {
                    continue;
                };

                let uc = r();
                let u = Point2f::new(r(), r());
                let Some(wis) = usable(ti_interface.sample_f(&wi, uc, &u, !mode, all))
                    .filter(|bs| !bs.is_reflection())
                else {
                    continue;
                };

                pdf_sum += if to_interface.flags().is_specular() {
                    ti_interface.pdf(&-wos.wi, &wi, mode, all)
                } else if ti_interface.flags().is_specular() {
                    to_interface.pdf(&wo, &-wis.wi, mode, all)
                } else {
                    (to_interface.pdf(&wo, &-wis.wi, mode, all)
                        + ti_interface.pdf(&-wos.wi, &wi, mode, all))
                        / 2.0
                };
            }
        }

        // Blend with a uniform density to cover paths the estimate misses.
        lerp(0.9, INV_FOUR_PI, pdf_sum / n_samples as Float)
    }

    fn flags(&self) -> BxDFFlags {
        let top_flags = self.top.flags();
        let bottom_flags = self.bottom.flags();

        let mut flags = BxDFFlags::REFLECTION;
        if top_flags.is_specular() {
            flags |= BxDFFlags::SPECULAR;
        }

        if top_flags.is_diffuse() || bottom_flags.is_diffuse() || self.has_medium() {
            flags |= BxDFFlags::DIFFUSE;
        } else if top_flags.is_glossy() || bottom_flags.is_glossy() {
            flags |= BxDFFlags::GLOSSY;
        }

        if top_flags.is_transmissive() && bottom_flags.is_transmissive() {
            flags |= BxDFFlags::TRANSMISSION;
        }
        flags
    }

    fn regularize(&mut self) {
        self.top.regularize();
        self.bottom.regularize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::microfacet::TrowbridgeReitzDistribution;
    use crate::reflection::test_util::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    fn coated_diffuse(thickness: Float, albedo: Float, config: LayeredBxDFConfig) -> CoatedDiffuseBxDF {
        CoatedDiffuseBxDF::new(
            DielectricBxDF::new(1.5, TrowbridgeReitzDistribution::new(0.0, 0.0)),
            DiffuseBxDF::new(Spectrum::new(0.5)),
            thickness,
            Spectrum::new(albedo),
            0.0,
            config,
        )
    }

    #[test]
    fn single_bounce_is_base_attenuated_by_coating_transmittance() {
        let config = LayeredBxDFConfig {
            max_depth: 1,
            ..LayeredBxDFConfig::default()
        };
        let bxdf = coated_diffuse(1e-6, 0.0, config);
        let wo = direction(0.5, 0.0);
        let wi = direction(0.8, 2.0);

        let f = bxdf.f(&wo, &wi, TransportMode::Radiance);
        let t_o = 1.0 - fr_dielectric(cos_theta(&wo), 1.5);
        let t_i = 1.0 - fr_dielectric(cos_theta(&wi), 1.5);
        let expected = t_o * t_i * 0.5 * INV_PI / (1.5 * 1.5);
        assert!(approx_eq!(f32, f[0], expected, epsilon = 1e-4), "{} vs {}", f[0], expected);
    }

    #[test]
    fn queries_are_reproducible() {
        let bxdf = coated_diffuse(0.01, 0.3, LayeredBxDFConfig::default());
        let wo = direction(0.4, 0.1);
        let wi = direction(1.1, 2.5);
        let a = bxdf.f(&wo, &wi, TransportMode::Radiance);
        let b = bxdf.f(&wo, &wi, TransportMode::Radiance);
        assert_eq!(a.to_rgb().map(f32::to_bits), b.to_rgb().map(f32::to_bits));

        let pa = bxdf.pdf(&wo, &wi, TransportMode::Radiance, BxDFReflTransFlags::ALL);
        let pb = bxdf.pdf(&wo, &wi, TransportMode::Radiance, BxDFReflTransFlags::ALL);
        assert_eq!(pa.to_bits(), pb.to_bits());

        let u = Point2f::new(0.3, 0.6);
        let sa = bxdf.sample_f(&wo, 0.9, &u, TransportMode::Radiance, BxDFReflTransFlags::ALL);
        let sb = bxdf.sample_f(&wo, 0.9, &u, TransportMode::Radiance, BxDFReflTransFlags::ALL);
        assert_eq!(sa.map(|s| s.wi), sb.map(|s| s.wi));
    }

    #[test]
    fn different_seeds_decorrelate() {
        let a = coated_diffuse(0.01, 0.3, LayeredBxDFConfig::default());
        let b = coated_diffuse(
            0.01,
            0.3,
            LayeredBxDFConfig {
                seed: 99,
                ..LayeredBxDFConfig::default()
            },
        );
        let wo = direction(0.4, 0.1);
        let mut differs = false;
        for i in 0..16 {
            let wi = direction(0.05 * i as Float, 1.0);
            differs |= a.f(&wo, &wi, TransportMode::Radiance) != b.f(&wo, &wi, TransportMode::Radiance);
        }
        assert!(differs);
    }

    #[test]
    fn flags_follow_layers() {
        let bxdf = coated_diffuse(0.01, 0.0, LayeredBxDFConfig::default());
        assert_eq!(
            bxdf.flags(),
            BxDFFlags::REFLECTION | BxDFFlags::SPECULAR | BxDFFlags::DIFFUSE
        );

        let conductor = CoatedConductorBxDF::new(
            DielectricBxDF::new(1.5, TrowbridgeReitzDistribution::new(0.2, 0.2)),
            ConductorBxDF::new(
                TrowbridgeReitzDistribution::new(0.3, 0.3),
                Spectrum::new(0.2),
                Spectrum::new(3.0),
            ),
            0.01,
            Spectrum::new(0.0),
            0.0,
            LayeredBxDFConfig::default(),
        );
        assert_eq!(conductor.flags(), BxDFFlags::GLOSSY_REFLECTION);
    }

    #[test]
    fn samples_are_flagged_proportional() {
        let bxdf = BxDF::CoatedDiffuse(coated_diffuse(0.01, 0.0, LayeredBxDFConfig::default()));
        assert!(bxdf.pdf_is_proportional());
        let wo = direction(0.3, 0.0);
        let mut rng = RNG::new(1);
        let mut found = false;
        for _ in 0..64 {
            let uc = rng.uniform_float();
            let u = Point2f::new(rng.uniform_float(), rng.uniform_float());
            if let Some(bs) = bxdf.sample_f(&wo, uc, &u, TransportMode::Radiance, BxDFReflTransFlags::ALL) {
                assert!(bs.wi.z > 0.0);
                if !bs.is_specular() {
                    assert_eq!(bs.flags, BxDFFlags::GLOSSY_REFLECTION);
                    assert!(bs.pdf_is_proportional);
                    found = true;
                }
            }
        }
        assert!(found);
    }

    #[test]
    fn two_sided_mirrors_the_bottom() {
        let bxdf = coated_diffuse(0.01, 0.0, LayeredBxDFConfig::default());
        let wo = direction(0.4, 0.1);
        let wi = direction(1.0, 2.0);
        let top = bxdf.f(&wo, &wi, TransportMode::Radiance);
        let bottom = bxdf.f(&-wo, &-wi, TransportMode::Radiance);
        assert_eq!(top, bottom);
    }

    #[test]
    fn two_sided_samples_stay_below_for_wo_below() {
        let bxdf = coated_diffuse(0.01, 0.0, LayeredBxDFConfig::default());
        let wo = direction(0.3, 0.2);
        let mut rng = RNG::new(5);
        let (mut specular, mut glossy) = (false, false);
        for i in 0..128 {
            let uc = if i == 0 { 0.0 } else { rng.uniform_float() };
            let u = Point2f::new(rng.uniform_float(), rng.uniform_float());
            let below = bxdf.sample_f(&-wo, uc, &u, TransportMode::Radiance, BxDFReflTransFlags::ALL);
            let above = bxdf.sample_f(&wo, uc, &u, TransportMode::Radiance, BxDFReflTransFlags::ALL);
            assert_eq!(below.is_some(), above.is_some());
            if let (Some(b), Some(a)) = (below, above) {
                assert!(b.is_reflection());
                assert!(b.wi.z < 0.0, "wi {:?} left the hemisphere of wo", b.wi);
                assert_eq!(b.wi, -a.wi);
                assert_eq!(b.f, a.f);
                specular |= b.is_specular();
                glossy |= !b.is_specular();
            }
        }
        assert!(specular && glossy);
    }

    #[test]
    fn albedo_is_at_most_one() {
        let bxdf = BxDF::CoatedDiffuse(coated_diffuse(0.01, 0.0, LayeredBxDFConfig::default()));
        let wo = direction(0.6, 0.0);
        let mut rng = RNG::new(21);
        let n = 4000;
        let mut sum = 0.0;
        for _ in 0..n {
            let u = Point2f::new(rng.uniform_float(), rng.uniform_float());
            let wi = uniform_sample_sphere(&u);
            sum += bxdf.f(&wo, &wi, TransportMode::Radiance)[0] * abs_cos_theta(&wi)
                / uniform_sphere_pdf();
        }
        let albedo = sum / n as Float;
        assert!(albedo > 0.0 && albedo < 1.0, "{}", albedo);
    }

    proptest! {
        #[test]
        fn f_and_pdf_are_non_negative(t0 in 0.0..1.5_f32, p0 in 0.0..6.28_f32, t1 in 0.0..3.14_f32, p1 in 0.0..6.28_f32) {
            let bxdf = coated_diffuse(0.05, 0.4, LayeredBxDFConfig::default());
            let wo = direction(t0, p0);
            let wi = direction(t1, p1);
            let f = bxdf.f(&wo, &wi, TransportMode::Radiance);
            prop_assert!(f[0] >= 0.0);
            let pdf = bxdf.pdf(&wo, &wi, TransportMode::Radiance, BxDFReflTransFlags::ALL);
            prop_assert!(pdf >= 0.1 * INV_FOUR_PI * 0.999);
        }
    }
}
