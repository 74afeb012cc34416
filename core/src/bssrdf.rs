//! Subsurface Scattering
//!
//! Tabulated photon beam diffusion profiles and the separable BSSRDF that
//! relocates a path from its entry point to an exit point on the same object.

use crate::geometry::*;
use crate::interaction::*;
use crate::interpolation::*;
use crate::material::ArcMaterial;
use crate::medium::phase_hg;
use crate::pbrt::*;
use crate::reflection::*;
use crate::scene::Scene;
use crate::spectrum::*;
use bumpalo::collections::Vec as BumpVec;
use bumpalo::Bump;
use std::sync::Arc;

/// Number of samples used for the photon beam diffusion integral estimates.
const PBD_SAMPLES: usize = 100;

/// Radial scattering profile `Sr` tabulated over single scattering albedo and
/// optical radius.
#[derive(Clone)]
pub struct BSSRDFTable {
    /// Single scattering albedo nodes.
    rho_samples: Vec<Float>,

    /// Optical radius nodes.
    radius_samples: Vec<Float>,

    /// Profile values times `2πr`, one row per albedo node.
    profile: Vec<Float>,

    /// Running integral of each profile row.
    profile_cdf: Vec<Float>,

    /// Effective albedo of each albedo node.
    rho_eff: Vec<Float>,
}

impl BSSRDFTable {
    /// Create a new table with the profile computed by photon beam diffusion.
    ///
    /// * `n_rho_samples`    - Number of albedo nodes.
    /// * `n_radius_samples` - Number of radius nodes.
    /// * `g`                - Henyey-Greenstein asymmetry of the medium.
    /// * `eta`              - Relative index of refraction of the boundary.
    pub fn new(n_rho_samples: usize, n_radius_samples: usize, g: Float, eta: Float) -> Self {
        let mut radius_samples = vec![0.0; n_radius_samples];
        if n_radius_samples > 1 {
            radius_samples[1] = 2.5e-3;
        }
        for i in 2..n_radius_samples {
            radius_samples[i] = radius_samples[i - 1] * 1.2;
        }

        let denom = (n_rho_samples.max(2) - 1) as Float;
        let rho_samples: Vec<Float> = (0..n_rho_samples)
            .map(|i| (1.0 - (-8.0 * i as Float / denom).exp()) / (1.0 - (-8.0 as Float).exp()))
            .collect();

        let mut profile = vec![0.0; n_rho_samples * n_radius_samples];
        let mut profile_cdf = vec![0.0; n_rho_samples * n_radius_samples];
        let mut rho_eff = vec![0.0; n_rho_samples];

        for (i, &rho) in rho_samples.iter().enumerate() {
            let row = i * n_radius_samples..(i + 1) * n_radius_samples;
            for (value, &r) in profile[row.clone()].iter_mut().zip(radius_samples.iter()) {
                *value = TWO_PI
                    * r
                    * (beam_diffusion_ss(rho, 1.0 - rho, g, eta, r)
                        + beam_diffusion_ms(rho, 1.0 - rho, g, eta, r));
            }
            let (cdf, total) = integrate_catmull_rom(&radius_samples, &profile[row.clone()]);
            profile_cdf[row].copy_from_slice(&cdf);
            rho_eff[i] = total;
        }

        Self {
            rho_samples,
            radius_samples,
            profile,
            profile_cdf,
            rho_eff,
        }
    }

    /// Returns the tabulated profile value.
    ///
    /// * `rho_index`    - Albedo node.
    /// * `radius_index` - Radius node.
    pub fn eval_profile(&self, rho_index: usize, radius_index: usize) -> Float {
        self.profile[rho_index * self.radius_samples.len() + radius_index]
    }

    /// Returns the effective albedo of each albedo node.
    pub fn rho_eff(&self) -> &[Float] {
        &self.rho_eff
    }

    /// Inverts the effective albedo to find the absorption and scattering
    /// coefficients `(σa, σs)` that produce a given diffuse reflectance.
    ///
    /// * `rho_eff` - Desired effective albedo.
    /// * `mfp`     - Mean free path.
    pub fn subsurface_from_diffuse(&self, rho_eff: &Spectrum, mfp: &Spectrum) -> (Spectrum, Spectrum) {
        let mut sigma_a = Spectrum::new(0.0);
        let mut sigma_s = Spectrum::new(0.0);
        for c in 0..RGB_SAMPLES {
            let rho = invert_catmull_rom(&self.rho_samples, &self.rho_eff, rho_eff[c]);
            sigma_s[c] = rho / mfp[c];
            sigma_a[c] = (1.0 - rho) / mfp[c];
        }
        (sigma_a, sigma_s)
    }

    /// Interpolates the table at an albedo and optical radius.
    fn interpolate(&self, rho: Float, r_optical: Float) -> Option<Float> {
        let (rho_offset, rho_weights) = catmull_rom_weights(&self.rho_samples, rho)?;
        let (radius_offset, radius_weights) = catmull_rom_weights(&self.radius_samples, r_optical)?;

        let mut v = 0.0;
        for (i, &rw) in rho_weights.iter().enumerate().filter(|(_, &w)| w != 0.0) {
            for (j, &dw) in radius_weights.iter().enumerate().filter(|(_, &w)| w != 0.0) {
                v += rw
                    * dw
                    * self.eval_profile(
                        (rho_offset + i as isize) as usize,
                        (radius_offset + j as isize) as usize,
                    );
            }
        }
        Some(v)
    }

    /// Interpolates the effective albedo.
    fn interpolate_rho_eff(&self, rho: Float) -> Option<Float> {
        let (offset, weights) = catmull_rom_weights(&self.rho_samples, rho)?;
        Some(
            weights
                .iter()
                .enumerate()
                .filter(|(_, &w)| w != 0.0)
                .map(|(i, &w)| w * self.rho_eff[(offset + i as isize) as usize])
                .sum(),
        )
    }
}

/// Single scattering term of the photon beam diffusion profile.
///
/// * `sigma_s` - Scattering coefficient.
/// * `sigma_a` - Absorption coefficient.
/// * `g`       - Henyey-Greenstein asymmetry.
/// * `eta`     - Relative index of refraction.
/// * `r`       - Radius.
fn beam_diffusion_ss(sigma_s: Float, sigma_a: Float, g: Float, eta: Float, r: Float) -> Float {
    let sigma_t = sigma_a + sigma_s;
    let rho = sigma_s / sigma_t;

    // Minimum depth below the critical angle.
    let t_crit = r * safe_sqrt(eta * eta - 1.0);

    let ess: Float = (0..PBD_SAMPLES)
        .map(|i| {
            let ti = t_crit - (1.0 - (i as Float + 0.5) / PBD_SAMPLES as Float).ln() / sigma_t;
            let d = (r * r + ti * ti).sqrt();
            let cos_theta_o = ti / d;
            rho * (-sigma_t * (d + t_crit)).exp() / (d * d)
                * phase_hg(cos_theta_o, g)
                * (1.0 - fr_dielectric(-cos_theta_o, eta))
                * cos_theta_o.abs()
        })
        .sum();
    ess / PBD_SAMPLES as Float
}

/// Multiple scattering term of the photon beam diffusion profile using a
/// dipole with the non-classical diffusion coefficient.
///
/// * `sigma_s` - Scattering coefficient.
/// * `sigma_a` - Absorption coefficient.
/// * `g`       - Henyey-Greenstein asymmetry.
/// * `eta`     - Relative index of refraction.
/// * `r`       - Radius.
fn beam_diffusion_ms(sigma_s: Float, sigma_a: Float, g: Float, eta: Float, r: Float) -> Float {
    // Reduced coefficients.
    let sigmap_s = sigma_s * (1.0 - g);
    let sigmap_t = sigma_a + sigmap_s;
    let rhop = sigmap_s / sigmap_t;

    let d_g = (2.0 * sigma_a + sigmap_s) / (3.0 * sigmap_t * sigmap_t);
    let sigma_tr = safe_sqrt(sigma_a / d_g);

    // Linear extrapolation distance.
    let fm1 = fresnel_moment1(eta);
    let fm2 = fresnel_moment2(eta);
    let ze = -2.0 * d_g * (1.0 + 3.0 * fm2) / (1.0 - 2.0 * fm1);

    // Exitance scale factors.
    let c_phi = 0.25 * (1.0 - 2.0 * fm1);
    let c_e = 0.5 * (1.0 - 3.0 * fm2);

    let ed: Float = (0..PBD_SAMPLES)
        .map(|i| {
            let zr = -(1.0 - (i as Float + 0.5) / PBD_SAMPLES as Float).ln() / sigmap_t;
            let zv = -zr + 2.0 * ze;
            let dr = (r * r + zr * zr).sqrt();
            let dv = (r * r + zv * zv).sqrt();

            let phi_d = INV_FOUR_PI / d_g * ((-sigma_tr * dr).exp() / dr - (-sigma_tr * dv).exp() / dv);
            let ed_n = INV_FOUR_PI
                * (zr * (1.0 + sigma_tr * dr) * (-sigma_tr * dr).exp() / (dr * dr * dr)
                    - zv * (1.0 + sigma_tr * dv) * (-sigma_tr * dv).exp() / (dv * dv * dv));

            let e = phi_d * c_phi + ed_n * c_e;
            let kappa = 1.0 - (-2.0 * sigmap_t * (dr + zr)).exp();
            kappa * rhop * rhop * e
        })
        .sum();
    ed / PBD_SAMPLES as Float
}

/// Result of sampling the exit point of a subsurface path.
pub struct BSSRDFSample {
    /// The exit point. Its outgoing direction is the shading normal.
    pub si: SurfaceInteraction,

    /// Directional scattering at the exit point.
    pub bsdf: BSDF,

    /// Spatial profile value.
    pub sp: Spectrum,

    /// Density of choosing the exit point.
    pub pdf: Float,
}

/// Separable BSSRDF whose radial profile is interpolated from a
/// `BSSRDFTable`.
pub struct TabulatedBSSRDF {
    /// Entry point.
    po: Point3f,

    /// Time of the entry event.
    time: Float,

    /// Shading frame at the entry point.
    ns: Vector3f,
    ss: Vector3f,
    ts: Vector3f,

    /// Relative index of refraction of the boundary.
    eta: Float,

    /// Extinction coefficient.
    sigma_t: Spectrum,

    /// Single scattering albedo.
    rho: Spectrum,

    /// The tabulated profile.
    table: Arc<BSSRDFTable>,

    /// Material of the scattering object. Only exit points with this
    /// material are considered.
    material: Option<ArcMaterial>,
}

impl TabulatedBSSRDF {
    /// Create a new `TabulatedBSSRDF` at an entry point.
    ///
    /// * `po`      - The entry point.
    /// * `eta`     - Relative index of refraction of the boundary.
    /// * `sigma_a` - Absorption coefficient.
    /// * `sigma_s` - Scattering coefficient.
    /// * `table`   - The tabulated profile.
    pub fn new(
        po: &SurfaceInteraction,
        eta: Float,
        sigma_a: &Spectrum,
        sigma_s: &Spectrum,
        table: Arc<BSSRDFTable>,
    ) -> Self {
        let sigma_t = *sigma_a + *sigma_s;
        let rho = sigma_s.safe_div(&sigma_t);

        let ns = Vector3f::from(po.shading.n).normalize();
        let ss = if po.shading.dpdu.length_squared() > 0.0 {
            po.shading.dpdu.normalize()
        } else {
            coordinate_system(&ns).0
        };
        let ts = ns.cross(&ss);

        Self {
            po: po.hit.p,
            time: po.hit.time,
            ns,
            ss,
            ts,
            eta,
            sigma_t,
            rho,
            table,
            material: po.material.clone(),
        }
    }

    /// Returns the relative index of refraction of the boundary.
    pub fn eta(&self) -> Float {
        self.eta
    }

    /// Evaluates the radial profile at distance `r`.
    ///
    /// * `r` - Distance between entry and exit point.
    pub fn sr(&self, r: Float) -> Spectrum {
        let mut sr = Spectrum::new(0.0);
        for ch in 0..RGB_SAMPLES {
            let r_optical = r * self.sigma_t[ch];
            if let Some(mut v) = self.table.interpolate(self.rho[ch], r_optical) {
                // Cancel the 2πr factor stored in the table.
                if r_optical != 0.0 {
                    v /= TWO_PI * r_optical;
                }
                sr[ch] = v * self.sigma_t[ch] * self.sigma_t[ch];
            }
        }
        sr.clamp(0.0, INFINITY)
    }

    /// Evaluates the spatial term at an exit point.
    ///
    /// * `pi` - The exit point.
    pub fn sp(&self, pi: &Point3f) -> Spectrum {
        self.sr(self.po.distance(pi))
    }

    /// Samples a radius proportional to the profile of one channel. Returns
    /// `None` if the channel does not scatter.
    ///
    /// * `ch` - The channel.
    /// * `u`  - Uniform sample.
    pub fn sample_sr(&self, ch: usize, u: Float) -> Option<Float> {
        if self.sigma_t[ch] == 0.0 {
            return None;
        }
        let (r_optical, _, _) = sample_catmull_rom_2d(
            &self.table.rho_samples,
            &self.table.radius_samples,
            &self.table.profile,
            &self.table.profile_cdf,
            self.rho[ch],
            u,
        )?;
        Some(r_optical / self.sigma_t[ch])
    }

    /// Returns the density of `sample_sr()` per unit area at radius `r`.
    ///
    /// * `ch` - The channel.
    /// * `r`  - The radius.
    pub fn pdf_sr(&self, ch: usize, r: Float) -> Float {
        let r_optical = r * self.sigma_t[ch];
        let (sr, rho_eff) = match (
            self.table.interpolate(self.rho[ch], r_optical),
            self.table.interpolate_rho_eff(self.rho[ch]),
        ) {
            (Some(sr), Some(rho_eff)) => (sr, rho_eff),
            _ => return 0.0,
        };

        let sr = if r_optical != 0.0 {
            sr / (TWO_PI * r_optical)
        } else {
            sr
        };

        // A zero effective albedo yields NaN which `max` maps to zero.
        (0.0 as Float).max(sr * self.sigma_t[ch] * self.sigma_t[ch] / rho_eff)
    }

    /// Returns the combined density of all projection axes and channels used
    /// by `sample_s()` for an exit point.
    ///
    /// * `pi` - Exit point.
    /// * `ni` - Surface normal at the exit point.
    pub fn pdf_sp(&self, pi: &Point3f, ni: &Normal3f) -> Float {
        let d = self.po - *pi;
        let d_local = Vector3f::new(self.ss.dot(&d), self.ts.dot(&d), self.ns.dot(&d));
        let n_local = [self.ss.dot(ni), self.ts.dot(ni), self.ns.dot(ni)];

        let r_proj = [
            (sqr(d_local.y) + sqr(d_local.z)).sqrt(),
            (sqr(d_local.z) + sqr(d_local.x)).sqrt(),
            (sqr(d_local.x) + sqr(d_local.y)).sqrt(),
        ];

        const AXIS_PROB: [Float; 3] = [0.25, 0.25, 0.5];
        let ch_prob = 1.0 / RGB_SAMPLES as Float;
        let mut pdf = 0.0;
        for axis in 0..3 {
            for ch in 0..RGB_SAMPLES {
                pdf += self.pdf_sr(ch, r_proj[axis]) * n_local[axis].abs() * ch_prob * AXIS_PROB[axis];
            }
        }
        pdf
    }

    /// Samples an exit point by probing the scene along a chord through a
    /// sphere of radius `r_max` around the entry point. Every hit on the same
    /// material is a candidate and one is chosen uniformly.
    ///
    /// * `scene` - The scene.
    /// * `u1`    - Sample used to choose axis, channel and candidate.
    /// * `u2`    - Sample used to choose the radius and angle.
    /// * `arena` - Per-sample allocator holding the candidate hits.
    pub fn sample_s(&self, scene: &Scene, u1: Float, u2: &Point2f, arena: &Bump) -> Option<BSSRDFSample> {
        // Projection axis.
        let (vx, vy, vz, u1) = if u1 < 0.5 {
            (self.ss, self.ts, self.ns, u1 * 2.0)
        } else if u1 < 0.75 {
            (self.ts, self.ns, self.ss, (u1 - 0.5) * 4.0)
        } else {
            (self.ns, self.ss, self.ts, (u1 - 0.75) * 4.0)
        };

        // Channel.
        let ch = clamp((u1 * RGB_SAMPLES as Float) as usize, 0, RGB_SAMPLES - 1);
        let u1 = u1 * RGB_SAMPLES as Float - ch as Float;

        let r = self.sample_sr(ch, u2[0])?;
        if r < 0.0 {
            return None;
        }
        let phi = TWO_PI * u2[1];

        let r_max = self.sample_sr(ch, 0.999)?;
        if r >= r_max {
            return None;
        }
        let l = 2.0 * (r_max * r_max - r * r).sqrt();

        // Chord through the sphere.
        let p_start = self.po + r * (vx * phi.cos() + vy * phi.sin()) - vz * (l * 0.5);
        let p_target = p_start + vz * l;

        let mut chain: BumpVec<SurfaceInteraction> = BumpVec::new_in(arena);
        let mut base = Hit::new(
            p_start,
            self.time,
            Vector3f::zero(),
            Vector3f::zero(),
            Normal3f::zero(),
            None,
        );
        loop {
            let mut ray = base.spawn_ray_to_point(&p_target);
            if ray.d.is_zero() {
                break;
            }
            match scene.intersect(&mut ray) {
                Some(si) => {
                    base = si.hit.clone();
                    if same_material(&si.material, &self.material) {
                        chain.push(si);
                    }
                }
                None => break,
            }
        }

        if chain.is_empty() {
            return None;
        }
        let n_found = chain.len();
        let idx = clamp((u1 * n_found as Float) as usize, 0, n_found - 1);
        let mut si = chain.swap_remove(idx);

        let pdf = self.pdf_sp(&si.hit.p, &si.hit.n) / n_found as Float;
        let sp = self.sp(&si.hit.p);
        if sp.is_black() || pdf == 0.0 {
            return None;
        }

        si.hit.wo = Vector3f::from(si.shading.n);
        let bsdf = BSDF::new(&si, BxDF::BSSRDFAdapter(BSSRDFAdapterBxDF::new(self.eta)));
        Some(BSSRDFSample { si, bsdf, sp, pdf })
    }
}

/// Returns true if both materials refer to the same instance.
fn same_material(a: &Option<ArcMaterial>, b: &Option<ArcMaterial>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const (),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    lazy_static! {
        static ref TABLE: Arc<BSSRDFTable> = Arc::new(BSSRDFTable::new(100, 64, 0.0, 1.33));
    }

    fn entry_point() -> SurfaceInteraction {
        SurfaceInteraction::new(
            Point3f::zero(),
            Vector3f::zero(),
            Point2f::new(0.5, 0.5),
            Vector3f::new(0.0, 0.0, 1.0),
            Vector3f::new(1.0, 0.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
            0.0,
            false,
        )
    }

    fn bssrdf(rho: Float) -> TabulatedBSSRDF {
        TabulatedBSSRDF::new(
            &entry_point(),
            1.33,
            &Spectrum::new(1.0 - rho),
            &Spectrum::new(rho),
            Arc::clone(&TABLE),
        )
    }

    #[test]
    fn effective_albedo_grows_with_albedo() {
        let rho_eff = TABLE.rho_eff();
        assert_eq!(rho_eff[0], 0.0);
        assert!(rho_eff.windows(2).all(|w| w[1] >= w[0]));
        let last = rho_eff[rho_eff.len() - 1];
        assert!(last.is_finite() && last > 0.3, "{}", last);
    }

    #[test]
    fn diffuse_inversion_preserves_mean_free_path() {
        let mfp = Spectrum::rgb(0.5, 1.0, 2.0);
        let (sigma_a, sigma_s) = TABLE.subsurface_from_diffuse(&Spectrum::new(0.4), &mfp);
        for c in 0..RGB_SAMPLES {
            assert!(approx_eq!(Float, sigma_a[c] + sigma_s[c], 1.0 / mfp[c], epsilon = 1e-4));
            assert!(sigma_s[c] > 0.0 && sigma_a[c] > 0.0);
        }
    }

    #[test]
    fn radial_pdf_integrates_to_one() {
        let b = bssrdf(0.8);
        let nodes = &TABLE.radius_samples;
        let mut total = 0.0;
        for w in nodes.windows(2) {
            let steps = 16;
            let h = (w[1] - w[0]) / steps as Float;
            for k in 0..steps {
                let r0 = w[0] + h * k as Float;
                let r1 = r0 + h;
                let f0 = b.pdf_sr(0, r0) * TWO_PI * r0;
                let f1 = b.pdf_sr(0, r1) * TWO_PI * r1;
                total += 0.5 * (f0 + f1) * h;
            }
        }
        assert!(approx_eq!(Float, total, 1.0, epsilon = 0.05), "{}", total);
    }

    #[test]
    fn radius_sampling_is_monotonic() {
        let b = bssrdf(0.6);
        let r1 = b.sample_sr(1, 0.25).unwrap();
        let r2 = b.sample_sr(1, 0.5).unwrap();
        let r3 = b.sample_sr(1, 0.999).unwrap();
        assert!(0.0 <= r1 && r1 <= r2 && r2 <= r3);
    }

    #[test]
    fn non_scattering_channel_cannot_be_sampled() {
        let b = TabulatedBSSRDF::new(
            &entry_point(),
            1.33,
            &Spectrum::rgb(0.0, 0.5, 0.5),
            &Spectrum::rgb(0.0, 0.5, 0.5),
            Arc::clone(&TABLE),
        );
        assert!(b.sample_sr(0, 0.5).is_none());
        assert!(b.sr(0.1)[0] == 0.0);
    }

    proptest! {
        #[test]
        fn profile_is_non_negative(rho in 0.0..1.0f32, r in 0.0..10.0f32) {
            let b = bssrdf(rho);
            let sr = b.sr(r);
            prop_assert!(sr[0] >= 0.0 && sr[1] >= 0.0 && sr[2] >= 0.0);
            prop_assert!(b.pdf_sr(0, r) >= 0.0);
        }
    }
}
