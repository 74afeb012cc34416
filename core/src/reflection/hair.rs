//! Hair Scattering Model
//!
//! Hair fibers are modeled as dielectric cylinders with an absorbing
//! interior. Scattering is split into lobes by the number of internal path
//! segments `p`: R (p = 0), TT (p = 1), TRT (p = 2) and the sum of all
//! longer paths. Each lobe factors into a longitudinal term `Mp`, an
//! attenuation `Ap` and an azimuthal term `Np`.
//!
//! The local frame has the x-axis along the fiber and the y-z plane as the
//! normal plane.

use super::*;
use crate::rng::ONE_MINUS_EPSILON;
use crate::sampling::*;

/// Number of explicitly modeled lobes; longer paths share one lobe.
const P_MAX: usize = 3;

/// Eumelanin absorption coefficients.
const EUMELANIN_SIGMA_A: Spectrum = Spectrum::rgb(0.419, 0.697, 1.37);

/// Pheomelanin absorption coefficients.
const PHEOMELANIN_SIGMA_A: Spectrum = Spectrum::rgb(0.187, 0.4, 1.05);

/// Scattering from a single hair fiber.
#[derive(Copy, Clone, Debug, Default)]
pub struct HairBxDF {
    /// Offset along the fiber width in [-1, 1] where the ray hit.
    h: Float,

    /// Index of refraction of the fiber interior.
    eta: Float,

    /// Absorption coefficient of the fiber interior.
    sigma_a: Spectrum,

    /// Azimuthal logistic scale.
    s: Float,

    /// Longitudinal variance per lobe.
    v: [Float; P_MAX + 1],

    /// sin(2^k α) for the cuticle tilt α.
    sin_2k_alpha: [Float; 3],

    /// cos(2^k α) for the cuticle tilt α.
    cos_2k_alpha: [Float; 3],
}

impl HairBxDF {
    /// Create a new `HairBxDF`.
    ///
    /// * `h`       - Offset across the fiber in [-1, 1].
    /// * `eta`     - Index of refraction of the fiber interior.
    /// * `sigma_a` - Absorption coefficient of the fiber interior.
    /// * `beta_m`  - Longitudinal roughness in [0, 1].
    /// * `beta_n`  - Azimuthal roughness in [0, 1].
    /// * `alpha`   - Cuticle scale tilt in degrees.
    pub fn new(h: Float, eta: Float, sigma_a: Spectrum, beta_m: Float, beta_n: Float, alpha: Float) -> Self {
        let mut v = [0.0; P_MAX + 1];
        v[0] = sqr(0.726 * beta_m + 0.812 * sqr(beta_m) + 3.7 * beta_m.powi(20));
        v[1] = 0.25 * v[0];
        v[2] = 4.0 * v[0];
        for p in 3..=P_MAX {
            v[p] = v[2];
        }

        let s = SQRT_PI_OVER_EIGHT * (0.265 * beta_n + 1.194 * sqr(beta_n) + 5.372 * beta_n.powi(22));

        let mut sin_2k_alpha = [0.0; 3];
        let mut cos_2k_alpha = [0.0; 3];
        sin_2k_alpha[0] = radians(alpha).sin();
        cos_2k_alpha[0] = safe_sqrt(1.0 - sqr(sin_2k_alpha[0]));
        for i in 1..3 {
            sin_2k_alpha[i] = 2.0 * cos_2k_alpha[i - 1] * sin_2k_alpha[i - 1];
            cos_2k_alpha[i] = sqr(cos_2k_alpha[i - 1]) - sqr(sin_2k_alpha[i - 1]);
        }

        Self {
            h: clamp(h, -1.0, 1.0),
            eta,
            sigma_a,
            s,
            v,
            sin_2k_alpha,
            cos_2k_alpha,
        }
    }

    /// Returns the absorption coefficient for given melanin concentrations.
    ///
    /// * `ce` - Eumelanin concentration.
    /// * `cp` - Pheomelanin concentration.
    pub fn sigma_a_from_concentration(ce: Float, cp: Float) -> Spectrum {
        EUMELANIN_SIGMA_A * ce + PHEOMELANIN_SIGMA_A * cp
    }

    /// Returns the absorption coefficient that produces approximately the
    /// given diffuse reflectance for an azimuthal roughness.
    ///
    /// * `c`      - Desired reflectance.
    /// * `beta_n` - Azimuthal roughness.
    pub fn sigma_a_from_reflectance(c: &Spectrum, beta_n: Float) -> Spectrum {
        let denom = 5.969 - 0.215 * beta_n + 2.532 * sqr(beta_n) - 10.73 * beta_n.powi(3)
            + 5.574 * beta_n.powi(4)
            + 0.245 * beta_n.powi(5);
        c.map(|v| sqr(v.max(1e-6).ln() / denom))
    }

    /// Returns sin(θo) and cos(θo) rotated by the cuticle tilt for lobe `p`.
    ///
    /// * `p`           - Lobe.
    /// * `sin_theta_o` - sin(θo).
    /// * `cos_theta_o` - cos(θo).
    fn tilt(&self, p: usize, sin_theta_o: Float, cos_theta_o: Float) -> (Float, Float) {
        let (s, c) = match p {
            0 => (
                sin_theta_o * self.cos_2k_alpha[1] - cos_theta_o * self.sin_2k_alpha[1],
                cos_theta_o * self.cos_2k_alpha[1] + sin_theta_o * self.sin_2k_alpha[1],
            ),
            1 => (
                sin_theta_o * self.cos_2k_alpha[0] + cos_theta_o * self.sin_2k_alpha[0],
                cos_theta_o * self.cos_2k_alpha[0] - sin_theta_o * self.sin_2k_alpha[0],
            ),
            2 => (
                sin_theta_o * self.cos_2k_alpha[2] + cos_theta_o * self.sin_2k_alpha[2],
                cos_theta_o * self.cos_2k_alpha[2] - sin_theta_o * self.sin_2k_alpha[2],
            ),
            _ => (sin_theta_o, cos_theta_o),
        };
        (s, c.abs())
    }

    /// Returns the transmittance along one internal segment and γt.
    ///
    /// * `sin_theta_o` - sin(θo).
    /// * `cos_theta_o` - cos(θo).
    fn transmittance(&self, sin_theta_o: Float, cos_theta_o: Float) -> (Spectrum, Float) {
        let sin_theta_t = sin_theta_o / self.eta;
        let cos_theta_t = safe_sqrt(1.0 - sqr(sin_theta_t));
        let etap = safe_sqrt(sqr(self.eta) - sqr(sin_theta_o)) / cos_theta_o;
        let sin_gamma_t = self.h / etap;
        let cos_gamma_t = safe_sqrt(1.0 - sqr(sin_gamma_t));
        let gamma_t = safe_asin(sin_gamma_t);
        let t = (-self.sigma_a * (2.0 * cos_gamma_t / cos_theta_t)).exp();
        (t, gamma_t)
    }

    /// Returns the attenuation of every lobe.
    ///
    /// * `cos_theta_o` - cos(θo).
    /// * `t`           - Transmittance of one internal segment.
    fn ap(&self, cos_theta_o: Float, t: &Spectrum) -> [Spectrum; P_MAX + 1] {
        let cos_gamma_o = safe_sqrt(1.0 - sqr(self.h));
        let cos_theta = cos_theta_o * cos_gamma_o;
        let f = fr_dielectric(cos_theta, self.eta);

        let mut ap = [Spectrum::new(0.0); P_MAX + 1];
        ap[0] = Spectrum::new(f);
        ap[1] = *t * sqr(1.0 - f);
        for p in 2..P_MAX {
            ap[p] = ap[p - 1] * *t * f;
        }
        // Sum of the geometric series of the remaining paths.
        let tf = *t * f;
        ap[P_MAX] = (ap[P_MAX - 1] * tf).safe_div(&(Spectrum::new(1.0) - tf));
        ap
    }

    /// Returns the discrete probability of sampling each lobe.
    ///
    /// * `cos_theta_o` - cos(θo).
    fn ap_pdf(&self, cos_theta_o: Float) -> [Float; P_MAX + 1] {
        let sin_theta_o = safe_sqrt(1.0 - sqr(cos_theta_o));
        let (t, _) = self.transmittance(sin_theta_o, cos_theta_o);
        let ap = self.ap(cos_theta_o, &t);

        let sum: Float = ap.iter().map(|a| a.average()).sum();
        let mut pdf = [0.0; P_MAX + 1];
        if sum > 0.0 {
            for (p, a) in ap.iter().enumerate() {
                pdf[p] = a.average() / sum;
            }
        } else {
            pdf[0] = 1.0;
        }
        pdf
    }

    /// Returns the azimuthal term for lobe `p`.
    ///
    /// * `phi`     - Azimuthal difference between `wi` and `wo`.
    /// * `p`       - Lobe.
    /// * `gamma_o` - γo.
    /// * `gamma_t` - γt.
    fn np(&self, phi: Float, p: usize, gamma_o: Float, gamma_t: Float) -> Float {
        let mut dphi = phi - big_phi(p, gamma_o, gamma_t);
        // Remap to [-π, π].
        while dphi > PI {
            dphi -= TWO_PI;
        }
        while dphi < -PI {
            dphi += TWO_PI;
        }
        trimmed_logistic(dphi, self.s, -PI, PI)
    }

    /// Evaluates the sum of lobes weighted by `weights`.
    fn lobe_sum<W: Fn(usize) -> Spectrum>(&self, wo: &Vector3f, wi: &Vector3f, weights: W) -> Spectrum {
        let sin_theta_o = wo.x;
        let cos_theta_o = safe_sqrt(1.0 - sqr(sin_theta_o));
        let phi_o = wo.z.atan2(wo.y);
        let gamma_o = safe_asin(self.h);

        let sin_theta_i = wi.x;
        let cos_theta_i = safe_sqrt(1.0 - sqr(sin_theta_i));
        let phi_i = wi.z.atan2(wi.y);

        let (_, gamma_t) = self.transmittance(sin_theta_o, cos_theta_o);
        let phi = phi_i - phi_o;

        let mut sum = Spectrum::new(0.0);
        for p in 0..P_MAX {
            let (sin_theta_op, cos_theta_op) = self.tilt(p, sin_theta_o, cos_theta_o);
            sum += weights(p)
                * (mp(cos_theta_i, cos_theta_op, sin_theta_i, sin_theta_op, self.v[p])
                    * self.np(phi, p, gamma_o, gamma_t));
        }
        sum += weights(P_MAX)
            * (mp(cos_theta_i, cos_theta_o, sin_theta_i, sin_theta_o, self.v[P_MAX]) * INV_TWO_PI);
        sum
    }
}

/// Returns the net azimuthal deflection of lobe `p`.
///
/// * `p`       - Lobe.
/// * `gamma_o` - γo.
/// * `gamma_t` - γt.
#[inline]
fn big_phi(p: usize, gamma_o: Float, gamma_t: Float) -> Float {
    let p = p as Float;
    2.0 * p * gamma_t - 2.0 * gamma_o + p * PI
}

/// Longitudinal scattering function.
///
/// * `cos_theta_i` - cos(θi).
/// * `cos_theta_o` - cos(θo).
/// * `sin_theta_i` - sin(θi).
/// * `sin_theta_o` - sin(θo).
/// * `v`           - Variance.
fn mp(cos_theta_i: Float, cos_theta_o: Float, sin_theta_i: Float, sin_theta_o: Float, v: Float) -> Float {
    let a = cos_theta_i * cos_theta_o / v;
    let b = sin_theta_i * sin_theta_o / v;
    if v <= 0.1 {
        (log_i0(a) - b - 1.0 / v + 0.6931 + (1.0 / (2.0 * v)).ln()).exp()
    } else {
        ((-b).exp() * i0(a)) / ((1.0 / v).sinh() * 2.0 * v)
    }
}

impl BxDFInterface for HairBxDF {
    fn f(&self, wo: &Vector3f, wi: &Vector3f, _mode: TransportMode) -> Spectrum {
        let cos_theta_o = safe_sqrt(1.0 - sqr(wo.x));
        let (t, _) = self.transmittance(wo.x, cos_theta_o);
        let ap = self.ap(cos_theta_o, &t);

        let mut f = self.lobe_sum(wo, wi, |p| ap[p]);
        if abs_cos_theta(wi) > 0.0 {
            f /= abs_cos_theta(wi);
        }
        f
    }

    fn sample_f(
        &self,
        wo: &Vector3f,
        uc: Float,
        u: &Point2f,
        mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Option<BSDFSample> {
        if !sample_flags.contains(BxDFReflTransFlags::REFLECTION) {
            return None;
        }

        let sin_theta_o = wo.x;
        let cos_theta_o = safe_sqrt(1.0 - sqr(sin_theta_o));
        let phi_o = wo.z.atan2(wo.y);
        let gamma_o = safe_asin(self.h);

        // Choose a lobe and remap `uc` for reuse.
        let ap_pdf = self.ap_pdf(cos_theta_o);
        let mut uc = uc;
        let mut p = P_MAX;
        for (i, pdf) in ap_pdf.iter().enumerate().take(P_MAX) {
            if uc < *pdf {
                p = i;
                break;
            }
            uc -= pdf;
        }
        let uc = if ap_pdf[p] > 0.0 {
            (uc / ap_pdf[p]).min(ONE_MINUS_EPSILON)
        } else {
            0.0
        };

        // Sample Mp for θi.
        let (sin_theta_op, cos_theta_op) = self.tilt(p, sin_theta_o, cos_theta_o);
        let u0 = u[0].max(1e-5);
        let cos_theta = 1.0 + self.v[p] * (u0 + (1.0 - u0) * (-2.0 / self.v[p]).exp()).ln();
        let sin_theta = safe_sqrt(1.0 - sqr(cos_theta));
        let cos_phi = (TWO_PI * u[1]).cos();
        let sin_theta_i = -cos_theta * sin_theta_op + sin_theta * cos_phi * cos_theta_op;
        let cos_theta_i = safe_sqrt(1.0 - sqr(sin_theta_i));

        // Sample Np for Δφ.
        let (_, gamma_t) = self.transmittance(sin_theta_o, cos_theta_o);
        let dphi = if p < P_MAX {
            big_phi(p, gamma_o, gamma_t) + sample_trimmed_logistic(uc, self.s, -PI, PI)
        } else {
            TWO_PI * uc
        };
        let phi_i = phi_o + dphi;
        let wi = Vector3f::new(sin_theta_i, cos_theta_i * phi_i.cos(), cos_theta_i * phi_i.sin());

        let pdf = self.lobe_sum(wo, &wi, |p| Spectrum::new(ap_pdf[p]))[0];
        Some(BSDFSample::new(
            self.f(wo, &wi, mode),
            wi,
            pdf,
            self.flags(),
        ))
    }

    fn pdf(
        &self,
        wo: &Vector3f,
        wi: &Vector3f,
        _mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Float {
        if !sample_flags.contains(BxDFReflTransFlags::REFLECTION) {
            return 0.0;
        }
        let cos_theta_o = safe_sqrt(1.0 - sqr(wo.x));
        let ap_pdf = self.ap_pdf(cos_theta_o);
        self.lobe_sum(wo, wi, |p| Spectrum::new(ap_pdf[p]))[0]
    }

    fn flags(&self) -> BxDFFlags {
        BxDFFlags::GLOSSY_REFLECTION
    }

    fn regularize(&mut self) {}
}
