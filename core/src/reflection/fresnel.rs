//! Fresnel Dielectrics and Conductors

use crate::pbrt::*;
use crate::spectrum::*;

/// Returns the unpolarized Fresnel reflectance at a dielectric interface.
/// A negative cosine means the incident direction is on the inside, in which
/// case `eta` is inverted.
///
/// * `cos_theta_i` - Cosine of the incident angle with the normal.
/// * `eta`         - Relative index of refraction (inside over outside).
pub fn fr_dielectric(cos_theta_i: Float, eta: Float) -> Float {
    let mut cos_theta_i = clamp(cos_theta_i, -1.0, 1.0);
    let mut eta = eta;
    if cos_theta_i < 0.0 {
        eta = 1.0 / eta;
        cos_theta_i = -cos_theta_i;
    }

    let sin2_theta_i = 1.0 - cos_theta_i * cos_theta_i;
    let sin2_theta_t = sin2_theta_i / (eta * eta);
    if sin2_theta_t >= 1.0 {
        return 1.0;
    }
    let cos_theta_t = safe_sqrt(1.0 - sin2_theta_t);

    let r_parl = (eta * cos_theta_i - cos_theta_t) / (eta * cos_theta_i + cos_theta_t);
    let r_perp = (cos_theta_i - eta * cos_theta_t) / (cos_theta_i + eta * cos_theta_t);
    (r_parl * r_parl + r_perp * r_perp) / 2.0
}

/// Returns the Fresnel reflectance of a conductor with complex index of
/// refraction `eta + i k` for one wavelength.
///
/// * `cos_theta_i` - Cosine of the incident angle with the normal.
/// * `eta`         - Real part of the relative index of refraction.
/// * `k`           - Absorption coefficient.
pub fn fr_complex(cos_theta_i: Float, eta: Float, k: Float) -> Float {
    let cos_theta_i = clamp(cos_theta_i, 0.0, 1.0);
    let cos2_theta_i = cos_theta_i * cos_theta_i;
    let sin2_theta_i = 1.0 - cos2_theta_i;
    let eta2 = eta * eta;
    let k2 = k * k;

    let t0 = eta2 - k2 - sin2_theta_i;
    let a2_plus_b2 = (t0 * t0 + 4.0 * eta2 * k2).max(0.0).sqrt();
    let t1 = a2_plus_b2 + cos2_theta_i;
    let a = (0.5 * (a2_plus_b2 + t0)).max(0.0).sqrt();
    let t2 = 2.0 * cos_theta_i * a;
    let rs = (t1 - t2) / (t1 + t2);

    let t3 = cos2_theta_i * a2_plus_b2 + sin2_theta_i * sin2_theta_i;
    let t4 = t2 * sin2_theta_i;
    let rp = rs * (t3 - t4) / (t3 + t4);

    0.5 * (rp + rs)
}

/// Returns the per-channel Fresnel reflectance of a conductor.
///
/// * `cos_theta_i` - Cosine of the incident angle with the normal.
/// * `eta`         - Real part of the relative index of refraction.
/// * `k`           - Absorption coefficient.
pub fn fr_conductor(cos_theta_i: Float, eta: &Spectrum, k: &Spectrum) -> Spectrum {
    let mut r = Spectrum::new(0.0);
    for i in 0..RGB_SAMPLES {
        r[i] = fr_complex(cos_theta_i, eta[i], k[i]);
    }
    r
}

/// Returns the first moment of the dielectric Fresnel reflectance,
/// `∫ Fr(η, cosθ) cosθ dcosθ`, from a polynomial fit.
///
/// * `eta` - Relative index of refraction.
pub fn fresnel_moment1(eta: Float) -> Float {
    let eta2 = eta * eta;
    let eta3 = eta2 * eta;
    let eta4 = eta3 * eta;
    let eta5 = eta4 * eta;
    if eta < 1.0 {
        0.45966 - 1.73965 * eta + 3.37668 * eta2 - 3.904945 * eta3 + 2.49277 * eta4
            - 0.68441 * eta5
    } else {
        -4.61686 + 11.1136 * eta - 10.4646 * eta2 + 5.11455 * eta3 - 1.27198 * eta4
            + 0.12746 * eta5
    }
}

/// Returns the second moment of the dielectric Fresnel reflectance,
/// `∫ Fr(η, cosθ) cos²θ dcosθ`, from a polynomial fit.
///
/// * `eta` - Relative index of refraction.
pub fn fresnel_moment2(eta: Float) -> Float {
    let eta2 = eta * eta;
    let eta3 = eta2 * eta;
    let eta4 = eta3 * eta;
    let eta5 = eta4 * eta;
    if eta < 1.0 {
        0.27614 - 0.87350 * eta + 1.12077 * eta2 - 0.65095 * eta3 + 0.07883 * eta4
            + 0.04860 * eta5
    } else {
        let r_eta = 1.0 / eta;
        let r_eta2 = r_eta * r_eta;
        let r_eta3 = r_eta2 * r_eta;
        -547.033 + 45.3087 * r_eta3 - 218.725 * r_eta2 + 458.843 * r_eta + 404.557 * eta
            - 189.519 * eta2
            + 54.9327 * eta3
            - 9.00603 * eta4
            + 0.63942 * eta5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    #[test]
    fn normal_incidence_on_glass() {
        // ((1.5 - 1) / (1.5 + 1))^2
        assert!(approx_eq!(f32, fr_dielectric(1.0, 1.5), 0.04, epsilon = 1e-5));
        assert!(approx_eq!(f32, fr_dielectric(-1.0, 1.5), 0.04, epsilon = 1e-5));
    }

    #[test]
    fn total_internal_reflection_from_inside() {
        assert_eq!(fr_dielectric(-0.1, 1.5), 1.0);
    }

    #[test]
    fn conductor_without_absorption_matches_dielectric() {
        for &c in &[0.2, 0.5, 0.9, 1.0] {
            assert!(approx_eq!(
                f32,
                fr_complex(c, 1.5, 0.0),
                fr_dielectric(c, 1.5),
                epsilon = 1e-4
            ));
        }
    }

    #[test]
    fn conductor_normal_incidence() {
        // ((η - 1)² + k²) / ((η + 1)² + k²)
        let (eta, k) = (0.2, 3.0);
        let expected = ((eta - 1.0) * (eta - 1.0) + k * k) / ((eta + 1.0) * (eta + 1.0) + k * k);
        let r = fr_conductor(1.0, &Spectrum::new(eta), &Spectrum::new(k));
        assert!(approx_eq!(f32, r[0], expected, epsilon = 1e-4));
    }

    #[test]
    fn first_moment_of_vacuum_is_zero() {
        assert!(fresnel_moment1(1.0).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn reflectances_are_in_unit_range(c in -1.0..1.0_f32, eta in 1.0..3.0_f32, k in 0.0..5.0_f32) {
            let r = fr_dielectric(c, eta);
            prop_assert!((0.0..=1.0).contains(&r));
            let r = fr_complex(c.abs(), eta, k);
            prop_assert!((0.0..=1.0 + 1e-5).contains(&r));
        }
    }
}
