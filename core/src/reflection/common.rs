//! Common

use crate::geometry::*;
use crate::pbrt::*;

/// Returns cos(θ) of a direction in the shading frame.
///
/// * `w` - The direction.
#[inline]
pub fn cos_theta(w: &Vector3f) -> Float {
    w.z
}

/// Returns cos²(θ) of a direction in the shading frame.
///
/// * `w` - The direction.
#[inline]
pub fn cos2_theta(w: &Vector3f) -> Float {
    w.z * w.z
}

/// Returns |cos(θ)| of a direction in the shading frame.
///
/// * `w` - The direction.
#[inline]
pub fn abs_cos_theta(w: &Vector3f) -> Float {
    w.z.abs()
}

/// Returns sin²(θ) of a direction in the shading frame.
///
/// * `w` - The direction.
#[inline]
pub fn sin2_theta(w: &Vector3f) -> Float {
    (1.0 - cos2_theta(w)).max(0.0)
}

/// Returns sin(θ) of a direction in the shading frame.
///
/// * `w` - The direction.
#[inline]
pub fn sin_theta(w: &Vector3f) -> Float {
    sin2_theta(w).sqrt()
}

/// Returns tan²(θ) of a direction in the shading frame.
///
/// * `w` - The direction.
#[inline]
pub fn tan2_theta(w: &Vector3f) -> Float {
    sin2_theta(w) / cos2_theta(w)
}

/// Returns cos(φ) of a direction in the shading frame.
///
/// * `w` - The direction.
#[inline]
pub fn cos_phi(w: &Vector3f) -> Float {
    let sin_theta = sin_theta(w);
    if sin_theta == 0.0 {
        1.0
    } else {
        clamp(w.x / sin_theta, -1.0, 1.0)
    }
}

/// Returns sin(φ) of a direction in the shading frame.
///
/// * `w` - The direction.
#[inline]
pub fn sin_phi(w: &Vector3f) -> Float {
    let sin_theta = sin_theta(w);
    if sin_theta == 0.0 {
        0.0
    } else {
        clamp(w.y / sin_theta, -1.0, 1.0)
    }
}

/// Returns the cosine of the angle between the azimuths of two directions.
///
/// * `wa` - First direction.
/// * `wb` - Second direction.
#[inline]
pub fn cos_d_phi(wa: &Vector3f, wb: &Vector3f) -> Float {
    let waxy = wa.x * wa.x + wa.y * wa.y;
    let wbxy = wb.x * wb.x + wb.y * wb.y;
    if waxy == 0.0 || wbxy == 0.0 {
        1.0
    } else {
        clamp(
            (wa.x * wb.x + wa.y * wb.y) / (waxy * wbxy).sqrt(),
            -1.0,
            1.0,
        )
    }
}

/// Returns true if both directions lie in the same hemisphere of the shading
/// frame.
///
/// * `w`  - First direction.
/// * `wp` - Second direction.
#[inline]
pub fn same_hemisphere(w: &Vector3f, wp: &Vector3f) -> bool {
    w.z * wp.z > 0.0
}

/// Reflects `wo` about `n`.
///
/// * `wo` - The direction.
/// * `n`  - The normal.
#[inline]
pub fn reflect(wo: &Vector3f, n: &Vector3f) -> Vector3f {
    -(*wo) + *n * (2.0 * wo.dot(n))
}

/// Refracts `wi` through an interface with normal `n` and relative index of
/// refraction `eta` (inside over outside). A direction below the interface
/// is handled by inverting `eta` and flipping `n`. Returns the relative
/// index of refraction actually used and the transmitted direction, or
/// `None` on total internal reflection.
///
/// * `wi`  - Incident direction.
/// * `n`   - The normal.
/// * `eta` - Relative index of refraction.
pub fn refract(wi: &Vector3f, n: &Vector3f, eta: Float) -> Option<(Float, Vector3f)> {
    let mut n = *n;
    let mut eta = eta;
    let mut cos_theta_i = n.dot(wi);
    if cos_theta_i < 0.0 {
        eta = 1.0 / eta;
        cos_theta_i = -cos_theta_i;
        n = -n;
    }

    let sin2_theta_i = (1.0 - cos_theta_i * cos_theta_i).max(0.0);
    let sin2_theta_t = sin2_theta_i / (eta * eta);
    if sin2_theta_t >= 1.0 {
        return None;
    }

    let cos_theta_t = safe_sqrt(1.0 - sin2_theta_t);
    let wt = -(*wi) / eta + n * (cos_theta_i / eta - cos_theta_t);
    Some((eta, wt))
}

/// Returns `v` flipped if needed to lie in the hemisphere of `n`.
///
/// * `v` - The vector.
/// * `n` - Reference direction.
#[inline]
pub fn face_forward(v: &Vector3f, n: &Vector3f) -> Vector3f {
    if v.dot(n) < 0.0 {
        -(*v)
    } else {
        *v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    #[test]
    fn total_internal_reflection() {
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let wi = Vector3f::new(0.9, 0.0, -(1.0 - 0.81_f32).sqrt());
        // Grazing from inside glass exceeds the critical angle.
        assert!(refract(&wi, &n, 1.5).is_none());
    }

    proptest! {
        #[test]
        fn refract_obeys_snell(theta in 0.01..1.5_f32, phi in 0.0..6.28_f32, eta in 1.1..2.0_f32) {
            let wi = spherical_direction(theta.sin(), theta.cos(), phi);
            let n = Vector3f::new(0.0, 0.0, 1.0);
            let (etap, wt) = refract(&wi, &n, eta).unwrap();
            prop_assert!(approx_eq!(f32, etap, eta));
            prop_assert!(approx_eq!(f32, wt.length(), 1.0, epsilon = 1e-4));
            prop_assert!(wt.z < 0.0);
            prop_assert!(approx_eq!(f32, sin_theta(&wi), eta * sin_theta(&wt), epsilon = 1e-4));
        }

        #[test]
        fn reflect_preserves_angle(theta in 0.0..1.5_f32, phi in 0.0..6.28_f32) {
            let wo = spherical_direction(theta.sin(), theta.cos(), phi);
            let wi = reflect(&wo, &Vector3f::new(0.0, 0.0, 1.0));
            prop_assert!(approx_eq!(f32, wi.z, wo.z, epsilon = 1e-6));
            prop_assert!(approx_eq!(f32, wi.x, -wo.x, epsilon = 1e-6));
        }
    }
}
