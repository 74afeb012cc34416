//! Sampling functions.

use crate::geometry::*;
use crate::pbrt::*;

/// Uniformly sample a direction on the unit sphere.
///
/// * `u` - The random sample point.
pub fn uniform_sample_sphere(u: &Point2f) -> Vector3f {
    let z = 1.0 - 2.0 * u[0];
    let r = safe_sqrt(1.0 - z * z);
    let phi = TWO_PI * u[1];
    Vector3f::new(r * phi.cos(), r * phi.sin(), z)
}

/// Returns the PDF for uniformly sampling a direction from a sphere.
#[inline]
pub fn uniform_sphere_pdf() -> Float {
    INV_FOUR_PI
}

/// Maps a uniform sample to a point on the unit disk with the concentric
/// mapping, which keeps strata adjacent.
///
/// * `u` - The random sample point.
pub fn concentric_sample_disk(u: &Point2f) -> Point2f {
    let ux = 2.0 * u.x - 1.0;
    let uy = 2.0 * u.y - 1.0;
    if ux == 0.0 && uy == 0.0 {
        return Point2f::new(0.0, 0.0);
    }

    let (r, theta) = if ux.abs() > uy.abs() {
        (ux, PI_OVER_FOUR * (uy / ux))
    } else {
        (uy, PI_OVER_TWO - PI_OVER_FOUR * (ux / uy))
    };
    Point2f::new(r * theta.cos(), r * theta.sin())
}

/// Cosine-weighted hemisphere sampling using Malley's method.
///
/// * `u` - The random sample point.
pub fn cosine_sample_hemisphere(u: &Point2f) -> Vector3f {
    let d = concentric_sample_disk(u);
    let z = safe_sqrt(1.0 - d.x * d.x - d.y * d.y);
    Vector3f::new(d.x, d.y, z)
}

/// Returns the PDF for cosine-weighted hemisphere sampling.
///
/// * `cos_theta` - Cosine of the angle with the z-axis.
#[inline]
pub fn cosine_hemisphere_pdf(cos_theta: Float) -> Float {
    cos_theta * INV_PI
}

/// Returns the PDF for uniform cone sampling.
///
/// * `cos_theta_max` - Cosine of the cone half angle.
#[inline]
pub fn uniform_cone_pdf(cos_theta_max: Float) -> Float {
    1.0 / (TWO_PI * (1.0 - cos_theta_max))
}

/// Power heuristic for multiple importance sampling.
///
/// * `nf`    - Number of samples taken with the first strategy.
/// * `f_pdf` - PDF of the first strategy.
/// * `ng`    - Number of samples taken with the second strategy.
/// * `g_pdf` - PDF of the second strategy.
#[inline]
pub fn power_heuristic(nf: Int, f_pdf: Float, ng: Int, g_pdf: Float) -> Float {
    let f = nf as Float * f_pdf;
    let g = ng as Float * g_pdf;
    if f.is_infinite() {
        return 1.0;
    }
    let denom = f * f + g * g;
    if denom == 0.0 {
        0.0
    } else {
        (f * f) / denom
    }
}

/// Samples the exponential distribution `a * exp(-a * x)`.
///
/// * `u` - Uniform sample in [0, 1).
/// * `a` - Rate parameter.
#[inline]
pub fn sample_exponential(u: Float, a: Float) -> Float {
    -(1.0 - u).ln() / a
}

/// Logistic distribution with scale `s`, normalized over (-∞, ∞).
///
/// * `x` - The value.
/// * `s` - Scale.
#[inline]
pub fn logistic(x: Float, s: Float) -> Float {
    let x = x.abs();
    (-x / s).exp() / (s * sqr(1.0 + (-x / s).exp()))
}

/// CDF of the logistic distribution.
///
/// * `x` - The value.
/// * `s` - Scale.
#[inline]
pub fn logistic_cdf(x: Float, s: Float) -> Float {
    1.0 / (1.0 + (-x / s).exp())
}

/// Logistic distribution restricted to [a, b] and renormalized.
///
/// * `x` - The value.
/// * `s` - Scale.
/// * `a` - Lower bound.
/// * `b` - Upper bound.
#[inline]
pub fn trimmed_logistic(x: Float, s: Float, a: Float, b: Float) -> Float {
    logistic(x, s) / (logistic_cdf(b, s) - logistic_cdf(a, s))
}

/// Samples the trimmed logistic distribution by inverting its CDF.
///
/// * `u` - Uniform sample.
/// * `s` - Scale.
/// * `a` - Lower bound.
/// * `b` - Upper bound.
pub fn sample_trimmed_logistic(u: Float, s: Float, a: Float, b: Float) -> Float {
    let k = logistic_cdf(b, s) - logistic_cdf(a, s);
    let x = -s * (1.0 / (u * k + logistic_cdf(a, s)) - 1.0).ln();
    clamp(x, a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    #[test]
    fn power_heuristic_weights_sum_to_one() {
        let a = power_heuristic(1, 0.3, 1, 0.9);
        let b = power_heuristic(1, 0.9, 1, 0.3);
        assert!(approx_eq!(Float, a + b, 1.0, epsilon = 1e-6));
        assert_eq!(power_heuristic(1, 0.0, 1, 0.0), 0.0);
        assert_eq!(power_heuristic(1, INFINITY, 1, 1.0), 1.0);
    }

    #[test]
    fn trimmed_logistic_integrates_to_one() {
        let (a, b, s) = (-PI, PI, 0.4);
        let n = 20000;
        let dx = (b - a) / n as Float;
        let sum: Float = (0..n)
            .map(|i| trimmed_logistic(a + (i as Float + 0.5) * dx, s, a, b) * dx)
            .sum();
        assert!(approx_eq!(Float, sum, 1.0, epsilon = 1e-3));
    }

    #[test]
    fn exponential_sample_mean() {
        let n = 10000;
        let a = 2.0;
        let mean: Float = (0..n)
            .map(|i| sample_exponential((i as Float + 0.5) / n as Float, a))
            .sum::<Float>()
            / n as Float;
        assert!(approx_eq!(Float, mean, 1.0 / a, epsilon = 1e-2));
    }

    proptest! {
        #[test]
        fn cosine_samples_lie_on_upper_hemisphere(u0 in 0.0..1.0f32, u1 in 0.0..1.0f32) {
            let w = cosine_sample_hemisphere(&Point2f::new(u0, u1));
            prop_assert!(w.z >= 0.0);
            prop_assert!(approx_eq!(Float, w.length(), 1.0, epsilon = 1e-4));
        }

        #[test]
        fn sphere_samples_are_unit(u0 in 0.0..1.0f32, u1 in 0.0..1.0f32) {
            let w = uniform_sample_sphere(&Point2f::new(u0, u1));
            prop_assert!(approx_eq!(Float, w.length(), 1.0, epsilon = 1e-4));
        }

        #[test]
        fn trimmed_logistic_samples_stay_in_range(u in 0.0..1.0f32, s in 0.05..2.0f32) {
            let x = sample_trimmed_logistic(u, s, -PI, PI);
            prop_assert!((-PI..=PI).contains(&x));
        }
    }
}
