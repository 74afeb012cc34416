//! Special functions

use super::common::*;

/// Returns the error function for a given floating point value.
///
/// * `x` - The floating point value.
pub fn erf(x: Float) -> Float {
    const A1: Float = 0.254_829_6;
    const A2: Float = -0.284_496_74;
    const A3: Float = 1.421_413_7;
    const A4: Float = -1.453_152;
    const A5: Float = 1.061_405_4;
    const P: Float = 0.327_591_1;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    // A&S formula 7.1.26.
    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - evaluate_polynomial(t, &[0.0, A1, A2, A3, A4, A5]) * (-x * x).exp();
    sign * y
}

/// Returns the inverse of the error function.
///
/// * `x` - The floating point value.
pub fn erf_inv(x: Float) -> Float {
    let x = clamp(x, -0.99999, 0.99999);
    let w = -((1.0 - x) * (1.0 + x)).ln();
    if w < 5.0 {
        let w = w - 2.5;
        let p = evaluate_polynomial(
            w,
            &[
                1.501_409_4,
                0.246_640_73,
                -0.004_177_681_6,
                -0.001_253_725,
                0.000_218_580_87,
                -4.391_506_5e-6,
                -3.523_387_7e-6,
                3.432_739_4e-7,
                2.810_226_4e-8,
            ],
        );
        p * x
    } else {
        let w = w.sqrt() - 3.0;
        let p = evaluate_polynomial(
            w,
            &[
                2.832_976_8,
                1.001_674_1,
                0.009_438_87,
                -0.007_622_461,
                0.005_739_507_7,
                -0.003_673_428_4,
                0.001_349_343_2,
                0.000_100_950_56,
                -0.000_200_214_26,
            ],
        );
        p * x
    }
}

/// Modified Bessel function of the first kind, order 0.
///
/// * `x` - The value.
pub fn i0(x: Float) -> Float {
    let mut val = 0.0;
    let mut x2i = 1.0;
    let mut ifact: i64 = 1;
    let mut i4: i64 = 1;
    // Ten terms are enough for the argument range seen by hair scattering.
    for i in 0..10 {
        if i > 1 {
            ifact *= i;
        }
        val += x2i / (i4 as Float * sqr(ifact as Float));
        x2i *= x * x;
        i4 *= 4;
    }
    val
}

/// Natural log of `i0(x)`, using an asymptotic expansion for large arguments.
///
/// * `x` - The value.
pub fn log_i0(x: Float) -> Float {
    if x > 12.0 {
        x + 0.5 * (-(TWO_PI).ln() + (1.0 / x).ln() + 1.0 / (8.0 * x))
    } else {
        i0(x).ln()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn erf_known_values() {
        assert!(approx_eq!(Float, erf(0.0), 0.0, epsilon = 1e-6));
        assert!(approx_eq!(Float, erf(1.0), 0.842_700_8, epsilon = 1e-5));
        assert!(approx_eq!(Float, erf(-1.0), -0.842_700_8, epsilon = 1e-5));
    }

    #[test]
    fn erf_inv_inverts_erf() {
        for &x in &[-0.9, -0.3, 0.0, 0.25, 0.8] {
            assert!(approx_eq!(Float, erf(erf_inv(x)), x, epsilon = 1e-3));
        }
    }

    #[test]
    fn bessel_i0() {
        assert!(approx_eq!(Float, i0(0.0), 1.0));
        assert!(approx_eq!(Float, i0(1.0), 1.266_065_9, epsilon = 1e-5));
        assert!(approx_eq!(Float, log_i0(2.0), i0(2.0).ln(), epsilon = 1e-6));
        // Asymptotic branch stays close to the series at the switch point.
        let a = 12.5;
        assert!((log_i0(a) - i0(a).ln()).abs() < 0.05);
    }
}
