//! RGB Spectrum

use crate::pbrt::*;
use std::fmt;
use std::ops::{
    Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign,
};

/// Number of samples in an RGB spectrum.
pub const RGB_SAMPLES: usize = 3;

/// A spectral power distribution stored as linear RGB coefficients.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RGBSpectrum {
    /// Red, green and blue coefficients.
    c: [Float; RGB_SAMPLES],
}

impl RGBSpectrum {
    /// Creates a spectrum with a constant value in every channel.
    ///
    /// * `v` - The value.
    pub const fn new(v: Float) -> Self {
        Self { c: [v; RGB_SAMPLES] }
    }

    /// Creates a spectrum from red, green and blue values.
    ///
    /// * `r` - Red.
    /// * `g` - Green.
    /// * `b` - Blue.
    pub const fn rgb(r: Float, g: Float, b: Float) -> Self {
        Self { c: [r, g, b] }
    }

    /// Returns the RGB coefficients.
    pub fn to_rgb(&self) -> [Float; RGB_SAMPLES] {
        self.c
    }

    /// Returns true if every channel is zero.
    pub fn is_black(&self) -> bool {
        self.c.iter().all(|&v| v == 0.0)
    }

    /// Returns true if any channel is NaN.
    pub fn has_nans(&self) -> bool {
        self.c.iter().any(|v| v.is_nan())
    }

    /// Returns true if any channel is infinite.
    pub fn has_infs(&self) -> bool {
        self.c.iter().any(|v| v.is_infinite())
    }

    /// Returns the luminance (CIE Y) of the spectrum.
    pub fn y(&self) -> Float {
        0.212671 * self.c[0] + 0.715160 * self.c[1] + 0.072169 * self.c[2]
    }

    /// Returns the largest channel value.
    pub fn max_component_value(&self) -> Float {
        self.c[0].max(self.c[1]).max(self.c[2])
    }

    /// Returns the average of the channels.
    pub fn average(&self) -> Float {
        self.c.iter().sum::<Float>() / RGB_SAMPLES as Float
    }

    /// Applies a function to each channel.
    ///
    /// * `f` - The function.
    pub fn map<F: Fn(Float) -> Float>(&self, f: F) -> Self {
        Self {
            c: [f(self.c[0]), f(self.c[1]), f(self.c[2])],
        }
    }

    /// Returns the channel-wise square root.
    pub fn sqrt(&self) -> Self {
        self.map(|v| v.sqrt())
    }

    /// Returns the channel-wise exponential.
    pub fn exp(&self) -> Self {
        self.map(|v| v.exp())
    }

    /// Clamps every channel to [low, high].
    ///
    /// * `low`  - Lower bound.
    /// * `high` - Upper bound.
    pub fn clamp(&self, low: Float, high: Float) -> Self {
        self.map(|v| clamp(v, low, high))
    }

    /// Divides channel-wise, returning 0 wherever the divisor is 0.
    ///
    /// * `d` - The divisor.
    pub fn safe_div(&self, d: &Self) -> Self {
        let mut r = *self;
        for i in 0..RGB_SAMPLES {
            r.c[i] = if d.c[i] != 0.0 { self.c[i] / d.c[i] } else { 0.0 };
        }
        r
    }
}

impl From<Float> for RGBSpectrum {
    fn from(v: Float) -> Self {
        Self::new(v)
    }
}

impl Index<usize> for RGBSpectrum {
    type Output = Float;

    fn index(&self, i: usize) -> &Self::Output {
        &self.c[i]
    }
}

impl IndexMut<usize> for RGBSpectrum {
    fn index_mut(&mut self, i: usize) -> &mut Self::Output {
        &mut self.c[i]
    }
}

macro_rules! channel_op {
    ($tr: ident, $f: ident, $tra: ident, $fa: ident, $op: tt) => {
        impl $tr for RGBSpectrum {
            type Output = Self;

            fn $f(self, other: Self) -> Self::Output {
                Self::rgb(
                    self.c[0] $op other.c[0],
                    self.c[1] $op other.c[1],
                    self.c[2] $op other.c[2],
                )
            }
        }

        impl $tr<Float> for RGBSpectrum {
            type Output = Self;

            fn $f(self, f: Float) -> Self::Output {
                Self::rgb(self.c[0] $op f, self.c[1] $op f, self.c[2] $op f)
            }
        }

        impl $tra for RGBSpectrum {
            fn $fa(&mut self, other: Self) {
                *self = *self $op other;
            }
        }

        impl $tra<Float> for RGBSpectrum {
            fn $fa(&mut self, f: Float) {
                *self = *self $op f;
            }
        }
    };
}
channel_op!(Add, add, AddAssign, add_assign, +);
channel_op!(Sub, sub, SubAssign, sub_assign, -);
channel_op!(Mul, mul, MulAssign, mul_assign, *);
channel_op!(Div, div, DivAssign, div_assign, /);

impl Mul<RGBSpectrum> for Float {
    type Output = RGBSpectrum;

    fn mul(self, s: RGBSpectrum) -> Self::Output {
        s * self
    }
}

impl Neg for RGBSpectrum {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.map(|v| -v)
    }
}

impl fmt::Display for RGBSpectrum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.c[0], self.c[1], self.c[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn white_has_unit_luminance() {
        assert!(approx_eq!(Float, RGBSpectrum::new(1.0).y(), 1.0, epsilon = 1e-5));
    }

    #[test]
    fn safe_div_guards_zero_channels() {
        let a = RGBSpectrum::rgb(1.0, 2.0, 3.0);
        let d = RGBSpectrum::rgb(2.0, 0.0, 1.0);
        assert_eq!(a.safe_div(&d), RGBSpectrum::rgb(0.5, 0.0, 3.0));
    }

    #[test]
    fn arithmetic_is_channel_wise() {
        let a = RGBSpectrum::rgb(1.0, 2.0, 3.0);
        let b = RGBSpectrum::rgb(0.5, 0.5, 2.0);
        assert_eq!(a * b, RGBSpectrum::rgb(0.5, 1.0, 6.0));
        assert_eq!(2.0 * a - a, a);
        assert_eq!(a.max_component_value(), 3.0);
        assert!(!a.is_black());
        assert!(RGBSpectrum::new(0.0).is_black());
    }
}
