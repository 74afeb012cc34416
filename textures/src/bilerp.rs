//! Bilinear Interpolation Texture

use std::ops::{Add, Mul};
use std::sync::Arc;
use volpath_core::error::*;
use volpath_core::interaction::*;
use volpath_core::paramset::*;
use volpath_core::pbrt::*;
use volpath_core::spectrum::*;
use volpath_core::texture::*;

/// Implements a texture that bilinearly interpolates among four constant values.
#[derive(Clone)]
pub struct BilerpTexture<T> {
    /// Value at (0, 0).
    v00: T,

    /// Value at (0, 1).
    v01: T,

    /// Value at (1, 0).
    v10: T,

    /// Value at (1, 1).
    v11: T,

    /// 2D mapping.
    mapping: ArcTextureMapping2D,
}

impl<T: Copy> BilerpTexture<T> {
    /// Create a new `BilerpTexture<T>`.
    ///
    /// * `v00`     - Value at (0, 0).
    /// * `v01`     - Value at (0, 1).
    /// * `v10`     - Value at (1, 0).
    /// * `v11`     - Value at (1, 1).
    /// * `mapping` - 2D mapping.
    pub fn new(v00: T, v01: T, v10: T, v11: T, mapping: ArcTextureMapping2D) -> Self {
        Self {
            v00,
            v01,
            v10,
            v11,
            mapping,
        }
    }
}

impl<T> Texture<T> for BilerpTexture<T>
where
    T: Copy + Add<Output = T> + Mul<Float, Output = T>,
{
    fn evaluate(&self, si: &SurfaceInteraction) -> T {
        let st = self.mapping.map(si);
        let (s, t) = (st.x, st.y);
        self.v00 * ((1.0 - s) * (1.0 - t))
            + self.v01 * ((1.0 - s) * t)
            + self.v10 * (s * (1.0 - t))
            + self.v11 * (s * t)
    }
}

macro_rules! from_params {
    ($t: ty, $find_func: ident) => {
        impl From<(&TextureParams, &ErrorReporter)> for BilerpTexture<$t> {
            /// Create a `BilerpTexture<$t>` from texture parameters.
            ///
            /// * `p` - Tuple containing texture parameters and the error
            ///         reporter used for an unknown mapping.
            fn from(p: (&TextureParams, &ErrorReporter)) -> Self {
                let (tp, reporter) = p;
                let map = get_texture_mapping_2d(tp, reporter);
                Self::new(
                    tp.$find_func("v00", 0.0.into()),
                    tp.$find_func("v01", 1.0.into()),
                    tp.$find_func("v10", 0.0.into()),
                    tp.$find_func("v11", 1.0.into()),
                    map,
                )
            }
        }
    };
}
from_params!(Float, find_float);
from_params!(Spectrum, find_spectrum);

/// Returns a reference counted floating point `BilerpTexture`.
///
/// * `tp`       - Texture parameters.
/// * `reporter` - Error reporter.
pub fn create_bilerp_float_texture(tp: &TextureParams, reporter: &ErrorReporter) -> ArcTexture<Float> {
    Arc::new(BilerpTexture::<Float>::from((tp, reporter)))
}

/// Returns a reference counted spectrum `BilerpTexture`.
///
/// * `tp`       - Texture parameters.
/// * `reporter` - Error reporter.
pub fn create_bilerp_spectrum_texture(tp: &TextureParams, reporter: &ErrorReporter) -> ArcTexture<Spectrum> {
    Arc::new(BilerpTexture::<Spectrum>::from((tp, reporter)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;
    use volpath_core::geometry::*;

    fn si_at(s: Float, t: Float) -> SurfaceInteraction {
        let mut si = SurfaceInteraction::default();
        si.uv = Point2f::new(s, t);
        si
    }

    #[test]
    fn corners_and_defaults() {
        let reporter = ErrorReporter::new(true);
        let tp = TextureParams::new(ParamSet::new(), Default::default(), Default::default());
        let tex = BilerpTexture::<Float>::from((&tp, &reporter));
        assert!(approx_eq!(Float, tex.evaluate(&si_at(0.0, 0.0)), 0.0));
        assert!(approx_eq!(Float, tex.evaluate(&si_at(0.0, 1.0)), 1.0));
        assert!(approx_eq!(Float, tex.evaluate(&si_at(0.7, 0.25)), 0.25));
        assert!(reporter.last_message().is_none());
    }

    #[test]
    fn unknown_mapping_is_an_error() {
        let reporter = ErrorReporter::new(true);
        let tp = TextureParams::new(
            ParamSet::new().add_string("mapping", "cube"),
            Default::default(),
            Default::default(),
        );
        let tex = BilerpTexture::<Float>::from((&tp, &reporter));
        assert!(reporter.last_message().is_some());
        assert!(approx_eq!(Float, tex.evaluate(&si_at(0.0, 0.5)), 0.5));
    }

    proptest! {
        #[test]
        fn stays_within_corner_values(s in 0.0..1.0 as Float, t in 0.0..1.0 as Float) {
            let tex = BilerpTexture::new(
                Spectrum::new(0.2),
                Spectrum::new(0.4),
                Spectrum::new(0.6),
                Spectrum::new(0.8),
                Arc::new(UVMapping2D::default()),
            );
            let v = tex.evaluate(&si_at(s, t))[0];
            prop_assert!((0.2 - 1e-5..=0.8 + 1e-5).contains(&v));
        }
    }
}
