//! Constant Texture

use std::sync::Arc;
use volpath_core::interaction::*;
use volpath_core::paramset::*;
use volpath_core::pbrt::*;
use volpath_core::spectrum::*;
use volpath_core::texture::*;

/// Implements a texture that returns the same value everywhere.
#[derive(Clone)]
pub struct ConstantTexture<T> {
    /// The texture value.
    value: T,
}

impl<T> ConstantTexture<T> {
    /// Create a new `ConstantTexture<T>`.
    ///
    /// * `value` - The texture value.
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T: Copy> Texture<T> for ConstantTexture<T> {
    fn evaluate(&self, _si: &SurfaceInteraction) -> T {
        self.value
    }
}

/// Returns a constant floating point texture. Used as the fallback for
/// material parameters.
///
/// * `value` - The texture value.
pub fn constant_float_texture(value: Float) -> ArcTexture<Float> {
    Arc::new(ConstantTexture::new(value))
}

/// Returns a constant spectrum texture. Used as the fallback for material
/// parameters.
///
/// * `value` - The texture value.
pub fn constant_spectrum_texture(value: Spectrum) -> ArcTexture<Spectrum> {
    Arc::new(ConstantTexture::new(value))
}

macro_rules! from_params {
    ($t: ty, $find_func: ident) => {
        impl From<&TextureParams> for ConstantTexture<$t> {
            /// Create a `ConstantTexture<$t>` from the `value` parameter.
            ///
            /// * `tp` - Texture parameters.
            fn from(tp: &TextureParams) -> Self {
                Self::new(tp.$find_func("value", 1.0.into()))
            }
        }
    };
}
from_params!(Float, find_float);
from_params!(Spectrum, find_spectrum);
