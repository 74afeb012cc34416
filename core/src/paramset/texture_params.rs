//! Texture Parameters

use super::*;
use crate::texture::{ArcTexture, FloatTextureMap, SpectrumTextureMap};
use std::sync::Arc;

/// Material parameters together with the named textures they may refer to.
#[derive(Clone, Default)]
pub struct TextureParams {
    /// Floating point textures.
    float_textures: FloatTextureMap,

    /// Spectrum textures.
    spectrum_textures: SpectrumTextureMap,

    /// Material parameters.
    pub params: ParamSet,
}

/// Generates a function that forwards a single value lookup to the parameter
/// set.
macro_rules! texture_params_find {
    ($func: ident, $t: ty, $paramset_func: ident) => {
        pub fn $func(&self, name: &str, default: $t) -> $t {
            self.params.$paramset_func(name, default)
        }
    };
}

/// Generates a function returning a named texture, a constant texture built
/// from a value, or a constant texture built from the default.
macro_rules! texture_params_get_or_else {
    ($func: ident, $t: ty, $textures: ident, $find: ident) => {
        pub fn $func<F>(&self, name: &str, default: $t, constant_tex_fn: F) -> ArcTexture<$t>
        where
            F: Fn($t) -> ArcTexture<$t>,
        {
            let tex_name = self.params.find_one_texture(name, String::new());
            if !tex_name.is_empty() {
                return match self.$textures.get(&tex_name) {
                    Some(tex) => Arc::clone(tex),
                    None => {
                        warn!(
                            "Couldn't find texture '{}' for parameter '{}'",
                            tex_name, name
                        );
                        constant_tex_fn(default)
                    }
                };
            }

            let values = self.params.$find(name);
            if values.len() > 1 {
                warn!("Ignoring excess values provided with parameter '{}'", name);
            }
            match values.first() {
                Some(v) => constant_tex_fn(*v),
                None => constant_tex_fn(default),
            }
        }
    };
}

impl TextureParams {
    /// Create a new `TextureParams`.
    ///
    /// * `params`            - Material parameters.
    /// * `float_textures`    - Floating point textures.
    /// * `spectrum_textures` - Spectrum textures.
    pub fn new(
        params: ParamSet,
        float_textures: FloatTextureMap,
        spectrum_textures: SpectrumTextureMap,
    ) -> Self {
        Self {
            float_textures,
            spectrum_textures,
            params,
        }
    }

    /// Returns the named floating point texture if the parameter refers to
    /// one.
    ///
    /// * `name` - Parameter name.
    pub fn get_float_texture(&self, name: &str) -> Option<ArcTexture<Float>> {
        let tex_name = self.params.find_one_texture(name, String::new());
        self.float_textures.get(&tex_name).map(Arc::clone)
    }

    /// Returns the named floating point texture, or a constant texture built
    /// from the parameter's value when it has one. Returns `None` if the
    /// parameter is absent.
    ///
    /// * `name`            - Parameter name.
    /// * `constant_tex_fn` - Builds a constant texture.
    pub fn get_float_texture_or_none<F>(
        &self,
        name: &str,
        constant_tex_fn: F,
    ) -> Option<ArcTexture<Float>>
    where
        F: Fn(Float) -> ArcTexture<Float>,
    {
        self.get_float_texture(name)
            .or_else(|| self.params.find_float(name).first().map(|v| constant_tex_fn(*v)))
    }

    /// Returns the named spectrum texture, or a constant texture built from
    /// the parameter's value when it has one. Returns `None` if the
    /// parameter is absent.
    ///
    /// * `name`            - Parameter name.
    /// * `constant_tex_fn` - Builds a constant texture.
    pub fn get_spectrum_texture_or_none<F>(
        &self,
        name: &str,
        constant_tex_fn: F,
    ) -> Option<ArcTexture<Spectrum>>
    where
        F: Fn(Spectrum) -> ArcTexture<Spectrum>,
    {
        let tex_name = self.params.find_one_texture(name, String::new());
        self.spectrum_textures
            .get(&tex_name)
            .map(Arc::clone)
            .or_else(|| self.params.find_spectrum(name).first().map(|v| constant_tex_fn(*v)))
    }

    texture_params_get_or_else!(get_float_texture_or_else, Float, float_textures, find_float);
    texture_params_get_or_else!(
        get_spectrum_texture_or_else,
        Spectrum,
        spectrum_textures,
        find_spectrum
    );

    texture_params_find!(find_float, Float, find_one_float);
    texture_params_find!(find_string, String, find_one_string);
    texture_params_find!(find_int, Int, find_one_int);
    texture_params_find!(find_bool, bool, find_one_bool);
    texture_params_find!(find_spectrum, Spectrum, find_one_spectrum);
    texture_params_find!(find_vector3f, Vector3f, find_one_vector3f);
}
