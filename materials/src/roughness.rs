//! Microfacet Roughness Parameters

use textures::*;
use volpath_core::interaction::*;
use volpath_core::microfacet::*;
use volpath_core::paramset::*;
use volpath_core::pbrt::*;
use volpath_core::texture::*;

/// Anisotropic roughness textures shared by the microfacet based materials.
#[derive(Clone)]
pub struct Roughness {
    /// Roughness along the u direction.
    u: ArcTexture<Float>,

    /// Roughness along the v direction.
    v: ArcTexture<Float>,

    /// Map roughness in [0, 1] to microfacet α.
    remap: bool,
}

impl Roughness {
    /// Create a new `Roughness`.
    ///
    /// * `u`     - Roughness along the u direction.
    /// * `v`     - Roughness along the v direction.
    /// * `remap` - Map roughness in [0, 1] to microfacet α.
    pub fn new(u: ArcTexture<Float>, v: ArcTexture<Float>, remap: bool) -> Self {
        Self { u, v, remap }
    }

    /// Returns the microfacet distribution at a surface point.
    ///
    /// * `si` - The surface interaction.
    pub fn distribution(&self, si: &SurfaceInteraction) -> TrowbridgeReitzDistribution {
        let mut u = self.u.evaluate(si);
        let mut v = self.v.evaluate(si);
        if self.remap {
            u = TrowbridgeReitzDistribution::roughness_to_alpha(u);
            v = TrowbridgeReitzDistribution::roughness_to_alpha(v);
        }
        TrowbridgeReitzDistribution::new(u, v)
    }
}

impl From<(&TextureParams, &str)> for Roughness {
    /// Reads `<prefix>roughness` and the optional anisotropic overrides
    /// `<prefix>uroughness` and `<prefix>vroughness`.
    ///
    /// * `p` - Texture parameters and parameter name prefix.
    fn from(p: (&TextureParams, &str)) -> Self {
        let (tp, prefix) = p;
        let rough = tp.get_float_texture_or_else(&format!("{}roughness", prefix), 0.0, constant_float_texture);
        let u = tp
            .get_float_texture_or_none(&format!("{}uroughness", prefix), constant_float_texture)
            .unwrap_or_else(|| rough.clone());
        let v = tp
            .get_float_texture_or_none(&format!("{}vroughness", prefix), constant_float_texture)
            .unwrap_or(rough);
        let remap = tp.find_bool("remaproughness", true);
        Self::new(u, v, remap)
    }
}
