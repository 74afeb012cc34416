//! Diffuse Material

use bumpalo::Bump;
use std::sync::Arc;
use textures::*;
use volpath_core::interaction::*;
use volpath_core::material::*;
use volpath_core::paramset::*;
use volpath_core::pbrt::*;
use volpath_core::reflection::*;
use volpath_core::spectrum::*;
use volpath_core::texture::*;

/// Implements diffuse surfaces. A non-zero `sigma` or transmittance selects
/// the Oren-Nayar model.
pub struct DiffuseMaterial {
    /// Spectral diffuse reflection.
    reflectance: ArcTexture<Spectrum>,

    /// Spectral diffuse transmission.
    transmittance: ArcTexture<Spectrum>,

    /// Standard deviation of the microfacet angle in degrees.
    sigma: ArcTexture<Float>,
}

impl DiffuseMaterial {
    /// Create a new `DiffuseMaterial`.
    ///
    /// * `reflectance`   - Spectral diffuse reflection.
    /// * `transmittance` - Spectral diffuse transmission.
    /// * `sigma`         - Standard deviation of the microfacet angle in degrees.
    pub fn new(
        reflectance: ArcTexture<Spectrum>,
        transmittance: ArcTexture<Spectrum>,
        sigma: ArcTexture<Float>,
    ) -> Self {
        Self {
            reflectance,
            transmittance,
            sigma,
        }
    }
}

impl Material for DiffuseMaterial {
    fn compute_scattering_functions<'arena>(
        &self,
        si: &SurfaceInteraction,
        arena: &'arena Bump,
        _mode: TransportMode,
    ) -> ScatteringFunctions<'arena> {
        let r = self.reflectance.evaluate(si).clamp(0.0, 1.0);
        let t = self.transmittance.evaluate(si).clamp(0.0, 1.0);
        let sigma = clamp(self.sigma.evaluate(si), 0.0, 90.0);
        let bxdf = if sigma == 0.0 && t.is_black() {
            BxDF::Diffuse(DiffuseBxDF::new(r))
        } else {
            BxDF::RoughDiffuse(RoughDiffuseBxDF::new(r, t, sigma))
        };
        ScatteringFunctions::with_bsdf(arena, BSDF::new(si, bxdf))
    }
}

impl From<&TextureParams> for DiffuseMaterial {
    /// Create a diffuse material from texture parameters.
    ///
    /// * `tp` - Texture parameters.
    fn from(tp: &TextureParams) -> Self {
        let reflectance = tp.get_spectrum_texture_or_else("reflectance", Spectrum::new(0.5), constant_spectrum_texture);
        let transmittance =
            tp.get_spectrum_texture_or_else("transmittance", Spectrum::new(0.0), constant_spectrum_texture);
        let sigma = tp.get_float_texture_or_else("sigma", 0.0, constant_float_texture);
        Self::new(reflectance, transmittance, sigma)
    }
}

/// Returns a reference counted `DiffuseMaterial`.
///
/// * `tp` - Texture parameters.
pub fn create_diffuse_material(tp: &TextureParams) -> ArcMaterial {
    Arc::new(DiffuseMaterial::from(tp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::*;
    use float_cmp::approx_eq;
    use volpath_core::geometry::*;

    #[test]
    fn lambertian_by_default() {
        let arena = Bump::new();
        let si = facing_up();
        let mat = DiffuseMaterial::from(&tex_params(ParamSet::new()));
        let sf = mat.compute_scattering_functions(&si, &arena, TransportMode::Radiance);
        let bsdf = sf.bsdf.unwrap();
        assert!(matches!(bsdf.bxdf(), BxDF::Diffuse(_)));
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let wi = Vector3f::new(0.6, 0.0, 0.8);
        let f = bsdf.f(&wo, &wi, TransportMode::Radiance);
        assert!(approx_eq!(Float, f[0], 0.5 * INV_PI, epsilon = 1e-6));
    }

    #[test]
    fn sigma_selects_oren_nayar() {
        let arena = Bump::new();
        let tp = tex_params(ParamSet::new().add_float("sigma", &[20.0]).add_rgb("reflectance", &[2.0, 0.5, 0.5]));
        let mat = DiffuseMaterial::from(&tp);
        let sf = mat.compute_scattering_functions(&facing_up(), &arena, TransportMode::Radiance);
        let bsdf = sf.bsdf.unwrap();
        assert!(matches!(bsdf.bxdf(), BxDF::RoughDiffuse(_)));
        assert!(sf.bssrdf.is_none());
    }
}
