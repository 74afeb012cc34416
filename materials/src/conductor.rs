//! Conductor Material

use crate::Roughness;
use bumpalo::Bump;
use std::sync::Arc;
use textures::*;
use volpath_core::interaction::*;
use volpath_core::material::*;
use volpath_core::paramset::*;
use volpath_core::reflection::*;
use volpath_core::spectrum::*;
use volpath_core::texture::*;

/// Real part of the index of refraction of copper.
pub const COPPER_ETA: Spectrum = Spectrum::rgb(0.200438, 0.924033, 1.102212);

/// Absorption coefficient of copper.
pub const COPPER_K: Spectrum = Spectrum::rgb(3.912949, 2.452848, 2.142188);

/// How the complex index of refraction of a conductor is specified.
#[derive(Clone)]
pub enum ConductorSpec {
    /// Index of refraction and absorption coefficient.
    EtaK(ArcTexture<Spectrum>, ArcTexture<Spectrum>),

    /// Normal incidence reflectance, converted to an absorption coefficient
    /// with unit `eta`.
    Reflectance(ArcTexture<Spectrum>),
}

impl ConductorSpec {
    /// Returns `(eta, k)` at a surface point.
    ///
    /// * `si` - The surface interaction.
    pub fn eta_k(&self, si: &SurfaceInteraction) -> (Spectrum, Spectrum) {
        match self {
            Self::EtaK(eta, k) => (eta.evaluate(si), k.evaluate(si)),
            Self::Reflectance(r) => {
                // Avoid r = 1 which needs an infinite k.
                let r = r.evaluate(si).clamp(0.0, 0.9999);
                let k = 2.0 * r.sqrt() / (Spectrum::new(1.0) - r).sqrt();
                (Spectrum::new(1.0), k)
            }
        }
    }

    /// Reads `<prefix>reflectance` if present, otherwise `<prefix>eta` and
    /// `<prefix>k` with copper as the default.
    ///
    /// * `tp`     - Texture parameters.
    /// * `prefix` - Parameter name prefix.
    pub fn from_params(tp: &TextureParams, prefix: &str) -> Self {
        match tp.get_spectrum_texture_or_none(&format!("{}reflectance", prefix), constant_spectrum_texture) {
            Some(r) => Self::Reflectance(r),
            None => Self::EtaK(
                tp.get_spectrum_texture_or_else(&format!("{}eta", prefix), COPPER_ETA, constant_spectrum_texture),
                tp.get_spectrum_texture_or_else(&format!("{}k", prefix), COPPER_K, constant_spectrum_texture),
            ),
        }
    }
}

/// Implements metals, smooth or rough.
pub struct ConductorMaterial {
    /// Complex index of refraction.
    spec: ConductorSpec,

    /// Microfacet roughness.
    roughness: Roughness,
}

impl ConductorMaterial {
    /// Create a new `ConductorMaterial`.
    ///
    /// * `spec`      - Complex index of refraction.
    /// * `roughness` - Microfacet roughness.
    pub fn new(spec: ConductorSpec, roughness: Roughness) -> Self {
        Self { spec, roughness }
    }
}

impl Material for ConductorMaterial {
    fn compute_scattering_functions<'arena>(
        &self,
        si: &SurfaceInteraction,
        arena: &'arena Bump,
        _mode: TransportMode,
    ) -> ScatteringFunctions<'arena> {
        let (eta, k) = self.spec.eta_k(si);
        let distrib = self.roughness.distribution(si);
        let bxdf = BxDF::Conductor(ConductorBxDF::new(distrib, eta, k));
        ScatteringFunctions::with_bsdf(arena, BSDF::new(si, bxdf))
    }
}

impl From<&TextureParams> for ConductorMaterial {
    /// Create a conductor material from texture parameters.
    ///
    /// * `tp` - Texture parameters.
    fn from(tp: &TextureParams) -> Self {
        Self::new(ConductorSpec::from_params(tp, ""), Roughness::from((tp, "")))
    }
}

/// Returns a reference counted `ConductorMaterial`.
///
/// * `tp` - Texture parameters.
pub fn create_conductor_material(tp: &TextureParams) -> ArcMaterial {
    Arc::new(ConductorMaterial::from(tp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::*;
    use float_cmp::approx_eq;
    use volpath_core::geometry::*;
    use volpath_core::pbrt::*;

    #[test]
    fn reflectance_round_trips_at_normal_incidence() {
        let arena = Bump::new();
        let tp = tex_params(ParamSet::new().add_rgb("reflectance", &[0.9, 0.5, 0.1]));
        let mat = ConductorMaterial::from(&tp);
        let sf = mat.compute_scattering_functions(&facing_up(), &arena, TransportMode::Radiance);
        let bsdf = sf.bsdf.unwrap();
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let bs = bsdf
            .sample_f(&wo, 0.5, &Point2f::new(0.5, 0.5), TransportMode::Radiance, BxDFReflTransFlags::ALL)
            .unwrap();
        assert!(bs.is_specular());
        let r = bs.f * abs_cos_theta(&Vector3f::new(0.0, 0.0, 1.0)) / bs.pdf;
        assert!(approx_eq!(Float, r[0], 0.9, epsilon = 1e-3));
        assert!(approx_eq!(Float, r[1], 0.5, epsilon = 1e-3));
        assert!(approx_eq!(Float, r[2], 0.1, epsilon = 1e-3));
    }

    #[test]
    fn copper_by_default() {
        let tp = tex_params(ParamSet::new());
        let (eta, k) = ConductorSpec::from_params(&tp, "").eta_k(&facing_up());
        assert_eq!(eta[1], COPPER_ETA[1]);
        assert_eq!(k[0], COPPER_K[0]);
    }
}
