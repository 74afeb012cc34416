//! Dielectric Material

use crate::Roughness;
use bumpalo::Bump;
use std::sync::Arc;
use volpath_core::interaction::*;
use volpath_core::material::*;
use volpath_core::paramset::*;
use volpath_core::pbrt::*;
use volpath_core::reflection::*;

/// Implements a smooth or rough boundary between two dielectrics such as
/// glass or water.
pub struct DielectricMaterial {
    /// Index of refraction of the interior.
    eta: Float,

    /// Microfacet roughness.
    roughness: Roughness,
}

impl DielectricMaterial {
    /// Create a new `DielectricMaterial`.
    ///
    /// * `eta`       - Index of refraction of the interior.
    /// * `roughness` - Microfacet roughness.
    pub fn new(eta: Float, roughness: Roughness) -> Self {
        Self { eta, roughness }
    }
}

impl Material for DielectricMaterial {
    fn compute_scattering_functions<'arena>(
        &self,
        si: &SurfaceInteraction,
        arena: &'arena Bump,
        _mode: TransportMode,
    ) -> ScatteringFunctions<'arena> {
        let distrib = self.roughness.distribution(si);
        let bxdf = BxDF::Dielectric(DielectricBxDF::new(self.eta, distrib));
        ScatteringFunctions::with_bsdf(arena, BSDF::new(si, bxdf))
    }
}

impl From<&TextureParams> for DielectricMaterial {
    /// Create a dielectric material from texture parameters.
    ///
    /// * `tp` - Texture parameters.
    fn from(tp: &TextureParams) -> Self {
        let eta = tp.find_float("eta", 1.5);
        Self::new(eta, Roughness::from((tp, "")))
    }
}

/// Returns a reference counted `DielectricMaterial`.
///
/// * `tp` - Texture parameters.
pub fn create_dielectric_material(tp: &TextureParams) -> ArcMaterial {
    Arc::new(DielectricMaterial::from(tp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::*;

    #[test]
    fn smooth_glass_is_specular() {
        let arena = Bump::new();
        let mat = DielectricMaterial::from(&tex_params(ParamSet::new()));
        let sf = mat.compute_scattering_functions(&facing_up(), &arena, TransportMode::Radiance);
        let flags = sf.bsdf.unwrap().flags();
        assert!(flags.is_specular());
        assert!(flags.is_reflective() && flags.is_transmissive());
    }

    #[test]
    fn rough_glass_is_glossy() {
        let arena = Bump::new();
        let mat = DielectricMaterial::from(&tex_params(ParamSet::new().add_float("roughness", &[0.3])));
        let sf = mat.compute_scattering_functions(&facing_up(), &arena, TransportMode::Radiance);
        assert!(sf.bsdf.unwrap().flags().is_glossy());
    }
}
