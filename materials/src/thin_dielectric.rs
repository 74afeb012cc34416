//! Thin Dielectric Material

use bumpalo::Bump;
use std::sync::Arc;
use volpath_core::interaction::*;
use volpath_core::material::*;
use volpath_core::paramset::*;
use volpath_core::pbrt::*;
use volpath_core::reflection::*;

/// A thin sheet of dielectric such as a window pane. Light is reflected or
/// passes through without being bent.
pub struct ThinDielectricMaterial {
    /// Index of refraction of the sheet.
    eta: Float,
}

impl ThinDielectricMaterial {
    /// Create a new `ThinDielectricMaterial`.
    ///
    /// * `eta` - Index of refraction of the sheet.
    pub fn new(eta: Float) -> Self {
        Self { eta }
    }
}

impl Material for ThinDielectricMaterial {
    fn compute_scattering_functions<'arena>(
        &self,
        si: &SurfaceInteraction,
        arena: &'arena Bump,
        _mode: TransportMode,
    ) -> ScatteringFunctions<'arena> {
        let bxdf = BxDF::ThinDielectric(ThinDielectricBxDF::new(self.eta));
        ScatteringFunctions::with_bsdf(arena, BSDF::new(si, bxdf))
    }
}

impl From<&TextureParams> for ThinDielectricMaterial {
    /// Create a thin dielectric material from texture parameters.
    ///
    /// * `tp` - Texture parameters.
    fn from(tp: &TextureParams) -> Self {
        Self::new(tp.find_float("eta", 1.5))
    }
}

/// Returns a reference counted `ThinDielectricMaterial`.
///
/// * `tp` - Texture parameters.
pub fn create_thin_dielectric_material(tp: &TextureParams) -> ArcMaterial {
    Arc::new(ThinDielectricMaterial::from(tp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::*;
    use volpath_core::geometry::*;

    #[test]
    fn transmission_is_straight_through() {
        let arena = Bump::new();
        let mat = ThinDielectricMaterial::from(&tex_params(ParamSet::new()));
        let sf = mat.compute_scattering_functions(&facing_up(), &arena, TransportMode::Radiance);
        let bsdf = sf.bsdf.unwrap();
        let wo = Vector3f::new(0.6, 0.0, 0.8);
        // A choice sample near 1 picks transmission.
        let bs = bsdf
            .sample_f(&wo, 0.999, &Point2f::new(0.5, 0.5), TransportMode::Radiance, BxDFReflTransFlags::ALL)
            .unwrap();
        assert!(bs.is_transmission());
        assert!((bs.wi + wo).length() < 1e-5);
    }
}
