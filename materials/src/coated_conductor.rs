//! Coated Conductor Material

use crate::{ConductorSpec, Roughness, SlabParams};
use bumpalo::Bump;
use std::sync::Arc;
use volpath_core::interaction::*;
use volpath_core::material::*;
use volpath_core::paramset::*;
use volpath_core::pbrt::*;
use volpath_core::reflection::*;

/// A metal base under a dielectric coating.
pub struct CoatedConductorMaterial {
    /// Roughness of the coating.
    interface_roughness: Roughness,

    /// Index of refraction of the coating.
    interface_eta: Float,

    /// Complex index of refraction of the base.
    conductor: ConductorSpec,

    /// Roughness of the base.
    conductor_roughness: Roughness,

    /// Medium between coating and base.
    slab: SlabParams,
}

impl CoatedConductorMaterial {
    /// Create a new `CoatedConductorMaterial`.
    ///
    /// * `interface_roughness` - Roughness of the coating.
    /// * `interface_eta`       - Index of refraction of the coating.
    /// * `conductor`           - Complex index of refraction of the base.
    /// * `conductor_roughness` - Roughness of the base.
    /// * `slab`                - Medium between coating and base.
    pub fn new(
        interface_roughness: Roughness,
        interface_eta: Float,
        conductor: ConductorSpec,
        conductor_roughness: Roughness,
        slab: SlabParams,
    ) -> Self {
        Self {
            interface_roughness,
            interface_eta,
            conductor,
            conductor_roughness,
            slab,
        }
    }
}

impl Material for CoatedConductorMaterial {
    fn compute_scattering_functions<'arena>(
        &self,
        si: &SurfaceInteraction,
        arena: &'arena Bump,
        _mode: TransportMode,
    ) -> ScatteringFunctions<'arena> {
        let interface = DielectricBxDF::new(self.interface_eta, self.interface_roughness.distribution(si));

        // The base sits below the coating, so its index is relative to it.
        let (ce, ck) = self.conductor.eta_k(si);
        let ce = ce / self.interface_eta;
        let ck = ck / self.interface_eta;
        let conductor = ConductorBxDF::new(self.conductor_roughness.distribution(si), ce, ck);

        let (thickness, albedo, g) = self.slab.evaluate(si);
        let bxdf = CoatedConductorBxDF::new(interface, conductor, thickness, albedo, g, self.slab.config);
        ScatteringFunctions::with_bsdf(arena, BSDF::new(si, BxDF::CoatedConductor(bxdf)))
    }
}

impl From<&TextureParams> for CoatedConductorMaterial {
    /// Create a coated conductor material from texture parameters. Coating
    /// parameters use the `interface.` prefix and base parameters the
    /// `conductor.` prefix.
    ///
    /// * `tp` - Texture parameters.
    fn from(tp: &TextureParams) -> Self {
        Self::new(
            Roughness::from((tp, "interface.")),
            tp.find_float("interface.eta", 1.5),
            ConductorSpec::from_params(tp, "conductor."),
            Roughness::from((tp, "conductor.")),
            SlabParams::from_params(tp),
        )
    }
}

/// Returns a reference counted `CoatedConductorMaterial`.
///
/// * `tp` - Texture parameters.
pub fn create_coated_conductor_material(tp: &TextureParams) -> ArcMaterial {
    Arc::new(CoatedConductorMaterial::from(tp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::*;
    use volpath_core::geometry::*;

    #[test]
    fn rough_base_reflects_without_transmission() {
        let arena = Bump::new();
        let tp = tex_params(
            ParamSet::new()
                .add_float("conductor.roughness", &[0.3])
                .add_rgb("conductor.reflectance", &[0.8, 0.6, 0.2]),
        );
        let mat = CoatedConductorMaterial::from(&tp);
        let sf = mat.compute_scattering_functions(&facing_up(), &arena, TransportMode::Radiance);
        let bsdf = sf.bsdf.unwrap();
        let wo = Vector3f::new(0.2, 0.0, 0.9).normalize();
        let below = Vector3f::new(0.1, 0.1, -0.9).normalize();
        assert!(bsdf.f(&wo, &below, TransportMode::Radiance).is_black());
        let above = Vector3f::new(-0.2, 0.1, 0.9).normalize();
        let f = bsdf.f(&wo, &above, TransportMode::Radiance);
        assert!(f[0] > 0.0);
    }
}
