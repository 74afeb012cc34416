//! Coated Diffuse Material

use crate::Roughness;
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

/// Parameters of the medium between the two interfaces of a layered
/// material.
#[derive(Clone)]
pub struct SlabParams {
    /// Slab thickness.
    pub thickness: ArcTexture<Float>,

    /// Single scattering albedo of the slab medium.
    pub albedo: ArcTexture<Spectrum>,

    /// Henyey-Greenstein asymmetry of the slab medium.
    pub g: ArcTexture<Float>,

    /// Random walk controls.
    pub config: LayeredBxDFConfig,
}

impl SlabParams {
    /// Reads `thickness`, `albedo`, `g`, `maxdepth`, `nsamples` and `seed`.
    ///
    /// * `tp` - Texture parameters.
    pub fn from_params(tp: &TextureParams) -> Self {
        let max_depth = tp.find_int("maxdepth", 10).max(1) as usize;
        let n_samples = tp.find_int("nsamples", 1).max(1) as usize;
        Self {
            thickness: tp.get_float_texture_or_else("thickness", 0.01, constant_float_texture),
            albedo: tp.get_spectrum_texture_or_else("albedo", Spectrum::new(0.0), constant_spectrum_texture),
            g: tp.get_float_texture_or_else("g", 0.0, constant_float_texture),
            config: LayeredBxDFConfig {
                max_depth,
                n_samples,
                two_sided: true,
                seed: tp.find_int("seed", 0) as i64,
            },
        }
    }

    /// Evaluates `(thickness, albedo, g)` at a surface point.
    ///
    /// * `si` - The surface interaction.
    pub fn evaluate(&self, si: &SurfaceInteraction) -> (Float, Spectrum, Float) {
        (
            self.thickness.evaluate(si),
            self.albedo.evaluate(si).clamp(0.0, 1.0),
            clamp(self.g.evaluate(si), -1.0, 1.0),
        )
    }
}

/// A diffuse base under a dielectric coating, like paint or plastic.
pub struct CoatedDiffuseMaterial {
    /// Reflectance of the diffuse base.
    reflectance: ArcTexture<Spectrum>,

    /// Roughness of the coating.
    roughness: Roughness,

    /// Index of refraction of the coating.
    eta: Float,

    /// Medium between coating and base.
    slab: SlabParams,
}

impl CoatedDiffuseMaterial {
    /// Create a new `CoatedDiffuseMaterial`.
    ///
    /// * `reflectance` - Reflectance of the diffuse base.
    /// * `roughness`   - Roughness of the coating.
    /// * `eta`         - Index of refraction of the coating.
    /// * `slab`        - Medium between coating and base.
    pub fn new(reflectance: ArcTexture<Spectrum>, roughness: Roughness, eta: Float, slab: SlabParams) -> Self {
        Self {
            reflectance,
            roughness,
            eta,
            slab,
        }
    }
}

impl Material for CoatedDiffuseMaterial {
    fn compute_scattering_functions<'arena>(
        &self,
        si: &SurfaceInteraction,
        arena: &'arena Bump,
        _mode: TransportMode,
    ) -> ScatteringFunctions<'arena> {
        let r = self.reflectance.evaluate(si).clamp(0.0, 1.0);
        let distrib = self.roughness.distribution(si);
        let (thickness, albedo, g) = self.slab.evaluate(si);
        let bxdf = CoatedDiffuseBxDF::new(
            DielectricBxDF::new(self.eta, distrib),
            DiffuseBxDF::new(r),
            thickness,
            albedo,
            g,
            self.slab.config,
        );
        ScatteringFunctions::with_bsdf(arena, BSDF::new(si, BxDF::CoatedDiffuse(bxdf)))
    }
}

impl From<&TextureParams> for CoatedDiffuseMaterial {
    /// Create a coated diffuse material from texture parameters.
    ///
    /// * `tp` - Texture parameters.
    fn from(tp: &TextureParams) -> Self {
        let reflectance = tp.get_spectrum_texture_or_else("reflectance", Spectrum::new(0.5), constant_spectrum_texture);
        let eta = tp.find_float("eta", 1.5);
        Self::new(reflectance, Roughness::from((tp, "")), eta, SlabParams::from_params(tp))
    }
}

/// Returns a reference counted `CoatedDiffuseMaterial`.
///
/// * `tp` - Texture parameters.
pub fn create_coated_diffuse_material(tp: &TextureParams) -> ArcMaterial {
    Arc::new(CoatedDiffuseMaterial::from(tp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::*;
    use volpath_core::geometry::*;

    #[test]
    fn evaluation_is_reproducible() {
        let arena = Bump::new();
        let mat = CoatedDiffuseMaterial::from(&tex_params(ParamSet::new().add_int("nsamples", &[4])));
        let sf = mat.compute_scattering_functions(&facing_up(), &arena, TransportMode::Radiance);
        let bsdf = sf.bsdf.unwrap();
        let wo = Vector3f::new(0.3, 0.1, 0.9).normalize();
        let wi = Vector3f::new(-0.5, 0.2, 0.7).normalize();
        let a = bsdf.f(&wo, &wi, TransportMode::Radiance);
        let b = bsdf.f(&wo, &wi, TransportMode::Radiance);
        assert_eq!(a, b);
        assert!(!a.is_black());
        assert!(a[0] >= 0.0);
    }

    #[test]
    fn samples_carry_proportional_pdf() {
        let arena = Bump::new();
        let mat = CoatedDiffuseMaterial::from(&tex_params(ParamSet::new().add_float("roughness", &[0.2])));
        let sf = mat.compute_scattering_functions(&facing_up(), &arena, TransportMode::Radiance);
        let bsdf = sf.bsdf.unwrap();
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let mut found = false;
        for i in 0..16 {
            let u = (i as Float + 0.5) / 16.0;
            if let Some(bs) = bsdf.sample_f(&wo, u, &Point2f::new(u, 1.0 - u), TransportMode::Radiance, BxDFReflTransFlags::ALL) {
                assert!(bs.wi.z > 0.0);
                // Only walks through the slab report a proportional pdf.
                found |= bs.pdf_is_proportional;
            }
        }
        assert!(found);
    }
}
