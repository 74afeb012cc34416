//! Subsurface Material

use crate::Roughness;
use bumpalo::Bump;
use std::sync::Arc;
use textures::*;
use volpath_core::bssrdf::*;
use volpath_core::interaction::*;
use volpath_core::material::*;
use volpath_core::paramset::*;
use volpath_core::pbrt::*;
use volpath_core::reflection::*;
use volpath_core::spectrum::*;
use volpath_core::texture::*;

/// Default absorption coefficient in mm^-1 (skim milk).
const DEFAULT_SIGMA_A: Spectrum = Spectrum::rgb(0.0011, 0.0024, 0.014);

/// Default scattering coefficient in mm^-1 (skim milk).
const DEFAULT_SIGMA_S: Spectrum = Spectrum::rgb(2.55, 3.21, 3.77);

/// Source of the scattering coefficients of the interior.
#[derive(Clone)]
pub enum SubsurfaceCoefficients {
    /// Absorption and scattering coefficients given directly.
    Direct {
        sigma_a: ArcTexture<Spectrum>,
        sigma_s: ArcTexture<Spectrum>,
    },

    /// Coefficients inverted from a diffuse reflectance and mean free path.
    Reflectance {
        reflectance: ArcTexture<Spectrum>,
        mfp: ArcTexture<Spectrum>,
    },
}

/// A dielectric boundary over a scattering interior, like skin or marble.
pub struct SubsurfaceMaterial {
    /// Scale applied to the coefficients or mean free path.
    scale: Float,

    /// Index of refraction of the boundary.
    eta: Float,

    /// Source of the coefficients.
    coefficients: SubsurfaceCoefficients,

    /// Roughness of the boundary.
    roughness: Roughness,

    /// Tabulated diffusion profile.
    table: Arc<BSSRDFTable>,
}

impl SubsurfaceMaterial {
    /// Create a new `SubsurfaceMaterial`.
    ///
    /// * `scale`        - Scale applied to the coefficients or mean free
    ///                    path.
    /// * `eta`          - Index of refraction of the boundary.
    /// * `g`            - Henyey-Greenstein asymmetry of the interior.
    /// * `coefficients` - Source of the coefficients.
    /// * `roughness`    - Roughness of the boundary.
    pub fn new(
        scale: Float,
        eta: Float,
        g: Float,
        coefficients: SubsurfaceCoefficients,
        roughness: Roughness,
    ) -> Self {
        Self {
            scale,
            eta,
            coefficients,
            roughness,
            table: Arc::new(BSSRDFTable::new(100, 64, g, eta)),
        }
    }

    /// Returns `(σa, σs)` at a surface point.
    ///
    /// * `si` - The surface interaction.
    pub fn coefficients(&self, si: &SurfaceInteraction) -> (Spectrum, Spectrum) {
        match &self.coefficients {
            SubsurfaceCoefficients::Direct { sigma_a, sigma_s } => (
                self.scale * sigma_a.evaluate(si).clamp(0.0, INFINITY),
                self.scale * sigma_s.evaluate(si).clamp(0.0, INFINITY),
            ),
            SubsurfaceCoefficients::Reflectance { reflectance, mfp } => {
                let mfree = self.scale * mfp.evaluate(si);
                let r = reflectance.evaluate(si).clamp(0.0, 1.0);
                self.table.subsurface_from_diffuse(&r, &mfree)
            }
        }
    }
}

impl Material for SubsurfaceMaterial {
    fn compute_scattering_functions<'arena>(
        &self,
        si: &SurfaceInteraction,
        arena: &'arena Bump,
        _mode: TransportMode,
    ) -> ScatteringFunctions<'arena> {
        let distrib = self.roughness.distribution(si);
        let bsdf = BSDF::new(si, BxDF::Dielectric(DielectricBxDF::new(self.eta, distrib)));

        let (sigma_a, sigma_s) = self.coefficients(si);
        let bssrdf = TabulatedBSSRDF::new(si, self.eta, &sigma_a, &sigma_s, Arc::clone(&self.table));
        ScatteringFunctions::with_bssrdf(arena, bsdf, bssrdf)
    }
}

impl From<&TextureParams> for SubsurfaceMaterial {
    /// Create a subsurface material from texture parameters. `reflectance`
    /// selects the inversion from diffuse reflectance, otherwise `sigma_a`
    /// and `sigma_s` are used.
    ///
    /// * `tp` - Texture parameters.
    fn from(tp: &TextureParams) -> Self {
        let scale = tp.find_float("scale", 1.0);
        let eta = tp.find_float("eta", 1.33);
        let g = tp.find_float("g", 0.0);

        let coefficients = match tp.get_spectrum_texture_or_none("reflectance", constant_spectrum_texture) {
            Some(reflectance) => {
                if !tp.params.find_spectrum("sigma_a").is_empty() || !tp.params.find_spectrum("sigma_s").is_empty() {
                    warn!("Ignoring 'sigma_a' and 'sigma_s' since 'reflectance' was provided.");
                }
                SubsurfaceCoefficients::Reflectance {
                    reflectance,
                    mfp: tp.get_spectrum_texture_or_else("mfp", Spectrum::new(1.0), constant_spectrum_texture),
                }
            }
            None => SubsurfaceCoefficients::Direct {
                sigma_a: tp.get_spectrum_texture_or_else("sigma_a", DEFAULT_SIGMA_A, constant_spectrum_texture),
                sigma_s: tp.get_spectrum_texture_or_else("sigma_s", DEFAULT_SIGMA_S, constant_spectrum_texture),
            },
        };

        Self::new(scale, eta, g, coefficients, Roughness::from((tp, "")))
    }
}

/// Returns a reference counted `SubsurfaceMaterial`.
///
/// * `tp` - Texture parameters.
pub fn create_subsurface_material(tp: &TextureParams) -> ArcMaterial {
    Arc::new(SubsurfaceMaterial::from(tp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::*;
    use float_cmp::*;

    #[test]
    fn defaults_scale_direct_coefficients() {
        let mat = SubsurfaceMaterial::from(&tex_params(ParamSet::new().add_float("scale", &[2.0])));
        let (sa, ss) = mat.coefficients(&facing_up());
        for c in 0..3 {
            assert!(approx_eq!(f32, sa[c], 2.0 * DEFAULT_SIGMA_A[c], epsilon = 1e-6));
            assert!(approx_eq!(f32, ss[c], 2.0 * DEFAULT_SIGMA_S[c], epsilon = 1e-6));
        }
    }

    #[test]
    fn reflectance_inversion_preserves_extinction() {
        let params = ParamSet::new()
            .add_rgb("reflectance", &[0.2, 0.5, 0.8])
            .add_rgb("mfp", &[0.5, 1.0, 2.0]);
        let mat = SubsurfaceMaterial::from(&tex_params(params));
        let (sa, ss) = mat.coefficients(&facing_up());
        let mfp = [0.5, 1.0, 2.0];
        for c in 0..3 {
            assert!(sa[c] >= 0.0 && ss[c] >= 0.0);
            assert!(approx_eq!(f32, sa[c] + ss[c], 1.0 / mfp[c], epsilon = 1e-4));
        }
        // Brighter channels scatter a larger fraction.
        let albedo = |c: usize| ss[c] / (sa[c] + ss[c]);
        assert!(albedo(0) < albedo(1) && albedo(1) < albedo(2));
    }

    #[test]
    fn produces_dielectric_with_bssrdf() {
        let arena = Bump::new();
        let mat = SubsurfaceMaterial::from(&tex_params(ParamSet::new()));
        let sf = mat.compute_scattering_functions(&facing_up(), &arena, TransportMode::Radiance);
        let bsdf = sf.bsdf.unwrap();
        assert!(matches!(bsdf.bxdf(), BxDF::Dielectric(_)));
        assert!(bsdf.flags().is_transmissive());
        let bssrdf = sf.bssrdf.unwrap();
        assert!(approx_eq!(f32, bssrdf.eta(), 1.33, epsilon = 1e-6));
    }
}
