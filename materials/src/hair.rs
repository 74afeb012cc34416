//! Hair Material

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

/// Source of the absorption coefficient of the fiber interior.
#[derive(Clone)]
pub enum HairAbsorption {
    /// Absorption coefficient given directly.
    SigmaA(ArcTexture<Spectrum>),

    /// Absorption derived from a desired diffuse reflectance.
    Reflectance(ArcTexture<Spectrum>),

    /// Absorption derived from eumelanin and pheomelanin concentrations.
    Melanin {
        eumelanin: ArcTexture<Float>,
        pheomelanin: ArcTexture<Float>,
    },
}

/// Implements the Chiang et al. hair fiber model. Curves are expected to
/// parameterize the fiber width along v.
pub struct HairMaterial {
    /// Absorption source.
    absorption: HairAbsorption,

    /// Index of refraction of the fiber interior.
    eta: ArcTexture<Float>,

    /// Longitudinal roughness.
    beta_m: ArcTexture<Float>,

    /// Azimuthal roughness.
    beta_n: ArcTexture<Float>,

    /// Cuticle scale tilt in degrees.
    alpha: ArcTexture<Float>,
}

impl HairMaterial {
    /// Create a new `HairMaterial`.
    ///
    /// * `absorption` - Absorption source.
    /// * `eta`        - Index of refraction of the fiber interior.
    /// * `beta_m`     - Longitudinal roughness.
    /// * `beta_n`     - Azimuthal roughness.
    /// * `alpha`      - Cuticle scale tilt in degrees.
    pub fn new(
        absorption: HairAbsorption,
        eta: ArcTexture<Float>,
        beta_m: ArcTexture<Float>,
        beta_n: ArcTexture<Float>,
        alpha: ArcTexture<Float>,
    ) -> Self {
        Self {
            absorption,
            eta,
            beta_m,
            beta_n,
            alpha,
        }
    }
}

impl Material for HairMaterial {
    fn compute_scattering_functions<'arena>(
        &self,
        si: &SurfaceInteraction,
        arena: &'arena Bump,
        _mode: TransportMode,
    ) -> ScatteringFunctions<'arena> {
        let eta = self.eta.evaluate(si);
        let beta_m = clamp(self.beta_m.evaluate(si), 0.0, 1.0);
        let beta_n = clamp(self.beta_n.evaluate(si), 0.0, 1.0);
        let alpha = self.alpha.evaluate(si);

        let sigma_a = match &self.absorption {
            HairAbsorption::SigmaA(sigma_a) => sigma_a.evaluate(si).clamp(0.0, INFINITY),
            HairAbsorption::Reflectance(c) => {
                HairBxDF::sigma_a_from_reflectance(&c.evaluate(si).clamp(0.0, 1.0), beta_n)
            }
            HairAbsorption::Melanin {
                eumelanin,
                pheomelanin,
            } => HairBxDF::sigma_a_from_concentration(
                eumelanin.evaluate(si).max(0.0),
                pheomelanin.evaluate(si).max(0.0),
            ),
        };

        // Offset across the fiber from the v coordinate.
        let h = -1.0 + 2.0 * si.uv.y;
        let bxdf = BxDF::Hair(HairBxDF::new(h, eta, sigma_a, beta_m, beta_n, alpha));
        ScatteringFunctions::with_bsdf(arena, BSDF::new(si, bxdf))
    }
}

impl From<&TextureParams> for HairMaterial {
    /// Create a hair material from texture parameters. `sigma_a` takes
    /// precedence over `reflectance`, which takes precedence over the melanin
    /// concentrations.
    ///
    /// * `tp` - Texture parameters.
    fn from(tp: &TextureParams) -> Self {
        let sigma_a = tp.get_spectrum_texture_or_none("sigma_a", constant_spectrum_texture);
        let reflectance = tp.get_spectrum_texture_or_none("reflectance", constant_spectrum_texture);
        let eumelanin = tp.get_float_texture_or_none("eumelanin", constant_float_texture);
        let pheomelanin = tp.get_float_texture_or_none("pheomelanin", constant_float_texture);

        let absorption = match (sigma_a, reflectance) {
            (Some(sigma_a), reflectance) => {
                if reflectance.is_some() {
                    warn!("Ignoring 'reflectance' parameter since 'sigma_a' was provided.");
                }
                if eumelanin.is_some() || pheomelanin.is_some() {
                    warn!("Ignoring melanin parameters since 'sigma_a' was provided.");
                }
                HairAbsorption::SigmaA(sigma_a)
            }
            (None, Some(reflectance)) => {
                if eumelanin.is_some() || pheomelanin.is_some() {
                    warn!("Ignoring melanin parameters since 'reflectance' was provided.");
                }
                HairAbsorption::Reflectance(reflectance)
            }
            (None, None) => {
                // Brown hair when no absorption is specified at all.
                let eumelanin = match (&eumelanin, &pheomelanin) {
                    (None, None) => constant_float_texture(1.3),
                    _ => eumelanin.unwrap_or_else(|| constant_float_texture(0.0)),
                };
                let pheomelanin = pheomelanin.unwrap_or_else(|| constant_float_texture(0.0));
                HairAbsorption::Melanin {
                    eumelanin,
                    pheomelanin,
                }
            }
        };

        Self::new(
            absorption,
            tp.get_float_texture_or_else("eta", 1.55, constant_float_texture),
            tp.get_float_texture_or_else("beta_m", 0.3, constant_float_texture),
            tp.get_float_texture_or_else("beta_n", 0.3, constant_float_texture),
            tp.get_float_texture_or_else("alpha", 2.0, constant_float_texture),
        )
    }
}

/// Returns a reference counted `HairMaterial`.
///
/// * `tp` - Texture parameters.
pub fn create_hair_material(tp: &TextureParams) -> ArcMaterial {
    Arc::new(HairMaterial::from(tp))
}
