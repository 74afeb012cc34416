//! Measured Material

use bumpalo::Bump;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use volpath_core::interaction::*;
use volpath_core::material::*;
use volpath_core::paramset::*;
use volpath_core::pbrt::*;
use volpath_core::reflection::*;
use volpath_core::spectrum::*;

lazy_static! {
    // Tables are shared between all materials that load the same file.
    static ref MEASURED_CACHE: Mutex<HashMap<String, ArcMeasuredBRDF>> = Mutex::new(HashMap::new());
}

/// Resolution of the built-in table along θh.
const BUILTIN_THETA_H: usize = 32;

/// Resolution of the built-in table along θd.
const BUILTIN_THETA_D: usize = 16;

/// Reflectance given by a tabulated BRDF.
pub struct MeasuredMaterial {
    /// The tabulated data.
    brdf: ArcMeasuredBRDF,
}

impl MeasuredMaterial {
    /// Create a new `MeasuredMaterial`.
    ///
    /// * `brdf` - The tabulated data.
    pub fn new(brdf: ArcMeasuredBRDF) -> Self {
        Self { brdf }
    }
}

impl Material for MeasuredMaterial {
    fn compute_scattering_functions<'arena>(
        &self,
        si: &SurfaceInteraction,
        arena: &'arena Bump,
        _mode: TransportMode,
    ) -> ScatteringFunctions<'arena> {
        let bxdf = BxDF::Measured(MeasuredBxDF::new(Arc::clone(&self.brdf)));
        ScatteringFunctions::with_bsdf(arena, BSDF::new(si, bxdf))
    }
}

/// Returns a tabulated glossy brown lacquer used when no measurement file is
/// given.
pub fn builtin_measured_brdf() -> Result<MeasuredBRDF, String> {
    let kd = Spectrum::rgb(0.25, 0.12, 0.05);
    let ks = 0.15;
    let exponent = 60.0;
    MeasuredBRDF::from_fn(BUILTIN_THETA_H, BUILTIN_THETA_D, |theta_h, theta_d| {
        let fresnel = fr_schlick(0.04, theta_d.cos());
        let lobe = (exponent + 2.0) * INV_TWO_PI * theta_h.cos().max(0.0).powf(exponent);
        kd * INV_PI + Spectrum::new(ks * fresnel * lobe)
    })
}

/// Schlick's approximation of the Fresnel reflectance.
fn fr_schlick(r0: Float, cos_theta: Float) -> Float {
    r0 + (1.0 - r0) * (1.0 - clamp(cos_theta, 0.0, 1.0)).powi(5)
}

/// Loads a measured BRDF through the cache.
///
/// * `path` - Path to the file.
fn load_cached(path: &str) -> Result<ArcMeasuredBRDF, String> {
    let mut cache = match MEASURED_CACHE.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if let Some(brdf) = cache.get(path) {
        return Ok(Arc::clone(brdf));
    }
    let brdf = Arc::new(MeasuredBRDF::load(path)?);
    info!("Read measured BRDF '{}'", path);
    cache.insert(path.to_string(), Arc::clone(&brdf));
    Ok(brdf)
}

/// Returns a reference counted `MeasuredMaterial` reading the `filename`
/// parameter, or the built-in table if it is absent.
///
/// * `tp` - Texture parameters.
pub fn create_measured_material(tp: &TextureParams) -> Result<ArcMaterial, String> {
    let filename = tp.find_string("filename", String::new());
    let brdf = if filename.is_empty() {
        warn!("No 'filename' given for measured material. Using built-in table.");
        Arc::new(builtin_measured_brdf()?)
    } else {
        load_cached(&filename)?
    };
    Ok(Arc::new(MeasuredMaterial::new(brdf)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::*;
    use byteorder::{LittleEndian, WriteBytesExt};
    use std::io::Write;
    use volpath_core::geometry::*;

    fn write_table(path: &std::path::Path, magic: &[u8; 4], value: f32) {
        let mut file = std::fs::File::create(path).unwrap();
        file.write_all(magic).unwrap();
        file.write_u32::<LittleEndian>(1).unwrap();
        file.write_u32::<LittleEndian>(4).unwrap();
        file.write_u32::<LittleEndian>(2).unwrap();
        for _ in 0..(3 * 4 * 2) {
            file.write_f32::<LittleEndian>(value).unwrap();
        }
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("materials-{}-{}.vpmb", name, std::process::id()))
    }

    #[test]
    fn loads_constant_table() {
        let path = temp_path("constant");
        write_table(&path, b"VPMB", 0.2);
        let tp = tex_params(ParamSet::new().add_string("filename", path.to_str().unwrap()));
        let mat = create_measured_material(&tp).unwrap();

        let arena = Bump::new();
        let sf = mat.compute_scattering_functions(&facing_up(), &arena, TransportMode::Radiance);
        let bsdf = sf.bsdf.unwrap();
        let wo = Vector3f::new(0.2, 0.1, 0.9).normalize();
        let wi = Vector3f::new(-0.4, 0.3, 0.7).normalize();
        let f = bsdf.f(&wo, &wi, TransportMode::Radiance);
        assert!(f[0] > 0.0 && f[1] > 0.0 && f[2] > 0.0);

        let below = Vector3f::new(0.0, 0.0, -1.0);
        assert!(bsdf.f(&wo, &below, TransportMode::Radiance).is_black());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn rejects_bad_magic() {
        let path = temp_path("magic");
        write_table(&path, b"NOPE", 0.2);
        let tp = tex_params(ParamSet::new().add_string("filename", path.to_str().unwrap()));
        assert!(create_measured_material(&tp).is_err());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file_is_an_error() {
        let tp = tex_params(ParamSet::new().add_string("filename", "/nonexistent/volpath.vpmb"));
        assert!(create_measured_material(&tp).is_err());
    }

    #[test]
    fn builtin_table_is_reflective() {
        let mat = create_measured_material(&tex_params(ParamSet::new())).unwrap();
        let arena = Bump::new();
        let sf = mat.compute_scattering_functions(&facing_up(), &arena, TransportMode::Radiance);
        let bsdf = sf.bsdf.unwrap();
        assert!(bsdf.flags().is_reflective());
        assert!(!bsdf.flags().is_transmissive());
    }

    #[test]
    fn schlick_limits() {
        assert_eq!(fr_schlick(0.04, 1.0), 0.04);
        assert_eq!(fr_schlick(0.04, 0.0), 1.0);
    }
}
