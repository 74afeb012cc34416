//! Measured BRDF
//!
//! Isotropic reflectance tabulated over the half-vector angle θh and the
//! difference angle θd between the half vector and the incident direction.
//! θh is stored on a warped axis `u = sqrt(2θh / π)` that places more rows
//! near the specular peak. Half vectors are importance sampled from a
//! distribution built over the same warped axis.

use super::*;
use crate::sampling::*;
use byteorder::{LittleEndian, ReadBytesExt};
use std::fs::File;
use std::io::{BufReader, Read};
use std::sync::Arc;

/// Magic bytes at the start of a measured BRDF file.
const MAGIC: [u8; 4] = *b"VPMB";

/// Supported file format version.
const VERSION: u32 = 1;

/// Largest number of table entries accepted from a file.
const MAX_TABLE_ENTRIES: usize = 1 << 22;

/// Maps an angle in [0, π/2] to the warped table axis.
#[inline]
fn theta_to_u(theta: Float) -> Float {
    (theta * (2.0 / PI)).max(0.0).sqrt()
}

/// Maps the warped table axis back to an angle in [0, π/2].
#[inline]
fn u_to_theta(u: Float) -> Float {
    sqr(u) * PI_OVER_TWO
}

/// Maps [0, 1] to an azimuth in [-π, π].
#[inline]
fn u_to_phi(u: Float) -> Float {
    (2.0 * u - 1.0) * PI
}

/// Maps an azimuth in [-π, π] to [0, 1].
#[inline]
fn phi_to_u(phi: Float) -> Float {
    (phi + PI) * INV_TWO_PI
}

/// Tabulated reflectance data shared by all `MeasuredBxDF` instances that
/// reference the same source.
#[derive(Clone, Debug)]
pub struct MeasuredBRDF {
    /// Number of rows along the warped θh axis.
    n_theta_h: usize,

    /// Number of columns along θd.
    n_theta_d: usize,

    /// Reflectance, `n_theta_h * n_theta_d` entries, θh major.
    values: Vec<Spectrum>,

    /// Sampling weight of each θh row.
    ndf: Vec<Float>,

    /// Half vector distribution over (u_φh, u_θh).
    distrib: Distribution2D,
}

impl MeasuredBRDF {
    /// Create a new `MeasuredBRDF` from tabulated values.
    ///
    /// * `n_theta_h` - Number of rows along the warped θh axis.
    /// * `n_theta_d` - Number of columns along θd.
    /// * `values`    - Reflectance, θh major.
    pub fn new(n_theta_h: usize, n_theta_d: usize, values: Vec<Spectrum>) -> Result<Self, String> {
        if n_theta_h == 0 || n_theta_d == 0 {
            return Err(format!(
                "Invalid measured BRDF resolution {}x{}.",
                n_theta_h, n_theta_d
            ));
        }
        if values.len() != n_theta_h * n_theta_d {
            return Err(format!(
                "Expected {} measured BRDF values. Got {}.",
                n_theta_h * n_theta_d,
                values.len()
            ));
        }
        if values.iter().any(|v| v.has_nans() || v[0] < 0.0 || v[1] < 0.0 || v[2] < 0.0) {
            return Err(String::from("Measured BRDF contains negative or NaN values."));
        }

        // Row weight is the mean luminance over θd, converted from solid angle
        // to the warped parameterization and floored so that no row where the
        // reflectance is non-zero becomes impossible to sample.
        let mean: Vec<Float> = values
            .chunks(n_theta_d)
            .map(|row| row.iter().map(|v| v.y()).sum::<Float>() / n_theta_d as Float)
            .collect();
        let max_mean = mean.iter().cloned().fold(0.0, Float::max);
        let floor = if max_mean > 0.0 { 0.01 * max_mean } else { 1.0 };
        let ndf: Vec<Float> = mean
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let u = (i as Float + 0.5) / n_theta_h as Float;
                (m + floor) * u * u_to_theta(u).sin()
            })
            .collect();
        let distrib = Distribution2D::new(&ndf, 1, n_theta_h);

        Ok(Self {
            n_theta_h,
            n_theta_d,
            values,
            ndf,
            distrib,
        })
    }

    /// Tabulates an analytic reflectance function.
    ///
    /// * `n_theta_h` - Number of rows along the warped θh axis.
    /// * `n_theta_d` - Number of columns along θd.
    /// * `func`      - Reflectance for (θh, θd).
    pub fn from_fn<F>(n_theta_h: usize, n_theta_d: usize, func: F) -> Result<Self, String>
    where
        F: Fn(Float, Float) -> Spectrum,
    {
        let mut values = Vec::with_capacity(n_theta_h * n_theta_d);
        for i in 0..n_theta_h {
            let theta_h = u_to_theta((i as Float + 0.5) / n_theta_h as Float);
            for j in 0..n_theta_d {
                let theta_d = (j as Float + 0.5) / n_theta_d as Float * PI_OVER_TWO;
                values.push(func(theta_h, theta_d));
            }
        }
        Self::new(n_theta_h, n_theta_d, values)
    }

    /// Reads a measured BRDF: the magic bytes `VPMB`, a version, the two
    /// resolutions and RGB triples, all little endian.
    ///
    /// * `reader` - Source of the data.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self, String> {
        let mut magic = [0_u8; 4];
        reader
            .read_exact(&mut magic)
            .map_err(|err| format!("Error reading header. {}", err))?;
        if magic != MAGIC {
            return Err(format!("Invalid header {:?}. Expected {:?}.", magic, MAGIC));
        }

        let read_u32 = |r: &mut R, what: &str| {
            r.read_u32::<LittleEndian>()
                .map_err(|err| format!("Error reading {}. {}", what, err))
        };
        let version = read_u32(&mut *reader, "version")?;
        if version != VERSION {
            return Err(format!("Unsupported measured BRDF version {}.", version));
        }
        let n_theta_h = read_u32(&mut *reader, "theta_h resolution")? as usize;
        let n_theta_d = read_u32(&mut *reader, "theta_d resolution")? as usize;

        let n_values = n_theta_h
            .checked_mul(n_theta_d)
            .filter(|&n| n > 0 && n <= MAX_TABLE_ENTRIES)
            .ok_or_else(|| {
                format!(
                    "Invalid table resolution {}x{}. At most {} entries are supported.",
                    n_theta_h, n_theta_d, MAX_TABLE_ENTRIES
                )
            })?;

        let mut raw = vec![0.0; 3 * n_values];
        reader
            .read_f32_into::<LittleEndian>(&mut raw)
            .map_err(|err| format!("Error reading values. {}", err))?;
        let values = raw
            .chunks_exact(3)
            .map(|c| Spectrum::rgb(c[0], c[1], c[2]))
            .collect();

        Self::new(n_theta_h, n_theta_d, values)
    }

    /// Loads a measured BRDF file.
    ///
    /// * `path` - Path to the file.
    pub fn load(path: &str) -> Result<Self, String> {
        let file = File::open(path).map_err(|err| format!("Could not open {}. {}", path, err))?;
        let mut reader = BufReader::new(file);
        Self::read(&mut reader).map_err(|err| format!("{}: {}", path, err))
    }

    /// Returns the tabulated reflectance.
    ///
    /// * `theta_h` - Angle between the half vector and the normal.
    /// * `theta_d` - Angle between the half vector and the incident direction.
    pub fn lookup(&self, theta_h: Float, theta_d: Float) -> Spectrum {
        let i = (theta_to_u(theta_h) * self.n_theta_h as Float) as usize;
        let j = (theta_d * (2.0 / PI) * self.n_theta_d as Float).max(0.0) as usize;
        let i = i.min(self.n_theta_h - 1);
        let j = j.min(self.n_theta_d - 1);
        self.values[i * self.n_theta_d + j]
    }

    /// Returns the sampling weights of the θh rows.
    pub fn ndf(&self) -> &[Float] {
        &self.ndf
    }

    /// Returns the density of sampling half vector `wm` in solid angle.
    ///
    /// * `wm` - Half vector in the upper hemisphere.
    fn half_vector_pdf(&self, wm: &Vector3f) -> Float {
        let theta_h = safe_acos(wm.z);
        let u_theta = theta_to_u(theta_h);
        let sin_theta = theta_h.sin();
        if u_theta == 0.0 || sin_theta == 0.0 {
            return 0.0;
        }
        let u_phi = phi_to_u(wm.y.atan2(wm.x));
        let pdf_uv = self.distrib.pdf(&Point2f::new(u_phi, u_theta));
        pdf_uv / (2.0 * PI * PI * u_theta * sin_theta)
    }
}

/// Atomic reference counted `MeasuredBRDF`.
pub type ArcMeasuredBRDF = Arc<MeasuredBRDF>;

/// Scattering from a measured BRDF. The table is shared.
#[derive(Clone, Debug)]
pub struct MeasuredBxDF {
    /// The tabulated data.
    brdf: ArcMeasuredBRDF,
}

impl MeasuredBxDF {
    /// Create a new `MeasuredBxDF`.
    ///
    /// * `brdf` - The tabulated data.
    pub fn new(brdf: ArcMeasuredBRDF) -> Self {
        Self { brdf }
    }
}

impl BxDFInterface for MeasuredBxDF {
    fn f(&self, wo: &Vector3f, wi: &Vector3f, _mode: TransportMode) -> Spectrum {
        if !same_hemisphere(wo, wi) {
            return Spectrum::new(0.0);
        }
        let (wo, wi) = if wo.z < 0.0 {
            (-*wo, -*wi)
        } else {
            (*wo, *wi)
        };

        let wm = wo + wi;
        if wm.length_squared() == 0.0 {
            return Spectrum::new(0.0);
        }
        let wm = wm.normalize();
        self.brdf.lookup(safe_acos(wm.z), safe_acos(wi.dot(&wm)))
    }

    fn sample_f(
        &self,
        wo: &Vector3f,
        _uc: Float,
        u: &Point2f,
        mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Option<BSDFSample> {
        if !sample_flags.contains(BxDFReflTransFlags::REFLECTION) || wo.z == 0.0 {
            return None;
        }
        let flip = wo.z < 0.0;
        let wo_up = if flip { -*wo } else { *wo };

        let (p, pdf_uv) = self.brdf.distrib.sample_continuous(u);
        if pdf_uv == 0.0 {
            return None;
        }
        let theta_h = u_to_theta(p.y);
        let (sin_theta, cos_theta) = (theta_h.sin(), theta_h.cos());
        if p.y == 0.0 || sin_theta == 0.0 {
            return None;
        }
        let wm = spherical_direction(sin_theta, cos_theta, u_to_phi(p.x));

        let wi = reflect(&wo_up, &wm);
        if wi.z <= 0.0 {
            return None;
        }

        let pdf_wm = pdf_uv / (2.0 * PI * PI * p.y * sin_theta);
        let pdf = pdf_wm / (4.0 * wo_up.abs_dot(&wm));

        let wi = if flip { -wi } else { wi };
        Some(BSDFSample::new(
            self.f(wo, &wi, mode),
            wi,
            pdf,
            BxDFFlags::GLOSSY_REFLECTION,
        ))
    }

    fn pdf(
        &self,
        wo: &Vector3f,
        wi: &Vector3f,
        _mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Float {
        if !sample_flags.contains(BxDFReflTransFlags::REFLECTION) || !same_hemisphere(wo, wi) {
            return 0.0;
        }
        let (wo, wi) = if wo.z < 0.0 {
            (-*wo, -*wi)
        } else {
            (*wo, *wi)
        };
        let wm = wo + wi;
        if wm.length_squared() == 0.0 {
            return 0.0;
        }
        let wm = wm.normalize();
        self.brdf.half_vector_pdf(&wm) / (4.0 * wo.abs_dot(&wm))
    }

    fn flags(&self) -> BxDFFlags {
        BxDFFlags::GLOSSY_REFLECTION
    }

    fn regularize(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflection::test_util::*;
    use crate::rng::RNG;
    use byteorder::WriteBytesExt;
    use float_cmp::approx_eq;
    use std::io::Cursor;

    fn glossy() -> MeasuredBxDF {
        let brdf = MeasuredBRDF::from_fn(64, 8, |theta_h, _| {
            Spectrum::new(0.1 + 2.0 * (-sqr(theta_h.tan() / 0.3)).exp())
        })
        .unwrap();
        MeasuredBxDF::new(Arc::new(brdf))
    }

    #[test]
    fn constant_table_is_lambertian() {
        let brdf = MeasuredBRDF::from_fn(16, 4, |_, _| Spectrum::new(0.2)).unwrap();
        let bxdf = MeasuredBxDF::new(Arc::new(brdf));
        let f = bxdf.f(&direction(0.3, 0.0), &direction(1.1, 2.0), TransportMode::Radiance);
        assert!(approx_eq!(f32, f[0], 0.2, epsilon = 1e-6));
        let f = bxdf.f(&direction(0.3, 0.0), &-direction(1.1, 2.0), TransportMode::Radiance);
        assert!(f.is_black());
    }

    #[test]
    fn read_parses_file_layout() {
        let mut bytes = vec![];
        bytes.extend_from_slice(b"VPMB");
        bytes.write_u32::<LittleEndian>(1).unwrap();
        bytes.write_u32::<LittleEndian>(2).unwrap();
        bytes.write_u32::<LittleEndian>(1).unwrap();
        for v in [0.1, 0.2, 0.3, 0.4, 0.5, 0.6] {
            bytes.write_f32::<LittleEndian>(v).unwrap();
        }
        let brdf = MeasuredBRDF::read(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(brdf.ndf().len(), 2);
        let v = brdf.lookup(PI_OVER_TWO, 0.0);
        assert!(approx_eq!(f32, v[2], 0.6, epsilon = 1e-6));
    }

    #[test]
    fn read_rejects_bad_input() {
        assert!(MeasuredBRDF::read(&mut Cursor::new(b"NOPE".to_vec())).is_err());
        let mut truncated = b"VPMB".to_vec();
        truncated.write_u32::<LittleEndian>(1).unwrap();
        truncated.write_u32::<LittleEndian>(4).unwrap();
        truncated.write_u32::<LittleEndian>(4).unwrap();
        assert!(MeasuredBRDF::read(&mut Cursor::new(truncated)).is_err());
        assert!(MeasuredBRDF::load("/nonexistent/file.vpmb").is_err());

        for (n_theta_h, n_theta_d) in [(u32::MAX, u32::MAX), (1 << 20, 1 << 20), (0, 16)] {
            let mut huge = b"VPMB".to_vec();
            huge.write_u32::<LittleEndian>(1).unwrap();
            huge.write_u32::<LittleEndian>(n_theta_h).unwrap();
            huge.write_u32::<LittleEndian>(n_theta_d).unwrap();
            let err = MeasuredBRDF::read(&mut Cursor::new(huge)).err().unwrap();
            assert!(err.contains("Invalid table resolution"), "{}", err);
        }
    }

    #[test]
    fn sampled_pdf_matches_pdf() {
        let bxdf = glossy();
        let mut rng = RNG::new(3);
        let wo = direction(0.6, 1.0);
        for _ in 0..500 {
            let u = Point2f::new(rng.uniform_float(), rng.uniform_float());
            if let Some(bs) = bxdf.sample_f(&wo, 0.5, &u, TransportMode::Radiance, BxDFReflTransFlags::ALL) {
                assert!(bs.wi.z > 0.0);
                let pdf = bxdf.pdf(&wo, &bs.wi, TransportMode::Radiance, BxDFReflTransFlags::ALL);
                assert!(approx_eq!(f32, bs.pdf, pdf, epsilon = 1e-3 * pdf.max(1.0)), "{} {}", bs.pdf, pdf);
            }
        }
    }

    #[test]
    fn pdf_integrates_to_at_most_one() {
        let bxdf = BxDF::Measured(glossy());
        let integral = integrate_pdf(&bxdf, &direction(0.5, 0.0), 200_000);
        assert!(integral <= 1.05, "{}", integral);
        assert!(integral > 0.5, "{}", integral);
    }

    #[test]
    fn sampling_is_restricted_to_reflection() {
        let bxdf = glossy();
        let wo = direction(0.4, 0.0);
        let u = Point2f::new(0.5, 0.5);
        assert!(bxdf
            .sample_f(&wo, 0.5, &u, TransportMode::Radiance, BxDFReflTransFlags::TRANSMISSION)
            .is_none());
        assert_eq!(bxdf.flags(), BxDFFlags::GLOSSY_REFLECTION);
    }
}
