//! Reflection and surface scattering models
//!
//! Every scattering model works in a local shading frame where the surface
//! normal is the z-axis. `BSDF` moves directions between that frame and
//! render space. The models form a closed set dispatched through the `BxDF`
//! enum so that a scattering query never needs a heap allocation.

use crate::geometry::*;
use crate::pbrt::*;
use crate::spectrum::*;
use bitflags::bitflags;
use std::fmt;
use std::ops::Not;

mod bsdf;
mod bssrdf_adapter;
mod common;
mod conductor;
mod dielectric;
mod diffuse;
mod fresnel;
mod hair;
mod layered;
mod measured;
mod oren_nayar;
mod thin_dielectric;

// Re-export
pub use bsdf::*;
pub use bssrdf_adapter::*;
pub use common::*;
pub use conductor::*;
pub use dielectric::*;
pub use diffuse::*;
pub use fresnel::*;
pub use hair::*;
pub use layered::*;
pub use measured::*;
pub use oren_nayar::*;
pub use thin_dielectric::*;

bitflags! {
    /// Classifies the lobes of a scattering model.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct BxDFFlags: u8 {
        const UNSET = 0b_00000000;
        const REFLECTION = 0b_00000001;
        const TRANSMISSION = 0b_00000010;
        const DIFFUSE = 0b_00000100;
        const GLOSSY = 0b_00001000;
        const SPECULAR = 0b_00010000;
        const DIFFUSE_REFLECTION = Self::DIFFUSE.bits() | Self::REFLECTION.bits();
        const DIFFUSE_TRANSMISSION = Self::DIFFUSE.bits() | Self::TRANSMISSION.bits();
        const GLOSSY_REFLECTION = Self::GLOSSY.bits() | Self::REFLECTION.bits();
        const GLOSSY_TRANSMISSION = Self::GLOSSY.bits() | Self::TRANSMISSION.bits();
        const SPECULAR_REFLECTION = Self::SPECULAR.bits() | Self::REFLECTION.bits();
        const SPECULAR_TRANSMISSION = Self::SPECULAR.bits() | Self::TRANSMISSION.bits();
        const ALL = Self::DIFFUSE.bits()
            | Self::GLOSSY.bits()
            | Self::SPECULAR.bits()
            | Self::REFLECTION.bits()
            | Self::TRANSMISSION.bits();
    }
}

impl BxDFFlags {
    /// Returns true if there is a reflection lobe.
    pub fn is_reflective(&self) -> bool {
        self.contains(Self::REFLECTION)
    }

    /// Returns true if there is a transmission lobe.
    pub fn is_transmissive(&self) -> bool {
        self.contains(Self::TRANSMISSION)
    }

    /// Returns true if there is a diffuse lobe.
    pub fn is_diffuse(&self) -> bool {
        self.contains(Self::DIFFUSE)
    }

    /// Returns true if there is a glossy lobe.
    pub fn is_glossy(&self) -> bool {
        self.contains(Self::GLOSSY)
    }

    /// Returns true if there is a specular lobe.
    pub fn is_specular(&self) -> bool {
        self.contains(Self::SPECULAR)
    }

    /// Returns true if any lobe is diffuse or glossy.
    pub fn is_non_specular(&self) -> bool {
        self.intersects(Self::DIFFUSE | Self::GLOSSY)
    }
}

bitflags! {
    /// Restricts which hemispheres a sampling routine may choose.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct BxDFReflTransFlags: u8 {
        const REFLECTION = 0b_00000001;
        const TRANSMISSION = 0b_00000010;
        const ALL = Self::REFLECTION.bits() | Self::TRANSMISSION.bits();
    }
}

impl Default for BxDFReflTransFlags {
    fn default() -> Self {
        Self::ALL
    }
}

/// Indicates whether the quantity carried along a path is radiance (camera
/// paths) or importance (light paths).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransportMode {
    Radiance,
    Importance,
}

impl Not for TransportMode {
    type Output = Self;

    fn not(self) -> Self {
        match self {
            Self::Radiance => Self::Importance,
            Self::Importance => Self::Radiance,
        }
    }
}

/// Result of sampling a scattering model.
#[derive(Copy, Clone, Debug, Default)]
pub struct BSDFSample {
    /// Value of the distribution function.
    pub f: Spectrum,

    /// Sampled incident direction.
    pub wi: Vector3f,

    /// Probability density of the sample. For specular lobes this is the
    /// discrete probability of choosing the lobe.
    pub pdf: Float,

    /// Lobe that was sampled.
    pub flags: BxDFFlags,

    /// Relative index of refraction along the sampled direction; 1 unless
    /// the sample is a transmission.
    pub eta: Float,

    /// True if `pdf` is only proportional to the true density and callers
    /// must query `pdf()` for MIS.
    pub pdf_is_proportional: bool,
}

impl BSDFSample {
    /// Create a new `BSDFSample` with unit `eta`.
    ///
    /// * `f`     - Value of the distribution function.
    /// * `wi`    - Sampled incident direction.
    /// * `pdf`   - Probability density.
    /// * `flags` - Sampled lobe.
    pub fn new(f: Spectrum, wi: Vector3f, pdf: Float, flags: BxDFFlags) -> Self {
        Self {
            f,
            wi,
            pdf,
            flags,
            eta: 1.0,
            pdf_is_proportional: false,
        }
    }

    /// Sets the relative index of refraction.
    ///
    /// * `eta` - Relative index of refraction.
    pub fn with_eta(mut self, eta: Float) -> Self {
        self.eta = eta;
        self
    }

    /// Returns true if a reflection lobe was sampled.
    pub fn is_reflection(&self) -> bool {
        self.flags.is_reflective()
    }

    /// Returns true if a transmission lobe was sampled.
    pub fn is_transmission(&self) -> bool {
        self.flags.is_transmissive()
    }

    /// Returns true if a specular lobe was sampled.
    pub fn is_specular(&self) -> bool {
        self.flags.is_specular()
    }
}

impl fmt::Display for BSDFSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BSDFSample {{ f: {}, wi: {}, pdf: {}, flags: {:?}, eta: {}, pdf_is_proportional: {} }}",
            self.f, self.wi, self.pdf, self.flags, self.eta, self.pdf_is_proportional
        )
    }
}

/// Operations shared by every scattering model. All directions are in the
/// local shading frame.
pub trait BxDFInterface {
    /// Returns the value of the distribution function for a pair of
    /// directions.
    ///
    /// * `wo`   - Outgoing direction.
    /// * `wi`   - Incident direction.
    /// * `mode` - Transport mode.
    fn f(&self, wo: &Vector3f, wi: &Vector3f, mode: TransportMode) -> Spectrum;

    /// Samples an incident direction. Returns `None` when sampling fails.
    ///
    /// * `wo`           - Outgoing direction.
    /// * `uc`           - 1D sample used to choose between lobes.
    /// * `u`            - 2D sample used to choose a direction.
    /// * `mode`         - Transport mode.
    /// * `sample_flags` - Hemispheres that may be sampled.
    fn sample_f(
        &self,
        wo: &Vector3f,
        uc: Float,
        u: &Point2f,
        mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Option<BSDFSample>;

    /// Returns the density with which `sample_f()` produces `wi`.
    ///
    /// * `wo`           - Outgoing direction.
    /// * `wi`           - Incident direction.
    /// * `mode`         - Transport mode.
    /// * `sample_flags` - Hemispheres that may be sampled.
    fn pdf(
        &self,
        wo: &Vector3f,
        wi: &Vector3f,
        mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Float;

    /// Returns the lobes present in the model.
    fn flags(&self) -> BxDFFlags;

    /// Increases roughness so that near-specular lobes become glossy.
    fn regularize(&mut self);
}

/// The closed set of scattering models.
#[derive(Clone)]
pub enum BxDF {
    Diffuse(DiffuseBxDF),
    RoughDiffuse(RoughDiffuseBxDF),
    Dielectric(DielectricBxDF),
    ThinDielectric(ThinDielectricBxDF),
    Conductor(ConductorBxDF),
    CoatedDiffuse(CoatedDiffuseBxDF),
    CoatedConductor(CoatedConductorBxDF),
    Hair(HairBxDF),
    Measured(MeasuredBxDF),
    BSSRDFAdapter(BSSRDFAdapterBxDF),
}

/// Forwards a call to the model held by a `BxDF`.
macro_rules! bxdf_dispatch {
    ($self: expr, $bxdf: ident => $call: expr) => {
        match $self {
            BxDF::Diffuse($bxdf) => $call,
            BxDF::RoughDiffuse($bxdf) => $call,
            BxDF::Dielectric($bxdf) => $call,
            BxDF::ThinDielectric($bxdf) => $call,
            BxDF::Conductor($bxdf) => $call,
            BxDF::CoatedDiffuse($bxdf) => $call,
            BxDF::CoatedConductor($bxdf) => $call,
            BxDF::Hair($bxdf) => $call,
            BxDF::Measured($bxdf) => $call,
            BxDF::BSSRDFAdapter($bxdf) => $call,
        }
    };
}

impl BxDF {
    /// Returns true if the sampled pdf is only proportional to the true
    /// density.
    pub fn pdf_is_proportional(&self) -> bool {
        matches!(self, BxDF::CoatedDiffuse(_) | BxDF::CoatedConductor(_))
    }

    /// Returns the model name.
    pub fn name(&self) -> &'static str {
        match self {
            BxDF::Diffuse(_) => "DiffuseBxDF",
            BxDF::RoughDiffuse(_) => "RoughDiffuseBxDF",
            BxDF::Dielectric(_) => "DielectricBxDF",
            BxDF::ThinDielectric(_) => "ThinDielectricBxDF",
            BxDF::Conductor(_) => "ConductorBxDF",
            BxDF::CoatedDiffuse(_) => "CoatedDiffuseBxDF",
            BxDF::CoatedConductor(_) => "CoatedConductorBxDF",
            BxDF::Hair(_) => "HairBxDF",
            BxDF::Measured(_) => "MeasuredBxDF",
            BxDF::BSSRDFAdapter(_) => "BSSRDFAdapterBxDF",
        }
    }
}

impl BxDFInterface for BxDF {
    fn f(&self, wo: &Vector3f, wi: &Vector3f, mode: TransportMode) -> Spectrum {
        bxdf_dispatch!(self, bxdf => bxdf.f(wo, wi, mode))
    }

    fn sample_f(
        &self,
        wo: &Vector3f,
        uc: Float,
        u: &Point2f,
        mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Option<BSDFSample> {
        bxdf_dispatch!(self, bxdf => bxdf.sample_f(wo, uc, u, mode, sample_flags))
    }

    fn pdf(
        &self,
        wo: &Vector3f,
        wi: &Vector3f,
        mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Float {
        bxdf_dispatch!(self, bxdf => bxdf.pdf(wo, wi, mode, sample_flags))
    }

    fn flags(&self) -> BxDFFlags {
        bxdf_dispatch!(self, bxdf => bxdf.flags())
    }

    fn regularize(&mut self) {
        bxdf_dispatch!(self, bxdf => bxdf.regularize())
    }
}

impl fmt::Display for BxDF {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{ flags: {:?} }}", self.name(), self.flags())
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;
    use crate::rng::RNG;
    use crate::sampling::*;

    /// Monte Carlo estimate of the integral of `pdf()` over the sphere using
    /// uniform sphere sampling.
    pub fn integrate_pdf(bxdf: &BxDF, wo: &Vector3f, n: usize) -> Float {
        let mut rng = RNG::new(7);
        let mut sum = 0.0;
        for _ in 0..n {
            let u = Point2f::new(rng.uniform_float(), rng.uniform_float());
            let wi = uniform_sample_sphere(&u);
            sum += bxdf.pdf(wo, &wi, TransportMode::Radiance, BxDFReflTransFlags::ALL)
                / uniform_sphere_pdf();
        }
        sum / n as Float
    }

    /// Monte Carlo estimate of directional albedo using `sample_f()`.
    pub fn sampled_albedo(bxdf: &BxDF, wo: &Vector3f, mode: TransportMode, n: usize) -> Spectrum {
        let mut rng = RNG::new(11);
        let mut sum = Spectrum::new(0.0);
        for _ in 0..n {
            let uc = rng.uniform_float();
            let u = Point2f::new(rng.uniform_float(), rng.uniform_float());
            if let Some(bs) = bxdf.sample_f(wo, uc, &u, mode, BxDFReflTransFlags::ALL) {
                if bs.pdf > 0.0 {
                    sum += bs.f * abs_cos_theta(&bs.wi) / bs.pdf;
                }
            }
        }
        sum / n as Float
    }

    /// Returns a direction in the upper hemisphere from spherical angles.
    pub fn direction(theta: Float, phi: Float) -> Vector3f {
        spherical_direction(theta.sin(), theta.cos(), phi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_mode_negates() {
        assert_eq!(!TransportMode::Radiance, TransportMode::Importance);
        assert_eq!(!TransportMode::Importance, TransportMode::Radiance);
    }

    #[test]
    fn flag_predicates() {
        let f = BxDFFlags::GLOSSY_REFLECTION | BxDFFlags::SPECULAR_TRANSMISSION;
        assert!(f.is_reflective());
        assert!(f.is_transmissive());
        assert!(f.is_glossy());
        assert!(f.is_specular());
        assert!(!f.is_diffuse());
        assert!(f.is_non_specular());
        assert!(!BxDFFlags::SPECULAR_REFLECTION.is_non_specular());
        assert_eq!(
            BxDFFlags::DIFFUSE_REFLECTION.bits() & BxDFReflTransFlags::TRANSMISSION.bits(),
            0
        );
    }
}
