//! BSDF

use super::*;
use crate::interaction::SurfaceInteraction;

/// A scattering model placed at a surface point. Directions passed to and
/// returned from a `BSDF` are in render space.
#[derive(Clone)]
pub struct BSDF {
    /// The scattering model.
    bxdf: BxDF,

    /// Shading frame with the shading normal as the z-axis.
    frame: Frame,
}

impl BSDF {
    /// Create a new `BSDF` in the shading frame of a surface interaction.
    ///
    /// * `si`   - The surface interaction.
    /// * `bxdf` - The scattering model.
    pub fn new(si: &SurfaceInteraction, bxdf: BxDF) -> Self {
        Self::from_shading(&si.shading.n, &si.shading.dpdu, bxdf)
    }

    /// Create a new `BSDF` from a shading normal and tangent.
    ///
    /// * `ns`    - Shading normal.
    /// * `dpdus` - Shading ∂p/∂u. Orthogonalized against `ns`.
    /// * `bxdf`  - The scattering model.
    pub fn from_shading(ns: &Normal3f, dpdus: &Vector3f, bxdf: BxDF) -> Self {
        let z = Vector3f::from(*ns).normalize();
        let x = *dpdus - z * z.dot(dpdus);
        let frame = if x.length_squared() > 0.0 {
            Frame::from_xz(x.normalize(), z)
        } else {
            Frame::from_z(z)
        };
        Self { bxdf, frame }
    }

    /// Returns the lobes of the scattering model.
    pub fn flags(&self) -> BxDFFlags {
        self.bxdf.flags()
    }

    /// Returns the scattering model.
    pub fn bxdf(&self) -> &BxDF {
        &self.bxdf
    }

    /// Transforms a render space vector into the shading frame.
    ///
    /// * `v` - The vector.
    pub fn render_to_local(&self, v: &Vector3f) -> Vector3f {
        self.frame.to_local(v)
    }

    /// Transforms a shading frame vector into render space.
    ///
    /// * `v` - The vector.
    pub fn local_to_render(&self, v: &Vector3f) -> Vector3f {
        self.frame.from_local(v)
    }

    /// Returns the value of the distribution function.
    ///
    /// * `wo_render` - Outgoing direction.
    /// * `wi_render` - Incident direction.
    /// * `mode`      - Transport mode.
    pub fn f(&self, wo_render: &Vector3f, wi_render: &Vector3f, mode: TransportMode) -> Spectrum {
        let wi = self.render_to_local(wi_render);
        let wo = self.render_to_local(wo_render);
        if wo.z == 0.0 {
            return Spectrum::new(0.0);
        }
        self.bxdf.f(&wo, &wi, mode)
    }

    /// Samples an incident direction. Returns `None` if sampling fails or the
    /// sample carries no energy.
    ///
    /// * `wo_render`    - Outgoing direction.
    /// * `u`            - 1D sample used to choose between lobes.
    /// * `u2`           - 2D sample used to choose a direction.
    /// * `mode`         - Transport mode.
    /// * `sample_flags` - Hemispheres that may be sampled.
    pub fn sample_f(
        &self,
        wo_render: &Vector3f,
        u: Float,
        u2: &Point2f,
        mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Option<BSDFSample> {
        let wo = self.render_to_local(wo_render);
        if wo.z == 0.0 || (self.bxdf.flags().bits() & sample_flags.bits()) == 0 {
            return None;
        }

        let mut bs = self.bxdf.sample_f(&wo, u, u2, mode, sample_flags)?;
        if bs.f.is_black() || bs.pdf == 0.0 || bs.wi.z == 0.0 {
            return None;
        }
        bs.wi = self.local_to_render(&bs.wi);
        Some(bs)
    }

    /// Returns the density of sampling `wi_render`.
    ///
    /// * `wo_render`    - Outgoing direction.
    /// * `wi_render`    - Incident direction.
    /// * `mode`         - Transport mode.
    /// * `sample_flags` - Hemispheres that may be sampled.
    pub fn pdf(
        &self,
        wo_render: &Vector3f,
        wi_render: &Vector3f,
        mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Float {
        let wo = self.render_to_local(wo_render);
        let wi = self.render_to_local(wi_render);
        if wo.z == 0.0 {
            return 0.0;
        }
        self.bxdf.pdf(&wo, &wi, mode, sample_flags)
    }

    /// Roughens near-specular lobes.
    pub fn regularize(&mut self) {
        self.bxdf.regularize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    fn tilted() -> BSDF {
        let ns = Normal3f::new(0.0, 1.0, 0.0);
        let dpdu = Vector3f::new(1.0, 0.3, 0.0);
        BSDF::from_shading(&ns, &dpdu, BxDF::Diffuse(DiffuseBxDF::new(Spectrum::new(0.5))))
    }

    #[test]
    fn frame_is_orthonormal_around_shading_normal() {
        let bsdf = tilted();
        let local = bsdf.render_to_local(&Vector3f::new(0.0, 1.0, 0.0));
        assert!(approx_eq!(f32, local.z, 1.0, epsilon = 1e-6));
        let v = Vector3f::new(0.3, -0.4, 0.5);
        let back = bsdf.local_to_render(&bsdf.render_to_local(&v));
        assert!(approx_eq!(f32, (back - v).length(), 0.0, epsilon = 1e-5));
    }

    #[test]
    fn evaluation_uses_shading_hemisphere() {
        let bsdf = tilted();
        let wo = Vector3f::new(0.0, 1.0, 0.0);
        let up = Vector3f::new(0.6, 0.8, 0.0);
        let down = Vector3f::new(0.6, -0.8, 0.0);
        let f = bsdf.f(&wo, &up, TransportMode::Radiance);
        assert!(approx_eq!(f32, f[0], 0.5 * INV_PI, epsilon = 1e-6));
        assert!(bsdf.f(&wo, &down, TransportMode::Radiance).is_black());
    }

    #[test]
    fn sampling_returns_render_space_directions() {
        let bsdf = tilted();
        let wo = Vector3f::new(0.0, 1.0, 0.0);
        let bs = bsdf
            .sample_f(&wo, 0.5, &Point2f::new(0.3, 0.6), TransportMode::Radiance, BxDFReflTransFlags::ALL)
            .unwrap();
        assert!(bs.wi.y > 0.0);
        let pdf = bsdf.pdf(&wo, &bs.wi, TransportMode::Radiance, BxDFReflTransFlags::ALL);
        assert!(approx_eq!(f32, pdf, bs.pdf, epsilon = 1e-5));
    }

    #[test]
    fn mismatched_flags_and_grazing_outgoing_fail() {
        let bsdf = tilted();
        let u = Point2f::new(0.3, 0.6);
        let wo = Vector3f::new(0.0, 1.0, 0.0);
        assert!(bsdf
            .sample_f(&wo, 0.5, &u, TransportMode::Radiance, BxDFReflTransFlags::TRANSMISSION)
            .is_none());
        let grazing = Vector3f::new(0.0, 0.0, 1.0);
        assert!(bsdf
            .sample_f(&grazing, 0.5, &u, TransportMode::Radiance, BxDFReflTransFlags::ALL)
            .is_none());
    }
}
