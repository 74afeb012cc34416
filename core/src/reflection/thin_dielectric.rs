//! Thin Dielectric

use super::*;

/// A thin slab of dielectric with parallel faces, such as a window pane.
/// Light is either reflected or passes straight through; interreflection
/// between the faces is folded into the reflectance.
#[derive(Copy, Clone, Debug, Default)]
pub struct ThinDielectricBxDF {
    /// Relative index of refraction.
    eta: Float,
}

impl ThinDielectricBxDF {
    /// Create a new `ThinDielectricBxDF`.
    ///
    /// * `eta` - Relative index of refraction.
    pub fn new(eta: Float) -> Self {
        Self { eta }
    }

    /// Returns reflectance and transmittance including the geometric series
    /// of internal bounces.
    ///
    /// * `cos_theta_o` - Cosine of the outgoing direction.
    fn reflectance(&self, cos_theta_o: Float) -> (Float, Float) {
        let mut r = fr_dielectric(cos_theta_o, self.eta);
        let mut t = 1.0 - r;
        if r < 1.0 {
            r += sqr(t) * r / (1.0 - sqr(r));
            t = 1.0 - r;
        }
        (r, t)
    }
}

impl BxDFInterface for ThinDielectricBxDF {
    fn f(&self, _wo: &Vector3f, _wi: &Vector3f, _mode: TransportMode) -> Spectrum {
        Spectrum::new(0.0)
    }

    fn sample_f(
        &self,
        wo: &Vector3f,
        uc: Float,
        _u: &Point2f,
        _mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Option<BSDFSample> {
        if wo.z == 0.0 {
            return None;
        }
        let (r, t) = self.reflectance(cos_theta(wo));
        let pr = if sample_flags.contains(BxDFReflTransFlags::REFLECTION) { r } else { 0.0 };
        let pt = if sample_flags.contains(BxDFReflTransFlags::TRANSMISSION) { t } else { 0.0 };
        if pr == 0.0 && pt == 0.0 {
            return None;
        }

        if uc < pr / (pr + pt) {
            let wi = Vector3f::new(-wo.x, -wo.y, wo.z);
            let fr = Spectrum::new(r / abs_cos_theta(&wi));
            Some(BSDFSample::new(fr, wi, pr / (pr + pt), BxDFFlags::SPECULAR_REFLECTION))
        } else {
            let wi = -(*wo);
            let ft = Spectrum::new(t / abs_cos_theta(&wi));
            Some(BSDFSample::new(ft, wi, pt / (pr + pt), BxDFFlags::SPECULAR_TRANSMISSION))
        }
    }

    fn pdf(
        &self,
        _wo: &Vector3f,
        _wi: &Vector3f,
        _mode: TransportMode,
        _sample_flags: BxDFReflTransFlags,
    ) -> Float {
        0.0
    }

    fn flags(&self) -> BxDFFlags {
        BxDFFlags::REFLECTION | BxDFFlags::TRANSMISSION | BxDFFlags::SPECULAR
    }

    fn regularize(&mut self) {}
}
