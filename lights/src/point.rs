//! Point Light Source

use std::sync::Arc;
use volpath_core::geometry::*;
use volpath_core::interaction::*;
use volpath_core::light::*;
use volpath_core::medium::*;
use volpath_core::paramset::*;
use volpath_core::pbrt::*;
use volpath_core::spectrum::*;

/// An isotropic point light source that emits the same amount of light in
/// all directions.
pub struct PointLight {
    /// Position of the light.
    pub p_light: Point3f,

    /// Radiant intensity.
    pub intensity: Spectrum,

    /// Medium the light sits in.
    pub medium_interface: MediumInterface,
}

impl PointLight {
    /// Returns a new `PointLight`.
    ///
    /// * `p_light`   - Position of the light.
    /// * `intensity` - Radiant intensity.
    /// * `medium`    - Medium the light sits in.
    pub fn new(p_light: Point3f, intensity: Spectrum, medium: Option<ArcMedium>) -> Self {
        Self {
            p_light,
            intensity,
            medium_interface: MediumInterface::from(medium),
        }
    }
}

impl Light for PointLight {
    fn get_type(&self) -> LightType {
        LightType::DELTA_POSITION_LIGHT
    }

    fn sample_li(&self, hit: &Hit, _u: &Point2f) -> Option<Li> {
        let d2 = self.p_light.distance_squared(&hit.p);
        if d2 == 0.0 {
            return None;
        }
        let wi = (self.p_light - hit.p).normalize();
        let p1 = Hit::new(
            self.p_light,
            hit.time,
            Vector3f::zero(),
            Vector3f::zero(),
            Normal3f::zero(),
            Some(self.medium_interface.clone()),
        );
        let vis = VisibilityTester::new(hit.clone(), p1);
        Some(Li::new(wi, 1.0, vis, self.intensity / d2))
    }

    fn power(&self) -> Spectrum {
        4.0 * PI * self.intensity
    }

    fn pdf_li(&self, _hit: &Hit, _wi: &Vector3f) -> Float {
        0.0
    }
}

impl From<(&ParamSet, Option<ArcMedium>)> for PointLight {
    /// Create a `PointLight` from a parameter set and the medium around it.
    ///
    /// * `p` - Parameter set and medium.
    fn from(p: (&ParamSet, Option<ArcMedium>)) -> Self {
        let (params, medium) = p;
        let i = params.find_one_spectrum("I", Spectrum::new(1.0));
        let sc = params.find_one_spectrum("scale", Spectrum::new(1.0));
        let from = params.find_one_point3f("from", Point3f::zero());
        Self::new(from, i * sc, medium)
    }
}

/// Returns a reference counted `PointLight` built from a parameter set.
///
/// * `params` - Parameter set.
/// * `medium` - Medium around the light.
pub fn create_point_light(params: &ParamSet, medium: Option<ArcMedium>) -> ArcLight {
    Arc::new(PointLight::from((params, medium)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn inverse_square_falloff() {
        let light = PointLight::new(Point3f::new(0.0, 0.0, 2.0), Spectrum::new(8.0), None);
        let hit = Hit::new(Point3f::zero(), 0.0, Vector3f::zero(), Vector3f::zero(), Normal3f::zero(), None);
        let li = light.sample_li(&hit, &Point2f::default()).unwrap();
        assert!(approx_eq!(Float, li.value[0], 2.0));
        assert!(approx_eq!(Float, li.wi.z, 1.0));
        assert!(approx_eq!(Float, light.power()[1], 32.0 * PI, epsilon = 1e-4));
    }

    #[test]
    fn coincident_point_has_no_sample() {
        let light = PointLight::new(Point3f::zero(), Spectrum::new(1.0), None);
        let hit = Hit::new(Point3f::zero(), 0.0, Vector3f::zero(), Vector3f::zero(), Normal3f::zero(), None);
        assert!(light.sample_li(&hit, &Point2f::default()).is_none());
    }
}
