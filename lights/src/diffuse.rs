//! Diffuse Area Light

use std::sync::Arc;
use volpath_core::geometry::*;
use volpath_core::interaction::*;
use volpath_core::light::*;
use volpath_core::medium::*;
use volpath_core::paramset::*;
use volpath_core::pbrt::*;
use volpath_core::spectrum::*;

/// An area light that emits uniform radiance from the surface of a shape.
pub struct DiffuseAreaLight {
    /// Emitted radiance.
    pub l_emit: Spectrum,

    /// The emitting shape.
    pub shape: ArcShape,

    /// Emit from both sides of the surface.
    pub two_sided: bool,

    /// Cached surface area of the shape.
    pub area: Float,

    /// Media around the shape.
    pub medium_interface: MediumInterface,
}

impl DiffuseAreaLight {
    /// Returns a new `DiffuseAreaLight`.
    ///
    /// * `l_emit`           - Emitted radiance.
    /// * `shape`            - The emitting shape.
    /// * `two_sided`        - Emit from both sides of the surface.
    /// * `medium_interface` - Media around the shape.
    pub fn new(
        l_emit: Spectrum,
        shape: ArcShape,
        two_sided: bool,
        medium_interface: MediumInterface,
    ) -> Self {
        let area = shape.area();
        Self {
            l_emit,
            shape,
            two_sided,
            area,
            medium_interface,
        }
    }
}

impl Light for DiffuseAreaLight {
    fn get_type(&self) -> LightType {
        LightType::AREA_LIGHT
    }

    fn sample_li(&self, hit: &Hit, u: &Point2f) -> Option<Li> {
        let (mut p_shape, pdf) = self.shape.sample_solid_angle(hit, u);
        if pdf == 0.0 || (p_shape.p - hit.p).length_squared() == 0.0 {
            return None;
        }
        p_shape.medium_interface = Some(self.medium_interface.clone());
        let wi = (p_shape.p - hit.p).normalize();
        let value = self.l(&p_shape, &(-wi));
        if value.is_black() {
            return None;
        }
        let vis = VisibilityTester::new(hit.clone(), p_shape);
        Some(Li::new(wi, pdf, vis, value))
    }

    fn power(&self) -> Spectrum {
        let sides = if self.two_sided { 2.0 } else { 1.0 };
        self.l_emit * (sides * self.area * PI)
    }

    /// Returns `L` on the emitting side of the surface.
    ///
    /// * `hit` - Point on the surface.
    /// * `w`   - Outgoing direction.
    fn l(&self, hit: &Hit, w: &Vector3f) -> Spectrum {
        if self.two_sided || hit.n.dot(w) > 0.0 {
            self.l_emit
        } else {
            Spectrum::new(0.0)
        }
    }

    fn pdf_li(&self, hit: &Hit, wi: &Vector3f) -> Float {
        self.shape.pdf_solid_angle(hit, wi)
    }
}

/// Returns a reference counted `DiffuseAreaLight` built from a parameter set.
///
/// * `params`           - Parameter set.
/// * `shape`            - The emitting shape.
/// * `medium_interface` - Media around the shape.
pub fn create_diffuse_area_light(
    params: &ParamSet,
    shape: ArcShape,
    medium_interface: MediumInterface,
) -> ArcLight {
    let l = params.find_one_spectrum("L", Spectrum::new(1.0));
    let sc = params.find_one_spectrum("scale", Spectrum::new(1.0));
    let two_sided = params.find_one_bool("twosided", false);
    Arc::new(DiffuseAreaLight::new(l * sc, shape, two_sided, medium_interface))
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;
    use shapes::Sphere;

    fn bulb(two_sided: bool) -> DiffuseAreaLight {
        let sphere = Arc::new(Sphere::new(Point3f::zero(), 1.0, false));
        DiffuseAreaLight::new(Spectrum::new(3.0), sphere, two_sided, MediumInterface::default())
    }

    fn viewer(p: Point3f) -> Hit {
        Hit::new(p, 0.0, Vector3f::zero(), Vector3f::zero(), Normal3f::zero(), None)
    }

    #[test]
    fn power_counts_sides() {
        let one = bulb(false).power()[0];
        let two = bulb(true).power()[0];
        assert!(approx_eq!(Float, one, 3.0 * 4.0 * PI * PI, epsilon = 1e-2));
        assert!(approx_eq!(Float, two, 2.0 * one, epsilon = 1e-2));
    }

    #[test]
    fn one_sided_emission_follows_normal() {
        let light = bulb(false);
        let hit = viewer(Point3f::new(0.0, 0.0, 1.0));
        let mut on_surface = hit.clone();
        on_surface.n = Normal3f::new(0.0, 0.0, 1.0);
        assert!(approx_eq!(Float, light.l(&on_surface, &Vector3f::new(0.0, 0.0, 1.0))[0], 3.0));
        assert!(light.l(&on_surface, &Vector3f::new(0.0, 0.0, -1.0)).is_black());
        assert!(!bulb(true).l(&on_surface, &Vector3f::new(0.0, 0.0, -1.0)).is_black());
    }

    proptest! {
        #[test]
        fn samples_face_the_viewer(u0 in 0.0..1.0 as Float, u1 in 0.0..1.0 as Float) {
            let light = bulb(false);
            let hit = viewer(Point3f::new(0.0, 0.0, 5.0));
            if let Some(li) = light.sample_li(&hit, &Point2f::new(u0, u1)) {
                prop_assert!(li.wi.z < 0.0);
                prop_assert!(li.pdf > 0.0);
                prop_assert!(approx_eq!(Float, li.value[1], 3.0));
            }
        }
    }
}
