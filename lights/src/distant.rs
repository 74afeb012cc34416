//! Distant Source

use crate::WorldSphere;
use std::sync::Arc;
use volpath_core::geometry::*;
use volpath_core::interaction::*;
use volpath_core::light::*;
use volpath_core::paramset::*;
use volpath_core::pbrt::*;
use volpath_core::scene::*;
use volpath_core::spectrum::*;

/// A directional light source that deposits illumination from the same
/// direction at every point in space.
pub struct DistantLight {
    /// The emitted radiance `L`.
    pub l_emit: Spectrum,

    /// Unit direction towards the light.
    pub w_light: Vector3f,

    /// Bounding sphere of the scene.
    world: WorldSphere,
}

impl DistantLight {
    /// Returns a new `DistantLight`.
    ///
    /// * `l_emit`  - The emitted radiance.
    /// * `w_light` - Direction towards the light.
    pub fn new(l_emit: Spectrum, w_light: Vector3f) -> Self {
        Self {
            l_emit,
            w_light: w_light.normalize(),
            world: WorldSphere::default(),
        }
    }
}

impl Light for DistantLight {
    fn preprocess(&self, scene: &Scene) {
        self.world.update(scene);
    }

    fn get_type(&self) -> LightType {
        LightType::DELTA_DIRECTION_LIGHT
    }

    /// Returns the radiance arriving from the light's direction. The shadow
    /// ray ends outside the scene bounds.
    ///
    /// * `hit` - The reference point.
    /// * `_u`  - Unused.
    fn sample_li(&self, hit: &Hit, _u: &Point2f) -> Option<Li> {
        let p_outside = hit.p + self.w_light * (2.0 * self.world.radius());
        let p1 = Hit::new(
            p_outside,
            hit.time,
            Vector3f::zero(),
            Vector3f::zero(),
            Normal3f::zero(),
            hit.medium_interface.clone(),
        );
        let vis = VisibilityTester::new(hit.clone(), p1);
        Some(Li::new(self.w_light, 1.0, vis, self.l_emit))
    }

    fn power(&self) -> Spectrum {
        let r = self.world.radius();
        self.l_emit * (PI * r * r)
    }

    fn pdf_li(&self, _hit: &Hit, _wi: &Vector3f) -> Float {
        0.0
    }
}

impl From<&ParamSet> for DistantLight {
    /// Create a `DistantLight` from a parameter set. The light shines from
    /// `from` towards `to`.
    ///
    /// * `params` - Parameter set.
    fn from(params: &ParamSet) -> Self {
        let l = params.find_one_spectrum("L", Spectrum::new(1.0));
        let sc = params.find_one_spectrum("scale", Spectrum::new(1.0));
        let from = params.find_one_point3f("from", Point3f::new(0.0, 0.0, 0.0));
        let to = params.find_one_point3f("to", Point3f::new(0.0, 0.0, 1.0));
        Self::new(l * sc, from - to)
    }
}

/// Returns a reference counted `DistantLight` built from a parameter set.
///
/// * `params` - Parameter set.
pub fn create_distant_light(params: &ParamSet) -> ArcLight {
    Arc::new(DistantLight::from(params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use shapes::Sphere;
    use volpath_core::medium::MediumInterface;
    use volpath_core::primitives::*;

    fn scene_with(light: ArcLight) -> Scene {
        let sphere = Arc::new(Sphere::new(Point3f::new(0.0, 0.0, 0.0), 2.0, false));
        let prim: ArcPrimitive = Arc::new(GeometricPrimitive::new(sphere, None, None, MediumInterface::default()));
        Scene::new(prim, vec![light])
    }

    #[test]
    fn power_uses_world_radius() {
        let light = Arc::new(DistantLight::new(Spectrum::new(2.0), Vector3f::new(0.0, 1.0, 0.0)));
        let _scene = scene_with(light.clone());
        let r2 = 12.0; // bounding sphere of the cube around the sphere
        assert!(approx_eq!(Float, light.power()[0], 2.0 * PI * r2, epsilon = 1e-3));
    }

    #[test]
    fn samples_fixed_direction() {
        let params = ParamSet::new()
            .add_point3f("from", &[Point3f::new(0.0, 4.0, 0.0)])
            .add_point3f("to", &[Point3f::zero()])
            .add_rgb("L", &[1.0, 2.0, 3.0]);
        let light = DistantLight::from(&params);
        let hit = Hit::new(
            Point3f::new(5.0, 0.0, 0.0),
            0.0,
            Vector3f::zero(),
            Vector3f::zero(),
            Normal3f::zero(),
            None,
        );
        let li = light.sample_li(&hit, &Point2f::new(0.3, 0.7)).unwrap();
        assert!(approx_eq!(Float, li.wi.y, 1.0));
        assert!(approx_eq!(Float, li.pdf, 1.0));
        assert!(approx_eq!(Float, li.value[2], 3.0));
        assert!(li.visibility.p1.p.y > 0.0);
        assert!(light.is_delta_light());
        assert_eq!(light.pdf_li(&hit, &li.wi), 0.0);
    }
}
