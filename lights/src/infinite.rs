//! Uniform Infinite Light Source

use crate::WorldSphere;
use std::sync::Arc;
use volpath_core::geometry::*;
use volpath_core::interaction::*;
use volpath_core::light::*;
use volpath_core::paramset::*;
use volpath_core::pbrt::*;
use volpath_core::sampling::*;
use volpath_core::scene::*;
use volpath_core::spectrum::*;

/// An environment that surrounds the scene and emits the same radiance from
/// every direction.
pub struct UniformInfiniteLight {
    /// Emitted radiance.
    pub l_emit: Spectrum,

    /// Bounding sphere of the scene.
    world: WorldSphere,
}

impl UniformInfiniteLight {
    /// Returns a new `UniformInfiniteLight`.
    ///
    /// * `l_emit` - Emitted radiance.
    pub fn new(l_emit: Spectrum) -> Self {
        Self {
            l_emit,
            world: WorldSphere::default(),
        }
    }
}

impl Light for UniformInfiniteLight {
    fn preprocess(&self, scene: &Scene) {
        self.world.update(scene);
    }

    fn get_type(&self) -> LightType {
        LightType::INFINITE_LIGHT
    }

    fn sample_li(&self, hit: &Hit, u: &Point2f) -> Option<Li> {
        let wi = uniform_sample_sphere(u);
        let p_outside = hit.p + wi * (2.0 * self.world.radius());
        let p1 = Hit::new(
            p_outside,
            hit.time,
            Vector3f::zero(),
            Vector3f::zero(),
            Normal3f::zero(),
            hit.medium_interface.clone(),
        );
        let vis = VisibilityTester::new(hit.clone(), p1);
        Some(Li::new(wi, uniform_sphere_pdf(), vis, self.l_emit))
    }

    fn power(&self) -> Spectrum {
        let r = self.world.radius();
        self.l_emit * (4.0 * PI * PI * r * r)
    }

    fn le(&self, _ray: &Ray) -> Spectrum {
        self.l_emit
    }

    fn pdf_li(&self, _hit: &Hit, _wi: &Vector3f) -> Float {
        uniform_sphere_pdf()
    }
}

impl From<&ParamSet> for UniformInfiniteLight {
    /// Create a `UniformInfiniteLight` from a parameter set.
    ///
    /// * `params` - Parameter set.
    fn from(params: &ParamSet) -> Self {
        let l = params.find_one_spectrum("L", Spectrum::new(1.0));
        let sc = params.find_one_spectrum("scale", Spectrum::new(1.0));
        Self::new(l * sc)
    }
}

/// Returns a reference counted `UniformInfiniteLight` built from a parameter
/// set.
///
/// * `params` - Parameter set.
pub fn create_infinite_light(params: &ParamSet) -> ArcLight {
    Arc::new(UniformInfiniteLight::from(params))
}
