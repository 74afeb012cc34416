//! Scene

use crate::geometry::*;
use crate::interaction::*;
use crate::light::*;
use crate::primitives::*;
use crate::sampler::*;
use crate::spectrum::*;

/// The geometry and lights being rendered.
#[derive(Clone)]
pub struct Scene {
    /// An aggregate of all primitives in the scene.
    pub aggregate: ArcPrimitive,

    /// All light sources in the scene.
    pub lights: Vec<ArcLight>,

    /// Lights that contribute radiance to rays escaping the scene.
    pub infinite_lights: Vec<ArcLight>,

    /// The bounding box of the scene geometry.
    pub world_bound: Bounds3f,
}

impl Scene {
    /// Creates a new `Scene` and runs every light's preprocessing step.
    ///
    /// * `aggregate` - An aggregate of all primitives in the scene.
    /// * `lights`    - All light sources in the scene.
    pub fn new(aggregate: ArcPrimitive, lights: Vec<ArcLight>) -> Self {
        let infinite_lights = lights
            .iter()
            .filter(|l| l.get_type().matches(LightType::INFINITE_LIGHT))
            .cloned()
            .collect();
        let scene = Self {
            world_bound: aggregate.world_bound(),
            aggregate,
            lights,
            infinite_lights,
        };

        for light in scene.lights.iter() {
            light.preprocess(&scene);
        }

        scene
    }

    /// Returns the closest intersection along the ray, shortening
    /// `ray.t_max` to it.
    ///
    /// * `ray` - The ray to trace.
    pub fn intersect(&self, ray: &mut Ray) -> Option<SurfaceInteraction> {
        self.aggregate.intersect(ray)
    }

    /// Returns `true` if the ray hits anything.
    ///
    /// * `ray` - The ray to trace.
    pub fn intersect_p(&self, ray: &Ray) -> bool {
        self.aggregate.intersect_p(ray)
    }

    /// Returns the first intersection with a surface that scatters light
    /// along with the beam transmittance up to it. Surfaces without a
    /// material are crossed. The transmittance is returned even when the ray
    /// escapes.
    ///
    /// * `ray`     - The ray to trace. Updated to the final segment.
    /// * `sampler` - The sampler.
    pub fn intersect_tr(
        &self,
        ray: &mut Ray,
        sampler: &mut dyn Sampler,
    ) -> (Option<SurfaceInteraction>, Spectrum) {
        let mut tr = Spectrum::new(1.0);

        loop {
            let isect = self.intersect(ray);

            if let Some(medium) = ray.medium.as_ref() {
                tr *= medium.tr(ray, sampler);
            }

            match isect {
                None => return (None, tr),
                Some(si) if si.material.is_some() => return (Some(si), tr),
                Some(si) => *ray = si.hit.spawn_ray(&ray.d),
            }
        }
    }
}
