//! Visibility Tester

use crate::interaction::*;
use crate::sampler::*;
use crate::scene::*;
use crate::spectrum::*;

/// Endpoints of a shadow ray. Lights return radiance under the assumption
/// that both are mutually visible.
#[derive(Clone)]
pub struct VisibilityTester {
    /// One endpoint of shadow ray.
    pub p0: Hit,

    /// Second endpoint of shadow ray.
    pub p1: Hit,
}

impl VisibilityTester {
    /// Create a new `VisibilityTester` for given endpoints of a shadow ray.
    ///
    /// * `p0` - One endpoint of shadow ray.
    /// * `p1` - Second endpoint of shadow ray.
    pub fn new(p0: Hit, p1: Hit) -> Self {
        Self { p0, p1 }
    }

    /// Returns true if no surface blocks the segment.
    ///
    /// * `scene` - The scene.
    pub fn unoccluded(&self, scene: &Scene) -> bool {
        !scene.intersect_p(&self.p0.spawn_ray_to_hit(&self.p1))
    }

    /// Returns the beam transmittance along the segment. Surfaces with a
    /// material block it entirely; medium boundaries are crossed.
    ///
    /// * `scene`   - The scene.
    /// * `sampler` - The sampler.
    pub fn tr(&self, scene: &Scene, sampler: &mut dyn Sampler) -> Spectrum {
        let mut ray = self.p0.spawn_ray_to_hit(&self.p1);
        let mut tr = Spectrum::new(1.0);

        loop {
            let isect = scene.intersect(&mut ray);

            if let Some(si) = isect.as_ref() {
                if si.material.is_some() {
                    return Spectrum::new(0.0);
                }
            }

            if let Some(medium) = ray.medium.as_ref() {
                tr *= medium.tr(&ray, sampler);
            }

            match isect {
                Some(si) => ray = si.hit.spawn_ray_to_hit(&self.p1),
                None => break,
            }
        }
        tr
    }
}
