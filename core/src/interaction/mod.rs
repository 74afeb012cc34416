//! Interactions

use crate::geometry::*;
use crate::medium::*;
use crate::pbrt::*;

mod medium_interaction;
mod surface_interaction;

pub use medium_interaction::*;
pub use surface_interaction::*;

/// Data shared by surface and medium interactions.
#[derive(Clone, Default)]
pub struct Hit {
    /// Point of interaction.
    pub p: Point3f,

    /// Time when interaction occurred.
    pub time: Float,

    /// Conservative bound on the floating point error in `p`.
    pub p_error: Vector3f,

    /// The negative ray direction.
    pub wo: Vector3f,

    /// Surface normal at `p`. Zero for medium interactions.
    pub n: Normal3f,

    /// Media on either side of the surface.
    pub medium_interface: Option<MediumInterface>,
}

impl Hit {
    /// Create a new hit.
    ///
    /// `p`                - Point of interaction.
    /// `time`             - Time when interaction occurred.
    /// `p_error`          - Floating point error for ray intersection points.
    /// `wo`               - The negative ray direction. Normalized unless zero.
    /// `n`                - Surface normal at the point `p`.
    /// `medium_interface` - The medium interface used for scattering media.
    pub fn new(
        p: Point3f,
        time: Float,
        p_error: Vector3f,
        wo: Vector3f,
        n: Normal3f,
        medium_interface: Option<MediumInterface>,
    ) -> Self {
        Self {
            p,
            time,
            p_error,
            wo: if wo.is_zero() { wo } else { wo.normalize() },
            n,
            medium_interface,
        }
    }

    /// Spawns a new ray in the given direction.
    ///
    /// * `d` - The new direction.
    pub fn spawn_ray(&self, d: &Vector3f) -> Ray {
        let origin = offset_ray_origin(&self.p, &self.p_error, &self.n, d);
        Ray::new(origin, *d, INFINITY, self.time, self.get_medium_in_direction(d))
    }

    /// Spawns a ray towards a point that stops just short of it.
    ///
    /// * `p` - The target point.
    pub fn spawn_ray_to_point(&self, p: &Point3f) -> Ray {
        let origin = offset_ray_origin(&self.p, &self.p_error, &self.n, &(*p - self.p));
        let d = *p - origin;
        Ray::new(
            origin,
            d,
            1.0 - SHADOW_EPSILON,
            self.time,
            self.get_medium_in_direction(&d),
        )
    }

    /// Spawns a ray towards another interaction, offsetting both ends.
    ///
    /// * `hit` - The interaction.
    pub fn spawn_ray_to_hit(&self, hit: &Hit) -> Ray {
        let origin = offset_ray_origin(&self.p, &self.p_error, &self.n, &(hit.p - self.p));
        let target = offset_ray_origin(&hit.p, &hit.p_error, &hit.n, &(origin - hit.p));
        let d = target - origin;
        Ray::new(
            origin,
            d,
            1.0 - SHADOW_EPSILON,
            self.time,
            self.get_medium_in_direction(&d),
        )
    }

    /// Returns the medium on the side of the surface a direction points to.
    ///
    /// * `w` - The direction.
    pub fn get_medium_in_direction(&self, w: &Vector3f) -> Option<ArcMedium> {
        self.medium_interface.as_ref().and_then(|mi| {
            if w.dot(&self.n) > 0.0 {
                mi.outside.clone()
            } else {
                mi.inside.clone()
            }
        })
    }
}
