//! Shapes

use super::*;
use crate::interaction::*;
use crate::pbrt::*;
use std::sync::Arc;

/// Geometry that rays can hit and that area lights can be attached to.
/// Shapes are defined directly in world space.
pub trait Shape {
    /// Returns the shape type for debugging.
    fn get_type(&self) -> &'static str;

    /// Returns a bounding box in world space.
    fn world_bound(&self) -> Bounds3f;

    /// Returns the closest intersection with the ray within `(0, r.t_max)`.
    ///
    /// * `r` - The ray.
    fn intersect(&self, r: &Ray) -> Option<Intersection>;

    /// Returns `true` if the ray hits the shape within `(0, r.t_max)`.
    ///
    /// * `r` - The ray.
    fn intersect_p(&self, r: &Ray) -> bool {
        self.intersect(r).is_some()
    }

    /// Returns the surface area.
    fn area(&self) -> Float;

    /// Samples a point uniformly by area. The returned `Hit` has no outgoing
    /// direction. Returns the point and its density with respect to area.
    ///
    /// * `u` - Sample value to use.
    fn sample_area(&self, u: &Point2f) -> (Hit, Float);

    /// Samples a point as seen from a reference point. Returns the point and
    /// its density with respect to solid angle at the reference point.
    ///
    /// * `hit` - Reference point.
    /// * `u`   - Sample value to use.
    fn sample_solid_angle(&self, hit: &Hit, u: &Point2f) -> (Hit, Float) {
        let (intr, pdf) = self.sample_area(u);
        let wi = intr.p - hit.p;
        if wi.length_squared() == 0.0 {
            return (intr, 0.0);
        }

        let wi = wi.normalize();
        let pdf = pdf * hit.p.distance_squared(&intr.p) / intr.n.abs_dot(&(-wi));
        (intr, if pdf.is_infinite() { 0.0 } else { pdf })
    }

    /// Returns the solid angle density of `sample_solid_angle()` for a
    /// direction from a reference point.
    ///
    /// * `hit` - Reference point.
    /// * `wi`  - The incident direction.
    fn pdf_solid_angle(&self, hit: &Hit, wi: &Vector3f) -> Float {
        let ray = hit.spawn_ray(wi);
        match self.intersect(&ray) {
            Some(Intersection { isect, .. }) => {
                let pdf = hit.p.distance_squared(&isect.hit.p) / (isect.hit.n.abs_dot(&(-*wi)) * self.area());
                if pdf.is_infinite() {
                    0.0
                } else {
                    pdf
                }
            }
            None => 0.0,
        }
    }
}

/// Atomic reference counted `Shape`.
pub type ArcShape = Arc<dyn Shape + Send + Sync>;

/// A ray-shape intersection.
pub struct Intersection {
    /// The parameter along the ray where intersection occurred.
    pub t: Float,

    /// The surface interaction details.
    pub isect: SurfaceInteraction,
}

impl Intersection {
    /// Create a new intersection.
    ///
    /// * `t`     - The parameter along the ray where intersection occurred.
    /// * `isect` - The surface interaction details.
    pub fn new(t: Float, isect: SurfaceInteraction) -> Self {
        Self { t, isect }
    }
}
