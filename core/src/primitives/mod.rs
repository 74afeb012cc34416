//! Primitives

use crate::geometry::*;
use crate::interaction::*;
use crate::light::ArcLight;
use crate::material::ArcMaterial;
use std::sync::Arc;

mod geometric_primitive;
mod primitive_list;

// Re-export
pub use geometric_primitive::*;
pub use primitive_list::*;

/// Bridges shapes with materials, lights and media.
pub trait Primitive {
    /// Returns a bounding box in world space.
    fn world_bound(&self) -> Bounds3f;

    /// Returns the closest intersection and shortens `r.t_max` to it.
    ///
    /// * `r` - The ray.
    fn intersect(&self, r: &mut Ray) -> Option<SurfaceInteraction>;

    /// Returns `true` if the ray hits the primitive.
    ///
    /// * `r` - The ray.
    fn intersect_p(&self, r: &Ray) -> bool;

    /// Returns the emission of the primitive if it is a light source.
    fn get_area_light(&self) -> Option<ArcLight>;

    /// Returns the material. `None` means the primitive only delimits
    /// participating media and rays pass through it.
    fn get_material(&self) -> Option<ArcMaterial>;
}

/// Atomic reference counted `Primitive`.
pub type ArcPrimitive = Arc<dyn Primitive + Send + Sync>;
