//! Geometric Primitives

use super::*;
use crate::medium::*;

/// A single shape with its material, emission and media.
#[derive(Clone)]
pub struct GeometricPrimitive {
    /// The shape.
    pub shape: ArcShape,

    /// The material.
    pub material: Option<ArcMaterial>,

    /// Emission if the shape is a light source.
    pub area_light: Option<ArcLight>,

    /// Media inside and outside the shape.
    pub medium_interface: MediumInterface,
}

impl GeometricPrimitive {
    /// Create a new geometric primitive.
    ///
    /// * `shape`            - The shape.
    /// * `material`         - The material. `None` for medium boundaries.
    /// * `area_light`       - Emission if the shape is a light source.
    /// * `medium_interface` - Media inside and outside the shape.
    pub fn new(
        shape: ArcShape,
        material: Option<ArcMaterial>,
        area_light: Option<ArcLight>,
        medium_interface: MediumInterface,
    ) -> Self {
        Self {
            shape,
            material,
            area_light,
            medium_interface,
        }
    }
}

impl Primitive for GeometricPrimitive {
    fn world_bound(&self) -> Bounds3f {
        self.shape.world_bound()
    }

    fn intersect(&self, r: &mut Ray) -> Option<SurfaceInteraction> {
        let Intersection { t, mut isect } = self.shape.intersect(r)?;
        r.t_max = t;

        isect.material = self.material.clone();
        isect.area_light = self.area_light.clone();

        // A surface that does not change media inherits the medium of the ray.
        isect.hit.medium_interface = if self.medium_interface.is_medium_transition() {
            Some(self.medium_interface.clone())
        } else {
            r.medium.clone().map(|m| MediumInterface::from(Some(m)))
        };
        Some(isect)
    }

    fn intersect_p(&self, r: &Ray) -> bool {
        self.shape.intersect_p(r)
    }

    fn get_area_light(&self) -> Option<ArcLight> {
        self.area_light.clone()
    }

    fn get_material(&self) -> Option<ArcMaterial> {
        self.material.clone()
    }
}
