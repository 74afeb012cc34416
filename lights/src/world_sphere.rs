//! Scene Bounding Sphere

use std::sync::RwLock;
use volpath_core::geometry::*;
use volpath_core::pbrt::*;
use volpath_core::scene::*;

/// Bounding sphere of the scene, filled in when lights at infinity are
/// preprocessed.
pub struct WorldSphere {
    /// Centre of the world.
    center: RwLock<Point3f>,

    /// Radius of the world.
    radius: RwLock<Float>,
}

impl Default for WorldSphere {
    fn default() -> Self {
        Self {
            center: RwLock::new(Point3f::zero()),
            radius: RwLock::new(1.0),
        }
    }
}

impl WorldSphere {
    /// Stores the bounding sphere of the scene.
    ///
    /// * `scene` - The scene.
    pub fn update(&self, scene: &Scene) {
        let (center, radius) = scene.world_bound.bounding_sphere();
        debug!("World sphere centre {}, radius {}", center, radius);
        match self.center.write() {
            Ok(mut c) => *c = center,
            Err(poisoned) => *poisoned.into_inner() = center,
        }
        match self.radius.write() {
            Ok(mut r) => *r = radius,
            Err(poisoned) => *poisoned.into_inner() = radius,
        }
    }

    /// Returns the centre.
    pub fn center(&self) -> Point3f {
        match self.center.read() {
            Ok(c) => *c,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Returns the radius.
    pub fn radius(&self) -> Float {
        match self.radius.read() {
            Ok(r) => *r,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
