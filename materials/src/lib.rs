//! Materials

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

mod coated_conductor;
mod coated_diffuse;
mod conductor;
mod dielectric;
mod diffuse;
mod hair;
mod interface;
mod measured;
mod roughness;
mod subsurface;
mod thin_dielectric;

// Re-export
pub use coated_conductor::*;
pub use coated_diffuse::*;
pub use conductor::*;
pub use dielectric::*;
pub use diffuse::*;
pub use hair::*;
pub use interface::*;
pub use measured::*;
pub use roughness::*;
pub use subsurface::*;
pub use thin_dielectric::*;

#[cfg(test)]
pub(crate) mod test_util {
    use volpath_core::geometry::*;
    use volpath_core::interaction::*;
    use volpath_core::paramset::*;

    /// Surface point at the origin facing +z, viewed from above.
    pub fn facing_up() -> SurfaceInteraction {
        SurfaceInteraction::new(
            Point3f::zero(),
            Vector3f::zero(),
            Point2f::new(0.5, 0.5),
            Vector3f::new(0.0, 0.0, 1.0),
            Vector3f::new(1.0, 0.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
            0.0,
            false,
        )
    }

    /// Wraps a parameter set without named textures.
    pub fn tex_params(params: ParamSet) -> TextureParams {
        TextureParams::new(params, Default::default(), Default::default())
    }
}
