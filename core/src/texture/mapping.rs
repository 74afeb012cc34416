//! Texture Mapping

use crate::error::ErrorReporter;
use crate::geometry::*;
use crate::interaction::SurfaceInteraction;
use crate::paramset::TextureParams;
use crate::pbrt::*;
use std::sync::Arc;

/// Interface for 2D texture mapping.
pub trait TextureMapping2D {
    /// Returns the (s, t) texture coordinates.
    ///
    /// * `si` - The surface interaction.
    fn map(&self, si: &SurfaceInteraction) -> Point2f;
}

/// Atomic reference counted `TextureMapping2D`.
pub type ArcTextureMapping2D = Arc<dyn TextureMapping2D + Send + Sync>;

/// Scaled and shifted surface (u, v) coordinates.
pub struct UVMapping2D {
    su: Float,
    sv: Float,
    du: Float,
    dv: Float,
}

impl UVMapping2D {
    /// Create a new `UVMapping2D`.
    ///
    /// * `su` - Scale `u`.
    /// * `sv` - Scale `v`.
    /// * `du` - Shift `u`.
    /// * `dv` - Shift `v`.
    pub fn new(su: Float, sv: Float, du: Float, dv: Float) -> Self {
        Self { su, sv, du, dv }
    }
}

impl Default for UVMapping2D {
    fn default() -> Self {
        Self::new(1.0, 1.0, 0.0, 0.0)
    }
}

impl TextureMapping2D for UVMapping2D {
    fn map(&self, si: &SurfaceInteraction) -> Point2f {
        Point2f::new(
            self.su * si.uv.x + self.du,
            self.sv * si.uv.y + self.dv,
        )
    }
}

/// Projects points onto a sphere around a centre.
pub struct SphericalMapping2D {
    center: Point3f,
}

impl SphericalMapping2D {
    /// Create a new `SphericalMapping2D`.
    ///
    /// * `center` - Centre of projection.
    pub fn new(center: Point3f) -> Self {
        Self { center }
    }
}

impl TextureMapping2D for SphericalMapping2D {
    fn map(&self, si: &SurfaceInteraction) -> Point2f {
        let v = (si.hit.p - self.center).normalize();
        Point2f::new(spherical_theta(&v) * INV_PI, spherical_phi(&v) * INV_TWO_PI)
    }
}

/// Projects points onto a cylinder around the z-axis through a centre.
pub struct CylindricalMapping2D {
    center: Point3f,
}

impl CylindricalMapping2D {
    /// Create a new `CylindricalMapping2D`.
    ///
    /// * `center` - A point on the cylinder axis.
    pub fn new(center: Point3f) -> Self {
        Self { center }
    }
}

impl TextureMapping2D for CylindricalMapping2D {
    fn map(&self, si: &SurfaceInteraction) -> Point2f {
        let v = (si.hit.p - self.center).normalize();
        Point2f::new((PI + v.y.atan2(v.x)) * INV_TWO_PI, v.z)
    }
}

/// Projects points onto a plane spanned by two vectors.
pub struct PlanarMapping2D {
    vs: Vector3f,
    vt: Vector3f,
    ds: Float,
    dt: Float,
}

impl PlanarMapping2D {
    /// Create a new `PlanarMapping2D`.
    ///
    /// * `vs` - Direction of `s`.
    /// * `vt` - Direction of `t`, not parallel to `vs`.
    /// * `ds` - Offset in `s`.
    /// * `dt` - Offset in `t`.
    pub fn new(vs: Vector3f, vt: Vector3f, ds: Float, dt: Float) -> Self {
        Self { vs, vt, ds, dt }
    }
}

impl TextureMapping2D for PlanarMapping2D {
    fn map(&self, si: &SurfaceInteraction) -> Point2f {
        let v = Vector3f::from(si.hit.p);
        Point2f::new(self.ds + v.dot(&self.vs), self.dt + v.dot(&self.vt))
    }
}

/// Builds the 2D mapping named by the `mapping` parameter. Unknown names are
/// reported as errors and fall back to (u, v) mapping.
///
/// * `tp`       - Texture parameters.
/// * `reporter` - Receives configuration errors.
pub fn get_texture_mapping_2d(tp: &TextureParams, reporter: &ErrorReporter) -> ArcTextureMapping2D {
    let mapping = tp.find_string("mapping", String::from("uv"));
    match mapping.as_str() {
        "uv" => Arc::new(UVMapping2D::new(
            tp.find_float("uscale", 1.0),
            tp.find_float("vscale", 1.0),
            tp.find_float("udelta", 0.0),
            tp.find_float("vdelta", 0.0),
        )),
        "spherical" => Arc::new(SphericalMapping2D::new(Point3f::from(
            tp.find_vector3f("center", Vector3f::zero()),
        ))),
        "cylindrical" => Arc::new(CylindricalMapping2D::new(Point3f::from(
            tp.find_vector3f("center", Vector3f::zero()),
        ))),
        "planar" => Arc::new(PlanarMapping2D::new(
            tp.find_vector3f("v1", Vector3f::new(1.0, 0.0, 0.0)),
            tp.find_vector3f("v2", Vector3f::new(0.0, 1.0, 0.0)),
            tp.find_float("udelta", 0.0),
            tp.find_float("vdelta", 0.0),
        )),
        _ => {
            reporter.error(&format!("2D texture mapping '{}' unknown", mapping));
            Arc::new(UVMapping2D::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paramset::ParamSet;
    use float_cmp::approx_eq;

    fn si_at(p: Point3f, uv: Point2f) -> SurfaceInteraction {
        let mut si = SurfaceInteraction::default();
        si.hit.p = p;
        si.uv = uv;
        si
    }

    #[test]
    fn unknown_mapping_falls_back_to_uv() {
        let reporter = ErrorReporter::new(true);
        let tp = TextureParams::new(
            ParamSet::new().add_string("mapping", "bogus"),
            Default::default(),
            Default::default(),
        );
        let m = get_texture_mapping_2d(&tp, &reporter);
        assert_eq!(
            reporter.last_message().as_deref(),
            Some("2D texture mapping 'bogus' unknown")
        );
        let st = m.map(&si_at(Point3f::zero(), Point2f::new(0.25, 0.75)));
        assert_eq!(st, Point2f::new(0.25, 0.75));
    }

    #[test]
    fn scaled_uv_mapping() {
        let m = UVMapping2D::new(2.0, 4.0, 0.5, 0.0);
        let st = m.map(&si_at(Point3f::zero(), Point2f::new(0.25, 0.5)));
        assert!(approx_eq!(Float, st.x, 1.0));
        assert!(approx_eq!(Float, st.y, 2.0));
    }

    #[test]
    fn spherical_mapping_pole() {
        let m = SphericalMapping2D::new(Point3f::new(1.0, 1.0, 1.0));
        let st = m.map(&si_at(Point3f::new(1.0, 1.0, 3.0), Point2f::default()));
        assert!(approx_eq!(Float, st.x, 0.0, epsilon = 1e-6));
    }
}
