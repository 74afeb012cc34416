//! Perspective Camera

use std::sync::Arc;
use volpath_core::camera::*;
use volpath_core::film::*;
use volpath_core::geometry::*;
use volpath_core::medium::*;
use volpath_core::paramset::*;
use volpath_core::pbrt::*;
use volpath_core::sampling::*;

/// Orthonormal camera frame in world space built from a look-at
/// description.
#[derive(Copy, Clone, Debug)]
pub struct LookAt {
    /// Camera position.
    pub pos: Point3f,

    /// Image right.
    pub right: Vector3f,

    /// Image up.
    pub up: Vector3f,

    /// Viewing direction.
    pub dir: Vector3f,
}

impl LookAt {
    /// Returns a new camera frame. Returns `None` if the viewing direction is
    /// degenerate or parallel to `up`.
    ///
    /// * `pos`  - Camera position.
    /// * `look` - Point the camera looks at.
    /// * `up`   - Approximate up direction.
    pub fn new(pos: Point3f, look: Point3f, up: Vector3f) -> Option<Self> {
        let d = look - pos;
        if d.length_squared() == 0.0 || up.length_squared() == 0.0 {
            return None;
        }
        let dir = d.normalize();
        let right = dir.cross(&up.normalize());
        if right.length_squared() == 0.0 {
            return None;
        }
        let right = right.normalize();
        let up = right.cross(&dir);
        Some(Self { pos, right, up, dir })
    }

    /// Transforms a camera space vector (x right, y up, z forward) to world
    /// space.
    ///
    /// * `v` - The vector.
    pub fn to_world(&self, v: &Vector3f) -> Vector3f {
        self.right * v.x + self.up * v.y + self.dir * v.z
    }
}

/// Perspective camera.
pub struct PerspectiveCamera {
    /// Common camera parameters.
    pub data: CameraData,

    /// Camera frame.
    pub frame: LookAt,

    /// Screen window scaled by the field of view, at unit distance.
    pub screen: Bounds2f,

    /// Radius of camera lens.
    pub lens_radius: Float,

    /// Distance to the plane of focus.
    pub focal_distance: Float,
}

impl PerspectiveCamera {
    /// Create a new perspective camera.
    ///
    /// * `frame`          - Camera frame.
    /// * `shutter_open`   - Time when shutter is open.
    /// * `shutter_close`  - Time when shutter is closed.
    /// * `lens_radius`    - Radius of camera lens.
    /// * `focal_distance` - Focal distance.
    /// * `fov`            - Field-of-view of the shorter image axis in degrees.
    /// * `film`           - The film to capture the rendered image.
    /// * `medium`         - Scattering medium the camera lies in.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        frame: LookAt,
        shutter_open: Float,
        shutter_close: Float,
        lens_radius: Float,
        focal_distance: Float,
        fov: Float,
        film: Film,
        medium: Option<ArcMedium>,
    ) -> Self {
        let res = film.full_resolution;
        let aspect = res.x as Float / res.y as Float;
        let (sx, sy) = if aspect > 1.0 {
            (aspect, 1.0)
        } else {
            (1.0, 1.0 / aspect)
        };
        let tan_half = (radians(fov) / 2.0).tan();
        let screen = Bounds2f::new(
            Point2f::new(-sx * tan_half, -sy * tan_half),
            Point2f::new(sx * tan_half, sy * tan_half),
        );

        Self {
            data: CameraData::new(shutter_open, shutter_close, film, medium),
            frame,
            screen,
            lens_radius,
            focal_distance,
        }
    }

    /// Returns the camera space direction through a raster position. Raster
    /// y grows downwards.
    ///
    /// * `p_film` - Raster position.
    fn raster_to_camera(&self, p_film: &Point2f) -> Vector3f {
        let res = self.data.film.full_resolution;
        let x = lerp(
            p_film.x / res.x as Float,
            self.screen.p_min.x,
            self.screen.p_max.x,
        );
        let y = lerp(
            p_film.y / res.y as Float,
            self.screen.p_max.y,
            self.screen.p_min.y,
        );
        Vector3f::new(x, y, 1.0)
    }
}

impl Camera for PerspectiveCamera {
    fn get_data(&self) -> &CameraData {
        &self.data
    }

    /// Returns a ray corresponding to a given sample. The weight is always 1.
    ///
    /// * `sample` - The sample.
    fn generate_ray(&self, sample: &CameraSample) -> (Ray, Float) {
        let mut o = Point3f::zero();
        let mut d = self.raster_to_camera(&sample.p_film).normalize();

        // Modify ray for depth of field.
        if self.lens_radius > 0.0 {
            let p_lens = concentric_sample_disk(&sample.p_lens);
            let p_lens = Point2f::new(p_lens.x * self.lens_radius, p_lens.y * self.lens_radius);
            let ft = self.focal_distance / d.z;
            let p_focus = Point3f::from(d * ft);
            o = Point3f::new(p_lens.x, p_lens.y, 0.0);
            d = (p_focus - o).normalize();
        }

        let o_world = self.frame.pos + self.frame.to_world(&Vector3f::from(o));
        let ray = Ray::new(
            o_world,
            self.frame.to_world(&d),
            INFINITY,
            lerp(sample.time, self.data.shutter_open, self.data.shutter_close),
            self.data.medium.clone(),
        );
        (ray, 1.0)
    }
}

impl From<(&ParamSet, Film, Option<ArcMedium>)> for PerspectiveCamera {
    /// Create a `PerspectiveCamera` from a parameter set, the film and the
    /// medium the camera sits in. A degenerate look-at falls back to looking
    /// down +z from the origin.
    ///
    /// * `p` - Tuple containing the parameter set, film and medium.
    fn from(p: (&ParamSet, Film, Option<ArcMedium>)) -> Self {
        let (params, film, medium) = p;

        let pos = params.find_one_point3f("from", Point3f::zero());
        let look = params.find_one_point3f("to", Point3f::new(0.0, 0.0, 1.0));
        let up = params.find_one_vector3f("up", Vector3f::new(0.0, 1.0, 0.0));
        let frame = match LookAt::new(pos, look, up) {
            Some(frame) => frame,
            None => {
                warn!("Degenerate look-at for perspective camera. Using default view.");
                LookAt::new(pos, pos + Vector3f::new(0.0, 0.0, 1.0), Vector3f::new(0.0, 1.0, 0.0))
                    .unwrap_or(LookAt {
                        pos,
                        right: Vector3f::new(-1.0, 0.0, 0.0),
                        up: Vector3f::new(0.0, 1.0, 0.0),
                        dir: Vector3f::new(0.0, 0.0, 1.0),
                    })
            }
        };

        let mut shutter_open = params.find_one_float("shutteropen", 0.0);
        let mut shutter_close = params.find_one_float("shutterclose", 1.0);
        if shutter_close < shutter_open {
            warn!(
                "Shutter close time [{}] < shutter open [{}].  Swapping them.",
                shutter_close, shutter_open
            );
            std::mem::swap(&mut shutter_open, &mut shutter_close);
        }

        let lens_radius = params.find_one_float("lensradius", 0.0);
        let focal_distance = params.find_one_float("focaldistance", 1e6);
        let fov = clamp(params.find_one_float("fov", 90.0), 1e-2, 179.0);

        Self::new(
            frame,
            shutter_open,
            shutter_close,
            lens_radius,
            focal_distance,
            fov,
            film,
            medium,
        )
    }
}

/// Returns a reference counted `PerspectiveCamera` built from a parameter set.
///
/// * `params` - Parameter set.
/// * `film`   - The film.
/// * `medium` - Medium around the camera.
pub fn create_perspective_camera(params: &ParamSet, film: Film, medium: Option<ArcMedium>) -> ArcCamera {
    Arc::new(PerspectiveCamera::from((params, film, medium)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    fn camera(xres: Int, yres: Int, fov: Float) -> PerspectiveCamera {
        let params = ParamSet::new()
            .add_point3f("from", &[Point3f::new(0.0, 0.0, -5.0)])
            .add_point3f("to", &[Point3f::zero()])
            .add_float("fov", &[fov]);
        let film = Film::new(&Point2i::new(xres, yres), "test.png");
        PerspectiveCamera::from((&params, film, None))
    }

    #[test]
    fn center_ray_looks_at_target() {
        let cam = camera(64, 64, 45.0);
        let sample = CameraSample::new(Point2f::new(32.0, 32.0), Point2f::new(0.5, 0.5), 0.0);
        let (ray, w) = cam.generate_ray(&sample);
        assert_eq!(w, 1.0);
        assert!(approx_eq!(Float, ray.o.z, -5.0));
        assert!(approx_eq!(Float, ray.d.z, 1.0, epsilon = 1e-6));
    }

    #[test]
    fn corner_ray_matches_field_of_view() {
        let cam = camera(100, 50, 60.0);
        let sample = CameraSample::new(Point2f::new(50.0, 0.0), Point2f::default(), 0.0);
        let (ray, _) = cam.generate_ray(&sample);
        // Top edge of the shorter axis sits at half the field of view.
        let angle = ray.d.y.atan2(ray.d.z);
        assert!(approx_eq!(Float, angle, radians(30.0), epsilon = 1e-4));
    }

    #[test]
    fn raster_x_maps_to_image_right() {
        let cam = camera(64, 64, 90.0);
        let left = cam.generate_ray(&CameraSample::new(Point2f::new(0.0, 32.0), Point2f::default(), 0.0)).0;
        let right = cam.generate_ray(&CameraSample::new(Point2f::new(64.0, 32.0), Point2f::default(), 0.0)).0;
        assert!(left.d.dot(&cam.frame.right) < 0.0);
        assert!(right.d.dot(&cam.frame.right) > 0.0);
    }

    #[test]
    fn degenerate_look_at_is_rejected() {
        let p = Point3f::new(1.0, 2.0, 3.0);
        assert!(LookAt::new(p, p, Vector3f::new(0.0, 1.0, 0.0)).is_none());
        assert!(LookAt::new(p, p + Vector3f::new(0.0, 1.0, 0.0), Vector3f::new(0.0, 1.0, 0.0)).is_none());
    }

    proptest! {
        #[test]
        fn rays_are_normalized(x in 0.0..64.0 as Float, y in 0.0..48.0 as Float) {
            let cam = camera(64, 48, 50.0);
            let (ray, _) = cam.generate_ray(&CameraSample::new(Point2f::new(x, y), Point2f::default(), 0.5));
            prop_assert!(approx_eq!(Float, ray.d.length(), 1.0, epsilon = 1e-5));
            prop_assert!(ray.d.z > 0.0);
        }
    }
}
