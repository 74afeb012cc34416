//! Camera

use crate::film::Film;
use crate::geometry::*;
use crate::medium::ArcMedium;
use crate::pbrt::*;
use std::sync::Arc;

/// Sample values needed to generate a camera ray.
#[derive(Copy, Clone, Default)]
pub struct CameraSample {
    /// Point on the film to which the ray carries radiance.
    pub p_film: Point2f,

    /// Point on the lens the ray passes through.
    pub p_lens: Point2f,

    /// Time at which the ray samples the scene.
    pub time: Float,
}

impl CameraSample {
    /// Create a new `CameraSample`.
    ///
    /// * `p_film` - Point on the film.
    /// * `p_lens` - Point on the lens.
    /// * `time`   - Time at which the ray samples the scene.
    pub fn new(p_film: Point2f, p_lens: Point2f, time: Float) -> Self {
        Self { p_film, p_lens, time }
    }
}

/// Common camera data.
#[derive(Clone)]
pub struct CameraData {
    /// Time when shutter is open.
    pub shutter_open: Float,

    /// Time when shutter is closed.
    pub shutter_close: Float,

    /// The film to capture the rendered image.
    pub film: Arc<Film>,

    /// Scattering medium the camera lies in.
    pub medium: Option<ArcMedium>,
}

impl CameraData {
    /// Create a new `CameraData`.
    ///
    /// * `shutter_open`  - Time when shutter is open.
    /// * `shutter_close` - Time when shutter is closed.
    /// * `film`          - The film to capture the rendered image.
    /// * `medium`        - Scattering medium the camera lies in.
    pub fn new(shutter_open: Float, shutter_close: Float, film: Film, medium: Option<ArcMedium>) -> Self {
        Self {
            shutter_open,
            shutter_close,
            film: Arc::new(film),
            medium,
        }
    }
}

/// Camera interface.
pub trait Camera {
    /// Returns the camera data.
    fn get_data(&self) -> &CameraData;

    /// Returns a world space ray for a sample and the weight of the radiance
    /// it carries to the film.
    ///
    /// * `sample` - The sample.
    fn generate_ray(&self, sample: &CameraSample) -> (Ray, Float);

    /// Returns the film.
    fn get_film(&self) -> Arc<Film> {
        Arc::clone(&self.get_data().film)
    }
}

/// Atomic reference counted `Camera`.
pub type ArcCamera = Arc<dyn Camera + Send + Sync>;
