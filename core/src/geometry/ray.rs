//! Rays

use super::{Point3f, Vector3f};
use crate::medium::ArcMedium;
use crate::pbrt::*;
use std::fmt;

/// A semi-infinite line carrying the medium its origin lies in.
#[derive(Clone)]
pub struct Ray {
    /// Origin.
    pub o: Point3f,

    /// Direction.
    pub d: Vector3f,

    /// Maximum extent of the ray.
    pub t_max: Float,

    /// Time value.
    pub time: Float,

    /// Medium containing the origin.
    pub medium: Option<ArcMedium>,
}

impl Ray {
    /// Returns a new ray.
    ///
    /// * `o`      - Origin.
    /// * `d`      - Direction.
    /// * `t_max`  - Maximum extent of the ray.
    /// * `time`   - Time value.
    /// * `medium` - Medium containing origin `o`.
    pub fn new(
        o: Point3f,
        d: Vector3f,
        t_max: Float,
        time: Float,
        medium: Option<ArcMedium>,
    ) -> Self {
        Self {
            o,
            d,
            t_max,
            time,
            medium,
        }
    }

    /// Returns the position along the ray at a given parameter.
    ///
    /// * `t` - The parameter.
    pub fn at(&self, t: Float) -> Point3f {
        self.o + self.d * t
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self::new(
            Point3f::zero(),
            Vector3f::new(0.0, 0.0, 1.0),
            INFINITY,
            0.0,
            None,
        )
    }
}

impl fmt::Display for Ray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[o={}, d={}, t_max={}, time={}, medium={}]",
            self.o,
            self.d,
            self.t_max,
            self.time,
            self.medium.is_some()
        )
    }
}
