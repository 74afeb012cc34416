//! 2-D Axis Aligned Bounding Boxes.

use super::{Point2, Point2f, Point2i, Vector2};
use crate::pbrt::*;
use num_traits::Num;
use std::fmt;

/// 2-D Axis Aligned Bounding Box.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Bounds2<T> {
    /// Minimum bounds.
    pub p_min: Point2<T>,

    /// Maximum bounds.
    pub p_max: Point2<T>,
}

/// 2-D bounding box containing `Float` points.
pub type Bounds2f = Bounds2<Float>;

/// 2-D bounding box containing `Int` points.
pub type Bounds2i = Bounds2<Int>;

impl<T: Num + PartialOrd + Copy> Bounds2<T> {
    /// Creates a new 2-D bounding box from 2 points. The minimum and maximum
    /// bounds are used for each coordinate axis.
    ///
    /// * `p1` - First point.
    /// * `p2` - Second point.
    pub fn new(p1: Point2<T>, p2: Point2<T>) -> Self {
        let (min_x, max_x) = if p1.x < p2.x { (p1.x, p2.x) } else { (p2.x, p1.x) };
        let (min_y, max_y) = if p1.y < p2.y { (p1.y, p2.y) } else { (p2.y, p1.y) };
        Self {
            p_min: Point2::new(min_x, min_y),
            p_max: Point2::new(max_x, max_y),
        }
    }

    /// Returns the vector along the box diagonal from the minimum point to
    /// the maximum point.
    pub fn diagonal(&self) -> Vector2<T> {
        self.p_max - self.p_min
    }

    /// Returns the area of the box. Inverted boxes have zero area.
    pub fn area(&self) -> T {
        if self.is_empty() {
            T::zero()
        } else {
            let d = self.diagonal();
            d.x * d.y
        }
    }

    /// Returns true if the box encloses no points.
    pub fn is_empty(&self) -> bool {
        self.p_min.x >= self.p_max.x || self.p_min.y >= self.p_max.y
    }

    /// Returns the intersection with another box. The result may be empty.
    ///
    /// * `other` - The other bounding box.
    pub fn intersect(&self, other: &Self) -> Self {
        let pick_max = |a: T, b: T| if a > b { a } else { b };
        let pick_min = |a: T, b: T| if a < b { a } else { b };
        Self {
            p_min: Point2::new(
                pick_max(self.p_min.x, other.p_min.x),
                pick_max(self.p_min.y, other.p_min.y),
            ),
            p_max: Point2::new(
                pick_min(self.p_max.x, other.p_max.x),
                pick_min(self.p_max.y, other.p_max.y),
            ),
        }
    }

    /// Returns true if a point is inside the box, excluding the upper
    /// boundary.
    ///
    /// * `p` - The point.
    pub fn contains_exclusive(&self, p: &Point2<T>) -> bool {
        p.x >= self.p_min.x && p.x < self.p_max.x && p.y >= self.p_min.y && p.y < self.p_max.y
    }
}

impl Bounds2f {
    /// Linearly interpolates between the corners of the box.
    ///
    /// * `t` - Interpolation parameter in each dimension.
    pub fn lerp(&self, t: &Point2f) -> Point2f {
        Point2f::new(
            lerp(t.x, self.p_min.x, self.p_max.x),
            lerp(t.y, self.p_min.y, self.p_max.y),
        )
    }
}

/// Iterates over the integer points of a `Bounds2i` in row-major order.
pub struct Bounds2Iterator {
    bounds: Bounds2i,
    p: Point2i,
}

impl Iterator for Bounds2Iterator {
    type Item = Point2i;

    fn next(&mut self) -> Option<Self::Item> {
        if self.bounds.is_empty() || self.p.y >= self.bounds.p_max.y {
            return None;
        }

        let current = self.p;
        self.p.x += 1;
        if self.p.x == self.bounds.p_max.x {
            self.p.x = self.bounds.p_min.x;
            self.p.y += 1;
        }
        Some(current)
    }
}

impl IntoIterator for Bounds2i {
    type Item = Point2i;
    type IntoIter = Bounds2Iterator;

    fn into_iter(self) -> Self::IntoIter {
        Bounds2Iterator {
            bounds: self,
            p: self.p_min,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Bounds2<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ {} - {} ]", self.p_min, self.p_max)
    }
}
