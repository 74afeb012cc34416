//! Surface Normals

use super::{Dot, Vector3};
use crate::pbrt::*;
use num_traits::Num;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// A 3-D surface normal. Unlike vectors, normals are not closed under
/// translation and do not necessarily have unit length.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Normal3<T> {
    /// X-coordinate.
    pub x: T,

    /// Y-coordinate.
    pub y: T,

    /// Z-coordinate.
    pub z: T,
}

/// 3-D normal containing `Float` values.
pub type Normal3f = Normal3<Float>;

impl<T: Num + Copy> Normal3<T> {
    /// Creates a new 3-D normal.
    ///
    /// * `x` - X-coordinate.
    /// * `y` - Y-coordinate.
    /// * `z` - Z-coordinate.
    pub fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }

    /// Creates a zero normal which marks interactions without a surface.
    pub fn zero() -> Self {
        Self::new(T::zero(), T::zero(), T::zero())
    }

    /// Returns true if all components are zero.
    pub fn is_zero(&self) -> bool {
        self.x.is_zero() && self.y.is_zero() && self.z.is_zero()
    }
}

impl Normal3f {
    /// Returns the normal's length.
    pub fn length(&self) -> Float {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Returns the unit normal.
    pub fn normalize(&self) -> Self {
        *self * (1.0 / self.length())
    }

    /// Flips the normal so that it lies in the same hemisphere as `v`.
    ///
    /// * `v` - The reference vector or normal.
    pub fn face_forward<V>(&self, v: &V) -> Self
    where
        Self: Dot<V, Output = Float>,
    {
        if self.dot(v) < 0.0 {
            -*self
        } else {
            *self
        }
    }
}

impl<T: Num + Copy> Add for Normal3<T> {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl<T: Num + Copy> Sub for Normal3<T> {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl<T: Num + Copy> Mul<T> for Normal3<T> {
    type Output = Self;

    fn mul(self, f: T) -> Self::Output {
        Self::new(self.x * f, self.y * f, self.z * f)
    }
}

impl Mul<Normal3f> for Float {
    type Output = Normal3f;

    fn mul(self, n: Normal3f) -> Self::Output {
        n * self
    }
}

impl<T: Num + Neg<Output = T> + Copy> Neg for Normal3<T> {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl<T: Copy> From<Vector3<T>> for Normal3<T> {
    fn from(v: Vector3<T>) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Normal3<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}, {}>", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vector3f;

    #[test]
    fn face_forward_flips_into_hemisphere() {
        let n = Normal3f::new(0.0, 0.0, 1.0);
        let down = Vector3f::new(0.0, 0.3, -1.0);
        assert_eq!(n.face_forward(&down), Normal3f::new(0.0, 0.0, -1.0));
        assert_eq!(n.face_forward(&-down), n);
    }
}
