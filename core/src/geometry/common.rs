//! Common

use super::{Normal3, Normal3f, Point3f, Vector3, Vector3f};
use crate::pbrt::*;

/// Dot product trait.
pub trait Dot<V> {
    type Output;

    /// Returns the dot product.
    ///
    /// * `other` - The other vector/normal.
    fn dot(&self, other: &V) -> Self::Output;

    /// Returns the absolute value of dot product.
    ///
    /// * `other` - The other vector/normal.
    fn abs_dot(&self, other: &V) -> Float;
}

macro_rules! impl_dot {
    ($a: ident, $b: ident) => {
        impl Dot<$b<Float>> for $a<Float> {
            type Output = Float;

            fn dot(&self, other: &$b<Float>) -> Float {
                self.x * other.x + self.y * other.y + self.z * other.z
            }

            fn abs_dot(&self, other: &$b<Float>) -> Float {
                self.dot(other).abs()
            }
        }
    };
}
impl_dot!(Vector3, Vector3);
impl_dot!(Vector3, Normal3);
impl_dot!(Normal3, Vector3);
impl_dot!(Normal3, Normal3);

/// Construct a local coordinate system given only a single 3-D vector. Returns
/// two vectors that together with `v1` form an orthonormal basis.
///
/// * `v1` - The unit vector.
pub fn coordinate_system(v1: &Vector3f) -> (Vector3f, Vector3f) {
    let sign = 1.0_f32.copysign(v1.z);
    let a = -1.0 / (sign + v1.z);
    let b = v1.x * v1.y * a;
    let v2 = Vector3f::new(1.0 + sign * v1.x * v1.x * a, sign * b, -sign * v1.x);
    let v3 = Vector3f::new(b, sign + v1.y * v1.y * a, -v1.y);
    (v2, v3)
}

/// Returns a direction (x, y, z) for spherical coordinates (θ, Ø).
///
/// * `sin_theta` - sin(θ).
/// * `cos_theta` - cos(θ).
/// * `phi`       - Ø.
#[inline]
pub fn spherical_direction(sin_theta: Float, cos_theta: Float, phi: Float) -> Vector3f {
    Vector3f::new(
        clamp(sin_theta, -1.0, 1.0) * phi.cos(),
        clamp(sin_theta, -1.0, 1.0) * phi.sin(),
        clamp(cos_theta, -1.0, 1.0),
    )
}

/// Return the spherical angle θ for a given unit vector.
///
/// * `v` - The vector.
#[inline]
pub fn spherical_theta(v: &Vector3f) -> Float {
    safe_acos(v.z)
}

/// Return the spherical angle Ø for a given vector in [0, 2π).
///
/// * `v` - The vector.
#[inline]
pub fn spherical_phi(v: &Vector3f) -> Float {
    let p = v.y.atan2(v.x);
    if p < 0.0 {
        p + TWO_PI
    } else {
        p
    }
}

/// An orthonormal frame used to move directions between render space and a
/// local shading space where the z-axis is the surface normal.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Frame {
    /// X-axis.
    pub x: Vector3f,

    /// Y-axis.
    pub y: Vector3f,

    /// Z-axis.
    pub z: Vector3f,
}

impl Frame {
    /// Creates a frame from its x and z axes. The y axis is `z × x`.
    ///
    /// * `x` - Unit x-axis.
    /// * `z` - Unit z-axis perpendicular to `x`.
    pub fn from_xz(x: Vector3f, z: Vector3f) -> Self {
        Self { x, y: z.cross(&x), z }
    }

    /// Creates an arbitrary frame around a z-axis.
    ///
    /// * `z` - Unit z-axis.
    pub fn from_z(z: Vector3f) -> Self {
        let (x, y) = coordinate_system(&z);
        Self { x, y, z }
    }

    /// Transforms a render space vector into the local frame.
    ///
    /// * `v` - The vector.
    pub fn to_local(&self, v: &Vector3f) -> Vector3f {
        Vector3f::new(v.dot(&self.x), v.dot(&self.y), v.dot(&self.z))
    }

    /// Transforms a local vector back into render space.
    ///
    /// * `v` - The vector.
    pub fn from_local(&self, v: &Vector3f) -> Vector3f {
        self.x * v.x + self.y * v.y + self.z * v.z
    }
}

/// Offsets a ray origin along the geometric normal so that a spawned ray does
/// not re-intersect the surface it leaves.
///
/// * `p`       - The surface point.
/// * `p_error` - Conservative bound on the error in `p`.
/// * `n`       - The geometric normal.
/// * `w`       - Direction of the spawned ray.
pub fn offset_ray_origin(p: &Point3f, p_error: &Vector3f, n: &Normal3f, w: &Vector3f) -> Point3f {
    let d = n.abs_dot(p_error);
    let mut offset = Vector3f::from(*n) * d;
    if w.dot(n) < 0.0 {
        offset = -offset;
    }

    let mut po = *p + offset;
    for i in 0..3 {
        let o = offset[i];
        let c = if o > 0.0 {
            next_float_up(po[i])
        } else if o < 0.0 {
            next_float_down(po[i])
        } else {
            po[i]
        };
        match i {
            0 => po.x = c,
            1 => po.y = c,
            _ => po.z = c,
        }
    }
    po
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn coordinate_system_is_orthonormal(
            theta in 0.01..3.13f32,
            phi in 0.0..6.28f32,
        ) {
            let v1 = spherical_direction(theta.sin(), theta.cos(), phi);
            let (v2, v3) = coordinate_system(&v1);
            prop_assert!(approx_eq!(Float, v1.dot(&v2), 0.0, epsilon = 1e-5));
            prop_assert!(approx_eq!(Float, v1.dot(&v3), 0.0, epsilon = 1e-5));
            prop_assert!(approx_eq!(Float, v2.dot(&v3), 0.0, epsilon = 1e-5));
            prop_assert!(approx_eq!(Float, v2.length(), 1.0, epsilon = 1e-4));
            prop_assert!(approx_eq!(Float, v3.length(), 1.0, epsilon = 1e-4));
        }

        #[test]
        fn frame_round_trip(
            theta in 0.01..3.13f32,
            phi in 0.0..6.28f32,
        ) {
            let frame = Frame::from_z(Vector3f::new(0.3, -0.2, 0.9).normalize());
            let v = spherical_direction(theta.sin(), theta.cos(), phi);
            let back = frame.from_local(&frame.to_local(&v));
            prop_assert!(approx_eq!(Float, (back - v).length(), 0.0, epsilon = 1e-5));
        }
    }

    #[test]
    fn spherical_angles() {
        let v = Vector3f::new(0.0, -1.0, 0.0);
        assert!(approx_eq!(Float, spherical_theta(&v), PI_OVER_TWO, epsilon = 1e-6));
        assert!(approx_eq!(Float, spherical_phi(&v), 1.5 * PI, epsilon = 1e-6));
    }

    #[test]
    fn offset_moves_to_side_of_direction() {
        let p = Point3f::new(0.0, 0.0, 1.0);
        let n = Normal3f::new(0.0, 0.0, 1.0);
        let err = Vector3f::new(1e-4, 1e-4, 1e-4);
        let up = offset_ray_origin(&p, &err, &n, &Vector3f::new(0.0, 0.0, 1.0));
        let down = offset_ray_origin(&p, &err, &n, &Vector3f::new(0.0, 0.0, -1.0));
        assert!(up.z > p.z);
        assert!(down.z < p.z);
    }
}
