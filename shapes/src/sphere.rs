//! Spheres

use std::sync::Arc;
use volpath_core::geometry::*;
use volpath_core::interaction::*;
use volpath_core::paramset::*;
use volpath_core::pbrt::*;
use volpath_core::sampling::*;

/// Below this squared sine of the cone half angle, cone sampling switches to
/// a Taylor expansion.
const SIN2_THETA_MAX_SMALL: Float = 0.00068523; // sin^2(1.5 deg)

/// A full sphere placed in world space.
#[derive(Clone)]
pub struct Sphere {
    /// Centre of the sphere.
    pub center: Point3f,

    /// Radius of sphere.
    pub radius: Float,

    /// Flip surface normals to point inwards.
    pub reverse_orientation: bool,
}

impl Sphere {
    /// Create a new sphere.
    ///
    /// * `center`              - Centre of the sphere.
    /// * `radius`              - Radius of sphere.
    /// * `reverse_orientation` - Flip surface normals to point inwards.
    pub fn new(center: Point3f, radius: Float, reverse_orientation: bool) -> Self {
        Self {
            center,
            radius,
            reverse_orientation,
        }
    }

    /// Projects a point onto the surface. Returns the point and a bound on
    /// its floating point error.
    ///
    /// * `p` - Point close to the surface.
    fn reproject(&self, p: &Point3f) -> (Point3f, Vector3f) {
        let q = *p - self.center;
        let q = q * (self.radius / q.length());
        let p = self.center + q;
        (p, (q.abs() + Vector3f::from(p).abs()) * gamma(5))
    }

    /// Returns the outward or, when reversed, inward unit normal at a surface
    /// point.
    ///
    /// * `p` - Point on the surface.
    fn normal_at(&self, p: &Point3f) -> Normal3f {
        let n = Normal3f::from((*p - self.center).normalize());
        if self.reverse_orientation {
            -n
        } else {
            n
        }
    }

    /// Returns the nearest parametric distance in `(0, t_max)` at which the
    /// ray crosses the sphere.
    ///
    /// * `r` - The ray.
    fn hit_distance(&self, r: &Ray) -> Option<Float> {
        // Solve in double precision relative to the centre.
        let ox = (r.o.x - self.center.x) as f64;
        let oy = (r.o.y - self.center.y) as f64;
        let oz = (r.o.z - self.center.z) as f64;
        let (dx, dy, dz) = (r.d.x as f64, r.d.y as f64, r.d.z as f64);
        let radius = self.radius as f64;

        let a = dx * dx + dy * dy + dz * dz;
        let b = 2.0 * (dx * ox + dy * oy + dz * oz);
        let c = ox * ox + oy * oy + oz * oz - radius * radius;

        let discrim = b * b - 4.0 * a * c;
        if a == 0.0 || discrim < 0.0 {
            return None;
        }
        let root = discrim.sqrt();
        let q = if b < 0.0 { -0.5 * (b - root) } else { -0.5 * (b + root) };
        let (mut t0, mut t1) = if q == 0.0 { (0.0, 0.0) } else { (q / a, c / q) };
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }

        let t_max = r.t_max as f64;
        if t0 > 0.0 && t0 < t_max {
            Some(t0 as Float)
        } else if t1 > 0.0 && t1 < t_max {
            Some(t1 as Float)
        } else {
            None
        }
    }
}

impl Shape for Sphere {
    fn get_type(&self) -> &'static str {
        "sphere"
    }

    fn world_bound(&self) -> Bounds3f {
        let r = Vector3f::new(self.radius, self.radius, self.radius);
        Bounds3f::new(self.center - r, self.center + r)
    }

    /// Intersects the ray and computes (u, v) from the spherical coordinates
    /// (φ, θ) of the hit point.
    ///
    /// * `r` - The ray.
    fn intersect(&self, r: &Ray) -> Option<Intersection> {
        let t = self.hit_distance(r)?;
        let (p_hit, p_error) = self.reproject(&r.at(t));

        let mut q = p_hit - self.center;
        if q.x == 0.0 && q.y == 0.0 {
            q.x = 1e-5 * self.radius;
        }
        let mut phi = q.y.atan2(q.x);
        if phi < 0.0 {
            phi += TWO_PI;
        }
        let cos_theta = clamp(q.z / self.radius, -1.0, 1.0);
        let theta = cos_theta.acos();
        let u = phi / TWO_PI;
        let v = (theta - PI) / -PI;

        let z_radius = (q.x * q.x + q.y * q.y).sqrt();
        let (cos_phi, sin_phi) = (q.x / z_radius, q.y / z_radius);
        let sin_theta = safe_sqrt(1.0 - cos_theta * cos_theta);
        let dpdu = Vector3f::new(-TWO_PI * q.y, TWO_PI * q.x, 0.0);
        let dpdv = -PI * Vector3f::new(q.z * cos_phi, q.z * sin_phi, -self.radius * sin_theta);

        let isect = SurfaceInteraction::new(
            p_hit,
            p_error,
            Point2f::new(u, v),
            -r.d,
            dpdu,
            dpdv,
            r.time,
            self.reverse_orientation,
        );
        Some(Intersection::new(t, isect))
    }

    fn intersect_p(&self, r: &Ray) -> bool {
        self.hit_distance(r).is_some()
    }

    fn area(&self) -> Float {
        4.0 * PI * self.radius * self.radius
    }

    fn sample_area(&self, u: &Point2f) -> (Hit, Float) {
        let p = self.center + self.radius * uniform_sample_sphere(u);
        let (p, p_error) = self.reproject(&p);
        let n = self.normal_at(&p);
        let hit = Hit::new(p, 0.0, p_error, Vector3f::zero(), n, None);
        (hit, 1.0 / self.area())
    }

    /// Samples the cone of directions the sphere subtends from the reference
    /// point. Points inside the sphere sample by area.
    ///
    /// * `hit` - Reference point.
    /// * `u`   - Sample value to use.
    fn sample_solid_angle(&self, hit: &Hit, u: &Point2f) -> (Hit, Float) {
        let dc2 = hit.p.distance_squared(&self.center);
        if dc2 <= self.radius * self.radius {
            let (intr, pdf) = self.sample_area(u);
            let wi = intr.p - hit.p;
            if wi.length_squared() == 0.0 {
                return (intr, 0.0);
            }
            let pdf = pdf * wi.length_squared() / intr.n.abs_dot(&(-wi.normalize()));
            return (intr, if pdf.is_infinite() { 0.0 } else { pdf });
        }

        let dc = dc2.sqrt();
        let inv_dc = 1.0 / dc;
        let wc = (self.center - hit.p) * inv_dc;
        let (wc_x, wc_y) = coordinate_system(&wc);

        let sin_theta_max = self.radius * inv_dc;
        let sin2_theta_max = sin_theta_max * sin_theta_max;
        let cos_theta_max = safe_sqrt(1.0 - sin2_theta_max);

        let mut cos_theta = (cos_theta_max - 1.0) * u[0] + 1.0;
        let mut sin2_theta = 1.0 - cos_theta * cos_theta;
        if sin2_theta_max < SIN2_THETA_MAX_SMALL {
            sin2_theta = sin2_theta_max * u[0];
            cos_theta = (1.0 - sin2_theta).sqrt();
        }

        // Angle from the sphere centre to the sampled point.
        let cos_alpha = sin2_theta / sin_theta_max
            + cos_theta * safe_sqrt(1.0 - sin2_theta / sin2_theta_max);
        let sin_alpha = safe_sqrt(1.0 - cos_alpha * cos_alpha);
        let phi = u[1] * TWO_PI;

        let n_world = -(wc_x * (sin_alpha * phi.cos()) + wc_y * (sin_alpha * phi.sin()) + wc * cos_alpha);
        let (p, p_error) = self.reproject(&(self.center + self.radius * n_world));
        let n = self.normal_at(&p);

        let intr = Hit::new(p, hit.time, p_error, Vector3f::zero(), n, None);
        (intr, uniform_cone_pdf(cos_theta_max))
    }

    fn pdf_solid_angle(&self, hit: &Hit, wi: &Vector3f) -> Float {
        let dc2 = hit.p.distance_squared(&self.center);
        if dc2 <= self.radius * self.radius {
            let ray = hit.spawn_ray(wi);
            return match self.intersect(&ray) {
                Some(Intersection { isect, .. }) => {
                    let pdf = hit.p.distance_squared(&isect.hit.p)
                        / (isect.hit.n.abs_dot(&(-*wi)) * self.area());
                    if pdf.is_infinite() {
                        0.0
                    } else {
                        pdf
                    }
                }
                None => 0.0,
            };
        }

        let sin2_theta_max = self.radius * self.radius / dc2;
        let cos_theta_max = safe_sqrt(1.0 - sin2_theta_max);
        uniform_cone_pdf(cos_theta_max)
    }
}

impl From<&ParamSet> for Sphere {
    /// Create a `Sphere` from a parameter set. Reads `center`, `radius` and
    /// `reverseorientation`.
    ///
    /// * `params` - Parameter set.
    fn from(params: &ParamSet) -> Self {
        let center = params.find_one_point3f("center", Point3f::zero());
        let radius = params.find_one_float("radius", 1.0);
        let reverse_orientation = params.find_one_bool("reverseorientation", false);
        Self::new(center, radius, reverse_orientation)
    }
}

/// Returns a reference counted `Sphere` built from a parameter set.
///
/// * `params` - Parameter set.
pub fn create_sphere(params: &ParamSet) -> ArcShape {
    Arc::new(Sphere::from(params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    fn unit_sphere() -> Sphere {
        Sphere::new(Point3f::new(1.0, 2.0, 3.0), 0.5, false)
    }

    fn reference(p: Point3f) -> Hit {
        Hit::new(p, 0.0, Vector3f::zero(), Vector3f::zero(), Normal3f::zero(), None)
    }

    #[test]
    fn ray_hits_near_side() {
        let s = unit_sphere();
        let r = Ray::new(Point3f::new(1.0, 2.0, 0.0), Vector3f::new(0.0, 0.0, 2.0), INFINITY, 0.0, None);
        let Intersection { t, isect } = s.intersect(&r).unwrap();
        assert!(approx_eq!(Float, t, 1.25, epsilon = 1e-5));
        assert!(approx_eq!(Float, isect.hit.p.z, 2.5, epsilon = 1e-5));
        assert!(approx_eq!(Float, isect.hit.n.z, -1.0, epsilon = 1e-4));
        assert!(approx_eq!(Float, isect.hit.wo.z, -1.0, epsilon = 1e-6));
    }

    #[test]
    fn ray_from_inside_hits_far_side() {
        let s = unit_sphere();
        let r = Ray::new(s.center, Vector3f::new(1.0, 0.0, 0.0), INFINITY, 0.0, None);
        let Intersection { t, isect } = s.intersect(&r).unwrap();
        assert!(approx_eq!(Float, t, 0.5, epsilon = 1e-6));
        assert!(approx_eq!(Float, isect.hit.n.x, 1.0, epsilon = 1e-4));
        assert!(approx_eq!(Float, isect.uv.y, 0.5, epsilon = 1e-5));
    }

    #[test]
    fn reversed_normals_point_inwards() {
        let s = Sphere::new(Point3f::zero(), 1.0, true);
        let r = Ray::new(Point3f::new(0.0, 0.0, -3.0), Vector3f::new(0.0, 0.0, 1.0), INFINITY, 0.0, None);
        let isect = s.intersect(&r).unwrap().isect;
        assert!(isect.hit.n.z > 0.99);
    }

    #[test]
    fn misses_and_t_max() {
        let s = unit_sphere();
        let miss = Ray::new(Point3f::zero(), Vector3f::new(0.0, 0.0, -1.0), INFINITY, 0.0, None);
        assert!(!s.intersect_p(&miss));
        let short = Ray::new(Point3f::new(1.0, 2.0, 0.0), Vector3f::new(0.0, 0.0, 1.0), 2.0, 0.0, None);
        assert!(!s.intersect_p(&short));
    }

    #[test]
    fn parameters() {
        let params = ParamSet::new()
            .add_float("radius", &[2.0])
            .add_point3f("center", &[Point3f::new(0.0, 1.0, 0.0)]);
        let s = Sphere::from(&params);
        assert!(approx_eq!(Float, s.area(), 16.0 * PI, epsilon = 1e-4));
        assert_eq!(s.world_bound().p_max, Point3f::new(2.0, 3.0, 2.0));
    }

    proptest! {
        #[test]
        fn area_samples_lie_on_surface(u0 in 0.0..1.0 as Float, u1 in 0.0..1.0 as Float) {
            let s = unit_sphere();
            let (hit, pdf) = s.sample_area(&Point2f::new(u0, u1));
            prop_assert!((hit.p.distance(&s.center) - 0.5).abs() < 1e-5);
            prop_assert!(approx_eq!(Float, pdf, 1.0 / PI, epsilon = 1e-5));
            prop_assert!(Vector3f::from(hit.n).dot(&(hit.p - s.center)) > 0.0);
        }

        #[test]
        fn cone_samples_match_pdf(u0 in 0.0..1.0 as Float, u1 in 0.0..1.0 as Float) {
            let s = unit_sphere();
            let r = reference(Point3f::new(1.0, 2.0, 0.0));
            let (hit, pdf) = s.sample_solid_angle(&r, &Point2f::new(u0, u1));
            prop_assert!((hit.p.distance(&s.center) - 0.5).abs() < 1e-4);
            let wi = (hit.p - r.p).normalize();
            prop_assert!(approx_eq!(Float, s.pdf_solid_angle(&r, &wi), pdf, epsilon = 1e-3));
            // The sampled point faces the reference point.
            prop_assert!(Vector3f::from(hit.n).dot(&wi) <= 1e-3);
        }

        #[test]
        fn spawned_rays_do_not_reintersect(u0 in 0.0..1.0 as Float, u1 in 0.0..1.0 as Float) {
            let s = unit_sphere();
            let (hit, _) = s.sample_area(&Point2f::new(u0, u1));
            let outward = Vector3f::from(hit.n);
            prop_assert!(!s.intersect_p(&hit.spawn_ray(&outward)));
        }
    }
}
