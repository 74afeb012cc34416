//! Trowbridge-Reitz Distribution

use crate::geometry::*;
use crate::pbrt::*;
use crate::reflection::*;

/// Below this roughness a distribution is treated as a perfect mirror.
const SPECULAR_ALPHA: Float = 1e-3;

/// The anisotropic Trowbridge-Reitz (GGX) distribution of microfacet
/// normals, sampled through its distribution of visible normals.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TrowbridgeReitzDistribution {
    /// Roughness for microfacets oriented perpendicular to the x-axis.
    alpha_x: Float,

    /// Roughness for microfacets oriented perpendicular to the y-axis.
    alpha_y: Float,
}

impl TrowbridgeReitzDistribution {
    /// Create a new `TrowbridgeReitzDistribution`.
    ///
    /// * `alpha_x` - Roughness along the x-axis.
    /// * `alpha_y` - Roughness along the y-axis.
    pub fn new(alpha_x: Float, alpha_y: Float) -> Self {
        Self { alpha_x, alpha_y }
    }

    /// Maps a user facing roughness in [0, 1] to α.
    ///
    /// * `roughness` - Roughness parameter value.
    pub fn roughness_to_alpha(roughness: Float) -> Float {
        roughness.max(0.0).sqrt()
    }

    /// Returns true if the surface is smooth enough to be treated as
    /// perfectly specular.
    pub fn effectively_specular(&self) -> bool {
        self.alpha_x.max(self.alpha_y) < SPECULAR_ALPHA
    }

    /// Returns the differential area of microfacets with normal `wm`.
    ///
    /// * `wm` - Microfacet normal.
    pub fn d(&self, wm: &Vector3f) -> Float {
        let tan2_theta = tan2_theta(wm);
        if tan2_theta.is_infinite() || tan2_theta.is_nan() {
            return 0.0;
        }
        let cos4_theta = sqr(cos2_theta(wm));
        if cos4_theta < 1e-16 {
            return 0.0;
        }
        let e = tan2_theta
            * (sqr(cos_phi(wm) / self.alpha_x) + sqr(sin_phi(wm) / self.alpha_y));
        1.0 / (PI * self.alpha_x * self.alpha_y * cos4_theta * sqr(1.0 + e))
    }

    /// Returns the density of visible normals `wm` as seen from `w`.
    ///
    /// * `w`  - Viewing direction.
    /// * `wm` - Microfacet normal.
    pub fn d_visible(&self, w: &Vector3f, wm: &Vector3f) -> Float {
        let cos_theta = abs_cos_theta(w);
        if cos_theta == 0.0 {
            return 0.0;
        }
        self.g1(w) / cos_theta * self.d(wm) * w.abs_dot(wm)
    }

    /// Returns the invisible masked microfacet area per visible area.
    ///
    /// * `w` - Viewing direction.
    pub fn lambda(&self, w: &Vector3f) -> Float {
        let tan2_theta = tan2_theta(w);
        if tan2_theta.is_infinite() || tan2_theta.is_nan() {
            return 0.0;
        }
        let alpha2 = sqr(cos_phi(w) * self.alpha_x) + sqr(sin_phi(w) * self.alpha_y);
        ((1.0 + alpha2 * tan2_theta).sqrt() - 1.0) / 2.0
    }

    /// Smith's masking function.
    ///
    /// * `w` - Viewing direction.
    pub fn g1(&self, w: &Vector3f) -> Float {
        1.0 / (1.0 + self.lambda(w))
    }

    /// Height-correlated masking-shadowing function.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    pub fn g(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        1.0 / (1.0 + self.lambda(wo) + self.lambda(wi))
    }

    /// Returns the density with which `sample_wm()` produces `wm`.
    ///
    /// * `w`  - Viewing direction.
    /// * `wm` - Microfacet normal.
    pub fn pdf(&self, w: &Vector3f, wm: &Vector3f) -> Float {
        self.d_visible(w, wm)
    }

    /// Samples a visible microfacet normal. The result always lies in the
    /// upper hemisphere.
    ///
    /// * `w` - Viewing direction.
    /// * `u` - 2D sample.
    pub fn sample_wm(&self, w: &Vector3f, u: &Point2f) -> Vector3f {
        // Transform to the hemispherical configuration.
        let mut wh = Vector3f::new(self.alpha_x * w.x, self.alpha_y * w.y, w.z).normalize();
        if wh.z < 0.0 {
            wh = -wh;
        }

        let t1 = if wh.z < 0.99999 {
            Vector3f::new(0.0, 0.0, 1.0).cross(&wh).normalize()
        } else {
            Vector3f::new(1.0, 0.0, 0.0)
        };
        let t2 = wh.cross(&t1);

        // Uniform disk sample warped to the visible projected area.
        let r = u[0].sqrt();
        let theta = TWO_PI * u[1];
        let px = r * theta.cos();
        let h = (1.0 - px * px).max(0.0).sqrt();
        let py = lerp((1.0 + wh.z) / 2.0, h, r * theta.sin());
        let pz = (1.0 - px * px - py * py).max(0.0).sqrt();

        let nh = t1 * px + t2 * py + wh * pz;
        Vector3f::new(
            self.alpha_x * nh.x,
            self.alpha_y * nh.y,
            nh.z.max(1e-6),
        )
        .normalize()
    }

    /// Widens a near-specular distribution.
    pub fn regularize(&mut self) {
        if self.alpha_x < 0.3 {
            self.alpha_x = clamp(2.0 * self.alpha_x, 0.1, 0.3);
        }
        if self.alpha_y < 0.3 {
            self.alpha_y = clamp(2.0 * self.alpha_y, 0.1, 0.3);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RNG;
    use float_cmp::approx_eq;

    #[test]
    fn projected_area_is_one() {
        // ∫ D(wm) cos(θm) dωm = 1 over the hemisphere.
        let distrib = TrowbridgeReitzDistribution::new(0.3, 0.5);
        let mut rng = RNG::new(3);
        let n = 200_000;
        let mut sum = 0.0;
        for _ in 0..n {
            let u = Point2f::new(rng.uniform_float(), rng.uniform_float());
            let z = u[0];
            let r = (1.0 - z * z).max(0.0).sqrt();
            let phi = TWO_PI * u[1];
            let wm = Vector3f::new(r * phi.cos(), r * phi.sin(), z);
            sum += distrib.d(&wm) * wm.z * TWO_PI;
        }
        assert!(approx_eq!(f32, sum / n as Float, 1.0, epsilon = 0.05));
    }

    #[test]
    fn sampled_normals_face_up() {
        let distrib = TrowbridgeReitzDistribution::new(0.5, 0.5);
        let mut rng = RNG::new(5);
        let w = Vector3f::new(0.3, -0.2, -0.9).normalize();
        for _ in 0..1000 {
            let u = Point2f::new(rng.uniform_float(), rng.uniform_float());
            let wm = distrib.sample_wm(&w, &u);
            assert!(wm.z > 0.0);
            assert!(approx_eq!(f32, wm.length(), 1.0, epsilon = 1e-4));
        }
    }

    #[test]
    fn regularize_widens_smooth_surfaces() {
        let mut distrib = TrowbridgeReitzDistribution::new(0.0, 0.2);
        distrib.regularize();
        assert_eq!(distrib, TrowbridgeReitzDistribution::new(0.1, 0.3));
        assert!(!distrib.effectively_specular());
        assert!(TrowbridgeReitzDistribution::new(1e-4, 5e-4).effectively_specular());
    }
}
