//! Spatial Light Distribution

use super::LightDistribution;
use crate::geometry::*;
use crate::interaction::Hit;
use crate::light::*;
use crate::low_discrepancy::radical_inverse;
use crate::pbrt::*;
use crate::sampling::*;
use crate::scene::*;
use arc_swap::ArcSwapOption;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Packed voxel coordinates use 20 bits per axis so this value can never be
/// a real voxel.
const INVALID_PACKED_POS: u64 = u64::MAX;

/// Number of Halton points used to estimate a voxel's light contributions.
const N_SAMPLES: u64 = 128;

struct HashEntry {
    packed_pos: AtomicU64,
    distribution: ArcSwapOption<Distribution1D>,
}

impl Default for HashEntry {
    fn default() -> Self {
        Self {
            packed_pos: AtomicU64::new(INVALID_PACKED_POS),
            distribution: ArcSwapOption::const_empty(),
        }
    }
}

/// Imposes a voxel grid over the scene bounds and lazily computes a light
/// selection distribution per voxel from an estimate of each light's
/// contribution to it.
pub struct SpatialLightDistribution {
    lights: Vec<ArcLight>,
    world_bound: Bounds3f,
    n_voxels: [usize; 3],
    hash_table: Vec<HashEntry>,
}

impl SpatialLightDistribution {
    /// Create a new instance of `SpatialLightDistribution`.
    ///
    /// * `scene`      - The scene.
    /// * `max_voxels` - Voxels along the widest dimension of the scene.
    pub fn new(scene: &Scene, max_voxels: usize) -> Self {
        let b = scene.world_bound;
        let diag = b.diagonal();
        let bmax = diag.max_component();

        let mut n_voxels = [1_usize; 3];
        if bmax > 0.0 {
            for (i, n) in n_voxels.iter_mut().enumerate() {
                *n = ((diag[i] / bmax * max_voxels as Float).round() as usize).clamp(1, (1 << 20) - 1);
            }
        }

        info!(
            "SpatialLightDistribution: scene bounds {}, voxel res ({}, {}, {})",
            b, n_voxels[0], n_voxels[1], n_voxels[2]
        );

        let hash_table_size = 4 * n_voxels[0] * n_voxels[1] * n_voxels[2];
        Self {
            lights: scene.lights.clone(),
            world_bound: b,
            n_voxels,
            hash_table: (0..hash_table_size).map(|_| HashEntry::default()).collect(),
        }
    }

    /// Returns the voxel containing a point. Points slightly outside the
    /// bounds are clamped to the nearest voxel.
    ///
    /// * `p` - The point.
    fn voxel(&self, p: &Point3f) -> [usize; 3] {
        let offset = self.world_bound.offset(p);
        let mut pi = [0_usize; 3];
        for i in 0..3 {
            let v = (offset[i] * self.n_voxels[i] as Float) as Int;
            pi[i] = clamp(v, 0, self.n_voxels[i] as Int - 1) as usize;
        }
        pi
    }

    /// Computes the light selection distribution for a voxel.
    ///
    /// * `pi` - Integer voxel coordinates.
    fn compute_distribution(&self, pi: &[usize; 3]) -> Distribution1D {
        let corner = |d: usize| {
            Point3f::new(
                (pi[0] + d) as Float / self.n_voxels[0] as Float,
                (pi[1] + d) as Float / self.n_voxels[1] as Float,
                (pi[2] + d) as Float / self.n_voxels[2] as Float,
            )
        };
        let voxel_bounds = Bounds3f::new(
            self.world_bound.lerp(&corner(0)),
            self.world_bound.lerp(&corner(1)),
        );

        // Visibility is ignored; Li/pdf at Halton points approximates how
        // much each light illuminates the voxel.
        let mut light_contrib = vec![0.0; self.lights.len()];
        for i in 0..N_SAMPLES {
            let po = voxel_bounds.lerp(&Point3f::new(
                radical_inverse(0, i),
                radical_inverse(1, i),
                radical_inverse(2, i),
            ));
            let hit = Hit::new(
                po,
                0.0,
                Vector3f::zero(),
                Vector3f::new(1.0, 0.0, 0.0),
                Normal3f::zero(),
                None,
            );

            let u = Point2f::new(radical_inverse(3, i), radical_inverse(4, i));
            for (j, light) in self.lights.iter().enumerate() {
                if let Some(li) = light.sample_li(&hit, &u) {
                    if li.pdf > 0.0 {
                        light_contrib[j] += li.value.y() / li.pdf;
                    }
                }
            }
        }

        // Lights missed by every sample may still reach parts of the voxel.
        let sum_contrib: Float = light_contrib.iter().sum();
        let avg_contrib = sum_contrib / (N_SAMPLES as usize * light_contrib.len()) as Float;
        let min_contrib = if avg_contrib > 0.0 { 0.001 * avg_contrib } else { 1.0 };
        for (i, contrib) in light_contrib.iter_mut().enumerate() {
            debug!("Voxel pi = {:?}, light {} contrib = {}", pi, i, contrib);
            *contrib = contrib.max(min_contrib);
        }
        info!(
            "Initialized light distribution in voxel pi = {:?}, avgContrib = {}",
            pi, avg_contrib
        );

        Distribution1D::new(light_contrib)
    }
}

/// Mixes the bits of packed voxel coordinates so they spread evenly over
/// the hash table.
///
/// * `packed_pos` - Packed voxel coordinates.
fn hash_packed_pos(packed_pos: u64) -> u64 {
    let mut hash = packed_pos;
    hash ^= hash >> 31;
    hash = hash.wrapping_mul(0x7fb5d329728ea185);
    hash ^= hash >> 27;
    hash = hash.wrapping_mul(0x81dadef4bc2dd44d);
    hash ^= hash >> 33;
    hash
}

impl LightDistribution for SpatialLightDistribution {
    fn lookup(&self, p: &Point3f) -> Option<Arc<Distribution1D>> {
        if self.lights.is_empty() {
            return None;
        }

        let pi = self.voxel(p);
        let packed_pos = ((pi[0] as u64) << 40) | ((pi[1] as u64) << 20) | pi[2] as u64;

        let hash_table_size = self.hash_table.len();
        let mut hash = (hash_packed_pos(packed_pos) % hash_table_size as u64) as usize;

        // Quadratic open addressing; `step` is the square root of the offset.
        let mut step = 1;
        loop {
            let entry = &self.hash_table[hash];

            let entry_packed_pos = entry.packed_pos.load(Ordering::Acquire);
            if entry_packed_pos == packed_pos {
                // Another thread may have claimed the entry without having
                // stored the distribution yet.
                loop {
                    if let Some(dist) = entry.distribution.load_full() {
                        return Some(dist);
                    }
                    std::hint::spin_loop();
                }
            } else if entry_packed_pos != INVALID_PACKED_POS {
                hash = (hash + step * step) % hash_table_size;
                step += 1;
            } else if entry
                .packed_pos
                .compare_exchange_weak(
                    INVALID_PACKED_POS,
                    packed_pos,
                    Ordering::AcqRel,
                    Ordering::Relaxed,
                )
                .is_ok()
            {
                let dist = Arc::new(self.compute_distribution(&pi));
                entry.distribution.store(Some(Arc::clone(&dist)));
                return Some(dist);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::SurfaceInteraction;
    use crate::material::ArcMaterial;
    use crate::primitives::*;
    use crate::spectrum::*;
    use float_cmp::approx_eq;

    struct Bounded(Bounds3f);

    impl Primitive for Bounded {
        fn world_bound(&self) -> Bounds3f {
            self.0
        }

        fn intersect(&self, _r: &mut Ray) -> Option<SurfaceInteraction> {
            None
        }

        fn intersect_p(&self, _r: &Ray) -> bool {
            false
        }

        fn get_area_light(&self) -> Option<ArcLight> {
            None
        }

        fn get_material(&self) -> Option<ArcMaterial> {
            None
        }
    }

    struct Bulb {
        p: Point3f,
        intensity: Float,
    }

    impl Light for Bulb {
        fn get_type(&self) -> LightType {
            LightType::DELTA_POSITION_LIGHT
        }

        fn sample_li(&self, hit: &Hit, _u: &Point2f) -> Option<Li> {
            let wi = (self.p - hit.p).normalize();
            let value = Spectrum::new(self.intensity / self.p.distance_squared(&hit.p));
            let light_hit = Hit::new(self.p, hit.time, Vector3f::zero(), Vector3f::zero(), Normal3f::zero(), None);
            Some(Li::new(wi, 1.0, VisibilityTester::new(hit.clone(), light_hit), value))
        }

        fn power(&self) -> Spectrum {
            Spectrum::new(4.0 * PI * self.intensity)
        }

        fn pdf_li(&self, _hit: &Hit, _wi: &Vector3f) -> Float {
            0.0
        }
    }

    fn scene(intensities: [Float; 2]) -> Scene {
        let bounds = Bounds3f::new(Point3f::new(0.0, 0.0, 0.0), Point3f::new(10.0, 1.0, 1.0));
        let lights: Vec<ArcLight> = vec![
            Arc::new(Bulb {
                p: Point3f::new(0.0, 0.5, 0.5),
                intensity: intensities[0],
            }),
            Arc::new(Bulb {
                p: Point3f::new(10.0, 0.5, 0.5),
                intensity: intensities[1],
            }),
        ];
        Scene::new(Arc::new(Bounded(bounds)), lights)
    }

    #[test]
    fn voxel_grid_follows_widest_dimension() {
        let distrib = SpatialLightDistribution::new(&scene([1.0, 1.0]), 64);
        assert_eq!(distrib.n_voxels, [64, 6, 6]);
        assert_eq!(distrib.voxel(&Point3f::new(-1.0, 0.5, 2.0)), [0, 3, 5]);
    }

    #[test]
    fn nearby_light_dominates() {
        let distrib = SpatialLightDistribution::new(&scene([1.0, 1.0]), 64);
        let near_first = distrib.lookup(&Point3f::new(0.1, 0.5, 0.5)).unwrap();
        assert!(near_first.discrete_pdf(0) > 0.99);
        let near_second = distrib.lookup(&Point3f::new(9.9, 0.5, 0.5)).unwrap();
        assert!(near_second.discrete_pdf(1) > 0.99);
    }

    #[test]
    fn voxel_distribution_is_cached() {
        let distrib = SpatialLightDistribution::new(&scene([1.0, 1.0]), 64);
        let a = distrib.lookup(&Point3f::new(5.0, 0.5, 0.5)).unwrap();
        let b = distrib.lookup(&Point3f::new(5.01, 0.51, 0.49)).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn dark_voxels_sample_uniformly() {
        let distrib = SpatialLightDistribution::new(&scene([0.0, 0.0]), 64);
        let d = distrib.lookup(&Point3f::new(3.0, 0.5, 0.5)).unwrap();
        assert!(approx_eq!(Float, d.discrete_pdf(0), 0.5));
    }

    #[test]
    fn unlit_light_keeps_a_floor_weight() {
        let distrib = SpatialLightDistribution::new(&scene([1.0, 0.0]), 64);
        let d = distrib.lookup(&Point3f::new(9.9, 0.5, 0.5)).unwrap();
        assert!(d.discrete_pdf(1) > 0.0);
    }
}
