//! Volumetric Path Integrator

use bumpalo::Bump;
use std::sync::Arc;
use volpath_core::app::Options;
use volpath_core::bssrdf::BSSRDFSample;
use volpath_core::camera::*;
use volpath_core::error::*;
use volpath_core::geometry::*;
use volpath_core::integrator::*;
use volpath_core::light_distrib::*;
use volpath_core::paramset::*;
use volpath_core::pbrt::*;
use volpath_core::reflection::*;
use volpath_core::sampler::*;
use volpath_core::sampling::Distribution1D;
use volpath_core::scene::*;
use volpath_core::spectrum::*;
use volpath_core::{stat_counter, stat_dist, stat_inc, stat_int_distribution, stat_register_fns};

stat_int_distribution!("Integrator/Path length", PATH_LENGTH, volpath_stats_path_length);
stat_counter!(
    "Integrator/Volume interactions",
    VOLUME_INTERACTIONS,
    volpath_stats_volume_interactions,
);
stat_counter!(
    "Integrator/Surface interactions",
    SURFACE_INTERACTIONS,
    volpath_stats_surface_interactions,
);

stat_register_fns!(
    volpath_stats_path_length,
    volpath_stats_volume_interactions,
    volpath_stats_surface_interactions,
);

/// Path tracer that accounts for scattering and attenuation in participating
/// media as well as subsurface scattering.
pub struct VolPathIntegrator {
    /// Common data for sampler integrators.
    pub data: SamplerIntegratorData,

    /// Maximum number of scattering events along a path.
    max_depth: usize,

    /// Paths whose throughput falls below this are subject to Russian
    /// roulette.
    rr_threshold: Float,

    /// Light sampling strategy.
    light_sample_strategy: LightSampleStrategy,

    /// Light selection distribution. Built in `preprocess()`.
    light_distribution: Option<ArcLightDistribution>,
}

impl VolPathIntegrator {
    /// Create a new `VolPathIntegrator`.
    ///
    /// * `max_depth`             - Maximum number of scattering events.
    /// * `camera`                - The camera.
    /// * `sampler`               - The sampler.
    /// * `pixel_bounds`          - Pixels that are rendered.
    /// * `rr_threshold`          - Russian roulette throughput threshold.
    /// * `light_sample_strategy` - Light sampling strategy.
    pub fn new(
        max_depth: usize,
        camera: ArcCamera,
        sampler: ArcSampler,
        pixel_bounds: Bounds2i,
        rr_threshold: Float,
        light_sample_strategy: LightSampleStrategy,
    ) -> Self {
        register_stats();

        Self {
            data: SamplerIntegratorData::new(camera, sampler, pixel_bounds),
            max_depth,
            rr_threshold,
            light_sample_strategy,
            light_distribution: None,
        }
    }

    /// Returns the maximum number of scattering events.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Returns the light selection distribution at a point.
    ///
    /// * `p` - The point.
    fn light_distrib(&self, p: &Point3f) -> Option<Arc<Distribution1D>> {
        self.light_distribution.as_ref().and_then(|d| d.lookup(p))
    }
}

/// Returns the probability of terminating a path with Russian roulette, or
/// `None` when the path is not eligible. The eta scale is factored out of the
/// throughput first.
///
/// * `beta`         - Path throughput.
/// * `eta_scale`    - Accumulated radiance scaling from refraction.
/// * `rr_threshold` - Throughput threshold.
/// * `depth`        - Current depth.
pub fn termination_probability(beta: &Spectrum, eta_scale: Float, rr_threshold: Float, depth: usize) -> Option<Float> {
    let rr_beta = *beta * eta_scale;
    let max_component = rr_beta.max_component_value();
    if max_component < rr_threshold && depth > 3 {
        Some(Float::max(0.05, 1.0 - max_component))
    } else {
        None
    }
}

impl SamplerIntegrator for VolPathIntegrator {
    fn get_data(&self) -> &SamplerIntegratorData {
        &self.data
    }

    /// Returns the incident radiance at the origin of a ray.
    ///
    /// * `ray`     - The ray.
    /// * `scene`   - The scene.
    /// * `sampler` - The sampler.
    /// * `arena`   - Allocator for scattering functions of this sample.
    fn li(&self, ray: &mut Ray, scene: &Scene, sampler: &mut dyn Sampler, arena: &Bump) -> Spectrum {
        let mut l = Spectrum::new(0.0);
        let mut beta = Spectrum::new(1.0);
        let mut specular_bounce = false;

        // Radiance scaling due to refraction. Removed from beta for Russian
        // roulette so paths about to refract back out are not terminated.
        let mut eta_scale: Float = 1.0;

        let mut depth = 0_usize;
        loop {
            debug!("Path bounce {}, L = {}, beta = {}", depth, l, beta);

            let isect = scene.intersect(ray);

            // Sample the participating medium, if present.
            let mut mi = None;
            if let Some(medium) = ray.medium.clone() {
                let (weight, sampled) = medium.sample(ray, sampler);
                beta *= weight;
                mi = sampled;
            }
            if beta.is_black() {
                break;
            }

            if let Some(mi) = mi {
                if depth >= self.max_depth {
                    break;
                }
                stat_inc!(VOLUME_INTERACTIONS, 1);

                let distrib = self.light_distrib(&mi.hit.p);
                let it = Interaction::Medium { mi: &mi };
                l += beta * uniform_sample_one_light(&it, scene, sampler, true, distrib.as_deref());

                let (_, wi) = mi.phase.sample_p(&mi.hit.wo, &sampler.get_2d());
                *ray = mi.hit.spawn_ray(&wi);
                specular_bounce = false;
            } else {
                stat_inc!(SURFACE_INTERACTIONS, 1);

                // Emission is only reachable here on camera rays and specular
                // continuations. Otherwise light sampling accounts for it.
                if depth == 0 || specular_bounce {
                    match isect.as_ref() {
                        Some(si) => l += beta * si.le(&(-ray.d)),
                        None => {
                            for light in scene.infinite_lights.iter() {
                                l += beta * light.le(ray);
                            }
                        }
                    }
                    debug!("Added emission, L = {}", l);
                }

                let si = match isect {
                    Some(si) if depth < self.max_depth => si,
                    _ => break,
                };

                let sf = si.compute_scattering_functions(arena, TransportMode::Radiance);
                let bsdf = match sf.bsdf.as_deref() {
                    Some(bsdf) => bsdf,
                    None => {
                        // Medium boundaries do not count as a bounce.
                        debug!("Skipping intersection without a BSDF");
                        *ray = si.hit.spawn_ray(&ray.d);
                        continue;
                    }
                };

                let distrib = self.light_distrib(&si.hit.p);
                let it = Interaction::Surface { si: &si, bsdf };
                let ld = beta * uniform_sample_one_light(&it, scene, sampler, true, distrib.as_deref());
                debug!("Sampled direct lighting Ld = {}", ld);
                l += ld;

                let wo = si.hit.wo;
                let u = sampler.get_1d();
                let u2 = sampler.get_2d();
                let bs = match bsdf.sample_f(&wo, u, &u2, TransportMode::Radiance, BxDFReflTransFlags::ALL) {
                    Some(bs) => bs,
                    None => break,
                };
                debug!("Sampled BSDF {}", bs);
                if bs.f.has_nans() || !bs.pdf.is_finite() {
                    break;
                }

                beta *= bs.f * bs.wi.abs_dot(&si.shading.n) / bs.pdf;
                debug!("Updated beta = {}", beta);
                specular_bounce = bs.is_specular();
                if bs.is_specular() && bs.is_transmission() {
                    // The sampled eta is already inverted when leaving.
                    eta_scale *= sqr(bs.eta);
                }
                *ray = si.hit.spawn_ray(&bs.wi);

                // Relocate the path to an exit point for subsurface
                // scattering.
                if let (Some(bssrdf), true) = (sf.bssrdf.as_deref(), bs.is_transmission()) {
                    let u1 = sampler.get_1d();
                    let u2 = sampler.get_2d();
                    let BSSRDFSample {
                        si: pi,
                        bsdf: pi_bsdf,
                        sp,
                        pdf,
                    } = match bssrdf.sample_s(scene, u1, &u2, arena) {
                        Some(sample) => sample,
                        None => break,
                    };
                    beta *= sp / pdf;

                    // Direct lighting at the exit point.
                    let distrib = self.light_distrib(&pi.hit.p);
                    let it = Interaction::Surface {
                        si: &pi,
                        bsdf: &pi_bsdf,
                    };
                    l += beta * uniform_sample_one_light(&it, scene, sampler, true, distrib.as_deref());

                    // Indirect lighting from the exit point.
                    let u = sampler.get_1d();
                    let u2 = sampler.get_2d();
                    let bs = match pi_bsdf.sample_f(
                        &pi.hit.wo,
                        u,
                        &u2,
                        TransportMode::Radiance,
                        BxDFReflTransFlags::ALL,
                    ) {
                        Some(bs) => bs,
                        None => break,
                    };
                    beta *= bs.f * bs.wi.abs_dot(&pi.shading.n) / bs.pdf;
                    specular_bounce = bs.is_specular();
                    *ray = pi.hit.spawn_ray(&bs.wi);
                }
            }

            if beta.has_nans() || beta.has_infs() {
                break;
            }

            if let Some(q) = termination_probability(&beta, eta_scale, self.rr_threshold, depth) {
                if sampler.get_1d() < q {
                    break;
                }
                beta /= 1.0 - q;
            }

            depth += 1;
        }

        stat_dist!(PATH_LENGTH, depth as i64);
        l
    }
}

impl Integrator for VolPathIntegrator {
    /// Builds the light selection distribution.
    ///
    /// * `scene` - The scene.
    fn preprocess(&mut self, scene: &Scene) {
        self.light_distribution = Some(create_light_sample_distribution(self.light_sample_strategy, scene));
    }

    fn render(&self, scene: &Scene, options: &Options) -> Result<(), String> {
        SamplerIntegrator::render(self, scene, options)
    }
}

/// Returns the pixels to render. `pixelbounds` holds `x0, x1, y0, y1`.
/// Malformed or degenerate values are reported and the full sample bounds
/// are used.
///
/// * `params`        - Parameter set.
/// * `sample_bounds` - Bounds of pixels the film samples.
/// * `reporter`      - Reports configuration errors.
fn pixel_bounds_from_params(params: &ParamSet, sample_bounds: Bounds2i, reporter: &ErrorReporter) -> Bounds2i {
    let pb = params.find_int("pixelbounds");
    if pb.is_empty() {
        return sample_bounds;
    }
    if pb.len() != 4 {
        reporter.error(&format!(
            "Expected four values for \"pixelbounds\" parameter. Got {}.",
            pb.len()
        ));
        return sample_bounds;
    }

    let bounds = sample_bounds.intersect(&Bounds2i::new(Point2i::new(pb[0], pb[2]), Point2i::new(pb[1], pb[3])));
    if bounds.is_empty() {
        reporter.error("Degenerate \"pixelbounds\" specified.");
        return sample_bounds;
    }
    bounds
}

impl From<(&ParamSet, ArcSampler, ArcCamera, ArcErrorReporter)> for VolPathIntegrator {
    /// Create a `VolPathIntegrator` from a parameter set.
    ///
    /// * `p` - Parameter set, sampler, camera and error reporter.
    fn from(p: (&ParamSet, ArcSampler, ArcCamera, ArcErrorReporter)) -> Self {
        let (params, sampler, camera, reporter) = p;

        let max_depth = params.find_one_int("maxdepth", 5).max(0) as usize;
        let pixel_bounds = pixel_bounds_from_params(params, camera.get_film().get_sample_bounds(), &reporter);
        let rr_threshold = params.find_one_float("rrthreshold", 1.0);
        let strategy = params.find_one_string("lightsamplestrategy", String::from("spatial"));
        let light_sample_strategy = LightSampleStrategy::parse(&strategy, &reporter);

        Self::new(
            max_depth,
            camera,
            sampler,
            pixel_bounds,
            rr_threshold,
            light_sample_strategy,
        )
    }
}

/// Returns a boxed `VolPathIntegrator`.
///
/// * `params`   - Parameter set.
/// * `sampler`  - The sampler.
/// * `camera`   - The camera.
/// * `reporter` - Reports configuration errors.
pub fn create_volpath_integrator(
    params: &ParamSet,
    sampler: ArcSampler,
    camera: ArcCamera,
    reporter: ArcErrorReporter,
) -> Box<VolPathIntegrator> {
    Box::new(VolPathIntegrator::from((params, sampler, camera, reporter)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cameras::*;
    use float_cmp::*;
    use lights::*;
    use materials::*;
    use media::*;
    use proptest::prelude::*;
    use samplers::*;
    use shapes::*;
    use volpath_core::film::Film;
    use volpath_core::light::*;
    use volpath_core::medium::*;
    use volpath_core::primitives::*;
    use volpath_core::rng::RNG;

    fn integrator(params: &ParamSet, reporter: ArcErrorReporter) -> VolPathIntegrator {
        let film = Film::new(&Point2i::new(8, 8), "volpath-test.png");
        let camera = create_perspective_camera(&ParamSet::new(), film, None);
        let sampler: ArcSampler = Arc::new(RandomSampler::new(1, Some(0)));
        VolPathIntegrator::from((params, sampler, camera, reporter))
    }

    fn diffuse_sphere_scene(medium_interface: MediumInterface) -> Scene {
        let tp = TextureParams::new(
            ParamSet::new().add_rgb("reflectance", &[0.5, 0.5, 0.5]),
            Default::default(),
            Default::default(),
        );
        let shape: ArcShape = Arc::new(Sphere::new(Point3f::zero(), 1.0, false));
        let prim: ArcPrimitive = Arc::new(GeometricPrimitive::new(
            shape,
            Some(create_diffuse_material(&tp)),
            None,
            medium_interface,
        ));
        let aggregate: ArcPrimitive = Arc::new(PrimitiveList::new(vec![prim]));
        let light: ArcLight = Arc::new(DistantLight::new(Spectrum::new(1.0), Vector3f::new(0.0, 0.0, 1.0)));
        Scene::new(aggregate, vec![light])
    }

    #[test]
    fn diffuse_sphere_matches_single_bounce() {
        let reporter = Arc::new(ErrorReporter::new(true));
        let mut integrator = integrator(&ParamSet::new().add_int("maxdepth", &[1]), reporter);
        let scene = diffuse_sphere_scene(MediumInterface::default());
        integrator.preprocess(&scene);

        let arena = Bump::new();
        let mut sampler = RandomSampler::new(1, Some(3));
        let (x, y): (Float, Float) = (0.3, 0.2);
        let cos_theta: Float = (1.0 - x * x - y * y).sqrt();
        let expected = 0.5 * INV_PI * cos_theta;

        for _ in 0..16 {
            let mut ray = Ray::new(
                Point3f::new(x, y, 5.0),
                Vector3f::new(0.0, 0.0, -1.0),
                INFINITY,
                0.0,
                None,
            );
            let l = integrator.li(&mut ray, &scene, &mut sampler, &arena);
            for c in 0..3 {
                assert!(approx_eq!(f32, l[c], expected, epsilon = 1e-4));
            }
        }
    }

    #[test]
    fn subsurface_exit_points_lie_on_the_same_sphere() {
        let tp = TextureParams::new(
            ParamSet::new().add_float("scale", &[10.0]),
            Default::default(),
            Default::default(),
        );
        let shape: ArcShape = Arc::new(Sphere::new(Point3f::zero(), 1.0, false));
        let prim: ArcPrimitive = Arc::new(GeometricPrimitive::new(
            shape,
            Some(create_subsurface_material(&tp)),
            None,
            MediumInterface::default(),
        ));
        let aggregate: ArcPrimitive = Arc::new(PrimitiveList::new(vec![prim]));
        let scene = Scene::new(aggregate, vec![]);

        let arena = Bump::new();
        let mut ray = Ray::new(
            Point3f::new(0.1, 0.2, 5.0),
            Vector3f::new(0.0, 0.0, -1.0),
            INFINITY,
            0.0,
            None,
        );
        let si = scene.intersect(&mut ray).unwrap();
        let sf = si.compute_scattering_functions(&arena, TransportMode::Radiance);
        let bssrdf = sf.bssrdf.unwrap();

        let mut rng = RNG::new(11);
        let mut found = 0;
        for _ in 0..64 {
            let u1 = rng.uniform_float();
            let u2 = Point2f::new(rng.uniform_float(), rng.uniform_float());
            if let Some(bs) = bssrdf.sample_s(&scene, u1, &u2, &arena) {
                found += 1;
                let p = bs.si.hit.p;
                let r = Vector3f::new(p.x, p.y, p.z).length();
                assert!(approx_eq!(f32, r, 1.0, epsilon = 1e-3), "{}", r);
                assert!(bs.pdf > 0.0 && !bs.sp.is_black());
            }
        }
        assert!(found > 0);
    }

    #[test]
    fn escaping_ray_sees_no_environment() {
        let reporter = Arc::new(ErrorReporter::new(true));
        let mut integrator = integrator(&ParamSet::new(), reporter);
        let scene = diffuse_sphere_scene(MediumInterface::default());
        integrator.preprocess(&scene);

        let arena = Bump::new();
        let mut sampler = RandomSampler::new(1, Some(5));
        let mut ray = Ray::new(
            Point3f::new(3.0, 0.0, 5.0),
            Vector3f::new(0.0, 0.0, -1.0),
            INFINITY,
            0.0,
            None,
        );
        assert!(integrator.li(&mut ray, &scene, &mut sampler, &arena).is_black());
    }

    #[test]
    fn absorbing_medium_darkens_sphere() {
        let reporter = Arc::new(ErrorReporter::new(true));
        let mut integrator = integrator(&ParamSet::new().add_int("maxdepth", &[1]), reporter);
        let fog: ArcMedium = Arc::new(HomogeneousMedium::new(
            Spectrum::new(0.5),
            Spectrum::new(0.0),
            0.0,
        ));
        let scene = diffuse_sphere_scene(MediumInterface::new(None, Some(Arc::clone(&fog))));
        integrator.preprocess(&scene);

        let arena = Bump::new();
        let mut sampler = RandomSampler::new(1, Some(11));
        let n = 256;
        let mut sum = 0.0;
        for _ in 0..n {
            let mut ray = Ray::new(
                Point3f::new(0.0, 0.0, 5.0),
                Vector3f::new(0.0, 0.0, -1.0),
                INFINITY,
                0.0,
                Some(Arc::clone(&fog)),
            );
            let l = integrator.li(&mut ray, &scene, &mut sampler, &arena);
            assert!(l[0] >= 0.0);
            sum += l[0];
        }
        let mean = sum / n as Float;
        let clear = 0.5 * INV_PI;
        assert!(mean > 0.0);
        assert!(mean < clear);
    }

    #[test]
    fn degenerate_pixel_bounds_fall_back_to_film() {
        let reporter = Arc::new(ErrorReporter::new(true));
        let params = ParamSet::new().add_int("pixelbounds", &[0, 0, 0, 0]);
        let integrator = integrator(&params, Arc::clone(&reporter));
        assert_eq!(
            integrator.data.pixel_bounds,
            Bounds2i::new(Point2i::new(0, 0), Point2i::new(8, 8))
        );
        assert_eq!(
            reporter.last_message(),
            Some(String::from("Degenerate \"pixelbounds\" specified."))
        );
    }

    #[test]
    fn pixel_bounds_wrong_count_is_reported() {
        let reporter = Arc::new(ErrorReporter::new(true));
        let params = ParamSet::new().add_int("pixelbounds", &[0, 4, 0]);
        let integrator = integrator(&params, Arc::clone(&reporter));
        assert_eq!(
            integrator.data.pixel_bounds,
            Bounds2i::new(Point2i::new(0, 0), Point2i::new(8, 8))
        );
        assert!(reporter
            .last_message()
            .map_or(false, |m| m.contains("Expected four values")));
    }

    #[test]
    fn pixel_bounds_are_x0_x1_y0_y1() {
        let reporter = Arc::new(ErrorReporter::new(true));
        let params = ParamSet::new().add_int("pixelbounds", &[2, 6, 1, 5]);
        let integrator = integrator(&params, Arc::clone(&reporter));
        assert_eq!(
            integrator.data.pixel_bounds,
            Bounds2i::new(Point2i::new(2, 1), Point2i::new(6, 5))
        );
        assert!(reporter.last_message().is_none());
    }

    #[test]
    fn defaults() {
        let reporter = Arc::new(ErrorReporter::new(true));
        let integrator = integrator(&ParamSet::new(), reporter);
        assert_eq!(integrator.max_depth(), 5);
        assert_eq!(integrator.rr_threshold, 1.0);
        assert_eq!(integrator.light_sample_strategy, LightSampleStrategy::Spatial);
    }

    #[test]
    fn roulette_skips_shallow_paths() {
        let beta = Spectrum::new(0.01);
        for depth in 0..=3 {
            assert!(termination_probability(&beta, 1.0, 1.0, depth).is_none());
        }
        assert!(termination_probability(&beta, 1.0, 1.0, 4).is_some());
        assert!(termination_probability(&Spectrum::new(2.0), 1.0, 1.0, 10).is_none());
    }

    #[test]
    fn roulette_factors_out_eta_scale() {
        let beta = Spectrum::new(0.8);
        assert!(termination_probability(&beta, 1.0, 1.0, 8).is_some());
        assert!(termination_probability(&beta, 2.25, 1.0, 8).is_none());
    }

    proptest! {
        #[test]
        fn roulette_is_unbiased(b in 0.0001f32..0.99, depth in 4usize..64) {
            let beta = Spectrum::new(b);
            let q = termination_probability(&beta, 1.0, 1.0, depth).unwrap();
            prop_assert!((0.05..=1.0).contains(&q));

            let survivor = beta / (1.0 - q);
            let expected = q * 0.0 + (1.0 - q) * survivor[0];
            prop_assert!(approx_eq!(f32, expected, b, epsilon = 1e-5));
        }
    }
}
