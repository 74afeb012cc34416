//! Direct Lighting

use crate::geometry::*;
use crate::interaction::*;
use crate::light::*;
use crate::pbrt::*;
use crate::reflection::*;
use crate::sampler::*;
use crate::sampling::*;
use crate::scene::*;
use crate::spectrum::*;
use std::sync::Arc;

/// A scattering point used for direct lighting.
#[derive(Clone, Copy)]
pub enum Interaction<'a> {
    /// A surface point and its BSDF.
    Surface {
        si: &'a SurfaceInteraction,
        bsdf: &'a BSDF,
    },

    /// A point inside a participating medium.
    Medium { mi: &'a MediumInteraction },
}

impl<'a> Interaction<'a> {
    /// Returns the common interaction data.
    pub fn get_hit(&self) -> &'a Hit {
        match self {
            Self::Surface { si, .. } => &si.hit,
            Self::Medium { mi } => &mi.hit,
        }
    }

    /// Returns the scattering function value times the cosine factor and
    /// the density of sampling `wi` by scattering.
    ///
    /// * `wi` - Incident direction.
    fn scattering(&self, wi: &Vector3f) -> (Spectrum, Float) {
        match self {
            Self::Surface { si, bsdf } => {
                let f = bsdf.f(&si.hit.wo, wi, TransportMode::Radiance) * wi.abs_dot(&si.shading.n);
                let pdf = bsdf.pdf(&si.hit.wo, wi, TransportMode::Radiance, BxDFReflTransFlags::ALL);
                (f, pdf)
            }
            Self::Medium { mi } => {
                let p = mi.phase.p(&mi.hit.wo, wi);
                (Spectrum::new(p), p)
            }
        }
    }
}

/// Chooses one light from the light distribution and estimates its direct
/// lighting, divided by the probability of choosing it.
///
/// * `it`            - The scattering point.
/// * `scene`         - The scene.
/// * `sampler`       - The sampler.
/// * `handle_media`  - Account for attenuation by participating media.
/// * `light_distrib` - Light selection distribution; uniform if `None`.
pub fn uniform_sample_one_light(
    it: &Interaction,
    scene: &Scene,
    sampler: &mut dyn Sampler,
    handle_media: bool,
    light_distrib: Option<&Distribution1D>,
) -> Spectrum {
    let n_lights = scene.lights.len();
    if n_lights == 0 {
        return Spectrum::new(0.0);
    }

    let u = sampler.get_1d();
    let (light_num, light_pdf) = match light_distrib {
        Some(distrib) => {
            let (light_num, pdf, _) = distrib.sample_discrete(u);
            (light_num, pdf)
        }
        None => (
            ((u * n_lights as Float) as usize).min(n_lights - 1),
            1.0 / n_lights as Float,
        ),
    };
    if light_pdf == 0.0 {
        return Spectrum::new(0.0);
    }

    let light = &scene.lights[light_num];
    let u_light = sampler.get_2d();
    let u_scattering = sampler.get_2d();
    estimate_direct(it, &u_scattering, light, &u_light, scene, sampler, handle_media) / light_pdf
}

/// Estimates direct lighting from one light with multiple importance
/// sampling between the light and the BSDF or phase function. Specular
/// lobes are left to the path tracer.
///
/// * `it`           - The scattering point.
/// * `u_scattering` - Sample for BSDF or phase function sampling.
/// * `light`        - The light.
/// * `u_light`      - Sample for light sampling.
/// * `scene`        - The scene.
/// * `sampler`      - The sampler.
/// * `handle_media` - Account for attenuation by participating media.
pub fn estimate_direct(
    it: &Interaction,
    u_scattering: &Point2f,
    light: &ArcLight,
    u_light: &Point2f,
    scene: &Scene,
    sampler: &mut dyn Sampler,
    handle_media: bool,
) -> Spectrum {
    let hit = it.get_hit();
    let mut ld = Spectrum::new(0.0);

    // Sample the light.
    if let Some(Li {
        wi,
        pdf: light_pdf,
        visibility,
        value,
    }) = light.sample_li(hit, u_light)
    {
        if light_pdf > 0.0 && !value.is_black() {
            let (f, scattering_pdf) = it.scattering(&wi);
            debug!("  light sample f: {}, scattering_pdf: {}", f, scattering_pdf);

            if !f.is_black() {
                let li = if handle_media {
                    value * visibility.tr(scene, sampler)
                } else if visibility.unoccluded(scene) {
                    value
                } else {
                    Spectrum::new(0.0)
                };

                if !li.is_black() {
                    if light.is_delta_light() {
                        ld += f * li / light_pdf;
                    } else {
                        let weight = power_heuristic(1, light_pdf, 1, scattering_pdf);
                        ld += f * li * weight / light_pdf;
                    }
                }
            }
        }
    }

    if light.is_delta_light() {
        return ld;
    }

    // Sample the BSDF or phase function.
    let (f, wi, sample_pdf, scattering_pdf) = match it {
        Interaction::Surface { si, bsdf } => {
            let u = sampler.get_1d();
            match bsdf.sample_f(
                &si.hit.wo,
                u,
                u_scattering,
                TransportMode::Radiance,
                BxDFReflTransFlags::ALL,
            ) {
                Some(bs) if !bs.is_specular() => {
                    let pdf = if bs.pdf_is_proportional {
                        bsdf.pdf(&si.hit.wo, &bs.wi, TransportMode::Radiance, BxDFReflTransFlags::ALL)
                    } else {
                        bs.pdf
                    };
                    (bs.f * bs.wi.abs_dot(&si.shading.n), bs.wi, bs.pdf, pdf)
                }
                _ => return ld,
            }
        }
        Interaction::Medium { mi } => {
            let (p, wi) = mi.phase.sample_p(&mi.hit.wo, u_scattering);
            (Spectrum::new(p), wi, p, p)
        }
    };
    debug!("  scattering sample f: {}, scattering_pdf: {}", f, scattering_pdf);

    if f.is_black() || sample_pdf <= 0.0 {
        return ld;
    }

    let light_pdf = light.pdf_li(hit, &wi);
    if light_pdf == 0.0 {
        return ld;
    }
    let weight = power_heuristic(1, scattering_pdf, 1, light_pdf);

    let mut ray = hit.spawn_ray(&wi);
    let (light_isect, tr) = if handle_media {
        scene.intersect_tr(&mut ray, sampler)
    } else {
        (scene.intersect(&mut ray), Spectrum::new(1.0))
    };

    let li = match light_isect {
        Some(isect) => match isect.area_light.as_ref() {
            Some(area_light) if same_light(area_light, light) => isect.le(&(-wi)),
            _ => Spectrum::new(0.0),
        },
        None => light.le(&ray),
    };

    if !li.is_black() {
        ld += f * li * tr * weight / sample_pdf;
    }
    ld
}

/// Returns `true` if both handles refer to the same light.
///
/// * `a` - A light.
/// * `b` - Another light.
pub fn same_light(a: &ArcLight, b: &ArcLight) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}
