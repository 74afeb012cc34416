//! Homogeneous Medium

use std::sync::Arc;
use volpath_core::geometry::*;
use volpath_core::interaction::MediumInteraction;
use volpath_core::medium::*;
use volpath_core::paramset::*;
use volpath_core::pbrt::*;
use volpath_core::sampler::*;
use volpath_core::sampling::*;
use volpath_core::spectrum::*;

/// A region of space with constant σa and σs throughout its extent.
pub struct HomogeneousMedium {
    /// Absorption coefficient `σa`, the probability density that light is
    /// absorbed per unit distance.
    sigma_a: Spectrum,

    /// Scattering coefficient `σs`, the probability density of an
    /// out-scattering event per unit distance.
    sigma_s: Spectrum,

    /// Attenuation coefficient `σt = σa + σs`.
    sigma_t: Spectrum,

    /// The asymmetry parameter for the Henyey-Greenstein phase function.
    g: Float,
}

impl HomogeneousMedium {
    /// Create a new `HomogeneousMedium`.
    ///
    /// * `sigma_a` - Absorption coefficient `σa`.
    /// * `sigma_s` - Scattering coefficient `σs`.
    /// * `g`       - The asymmetry parameter for the Henyey-Greenstein phase
    ///               function.
    pub fn new(sigma_a: Spectrum, sigma_s: Spectrum, g: Float) -> Self {
        Self {
            sigma_a,
            sigma_s,
            sigma_t: sigma_s + sigma_a,
            g,
        }
    }

    /// Returns the absorption coefficient.
    pub fn sigma_a(&self) -> Spectrum {
        self.sigma_a
    }

    /// Returns the attenuation coefficient.
    pub fn sigma_t(&self) -> Spectrum {
        self.sigma_t
    }

    /// Returns the transmittance over a distance.
    ///
    /// * `distance` - World space distance.
    fn transmittance(&self, distance: Float) -> Spectrum {
        (-self.sigma_t * distance.min(Float::MAX)).exp()
    }
}

impl Medium for HomogeneousMedium {
    fn tr(&self, ray: &Ray, _sampler: &mut dyn Sampler) -> Spectrum {
        self.transmittance(ray.t_max * ray.d.length())
    }

    /// Samples a distance by choosing a spectral channel and sampling the
    /// exponential distribution of its attenuation coefficient. The weight
    /// is divided by the density averaged over all channels.
    ///
    /// * `ray`     - The ray.
    /// * `sampler` - The sampler.
    fn sample(&self, ray: &Ray, sampler: &mut dyn Sampler) -> (Spectrum, Option<MediumInteraction>) {
        let channel = ((sampler.get_1d() * RGB_SAMPLES as Float) as usize).min(RGB_SAMPLES - 1);
        let u = sampler.get_1d();

        let d_length = ray.d.length();
        let dist = sample_exponential(u, self.sigma_t[channel]);
        let t = (dist / d_length).min(ray.t_max);
        let sampled_medium = t < ray.t_max;

        let tr = self.transmittance(t * d_length);
        let density = if sampled_medium { self.sigma_t * tr } else { tr };
        let mut pdf = density.average();
        if pdf == 0.0 {
            pdf = 1.0;
        }

        if sampled_medium {
            let mi = MediumInteraction::new(
                ray.at(t),
                -ray.d,
                ray.time,
                ray.medium.clone(),
                HenyeyGreenstein::new(self.g),
            );
            (tr * self.sigma_s / pdf, Some(mi))
        } else {
            (tr / pdf, None)
        }
    }
}

impl From<&ParamSet> for HomogeneousMedium {
    /// Create a `HomogeneousMedium` from a parameter set. Reads `sigma_a`,
    /// `sigma_s`, `scale` and `g`.
    ///
    /// * `params` - Parameter set.
    fn from(params: &ParamSet) -> Self {
        let sig_a = params.find_one_spectrum("sigma_a", Spectrum::rgb(0.0011, 0.0024, 0.014));
        let sig_s = params.find_one_spectrum("sigma_s", Spectrum::rgb(2.55, 3.21, 3.77));
        let scale = params.find_one_float("scale", 1.0);
        let g = params.find_one_float("g", 0.0);
        if g.abs() >= 1.0 {
            warn!("Henyey-Greenstein asymmetry {} outside (-1, 1). Clamping.", g);
        }
        Self::new(sig_a * scale, sig_s * scale, clamp(g, -0.99, 0.99))
    }
}

/// Returns a reference counted `HomogeneousMedium` built from a parameter set.
///
/// * `params` - Parameter set.
pub fn create_homogeneous_medium(params: &ParamSet) -> ArcMedium {
    Arc::new(HomogeneousMedium::from(params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;
    use volpath_core::camera::CameraSample;

    /// Replays a fixed list of sample values.
    struct Fixed {
        data: SamplerData,
        values: Vec<Float>,
        next: usize,
    }

    impl Fixed {
        fn new(values: Vec<Float>) -> Self {
            Self {
                data: SamplerData::new(1),
                values,
                next: 0,
            }
        }
    }

    impl Sampler for Fixed {
        fn get_data(&self) -> &SamplerData {
            &self.data
        }

        fn get_data_mut(&mut self) -> &mut SamplerData {
            &mut self.data
        }

        fn clone_sampler(&self, _seed: u64) -> Box<dyn Sampler> {
            Box::new(Fixed::new(self.values.clone()))
        }

        fn get_1d(&mut self) -> Float {
            let v = self.values[self.next % self.values.len()];
            self.next += 1;
            v
        }

        fn get_2d(&mut self) -> Point2f {
            Point2f::new(self.get_1d(), self.get_1d())
        }

        fn get_camera_sample(&mut self, _p: &Point2i) -> CameraSample {
            CameraSample::new(Point2f::default(), Point2f::default(), 0.0)
        }
    }

    fn ray(t_max: Float) -> Ray {
        Ray::new(Point3f::zero(), Vector3f::new(0.0, 0.0, 2.0), t_max, 0.0, None)
    }

    #[test]
    fn transmittance_uses_world_distance() {
        let medium = HomogeneousMedium::new(Spectrum::new(0.5), Spectrum::new(0.5), 0.0);
        let tr = medium.tr(&ray(1.0), &mut Fixed::new(vec![0.5]));
        assert!(approx_eq!(Float, tr[0], (-2.0 as Float).exp(), epsilon = 1e-6));
    }

    #[test]
    fn scattering_weight_is_albedo_for_grey_media() {
        let medium = HomogeneousMedium::new(Spectrum::new(0.25), Spectrum::new(0.75), 0.3);
        let (weight, mi) = medium.sample(&ray(INFINITY), &mut Fixed::new(vec![0.2, 0.5]));
        let mi = mi.unwrap();
        assert!(approx_eq!(Float, weight[1], 0.75, epsilon = 1e-5));
        assert!(approx_eq!(Float, mi.phase.g, 0.3));
        assert!(approx_eq!(Float, mi.hit.wo.z, -1.0, epsilon = 1e-6));
    }

    #[test]
    fn passing_through_has_unit_weight_for_grey_media() {
        let medium = HomogeneousMedium::new(Spectrum::new(0.1), Spectrum::new(0.1), 0.0);
        let (weight, mi) = medium.sample(&ray(0.01), &mut Fixed::new(vec![0.2, 0.5]));
        assert!(mi.is_none());
        assert!(approx_eq!(Float, weight[2], 1.0, epsilon = 1e-5));
    }

    #[test]
    fn parameters_are_scaled() {
        let params = ParamSet::new()
            .add_rgb("sigma_a", &[1.0, 2.0, 3.0])
            .add_rgb("sigma_s", &[1.0, 1.0, 1.0])
            .add_float("scale", &[2.0]);
        let medium = HomogeneousMedium::from(&params);
        assert!(approx_eq!(Float, medium.sigma_a()[2], 6.0));
        assert!(approx_eq!(Float, medium.sigma_t()[0], 4.0));
    }

    proptest! {
        #[test]
        fn sampled_points_lie_within_segment(u0 in 0.0..1.0 as Float, u1 in 0.0..1.0 as Float, t_max in 0.01..10.0 as Float) {
            let medium = HomogeneousMedium::new(Spectrum::rgb(0.2, 0.4, 0.8), Spectrum::new(0.5), 0.0);
            let r = ray(t_max);
            let (weight, mi) = medium.sample(&r, &mut Fixed::new(vec![u0, u1]));
            prop_assert!(!weight.has_nans());
            if let Some(mi) = mi {
                prop_assert!(mi.hit.p.z <= r.at(t_max).z + 1e-4);
            }
        }
    }
}
