//! Random Sampler.

use std::sync::Arc;
use volpath_core::geometry::*;
use volpath_core::paramset::*;
use volpath_core::pbrt::*;
use volpath_core::rng::*;
use volpath_core::sampler::*;

/// Implements a sampler that uses a PRNG to generate uniformly random samples.
pub struct RandomSampler {
    /// The common sampler data.
    pub data: SamplerData,

    /// The random number generator.
    pub rng: RNG,
}

impl RandomSampler {
    /// Create a new `RandomSampler`.
    ///
    /// * `samples_per_pixel` - Number of samples to generate for each pixel.
    /// * `seed`              - Optional seed for the random number generator.
    pub fn new(samples_per_pixel: usize, seed: Option<u64>) -> Self {
        Self {
            data: SamplerData::new(samples_per_pixel),
            rng: match seed {
                Some(s) => RNG::new(s),
                None => RNG::default(),
            },
        }
    }
}

impl Sampler for RandomSampler {
    fn get_data(&self) -> &SamplerData {
        &self.data
    }

    fn get_data_mut(&mut self) -> &mut SamplerData {
        &mut self.data
    }

    /// Returns a sampler on its own random stream.
    ///
    /// * `seed` - Selects the stream.
    fn clone_sampler(&self, seed: u64) -> Box<dyn Sampler> {
        Box::new(Self::new(self.data.samples_per_pixel, Some(seed)))
    }

    fn get_1d(&mut self) -> Float {
        self.data.next_dimension(1);
        self.rng.uniform_float()
    }

    fn get_2d(&mut self) -> Point2f {
        self.data.next_dimension(2);
        Point2f::new(self.rng.uniform_float(), self.rng.uniform_float())
    }
}

impl From<(&ParamSet, u64)> for RandomSampler {
    /// Create a `RandomSampler` from a parameter set and a seed.
    ///
    /// * `p` - A tuple containing parameter set and seed.
    fn from(p: (&ParamSet, u64)) -> Self {
        let (params, seed) = p;
        let samples_per_pixel = params.find_one_int("pixelsamples", 4).max(1) as usize;
        debug!("Random sampler with {} samples per pixel", samples_per_pixel);
        Self::new(samples_per_pixel, Some(seed))
    }
}

/// Returns a reference counted `RandomSampler` built from a parameter set.
///
/// * `params` - Parameter set.
/// * `seed`   - Seed for the random number generator.
pub fn create_random_sampler(params: &ParamSet, seed: u64) -> ArcSampler {
    Arc::new(RandomSampler::from((params, seed)))
}
