//! Halton Sampler.

use std::sync::Arc;
use volpath_core::error::*;
use volpath_core::geometry::*;
use volpath_core::low_discrepancy::*;
use volpath_core::paramset::*;
use volpath_core::pbrt::*;
use volpath_core::sampler::*;

/// Maximum resolution for sampling first 2 dimensions.
const K_MAX_RESOLUTION: Int = 128;

/// Implements a low-discrepancy sampler using Halton sequences. Pixels are
/// mapped onto the first two dimensions so every pixel gets its own
/// well-distributed subsequence.
pub struct HaltonSampler {
    /// The sampler data.
    data: SamplerData,

    /// Sample bounds.
    sample_bounds: Bounds2i,

    /// Scale factors `2^j` and `3^k`.
    base_scales: [u64; 2],

    /// The exponents `j` and `k` of `base_scales`.
    base_exponents: [u64; 2],

    /// Stores the product `2^j * 3^k`. Every pixel in the range
    /// (0, 0) -> (2^j - 1, 3^k - 1) is visited once per stride.
    sample_stride: u64,

    /// Multiplicative inverses for `base_scales`.
    mult_inverse: [u64; 2],

    /// Pixel for the current offset.
    pixel_for_offset: Point2i,

    /// Index of the first Halton sample for `pixel_for_offset`.
    offset_for_current_pixel: u64,

    /// Global index of the current sample.
    interval_sample_index: u64,

    /// Reports running out of prime bases.
    reporter: ArcErrorReporter,
}

impl HaltonSampler {
    /// Create a new `HaltonSampler`.
    ///
    /// * `samples_per_pixel` - Number of samples per pixel.
    /// * `sample_bounds`     - Sample bounds.
    /// * `reporter`          - Error reporter.
    pub fn new(samples_per_pixel: usize, sample_bounds: Bounds2i, reporter: ArcErrorReporter) -> Self {
        // Find base scales and exponents that cover the sampling area.
        let res = sample_bounds.diagonal();
        let res = [res.x, res.y];
        let mut base_scales = [1_u64; 2];
        let mut base_exponents = [0_u64; 2];
        for i in 0..2 {
            let base = if i == 0 { 2_u64 } else { 3_u64 };
            while (base_scales[i] as Int) < res[i].min(K_MAX_RESOLUTION) {
                base_scales[i] *= base;
                base_exponents[i] += 1;
            }
        }

        let sample_stride = base_scales[0] * base_scales[1];
        let mult_inverse = [
            multiplicative_inverse(base_scales[1] as i64, base_scales[0] as i64),
            multiplicative_inverse(base_scales[0] as i64, base_scales[1] as i64),
        ];

        Self {
            data: SamplerData::new(samples_per_pixel),
            sample_bounds,
            base_scales,
            base_exponents,
            sample_stride,
            mult_inverse,
            pixel_for_offset: Point2i::new(Int::MAX, Int::MAX),
            offset_for_current_pixel: 0,
            interval_sample_index: 0,
            reporter,
        }
    }

    /// Maps the current pixel and a sample number to a global index into the
    /// Halton sequence.
    ///
    /// * `sample_num` - The sample number.
    fn get_index_for_sample(&mut self, sample_num: usize) -> u64 {
        if self.data.current_pixel != self.pixel_for_offset {
            self.offset_for_current_pixel = 0;
            if self.sample_stride > 1 {
                let pm = [
                    self.data.current_pixel.x.rem_euclid(K_MAX_RESOLUTION) as u64,
                    self.data.current_pixel.y.rem_euclid(K_MAX_RESOLUTION) as u64,
                ];
                for i in 0..2 {
                    let base = if i == 0 { 2 } else { 3 };
                    let dim_offset = inverse_radical_inverse(base, pm[i], self.base_exponents[i]);
                    let offset = dim_offset
                        .wrapping_mul(self.sample_stride / self.base_scales[i])
                        .wrapping_mul(self.mult_inverse[i]);
                    self.offset_for_current_pixel = self.offset_for_current_pixel.wrapping_add(offset);
                }
                self.offset_for_current_pixel %= self.sample_stride;
            }
            self.pixel_for_offset = self.data.current_pixel;
        }
        self.offset_for_current_pixel + sample_num as u64 * self.sample_stride
    }

    /// Returns the sample value for a dimension of the current sample.
    ///
    /// * `dim` - Dimension.
    fn sample_dimension(&self, dim: usize) -> Float {
        if dim >= PRIME_TABLE_SIZE {
            self.reporter.error_exit(&format!(
                "HaltonSampler can only sample {} dimensions.",
                PRIME_TABLE_SIZE
            ));
        }
        let index = self.interval_sample_index;
        match dim {
            0 => radical_inverse(0, index >> self.base_exponents[0]),
            1 => radical_inverse(1, index / self.base_scales[1]),
            _ => radical_inverse(dim, index),
        }
    }
}

impl Sampler for HaltonSampler {
    fn get_data(&self) -> &SamplerData {
        &self.data
    }

    fn get_data_mut(&mut self) -> &mut SamplerData {
        &mut self.data
    }

    /// Generates a copy for a rendering thread. The sequence is
    /// deterministic so the seed is ignored.
    ///
    /// * `_seed` - Ignored.
    fn clone_sampler(&self, _seed: u64) -> Box<dyn Sampler> {
        Box::new(Self::new(
            self.data.samples_per_pixel,
            self.sample_bounds,
            Arc::clone(&self.reporter),
        ))
    }

    fn start_pixel(&mut self, p: &Point2i) {
        self.data.start_pixel(p);
        self.interval_sample_index = self.get_index_for_sample(0);
    }

    fn get_1d(&mut self) -> Float {
        let dim = self.data.next_dimension(1);
        self.sample_dimension(dim)
    }

    fn get_2d(&mut self) -> Point2f {
        let dim = self.data.next_dimension(2);
        Point2f::new(self.sample_dimension(dim), self.sample_dimension(dim + 1))
    }

    fn start_next_sample(&mut self) -> bool {
        self.interval_sample_index = self.get_index_for_sample(self.data.current_pixel_sample_index + 1);
        self.data.start_next_sample()
    }

    fn set_sample_number(&mut self, sample_num: usize) -> bool {
        self.interval_sample_index = self.get_index_for_sample(sample_num);
        self.data.set_sample_number(sample_num)
    }
}

impl From<(&ParamSet, Bounds2i, ArcErrorReporter)> for HaltonSampler {
    /// Create a `HaltonSampler` from a parameter set, the sample bounds and
    /// an error reporter.
    ///
    /// * `p` - A tuple containing parameter set, sample bounds and reporter.
    fn from(p: (&ParamSet, Bounds2i, ArcErrorReporter)) -> Self {
        let (params, sample_bounds, reporter) = p;
        let samples_per_pixel = params.find_one_int("pixelsamples", 16).max(1) as usize;
        debug!("Halton sampler with {} samples per pixel", samples_per_pixel);
        Self::new(samples_per_pixel, sample_bounds, reporter)
    }
}

/// Returns a reference counted `HaltonSampler` built from a parameter set.
///
/// * `params`        - Parameter set.
/// * `sample_bounds` - Sample bounds.
/// * `reporter`      - Error reporter.
pub fn create_halton_sampler(params: &ParamSet, sample_bounds: Bounds2i, reporter: ArcErrorReporter) -> ArcSampler {
    Arc::new(HaltonSampler::from((params, sample_bounds, reporter)))
}

/// Inverts the radical inverse of a value that has `n_digits` digits in
/// `base`.
///
/// * `base`         - The base.
/// * `inverse`      - Digit-reversed value as an integer.
/// * `n_digits`     - Number of digits.
fn inverse_radical_inverse(base: u64, inverse: u64, n_digits: u64) -> u64 {
    let mut inverse = inverse;
    let mut index = 0_u64;
    for _ in 0..n_digits {
        let digit = inverse % base;
        inverse /= base;
        index = index * base + digit;
    }
    index
}

/// Returns `(x, y)` such that `a * x + b * y = gcd(a, b)`.
///
/// * `a` - First number.
/// * `b` - Second number.
fn extended_gcd(a: i64, b: i64) -> (i64, i64) {
    if b == 0 {
        (1, 0)
    } else {
        let d = a / b;
        let (xp, yp) = extended_gcd(b, a % b);
        (yp, xp - d * yp)
    }
}

/// Returns `b` such that `(a * b) mod n = 1`.
///
/// * `a` - Number.
/// * `n` - Modulus.
fn multiplicative_inverse(a: i64, n: i64) -> u64 {
    let (x, _) = extended_gcd(a, n);
    x.rem_euclid(n) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sampler(spp: usize, res: Int) -> HaltonSampler {
        let bounds = Bounds2i::new(Point2i::new(0, 0), Point2i::new(res, res));
        HaltonSampler::new(spp, bounds, Arc::new(ErrorReporter::new(true)))
    }

    #[test]
    fn inverses_modulo_base_scales() {
        let s = sampler(1, 9);
        // 16 x 9 pixel grid covers a 9 x 9 image.
        assert_eq!(s.base_scales, [16, 9]);
        assert_eq!((s.base_scales[1] * s.mult_inverse[0]) % s.base_scales[0], 1);
        assert_eq!((s.base_scales[0] * s.mult_inverse[1]) % s.base_scales[1], 1);
    }

    #[test]
    fn first_dimensions_land_in_the_pixel() {
        let mut s = sampler(4, 9);
        for y in 0..9 {
            for x in 0..9 {
                let p = Point2i::new(x, y);
                s.start_pixel(&p);
                loop {
                    let cs = s.get_camera_sample(&p);
                    assert!(cs.p_film.x >= x as Float && cs.p_film.x < (x + 1) as Float);
                    assert!(cs.p_film.y >= y as Float && cs.p_film.y < (y + 1) as Float);
                    if !s.start_next_sample() {
                        break;
                    }
                }
            }
        }
    }

    #[test]
    fn deterministic_across_clones() {
        let mut a = sampler(2, 4);
        let mut b = a.clone_sampler(99);
        let p = Point2i::new(2, 3);
        a.start_pixel(&p);
        b.start_pixel(&p);
        for _ in 0..10 {
            assert_eq!(a.get_1d(), b.get_1d());
        }
    }

    #[test]
    fn inverse_radical_inverse_reverses_digits() {
        // 6 = 110b reversed over 3 digits is 011b.
        assert_eq!(inverse_radical_inverse(2, 6, 3), 3);
        assert_eq!(inverse_radical_inverse(3, 1, 2), 3);
    }
}
