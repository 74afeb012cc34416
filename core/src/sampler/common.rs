//! Common

use super::*;

/// Per-pixel bookkeeping shared by all samplers.
#[derive(Clone, Default)]
pub struct SamplerData {
    /// Number of samples generated for each pixel.
    pub samples_per_pixel: usize,

    /// Coordinates of current pixel being generated.
    pub current_pixel: Point2i,

    /// Sample number of the pixel currently being generated.
    pub current_pixel_sample_index: usize,

    /// Next dimension of the current sample vector.
    pub dimension: usize,
}

impl SamplerData {
    /// Create a new `SamplerData` instance.
    ///
    /// * `samples_per_pixel` - Number of samples to generate for each pixel.
    pub fn new(samples_per_pixel: usize) -> Self {
        Self {
            samples_per_pixel,
            ..Default::default()
        }
    }

    /// Starts the first sample of a pixel.
    ///
    /// * `p` - The pixel.
    pub fn start_pixel(&mut self, p: &Point2i) {
        self.current_pixel = *p;
        self.current_pixel_sample_index = 0;
        self.dimension = 0;
    }

    /// Advances to the next sample. Returns `true` if
    /// `current_pixel_sample_index` < `samples_per_pixel`.
    pub fn start_next_sample(&mut self) -> bool {
        self.current_pixel_sample_index += 1;
        self.dimension = 0;
        self.current_pixel_sample_index < self.samples_per_pixel
    }

    /// Jumps to a sample of the current pixel. Returns `true` if
    /// `current_pixel_sample_index` < `samples_per_pixel`.
    ///
    /// * `sample_num` - The sample number.
    pub fn set_sample_number(&mut self, sample_num: usize) -> bool {
        self.current_pixel_sample_index = sample_num;
        self.dimension = 0;
        self.current_pixel_sample_index < self.samples_per_pixel
    }

    /// Returns the next dimension and advances by `n`.
    ///
    /// * `n` - Number of dimensions consumed.
    pub fn next_dimension(&mut self, n: usize) -> usize {
        let d = self.dimension;
        self.dimension += n;
        d
    }
}
