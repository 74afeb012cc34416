//! 1D Distribution.

use crate::pbrt::*;

/// Piecewise-constant 1D function with its normalized CDF, supporting
/// continuous and discrete sampling.
#[derive(Clone, Debug)]
pub struct Distribution1D {
    /// Piecewise-constant function values.
    pub func: Vec<Float>,

    /// CDF for `func` with `func.len() + 1` entries.
    pub cdf: Vec<Float>,

    /// Integral of `func` over [0, 1].
    pub func_int: Float,
}

impl Distribution1D {
    /// Builds the distribution for a piecewise-constant function. A function
    /// that integrates to zero gets a uniform CDF.
    ///
    /// * `func` - Function values over equally sized segments of [0, 1].
    pub fn new(func: Vec<Float>) -> Self {
        let n = func.len();
        let cdf: Vec<Float> = std::iter::once(0.0)
            .chain(func.iter().scan(0.0, |acc, &f| {
                *acc += f.abs() / n as Float;
                Some(*acc)
            }))
            .collect();

        let func_int = cdf[n];
        let cdf = if func_int == 0.0 {
            (0..=n).map(|i| i as Float / n as Float).collect()
        } else {
            cdf.into_iter().map(|c| c / func_int).collect()
        };

        Self {
            func,
            cdf,
            func_int,
        }
    }

    /// Returns the number of segments.
    pub fn count(&self) -> usize {
        self.func.len()
    }

    /// Samples the continuous distribution. Returns the sampled value in
    /// [0, 1), its PDF and the segment index.
    ///
    /// * `u` - Uniform sample.
    pub fn sample_continuous(&self, u: Float) -> (Float, Float, usize) {
        let offset = find_interval(self.cdf.len(), |i| self.cdf[i] <= u);

        let mut du = u - self.cdf[offset];
        let width = self.cdf[offset + 1] - self.cdf[offset];
        if width > 0.0 {
            du /= width;
        }

        let pdf = if self.func_int > 0.0 {
            self.func[offset] / self.func_int
        } else {
            0.0
        };

        ((offset as Float + du) / self.count() as Float, pdf, offset)
    }

    /// Samples a segment index. Returns the index, its probability and the
    /// sample remapped to [0, 1) within the chosen segment.
    ///
    /// * `u` - Uniform sample.
    pub fn sample_discrete(&self, u: Float) -> (usize, Float, Float) {
        let offset = find_interval(self.cdf.len(), |i| self.cdf[i] <= u);
        let width = self.cdf[offset + 1] - self.cdf[offset];
        let u_remapped = if width > 0.0 {
            clamp((u - self.cdf[offset]) / width, 0.0, 1.0)
        } else {
            0.0
        };
        (offset, self.discrete_pdf(offset), u_remapped)
    }

    /// Returns the probability of sampling a given segment.
    ///
    /// * `index` - Segment index.
    pub fn discrete_pdf(&self, index: usize) -> Float {
        if self.func_int > 0.0 {
            self.func[index] / (self.func_int * self.count() as Float)
        } else {
            1.0 / self.count() as Float
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn discrete_probabilities_follow_weights() {
        let d = Distribution1D::new(vec![1.0, 3.0]);
        assert!(approx_eq!(Float, d.discrete_pdf(0), 0.25));
        assert!(approx_eq!(Float, d.discrete_pdf(1), 0.75));
        let (i, pdf, u) = d.sample_discrete(0.5);
        assert_eq!(i, 1);
        assert!(approx_eq!(Float, pdf, 0.75));
        assert!(approx_eq!(Float, u, 1.0 / 3.0, epsilon = 1e-6));
    }

    #[test]
    fn zero_function_is_uniform() {
        let d = Distribution1D::new(vec![0.0; 4]);
        assert!(approx_eq!(Float, d.discrete_pdf(2), 0.25));
        let (x, pdf, offset) = d.sample_continuous(0.6);
        assert_eq!(offset, 2);
        assert!(approx_eq!(Float, x, 0.6, epsilon = 1e-6));
        assert_eq!(pdf, 0.0);
    }

    #[test]
    fn continuous_pdf_is_function_over_integral() {
        let d = Distribution1D::new(vec![2.0, 0.0, 2.0]);
        let (x, pdf, offset) = d.sample_continuous(0.75);
        assert_eq!(offset, 2);
        assert!(x >= 2.0 / 3.0);
        assert!(approx_eq!(Float, pdf, 1.5, epsilon = 1e-5));
    }
}
