//! 2D Distribution.

use super::Distribution1D;
use crate::geometry::*;
use crate::pbrt::*;

/// Piecewise-constant 2D distribution sampled by first choosing a row from
/// the marginal distribution and then a column from that row's conditional
/// distribution.
#[derive(Clone, Debug)]
pub struct Distribution2D {
    /// Conditional distributions, one per row.
    p_conditional_v: Vec<Distribution1D>,

    /// Marginal distribution over rows.
    p_marginal: Distribution1D,
}

impl Distribution2D {
    /// Builds the distribution from row-major function values.
    ///
    /// * `func` - Function values, `nu * nv` entries.
    /// * `nu`   - Number of columns.
    /// * `nv`   - Number of rows.
    pub fn new(func: &[Float], nu: usize, nv: usize) -> Self {
        debug_assert_eq!(func.len(), nu * nv);
        let p_conditional_v: Vec<Distribution1D> = func
            .chunks(nu)
            .take(nv)
            .map(|row| Distribution1D::new(row.to_vec()))
            .collect();
        let p_marginal =
            Distribution1D::new(p_conditional_v.iter().map(|d| d.func_int).collect());
        Self {
            p_conditional_v,
            p_marginal,
        }
    }

    /// Samples a point in [0, 1)^2 and returns it with its PDF.
    ///
    /// * `u` - Uniform sample.
    pub fn sample_continuous(&self, u: &Point2f) -> (Point2f, Float) {
        let (d1, pdf1, v) = self.p_marginal.sample_continuous(u.y);
        let (d0, pdf0, _) = self.p_conditional_v[v].sample_continuous(u.x);
        (Point2f::new(d0, d1), pdf0 * pdf1)
    }

    /// Returns the PDF of sampling a point.
    ///
    /// * `p` - The point in [0, 1]^2.
    pub fn pdf(&self, p: &Point2f) -> Float {
        if self.p_marginal.func_int == 0.0 {
            return 0.0;
        }
        let nu = self.p_conditional_v[0].count();
        let nv = self.p_marginal.count();
        let iu = clamp((p.x * nu as Float) as isize, 0, nu as isize - 1) as usize;
        let iv = clamp((p.y * nv as Float) as isize, 0, nv as isize - 1) as usize;
        self.p_conditional_v[iv].func[iu] / self.p_marginal.func_int
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn sampled_pdf_matches_lookup() {
        let func = [1.0, 2.0, 3.0, 4.0, 0.5, 0.5];
        let d = Distribution2D::new(&func, 2, 3);
        for &(x, y) in &[(0.1, 0.1), (0.7, 0.4), (0.3, 0.9)] {
            let (p, pdf) = d.sample_continuous(&Point2f::new(x, y));
            assert!(approx_eq!(Float, pdf, d.pdf(&p), epsilon = 1e-4));
        }
    }
}
