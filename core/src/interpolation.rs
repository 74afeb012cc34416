//! Catmull-Rom spline interpolation, integration and sampling.

use crate::pbrt::*;

/// One cubic Hermite segment of a Catmull-Rom spline reparameterized to
/// t ∈ [0, 1], with derivatives estimated by finite differences.
#[derive(Copy, Clone, Debug)]
struct Segment {
    f0: Float,
    f1: Float,
    d0: Float,
    d1: Float,
}

impl Segment {
    /// Builds segment `i` of a spline given node positions and a value lookup.
    ///
    /// * `x` - Node positions.
    /// * `f` - Returns the (possibly interpolated) value at node `j`.
    /// * `i` - Segment index.
    fn new<F: Fn(usize) -> Float>(x: &[Float], f: F, i: usize) -> Self {
        let n = x.len();
        let (x0, x1) = (x[i], x[i + 1]);
        let (f0, f1) = (f(i), f(i + 1));
        let width = x1 - x0;
        let d0 = if i > 0 {
            width * (f1 - f(i - 1)) / (x1 - x[i - 1])
        } else {
            f1 - f0
        };
        let d1 = if i + 2 < n {
            width * (f(i + 2) - f0) / (x[i + 2] - x0)
        } else {
            f1 - f0
        };
        Self { f0, f1, d0, d1 }
    }

    /// Value of the spline at `t`.
    fn eval(&self, t: Float) -> Float {
        let Self { f0, f1, d0, d1 } = *self;
        f0 + t * (d0 + t * (-2.0 * d0 - d1 + 3.0 * (f1 - f0) + t * (d0 + d1 + 2.0 * (f0 - f1))))
    }

    /// Integral of the spline over [0, t].
    fn integral(&self, t: Float) -> Float {
        let Self { f0, f1, d0, d1 } = *self;
        t * (f0
            + t * (0.5 * d0
                + t * ((1.0 / 3.0) * (-2.0 * d0 - d1) + f1 - f0
                    + t * (0.25 * (d0 + d1) + 0.5 * (f0 - f1)))))
    }

    /// Solves `g(t) = u` on [0, 1] with a safeguarded Newton iteration where
    /// `g` is monotonic and `dg` its derivative.
    fn solve<G, D>(t0: Float, u: Float, g: G, dg: D) -> Float
    where
        G: Fn(Float) -> Float,
        D: Fn(Float) -> Float,
    {
        let (mut a, mut b) = (0.0, 1.0);
        let mut t = t0;
        for _ in 0..64 {
            if !(t >= a && t <= b) {
                t = 0.5 * (a + b);
            }
            let residual = g(t) - u;
            if residual.abs() < 1e-6 || b - a < 1e-6 {
                break;
            }
            if residual < 0.0 {
                a = t;
            } else {
                b = t;
            }
            let slope = dg(t);
            t = if slope != 0.0 { t - residual / slope } else { 0.5 * (a + b) };
        }
        t
    }

    /// Inverts the integral of the segment, starting from the linear guess.
    fn sample(&self, u: Float) -> Float {
        let t0 = if self.f0 != self.f1 {
            (self.f0 - safe_sqrt(self.f0 * self.f0 + 2.0 * u * (self.f1 - self.f0)))
                / (self.f0 - self.f1)
        } else if self.f0 != 0.0 {
            u / self.f0
        } else {
            0.5
        };
        Self::solve(t0, u, |t| self.integral(t), |t| self.eval(t))
    }
}

/// Returns the offset of the first of four spline nodes influencing `x` and
/// their weights, or `None` when `x` is outside the node range. The offset is
/// -1 when `x` lies in the first segment; the weight of that node is zero.
///
/// * `nodes` - Monotonically increasing node positions.
/// * `x`     - Position to interpolate at.
pub fn catmull_rom_weights(nodes: &[Float], x: Float) -> Option<(isize, [Float; 4])> {
    let size = nodes.len();
    if size < 2 || !(x >= nodes[0] && x <= nodes[size - 1]) {
        return None;
    }

    let idx = find_interval(size, |i| nodes[i] <= x);
    let (x0, x1) = (nodes[idx], nodes[idx + 1]);
    let t = (x - x0) / (x1 - x0);
    let (t2, t3) = (t * t, t * t * t);

    let mut w = [0.0; 4];
    w[1] = 2.0 * t3 - 3.0 * t2 + 1.0;
    w[2] = -2.0 * t3 + 3.0 * t2;

    if idx > 0 {
        let w0 = (t3 - 2.0 * t2 + t) * (x1 - x0) / (x1 - nodes[idx - 1]);
        w[0] = -w0;
        w[2] += w0;
    } else {
        let w0 = t3 - 2.0 * t2 + t;
        w[1] -= w0;
        w[2] += w0;
    }

    if idx + 2 < size {
        let w3 = (t3 - t2) * (x1 - x0) / (nodes[idx + 2] - x0);
        w[1] -= w3;
        w[3] = w3;
    } else {
        let w3 = t3 - t2;
        w[1] -= w3;
        w[2] += w3;
    }

    Some((idx as isize - 1, w))
}

/// Integrates a spline through `values` and returns the running integral at
/// each node together with the total.
///
/// * `x`      - Node positions.
/// * `values` - Function values at the nodes.
pub fn integrate_catmull_rom(x: &[Float], values: &[Float]) -> (Vec<Float>, Float) {
    let n = x.len();
    let mut cdf = Vec::with_capacity(n);
    let mut sum = 0.0;
    cdf.push(0.0);
    for i in 0..n.saturating_sub(1) {
        let seg = Segment::new(x, |j| values[j], i);
        sum += (x[i + 1] - x[i]) * seg.integral(1.0);
        cdf.push(sum);
    }
    (cdf, sum)
}

/// Finds `x` such that the spline through monotonically increasing `values`
/// equals `u`. Values outside the range clamp to the end nodes.
///
/// * `x`      - Node positions.
/// * `values` - Monotonic function values at the nodes.
/// * `u`      - Target value.
pub fn invert_catmull_rom(x: &[Float], values: &[Float], u: Float) -> Float {
    let n = x.len();
    if u <= values[0] {
        return x[0];
    } else if u >= values[n - 1] {
        return x[n - 1];
    }

    let i = find_interval(n, |j| values[j] <= u);
    let seg = Segment::new(x, |j| values[j], i);
    let t = Segment::solve(0.5, u, |t| seg.eval(t), |t| {
        let Segment { f0, f1, d0, d1 } = seg;
        d0 + t * (2.0 * (-2.0 * d0 - d1 + 3.0 * (f1 - f0)) + t * 3.0 * (d0 + d1 + 2.0 * (f0 - f1)))
    });
    x[i] + t * (x[i + 1] - x[i])
}

/// Samples the second dimension of a 2D spline table after interpolating it
/// along the first dimension at `alpha`. Returns the sampled position, the
/// interpolated function value there and the PDF.
///
/// * `nodes1` - Node positions along the first dimension.
/// * `nodes2` - Node positions along the second (sampled) dimension.
/// * `values` - Row-major table of function values.
/// * `cdf`    - Row-major table of running integrals of each row.
/// * `alpha`  - Position along the first dimension.
/// * `u`      - Uniform sample.
pub fn sample_catmull_rom_2d(
    nodes1: &[Float],
    nodes2: &[Float],
    values: &[Float],
    cdf: &[Float],
    alpha: Float,
    u: Float,
) -> Option<(Float, Float, Float)> {
    let size2 = nodes2.len();
    let (offset, weights) = catmull_rom_weights(nodes1, alpha)?;

    let interpolate = |array: &[Float], idx: usize| -> Float {
        weights
            .iter()
            .enumerate()
            .filter(|(_, &w)| w != 0.0)
            .map(|(i, &w)| array[(offset + i as isize) as usize * size2 + idx] * w)
            .sum()
    };

    let maximum = interpolate(cdf, size2 - 1);
    if maximum <= 0.0 {
        return None;
    }
    let u = u * maximum;
    let idx = find_interval(size2, |i| interpolate(cdf, i) <= u);

    let seg = Segment::new(nodes2, |j| interpolate(values, j), idx);
    let width = nodes2[idx + 1] - nodes2[idx];
    let u = (u - interpolate(cdf, idx)) / width;
    let t = seg.sample(u);

    let fval = seg.eval(t);
    Some((nodes2[idx] + width * t, fval, fval / maximum))
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn weights_reproduce_linear_function() {
        let nodes = [0.0, 1.0, 2.0, 3.0, 4.0];
        let values: Vec<Float> = nodes.iter().map(|x| 2.0 * x + 1.0).collect();
        for &x in &[0.25, 1.5, 2.75, 3.9] {
            let (offset, w) = catmull_rom_weights(&nodes, x).unwrap();
            let v: Float = (0..4)
                .filter(|&i| w[i] != 0.0)
                .map(|i| values[(offset + i as isize) as usize] * w[i])
                .sum();
            assert!(approx_eq!(Float, v, 2.0 * x + 1.0, epsilon = 1e-4));
        }
        assert!(catmull_rom_weights(&nodes, 4.5).is_none());
    }

    #[test]
    fn integral_of_constant() {
        let x = [0.0, 0.5, 1.0, 2.0];
        let (cdf, total) = integrate_catmull_rom(&x, &[3.0; 4]);
        assert!(approx_eq!(Float, total, 6.0, epsilon = 1e-5));
        assert!(approx_eq!(Float, cdf[2], 3.0, epsilon = 1e-5));
    }

    #[test]
    fn inversion_of_monotonic_values() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let values = [0.0, 1.0, 2.0, 3.0];
        assert!(approx_eq!(Float, invert_catmull_rom(&x, &values, 1.7), 1.7, epsilon = 1e-4));
        assert_eq!(invert_catmull_rom(&x, &values, -1.0), 0.0);
        assert_eq!(invert_catmull_rom(&x, &values, 9.0), 3.0);
    }

    #[test]
    fn sampling_constant_rows_is_uniform() {
        let nodes1 = [0.0, 1.0];
        let nodes2 = [0.0, 1.0, 2.0];
        let values = [1.0; 6];
        let mut cdf = vec![];
        for _ in 0..2 {
            cdf.extend(integrate_catmull_rom(&nodes2, &[1.0; 3]).0);
        }
        let (x, fval, pdf) = sample_catmull_rom_2d(&nodes1, &nodes2, &values, &cdf, 0.5, 0.25).unwrap();
        assert!(approx_eq!(Float, x, 0.5, epsilon = 1e-4));
        assert!(approx_eq!(Float, fval, 1.0, epsilon = 1e-5));
        assert!(approx_eq!(Float, pdf, 0.5, epsilon = 1e-5));
    }
}
