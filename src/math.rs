use num_traits::{Float, FromPrimitive};

/// Centered moving average. Samples closer than half a window to either
/// boundary shrink the window symmetrically instead of padding, so the
/// filter stays phase-neutral at the edges.
pub fn moving_average<F: Float + FromPrimitive>(series: &[F], window: usize) -> Vec<F> {
    let n = series.len();

    if window <= 1 || n < 2 {
        return series.to_vec();
    }

    let half = window / 2;

    (0..n)
        .map(|i| {
            let r = half.min(i).min(n - 1 - i);
            let lo = i - r;
            let hi = i + r;

            let sum = series[lo..=hi]
                .iter()
                .fold(F::zero(), |acc, &v| acc + v);

            sum / F::from_usize(hi - lo + 1).unwrap()
        })
        .collect()
}

/// Population variance.
pub fn variance<F: Float + FromPrimitive>(series: &[F]) -> F {
    if series.is_empty() {
        return F::zero();
    }

    let n = F::from_usize(series.len()).unwrap();
    let mean = series.iter().fold(F::zero(), |acc, &v| acc + v) / n;

    series
        .iter()
        .fold(F::zero(), |acc, &v| acc + (v - mean) * (v - mean))
        / n
}

/// Natural cubic spline through `(x, y)` knots with strictly increasing `x`.
/// Evaluation clamps to the knot span, so queries outside the observed range
/// return the boundary value instead of extrapolating.
#[derive(Debug, Clone)]
pub struct CubicSpline<F: Float + FromPrimitive> {
    xs: Vec<F>,
    ys: Vec<F>,
    // second derivative at each knot, zero at both ends
    m: Vec<F>,
}

impl<F: Float + FromPrimitive> CubicSpline<F> {
    pub fn fit(xs: &[F], ys: &[F]) -> Option<Self> {
        let n = xs.len();

        if n < 3 || ys.len() != n {
            return None;
        }

        let mut h = Vec::with_capacity(n - 1);
        for i in 0..n - 1 {
            let step = xs[i + 1] - xs[i];
            if step <= F::zero() {
                return None;
            }
            h.push(step);
        }

        // Thomas sweep over the tridiagonal system for the interior knots.
        let six = F::from_f64(6.0).unwrap();
        let two = F::from_f64(2.0).unwrap();

        let mut cp = vec![F::zero(); n];
        let mut dp = vec![F::zero(); n];

        for i in 1..n - 1 {
            let a = h[i - 1];
            let b = two * (h[i - 1] + h[i]);
            let c = h[i];
            let d = six * ((ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1]);

            let denom = b - a * cp[i - 1];
            cp[i] = c / denom;
            dp[i] = (d - a * dp[i - 1]) / denom;
        }

        let mut m = vec![F::zero(); n];
        for i in (1..n - 1).rev() {
            m[i] = dp[i] - cp[i] * m[i + 1];
        }

        Some(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            m,
        })
    }

    pub fn eval(&self, x: F) -> F {
        let n = self.xs.len();
        let x = x.max(self.xs[0]).min(self.xs[n - 1]);

        let mut i = match self
            .xs
            .binary_search_by(|probe| probe.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Less))
        {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };
        if i >= n - 1 {
            i = n - 2;
        }

        let six = F::from_f64(6.0).unwrap();
        let h = self.xs[i + 1] - self.xs[i];
        let a = (self.xs[i + 1] - x) / h;
        let b = (x - self.xs[i]) / h;

        a * self.ys[i]
            + b * self.ys[i + 1]
            + ((a * a * a - a) * self.m[i] + (b * b * b - b) * self.m[i + 1]) * h * h / six
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn moving_average_constant_series() {
        let series = vec![3.0f32; 8];
        assert_eq!(moving_average(&series, 5), series);
    }

    #[test]
    fn moving_average_shrinks_at_edges() {
        let series = [0.0f32, 1.0, 2.0, 3.0, 4.0];
        let out = moving_average(&series, 3);

        // edges use a window of one, interior the full three
        assert_eq!(out, vec![0.0, 1.0, 2.0, 3.0, 4.0]);

        let bumpy = [0.0f32, 3.0, 0.0, 3.0, 0.0];
        let out = moving_average(&bumpy, 3);
        assert_eq!(out[0], 0.0);
        assert_eq!(out[4], 0.0);
        assert_relative_eq!(out[2], 2.0);
    }

    #[test]
    fn variance_of_constant_is_zero() {
        assert_eq!(variance(&[7.0f32; 169]), 0.0);
    }

    #[test]
    fn variance_basic() {
        assert_relative_eq!(variance(&[1.0f32, 3.0]), 1.0);
    }

    #[test]
    fn spline_passes_through_knots() {
        let xs = [0.0f64, 1.0, 3.0, 4.0, 6.0];
        let ys = [1.0f64, -1.0, 2.0, 0.0, 5.0];
        let spline = CubicSpline::fit(&xs, &ys).unwrap();

        for (&x, &y) in xs.iter().zip(ys.iter()) {
            assert_relative_eq!(spline.eval(x), y, epsilon = 1e-9);
        }
    }

    #[test]
    fn spline_reproduces_linear_data() {
        let xs: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x + 1.0).collect();
        let spline = CubicSpline::fit(&xs, &ys).unwrap();

        assert_relative_eq!(spline.eval(4.5), 10.0, epsilon = 1e-9);
        assert_relative_eq!(spline.eval(0.25), 1.5, epsilon = 1e-9);
    }

    #[test]
    fn spline_clamps_outside_span() {
        let xs = [2.0f32, 3.0, 5.0, 7.0];
        let ys = [1.0f32, 4.0, 2.0, 8.0];
        let spline = CubicSpline::fit(&xs, &ys).unwrap();

        assert_eq!(spline.eval(0.0), 1.0);
        assert_eq!(spline.eval(100.0), 8.0);
    }

    #[test]
    fn spline_rejects_degenerate_knots() {
        assert!(CubicSpline::fit(&[0.0f32, 0.0, 1.0], &[1.0, 2.0, 3.0]).is_none());
        assert!(CubicSpline::fit(&[0.0f32, 1.0], &[1.0, 2.0]).is_none());
    }
}
