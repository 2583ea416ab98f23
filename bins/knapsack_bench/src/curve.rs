//! Parametric cubic smoothing of timing series.
//!
//! X values and timings are each interpolated against the sample index with a
//! not-a-knot cubic spline, then both splines are sampled on a dense uniform
//! grid of the index to produce a smooth `(x, y)` path.

use shared::{AppError, AppResult};

/// Points sampled along each smoothed curve.
pub const SMOOTHING_SAMPLES: usize = 500;

/// Interpolating cubic spline with not-a-knot end conditions.
///
/// With fewer than four knots it degrades to the interpolating polynomial of
/// matching degree (constant, line, parabola).
#[derive(Debug, Clone)]
pub struct CubicSpline {
    knots: Vec<f64>,
    values: Vec<f64>,
    second_derivatives: Vec<f64>,
}

impl CubicSpline {
    pub fn new(knots: &[f64], values: &[f64]) -> AppResult<Self> {
        if knots.is_empty() || knots.len() != values.len() {
            return Err(AppError::InvalidParameter(format!(
                "spline needs matching non-empty knots and values (got {} and {})",
                knots.len(),
                values.len()
            )));
        }
        if knots.iter().chain(values).any(|v| !v.is_finite()) {
            return Err(AppError::InvalidParameter("spline input must be finite".into()));
        }
        if knots.windows(2).any(|pair| pair[1] <= pair[0]) {
            return Err(AppError::InvalidParameter(
                "spline knots must be strictly increasing".into(),
            ));
        }

        let second_derivatives = if knots.len() < 3 {
            vec![0.0; knots.len()]
        } else {
            not_a_knot_second_derivatives(knots, values)?
        };

        Ok(Self {
            knots: knots.to_vec(),
            values: values.to_vec(),
            second_derivatives,
        })
    }

    pub fn evaluate(&self, t: f64) -> f64 {
        let n = self.knots.len();
        if n == 1 {
            return self.values[0];
        }

        // Outside the knots the end segments are extended.
        let i = self
            .knots
            .partition_point(|&knot| knot <= t)
            .saturating_sub(1)
            .min(n - 2);
        let (k0, k1) = (self.knots[i], self.knots[i + 1]);
        let (y0, y1) = (self.values[i], self.values[i + 1]);
        let (m0, m1) = (self.second_derivatives[i], self.second_derivatives[i + 1]);
        let h = k1 - k0;
        let a = k1 - t;
        let b = t - k0;

        m0 * a.powi(3) / (6.0 * h)
            + m1 * b.powi(3) / (6.0 * h)
            + (y0 / h - m0 * h / 6.0) * a
            + (y1 / h - m1 * h / 6.0) * b
    }
}

fn not_a_knot_second_derivatives(knots: &[f64], values: &[f64]) -> AppResult<Vec<f64>> {
    let n = knots.len();
    let h: Vec<f64> = knots.windows(2).map(|pair| pair[1] - pair[0]).collect();
    let mut matrix = vec![vec![0.0; n]; n];
    let mut rhs = vec![0.0; n];

    for i in 1..n - 1 {
        matrix[i][i - 1] = h[i - 1];
        matrix[i][i] = 2.0 * (h[i - 1] + h[i]);
        matrix[i][i + 1] = h[i];
        rhs[i] = 6.0
            * ((values[i + 1] - values[i]) / h[i] - (values[i] - values[i - 1]) / h[i - 1]);
    }

    if n == 3 {
        // Single parabola: constant second derivative.
        matrix[0][0] = 1.0;
        matrix[0][1] = -1.0;
        matrix[2][1] = -1.0;
        matrix[2][2] = 1.0;
    } else {
        // Third derivative continuous across the second and penultimate knots.
        matrix[0][0] = h[1];
        matrix[0][1] = -(h[0] + h[1]);
        matrix[0][2] = h[0];
        matrix[n - 1][n - 3] = h[n - 2];
        matrix[n - 1][n - 2] = -(h[n - 3] + h[n - 2]);
        matrix[n - 1][n - 1] = h[n - 3];
    }

    solve_dense(matrix, rhs)
}

/// Gaussian elimination with partial pivoting.
fn solve_dense(mut matrix: Vec<Vec<f64>>, mut rhs: Vec<f64>) -> AppResult<Vec<f64>> {
    let n = rhs.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&a, &b| matrix[a][col].abs().total_cmp(&matrix[b][col].abs()))
            .unwrap_or(col);
        if matrix[pivot][col].abs() < f64::EPSILON {
            return Err(AppError::InvalidParameter(
                "spline system is singular".into(),
            ));
        }
        matrix.swap(col, pivot);
        rhs.swap(col, pivot);

        for row in col + 1..n {
            let factor = matrix[row][col] / matrix[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                matrix[row][k] -= factor * matrix[col][k];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut solution = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| matrix[row][k] * solution[k]).sum();
        solution[row] = (rhs[row] - tail) / matrix[row][row];
    }
    Ok(solution)
}

/// `count` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count).map(|j| start + step * j as f64).collect()
        }
    }
}

/// Smooth `(x, y)` by parametric cubic interpolation over the sample index.
pub fn smooth_curve(x: &[f64], y: &[f64], samples: usize) -> AppResult<Vec<(f64, f64)>> {
    if x.len() != y.len() {
        return Err(AppError::InvalidParameter(format!(
            "curve has {} x values but {} y values",
            x.len(),
            y.len()
        )));
    }
    if x.is_empty() || samples == 0 {
        return Err(AppError::InvalidParameter(
            "curve needs at least one point and one sample".into(),
        ));
    }

    let index: Vec<f64> = (0..x.len()).map(|i| i as f64).collect();
    let x_spline = CubicSpline::new(&index, x)?;
    let y_spline = CubicSpline::new(&index, y)?;

    Ok(linspace(0.0, (x.len() - 1) as f64, samples)
        .into_iter()
        .map(|t| (x_spline.evaluate(t), y_spline.evaluate(t)))
        .collect())
}

/// Share of consecutive points whose X does not decrease beyond `tolerance`.
pub fn non_decreasing_fraction(points: &[(f64, f64)], tolerance: f64) -> f64 {
    if points.len() < 2 {
        return 1.0;
    }
    let steady = points
        .windows(2)
        .filter(|pair| pair[1].0 >= pair[0].0 - tolerance)
        .count();
    steady as f64 / (points.len() - 1) as f64
}
