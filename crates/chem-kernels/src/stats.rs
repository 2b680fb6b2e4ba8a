//! Statistics toolbox for the trend and distribution figures.

use nalgebra::{DMatrix, DVector};

use crate::error::{KernelError, Result};

/// An ordinary least-squares line fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation coefficient.
    pub r: f64,
}

/// Least-squares line through the finite (x, y) pairs.
///
/// Pairs with a NaN on either side are ignored. Returns None with fewer
/// than two usable pairs or a degenerate x spread.
pub fn linear_regression(x: &[f64], y: &[f64]) -> Option<LinearFit> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(a, b)| (*a, *b))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for (px, py) in &pairs {
        let dx = px - mean_x;
        let dy = py - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    if sxx == 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let r = if syy == 0.0 {
        0.0
    } else {
        sxy / (sxx * syy).sqrt()
    };

    Some(LinearFit {
        slope,
        intercept,
        r,
    })
}

/// Least-squares polynomial fit of the given degree.
///
/// Returns coefficients lowest order first (c0 + c1·x + c2·x² + …).
pub fn polyfit(x: &[f64], y: &[f64], degree: usize) -> Result<Vec<f64>> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(a, b)| (*a, *b))
        .collect();
    if pairs.len() <= degree {
        return Err(KernelError::InsufficientData(format!(
            "{} points for a degree-{} fit",
            pairs.len(),
            degree
        )));
    }

    let rows = pairs.len();
    let cols = degree + 1;
    let design = DMatrix::from_fn(rows, cols, |i, j| pairs[i].0.powi(j as i32));
    let rhs = DVector::from_fn(rows, |i, _| pairs[i].1);

    let svd = design.svd(true, true);
    let solution = svd
        .solve(&rhs, 1e-12)
        .map_err(|e| KernelError::FitFailed(e.to_string()))?;

    Ok(solution.iter().copied().collect())
}

/// Evaluate a polynomial with coefficients lowest order first.
pub fn polyval(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Two-sided 95% Student-t critical value (quantile at 0.975).
pub fn student_t_975(dof: usize) -> f64 {
    const TABLE: [f64; 30] = [
        12.706, 4.303, 3.182, 2.776, 2.571, 2.447, 2.365, 2.306, 2.262, 2.228, 2.201, 2.179,
        2.160, 2.145, 2.131, 2.120, 2.110, 2.101, 2.093, 2.086, 2.080, 2.074, 2.069, 2.064,
        2.060, 2.056, 2.052, 2.048, 2.045, 2.042,
    ];
    match dof {
        0 => f64::NAN,
        1..=30 => TABLE[dof - 1],
        // Interpolate in 1/dof toward the normal quantile
        31..=120 => {
            let t30 = TABLE[29];
            let z = 1.960;
            let w = (1.0 / dof as f64 - 1.0 / 120.0) / (1.0 / 30.0 - 1.0 / 120.0);
            z + w * (t30 - z)
        }
        _ => 1.960,
    }
}

/// A natural cubic interpolating spline.
#[derive(Debug, Clone)]
pub struct Spline {
    x: Vec<f64>,
    y: Vec<f64>,
    /// Second derivatives at the knots.
    m: Vec<f64>,
}

/// Build a natural cubic spline through strictly increasing knots.
pub fn cubic_spline_interp(x: &[f64], y: &[f64]) -> Result<Spline> {
    if x.len() != y.len() {
        return Err(KernelError::ShapeMismatch(format!(
            "{} x values vs {} y values",
            x.len(),
            y.len()
        )));
    }
    if x.len() < 3 {
        return Err(KernelError::InsufficientData(
            "spline needs at least 3 knots".to_string(),
        ));
    }
    if x.windows(2).any(|w| w[1] <= w[0]) {
        return Err(KernelError::ShapeMismatch(
            "spline knots must be strictly increasing".to_string(),
        ));
    }

    // Tridiagonal solve for the second derivatives (natural end conditions)
    let n = x.len();
    let mut a = vec![0.0; n];
    let mut b = vec![0.0; n];
    let mut c = vec![0.0; n];
    let mut d = vec![0.0; n];
    b[0] = 1.0;
    b[n - 1] = 1.0;
    for i in 1..n - 1 {
        let h0 = x[i] - x[i - 1];
        let h1 = x[i + 1] - x[i];
        a[i] = h0;
        b[i] = 2.0 * (h0 + h1);
        c[i] = h1;
        d[i] = 6.0 * ((y[i + 1] - y[i]) / h1 - (y[i] - y[i - 1]) / h0);
    }

    // Thomas algorithm
    let mut m = vec![0.0; n];
    let mut cp = vec![0.0; n];
    let mut dp = vec![0.0; n];
    cp[0] = c[0] / b[0];
    dp[0] = d[0] / b[0];
    for i in 1..n {
        let denom = b[i] - a[i] * cp[i - 1];
        cp[i] = c[i] / denom;
        dp[i] = (d[i] - a[i] * dp[i - 1]) / denom;
    }
    m[n - 1] = dp[n - 1];
    for i in (0..n - 1).rev() {
        m[i] = dp[i] - cp[i] * m[i + 1];
    }

    Ok(Spline {
        x: x.to_vec(),
        y: y.to_vec(),
        m,
    })
}

impl Spline {
    /// Evaluate the spline; arguments outside the knot range clamp to the
    /// end segments.
    pub fn eval(&self, t: f64) -> f64 {
        let n = self.x.len();
        let seg = match self.x.binary_search_by(|v| v.total_cmp(&t)) {
            Ok(i) => i.min(n - 2),
            Err(0) => 0,
            Err(i) if i >= n => n - 2,
            Err(i) => i - 1,
        };

        let h = self.x[seg + 1] - self.x[seg];
        let u = t - self.x[seg];
        let v = self.x[seg + 1] - t;

        (self.m[seg] * v.powi(3) + self.m[seg + 1] * u.powi(3)) / (6.0 * h)
            + (self.y[seg] / h - self.m[seg] * h / 6.0) * v
            + (self.y[seg + 1] / h - self.m[seg + 1] * h / 6.0) * u
    }
}

/// Histogram counts over the given bin edges.
///
/// Bins are half-open except the last, which includes its right edge.
pub fn histogram_counts(values: &[f64], edges: &[f64]) -> Vec<usize> {
    let nbins = edges.len().saturating_sub(1);
    let mut counts = vec![0usize; nbins];
    if nbins == 0 {
        return counts;
    }

    for &v in values {
        if v.is_nan() || v < edges[0] || v > edges[nbins] {
            continue;
        }
        let mut bin = nbins - 1;
        for i in 0..nbins {
            if v < edges[i + 1] {
                bin = i;
                break;
            }
        }
        counts[bin] += 1;
    }
    counts
}

/// Wind-rose frequency table.
///
/// Returns percent frequencies indexed `[sector][speed_bin]`. Sectors are
/// centered on north and proceed clockwise; `speed_bounds` are lower bounds
/// with the last bin open-ended.
pub fn wind_sector_frequencies(
    directions: &[f64],
    speeds: &[f64],
    n_sectors: usize,
    speed_bounds: &[f64],
) -> Vec<Vec<f64>> {
    let mut table = vec![vec![0.0f64; speed_bounds.len()]; n_sectors];
    if n_sectors == 0 || speed_bounds.is_empty() {
        return table;
    }

    let sector_width = 360.0 / n_sectors as f64;
    let mut total = 0usize;

    for (&dir, &speed) in directions.iter().zip(speeds) {
        if dir.is_nan() || speed.is_nan() {
            continue;
        }
        let sector =
            ((dir.rem_euclid(360.0) / sector_width).round() as usize).rem_euclid(n_sectors);
        let mut bin = 0usize;
        for (i, &bound) in speed_bounds.iter().enumerate() {
            if speed >= bound {
                bin = i;
            }
        }
        table[sector][bin] += 1.0;
        total += 1;
    }

    if total > 0 {
        for row in &mut table {
            for cell in row {
                *cell *= 100.0 / total as f64;
            }
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_regression_exact_line() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 3.0, 5.0, 7.0];
        let fit = linear_regression(&x, &y).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!((fit.r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_linear_regression_skips_nan() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, f64::NAN, 5.0, 7.0];
        let fit = linear_regression(&x, &y).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_linear_regression_degenerate() {
        assert!(linear_regression(&[1.0], &[2.0]).is_none());
        assert!(linear_regression(&[1.0, 1.0], &[2.0, 3.0]).is_none());
    }

    #[test]
    fn test_polyfit_recovers_cubic() {
        let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|&v| 1.0 - 2.0 * v + 0.5 * v.powi(3)).collect();
        let coeffs = polyfit(&x, &y, 3).unwrap();

        assert!((coeffs[0] - 1.0).abs() < 1e-6);
        assert!((coeffs[1] + 2.0).abs() < 1e-6);
        assert!(coeffs[2].abs() < 1e-6);
        assert!((coeffs[3] - 0.5).abs() < 1e-6);

        let at_two = polyval(&coeffs, 2.0);
        assert!((at_two - (1.0 - 4.0 + 4.0)).abs() < 1e-6);
    }

    #[test]
    fn test_polyfit_needs_enough_points() {
        assert!(polyfit(&[0.0, 1.0], &[1.0, 2.0], 3).is_err());
    }

    #[test]
    fn test_student_t_quantiles() {
        assert!((student_t_975(1) - 12.706).abs() < 1e-9);
        assert!((student_t_975(10) - 2.228).abs() < 1e-9);
        assert!((student_t_975(1000) - 1.96).abs() < 1e-9);
        // Between the table end and the asymptote
        let t60 = student_t_975(60);
        assert!(t60 > 1.96 && t60 < 2.042);
    }

    #[test]
    fn test_spline_interpolates_knots() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.0, 1.0, 0.0, 1.0];
        let spline = cubic_spline_interp(&x, &y).unwrap();

        for (xi, yi) in x.iter().zip(&y) {
            assert!((spline.eval(*xi) - yi).abs() < 1e-9);
        }
        // Smooth in between, bounded by the oscillation
        let mid = spline.eval(0.5);
        assert!(mid > 0.0 && mid < 1.2);
    }

    #[test]
    fn test_histogram_edges() {
        let values = [0.5, 1.0, 1.5, 3.0, 8.0, -1.0];
        let edges = [0.0, 1.0, 2.0, 3.0];
        let counts = histogram_counts(&values, &edges);
        // 0.5 → [0,1); 1.0 and 1.5 → [1,2); 3.0 → last bin (right edge
        // included); 8.0 and -1.0 fall outside
        assert_eq!(counts, vec![1, 2, 1]);
    }

    #[test]
    fn test_wind_sectors_normalize() {
        let directions = [0.0, 0.0, 90.0, 180.0];
        let speeds = [0.5, 1.5, 2.5, 3.5];
        let table = wind_sector_frequencies(&directions, &speeds, 16, &[0.0, 1.0, 2.0, 3.0]);

        let total: f64 = table.iter().flatten().sum();
        assert!((total - 100.0).abs() < 1e-9);
        // North sector holds half the observations
        let north: f64 = table[0].iter().sum();
        assert!((north - 50.0).abs() < 1e-9);
        // Open-ended top bin catches the 3.5 m/s observation
        assert!((table[8][3] - 25.0).abs() < 1e-9);
    }
}
