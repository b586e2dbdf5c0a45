//! Robust statistics over small samples.
//!
//! Wound histories are short (often 3-6 points), so dispersion is measured
//! with the median absolute deviation rather than the standard deviation.

use itertools::Itertools;

/// Scale of the normal-consistent modified z-score
pub const MODIFIED_Z_SCALE: f64 = 0.6745;

/// Factor turning a mean absolute deviation into a MAD-comparable value
pub const MEAN_AD_SCALE: f64 = 1.253_314;

/// Arithmetic mean, `None` for an empty slice
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Median, `None` for an empty slice
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sorted = values.iter().copied().sorted_by(f64::total_cmp).collect_vec();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Median absolute deviation around the median
#[must_use]
pub fn median_absolute_deviation(values: &[f64]) -> Option<f64> {
    let center = median(values)?;
    let deviations = values.iter().map(|v| (v - center).abs()).collect_vec();
    median(&deviations)
}

/// Population standard deviation
#[must_use]
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Indices of values whose modified z-score exceeds `threshold`.
///
/// Fewer than three values never produce outliers. When the MAD is zero the
/// scaled mean absolute deviation is used; when that is zero too every value
/// equals the median and nothing is flagged.
#[must_use]
pub fn modified_z_outliers(values: &[f64], threshold: f64) -> Vec<usize> {
    if values.len() < 3 {
        return Vec::new();
    }
    let Some(center) = median(values) else {
        return Vec::new();
    };
    let mad = median_absolute_deviation(values).unwrap_or(0.0);
    let spread = if mad > f64::EPSILON {
        mad
    } else {
        let mean_ad =
            values.iter().map(|v| (v - center).abs()).sum::<f64>() / values.len() as f64;
        mean_ad * MEAN_AD_SCALE
    };
    if spread <= f64::EPSILON {
        return Vec::new();
    }

    values
        .iter()
        .enumerate()
        .filter(|(_, v)| (MODIFIED_Z_SCALE * (*v - center) / spread).abs() > threshold)
        .map(|(i, _)| i)
        .collect()
}

/// Least-squares line through `(x, y)` points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    /// Slope (y units per x unit)
    pub slope: f64,
    /// Intercept
    pub intercept: f64,
    /// Coefficient of determination (0-1)
    pub r_squared: f64,
}

/// Fit a least-squares line, `None` with fewer than two distinct x values
#[must_use]
pub fn linear_fit(points: &[(f64, f64)]) -> Option<LinearFit> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;
    let sxx: f64 = points.iter().map(|p| (p.0 - mean_x).powi(2)).sum();
    if sxx <= f64::EPSILON {
        return None;
    }
    let sxy: f64 = points.iter().map(|p| (p.0 - mean_x) * (p.1 - mean_y)).sum();
    let syy: f64 = points.iter().map(|p| (p.1 - mean_y).powi(2)).sum();
    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    // A flat series is perfectly explained by a flat line
    let r_squared = if syy <= f64::EPSILON {
        1.0
    } else {
        ((sxy * sxy) / (sxx * syy)).clamp(0.0, 1.0)
    };
    Some(LinearFit {
        slope,
        intercept,
        r_squared,
    })
}
