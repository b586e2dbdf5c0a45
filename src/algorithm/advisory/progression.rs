//! Depth and volume progression statistics
//!
//! Everything here is descriptive: trends, changes and confirmation counts.
//! Tier assignment and gating happen in the parent module.

use itertools::Itertools;
use serde::Serialize;

use crate::config::AdvisoryThresholds;
use crate::models::measurement::Measurement;
use crate::utils::stats::linear_fit;

const DAYS_PER_WEEK: f64 = 7.0;

/// Consecutive confirming intervals of a depth increase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfirmationResult {
    /// Confirming intervals ending at the latest reading
    pub consecutive: usize,
    /// Longest confirming run in the window
    pub max_consecutive: usize,
    /// Intervals evaluated
    pub intervals_evaluated: usize,
    /// Intervals in which depth decreased
    pub trend_breaks: usize,
}

/// Largest depth jump between two adjacent readings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcuteChange {
    /// Earlier reading
    pub from_measurement_id: String,
    /// Later reading
    pub to_measurement_id: String,
    /// Raw depth increase in mm
    pub change_mm: f64,
    /// Days between the readings
    pub interval_days: f64,
}

/// Depth trend of a history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepthProgression {
    /// Depth readings in the analysis window
    pub depth_points: usize,
    /// Fitted depth change per week in mm
    pub weekly_rate_mm: Option<f64>,
    /// Goodness of fit of the depth trend
    pub r_squared: Option<f64>,
    /// Trend confidence: R² scaled by sample size
    pub confidence: f64,
    /// Depth change over the absolute-change window in mm
    pub absolute_change_mm: Option<f64>,
    /// Largest short-interval jump, if any
    pub acute_change: Option<AcuteChange>,
    /// Confirmations at the minor rate threshold
    pub confirmations: ConfirmationResult,
}

/// Volume trend of a history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeProgression {
    /// Episode identifier
    pub episode_id: String,
    /// Volume readings in the analysis window
    pub volume_points: usize,
    /// Earliest volume in the window (cm³)
    pub baseline_volume_cm3: Option<f64>,
    /// Latest volume (cm³)
    pub latest_volume_cm3: Option<f64>,
    /// Percent change from baseline to latest
    pub percent_change: Option<f64>,
    /// Trend confidence: R² scaled by sample size
    pub confidence: f64,
    /// Adjacent volume increases ending at the latest reading
    pub consecutive_increases: usize,
}

/// Confidence of a trend: `R² × min(1, n/4)`
#[must_use]
pub fn trend_confidence(r_squared: f64, points: usize) -> f64 {
    r_squared * (points as f64 / 4.0).min(1.0)
}

/// Readings within `window_days` of the latest reading
fn window<'a>(measurements: &[&'a Measurement], window_days: f64) -> Vec<&'a Measurement> {
    match measurements.last() {
        Some(latest) => measurements
            .iter()
            .copied()
            .filter(|m| m.days_until(latest) <= window_days)
            .collect(),
        None => Vec::new(),
    }
}

/// Count consecutive intervals whose depth increase reaches `weekly_rate_threshold`.
///
/// Only readings with depth within `window_days` of the latest one are used.
/// The count resets when depth decreases or an interval stays below the
/// threshold. Zero-length intervals are skipped.
#[must_use]
pub fn detect_consecutive_confirmations(
    measurements: &[Measurement],
    weekly_rate_threshold: f64,
    window_days: f64,
) -> ConfirmationResult {
    let with_depth = measurements.iter().filter(|m| m.depth_mm.is_some()).collect_vec();
    let readings = window(&with_depth, window_days);

    let mut result = ConfirmationResult::default();
    let mut run = 0;
    for (a, b) in readings.iter().tuple_windows() {
        let (Some(da), Some(db)) = (a.depth_mm, b.depth_mm) else {
            continue;
        };
        let days = a.days_until(b);
        if days <= 0.0 {
            continue;
        }
        result.intervals_evaluated += 1;
        if db < da {
            result.trend_breaks += 1;
            run = 0;
        } else if (db - da) / days * DAYS_PER_WEEK >= weekly_rate_threshold {
            run += 1;
            result.max_consecutive = result.max_consecutive.max(run);
        } else {
            run = 0;
        }
    }
    result.consecutive = run;
    result
}

/// Analyze the depth trend of a history
#[must_use]
pub fn analyze_depth_progression(
    measurements: &[Measurement],
    thresholds: &AdvisoryThresholds,
) -> DepthProgression {
    let with_depth = measurements.iter().filter(|m| m.depth_mm.is_some()).collect_vec();
    let readings = window(&with_depth, thresholds.volume_window_days);

    let fit = readings.first().and_then(|first| {
        let points = readings
            .iter()
            .filter_map(|m| m.depth_mm.map(|d| (first.days_until(m), d)))
            .collect_vec();
        linear_fit(&points)
    });

    let absolute_change_mm = readings.last().and_then(|latest| {
        let start = window(&readings, thresholds.absolute_window_days);
        let earliest = start.first()?;
        Some(latest.depth_mm? - earliest.depth_mm?)
    });

    let acute_change = with_depth
        .iter()
        .tuple_windows()
        .filter_map(|(a, b)| {
            let interval_days = a.days_until(b);
            let change_mm = b.depth_mm? - a.depth_mm?;
            (interval_days > 0.0
                && interval_days <= thresholds.acute_interval_days
                && change_mm > 0.0)
                .then(|| AcuteChange {
                    from_measurement_id: a.id.clone(),
                    to_measurement_id: b.id.clone(),
                    change_mm,
                    interval_days,
                })
        })
        .max_by(|x, y| x.change_mm.total_cmp(&y.change_mm));

    DepthProgression {
        depth_points: readings.len(),
        weekly_rate_mm: fit.map(|f| f.slope * DAYS_PER_WEEK),
        r_squared: fit.map(|f| f.r_squared),
        confidence: fit.map_or(0.0, |f| trend_confidence(f.r_squared, readings.len())),
        absolute_change_mm,
        acute_change,
        confirmations: detect_consecutive_confirmations(
            measurements,
            thresholds.rate_minor_mm,
            thresholds.volume_window_days,
        ),
    }
}

/// Analyze the volume trend of a history
#[must_use]
pub fn analyze_volume_progression(
    episode_id: &str,
    measurements: &[Measurement],
    thresholds: &AdvisoryThresholds,
) -> VolumeProgression {
    let with_volume = measurements.iter().filter(|m| m.volume_cm3.is_some()).collect_vec();
    let readings = window(&with_volume, thresholds.volume_window_days);

    let baseline_volume_cm3 = readings.first().and_then(|m| m.volume_cm3);
    let latest_volume_cm3 = readings.last().and_then(|m| m.volume_cm3);
    let percent_change = match (baseline_volume_cm3, latest_volume_cm3) {
        (Some(base), Some(latest)) if readings.len() > 1 && base > f64::EPSILON => {
            Some((latest - base) / base * 100.0)
        }
        _ => None,
    };

    let confidence = readings
        .first()
        .and_then(|first| {
            let points = readings
                .iter()
                .filter_map(|m| m.volume_cm3.map(|v| (first.days_until(m), v)))
                .collect_vec();
            linear_fit(&points)
        })
        .map_or(0.0, |f| trend_confidence(f.r_squared, readings.len()));

    let mut consecutive_increases = 0;
    for (a, b) in readings.iter().tuple_windows() {
        match (a.volume_cm3, b.volume_cm3) {
            (Some(va), Some(vb)) if vb > va => consecutive_increases += 1,
            _ => consecutive_increases = 0,
        }
    }

    VolumeProgression {
        episode_id: episode_id.to_string(),
        volume_points: readings.len(),
        baseline_volume_cm3,
        latest_volume_cm3,
        percent_change,
        confidence,
        consecutive_increases,
    }
}
