//! Measurement quality assessment
//!
//! This module scores a measurement history for validation coverage,
//! outliers (robust MAD statistic), temporal gaps and consistency, and
//! decides whether urgent or critical advisory tiers may be drawn from it.

use std::fmt;

use itertools::Itertools;
use serde::Serialize;

use crate::algorithm::normalization::plausible_depth_range_mm;
use crate::config::QualityThresholds;
use crate::models::episode::AnatomicalLocation;
use crate::models::measurement::Measurement;
use crate::utils::stats::{modified_z_outliers, std_dev};

/// Letter grade of an overall quality score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum QualityGrade {
    /// ≥ 0.9
    A,
    /// ≥ 0.8
    B,
    /// ≥ 0.7
    C,
    /// ≥ 0.6
    D,
    /// below 0.6
    F,
}

impl QualityGrade {
    /// Grade for a 0-1 score
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            Self::A
        } else if score >= 0.8 {
            Self::B
        } else if score >= 0.7 {
            Self::C
        } else if score >= 0.6 {
            Self::D
        } else {
            Self::F
        }
    }
}

impl fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Severity of the largest gap between consecutive entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GapSeverity {
    /// No gap above the moderate threshold
    None,
    /// Largest gap above the moderate threshold
    Moderate,
    /// Largest gap above the severe threshold
    Severe,
}

impl GapSeverity {
    const fn score(self) -> f64 {
        match self {
            Self::None => 1.0,
            Self::Moderate => 0.6,
            Self::Severe => 0.2,
        }
    }
}

/// Quality assessment of a measurement history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityAssessment {
    /// Measurements inside the window
    pub measurement_count: usize,
    /// Fraction of entries marked validated
    pub validation_rate: f64,
    /// Fraction of entries flagged as outliers
    pub outlier_rate: f64,
    /// Identifiers of outlying entries
    pub outlier_ids: Vec<String>,
    /// Largest gap between consecutive entries, in days
    pub max_gap_days: f64,
    /// Severity of the largest gap
    pub gap_severity: GapSeverity,
    /// Whether any gap exceeds the moderate threshold
    pub has_temporal_gaps: bool,
    /// Consistency of successive area changes (floor-capped)
    pub consistency: f64,
    /// Weighted overall score (0-1)
    pub overall_score: f64,
    /// Letter grade of the overall score
    pub grade: QualityGrade,
    /// Whether urgent/critical advisory tiers may be issued
    pub allow_high_urgency_alerts: bool,
    /// Data problems found, free of clinical text
    pub flags: Vec<String>,
}

/// Assess the quality of a measurement history.
///
/// Only entries within `window_days` of the latest entry are considered.
/// Entries without depth are left out of depth statistics and reported as a
/// flag; nothing here fails on missing values.
#[must_use]
pub fn assess_measurement_quality(
    measurements: &[Measurement],
    location: AnatomicalLocation,
    window_days: f64,
    thresholds: &QualityThresholds,
) -> QualityAssessment {
    let window: Vec<&Measurement> = match measurements.last() {
        Some(latest) => measurements
            .iter()
            .filter(|m| m.days_until(latest) <= window_days)
            .collect(),
        None => Vec::new(),
    };
    let mut flags = Vec::new();
    let count = window.len();

    if count == 0 {
        flags.push("no measurements in assessment window".to_string());
        return QualityAssessment {
            measurement_count: 0,
            validation_rate: 0.0,
            outlier_rate: 0.0,
            outlier_ids: Vec::new(),
            max_gap_days: 0.0,
            gap_severity: GapSeverity::None,
            has_temporal_gaps: false,
            consistency: thresholds.consistency_floor,
            overall_score: 0.0,
            grade: QualityGrade::F,
            allow_high_urgency_alerts: false,
            flags,
        };
    }

    let validation_rate = window.iter().filter(|m| m.is_validated()).count() as f64 / count as f64;

    // Outliers: MAD on areas and on available depths, plus implausible depths
    let areas = window.iter().map(|m| m.area_cm2).collect_vec();
    let mut outlier_ids: Vec<String> = modified_z_outliers(&areas, thresholds.outlier_z_score)
        .into_iter()
        .map(|i| window[i].id.clone())
        .collect();

    let with_depth = window.iter().filter(|m| m.depth_mm.is_some()).collect_vec();
    let missing_depth = count - with_depth.len();
    if missing_depth > 0 {
        flags.push(format!(
            "{missing_depth} of {count} measurements missing depth; excluded from depth statistics"
        ));
    }
    let depths = with_depth.iter().filter_map(|m| m.depth_mm).collect_vec();
    outlier_ids.extend(
        modified_z_outliers(&depths, thresholds.outlier_z_score)
            .into_iter()
            .map(|i| with_depth[i].id.clone()),
    );
    let (min_mm, max_mm) = plausible_depth_range_mm(location);
    let implausible = with_depth
        .iter()
        .filter(|m| m.depth_mm.is_some_and(|d| d < min_mm || d > max_mm))
        .map(|m| m.id.clone())
        .collect_vec();
    if !implausible.is_empty() {
        flags.push(format!(
            "{} depth values not anatomically plausible",
            implausible.len()
        ));
    }
    outlier_ids.extend(implausible);
    let outlier_ids = outlier_ids.into_iter().unique().collect_vec();
    if count < 3 {
        flags.push("fewer than 3 measurements; statistical outlier detection skipped".to_string());
    }
    let outlier_rate = outlier_ids.len() as f64 / count as f64;

    // Temporal gaps
    let max_gap_days = window
        .iter()
        .tuple_windows()
        .map(|(a, b)| a.days_until(b))
        .fold(0.0_f64, f64::max);
    let gap_severity = if max_gap_days > thresholds.severe_gap_days {
        GapSeverity::Severe
    } else if max_gap_days > thresholds.moderate_gap_days {
        GapSeverity::Moderate
    } else {
        GapSeverity::None
    };
    if gap_severity != GapSeverity::None {
        flags.push(format!("temporal gap of {max_gap_days:.1} days between measurements"));
    }

    // Consistency of successive relative area changes
    let relative_changes = window
        .iter()
        .tuple_windows()
        .filter(|(a, _)| a.area_cm2 > f64::EPSILON)
        .map(|(a, b)| (b.area_cm2 - a.area_cm2) / a.area_cm2)
        .collect_vec();
    let consistency = std_dev(&relative_changes)
        .map_or(1.0, |sd| 1.0 - sd)
        .max(thresholds.consistency_floor)
        .min(1.0);

    let overall_score = (0.3 * validation_rate
        + 0.3 * (1.0 - outlier_rate)
        + 0.2 * gap_severity.score()
        + 0.2 * consistency)
        .clamp(0.0, 1.0);

    let allow_high_urgency_alerts = outlier_rate <= thresholds.max_outlier_rate
        && gap_severity != GapSeverity::Severe
        && validation_rate >= thresholds.min_validation_rate;

    if !allow_high_urgency_alerts {
        log::debug!(
            "High-urgency alerts disallowed (outliers {outlier_rate:.2}, gap {gap_severity:?}, validated {validation_rate:.2})"
        );
    }

    QualityAssessment {
        measurement_count: count,
        validation_rate,
        outlier_rate,
        outlier_ids,
        max_gap_days,
        gap_severity,
        has_temporal_gaps: gap_severity != GapSeverity::None,
        consistency,
        overall_score,
        grade: QualityGrade::from_score(overall_score),
        allow_high_urgency_alerts,
        flags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::measurement::{MeasurementUnit, ValidationStatus};
    use chrono::{Duration, TimeZone, Utc};

    fn series(specs: &[(i64, f64, Option<f64>, bool)]) -> Vec<Measurement> {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        specs
            .iter()
            .enumerate()
            .map(|(i, (day, side, depth, validated))| {
                let m = Measurement::new(
                    format!("m{i}"),
                    start + Duration::days(*day),
                    MeasurementUnit::Centimeters,
                    *side,
                    *side,
                    *depth,
                )
                .unwrap();
                if *validated {
                    m.with_status(ValidationStatus::Validated)
                } else {
                    m
                }
            })
            .collect()
    }

    #[test]
    fn test_clean_history_grades_well() {
        let ms = series(&[
            (0, 4.0, Some(0.5), true),
            (7, 3.8, Some(0.5), true),
            (14, 3.6, Some(0.45), true),
            (21, 3.4, Some(0.4), true),
        ]);
        let q = assess_measurement_quality(
            &ms,
            AnatomicalLocation::Foot,
            90.0,
            &QualityThresholds::default(),
        );
        assert_eq!(q.validation_rate, 1.0);
        assert_eq!(q.outlier_rate, 0.0);
        assert_eq!(q.gap_severity, GapSeverity::None);
        assert!(q.overall_score >= 0.9);
        assert_eq!(q.grade, QualityGrade::A);
        assert!(q.allow_high_urgency_alerts);
    }

    #[test]
    fn test_single_extreme_value_is_outlier() {
        let ms = series(&[
            (0, 4.0, None, true),
            (7, 4.1, None, true),
            (14, 3.9, None, true),
            (21, 12.0, None, true),
        ]);
        let q = assess_measurement_quality(
            &ms,
            AnatomicalLocation::Foot,
            90.0,
            &QualityThresholds::default(),
        );
        assert_eq!(q.outlier_ids, vec!["m3".to_string()]);
        assert!(!q.allow_high_urgency_alerts);
        assert!(q.flags.iter().any(|f| f.contains("missing depth")));
    }

    #[test]
    fn test_gap_and_validation_gate() {
        let ms = series(&[(0, 4.0, Some(0.5), false), (40, 3.0, Some(0.5), false)]);
        let q = assess_measurement_quality(
            &ms,
            AnatomicalLocation::Foot,
            90.0,
            &QualityThresholds::default(),
        );
        assert_eq!(q.gap_severity, GapSeverity::Severe);
        assert!(q.has_temporal_gaps);
        assert_eq!(q.validation_rate, 0.0);
        assert!(!q.allow_high_urgency_alerts);
        assert_eq!(q.grade, QualityGrade::F);
    }

    #[test]
    fn test_window_and_empty() {
        let ms = series(&[(0, 4.0, None, true), (60, 3.0, None, true), (67, 2.9, None, true)]);
        let q = assess_measurement_quality(
            &ms,
            AnatomicalLocation::Foot,
            30.0,
            &QualityThresholds::default(),
        );
        assert_eq!(q.measurement_count, 2);

        let empty = assess_measurement_quality(
            &[],
            AnatomicalLocation::Foot,
            30.0,
            &QualityThresholds::default(),
        );
        assert_eq!(empty.grade, QualityGrade::F);
        assert!(!empty.allow_high_urgency_alerts);
    }
}
