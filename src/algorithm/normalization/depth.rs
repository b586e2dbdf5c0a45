//! Anatomical plausibility of depth values
//!
//! Depths are checked against a location-specific plausible range in
//! millimeters. Implausible values are flagged, never altered; the optional
//! auto-correction mode only attaches a separate suggestion.

use serde::Serialize;

use crate::models::episode::AnatomicalLocation;
use crate::models::measurement::{Measurement, MeasurementUnit};

/// Plausible depth range `(min, max)` in mm for a location.
///
/// Heel and sacral sites carry a non-zero floor; elsewhere a superficial
/// zero-depth wound is plausible.
#[must_use]
pub const fn plausible_depth_range_mm(location: AnatomicalLocation) -> (f64, f64) {
    match location {
        AnatomicalLocation::Toe => (0.0, 15.0),
        AnatomicalLocation::Foot => (0.0, 25.0),
        AnatomicalLocation::Heel => (1.0, 30.0),
        AnatomicalLocation::Ankle => (0.0, 20.0),
        AnatomicalLocation::LowerLeg => (0.0, 25.0),
        AnatomicalLocation::Sacrum => (2.0, 60.0),
        AnatomicalLocation::Other => (0.0, 50.0),
    }
}

/// Patient factors that widen the plausible range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PatientContext {
    /// Increased soft-tissue thickness
    pub obese: bool,
    /// Edematous tissue
    pub edema: bool,
}

impl PatientContext {
    fn adjust_max(self, max_mm: f64) -> f64 {
        let mut max = max_mm;
        if self.obese {
            max *= 1.5;
        }
        if self.edema {
            max += 5.0;
        }
        max
    }
}

/// Options of the depth validation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DepthValidationOptions {
    /// Attach correction suggestions to implausible values
    pub auto_correct: bool,
    /// Change (mm) between adjacent readings worth a verification note
    pub rapid_change_mm: f64,
}

impl Default for DepthValidationOptions {
    fn default() -> Self {
        Self {
            auto_correct: false,
            rapid_change_mm: 5.0,
        }
    }
}

/// A suggested replacement value; the recorded value is kept as is
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepthCorrectionSuggestion {
    /// Suggested depth in mm
    pub suggested_depth_mm: f64,
    /// Why this value is suggested
    pub reason: String,
    /// Confidence of the suggestion (0-1)
    pub confidence: f64,
}

/// Validation outcome of one depth value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepthFinding {
    /// Measurement identifier
    pub measurement_id: String,
    /// Recorded depth in mm, unchanged
    pub depth_mm: f64,
    /// Whether the value lies in the plausible range
    pub plausible: bool,
    /// Problems found
    pub issues: Vec<String>,
    /// Side-channel correction suggestion (auto-correction mode only)
    pub suggestion: Option<DepthCorrectionSuggestion>,
}

/// Result of validating all depth values of a history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepthValidationResult {
    /// Location the range was taken from
    pub location: AnatomicalLocation,
    /// Applied range in mm
    pub range_mm: (f64, f64),
    /// One finding per measurement with a depth
    pub findings: Vec<DepthFinding>,
    /// Measurements without a depth value
    pub missing_depth_ids: Vec<String>,
    /// Whether every depth value is plausible
    pub all_plausible: bool,
    /// Summary recommendations
    pub recommendations: Vec<String>,
}

impl DepthValidationResult {
    /// Number of implausible depth values
    #[must_use]
    pub fn implausible_count(&self) -> usize {
        self.findings.iter().filter(|f| !f.plausible).count()
    }
}

/// Validate depth values against the plausible range of `location`
pub fn validate_depth_measurements(
    measurements: &[Measurement],
    location: AnatomicalLocation,
    patient_context: Option<&PatientContext>,
    options: &DepthValidationOptions,
) -> DepthValidationResult {
    let (min_mm, base_max) = plausible_depth_range_mm(location);
    let max_mm = patient_context.map_or(base_max, |ctx| ctx.adjust_max(base_max));

    let mut findings = Vec::new();
    let mut missing_depth_ids = Vec::new();
    let mut previous: Option<(&Measurement, f64)> = None;

    for m in measurements {
        let Some(depth_mm) = m.depth_mm else {
            missing_depth_ids.push(m.id.clone());
            continue;
        };

        let plausible = depth_mm >= min_mm && depth_mm <= max_mm;
        let mut issues = Vec::new();
        if !plausible {
            issues.push(format!(
                "depth {depth_mm:.1} mm is not anatomically plausible for {location:?} ({min_mm:.0}-{max_mm:.0} mm)"
            ));
        }
        if let Some((prev, prev_depth)) = previous {
            let change = depth_mm - prev_depth;
            if change.abs() > options.rapid_change_mm && prev.days_until(m) <= 7.0 {
                issues.push(format!(
                    "depth changed {change:+.1} mm within {:.1} days; verify measurement",
                    prev.days_until(m)
                ));
            }
        }

        let suggestion = (options.auto_correct && !plausible)
            .then(|| suggest_correction(m.declared_unit, depth_mm, min_mm, max_mm));

        findings.push(DepthFinding {
            measurement_id: m.id.clone(),
            depth_mm,
            plausible,
            issues,
            suggestion,
        });
        previous = Some((m, depth_mm));
    }

    let all_plausible = findings.iter().all(|f| f.plausible);
    let mut recommendations = Vec::new();
    if !all_plausible {
        recommendations.push("Re-measure depth values flagged as not anatomically plausible".to_string());
    }
    if !missing_depth_ids.is_empty() {
        recommendations.push(format!(
            "{} measurements lack depth; record depth at each visit",
            missing_depth_ids.len()
        ));
    }

    DepthValidationResult {
        location,
        range_mm: (min_mm, max_mm),
        findings,
        missing_depth_ids,
        all_plausible,
        recommendations,
    }
}

fn suggest_correction(
    unit: MeasurementUnit,
    depth_mm: f64,
    min_mm: f64,
    max_mm: f64,
) -> DepthCorrectionSuggestion {
    // A millimeter value typed into a centimeter field reads ten times too deep
    let rescaled = depth_mm / 10.0;
    if unit == MeasurementUnit::Centimeters && rescaled >= min_mm && rescaled <= max_mm {
        return DepthCorrectionSuggestion {
            suggested_depth_mm: rescaled,
            reason: "value appears to be millimeters recorded with a centimeter unit".to_string(),
            confidence: 0.8,
        };
    }
    DepthCorrectionSuggestion {
        suggested_depth_mm: depth_mm.clamp(min_mm, max_mm),
        reason: "clamped to the plausible range for the location".to_string(),
        confidence: 0.3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn depth_cm(id: &str, day: u32, depth: f64) -> Measurement {
        Measurement::new(
            id,
            Utc.with_ymd_and_hms(2024, 5, day, 10, 0, 0).unwrap(),
            MeasurementUnit::Centimeters,
            2.0,
            2.0,
            Some(depth),
        )
        .unwrap()
    }

    #[test]
    fn test_flags_without_altering() {
        let ms = vec![depth_cm("a", 1, 0.4), depth_cm("b", 20, 4.0)];
        let result = validate_depth_measurements(
            &ms,
            AnatomicalLocation::Foot,
            None,
            &DepthValidationOptions::default(),
        );
        assert!(!result.all_plausible);
        assert_eq!(result.implausible_count(), 1);
        let flagged = &result.findings[1];
        assert_eq!(flagged.depth_mm, 40.0);
        assert!(flagged.issues[0].contains("not anatomically plausible"));
        assert!(flagged.suggestion.is_none());
        assert_eq!(ms[1].depth_mm, Some(40.0));
    }

    #[test]
    fn test_auto_correction_is_side_channel() {
        let ms = vec![depth_cm("a", 1, 12.0)];
        let options = DepthValidationOptions {
            auto_correct: true,
            ..DepthValidationOptions::default()
        };
        let result = validate_depth_measurements(&ms, AnatomicalLocation::Foot, None, &options);
        let finding = &result.findings[0];
        assert_eq!(finding.depth_mm, 120.0);
        let suggestion = finding.suggestion.as_ref().unwrap();
        assert!((suggestion.suggested_depth_mm - 12.0).abs() < 1e-9);
        assert!((suggestion.confidence - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_patient_context_widens_range() {
        let ms = vec![depth_cm("a", 1, 3.0)];
        let options = DepthValidationOptions::default();
        let narrow = validate_depth_measurements(&ms, AnatomicalLocation::Foot, None, &options);
        let ctx = PatientContext {
            obese: true,
            edema: false,
        };
        let wide = validate_depth_measurements(&ms, AnatomicalLocation::Foot, Some(&ctx), &options);
        assert!(!narrow.all_plausible);
        assert!(wide.all_plausible);
        assert_eq!(wide.range_mm, (0.0, 37.5));
    }

    #[test]
    fn test_location_floor() {
        let ms = vec![depth_cm("a", 1, 0.1)];
        let options = DepthValidationOptions::default();
        let foot = validate_depth_measurements(&ms, AnatomicalLocation::Foot, None, &options);
        let sacrum = validate_depth_measurements(&ms, AnatomicalLocation::Sacrum, None, &options);
        assert!(foot.all_plausible);
        assert!(!sacrum.all_plausible);
        assert_eq!(sacrum.range_mm, (2.0, 60.0));
        assert!(sacrum.findings[0].issues[0].contains("(2-60 mm)"));
    }

    #[test]
    fn test_missing_depth_and_rapid_change() {
        let mut ms = vec![depth_cm("a", 1, 0.2), depth_cm("b", 3, 1.0)];
        ms.push(
            Measurement::new(
                "c",
                Utc.with_ymd_and_hms(2024, 5, 9, 10, 0, 0).unwrap(),
                MeasurementUnit::Centimeters,
                2.0,
                2.0,
                None,
            )
            .unwrap(),
        );
        let result = validate_depth_measurements(
            &ms,
            AnatomicalLocation::LowerLeg,
            None,
            &DepthValidationOptions::default(),
        );
        assert_eq!(result.missing_depth_ids, vec!["c".to_string()]);
        assert!(result.findings[1].issues[0].contains("verify measurement"));
        assert_eq!(result.recommendations.len(), 1);
    }
}
