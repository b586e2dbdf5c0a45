//! Binding coverage checks
//!
//! This module implements the phase-aware area-reduction decision together
//! with the two binary gates: the conservative-care timeline and wound-type
//! eligibility. None of these functions reads advisory output.

pub mod timeline;
pub mod wound_type;

use chrono::{DateTime, Utc};

use crate::config::{ComplianceThresholds, CoverageConfig};
use crate::models::compliance::{ComplianceResult, OverallCompliance, SampleSummary};
use crate::models::episode::TherapyPhase;
use crate::models::measurement::{Measurement, MeasurementHistory};
use crate::utils::logging::{log_evaluation_complete, log_evaluation_start};
use crate::utils::time::elapsed_days;

pub use timeline::{TimelineResult, validate_conservative_care_timeline};
pub use wound_type::{WoundType, WoundTypeResult, validate_wound_type_for_coverage};

/// Comparison sample picked by the window rule
#[derive(Debug, Clone, Copy)]
struct WindowPick<'a> {
    measurement: &'a Measurement,
    day: f64,
    in_window: bool,
}

/// Pick the sample nearest `target_day` after `reference`.
///
/// Samples inside `target ± tolerance` always beat samples outside it; within
/// a class the smaller distance wins and an exact tie goes to the later
/// sample. Equal timestamps keep history order, so validated entries win.
fn pick_nearest_to_target<'a>(
    candidates: impl Iterator<Item = &'a Measurement>,
    reference: &DateTime<Utc>,
    thresholds: &ComplianceThresholds,
) -> Option<WindowPick<'a>> {
    candidates
        .map(|m| {
            let day = elapsed_days(reference, &m.timestamp);
            let distance = (day - thresholds.target_day).abs();
            WindowPick {
                measurement: m,
                day,
                in_window: distance <= thresholds.window_tolerance_days,
            }
        })
        .min_by(|a, b| {
            let da = (a.day - thresholds.target_day).abs();
            let db = (b.day - thresholds.target_day).abs();
            b.in_window
                .cmp(&a.in_window)
                .then_with(|| da.total_cmp(&db))
                .then_with(|| b.day.total_cmp(&a.day))
        })
}

fn summary(m: &Measurement, day: f64) -> SampleSummary {
    SampleSummary {
        measurement_id: m.id.clone(),
        day,
        area_cm2: m.area_cm2,
    }
}

/// Accumulates a compliance result and its audit trail
struct ComplianceBuilder {
    result: ComplianceResult,
}

impl ComplianceBuilder {
    fn new(episode_id: &str, phase: TherapyPhase, config: &CoverageConfig) -> Self {
        let threshold_percent = match phase {
            TherapyPhase::PreTherapy => config.compliance.pre_therapy_reduction_percent,
            TherapyPhase::PostTherapy => config.compliance.post_therapy_reduction_percent,
        };
        let audit_trail = vec![
            format!(
                "Policy: LCD {} (jurisdictions: {})",
                config.policy.lcd_id,
                config.policy.jurisdictions.join(", ")
            ),
            format!("Phase: {phase} (threshold {threshold_percent}% area reduction)"),
        ];
        Self {
            result: ComplianceResult {
                episode_id: episode_id.to_string(),
                phase,
                threshold_percent,
                reduction_percent: None,
                meets_requirement: false,
                overall: OverallCompliance::InsufficientData,
                baseline: None,
                comparison: None,
                audit_trail,
                policy: config.policy.clone(),
            },
        }
    }

    fn audit(&mut self, entry: impl Into<String>) {
        self.result.audit_trail.push(entry.into());
    }

    fn insufficient(mut self, reason: &str) -> ComplianceResult {
        self.audit(format!("INCOMPLETE DATA: {reason}"));
        self.audit("Decision: insufficient_data");
        self.result.overall = OverallCompliance::InsufficientData;
        self.result.meets_requirement = false;
        self.result
    }

    fn decide(mut self, overall: OverallCompliance, rationale: &str) -> ComplianceResult {
        self.audit(format!("Decision: {overall} - {rationale}"));
        self.result.meets_requirement = overall == OverallCompliance::Compliant;
        self.result.overall = overall;
        self.result
    }
}

/// Evaluate area-reduction compliance for one episode.
///
/// # Arguments
/// * `episode_id` - Episode identifier
/// * `history` - Timestamp-ordered measurement history
/// * `phase` - Evaluation phase
/// * `therapy_start` - First advanced-therapy application (required post-therapy)
/// * `config` - Thresholds and policy identifiers
///
/// # Returns
/// A complete [`ComplianceResult`] under all inputs
#[must_use]
pub fn evaluate_area_reduction_compliance(
    episode_id: &str,
    history: &MeasurementHistory,
    phase: TherapyPhase,
    therapy_start: Option<DateTime<Utc>>,
    config: &CoverageConfig,
) -> ComplianceResult {
    log_evaluation_start("area-reduction", episode_id);
    let mut builder = ComplianceBuilder::new(episode_id, phase, config);
    for issue in history.issues() {
        builder.audit(format!("Excluded {issue}"));
    }

    let result = match phase {
        TherapyPhase::PreTherapy => evaluate_pre_therapy(builder, history, config),
        TherapyPhase::PostTherapy => match therapy_start {
            Some(start) => evaluate_post_therapy(builder, history, start, config),
            None => builder.insufficient("post-therapy evaluation requires a therapy start date"),
        },
    };

    log_evaluation_complete("area-reduction", episode_id, result.overall.as_str(), None);
    result
}

fn evaluate_pre_therapy(
    mut builder: ComplianceBuilder,
    history: &MeasurementHistory,
    config: &CoverageConfig,
) -> ComplianceResult {
    let thresholds = &config.compliance;
    if history.len() < 2 {
        return builder.insufficient("at least two measurements are required");
    }
    let Some(baseline) = history.first() else {
        return builder.insufficient("no baseline measurement");
    };
    if baseline.area_cm2 <= f64::EPSILON {
        return builder.insufficient("baseline area is zero");
    }
    builder.result.baseline = Some(summary(baseline, 0.0));
    builder.audit(format!(
        "Baseline: measurement {} area {:.2} cm² (day 0)",
        baseline.id, baseline.area_cm2
    ));

    let later = history.iter().filter(|m| m.timestamp > baseline.timestamp);
    let Some(pick) = pick_nearest_to_target(later, &baseline.timestamp, thresholds) else {
        return builder.insufficient("no measurement after baseline");
    };
    record_comparison(&mut builder, &pick, thresholds);

    let reduction = reduction_percent(baseline.area_cm2, pick.measurement.area_cm2);
    builder.result.reduction_percent = Some(reduction);
    builder.audit(format!("Area reduction: {reduction:.1}%"));

    let threshold = thresholds.pre_therapy_reduction_percent;
    if reduction < 0.0 {
        builder.audit(format!(
            "Wound area increased {:.1}%: deterioration under conservative care",
            -reduction
        ));
        builder.decide(
            OverallCompliance::Compliant,
            "wound deterioration justifies advanced therapy regardless of duration",
        )
    } else if reduction < threshold {
        builder.decide(
            OverallCompliance::Compliant,
            &format!(
                "reduction below {threshold}% shows conservative care insufficient; advanced therapy medically justified"
            ),
        )
    } else {
        builder.decide(
            OverallCompliance::NonCompliant,
            &format!(
                "reduction of at least {threshold}% shows conservative care effective; advanced therapy not medically necessary"
            ),
        )
    }
}

fn evaluate_post_therapy(
    mut builder: ComplianceBuilder,
    history: &MeasurementHistory,
    start: DateTime<Utc>,
    config: &CoverageConfig,
) -> ComplianceResult {
    let thresholds = &config.compliance;
    builder.audit("Therapy start date documented");

    let baseline = history
        .iter()
        .rev()
        .find(|m| m.timestamp <= start)
        .or_else(|| history.iter().find(|m| m.timestamp > start));
    let Some(baseline) = baseline else {
        return builder.insufficient("no measurements documented");
    };
    if baseline.area_cm2 <= f64::EPSILON {
        return builder.insufficient("baseline area is zero");
    }
    let baseline_day = elapsed_days(&start, &baseline.timestamp);
    builder.result.baseline = Some(summary(baseline, baseline_day));
    builder.audit(format!(
        "Baseline: measurement {} area {:.2} cm² (day {baseline_day:.1} relative to therapy start)",
        baseline.id, baseline.area_cm2
    ));

    let later = history
        .iter()
        .filter(|m| m.timestamp > start && m.timestamp > baseline.timestamp);
    let Some(pick) = pick_nearest_to_target(later, &start, thresholds) else {
        return builder.insufficient("no measurement after therapy start");
    };
    record_comparison(&mut builder, &pick, thresholds);

    let reduction = reduction_percent(baseline.area_cm2, pick.measurement.area_cm2);
    builder.result.reduction_percent = Some(reduction);
    builder.audit(format!("Area reduction: {reduction:.1}%"));

    let threshold = thresholds.post_therapy_reduction_percent;
    if reduction >= threshold {
        builder.decide(
            OverallCompliance::Compliant,
            &format!("reduction of at least {threshold}% justifies continued therapy"),
        )
    } else {
        builder.decide(
            OverallCompliance::NonCompliant,
            &format!("reduction below {threshold}%; discontinue advanced therapy"),
        )
    }
}

fn record_comparison(
    builder: &mut ComplianceBuilder,
    pick: &WindowPick<'_>,
    thresholds: &ComplianceThresholds,
) {
    let low = thresholds.target_day - thresholds.window_tolerance_days;
    let high = thresholds.target_day + thresholds.window_tolerance_days;
    let placement = if pick.in_window {
        format!("within {low:.0}-{high:.0} day window")
    } else {
        format!("outside {low:.0}-{high:.0} day window; nearest available sample used")
    };
    builder.audit(format!(
        "Comparison: measurement {} area {:.2} cm² at day {:.1} ({placement})",
        pick.measurement.id, pick.measurement.area_cm2, pick.day
    ));
    builder.result.comparison = Some(summary(pick.measurement, pick.day));
}

/// Percentage area reduction from `baseline` to `current` (negative = growth)
#[must_use]
pub fn reduction_percent(baseline: f64, current: f64) -> f64 {
    (baseline - current) / baseline * 100.0
}
