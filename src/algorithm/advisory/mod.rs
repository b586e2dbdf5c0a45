//! Depth and volume advisory engine
//!
//! Turns depth/volume progression into advisory alerts. Every alert passes
//! a tier-specific gate (measurement count, trend confidence, data quality,
//! consecutive confirmations) unless the acute-deterioration override fires.
//! The report is returned next to the coverage decision and never feeds it.

pub mod progression;

use serde::Serialize;

use crate::algorithm::quality::QualityAssessment;
use crate::config::{AdvisoryThresholds, AlertGate, CoverageConfig};
use crate::models::advisory::{
    ADVISORY_LABEL, AdvisoryAlert, AlertKind, PreventionReason, PreventionReasons, UrgencyTier,
};
use crate::models::measurement::Measurement;
use crate::utils::logging::{log_evaluation_complete, log_evaluation_start};

pub use progression::{
    AcuteChange, ConfirmationResult, DepthProgression, VolumeProgression,
    analyze_depth_progression, analyze_volume_progression, detect_consecutive_confirmations,
    trend_confidence,
};

/// Advisory output of one episode
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisoryReport {
    /// Episode identifier
    pub episode_id: String,
    /// Always [`ADVISORY_LABEL`]
    pub label: &'static str,
    /// Depth trend
    pub depth: DepthProgression,
    /// Volume trend
    pub volume: VolumeProgression,
    /// All alert candidates, issued or prevented
    pub alerts: Vec<AdvisoryAlert>,
    /// Acute jump that triggered the safety override
    pub acute_deterioration: Option<AcuteChange>,
    /// PHI-free audit trail; every entry carries the advisory label
    pub audit_trail: Vec<String>,
}

impl AdvisoryReport {
    /// Alerts that should be shown
    pub fn issued_alerts(&self) -> impl Iterator<Item = &AdvisoryAlert> {
        self.alerts.iter().filter(|a| a.should_issue)
    }

    /// Highest tier among issued alerts
    #[must_use]
    pub fn highest_issued_tier(&self) -> Option<UrgencyTier> {
        self.issued_alerts().map(|a| a.tier).max()
    }
}

/// Gate applying to alerts of `tier`
#[must_use]
pub const fn gate_for(thresholds: &AdvisoryThresholds, tier: UrgencyTier) -> &AlertGate {
    match tier {
        UrgencyTier::Minor => &thresholds.standard_gate,
        UrgencyTier::Moderate => &thresholds.moderate_gate,
        UrgencyTier::Urgent => &thresholds.urgent_gate,
        UrgencyTier::Critical => &thresholds.critical_gate,
    }
}

/// Tier of a weekly depth-increase rate
#[must_use]
pub fn rate_tier(rate_mm: f64, t: &AdvisoryThresholds) -> Option<UrgencyTier> {
    if rate_mm >= t.rate_critical_mm {
        Some(UrgencyTier::Critical)
    } else if rate_mm >= t.rate_moderate_mm {
        Some(UrgencyTier::Moderate)
    } else if rate_mm >= t.rate_minor_mm {
        Some(UrgencyTier::Minor)
    } else {
        None
    }
}

/// Tier of an absolute depth increase over the two-week window
#[must_use]
pub fn absolute_change_tier(change_mm: f64, t: &AdvisoryThresholds) -> Option<UrgencyTier> {
    if change_mm >= t.absolute_critical_mm {
        Some(UrgencyTier::Critical)
    } else if change_mm >= t.absolute_urgent_mm {
        Some(UrgencyTier::Urgent)
    } else if change_mm >= t.absolute_immediate_mm {
        Some(UrgencyTier::Moderate)
    } else {
        None
    }
}

/// Tier of a volume increase over the four-week window
#[must_use]
pub fn volume_tier(percent: f64, t: &AdvisoryThresholds) -> Option<UrgencyTier> {
    if percent >= t.volume_major_percent {
        Some(UrgencyTier::Urgent)
    } else if percent >= t.volume_moderate_percent {
        Some(UrgencyTier::Moderate)
    } else if percent >= t.volume_minor_percent {
        Some(UrgencyTier::Minor)
    } else {
        None
    }
}

/// Evidence an alert candidate is judged on
#[derive(Debug, Clone, Copy)]
struct Evidence {
    points: usize,
    confidence: f64,
    consecutive: usize,
}

fn prevention_reasons(
    tier: UrgencyTier,
    evidence: Evidence,
    quality: &QualityAssessment,
    thresholds: &AdvisoryThresholds,
) -> PreventionReasons {
    let gate = gate_for(thresholds, tier);
    let mut reasons = PreventionReasons::new();
    if evidence.points < gate.min_measurements {
        reasons.push(PreventionReason::InsufficientMeasurements {
            required: gate.min_measurements,
            actual: evidence.points,
        });
    }
    if evidence.confidence < gate.min_confidence {
        reasons.push(PreventionReason::LowConfidence {
            required: gate.min_confidence,
            actual: evidence.confidence,
        });
    }
    if quality.overall_score < gate.min_quality {
        reasons.push(PreventionReason::LowQuality {
            required: gate.min_quality,
            actual: quality.overall_score,
        });
    }
    if evidence.consecutive < gate.min_consecutive {
        reasons.push(PreventionReason::InsufficientConsecutive {
            required: gate.min_consecutive,
            actual: evidence.consecutive,
        });
    }
    if tier.is_high_urgency() && !quality.allow_high_urgency_alerts {
        reasons.push(PreventionReason::HighUrgencyDisallowed);
    }
    reasons
}

fn gated_alert(
    kind: AlertKind,
    tier: UrgencyTier,
    observed_value: f64,
    evidence: Evidence,
    quality: &QualityAssessment,
    thresholds: &AdvisoryThresholds,
) -> AdvisoryAlert {
    AdvisoryAlert::new(
        kind,
        tier,
        observed_value,
        quality.overall_score,
        evidence.confidence,
        evidence.consecutive,
        prevention_reasons(tier, evidence, quality, thresholds),
    )
}

/// Weekly rate threshold a tier's rate alert is confirmed against
fn rate_threshold(tier: UrgencyTier, t: &AdvisoryThresholds) -> f64 {
    match tier {
        UrgencyTier::Minor => t.rate_minor_mm,
        UrgencyTier::Moderate | UrgencyTier::Urgent => t.rate_moderate_mm,
        UrgencyTier::Critical => t.rate_critical_mm,
    }
}

/// Evaluate depth and volume progression into advisory alerts.
///
/// # Arguments
/// * `episode_id` - Episode identifier
/// * `measurements` - Timestamp-ordered measurements
/// * `quality` - Quality assessment of the same history
/// * `config` - Advisory thresholds and the LCD cited in the audit
///
/// # Returns
/// An [`AdvisoryReport`]; it carries no coverage weight
#[must_use]
pub fn evaluate_depth_volume_advisory(
    episode_id: &str,
    measurements: &[Measurement],
    quality: &QualityAssessment,
    config: &CoverageConfig,
) -> AdvisoryReport {
    log_evaluation_start("advisory", episode_id);
    let thresholds = &config.advisory;
    let prefix = format!("[{ADVISORY_LABEL}] LCD {}", config.policy.lcd_id);
    let mut audit_trail = vec![format!(
        "{prefix}: depth/volume monitoring does not affect the coverage determination"
    )];

    let depth = analyze_depth_progression(measurements, thresholds);
    let volume = analyze_volume_progression(episode_id, measurements, thresholds);
    let mut alerts = Vec::new();

    if let Some((rate, tier)) = depth
        .weekly_rate_mm
        .and_then(|rate| rate_tier(rate, thresholds).map(|tier| (rate, tier)))
    {
        let confirmations = detect_consecutive_confirmations(
            measurements,
            rate_threshold(tier, thresholds),
            thresholds.volume_window_days,
        );
        let evidence = Evidence {
            points: depth.depth_points,
            confidence: depth.confidence,
            consecutive: confirmations.consecutive,
        };
        alerts.push(gated_alert(
            AlertKind::DepthRate,
            tier,
            rate,
            evidence,
            quality,
            thresholds,
        ));
    }

    if let Some((change, tier)) = depth
        .absolute_change_mm
        .and_then(|change| absolute_change_tier(change, thresholds).map(|tier| (change, tier)))
    {
        let evidence = Evidence {
            points: depth.depth_points,
            confidence: depth.confidence,
            consecutive: depth.confirmations.consecutive,
        };
        alerts.push(gated_alert(
            AlertKind::DepthAbsoluteChange,
            tier,
            change,
            evidence,
            quality,
            thresholds,
        ));
    }

    if let Some((percent, tier)) = volume
        .percent_change
        .and_then(|p| volume_tier(p, thresholds).map(|tier| (p, tier)))
    {
        let evidence = Evidence {
            points: volume.volume_points,
            confidence: volume.confidence,
            consecutive: volume.consecutive_increases,
        };
        alerts.push(gated_alert(
            AlertKind::VolumeExpansion,
            tier,
            percent,
            evidence,
            quality,
            thresholds,
        ));
    }

    // Safety override: bypasses every gate
    let acute_deterioration = depth
        .acute_change
        .clone()
        .filter(|acute| acute.change_mm > thresholds.absolute_critical_mm);
    if let Some(acute) = &acute_deterioration {
        log::warn!(
            "Acute depth deterioration in episode {episode_id}: +{:.1} mm in {:.1} days",
            acute.change_mm,
            acute.interval_days
        );
        audit_trail.push(format!(
            "{prefix}: SAFETY OVERRIDE acute depth increase of {:.1} mm in {:.1} days (measurements {} -> {}); immediate clinical review recommended",
            acute.change_mm, acute.interval_days, acute.from_measurement_id, acute.to_measurement_id
        ));
        alerts.push(AdvisoryAlert::safety_override(
            acute.change_mm,
            quality.overall_score,
            depth.confidence,
        ));
    }

    for alert in &alerts {
        if alert.safety_override {
            continue;
        }
        if alert.should_issue {
            audit_trail.push(format!(
                "{prefix}: {} alert issued ({}; observed {:.2}, confidence {:.2}, quality {:.2})",
                alert.tier,
                alert.kind.description(),
                alert.observed_value,
                alert.confidence_score,
                alert.quality_score
            ));
        } else {
            let reasons = alert
                .prevention_reasons
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            audit_trail.push(format!(
                "{prefix}: {} {} alert withheld: {reasons}",
                alert.tier,
                alert.kind.description()
            ));
        }
    }
    if alerts.is_empty() {
        audit_trail.push(format!("{prefix}: no depth or volume deterioration detected"));
    }

    let report = AdvisoryReport {
        episode_id: episode_id.to_string(),
        label: ADVISORY_LABEL,
        depth,
        volume,
        alerts,
        acute_deterioration,
        audit_trail,
    };
    let outcome = report
        .highest_issued_tier()
        .map_or("no alerts", UrgencyTier::as_str);
    log_evaluation_complete("advisory", episode_id, outcome, None);
    report
}
