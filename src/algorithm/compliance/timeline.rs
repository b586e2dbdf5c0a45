//! Conservative-care timeline gate
//!
//! Advanced therapy requires a documented period of standard care before
//! the first application. Days are counted as whole elapsed days from the
//! first conservative-care encounter to the first therapy application.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{ComplianceThresholds, PolicyMetadata};
use crate::models::episode::{Encounter, EncounterKind};
use crate::utils::time::elapsed_whole_days;

/// Outcome of the timeline gate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineResult {
    /// Whether the minimum conservative-care duration is met
    pub passes: bool,
    /// Whole days of documented conservative care
    pub conservative_care_days: Option<i64>,
    /// First conservative-care encounter
    pub first_conservative_care: Option<DateTime<Utc>>,
    /// Reference date of the advanced therapy
    pub therapy_reference: Option<DateTime<Utc>>,
    /// Whether incomplete encounters were excluded or required data is absent
    pub incomplete_data: bool,
    /// Reasons the gate failed
    pub violations: Vec<String>,
    /// PHI-free audit trail
    pub audit_trail: Vec<String>,
}

/// Validate that conservative care lasted long enough before therapy.
///
/// Encounters without a date or kind are excluded and reported. When no
/// therapy application is documented, the latest dated encounter is used
/// as the reference date.
#[must_use]
pub fn validate_conservative_care_timeline(
    encounters: &[Encounter],
    thresholds: &ComplianceThresholds,
    policy: &PolicyMetadata,
) -> TimelineResult {
    let mut audit_trail = vec![format!(
        "Timeline: LCD {} requires at least {} days of conservative care",
        policy.lcd_id, thresholds.min_conservative_care_days
    )];
    let mut incomplete_data = false;

    let mut dated: Vec<(DateTime<Utc>, EncounterKind)> = Vec::with_capacity(encounters.len());
    for encounter in encounters {
        match (encounter.date, encounter.kind) {
            (Some(date), Some(kind)) => dated.push((date, kind)),
            (None, _) => {
                incomplete_data = true;
                audit_trail.push(format!(
                    "INCOMPLETE DATA: encounter {} has no date; excluded",
                    encounter.id
                ));
            }
            (_, None) => {
                incomplete_data = true;
                audit_trail.push(format!(
                    "INCOMPLETE DATA: encounter {} has no encounter type; excluded",
                    encounter.id
                ));
            }
        }
    }
    dated.sort_by_key(|(date, _)| *date);

    let first_care = dated
        .iter()
        .find(|(_, kind)| kind.is_conservative_care())
        .map(|(date, _)| *date);
    let Some(first_care) = first_care else {
        audit_trail.push("INCOMPLETE DATA: no conservative-care encounter documented".to_string());
        return TimelineResult {
            passes: false,
            conservative_care_days: None,
            first_conservative_care: None,
            therapy_reference: None,
            incomplete_data: true,
            violations: vec![format!("LCD {}: no documented conservative care", policy.lcd_id)],
            audit_trail,
        };
    };

    let therapy = dated
        .iter()
        .find(|(_, kind)| *kind == EncounterKind::TherapyApplication)
        .map(|(date, _)| *date);
    let reference = match therapy {
        Some(date) => date,
        None => {
            audit_trail.push(
                "No advanced-therapy application documented; latest encounter used as reference"
                    .to_string(),
            );
            // `first_care` came from `dated`, so it is non-empty
            dated.last().map_or(first_care, |(date, _)| *date)
        }
    };

    let days = elapsed_whole_days(&first_care, &reference);
    audit_trail.push(format!(
        "Conservative care documented for {days} days before the therapy reference date"
    ));

    let mut violations = Vec::new();
    let passes = days >= thresholds.min_conservative_care_days;
    if passes {
        audit_trail.push("Timeline requirement met".to_string());
    } else {
        let violation = format!(
            "LCD {}: conservative care lasted {days} days; at least {} required",
            policy.lcd_id, thresholds.min_conservative_care_days
        );
        audit_trail.push(format!("Timeline requirement not met: {violation}"));
        violations.push(violation);
    }

    TimelineResult {
        passes,
        conservative_care_days: Some(days),
        first_conservative_care: Some(first_care),
        therapy_reference: Some(reference),
        incomplete_data,
        violations,
        audit_trail,
    }
}
