//! Pre-eligibility orchestration
//!
//! Composes the binding checks (area reduction, conservative-care timeline,
//! wound type) into one eligibility decision. Quality, depth validation and
//! the advisory report ride along as context; eligibility reads none of them.

use std::time::Instant;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;

use crate::algorithm::advisory::{AdvisoryReport, evaluate_depth_volume_advisory};
use crate::algorithm::compliance::{
    TimelineResult, WoundType, WoundTypeResult, evaluate_area_reduction_compliance,
    validate_conservative_care_timeline, validate_wound_type_for_coverage,
};
use crate::algorithm::normalization::depth::{
    DepthValidationOptions, DepthValidationResult, validate_depth_measurements,
};
use crate::algorithm::quality::{QualityAssessment, assess_measurement_quality};
use crate::config::CoverageConfig;
use crate::error::Result;
use crate::models::compliance::{ComplianceResult, OverallCompliance};
use crate::models::episode::{
    DiabeticStatus, DocumentedOutcome, Encounter, EncounterKind, Episode, EpisodeCase,
    TherapyPhase,
};
use crate::models::measurement::{IngestIssue, MeasurementHistory};
use crate::models::policy::PolicySelection;
use crate::policy::{PolicySelector, SelectionRequest};
use crate::utils::logging::{log_evaluation_complete, log_evaluation_start, log_warning};

/// Full pre-eligibility outcome for one episode
#[derive(Debug, Clone, Serialize)]
pub struct OrchestratorResult {
    /// Episode identifier
    pub episode_id: String,
    /// Area reduction compliant, timeline met and wound type eligible
    pub eligible: bool,
    /// Ordered audit trail across all checks
    pub audit_trail: Vec<String>,
    /// Short reasons for a negative decision
    pub failure_reasons: Vec<String>,
    /// Policy citations of failed requirements
    pub policy_violations: Vec<String>,
    /// Measurement quality
    pub quality: QualityAssessment,
    /// Area-reduction decision
    pub compliance: ComplianceResult,
    /// Conservative-care timeline
    pub timeline: TimelineResult,
    /// Wound-type eligibility
    pub wound_type: WoundTypeResult,
    /// Depth plausibility
    pub depth_validation: DepthValidationResult,
    /// Depth/volume advisory report; never part of the decision
    pub advisory: AdvisoryReport,
    /// Diabetic classification context, when appended
    pub diabetic_context: Option<String>,
    /// Narrative/measurement conflicts and their resolutions
    pub conflicts: Vec<String>,
    /// Policy selection, when requested
    pub policy_selection: Option<PolicySelection>,
    /// Raw measurements rejected at ingest
    pub ingest_issues: Vec<IngestIssue>,
}

/// Runs every pre-eligibility check for an episode
#[derive(Debug, Clone, Default)]
pub struct PreEligibilityOrchestrator {
    config: CoverageConfig,
}

/// Earliest dated therapy application
fn first_therapy_application(encounters: &[Encounter]) -> Option<(&Encounter, DateTime<Utc>)> {
    encounters
        .iter()
        .filter(|e| e.kind == Some(EncounterKind::TherapyApplication))
        .filter_map(|e| e.date.map(|d| (e, d)))
        .min_by_key(|(_, d)| *d)
}

/// Narrative outcome of the most recent encounter documenting one
fn latest_documented_outcome(encounters: &[Encounter]) -> Option<(&Encounter, DocumentedOutcome)> {
    encounters
        .iter()
        .filter_map(|e| e.documented_outcome.map(|o| (e, o)))
        .max_by_key(|(e, _)| e.date)
}

fn outcome_name(outcome: DocumentedOutcome) -> &'static str {
    match outcome {
        DocumentedOutcome::Improving => "improving",
        DocumentedOutcome::Stalled => "stalled",
        DocumentedOutcome::Deteriorating => "deteriorating",
    }
}

impl PreEligibilityOrchestrator {
    /// Create an orchestrator with `config`
    #[must_use]
    pub fn new(config: CoverageConfig) -> Self {
        Self { config }
    }

    /// Engine configuration
    #[must_use]
    pub fn config(&self) -> &CoverageConfig {
        &self.config
    }

    /// Evaluate one episode.
    ///
    /// Never fails: missing inputs become `INCOMPLETE DATA` audit entries and
    /// the conservative (not eligible) outcome.
    #[must_use]
    pub fn perform_pre_eligibility_checks(
        &self,
        episode: &Episode,
        encounters: &[Encounter],
    ) -> OrchestratorResult {
        let start = Instant::now();
        log_evaluation_start("pre-eligibility", &episode.id);
        let config = &self.config;
        let mut audit_trail = vec![format!(
            "Pre-eligibility evaluation: episode {} under LCD {}",
            episode.id, config.policy.lcd_id
        )];

        let history = MeasurementHistory::ingest(&episode.measurements);
        if !history.issues().is_empty() {
            log_warning(
                &format!("{} measurements excluded at ingest", history.issues().len()),
                Some(&episode.id),
            );
        }
        if episode.measurements.is_empty() {
            audit_trail.push("INCOMPLETE DATA: no wound measurements documented".to_string());
        }
        if encounters.is_empty() {
            audit_trail.push("INCOMPLETE DATA: no encounters documented".to_string());
        }

        let therapy_start = match (episode.therapy_start, episode.phase) {
            (Some(start), _) => Some(start),
            (None, TherapyPhase::PostTherapy) => match first_therapy_application(encounters) {
                Some((encounter, date)) => {
                    audit_trail.push(format!(
                        "Therapy start taken from therapy application encounter {}",
                        encounter.id
                    ));
                    Some(date)
                }
                None => None,
            },
            (None, TherapyPhase::PreTherapy) => None,
        };

        let quality = assess_measurement_quality(
            history.as_slice(),
            episode.location,
            config.quality.assessment_window_days,
            &config.quality,
        );
        audit_trail.push(format!(
            "Measurement quality: {:?} (score {:.2}, {} measurements)",
            quality.grade, quality.overall_score, quality.measurement_count
        ));

        let compliance = evaluate_area_reduction_compliance(
            &episode.id,
            &history,
            episode.phase,
            therapy_start,
            config,
        );
        audit_trail.extend(compliance.audit_trail.iter().cloned());

        let timeline =
            validate_conservative_care_timeline(encounters, &config.compliance, &config.policy);
        audit_trail.extend(timeline.audit_trail.iter().cloned());

        let wound_type = validate_wound_type_for_coverage(
            episode.wound_description.as_deref(),
            episode.diagnosis_code.as_deref(),
            &episode.note_keywords,
            episode.diabetic_status,
            &config.policy,
        );
        audit_trail.extend(wound_type.audit_trail.iter().cloned());

        let depth_validation = validate_depth_measurements(
            history.as_slice(),
            episode.location,
            None,
            &DepthValidationOptions::default(),
        );
        if !depth_validation.missing_depth_ids.is_empty() {
            audit_trail.push(format!(
                "INCOMPLETE DATA: {} measurements without depth",
                depth_validation.missing_depth_ids.len()
            ));
        }
        if !depth_validation.all_plausible {
            audit_trail.push(format!(
                "Depth validation: {} implausible depth values for {:?}",
                depth_validation.implausible_count(),
                depth_validation.location
            ));
        }

        let diabetic_context = self.diabetic_context(episode, &mut audit_trail);
        let conflicts = self.detect_conflicts(&compliance, encounters);
        audit_trail.extend(conflicts.iter().cloned());

        let advisory = evaluate_depth_volume_advisory(&episode.id, history.as_slice(), &quality, config);
        audit_trail.push(format!(
            "[{}] {} advisory alerts issued; not part of the coverage decision",
            advisory.label,
            advisory.issued_alerts().count()
        ));

        let mut failure_reasons = Vec::new();
        let mut policy_violations = Vec::new();
        if compliance.overall != OverallCompliance::Compliant {
            failure_reasons.push(format!("area reduction compliance is {}", compliance.overall));
            policy_violations.push(format!(
                "LCD {}: {} area reduction requirement not met ({})",
                config.policy.lcd_id, episode.phase, compliance.overall
            ));
        }
        if !timeline.passes {
            failure_reasons.push("conservative care timeline not met".to_string());
            policy_violations.extend(timeline.violations.iter().cloned());
        }
        if !wound_type.eligible {
            failure_reasons.push(format!("wound type {} not eligible", wound_type.wound_type));
            policy_violations.extend(
                wound_type
                    .violations
                    .iter()
                    .map(|v| format!("LCD {}: {v}", config.policy.lcd_id)),
            );
        }

        let eligible = failure_reasons.is_empty();
        audit_trail.push(if eligible {
            "Decision: eligible".to_string()
        } else {
            format!("Decision: not eligible ({})", failure_reasons.join("; "))
        });

        log_evaluation_complete(
            "pre-eligibility",
            &episode.id,
            if eligible { "eligible" } else { "not eligible" },
            Some(start.elapsed()),
        );

        OrchestratorResult {
            episode_id: episode.id.clone(),
            eligible,
            audit_trail,
            failure_reasons,
            policy_violations,
            quality,
            compliance,
            timeline,
            wound_type,
            depth_validation,
            advisory,
            diabetic_context,
            conflicts,
            policy_selection: None,
            ingest_issues: history.issues().to_vec(),
        }
    }

    fn diabetic_context(&self, episode: &Episode, audit_trail: &mut Vec<String>) -> Option<String> {
        match (episode.diabetic_status, episode.diabetic_classification) {
            (DiabeticStatus::Diabetic(_), Some(classification)) => {
                let summary = classification.audit_summary();
                audit_trail.push(summary.clone());
                Some(summary)
            }
            (DiabeticStatus::Diabetic(_), None) => {
                audit_trail.push(
                    "INCOMPLETE DATA: diabetic patient without a diabetic classification"
                        .to_string(),
                );
                None
            }
            (DiabeticStatus::NonDiabetic, _) => {
                audit_trail
                    .push("Diabetic classification skipped: patient is not diabetic".to_string());
                None
            }
            (DiabeticStatus::Unknown, _) => {
                audit_trail.push(
                    "INCOMPLETE DATA: diabetic status not documented; diabetic classification skipped"
                        .to_string(),
                );
                None
            }
        }
    }

    /// Compare the latest narrative outcome with the measured area change.
    ///
    /// Measurement always wins; the entries only record the disagreement.
    fn detect_conflicts(&self, compliance: &ComplianceResult, encounters: &[Encounter]) -> Vec<String> {
        let Some(reduction) = compliance.reduction_percent else {
            return Vec::new();
        };
        let Some((encounter, outcome)) = latest_documented_outcome(encounters) else {
            return Vec::new();
        };
        let meaningful = self.config.compliance.post_therapy_reduction_percent;
        let contradicts = match outcome {
            DocumentedOutcome::Improving => reduction < 0.0,
            DocumentedOutcome::Stalled => reduction >= meaningful,
            DocumentedOutcome::Deteriorating => reduction > 0.0,
        };
        if !contradicts {
            return Vec::new();
        }
        vec![
            format!(
                "CONFLICT DETECTED: encounter {} documents the wound as {} but measured area reduction is {reduction:.1}%",
                encounter.id,
                outcome_name(outcome)
            ),
            format!(
                "RESOLUTION: measured area reduction ({reduction:.1}%) takes precedence over documented outcome; compliance decision stands as {}",
                compliance.overall
            ),
        ]
    }

    /// Evaluate one episode and attach the best policy for `jurisdiction`.
    ///
    /// Fails only on a malformed jurisdiction code; store failures become a
    /// fallback selection.
    pub async fn perform_with_policy_selection(
        &self,
        episode: &Episode,
        encounters: &[Encounter],
        selector: &PolicySelector,
        jurisdiction: &str,
    ) -> Result<OrchestratorResult> {
        let mut result = self.perform_pre_eligibility_checks(episode, encounters);
        let wound_type = Some(result.wound_type.wound_type).filter(|t| *t != WoundType::Unclassified);
        let request = SelectionRequest::for_episode(jurisdiction, episode, wound_type)?;
        let selection = selector.select_best_policy(&request).await;

        let entry = match (&selection.policy, selection.fallback_used()) {
            (Some(policy), _) => format!(
                "Policy selection: {} selected for jurisdiction {}",
                policy.policy_id, request.jurisdiction
            ),
            (None, Some(reason)) => format!(
                "Policy selection: no policy for jurisdiction {} ({reason})",
                request.jurisdiction
            ),
            (None, None) => format!(
                "Policy selection: no policy for jurisdiction {}",
                request.jurisdiction
            ),
        };
        // Keep the decision entry last
        let decision = result.audit_trail.pop();
        result.audit_trail.push(entry);
        result.audit_trail.extend(decision);
        result.policy_selection = Some(selection);
        Ok(result)
    }

    /// Evaluate many episodes in parallel, in input order
    #[must_use]
    pub fn evaluate_batch(&self, cases: &[EpisodeCase]) -> Vec<OrchestratorResult> {
        let start = Instant::now();
        let results: Vec<OrchestratorResult> = cases
            .par_iter()
            .map(|case| self.perform_pre_eligibility_checks(&case.episode, &case.encounters))
            .collect();
        log::info!(
            "Evaluated {} episodes ({} eligible) in {:?}",
            results.len(),
            results.iter().filter(|r| r.eligible).count(),
            start.elapsed()
        );
        results
    }
}
