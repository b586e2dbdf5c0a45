use std::sync::Arc;

use wound_coverage::config::PolicySelectionConfig;
use wound_coverage::models::{
    DocumentedOutcome, EncounterKind, EpisodeCase, OverallCompliance, TherapyPhase,
};
use wound_coverage::policy::{InMemoryPolicyStore, NullTelemetry, PolicySelector};
use wound_coverage::{Encounter, PreEligibilityOrchestrator};

use crate::utils::{date, day, dfu_episode, policy, standard_care};

const PATIENT: &str = "Margaret Q. Hollingsworth";
const RECORDER: &str = "Nurse Ingrid Vasquez-Olsen";
const NOTE: &str = "MRN 00417763 lives at 12 Elm Street";

fn case_with_phi() -> EpisodeCase {
    let mut episode = dfu_episode("ep-phi", TherapyPhase::PreTherapy, &[(0, 12.0), (28, 8.0)]);
    episode.patient_name = Some(PATIENT.to_string());
    episode.wound_description = Some(format!("diabetic foot ulcer, {NOTE}"));
    for m in &mut episode.measurements {
        m.recorded_by = Some(RECORDER.to_string());
        m.notes = Some(NOTE.to_string());
    }
    let mut encounters = standard_care(30);
    encounters.push(
        Encounter::new("enc-4", day(29), EncounterKind::Assessment)
            .with_narrative(RECORDER, NOTE)
            .with_outcome(DocumentedOutcome::Deteriorating),
    );
    EpisodeCase {
        episode,
        encounters,
    }
}

#[test]
fn test_results_carry_no_phi() {
    let case = case_with_phi();
    let result =
        PreEligibilityOrchestrator::default().perform_pre_eligibility_checks(&case.episode, &case.encounters);

    let json = serde_json::to_string(&result).unwrap();
    for secret in [PATIENT, RECORDER, NOTE, "Hollingsworth", "00417763"] {
        assert!(!json.contains(secret), "result leaked {secret}");
    }
    assert!(result.conflicts.iter().any(|c| c.starts_with("CONFLICT DETECTED")));
    assert!(result.audit_trail.iter().all(|e| !e.contains("Elm Street")));
}

#[test]
fn test_batch_matches_single_evaluation() {
    let orchestrator = PreEligibilityOrchestrator::default();
    let cases: Vec<EpisodeCase> = [(8.0, true), (4.0, false), (12.5, true)]
        .iter()
        .enumerate()
        .map(|(i, (area, _))| EpisodeCase {
            episode: dfu_episode(
                &format!("ep-{i}"),
                TherapyPhase::PreTherapy,
                &[(0, 12.0), (28, *area)],
            ),
            encounters: standard_care(30),
        })
        .collect();

    let batch = orchestrator.evaluate_batch(&cases);
    let eligible: Vec<bool> = batch.iter().map(|r| r.eligible).collect();
    assert_eq!(eligible, vec![true, false, true]);
    for (case, result) in cases.iter().zip(&batch) {
        let single = orchestrator.perform_pre_eligibility_checks(&case.episode, &case.encounters);
        assert_eq!(single.episode_id, result.episode_id);
        assert_eq!(single.compliance.overall, result.compliance.overall);
    }
}

#[test]
fn test_episode_case_from_json() {
    let json = r#"{
        "episode": {
            "id": "ep-json",
            "phase": "post-therapy",
            "therapy_start": "2025-02-03T09:00:00Z",
            "location": "lower_leg",
            "diagnosis_code": "I83.012",
            "note_keywords": ["chronic venous disease"],
            "diabetic_status": "nondiabetic",
            "measurements": [
                {"id": "m0", "timestamp": "2025-02-03T09:00:00Z", "length": 4.0, "width": 3.0, "unit": "cm"},
                {"id": "m1", "timestamp": "2025-03-03T09:00:00Z", "length": 3.0, "width": 2.5, "unit": "cm"}
            ]
        },
        "encounters": [
            {"id": "e1", "date": "2025-01-02T09:00:00Z", "kind": "compression"},
            {"id": "e2", "date": "2025-02-03T09:00:00Z", "kind": "therapy_application"}
        ]
    }"#;
    let case: EpisodeCase = serde_json::from_str(json).unwrap();
    let result = PreEligibilityOrchestrator::default()
        .perform_pre_eligibility_checks(&case.episode, &case.encounters);

    // 12 -> 7.5 (x pi/4) is a 37.5% reduction four weeks after therapy start
    assert_eq!(result.compliance.overall, OverallCompliance::Compliant);
    assert!(result.timeline.passes);
    assert!(result.wound_type.eligible, "{:?}", result.wound_type.violations);
    assert!(result.eligible);
    assert!(result
        .audit_trail
        .iter()
        .any(|e| e == "Diabetic classification skipped: patient is not diabetic"));
}

#[tokio::test]
async fn test_selection_attached_to_result() {
    let store = InMemoryPolicyStore::with_policies(
        date(2025, 3, 1),
        vec![
            policy("J5", "L39806", date(2024, 11, 1)),
            policy("J5", "L35041", date(2019, 10, 1)),
        ],
    );
    let selector = PolicySelector::new(
        Arc::new(store),
        Arc::new(NullTelemetry),
        PolicySelectionConfig::default(),
    );
    let case = case_with_phi();
    let result = PreEligibilityOrchestrator::default()
        .perform_with_policy_selection(&case.episode, &case.encounters, &selector, "j5")
        .await
        .unwrap();

    let selection = result.policy_selection.as_ref().unwrap();
    assert_eq!(
        selection.policy.as_ref().map(|p| p.policy_id.as_str()),
        Some("L39806")
    );
    assert!(result
        .audit_trail
        .iter()
        .any(|e| e == "Policy selection: L39806 selected for jurisdiction J5"));
    assert!(result.audit_trail.last().unwrap().starts_with("Decision:"));

    let err = PreEligibilityOrchestrator::default()
        .perform_with_policy_selection(&case.episode, &case.encounters, &selector, "nowhere")
        .await;
    assert!(err.is_err());
}
