use std::sync::Arc;

use rand::seq::SliceRandom;

use wound_coverage::config::PolicySelectionConfig;
use wound_coverage::error::CoverageError;
use wound_coverage::models::{FallbackReason, PolicyCandidate, PolicyStatus};
use wound_coverage::policy::{
    InMemoryPolicyStore, InMemoryTelemetry, PolicyFuture, PolicySelector, PolicyStore,
    SelectionRequest,
};

use crate::utils::{date, policy, policy_body, seeded_rng};

fn selector(candidates: Vec<PolicyCandidate>) -> (PolicySelector, Arc<InMemoryTelemetry>) {
    let store = InMemoryPolicyStore::with_policies(date(2025, 1, 1), candidates);
    let telemetry = Arc::new(InMemoryTelemetry::new());
    let selector = PolicySelector::new(
        Arc::new(store),
        telemetry.clone(),
        PolicySelectionConfig::default(),
    );
    (selector, telemetry)
}

#[derive(Debug)]
struct UnavailableStore;

impl PolicyStore for UnavailableStore {
    fn current_and_future_policies_by_mac<'a>(
        &'a self,
        _jurisdiction: &'a str,
        _days_ahead: u32,
    ) -> PolicyFuture<'a> {
        Box::pin(async {
            Err::<Vec<PolicyCandidate>, _>(CoverageError::storage(
                "timeout talking to policy database",
            ))
        })
    }
}

#[tokio::test]
async fn test_superseded_and_placeholder_never_selected() {
    let newest = date(2024, 12, 1);
    let candidates = vec![
        // Best score on paper, but replaced
        policy("J5", "L100", newest).superseded_by("L300"),
        PolicyCandidate::new(
            "J5",
            "L200",
            "Skin Substitute Grafts for Chronic Wounds",
            PolicyStatus::Current,
            newest,
            format!("Placeholder. {}", policy_body("wounds")),
        ),
        policy("J5", "L300", date(2024, 6, 1)),
    ];
    let (selector, _) = selector(candidates);
    let selection = selector
        .select_best_policy(&SelectionRequest::new("J5").unwrap())
        .await;

    assert_eq!(
        selection.policy.as_ref().map(|p| p.policy_id.as_str()),
        Some("L300")
    );
    let removed: Vec<(String, usize)> = selection
        .audit
        .filters_applied
        .iter()
        .map(|r| (r.name.clone(), r.removed))
        .collect();
    assert_eq!(
        removed,
        vec![
            ("superseded".to_string(), 1),
            ("placeholder_content".to_string(), 1),
            ("wound_care_relevance".to_string(), 0),
        ]
    );
    assert_eq!(selection.audit.scores.len(), 1);
}

#[tokio::test]
async fn test_real_document_mentioning_tbd_is_selected() {
    let only = PolicyCandidate::new(
        "J5",
        "L39806",
        "Skin Substitute Grafts for Chronic Wounds",
        PolicyStatus::Current,
        date(2024, 11, 1),
        format!(
            "{} The number of applications is to be determined by the treating physician.",
            policy_body("diabetic foot ulcers")
        ),
    );
    let (selector, telemetry) = selector(vec![only]);
    let selection = selector
        .select_best_policy(&SelectionRequest::new("J5").unwrap())
        .await;

    assert_eq!(
        selection.policy.as_ref().map(|p| p.policy_id.as_str()),
        Some("L39806")
    );
    assert_eq!(selection.fallback_used(), None);
    assert_eq!(selection.audit.filters_applied[1].removed, 0);
    assert_eq!(telemetry.snapshot().no_policies_available, 0);
}

#[tokio::test]
async fn test_ties_resolve_to_lowest_id_in_any_order() {
    let mut rng = seeded_rng();
    let mut candidates: Vec<PolicyCandidate> = ["L104", "L101", "L103", "L100", "L102"]
        .iter()
        .map(|id| policy("J5", id, date(2024, 6, 1)))
        .collect();

    for _ in 0..10 {
        candidates.shuffle(&mut rng);
        let (selector, _) = selector(candidates.clone());
        let selection = selector
            .select_best_policy(&SelectionRequest::new("J5").unwrap())
            .await;
        assert_eq!(selection.policy.unwrap().policy_id, "L100");
        let reason = selection.audit.selected_reason.unwrap();
        assert!(reason.contains("tie with 4 candidates"), "{reason}");
    }
}

#[tokio::test]
async fn test_store_failure_is_reported_not_raised() {
    let telemetry = Arc::new(InMemoryTelemetry::new());
    let selector = PolicySelector::new(
        Arc::new(UnavailableStore),
        telemetry.clone(),
        PolicySelectionConfig::default(),
    );
    let selection = selector
        .select_best_policy(&SelectionRequest::new("JF").unwrap())
        .await;
    assert!(selection.policy.is_none());
    assert_eq!(selection.fallback_used(), Some(FallbackReason::ErrorOccurred));
    assert_eq!(telemetry.snapshot().error_occurred, 1);
    assert_eq!(telemetry.snapshot().no_policies_available, 0);
}

#[tokio::test]
async fn test_unknown_jurisdiction_falls_back() {
    let (selector, telemetry) = selector(vec![policy("J5", "L1", date(2024, 6, 1))]);
    let selection = selector
        .select_best_policy(&SelectionRequest::new("J8").unwrap())
        .await;
    assert_eq!(
        selection.fallback_used(),
        Some(FallbackReason::NoPoliciesAvailable)
    );
    assert_eq!(telemetry.fallback_count(FallbackReason::NoPoliciesAvailable), 1);
}

#[tokio::test]
async fn test_unmatched_diagnoses_are_counted_by_category() {
    let (selector, telemetry) = selector(vec![policy("J5", "L1", date(2024, 6, 1))]);
    let request = SelectionRequest::new("J5")
        .unwrap()
        .with_diagnosis_codes(vec!["E11.621".to_string(), "L97.512".to_string()]);
    let selection = selector.select_best_policy(&request).await;
    assert!(selection.policy.is_some());
    assert_eq!(telemetry.unmatched_count("E11"), 1);
    assert_eq!(telemetry.unmatched_count("L97"), 1);
}

#[tokio::test]
async fn test_batch_selection_preserves_request_order() {
    let (selector, _) = selector(vec![
        policy("J5", "L5", date(2024, 6, 1)),
        policy("JF", "LF", date(2024, 6, 1)),
    ]);
    let requests: Vec<SelectionRequest> = ["JF", "J5", "J8", "J5"]
        .iter()
        .map(|j| SelectionRequest::new(j).unwrap())
        .collect();
    let selections = selector.select_best_policies(&requests).await;
    let ids: Vec<Option<String>> = selections
        .into_iter()
        .map(|s| s.policy.map(|p| p.policy_id))
        .collect();
    assert_eq!(
        ids,
        vec![
            Some("LF".to_string()),
            Some("L5".to_string()),
            None,
            Some("L5".to_string()),
        ]
    );
}

#[test]
fn test_malformed_jurisdiction_is_rejected() {
    assert!(matches!(
        SelectionRequest::new("Region 5"),
        Err(CoverageError::InvalidJurisdiction(_))
    ));
}
