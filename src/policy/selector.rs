//! Best-policy selection
//!
//! Fetch, filter, score, select. Store failures and empty corpora end in a
//! fallback selection instead of an error; both are counted by the injected
//! telemetry sink.

use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::config::PolicySelectionConfig;
use crate::filter::policy_exclusion_chain;
use crate::models::policy::{FallbackReason, PolicySelection, PolicySelectionAudit};
use crate::policy::scoring::{code_category, match_diagnosis_codes, score_candidates};
use crate::policy::store::PolicyStore;
use crate::policy::telemetry::TelemetrySink;
use crate::policy::SelectionRequest;

/// Selects the best-matching policy document for a request
pub struct PolicySelector {
    store: Arc<dyn PolicyStore>,
    telemetry: Arc<dyn TelemetrySink>,
    config: PolicySelectionConfig,
}

impl std::fmt::Debug for PolicySelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicySelector")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PolicySelector {
    /// Create a selector over `store`, reporting to `telemetry`
    #[must_use]
    pub fn new(
        store: Arc<dyn PolicyStore>,
        telemetry: Arc<dyn TelemetrySink>,
        config: PolicySelectionConfig,
    ) -> Self {
        Self {
            store,
            telemetry,
            config,
        }
    }

    /// Selection settings
    #[must_use]
    pub fn config(&self) -> &PolicySelectionConfig {
        &self.config
    }

    fn fallback(&self, mut audit: PolicySelectionAudit, reason: FallbackReason) -> PolicySelection {
        self.telemetry.record_fallback(reason);
        audit.fallback = Some(reason);
        PolicySelection {
            policy: None,
            audit,
        }
    }

    /// Select the best policy for `request`.
    ///
    /// Never fails: a store error yields an `error_occurred` fallback and an
    /// empty or fully filtered corpus a `no_policies_available` fallback.
    pub async fn select_best_policy(&self, request: &SelectionRequest) -> PolicySelection {
        debug_assert!(crate::policy::store::validate_jurisdiction(&request.jurisdiction).is_ok());
        let mut audit = PolicySelectionAudit {
            jurisdiction: request.jurisdiction.clone(),
            ..PolicySelectionAudit::default()
        };

        let candidates = match self
            .store
            .current_and_future_policies_by_mac(&request.jurisdiction, self.config.days_ahead)
            .await
        {
            Ok(candidates) => candidates,
            Err(e) => {
                log::warn!(
                    "Policy store failed for jurisdiction {}: {e}",
                    request.jurisdiction
                );
                return self.fallback(audit, FallbackReason::ErrorOccurred);
            }
        };
        audit.considered = candidates.len();

        let (survivors, records) =
            policy_exclusion_chain(self.config.min_content_length).run(candidates);
        audit.filters_applied = records;
        if survivors.is_empty() {
            log::info!(
                "No usable policy for jurisdiction {} ({} considered)",
                request.jurisdiction,
                audit.considered
            );
            return self.fallback(audit, FallbackReason::NoPoliciesAvailable);
        }

        audit.scores = score_candidates(&survivors, request, &self.config);
        let Some(best) = audit.scores.first() else {
            return self.fallback(audit, FallbackReason::NoPoliciesAvailable);
        };
        let tied = audit
            .scores
            .iter()
            .skip(1)
            .take_while(|s| s.total.total_cmp(&best.total).is_eq())
            .count();
        let mut reason = format!(
            "highest total score {:.1} (status {:.0}, recency {:.1}, applicability {:.1})",
            best.total, best.status, best.recency, best.applicability
        );
        if tied > 0 {
            reason.push_str(&format!("; tie with {tied} candidates broken by policy id"));
        }
        let best_id = best.policy_id.clone();
        audit.selected_reason = Some(reason);

        let policy = survivors.into_iter().find(|p| p.policy_id == best_id);
        if let Some(selected) = &policy {
            let codes = match_diagnosis_codes(selected, &request.diagnosis_codes);
            for code in &codes.unmatched {
                self.telemetry.record_unmatched_diagnosis(&code_category(code));
            }
            log::info!(
                "Selected policy {} for jurisdiction {}",
                selected.policy_id,
                request.jurisdiction
            );
        }
        PolicySelection { policy, audit }
    }

    /// Select policies for many requests concurrently, in request order
    pub async fn select_best_policies(&self, requests: &[SelectionRequest]) -> Vec<PolicySelection> {
        let mut results: Vec<(usize, PolicySelection)> = stream::iter(requests.iter().enumerate())
            .map(|(i, request)| async move { (i, self.select_best_policy(request).await) })
            .buffer_unordered(num_cpus::get())
            .collect()
            .await;
        results.sort_by_key(|(i, _)| *i);
        results.into_iter().map(|(_, selection)| selection).collect()
    }
}
