//! Policy document retrieval
//!
//! The store is an external collaborator; the selector only sees the
//! [`PolicyStore`] trait. An in-memory implementation backs tests and the
//! command-line tool.

use std::future::Future;
use std::pin::Pin;

use chrono::{Days, NaiveDate, Utc};
use rustc_hash::FxHashMap;
use tokio::sync::RwLock;

use crate::error::{CoverageError, Result};
use crate::models::policy::PolicyCandidate;

/// Boxed future returned by store lookups
pub type PolicyFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<PolicyCandidate>>> + Send + 'a>>;

/// Source of policy candidates
pub trait PolicyStore: Send + Sync {
    /// Current and upcoming policies of a MAC jurisdiction.
    ///
    /// Returns every document of the jurisdiction whose effective date is no
    /// later than `days_ahead` days from now, superseded ones included.
    fn current_and_future_policies_by_mac<'a>(
        &'a self,
        jurisdiction: &'a str,
        days_ahead: u32,
    ) -> PolicyFuture<'a>;
}

/// Normalize and check a MAC jurisdiction code (e.g. `J5`, `JF`, `J15`)
pub fn validate_jurisdiction(code: &str) -> Result<String> {
    let normalized = code.trim().to_uppercase();
    let valid = normalized.len() >= 2
        && normalized.len() <= 3
        && normalized.starts_with('J')
        && normalized[1..].chars().all(|c| c.is_ascii_alphanumeric());
    if valid {
        Ok(normalized)
    } else {
        Err(CoverageError::InvalidJurisdiction(code.to_string()))
    }
}

/// In-memory policy store keyed by jurisdiction
#[derive(Debug)]
pub struct InMemoryPolicyStore {
    policies: RwLock<FxHashMap<String, Vec<PolicyCandidate>>>,
    as_of: NaiveDate,
}

impl Default for InMemoryPolicyStore {
    fn default() -> Self {
        Self::new(Utc::now().date_naive())
    }
}

impl InMemoryPolicyStore {
    /// Create an empty store evaluating `days_ahead` from `as_of`
    #[must_use]
    pub fn new(as_of: NaiveDate) -> Self {
        Self {
            policies: RwLock::new(FxHashMap::default()),
            as_of,
        }
    }

    /// Create a store holding `candidates`
    #[must_use]
    pub fn with_policies(as_of: NaiveDate, candidates: Vec<PolicyCandidate>) -> Self {
        let mut map: FxHashMap<String, Vec<PolicyCandidate>> = FxHashMap::default();
        for candidate in candidates {
            map.entry(candidate.jurisdiction.to_uppercase())
                .or_default()
                .push(candidate);
        }
        Self {
            policies: RwLock::new(map),
            as_of,
        }
    }

    /// Add a candidate
    pub async fn insert(&self, candidate: PolicyCandidate) {
        self.policies
            .write()
            .await
            .entry(candidate.jurisdiction.to_uppercase())
            .or_default()
            .push(candidate);
    }

    /// Number of stored candidates
    pub async fn len(&self) -> usize {
        self.policies.read().await.values().map(Vec::len).sum()
    }

    /// Whether the store is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl PolicyStore for InMemoryPolicyStore {
    fn current_and_future_policies_by_mac<'a>(
        &'a self,
        jurisdiction: &'a str,
        days_ahead: u32,
    ) -> PolicyFuture<'a> {
        Box::pin(async move {
            let jurisdiction = validate_jurisdiction(jurisdiction)?;
            let horizon = self
                .as_of
                .checked_add_days(Days::new(u64::from(days_ahead)))
                .unwrap_or(NaiveDate::MAX);
            let policies = self.policies.read().await;
            let found: Vec<PolicyCandidate> = policies
                .get(&jurisdiction)
                .map(|list| {
                    list.iter()
                        .filter(|p| p.effective_date <= horizon)
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            Ok::<_, CoverageError>(found)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::policy::PolicyStatus;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_validate_jurisdiction() {
        assert_eq!(validate_jurisdiction(" jf ").unwrap(), "JF");
        assert_eq!(validate_jurisdiction("J15").unwrap(), "J15");
        assert!(validate_jurisdiction("K5").is_err());
        assert!(validate_jurisdiction("J").is_err());
        assert!(validate_jurisdiction("J5-X").is_err());
    }

    #[tokio::test]
    async fn test_days_ahead_horizon() {
        let store = InMemoryPolicyStore::with_policies(
            date(2025, 1, 1),
            vec![
                PolicyCandidate::new("J5", "L1", "A", PolicyStatus::Current, date(2024, 6, 1), ""),
                PolicyCandidate::new("J5", "L2", "B", PolicyStatus::Future, date(2025, 3, 1), ""),
                PolicyCandidate::new("J5", "L3", "C", PolicyStatus::Future, date(2025, 9, 1), ""),
                PolicyCandidate::new("JF", "L4", "D", PolicyStatus::Current, date(2024, 6, 1), ""),
            ],
        );
        let found = store.current_and_future_policies_by_mac("j5", 90).await.unwrap();
        let ids: Vec<&str> = found.iter().map(|p| p.policy_id.as_str()).collect();
        assert_eq!(ids, vec!["L1", "L2"]);
        assert_eq!(store.len().await, 4);
        assert!(store.current_and_future_policies_by_mac("X1", 90).await.is_err());
    }
}
