//! Selection telemetry
//!
//! Counters are injected into the selector so that several selectors (or
//! several threads) can share or later merge them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::models::policy::FallbackReason;

/// Receiver of selection events
pub trait TelemetrySink: Send + Sync {
    /// A selection ended without a policy
    fn record_fallback(&self, reason: FallbackReason);

    /// A requested diagnosis code category was not found in the selected policy
    fn record_unmatched_diagnosis(&self, category: &str);
}

/// Sink that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTelemetry;

impl TelemetrySink for NullTelemetry {
    fn record_fallback(&self, _reason: FallbackReason) {}

    fn record_unmatched_diagnosis(&self, _category: &str) {}
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TelemetrySnapshot {
    /// Selections without any usable candidate
    pub no_policies_available: u64,
    /// Selections aborted by a store failure
    pub error_occurred: u64,
    /// Unmatched diagnosis codes per category
    pub unmatched_diagnoses: Vec<(String, u64)>,
}

/// Thread-safe in-memory counters
#[derive(Debug, Default)]
pub struct InMemoryTelemetry {
    no_policies_available: AtomicU64,
    error_occurred: AtomicU64,
    unmatched: Mutex<FxHashMap<String, u64>>,
}

impl InMemoryTelemetry {
    /// Create zeroed counters
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, reason: FallbackReason) -> &AtomicU64 {
        match reason {
            FallbackReason::NoPoliciesAvailable => &self.no_policies_available,
            FallbackReason::ErrorOccurred => &self.error_occurred,
        }
    }

    /// Fallbacks recorded for `reason`
    #[must_use]
    pub fn fallback_count(&self, reason: FallbackReason) -> u64 {
        self.counter(reason).load(Ordering::Relaxed)
    }

    /// Unmatched diagnoses recorded for `category`
    #[must_use]
    pub fn unmatched_count(&self, category: &str) -> u64 {
        self.unmatched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(category)
            .copied()
            .unwrap_or(0)
    }

    /// Add every counter of `other` into `self`
    pub fn merge(&self, other: &Self) {
        for reason in [FallbackReason::NoPoliciesAvailable, FallbackReason::ErrorOccurred] {
            self.counter(reason)
                .fetch_add(other.fallback_count(reason), Ordering::Relaxed);
        }
        let theirs = other
            .unmatched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let mut ours = self.unmatched.lock().unwrap_or_else(PoisonError::into_inner);
        for (category, count) in theirs {
            *ours.entry(category).or_insert(0) += count;
        }
    }

    /// Copy of all counters, categories sorted
    #[must_use]
    pub fn snapshot(&self) -> TelemetrySnapshot {
        let mut unmatched_diagnoses: Vec<(String, u64)> = self
            .unmatched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        unmatched_diagnoses.sort();
        TelemetrySnapshot {
            no_policies_available: self.fallback_count(FallbackReason::NoPoliciesAvailable),
            error_occurred: self.fallback_count(FallbackReason::ErrorOccurred),
            unmatched_diagnoses,
        }
    }
}

impl TelemetrySink for InMemoryTelemetry {
    fn record_fallback(&self, reason: FallbackReason) {
        self.counter(reason).fetch_add(1, Ordering::Relaxed);
    }

    fn record_unmatched_diagnosis(&self, category: &str) {
        *self
            .unmatched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(category.to_string())
            .or_insert(0) += 1;
    }
}
