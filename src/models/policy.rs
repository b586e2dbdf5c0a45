//! Policy document candidates and selection audit

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Publication status of a policy document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyStatus {
    /// In effect
    Current,
    /// Published with a future effective date
    Future,
    /// Proposed, not final
    Proposed,
    /// Replaced by a later document
    Superseded,
}

impl PolicyStatus {
    /// Status component of the selection score
    #[must_use]
    pub const fn score(self) -> f64 {
        match self {
            Self::Current => 100.0,
            Self::Future => 60.0,
            Self::Proposed => 20.0,
            Self::Superseded => 0.0,
        }
    }

    /// Lower-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Future => "future",
            Self::Proposed => "proposed",
            Self::Superseded => "superseded",
        }
    }
}

/// A policy document returned by the policy store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyCandidate {
    /// MAC jurisdiction code
    pub jurisdiction: String,
    /// Policy identifier (e.g. an LCD id)
    pub policy_id: String,
    /// Document title
    pub title: String,
    /// Publication status
    pub status: PolicyStatus,
    /// Effective date
    pub effective_date: NaiveDate,
    /// Identifier of the replacing document, if any
    #[serde(default)]
    pub superseded_by: Option<String>,
    /// Document text
    #[serde(default)]
    pub content: String,
    /// Content length as reported by the store
    #[serde(default)]
    pub content_length: usize,
}

impl PolicyCandidate {
    /// Create a candidate; `content_length` is taken from `content`
    #[must_use]
    pub fn new(
        jurisdiction: impl Into<String>,
        policy_id: impl Into<String>,
        title: impl Into<String>,
        status: PolicyStatus,
        effective_date: NaiveDate,
        content: impl Into<String>,
    ) -> Self {
        let content = content.into();
        Self {
            jurisdiction: jurisdiction.into(),
            policy_id: policy_id.into(),
            title: title.into(),
            status,
            effective_date,
            superseded_by: None,
            content_length: content.chars().count(),
            content,
        }
    }

    /// Mark the candidate as replaced by another document
    #[must_use]
    pub fn superseded_by(mut self, policy_id: impl Into<String>) -> Self {
        self.superseded_by = Some(policy_id.into());
        self
    }

    /// Effective content length: the smaller of the reported and actual lengths
    #[must_use]
    pub fn effective_content_length(&self) -> usize {
        let actual = self.content.chars().count();
        if self.content_length == 0 {
            actual
        } else {
            actual.min(self.content_length)
        }
    }
}

/// Score breakdown of one surviving candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateScore {
    /// Policy identifier
    pub policy_id: String,
    /// Status component
    pub status: f64,
    /// Recency component
    pub recency: f64,
    /// Applicability component
    pub applicability: f64,
    /// Superseded component (always zero after filtering)
    pub superseded: f64,
    /// Sum of all components
    pub total: f64,
}

/// A filter stage and how many candidates it removed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterRecord {
    /// Filter name
    pub name: String,
    /// Candidates removed
    pub removed: usize,
}

/// Why no policy was selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// No candidates exist or none survived filtering
    NoPoliciesAvailable,
    /// The policy store failed
    ErrorOccurred,
}

impl FallbackReason {
    /// Snake-case label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoPoliciesAvailable => "no_policies_available",
            Self::ErrorOccurred => "error_occurred",
        }
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full audit of one selection call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PolicySelectionAudit {
    /// Jurisdiction requested
    pub jurisdiction: String,
    /// Candidates returned by the store
    pub considered: usize,
    /// Filters applied in order
    pub filters_applied: Vec<FilterRecord>,
    /// Score breakdown of surviving candidates, best first
    pub scores: Vec<CandidateScore>,
    /// Why the selected policy won
    pub selected_reason: Option<String>,
    /// Why nothing was selected
    pub fallback: Option<FallbackReason>,
}

/// Outcome of a selection call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicySelection {
    /// Selected policy, if any
    pub policy: Option<PolicyCandidate>,
    /// Selection audit
    pub audit: PolicySelectionAudit,
}

impl PolicySelection {
    /// Fallback reason of an empty selection
    #[must_use]
    pub fn fallback_used(&self) -> Option<FallbackReason> {
        self.audit.fallback
    }
}
