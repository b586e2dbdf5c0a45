//! Exclusion filters for policy candidates
//!
//! Superseded documents, placeholder or truncated content and documents
//! unrelated to wound care never reach scoring.

use crate::filter::generic::{Filter, FilterChain};
use crate::models::policy::{PolicyCandidate, PolicyStatus};

/// Text markers of a placeholder document body
const PLACEHOLDER_MARKERS: [&str; 6] = [
    "placeholder",
    "lorem ipsum",
    "content not available",
    "to be determined",
    "coming soon",
    "[tbd]",
];

/// Terms that make a document relevant to wound-care coverage
const WOUND_CARE_TERMS: [&str; 8] = [
    "wound",
    "ulcer",
    "skin substitute",
    "cellular and tissue",
    "tissue-based product",
    "ctp",
    "dermal",
    "graft",
];

/// Excludes candidates carrying a superseded-by pointer or status
#[derive(Debug, Clone, Copy, Default)]
pub struct SupersededFilter;

impl Filter<PolicyCandidate> for SupersededFilter {
    fn name(&self) -> &'static str {
        "superseded"
    }

    fn keep(&self, item: &PolicyCandidate) -> bool {
        item.superseded_by.is_none() && item.status != PolicyStatus::Superseded
    }
}

/// Excludes placeholder bodies and content shorter than a minimum
#[derive(Debug, Clone, Copy)]
pub struct PlaceholderContentFilter {
    min_content_length: usize,
}

impl PlaceholderContentFilter {
    /// Create a filter with the given minimum number of characters
    #[must_use]
    pub const fn new(min_content_length: usize) -> Self {
        Self { min_content_length }
    }

    /// Whether a body reads as placeholder text.
    ///
    /// Only a body that is, or opens with, a marker counts; markers inside
    /// running prose are ignored.
    #[must_use]
    pub fn is_placeholder(content: &str) -> bool {
        let text = content.trim().to_lowercase();
        let text = text.trim_start_matches(|c: char| !c.is_alphanumeric() && c != '[');
        text.is_empty() || PLACEHOLDER_MARKERS.iter().any(|m| text.starts_with(m))
    }
}

impl Filter<PolicyCandidate> for PlaceholderContentFilter {
    fn name(&self) -> &'static str {
        "placeholder_content"
    }

    fn keep(&self, item: &PolicyCandidate) -> bool {
        item.effective_content_length() >= self.min_content_length
            && !Self::is_placeholder(&item.content)
    }
}

/// Excludes documents that do not mention wound care
#[derive(Debug, Clone, Copy, Default)]
pub struct WoundCareRelevanceFilter;

impl WoundCareRelevanceFilter {
    /// Number of distinct wound-care terms in title and content
    #[must_use]
    pub fn matching_terms(candidate: &PolicyCandidate) -> usize {
        let text = format!("{} {}", candidate.title, candidate.content).to_lowercase();
        WOUND_CARE_TERMS.iter().filter(|t| text.contains(*t)).count()
    }
}

impl Filter<PolicyCandidate> for WoundCareRelevanceFilter {
    fn name(&self) -> &'static str {
        "wound_care_relevance"
    }

    fn keep(&self, item: &PolicyCandidate) -> bool {
        Self::matching_terms(item) > 0
    }
}

/// The exclusion stages applied before scoring, in order
#[must_use]
pub fn policy_exclusion_chain(min_content_length: usize) -> FilterChain<PolicyCandidate> {
    FilterChain::new()
        .with_stage(SupersededFilter)
        .with_stage(PlaceholderContentFilter::new(min_content_length))
        .with_stage(WoundCareRelevanceFilter)
}
