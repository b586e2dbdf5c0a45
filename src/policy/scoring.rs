//! Multi-factor policy scoring
//!
//! Total = status + recency + applicability + superseded. Recency is
//! relative to the newest surviving candidate; applicability adds tunable
//! boosts for clinical fit with the request.

use std::cmp::Ordering;

use chrono::NaiveDate;
use itertools::Itertools;
use smallvec::SmallVec;

use crate::algorithm::compliance::WoundType;
use crate::config::{ApplicabilityWeights, PolicySelectionConfig};
use crate::filter::WoundCareRelevanceFilter;
use crate::models::policy::{CandidateScore, PolicyCandidate};
use crate::policy::SelectionRequest;

/// Diagnosis codes of one request matched against one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosisMatch {
    /// Codes found in the document
    pub matched: SmallVec<[String; 4]>,
    /// Codes not found in the document
    pub unmatched: SmallVec<[String; 4]>,
}

/// Normalize a diagnosis code to `A00.000` form
#[must_use]
pub fn canonical_code(code: &str) -> String {
    let compact: String = code
        .trim()
        .chars()
        .filter(|c| *c != '.')
        .flat_map(char::to_uppercase)
        .collect();
    if compact.len() > 3 && compact.is_ascii() {
        format!("{}.{}", &compact[..3], &compact[3..])
    } else {
        compact
    }
}

/// Three-character category of a diagnosis code
#[must_use]
pub fn code_category(code: &str) -> String {
    canonical_code(code).chars().take(3).collect()
}

/// Which request codes appear in the document, by full code or category
#[must_use]
pub fn match_diagnosis_codes(candidate: &PolicyCandidate, codes: &[String]) -> DiagnosisMatch {
    let content = candidate.content.to_uppercase();
    let mut result = DiagnosisMatch::default();
    for code in codes {
        let canonical = canonical_code(code);
        if canonical.is_empty() {
            continue;
        }
        if content.contains(&canonical) || content.contains(&code_category(code)) {
            result.matched.push(canonical);
        } else {
            result.unmatched.push(canonical);
        }
    }
    result
}

/// Recency points: the newest candidate gets `recency_max`, minus one point
/// per `recency_days_per_point` days older, floored at zero.
#[must_use]
pub fn recency_score(effective: NaiveDate, newest: NaiveDate, config: &PolicySelectionConfig) -> f64 {
    let days_older = (newest - effective).num_days().max(0) as f64;
    (config.recency_max - days_older / config.recency_days_per_point).max(0.0)
}

fn title_terms(wound_type: WoundType) -> &'static [&'static str] {
    match wound_type {
        WoundType::DiabeticFootUlcer => &["diabetic", "foot ulcer"],
        WoundType::VenousLegUlcer => &["venous", "leg ulcer"],
        WoundType::PressureUlcer => &["pressure"],
        WoundType::Traumatic => &["trauma"],
        WoundType::Surgical => &["surgical"],
        WoundType::Unclassified => &[],
    }
}

/// Clinical applicability of a candidate for a request
#[must_use]
pub fn applicability_score(
    candidate: &PolicyCandidate,
    request: &SelectionRequest,
    weights: &ApplicabilityWeights,
) -> f64 {
    let title = candidate.title.to_lowercase();
    let content = candidate.content.to_lowercase();

    let keywords = WoundCareRelevanceFilter::matching_terms(candidate) as f64;
    let mut score = (keywords * weights.keyword).min(weights.keyword_cap);

    if let Some(wound_type) = request.wound_type {
        if title_terms(wound_type).iter().any(|t| title.contains(t)) {
            score += weights.wound_type_title;
        }
    }
    if request.patient.diabetic && (content.contains("diabetic") || content.contains("diabetes")) {
        score += weights.diabetic_match;
    }
    if request.patient.venous_disease && content.contains("venous") {
        score += weights.venous_match;
    }
    if let Some(location) = request.location {
        if location.keywords().iter().any(|k| content.contains(k)) {
            score += weights.location_match;
        }
    }
    let codes = match_diagnosis_codes(candidate, &request.diagnosis_codes);
    score += (codes.matched.len() as f64 * weights.diagnosis_code).min(weights.diagnosis_code_cap);

    score
}

/// Score breakdown of every candidate, best first (ties by ascending id)
#[must_use]
pub fn score_candidates(
    candidates: &[PolicyCandidate],
    request: &SelectionRequest,
    config: &PolicySelectionConfig,
) -> Vec<CandidateScore> {
    let Some(newest) = candidates.iter().map(|c| c.effective_date).max() else {
        return Vec::new();
    };
    candidates
        .iter()
        .map(|candidate| {
            let status = candidate.status.score();
            let recency = recency_score(candidate.effective_date, newest, config);
            let applicability = applicability_score(candidate, request, &config.applicability);
            // Superseded candidates never reach scoring
            let superseded = 0.0;
            CandidateScore {
                policy_id: candidate.policy_id.clone(),
                status,
                recency,
                applicability,
                superseded,
                total: status + recency + applicability + superseded,
            }
        })
        .sorted_by(rank_order)
        .collect()
}

/// Ranking order: higher total first, then ascending policy id
#[must_use]
pub fn rank_order(a: &CandidateScore, b: &CandidateScore) -> Ordering {
    b.total
        .total_cmp(&a.total)
        .then_with(|| a.policy_id.cmp(&b.policy_id))
}
