//! Binding coverage decision result

use std::fmt;

use serde::Serialize;

use crate::config::PolicyMetadata;
use crate::models::episode::TherapyPhase;

/// Overall outcome of the area-reduction evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallCompliance {
    /// Advanced therapy is medically justified under the LCD
    Compliant,
    /// Advanced therapy is not justified under the LCD
    NonCompliant,
    /// The history does not support a decision
    InsufficientData,
}

impl OverallCompliance {
    /// Snake-case label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compliant => "compliant",
            Self::NonCompliant => "non_compliant",
            Self::InsufficientData => "insufficient_data",
        }
    }
}

impl fmt::Display for OverallCompliance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A measurement used by the decision, reduced to non-identifying facts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleSummary {
    /// Measurement identifier
    pub measurement_id: String,
    /// Days from the phase reference point (baseline or therapy start)
    pub day: f64,
    /// Canonical area in cm²
    pub area_cm2: f64,
}

/// Result of the area-reduction evaluation.
///
/// Built only from the measurement history and phase; advisory output has
/// no path into this type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceResult {
    /// Episode identifier
    pub episode_id: String,
    /// Evaluated phase
    pub phase: TherapyPhase,
    /// Reduction threshold of the phase, in percent
    pub threshold_percent: f64,
    /// Reduction achieved, in percent (negative = growth)
    pub reduction_percent: Option<f64>,
    /// Whether the achieved reduction meets the phase rule
    pub meets_requirement: bool,
    /// Overall decision
    pub overall: OverallCompliance,
    /// Baseline sample
    pub baseline: Option<SampleSummary>,
    /// Comparison sample
    pub comparison: Option<SampleSummary>,
    /// PHI-free audit trail
    pub audit_trail: Vec<String>,
    /// Policy the decision was made under
    pub policy: PolicyMetadata,
}

impl ComplianceResult {
    /// Whether the decision allows advanced therapy
    #[must_use]
    pub fn is_compliant(&self) -> bool {
        self.overall == OverallCompliance::Compliant
    }
}
