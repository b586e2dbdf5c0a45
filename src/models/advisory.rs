//! Advisory alert model
//!
//! Alerts describe depth or volume deterioration. They are always labeled
//! advisory and are never consulted by the binding coverage decision.

use std::fmt;

use serde::Serialize;
use smallvec::SmallVec;

/// Label carried by every advisory alert and audit entry
pub const ADVISORY_LABEL: &str = "ADVISORY ONLY";

/// Urgency of an advisory alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyTier {
    /// Worth noting at the next visit
    Minor = 1,
    /// Review soon
    Moderate = 2,
    /// Review promptly
    Urgent = 3,
    /// Review immediately
    Critical = 4,
}

impl UrgencyTier {
    /// Whether this tier counts as high urgency
    #[must_use]
    pub const fn is_high_urgency(self) -> bool {
        matches!(self, Self::Urgent | Self::Critical)
    }

    /// Lower-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minor => "minor",
            Self::Moderate => "moderate",
            Self::Urgent => "urgent",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for UrgencyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an alert is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Weekly rate of depth increase
    DepthRate,
    /// Absolute depth increase over two weeks
    DepthAbsoluteChange,
    /// Volume expansion over four weeks
    VolumeExpansion,
    /// Large depth jump between adjacent readings
    AcuteDeterioration,
}

impl AlertKind {
    /// Human-readable name
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::DepthRate => "depth increase rate",
            Self::DepthAbsoluteChange => "absolute depth increase",
            Self::VolumeExpansion => "volume expansion",
            Self::AcuteDeterioration => "acute depth deterioration",
        }
    }
}

/// Why an alert was not issued
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum PreventionReason {
    /// Too few measurements for the tier
    InsufficientMeasurements {
        /// Required count
        required: usize,
        /// Available count
        actual: usize,
    },
    /// Trend confidence below the tier minimum
    LowConfidence {
        /// Required confidence
        required: f64,
        /// Computed confidence
        actual: f64,
    },
    /// Quality score below the tier minimum
    LowQuality {
        /// Required quality
        required: f64,
        /// Assessed quality
        actual: f64,
    },
    /// Not enough consecutive confirming intervals
    InsufficientConsecutive {
        /// Required intervals
        required: usize,
        /// Confirmed intervals
        actual: usize,
    },
    /// The quality assessment disallows urgent and critical tiers
    HighUrgencyDisallowed,
}

impl fmt::Display for PreventionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientMeasurements { required, actual } => {
                write!(f, "insufficient measurements ({actual} < {required})")
            }
            Self::LowConfidence { required, actual } => {
                write!(f, "confidence {actual:.2} below {required:.2}")
            }
            Self::LowQuality { required, actual } => {
                write!(f, "quality {actual:.2} below {required:.2}")
            }
            Self::InsufficientConsecutive { required, actual } => {
                write!(f, "consecutive confirmations {actual} < {required}")
            }
            Self::HighUrgencyDisallowed => {
                write!(f, "measurement quality does not allow high-urgency alerts")
            }
        }
    }
}

/// Prevention reasons rarely exceed four entries
pub type PreventionReasons = SmallVec<[PreventionReason; 4]>;

/// An advisory alert candidate and its gating outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisoryAlert {
    /// What the alert is about
    pub kind: AlertKind,
    /// Urgency tier
    pub tier: UrgencyTier,
    /// Observed value (mm/week, mm, or percent depending on kind)
    pub observed_value: f64,
    /// Quality score of the history
    pub quality_score: f64,
    /// Statistical confidence of the trend
    pub confidence_score: f64,
    /// Consecutive confirming intervals
    pub consecutive_confirmations: usize,
    /// Whether the alert should be shown
    pub should_issue: bool,
    /// Why it should not be shown
    pub prevention_reasons: PreventionReasons,
    /// Issued through the acute-deterioration override
    pub safety_override: bool,
    label: &'static str,
}

impl AdvisoryAlert {
    /// Create an alert candidate; `should_issue` follows the prevention reasons
    #[must_use]
    pub fn new(
        kind: AlertKind,
        tier: UrgencyTier,
        observed_value: f64,
        quality_score: f64,
        confidence_score: f64,
        consecutive_confirmations: usize,
        prevention_reasons: PreventionReasons,
    ) -> Self {
        Self {
            kind,
            tier,
            observed_value,
            quality_score,
            confidence_score,
            consecutive_confirmations,
            should_issue: prevention_reasons.is_empty(),
            prevention_reasons,
            safety_override: false,
            label: ADVISORY_LABEL,
        }
    }

    /// Create an alert issued through the safety override
    #[must_use]
    pub fn safety_override(
        observed_value: f64,
        quality_score: f64,
        confidence_score: f64,
    ) -> Self {
        Self {
            kind: AlertKind::AcuteDeterioration,
            tier: UrgencyTier::Critical,
            observed_value,
            quality_score,
            confidence_score,
            consecutive_confirmations: 1,
            should_issue: true,
            prevention_reasons: PreventionReasons::new(),
            safety_override: true,
            label: ADVISORY_LABEL,
        }
    }

    /// The advisory label; always [`ADVISORY_LABEL`]
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Always true: alerts never carry coverage weight
    #[must_use]
    pub const fn is_advisory(&self) -> bool {
        true
    }
}
