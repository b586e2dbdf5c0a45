//! Diabetic foot classification context
//!
//! The Wagner grade and University of Texas (UT) staging are computed
//! upstream and consumed here as typed input. This module only combines them
//! into an expected healing time and a PHI-free audit summary.

use std::fmt;

use serde::{Deserialize, Serialize};

/// University of Texas stage (infection / ischemia modifier)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UtStage {
    /// Clean wound
    A,
    /// Infected
    B,
    /// Ischemic
    C,
    /// Infected and ischemic
    D,
}

impl UtStage {
    /// Healing-time multiplier of the stage
    #[must_use]
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::A => 1.0,
            Self::B => 1.3,
            Self::C => 1.5,
            Self::D => 2.0,
        }
    }
}

impl fmt::Display for UtStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Overall amputation / complication risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Low risk
    Low,
    /// Moderate risk
    Moderate,
    /// High risk
    High,
    /// Critical risk
    Critical,
}

impl RiskLevel {
    /// Healing-time multiplier of the risk level
    #[must_use]
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Low => 1.0,
            Self::Moderate => 1.2,
            Self::High => 1.5,
            Self::Critical => 2.0,
        }
    }

    /// Lower-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Base healing days for a Wagner grade (0-5; higher grades saturate)
#[must_use]
pub const fn wagner_base_days(grade: u8) -> u32 {
    match grade {
        0 => 14,
        1 => 28,
        2 => 42,
        3 => 70,
        4 => 112,
        _ => 140,
    }
}

/// Base healing days for a UT grade (0-3; higher grades saturate)
#[must_use]
pub const fn ut_grade_base_days(grade: u8) -> u32 {
    match grade {
        0 => 14,
        1 => 28,
        2 => 42,
        _ => 70,
    }
}

/// Expected healing time in days.
///
/// The larger of the two base estimates is scaled by the UT stage and the
/// risk multipliers and rounded to whole days.
#[must_use]
pub fn calculate_expected_healing_time(
    wagner_grade: u8,
    ut_stage: UtStage,
    ut_grade: u8,
    risk: RiskLevel,
) -> u32 {
    let base = wagner_base_days(wagner_grade).max(ut_grade_base_days(ut_grade));
    let days = f64::from(base) * ut_stage.multiplier() * risk.multiplier();
    // Bounded by 140 × 2 × 2
    days.round() as u32
}

/// Diabetic classification produced upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiabeticClassification {
    /// Wagner grade (0-5)
    pub wagner_grade: u8,
    /// UT grade (0-3)
    pub ut_grade: u8,
    /// UT stage (A-D)
    pub ut_stage: UtStage,
    /// Overall risk
    pub risk: RiskLevel,
}

impl DiabeticClassification {
    /// Create a classification
    #[must_use]
    pub const fn new(wagner_grade: u8, ut_grade: u8, ut_stage: UtStage, risk: RiskLevel) -> Self {
        Self {
            wagner_grade,
            ut_grade,
            ut_stage,
            risk,
        }
    }

    /// Expected healing time of this classification
    #[must_use]
    pub fn expected_healing_days(&self) -> u32 {
        calculate_expected_healing_time(self.wagner_grade, self.ut_stage, self.ut_grade, self.risk)
    }

    /// One-line audit summary
    #[must_use]
    pub fn audit_summary(&self) -> String {
        format!(
            "Diabetic classification: Wagner grade {}, UT {}{}, {} risk; expected healing time {} days",
            self.wagner_grade,
            self.ut_grade,
            self.ut_stage,
            self.risk.as_str(),
            self.expected_healing_days()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_healing_time_examples() {
        assert_eq!(
            calculate_expected_healing_time(2, UtStage::A, 2, RiskLevel::Moderate),
            50
        );
        assert_eq!(
            calculate_expected_healing_time(3, UtStage::D, 3, RiskLevel::Critical),
            280
        );
    }

    #[test]
    fn test_larger_base_wins() {
        assert_eq!(
            calculate_expected_healing_time(4, UtStage::A, 0, RiskLevel::Low),
            112
        );
        assert_eq!(
            calculate_expected_healing_time(0, UtStage::B, 3, RiskLevel::Low),
            91
        );
    }

    #[test]
    fn test_classification_serde_and_summary() {
        let json = r#"{"wagner_grade":2,"ut_grade":2,"ut_stage":"A","risk":"moderate"}"#;
        let c: DiabeticClassification = serde_json::from_str(json).unwrap();
        assert_eq!(c.expected_healing_days(), 50);
        assert_eq!(
            c.audit_summary(),
            "Diabetic classification: Wagner grade 2, UT 2A, moderate risk; expected healing time 50 days"
        );
    }
}
