//! Configuration for the coverage engine.
//!
//! All thresholds are plain data with defaults matching LCD L39806. A
//! configuration can be loaded from JSON; omitted sections fall back to
//! their defaults.

use std::fmt;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{CoverageError, Result};

/// Fixed identifiers of the coverage policy the engine evaluates against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyMetadata {
    /// LCD identifier cited in every audit trail
    pub lcd_id: String,
    /// MAC jurisdiction codes the LCD applies to
    pub jurisdictions: Vec<String>,
}

impl Default for PolicyMetadata {
    fn default() -> Self {
        Self {
            lcd_id: "L39806".to_string(),
            jurisdictions: ["J5", "J8", "JF", "JJ", "JM"]
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Thresholds for the binding area-reduction and timeline decisions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceThresholds {
    /// Pre-therapy reduction (percent) at which conservative care counts as effective
    pub pre_therapy_reduction_percent: f64,
    /// Post-therapy reduction (percent) required to continue therapy
    pub post_therapy_reduction_percent: f64,
    /// Target day of the comparison measurement
    pub target_day: f64,
    /// Half-width of the preferred window around the target day
    pub window_tolerance_days: f64,
    /// Minimum days of conservative care before advanced therapy
    pub min_conservative_care_days: i64,
}

impl Default for ComplianceThresholds {
    fn default() -> Self {
        Self {
            pre_therapy_reduction_percent: 50.0,
            post_therapy_reduction_percent: 20.0,
            target_day: 28.0,
            window_tolerance_days: 7.0,
            min_conservative_care_days: 28,
        }
    }
}

/// Thresholds used by the measurement quality assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityThresholds {
    /// Days before the latest entry that the assessment looks back
    pub assessment_window_days: f64,
    /// Modified z-score above which a value is an outlier
    pub outlier_z_score: f64,
    /// Gap (days) between consecutive entries considered moderate
    pub moderate_gap_days: f64,
    /// Gap (days) between consecutive entries considered severe
    pub severe_gap_days: f64,
    /// Lowest consistency score reported
    pub consistency_floor: f64,
    /// Outlier rate above which high-urgency alerts are disallowed
    pub max_outlier_rate: f64,
    /// Validation rate below which high-urgency alerts are disallowed
    pub min_validation_rate: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            assessment_window_days: 90.0,
            outlier_z_score: 3.5,
            moderate_gap_days: 14.0,
            severe_gap_days: 28.0,
            consistency_floor: 0.2,
            max_outlier_rate: 0.2,
            min_validation_rate: 0.5,
        }
    }
}

/// Gate applied before an advisory alert of a given tier may be issued
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertGate {
    /// Minimum number of depth measurements
    pub min_measurements: usize,
    /// Minimum statistical confidence (0-1)
    pub min_confidence: f64,
    /// Minimum quality score (0-1)
    pub min_quality: f64,
    /// Minimum consecutive confirming intervals
    pub min_consecutive: usize,
}

/// Thresholds for the depth/volume advisory engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisoryThresholds {
    /// Weekly depth increase (mm) for a minor alert
    pub rate_minor_mm: f64,
    /// Weekly depth increase (mm) for a moderate alert
    pub rate_moderate_mm: f64,
    /// Weekly depth increase (mm) for a critical alert
    pub rate_critical_mm: f64,
    /// Two-week absolute increase (mm) requiring immediate review
    pub absolute_immediate_mm: f64,
    /// Two-week absolute increase (mm) for an urgent alert
    pub absolute_urgent_mm: f64,
    /// Two-week absolute increase (mm) for a critical alert
    pub absolute_critical_mm: f64,
    /// Window (days) of the absolute-change check
    pub absolute_window_days: f64,
    /// Four-week volume increase (percent) for a minor alert
    pub volume_minor_percent: f64,
    /// Four-week volume increase (percent) for a moderate alert
    pub volume_moderate_percent: f64,
    /// Four-week volume increase (percent) for a major alert
    pub volume_major_percent: f64,
    /// Window (days) of the volume check
    pub volume_window_days: f64,
    /// Maximum interval (days) between readings for the acute safety override
    pub acute_interval_days: f64,
    /// Gate for the minor tier
    pub standard_gate: AlertGate,
    /// Gate for the moderate tier
    pub moderate_gate: AlertGate,
    /// Gate for the urgent tier
    pub urgent_gate: AlertGate,
    /// Gate for the critical tier
    pub critical_gate: AlertGate,
}

impl Default for AdvisoryThresholds {
    fn default() -> Self {
        Self {
            rate_minor_mm: 0.5,
            rate_moderate_mm: 1.0,
            rate_critical_mm: 2.0,
            absolute_immediate_mm: 2.0,
            absolute_urgent_mm: 3.0,
            absolute_critical_mm: 5.0,
            absolute_window_days: 14.0,
            volume_minor_percent: 20.0,
            volume_moderate_percent: 35.0,
            volume_major_percent: 50.0,
            volume_window_days: 28.0,
            acute_interval_days: 7.0,
            standard_gate: AlertGate {
                min_measurements: 2,
                min_confidence: 0.5,
                min_quality: 0.6,
                min_consecutive: 1,
            },
            moderate_gate: AlertGate {
                min_measurements: 2,
                min_confidence: 0.5,
                min_quality: 0.6,
                min_consecutive: 2,
            },
            urgent_gate: AlertGate {
                min_measurements: 3,
                min_confidence: 0.6,
                min_quality: 0.7,
                min_consecutive: 2,
            },
            critical_gate: AlertGate {
                min_measurements: 4,
                min_confidence: 0.75,
                min_quality: 0.8,
                min_consecutive: 3,
            },
        }
    }
}

/// Additive boosts for clinical applicability of a policy document.
///
/// Only the relative ordering of these weights matters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicabilityWeights {
    /// Points per wound-care keyword found (capped)
    pub keyword: f64,
    /// Cap on keyword points
    pub keyword_cap: f64,
    /// Wound type named in the title
    pub wound_type_title: f64,
    /// Diabetic patient and diabetic-specific content
    pub diabetic_match: f64,
    /// Venous disease and venous-specific content
    pub venous_match: f64,
    /// Wound location mentioned in content
    pub location_match: f64,
    /// Points per diagnosis code found in content
    pub diagnosis_code: f64,
    /// Cap on diagnosis code points
    pub diagnosis_code_cap: f64,
}

impl Default for ApplicabilityWeights {
    fn default() -> Self {
        Self {
            keyword: 2.0,
            keyword_cap: 10.0,
            wound_type_title: 15.0,
            diabetic_match: 25.0,
            venous_match: 25.0,
            location_match: 5.0,
            diagnosis_code: 10.0,
            diagnosis_code_cap: 20.0,
        }
    }
}

/// Configuration of the policy selector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySelectionConfig {
    /// Minimum number of content characters for a real policy document
    pub min_content_length: usize,
    /// How far ahead future policies are fetched
    pub days_ahead: u32,
    /// Recency points of the newest candidate
    pub recency_max: f64,
    /// Days of age that cost one recency point
    pub recency_days_per_point: f64,
    /// Applicability boosts
    pub applicability: ApplicabilityWeights,
}

impl Default for PolicySelectionConfig {
    fn default() -> Self {
        Self {
            min_content_length: 1000,
            days_ahead: 90,
            recency_max: 30.0,
            recency_days_per_point: 30.0,
            applicability: ApplicabilityWeights::default(),
        }
    }
}

/// Configuration for the whole engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    /// Policy identifiers cited in audit trails
    pub policy: PolicyMetadata,
    /// Binding decision thresholds
    pub compliance: ComplianceThresholds,
    /// Quality assessment thresholds
    pub quality: QualityThresholds,
    /// Advisory engine thresholds
    pub advisory: AdvisoryThresholds,
    /// Policy selection settings
    pub selection: PolicySelectionConfig,
}

impl CoverageConfig {
    /// Parse a configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Check cross-field consistency
    pub fn validate(&self) -> Result<()> {
        if self.policy.lcd_id.trim().is_empty() {
            return Err(CoverageError::Config("policy.lcd_id must not be empty".into()));
        }
        let a = &self.advisory;
        if !(a.rate_minor_mm <= a.rate_moderate_mm && a.rate_moderate_mm <= a.rate_critical_mm) {
            return Err(CoverageError::Config(
                "advisory rate tiers must be non-decreasing".into(),
            ));
        }
        if !(a.absolute_immediate_mm <= a.absolute_urgent_mm
            && a.absolute_urgent_mm <= a.absolute_critical_mm)
        {
            return Err(CoverageError::Config(
                "advisory absolute-change tiers must be non-decreasing".into(),
            ));
        }
        if !(a.volume_minor_percent <= a.volume_moderate_percent
            && a.volume_moderate_percent <= a.volume_major_percent)
        {
            return Err(CoverageError::Config(
                "advisory volume tiers must be non-decreasing".into(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for CoverageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Coverage Configuration:")?;
        writeln!(f, "  LCD: {}", self.policy.lcd_id)?;
        writeln!(f, "  Jurisdictions: {}", self.policy.jurisdictions.join(", "))?;
        writeln!(
            f,
            "  Pre-therapy threshold: {}%",
            self.compliance.pre_therapy_reduction_percent
        )?;
        writeln!(
            f,
            "  Post-therapy threshold: {}%",
            self.compliance.post_therapy_reduction_percent
        )?;
        writeln!(
            f,
            "  Minimum conservative care: {} days",
            self.compliance.min_conservative_care_days
        )?;
        writeln!(
            f,
            "  Minimum policy content: {} chars",
            self.selection.min_content_length
        )?;
        Ok(())
    }
}
