//! Episode and encounter entity models
//!
//! An episode is one wound under evaluation; encounters are the documented
//! visits that establish the conservative-care timeline. Free-text fields
//! (wound description, notes, provider and patient names) are accepted so
//! callers can hand over complete records, but no evaluator ever copies them
//! into an audit trail or a log line.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::algorithm::diabetic::DiabeticClassification;
use crate::error::{CoverageError, Result};
use crate::models::measurement::RawMeasurement;

/// Evaluation phase relative to the first advanced-therapy application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TherapyPhase {
    /// Before advanced therapy; evaluates conservative care
    PreTherapy,
    /// After advanced therapy started; evaluates therapy response
    PostTherapy,
}

impl TherapyPhase {
    /// Name used in audit trails
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::PreTherapy => "pre-therapy",
            Self::PostTherapy => "post-therapy",
        }
    }
}

impl fmt::Display for TherapyPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Anatomical location of a wound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnatomicalLocation {
    /// Plantar or dorsal foot
    Foot,
    /// Heel
    Heel,
    /// Toe
    Toe,
    /// Ankle / malleolus
    Ankle,
    /// Lower leg
    LowerLeg,
    /// Sacrum / coccyx
    Sacrum,
    /// Anything else
    Other,
}

impl From<&str> for AnatomicalLocation {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "foot" | "plantar_foot" | "dorsal_foot" | "forefoot" | "midfoot" => Self::Foot,
            "heel" | "calcaneus" => Self::Heel,
            "toe" | "toes" | "hallux" => Self::Toe,
            "ankle" | "malleolus" | "medial_malleolus" | "lateral_malleolus" => Self::Ankle,
            "lower_leg" | "leg" | "calf" | "shin" | "gaiter" => Self::LowerLeg,
            "sacrum" | "sacral" | "coccyx" => Self::Sacrum,
            _ => Self::Other,
        }
    }
}

impl AnatomicalLocation {
    /// Keywords that identify the location in policy text
    #[must_use]
    pub const fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Foot | Self::Heel | Self::Toe => &["foot", "plantar", "lower extremity"],
            Self::Ankle | Self::LowerLeg => &["leg", "lower extremity", "ankle"],
            Self::Sacrum => &["sacral", "pressure"],
            Self::Other => &[],
        }
    }
}

/// Kind of diabetes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiabetesType {
    /// Type 1
    Type1,
    /// Type 2
    Type2,
    /// Other or unspecified type
    Other,
}

/// Diabetic status of the patient as a closed variant.
///
/// Parsed once at the boundary; unrecognized strings are an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DiabeticStatus {
    /// Diagnosed diabetes
    Diabetic(DiabetesType),
    /// Explicitly not diabetic
    NonDiabetic,
    /// Not documented
    Unknown,
}

impl DiabeticStatus {
    /// Whether the patient is documented as diabetic
    #[must_use]
    pub const fn is_diabetic(self) -> bool {
        matches!(self, Self::Diabetic(_))
    }

    /// Canonical string form
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Diabetic(DiabetesType::Type1) => "type1",
            Self::Diabetic(DiabetesType::Type2) => "type2",
            Self::Diabetic(DiabetesType::Other) => "diabetic",
            Self::NonDiabetic => "nondiabetic",
            Self::Unknown => "unknown",
        }
    }
}

impl FromStr for DiabeticStatus {
    type Err = CoverageError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', '_', ' '], "");
        match normalized.as_str() {
            "diabetic" | "diabetes" | "yes" => Ok(Self::Diabetic(DiabetesType::Other)),
            "type1" | "t1dm" | "type1diabetes" => Ok(Self::Diabetic(DiabetesType::Type1)),
            "type2" | "t2dm" | "type2diabetes" => Ok(Self::Diabetic(DiabetesType::Type2)),
            "nondiabetic" | "notdiabetic" | "no" => Ok(Self::NonDiabetic),
            "unknown" | "" => Ok(Self::Unknown),
            _ => Err(CoverageError::InvalidDiabeticStatus),
        }
    }
}

impl TryFrom<String> for DiabeticStatus {
    type Error = CoverageError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<DiabeticStatus> for String {
    fn from(status: DiabeticStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for DiabeticStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Patient characteristics used for policy applicability
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientCharacteristics {
    /// Patient is diabetic
    #[serde(default)]
    pub diabetic: bool,
    /// Patient has documented venous disease
    #[serde(default)]
    pub venous_disease: bool,
}

/// Kind of documented encounter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncounterKind {
    /// General standard-of-care wound visit
    ConservativeCare,
    /// Offloading (DFU standard of care)
    Offloading,
    /// Compression (VLU standard of care)
    Compression,
    /// Debridement
    Debridement,
    /// Assessment without treatment
    Assessment,
    /// Application of the advanced therapy (CTP)
    TherapyApplication,
}

impl EncounterKind {
    /// Whether the encounter documents conservative (standard) care
    #[must_use]
    pub const fn is_conservative_care(self) -> bool {
        matches!(
            self,
            Self::ConservativeCare | Self::Offloading | Self::Compression | Self::Debridement
        )
    }
}

/// Healing outcome as documented in the narrative record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentedOutcome {
    /// Narrative says the wound is improving
    Improving,
    /// Narrative says healing has stalled
    Stalled,
    /// Narrative says the wound is getting worse
    Deteriorating,
}

/// A documented clinical encounter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Encounter {
    /// Encounter identifier
    pub id: String,
    /// Encounter date; may be missing in incomplete records
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    /// Encounter kind; may be missing in incomplete records
    #[serde(default)]
    pub kind: Option<EncounterKind>,
    /// Treating provider name
    #[serde(default)]
    pub provider_name: Option<String>,
    /// Free-text note
    #[serde(default)]
    pub notes: Option<String>,
    /// Narrative healing outcome
    #[serde(default)]
    pub documented_outcome: Option<DocumentedOutcome>,
}

impl Encounter {
    /// Create a complete encounter
    #[must_use]
    pub fn new(id: impl Into<String>, date: DateTime<Utc>, kind: EncounterKind) -> Self {
        Self {
            id: id.into(),
            date: Some(date),
            kind: Some(kind),
            provider_name: None,
            notes: None,
            documented_outcome: None,
        }
    }

    /// Set the narrative outcome
    #[must_use]
    pub fn with_outcome(mut self, outcome: DocumentedOutcome) -> Self {
        self.documented_outcome = Some(outcome);
        self
    }

    /// Set provider name and note
    #[must_use]
    pub fn with_narrative(mut self, provider: impl Into<String>, notes: impl Into<String>) -> Self {
        self.provider_name = Some(provider.into());
        self.notes = Some(notes.into());
        self
    }
}

/// A wound episode submitted for pre-eligibility evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    /// Episode identifier
    pub id: String,
    /// Evaluation phase
    pub phase: TherapyPhase,
    /// First advanced-therapy application
    #[serde(default)]
    pub therapy_start: Option<DateTime<Utc>>,
    /// Wound location
    pub location: AnatomicalLocation,
    /// Free-text wound description
    #[serde(default)]
    pub wound_description: Option<String>,
    /// Primary ICD-10 diagnosis code
    #[serde(default)]
    pub diagnosis_code: Option<String>,
    /// Keywords extracted from clinical notes
    #[serde(default)]
    pub note_keywords: Vec<String>,
    /// Diabetic status
    pub diabetic_status: DiabeticStatus,
    /// Raw wound measurements
    #[serde(default)]
    pub measurements: Vec<RawMeasurement>,
    /// Upstream diabetic classification, when available
    #[serde(default)]
    pub diabetic_classification: Option<DiabeticClassification>,
    /// Patient name
    #[serde(default)]
    pub patient_name: Option<String>,
}

impl Episode {
    /// Create an episode with no clinical detail yet
    #[must_use]
    pub fn new(id: impl Into<String>, phase: TherapyPhase, location: AnatomicalLocation) -> Self {
        Self {
            id: id.into(),
            phase,
            therapy_start: None,
            location,
            wound_description: None,
            diagnosis_code: None,
            note_keywords: Vec::new(),
            diabetic_status: DiabeticStatus::Unknown,
            measurements: Vec::new(),
            diabetic_classification: None,
            patient_name: None,
        }
    }

    /// Patient characteristics derived from the episode
    #[must_use]
    pub fn patient_characteristics(&self) -> PatientCharacteristics {
        let venous_disease = self
            .note_keywords
            .iter()
            .any(|k| k.to_lowercase().contains("venous"))
            || self
                .diagnosis_code
                .as_deref()
                .is_some_and(|c| c.trim().to_uppercase().starts_with("I8"));
        PatientCharacteristics {
            diabetic: self.diabetic_status.is_diabetic(),
            venous_disease,
        }
    }
}

/// An episode together with its documented encounters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeCase {
    /// The wound episode
    pub episode: Episode,
    /// Documented encounters
    #[serde(default)]
    pub encounters: Vec<Encounter>,
}
