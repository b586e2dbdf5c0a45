//! Policy document selection
//!
//! Ranks the candidate documents of a MAC jurisdiction by status, recency
//! and clinical applicability. Selection is independent of the coverage
//! evaluators; the orchestrator may attach its outcome to a result.

pub mod scoring;
pub mod selector;
pub mod store;
pub mod telemetry;

use serde::Serialize;

use crate::algorithm::compliance::WoundType;
use crate::error::Result;
use crate::models::episode::{AnatomicalLocation, Episode, PatientCharacteristics};

pub use selector::PolicySelector;
pub use store::{InMemoryPolicyStore, PolicyFuture, PolicyStore, validate_jurisdiction};
pub use telemetry::{InMemoryTelemetry, NullTelemetry, TelemetrySink, TelemetrySnapshot};

/// What a policy is selected for
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionRequest {
    /// Normalized MAC jurisdiction code
    pub jurisdiction: String,
    /// Wound type, when determined
    pub wound_type: Option<WoundType>,
    /// Patient characteristics
    pub patient: PatientCharacteristics,
    /// Wound location
    pub location: Option<AnatomicalLocation>,
    /// Diagnosis codes of the episode
    pub diagnosis_codes: Vec<String>,
}

impl SelectionRequest {
    /// Create a request; the jurisdiction code is validated here
    pub fn new(jurisdiction: &str) -> Result<Self> {
        Ok(Self {
            jurisdiction: validate_jurisdiction(jurisdiction)?,
            wound_type: None,
            patient: PatientCharacteristics::default(),
            location: None,
            diagnosis_codes: Vec::new(),
        })
    }

    /// Request derived from an episode
    pub fn for_episode(
        jurisdiction: &str,
        episode: &Episode,
        wound_type: Option<WoundType>,
    ) -> Result<Self> {
        let mut request = Self::new(jurisdiction)?
            .with_patient(episode.patient_characteristics())
            .with_location(episode.location);
        request.wound_type = wound_type;
        if let Some(code) = &episode.diagnosis_code {
            request.diagnosis_codes.push(code.clone());
        }
        Ok(request)
    }

    /// Set the wound type
    #[must_use]
    pub fn with_wound_type(mut self, wound_type: WoundType) -> Self {
        self.wound_type = Some(wound_type);
        self
    }

    /// Set patient characteristics
    #[must_use]
    pub fn with_patient(mut self, patient: PatientCharacteristics) -> Self {
        self.patient = patient;
        self
    }

    /// Set the wound location
    #[must_use]
    pub fn with_location(mut self, location: AnatomicalLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Set the diagnosis codes
    #[must_use]
    pub fn with_diagnosis_codes(mut self, codes: Vec<String>) -> Self {
        self.diagnosis_codes = codes;
        self
    }
}
