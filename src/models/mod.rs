//! Domain models for coverage determination
//!
//! This module contains the validated boundary records (measurements,
//! episodes, encounters, policy candidates) and the result types returned
//! by the evaluators.

pub mod advisory;
pub mod compliance;
pub mod episode;
pub mod measurement;
pub mod policy;

// Re-export commonly used types
pub use advisory::{AdvisoryAlert, AlertKind, PreventionReason, UrgencyTier};
pub use compliance::{ComplianceResult, OverallCompliance, SampleSummary};
pub use episode::{
    AnatomicalLocation, DiabetesType, DiabeticStatus, DocumentedOutcome, Encounter, EncounterKind,
    Episode, EpisodeCase, PatientCharacteristics, TherapyPhase,
};
pub use measurement::{
    AreaMethod, IngestIssue, IngestIssueKind, Measurement, MeasurementHistory, MeasurementUnit,
    RawMeasurement, ValidationStatus,
};
pub use policy::{
    CandidateScore, FallbackReason, FilterRecord, PolicyCandidate, PolicySelection,
    PolicySelectionAudit, PolicyStatus,
};
