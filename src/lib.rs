//! A Rust library for wound-care coverage determination: measurement
//! normalization, quality assessment, LCD area-reduction compliance,
//! advisory depth/volume alerting and policy selection.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod policy;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::CoverageConfig;
pub use error::{CoverageError, Result};
pub use models::{
    ComplianceResult, Encounter, Episode, EpisodeCase, Measurement, MeasurementHistory,
    OverallCompliance, PolicyCandidate, PolicySelection, RawMeasurement,
};

// Evaluators
pub use algorithm::advisory::{AdvisoryReport, evaluate_depth_volume_advisory};
pub use algorithm::compliance::{
    evaluate_area_reduction_compliance, validate_conservative_care_timeline,
    validate_wound_type_for_coverage,
};
pub use algorithm::diabetic::calculate_expected_healing_time;
pub use algorithm::eligibility::{OrchestratorResult, PreEligibilityOrchestrator};
pub use algorithm::quality::{QualityAssessment, assess_measurement_quality};

// Policy selection
pub use policy::{
    InMemoryPolicyStore, InMemoryTelemetry, PolicySelector, PolicyStore, SelectionRequest,
    TelemetrySink,
};
