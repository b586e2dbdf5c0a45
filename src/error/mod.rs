//! Error handling for the coverage engine.
//!
//! Evaluation entry points never return these errors: they degrade into
//! complete result objects. Errors surface only at the validated-record
//! boundary (units, dimensions, status strings) and from collaborators.

pub mod util;

/// Specialized error type for the coverage engine
#[derive(Debug, thiserror::Error)]
pub enum CoverageError {
    /// A unit string outside the closed unit table; the value is not kept
    #[error("Unrecognized measurement unit")]
    UnrecognizedUnit,

    /// A required field that is absent
    #[error("Missing measurement field '{0}'")]
    MissingField(&'static str),

    /// A dimension that is negative or not finite
    #[error("Invalid measurement field '{field}': {reason}")]
    InvalidMeasurement {
        /// Name of the offending field
        field: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// A diabetic status string outside the closed status table
    #[error("Unrecognized diabetic status")]
    InvalidDiabeticStatus,

    /// A polygon that cannot describe a wound outline
    #[error("Invalid polygon: {0}")]
    InvalidPolygon(String),

    /// Failure reported by the external policy store
    #[error("Policy store error: {0}")]
    Storage(String),

    /// A jurisdiction code that is not a MAC identifier
    #[error("Invalid jurisdiction code: {0}")]
    InvalidJurisdiction(String),

    /// Configuration could not be parsed or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoverageError {
    /// Create an invalid measurement error for a field
    pub fn invalid_measurement(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidMeasurement {
            field,
            reason: reason.into(),
        }
    }

    /// Create a storage error from any displayable cause
    pub fn storage(cause: impl std::fmt::Display) -> Self {
        Self::Storage(cause.to_string())
    }
}

/// Result type for coverage engine operations
pub type Result<T> = std::result::Result<T, CoverageError>;
