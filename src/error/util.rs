//! Utility functions for error handling
//!
//! Helpers for validating raw numeric fields at the record boundary.

use crate::error::{CoverageError, Result};

/// Require that an optional dimension is present, finite and non-negative
///
/// # Arguments
/// * `field` - Field name used in the error
/// * `value` - The raw value
///
/// # Returns
/// * `Result<f64>` - The validated value or a detailed error
pub fn require_dimension(field: &'static str, value: Option<f64>) -> Result<f64> {
    let value = value.ok_or(CoverageError::MissingField(field))?;
    check_dimension(field, value)
}

/// Validate a dimension that is present
pub fn check_dimension(field: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(CoverageError::invalid_measurement(field, "not a finite number"));
    }
    if value < 0.0 {
        return Err(CoverageError::invalid_measurement(
            field,
            format!("negative value {value}"),
        ));
    }
    Ok(value)
}

/// Validate an optional dimension, keeping absence as `None`
pub fn optional_dimension(field: &'static str, value: Option<f64>) -> Result<Option<f64>> {
    value.map(|v| check_dimension(field, v)).transpose()
}
