//! Measurement normalization
//!
//! Converts length/width/depth values in any accepted unit to canonical
//! centimeters (and depth to millimeters) and derives area and volume.
//! Polygon outlines and depth plausibility live in the submodules.

pub mod depth;
pub mod polygon;

use std::f64::consts::FRAC_PI_4;

use serde::Serialize;

use crate::models::measurement::MeasurementUnit;

pub use depth::{
    DepthCorrectionSuggestion, DepthFinding, DepthValidationOptions, DepthValidationResult,
    PatientContext, plausible_depth_range_mm, validate_depth_measurements,
};
pub use polygon::{Point, PolygonArea, polygon_area};

/// Millimeters per centimeter
pub const MM_PER_CM: f64 = 10.0;

/// Canonical dimensions of one measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizedDimensions {
    /// Length in cm
    pub length_cm: f64,
    /// Width in cm
    pub width_cm: f64,
    /// Depth in cm
    pub depth_cm: Option<f64>,
    /// Depth in mm
    pub depth_mm: Option<f64>,
    /// Elliptical area in cm²
    pub area_cm2: f64,
    /// Elliptical area × depth in cm³
    pub volume_cm3: Option<f64>,
}

/// Convert centimeters to millimeters
#[must_use]
pub fn cm_to_mm(cm: f64) -> f64 {
    cm * MM_PER_CM
}

/// Convert millimeters to centimeters
#[must_use]
pub fn mm_to_cm(mm: f64) -> f64 {
    mm / MM_PER_CM
}

/// Elliptical approximation of wound area (π/4 × length × width)
#[must_use]
pub fn elliptical_area(length_cm: f64, width_cm: f64) -> f64 {
    FRAC_PI_4 * length_cm * width_cm
}

/// Normalize validated dimensions given in `unit`.
///
/// The caller guarantees finite, non-negative inputs (see
/// [`crate::error::util`]). Area and volume are always derived here.
#[must_use]
pub fn normalize_dimensions(
    length: f64,
    width: f64,
    depth: Option<f64>,
    unit: MeasurementUnit,
) -> NormalizedDimensions {
    let length_cm = unit.to_cm(length);
    let width_cm = unit.to_cm(width);
    let depth_cm = depth.map(|d| unit.to_cm(d));
    let area_cm2 = elliptical_area(length_cm, width_cm);

    NormalizedDimensions {
        length_cm,
        width_cm,
        depth_cm,
        depth_mm: depth_cm.map(cm_to_mm),
        area_cm2,
        volume_cm3: depth_cm.map(|d| area_cm2 * d),
    }
}
