//! Wound measurement entity model
//!
//! Raw measurements arrive with free-string units and optional fields. They
//! are validated and normalized exactly once, by [`Measurement::from_raw`],
//! into canonical centimeter values. A traced outline, when present, takes
//! precedence over the elliptical area. Everything downstream works on
//! [`Measurement`] and [`MeasurementHistory`] only.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::algorithm::normalization::{Point, normalize_dimensions, polygon_area};
use crate::error::util::{optional_dimension, require_dimension};
use crate::error::{CoverageError, Result};
use crate::utils::time::elapsed_days;

/// Closed set of length units accepted at the boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasurementUnit {
    /// Millimeters
    #[serde(rename = "mm")]
    Millimeters,
    /// Centimeters (canonical)
    #[serde(rename = "cm")]
    Centimeters,
    /// Inches
    #[serde(rename = "inches")]
    Inches,
}

impl MeasurementUnit {
    /// Centimeters per one unit
    #[must_use]
    pub const fn cm_per_unit(self) -> f64 {
        match self {
            Self::Millimeters => 0.1,
            Self::Centimeters => 1.0,
            Self::Inches => 2.54,
        }
    }

    /// Convert a value in this unit to centimeters
    #[must_use]
    pub fn to_cm(self, value: f64) -> f64 {
        value * self.cm_per_unit()
    }

    /// Convert a centimeter value to this unit
    #[must_use]
    pub fn from_cm(self, cm: f64) -> f64 {
        cm / self.cm_per_unit()
    }

    /// Short symbol of the unit
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Millimeters => "mm",
            Self::Centimeters => "cm",
            Self::Inches => "in",
        }
    }
}

impl FromStr for MeasurementUnit {
    type Err = CoverageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mm" | "millimeter" | "millimeters" | "millimetre" | "millimetres" => {
                Ok(Self::Millimeters)
            }
            "cm" | "centimeter" | "centimeters" | "centimetre" | "centimetres" => {
                Ok(Self::Centimeters)
            }
            "in" | "inch" | "inches" | "\"" => Ok(Self::Inches),
            _ => Err(CoverageError::UnrecognizedUnit),
        }
    }
}

impl fmt::Display for MeasurementUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Review status of a recorded measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    /// Reviewed and confirmed
    Validated,
    /// Awaiting review
    Pending,
    /// Reviewed and questioned
    Flagged,
}

impl ValidationStatus {
    /// Ordering priority for same-timestamp entries (lower sorts first).
    ///
    /// Unspecified status sorts after every explicit status.
    #[must_use]
    pub const fn priority(status: Option<Self>) -> u8 {
        match status {
            Some(Self::Validated) => 0,
            Some(Self::Pending) => 1,
            Some(Self::Flagged) => 2,
            None => 3,
        }
    }
}

impl FromStr for ValidationStatus {
    type Err = CoverageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "validated" => Ok(Self::Validated),
            "pending" => Ok(Self::Pending),
            "flagged" => Ok(Self::Flagged),
            _ => Err(CoverageError::invalid_measurement(
                "validation_status",
                "unrecognized status",
            )),
        }
    }
}

/// A measurement as received from the record store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMeasurement {
    /// Measurement identifier
    pub id: String,
    /// When the measurement was taken
    pub timestamp: DateTime<Utc>,
    /// Wound length in `unit`
    #[serde(default)]
    pub length: Option<f64>,
    /// Wound width in `unit`
    #[serde(default)]
    pub width: Option<f64>,
    /// Wound depth in `unit`
    #[serde(default)]
    pub depth: Option<f64>,
    /// Declared unit as a free string
    #[serde(default)]
    pub unit: Option<String>,
    /// Area as reported by the source system; never used
    #[serde(default)]
    pub area: Option<f64>,
    /// Traced wound border, in `unit`
    #[serde(default)]
    pub outline: Option<Vec<Point>>,
    /// Review status as a free string
    #[serde(default)]
    pub validation_status: Option<String>,
    /// Identity of the person who recorded the measurement
    #[serde(default)]
    pub recorded_by: Option<String>,
    /// Free-text clinical note
    #[serde(default)]
    pub notes: Option<String>,
}

impl RawMeasurement {
    /// Create a raw measurement with only identity, time and unit
    #[must_use]
    pub fn new(id: impl Into<String>, timestamp: DateTime<Utc>, unit: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            timestamp,
            length: None,
            width: None,
            depth: None,
            unit: Some(unit.into()),
            area: None,
            outline: None,
            validation_status: None,
            recorded_by: None,
            notes: None,
        }
    }

    /// Set length and width
    #[must_use]
    pub fn with_dimensions(mut self, length: f64, width: f64) -> Self {
        self.length = Some(length);
        self.width = Some(width);
        self
    }

    /// Set depth
    #[must_use]
    pub fn with_depth(mut self, depth: f64) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Set the review status string
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.validation_status = Some(status.into());
        self
    }

    /// Set the recorder identity
    #[must_use]
    pub fn with_recorder(mut self, recorder: impl Into<String>) -> Self {
        self.recorded_by = Some(recorder.into());
        self
    }

    /// Set the free-text note
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Set a traced outline
    #[must_use]
    pub fn with_outline(mut self, outline: Vec<Point>) -> Self {
        self.outline = Some(outline);
        self
    }

    /// Set a source-reported area (ignored by normalization)
    #[must_use]
    pub fn with_reported_area(mut self, area: f64) -> Self {
        self.area = Some(area);
        self
    }
}

/// How the area of a measurement was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaMethod {
    /// π/4 × length × width
    Elliptical,
    /// Shoelace area of the traced outline
    Polygon,
}

/// A validated measurement in canonical units
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    /// Measurement identifier
    pub id: String,
    /// When the measurement was taken
    pub timestamp: DateTime<Utc>,
    /// Unit the values were recorded in
    pub declared_unit: MeasurementUnit,
    /// Length in cm
    pub length_cm: f64,
    /// Width in cm
    pub width_cm: f64,
    /// Depth in cm
    pub depth_cm: Option<f64>,
    /// Depth in mm, used for progression comparisons
    pub depth_mm: Option<f64>,
    /// Area in cm²
    pub area_cm2: f64,
    /// Formula the area came from
    pub area_method: AreaMethod,
    /// Volume in cm³ (requires depth)
    pub volume_cm3: Option<f64>,
    /// Review status
    pub validation_status: Option<ValidationStatus>,
    #[serde(skip)]
    recorded_by: Option<String>,
}

impl Measurement {
    /// Validate and normalize a raw measurement.
    ///
    /// Any area reported by the source is ignored: area is recomputed from
    /// the traced outline when one is present, otherwise from the canonical
    /// dimensions. A self-intersecting or degenerate outline rejects the
    /// whole record.
    pub fn from_raw(raw: &RawMeasurement) -> Result<Self> {
        let unit: MeasurementUnit = raw
            .unit
            .as_deref()
            .ok_or(CoverageError::MissingField("unit"))?
            .parse()?;
        let length = require_dimension("length", raw.length)?;
        let width = require_dimension("width", raw.width)?;
        let depth = optional_dimension("depth", raw.depth)?;
        let validation_status = raw
            .validation_status
            .as_deref()
            .map(str::parse::<ValidationStatus>)
            .transpose()?;

        let mut dims = normalize_dimensions(length, width, depth, unit);
        let area_method = match raw.outline.as_deref() {
            Some(outline) => {
                dims.area_cm2 = polygon_area(outline, unit).into_result()?;
                dims.volume_cm3 = dims.depth_cm.map(|d| dims.area_cm2 * d);
                AreaMethod::Polygon
            }
            None => AreaMethod::Elliptical,
        };

        Ok(Self {
            id: raw.id.clone(),
            timestamp: raw.timestamp,
            declared_unit: unit,
            length_cm: dims.length_cm,
            width_cm: dims.width_cm,
            depth_cm: dims.depth_cm,
            depth_mm: dims.depth_mm,
            area_cm2: dims.area_cm2,
            area_method,
            volume_cm3: dims.volume_cm3,
            validation_status,
            recorded_by: raw.recorded_by.clone(),
        })
    }

    /// Convenience constructor for already-known dimensions
    pub fn new(
        id: impl Into<String>,
        timestamp: DateTime<Utc>,
        unit: MeasurementUnit,
        length: f64,
        width: f64,
        depth: Option<f64>,
    ) -> Result<Self> {
        let mut raw = RawMeasurement::new(id, timestamp, unit.symbol()).with_dimensions(length, width);
        raw.depth = depth;
        Self::from_raw(&raw)
    }

    /// Set the review status
    #[must_use]
    pub fn with_status(mut self, status: ValidationStatus) -> Self {
        self.validation_status = Some(status);
        self
    }

    /// Whether the measurement has been validated
    #[must_use]
    pub fn is_validated(&self) -> bool {
        self.validation_status == Some(ValidationStatus::Validated)
    }

    /// Recorder identity, for the caller's own records only
    #[must_use]
    pub fn recorded_by(&self) -> Option<&str> {
        self.recorded_by.as_deref()
    }

    /// Fractional days between this measurement and `other`
    #[must_use]
    pub fn days_until(&self, other: &Self) -> f64 {
        elapsed_days(&self.timestamp, &other.timestamp)
    }

    /// History ordering: timestamp, then validation priority, then id
    #[must_use]
    pub fn history_order(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| {
                ValidationStatus::priority(self.validation_status)
                    .cmp(&ValidationStatus::priority(other.validation_status))
            })
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// What went wrong with a rejected raw measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestIssueKind {
    /// Required field absent
    MissingField,
    /// Field present but invalid
    InvalidField,
    /// Unit outside the closed unit table
    UnrecognizedUnit,
    /// Traced outline that is not a simple polygon
    InvalidOutline,
}

/// A raw measurement that could not be ingested.
///
/// Carries only identifiers and field names, never the rejected value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestIssue {
    /// Identifier of the rejected measurement
    pub measurement_id: String,
    /// Offending field
    pub field: &'static str,
    /// Kind of problem
    pub kind: IngestIssueKind,
    /// What the recorder should do to fix the record
    pub recommendation: Option<String>,
}

impl IngestIssue {
    fn from_error(measurement_id: &str, error: &CoverageError) -> Self {
        let mut recommendation = None;
        let (field, kind) = match error {
            CoverageError::MissingField(field) => (*field, IngestIssueKind::MissingField),
            CoverageError::UnrecognizedUnit => ("unit", IngestIssueKind::UnrecognizedUnit),
            CoverageError::InvalidMeasurement { field, .. } => {
                (*field, IngestIssueKind::InvalidField)
            }
            CoverageError::InvalidPolygon(advice) => {
                recommendation = Some(advice.clone());
                ("outline", IngestIssueKind::InvalidOutline)
            }
            _ => ("record", IngestIssueKind::InvalidField),
        };
        Self {
            measurement_id: measurement_id.to_string(),
            field,
            kind,
            recommendation,
        }
    }
}

impl fmt::Display for IngestIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            IngestIssueKind::MissingField => "missing",
            IngestIssueKind::InvalidField => "invalid",
            IngestIssueKind::UnrecognizedUnit => "unrecognized",
            IngestIssueKind::InvalidOutline => "invalid",
        };
        write!(
            f,
            "measurement {} excluded: {} {}",
            self.measurement_id, what, self.field
        )?;
        match &self.recommendation {
            Some(advice) => write!(f, " ({advice})"),
            None => Ok(()),
        }
    }
}

/// Timestamp-ordered measurements of one episode
#[derive(Debug, Clone, Default, Serialize)]
pub struct MeasurementHistory {
    measurements: Vec<Measurement>,
    issues: Vec<IngestIssue>,
}

impl MeasurementHistory {
    /// Create a history from validated measurements
    #[must_use]
    pub fn new(mut measurements: Vec<Measurement>) -> Self {
        measurements.sort_by(Measurement::history_order);
        Self {
            measurements,
            issues: Vec::new(),
        }
    }

    /// Build a history from raw records, recording every rejected record
    #[must_use]
    pub fn ingest(raw: &[RawMeasurement]) -> Self {
        let mut measurements = Vec::with_capacity(raw.len());
        let mut issues = Vec::new();
        for record in raw {
            match Measurement::from_raw(record) {
                Ok(m) => measurements.push(m),
                Err(e) => {
                    let issue = IngestIssue::from_error(&record.id, &e);
                    log::debug!("{issue}");
                    issues.push(issue);
                }
            }
        }
        let mut history = Self::new(measurements);
        history.issues = issues;
        history
    }

    /// Measurements in history order
    #[must_use]
    pub fn as_slice(&self) -> &[Measurement] {
        &self.measurements
    }

    /// Iterate in history order
    pub fn iter(&self) -> std::slice::Iter<'_, Measurement> {
        self.measurements.iter()
    }

    /// Number of usable measurements
    #[must_use]
    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    /// Whether no usable measurement exists
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    /// Earliest measurement
    #[must_use]
    pub fn first(&self) -> Option<&Measurement> {
        self.measurements.first()
    }

    /// Latest measurement
    #[must_use]
    pub fn last(&self) -> Option<&Measurement> {
        self.measurements.last()
    }

    /// Raw records rejected during ingest
    #[must_use]
    pub fn issues(&self) -> &[IngestIssue] {
        &self.issues
    }
}

impl<'a> IntoIterator for &'a MeasurementHistory {
    type Item = &'a Measurement;
    type IntoIter = std::slice::Iter<'a, Measurement>;

    fn into_iter(self) -> Self::IntoIter {
        self.measurements.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_unit_parsing() {
        assert_eq!("MM".parse::<MeasurementUnit>().unwrap(), MeasurementUnit::Millimeters);
        assert_eq!(" inches ".parse::<MeasurementUnit>().unwrap(), MeasurementUnit::Inches);
        assert!(matches!(
            "furlong".parse::<MeasurementUnit>(),
            Err(CoverageError::UnrecognizedUnit)
        ));
    }

    #[test]
    fn test_reported_area_is_ignored() {
        let raw = RawMeasurement::new("m1", day(1), "cm")
            .with_dimensions(4.0, 3.0)
            .with_reported_area(999.0);
        let m = Measurement::from_raw(&raw).unwrap();
        assert!((m.area_cm2 - std::f64::consts::FRAC_PI_4 * 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_timestamp_ordering() {
        let a = Measurement::new("b", day(2), MeasurementUnit::Centimeters, 1.0, 1.0, None).unwrap();
        let b = Measurement::new("a", day(2), MeasurementUnit::Centimeters, 1.0, 1.0, None)
            .unwrap()
            .with_status(ValidationStatus::Pending);
        let c = Measurement::new("c", day(2), MeasurementUnit::Centimeters, 1.0, 1.0, None)
            .unwrap()
            .with_status(ValidationStatus::Validated);
        let d = Measurement::new("z", day(1), MeasurementUnit::Centimeters, 1.0, 1.0, None).unwrap();
        let history = MeasurementHistory::new(vec![a, b, c, d]);
        let ids: Vec<&str> = history.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "c", "a", "b"]);
    }

    #[test]
    fn test_ingest_records_issues_without_values() {
        let raws = vec![
            RawMeasurement::new("ok", day(1), "mm").with_dimensions(20.0, 10.0),
            RawMeasurement::new("bad-unit", day(2), "Jane Roe"),
            RawMeasurement::new("no-width", day(3), "cm"),
        ];
        let history = MeasurementHistory::ingest(&raws);
        assert_eq!(history.len(), 1);
        assert_eq!(history.issues().len(), 2);
        let text: Vec<String> = history.issues().iter().map(ToString::to_string).collect();
        assert!(text.iter().all(|t| !t.contains("Jane Roe")));
        assert_eq!(history.issues()[0].kind, IngestIssueKind::UnrecognizedUnit);
        assert_eq!(history.issues()[1].field, "length");
    }

    #[test]
    fn test_outline_replaces_elliptical_area() {
        let square = vec![
            Point::new(0.0, 0.0),
            Point::new(20.0, 0.0),
            Point::new(20.0, 20.0),
            Point::new(0.0, 20.0),
        ];
        let raw = RawMeasurement::new("m1", day(1), "mm")
            .with_dimensions(20.0, 20.0)
            .with_depth(5.0)
            .with_outline(square);
        let m = Measurement::from_raw(&raw).unwrap();
        assert_eq!(m.area_method, AreaMethod::Polygon);
        assert!((m.area_cm2 - 4.0).abs() < 1e-12);
        assert!((m.volume_cm3.unwrap() - 2.0).abs() < 1e-12);
    }
}
