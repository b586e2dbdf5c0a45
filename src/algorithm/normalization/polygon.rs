//! Irregular wound outlines
//!
//! Area of a traced outline is the absolute shoelace sum, so clockwise and
//! counter-clockwise tracings give the same area. Self-intersecting outlines
//! are rejected rather than computed.

use serde::{Deserialize, Serialize};

use crate::error::{CoverageError, Result};
use crate::models::measurement::MeasurementUnit;

const EPS: f64 = 1e-12;

/// A vertex of a traced outline, in the declared unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl Point {
    /// Create a point
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Outcome of a polygon area computation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolygonArea {
    /// Area in cm²; `None` when the polygon is invalid
    pub area_cm2: Option<f64>,
    /// Whether the outline describes a simple polygon
    pub valid: bool,
    /// Number of intersecting non-adjacent edge pairs
    pub self_intersections: usize,
    /// What the recorder should do about an invalid outline
    pub recommendations: Vec<String>,
}

impl PolygonArea {
    fn invalid(recommendation: impl Into<String>, self_intersections: usize) -> Self {
        Self {
            area_cm2: None,
            valid: false,
            self_intersections,
            recommendations: vec![recommendation.into()],
        }
    }

    /// The area, or an error describing why the outline was rejected
    pub fn into_result(self) -> Result<f64> {
        match self.area_cm2 {
            Some(area) if self.valid => Ok(area),
            _ => Err(CoverageError::InvalidPolygon(self.recommendations.join("; "))),
        }
    }
}

/// Area of a traced outline in cm².
///
/// A repeated closing vertex is ignored. Outlines with fewer than three
/// vertices, non-finite coordinates, zero area or crossing edges are
/// reported invalid.
#[must_use]
pub fn polygon_area(vertices: &[Point], unit: MeasurementUnit) -> PolygonArea {
    let mut points: Vec<Point> = vertices
        .iter()
        .map(|p| Point::new(unit.to_cm(p.x), unit.to_cm(p.y)))
        .collect();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }

    if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return PolygonArea::invalid("outline contains non-finite coordinates", 0);
    }
    if points.len() < 3 {
        return PolygonArea::invalid("outline needs at least three vertices", 0);
    }

    let crossings = count_self_intersections(&points);
    if crossings > 0 {
        log::debug!("Rejected polygon outline with {crossings} self-intersections");
        return PolygonArea::invalid(
            format!("outline has {crossings} self-intersections; retrace the wound border"),
            crossings,
        );
    }

    let area = shoelace(&points).abs();
    if area <= EPS {
        return PolygonArea::invalid("outline is degenerate (zero area)", 0);
    }

    PolygonArea {
        area_cm2: Some(area),
        valid: true,
        self_intersections: 0,
        recommendations: Vec::new(),
    }
}

/// Signed shoelace sum (positive for counter-clockwise)
fn shoelace(points: &[Point]) -> f64 {
    let n = points.len();
    let twice: f64 = (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum();
    twice / 2.0
}

fn count_self_intersections(points: &[Point]) -> usize {
    let n = points.len();
    let mut count = 0;
    for i in 0..n {
        let (a1, a2) = (points[i], points[(i + 1) % n]);
        for j in (i + 1)..n {
            // Adjacent edges share a vertex by construction
            if j == i + 1 || (i == 0 && j == n - 1) {
                continue;
            }
            let (b1, b2) = (points[j], points[(j + 1) % n]);
            if segments_intersect(a1, a2, b1, b2) {
                count += 1;
            }
        }
    }
    count
}

fn orientation(p: Point, q: Point, r: Point) -> f64 {
    (q.x - p.x) * (r.y - p.y) - (q.y - p.y) * (r.x - p.x)
}

fn on_segment(p: Point, q: Point, r: Point) -> bool {
    r.x <= p.x.max(q.x) + EPS
        && r.x + EPS >= p.x.min(q.x)
        && r.y <= p.y.max(q.y) + EPS
        && r.y + EPS >= p.y.min(q.y)
}

fn segments_intersect(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);

    if ((d1 > EPS && d2 < -EPS) || (d1 < -EPS && d2 > EPS))
        && ((d3 > EPS && d4 < -EPS) || (d3 < -EPS && d4 > EPS))
    {
        return true;
    }

    (d1.abs() <= EPS && on_segment(q1, q2, p1))
        || (d2.abs() <= EPS && on_segment(q1, q2, p2))
        || (d3.abs() <= EPS && on_segment(p1, p2, q1))
        || (d4.abs() <= EPS && on_segment(p1, p2, q2))
}
