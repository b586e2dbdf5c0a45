use rand::Rng;

use wound_coverage::algorithm::normalization::{
    Point, cm_to_mm, elliptical_area, mm_to_cm, polygon_area,
};
use wound_coverage::models::{
    AreaMethod, IngestIssue, IngestIssueKind, Measurement, MeasurementHistory, MeasurementUnit,
    RawMeasurement,
};

use crate::utils::{day, seeded_rng};

fn outline() -> Vec<Point> {
    // Irregular concave wound tracing, area 12.5 cm²
    vec![
        Point::new(0.0, 0.0),
        Point::new(4.0, 0.0),
        Point::new(4.0, 2.0),
        Point::new(3.0, 2.5),
        Point::new(2.0, 2.0),
        Point::new(2.0, 4.0),
        Point::new(0.0, 4.0),
    ]
}

#[test]
fn test_polygon_area_is_rotation_and_winding_invariant() {
    let mut rng = seeded_rng();
    let base = outline();
    let expected = polygon_area(&base, MeasurementUnit::Centimeters)
        .area_cm2
        .unwrap();
    assert!((expected - 12.5).abs() < 1e-9);

    for _ in 0..50 {
        let mut vertices = base.clone();
        vertices.rotate_left(rng.random_range(0..base.len()));
        if rng.random_bool(0.5) {
            vertices.reverse();
        }
        let result = polygon_area(&vertices, MeasurementUnit::Centimeters);
        assert!(result.valid);
        assert!((result.area_cm2.unwrap() - expected).abs() < 1e-9);
    }
}

#[test]
fn test_unit_round_trip() {
    let mut rng = seeded_rng();
    for _ in 0..200 {
        let cm: f64 = rng.random_range(0.0..500.0);
        assert!((mm_to_cm(cm_to_mm(cm)) - cm).abs() < 1e-9);
        for unit in [
            MeasurementUnit::Millimeters,
            MeasurementUnit::Centimeters,
            MeasurementUnit::Inches,
        ] {
            assert!((unit.to_cm(unit.from_cm(cm)) - cm).abs() < 1e-9);
        }
    }
}

#[test]
fn test_area_is_recomputed_from_dimensions() {
    let raw = RawMeasurement::new("m1", day(0), "mm")
        .with_dimensions(40.0, 20.0)
        .with_reported_area(999.0);
    let m = Measurement::from_raw(&raw).unwrap();
    assert!((m.area_cm2 - elliptical_area(4.0, 2.0)).abs() < 1e-12);
}

#[test]
fn test_ingest_excludes_bad_records_without_values() {
    let history = MeasurementHistory::ingest(&[
        RawMeasurement::new("ok", day(0), "cm").with_dimensions(3.0, 2.0),
        RawMeasurement::new("bad-unit", day(1), "furlongs").with_dimensions(3.0, 2.0),
        RawMeasurement::new("no-width", day(2), "cm"),
        RawMeasurement::new("negative", day(3), "cm").with_dimensions(-1.0, 2.0),
    ]);
    assert_eq!(history.len(), 1);
    let ids: Vec<&str> = history
        .issues()
        .iter()
        .map(|i: &IngestIssue| i.measurement_id.as_str())
        .collect();
    assert_eq!(ids, vec!["bad-unit", "no-width", "negative"]);
    assert!(history
        .issues()
        .iter()
        .all(|i| !i.to_string().contains("furlongs")));
}

#[test]
fn test_ingest_uses_outline_and_reports_bad_tracing() {
    let bowtie = vec![
        Point::new(0.0, 0.0),
        Point::new(4.0, 4.0),
        Point::new(4.0, 0.0),
        Point::new(0.0, 4.0),
    ];
    let history = MeasurementHistory::ingest(&[
        RawMeasurement::new("traced", day(0), "cm")
            .with_dimensions(4.0, 4.0)
            .with_outline(outline()),
        RawMeasurement::new("crossed", day(1), "cm")
            .with_dimensions(4.0, 4.0)
            .with_outline(bowtie),
    ]);

    assert_eq!(history.len(), 1);
    let traced = history.first().unwrap();
    assert_eq!(traced.area_method, AreaMethod::Polygon);
    assert!((traced.area_cm2 - 12.5).abs() < 1e-9);

    let issue = &history.issues()[0];
    assert_eq!(issue.measurement_id, "crossed");
    assert_eq!(issue.kind, IngestIssueKind::InvalidOutline);
    assert_eq!(issue.field, "outline");
    assert!(issue
        .recommendation
        .as_deref()
        .is_some_and(|r| r.contains("retrace the wound border")));
}
