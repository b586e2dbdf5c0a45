use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;

use wound_coverage::models::{
    AnatomicalLocation, DiabetesType, DiabeticStatus, Encounter, EncounterKind, Episode,
    PolicyCandidate, PolicyStatus, RawMeasurement, TherapyPhase,
};

/// Seed shared by the randomized checks
pub const SEED: u64 = 42;

/// Deterministic random source
#[must_use]
pub fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(SEED)
}

/// Reference instant of every fixture
#[must_use]
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).unwrap()
}

/// Instant `days` after [`t0`]
#[must_use]
pub fn day(days: i64) -> DateTime<Utc> {
    t0() + Duration::days(days)
}

/// Raw centimeter measurement whose elliptical area is `area_cm2`
#[must_use]
pub fn raw_with_area(id: &str, days: i64, area_cm2: f64) -> RawMeasurement {
    let side = (4.0 * area_cm2 / std::f64::consts::PI).sqrt();
    RawMeasurement::new(id, day(days), "cm")
        .with_dimensions(side, side)
        .with_depth(0.3)
        .with_status("validated")
}

/// Raw millimeter measurement with a fixed 30 x 20 mm footprint
#[must_use]
pub fn raw_with_depth(id: &str, days: i64, depth_mm: f64) -> RawMeasurement {
    RawMeasurement::new(id, day(days), "mm")
        .with_dimensions(30.0, 20.0)
        .with_depth(depth_mm)
}

/// Diabetic foot ulcer episode with the given (day, area) history
#[must_use]
pub fn dfu_episode(id: &str, phase: TherapyPhase, areas: &[(i64, f64)]) -> Episode {
    let mut episode = Episode::new(id, phase, AnatomicalLocation::Foot);
    episode.diagnosis_code = Some("E11.621".to_string());
    episode.diabetic_status = DiabeticStatus::Diabetic(DiabetesType::Type2);
    episode.measurements = areas
        .iter()
        .enumerate()
        .map(|(i, (d, area))| raw_with_area(&format!("{id}-m{i}"), *d, *area))
        .collect();
    episode
}

/// Offloading from day 0 and a therapy application on `therapy_day`
#[must_use]
pub fn standard_care(therapy_day: i64) -> Vec<Encounter> {
    vec![
        Encounter::new("enc-1", day(0), EncounterKind::Offloading),
        Encounter::new("enc-2", day(14), EncounterKind::Debridement),
        Encounter::new("enc-3", day(therapy_day), EncounterKind::TherapyApplication),
    ]
}

/// Wound-care policy text long enough to pass the content filters
#[must_use]
pub fn policy_body(topic: &str) -> String {
    format!(
        "This local coverage determination addresses skin substitute grafts for {topic}. \
         Chronic wound and ulcer care must document standard of care. "
    )
    .repeat(12)
}

/// Current wound-care policy in `jurisdiction`
#[must_use]
pub fn policy(jurisdiction: &str, id: &str, effective: NaiveDate) -> PolicyCandidate {
    PolicyCandidate::new(
        jurisdiction,
        id,
        "Skin Substitute Grafts for Chronic Wounds",
        PolicyStatus::Current,
        effective,
        policy_body("chronic wounds"),
    )
}

/// Calendar date helper
#[must_use]
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
