use wound_coverage::algorithm::advisory::evaluate_depth_volume_advisory;
use wound_coverage::algorithm::quality::{GapSeverity, assess_measurement_quality};
use wound_coverage::models::{
    AlertKind, AnatomicalLocation, MeasurementHistory, PreventionReason, TherapyPhase,
    UrgencyTier,
};
use wound_coverage::{CoverageConfig, PreEligibilityOrchestrator};

use crate::utils::{dfu_episode, raw_with_depth, standard_care};

#[test]
fn test_acute_deterioration_under_poor_data() {
    let config = CoverageConfig::default();
    // Two unreviewed readings, 6.5 mm deeper three days later
    let history = MeasurementHistory::ingest(&[
        raw_with_depth("m0", 0, 2.0),
        raw_with_depth("m1", 3, 8.5),
    ]);
    let quality = assess_measurement_quality(
        history.as_slice(),
        AnatomicalLocation::Foot,
        config.quality.assessment_window_days,
        &config.quality,
    );
    let report = evaluate_depth_volume_advisory("ep-acute", history.as_slice(), &quality, &config);

    let acute = report
        .alerts
        .iter()
        .find(|a| a.kind == AlertKind::AcuteDeterioration)
        .expect("acute alert");
    assert!(acute.should_issue);
    assert!(acute.safety_override);
    assert!((acute.observed_value - 6.5).abs() < 1e-9);
    assert!(report.acute_deterioration.is_some());
}

#[test]
fn test_advisory_never_changes_compliance() {
    let orchestrator = PreEligibilityOrchestrator::default();
    let areas = [(0, 12.0), (7, 11.0), (14, 10.0), (28, 8.0)];
    let steady = dfu_episode("ep-steady", TherapyPhase::PreTherapy, &areas);

    let mut deepening = dfu_episode("ep-deep", TherapyPhase::PreTherapy, &areas);
    for (m, depth_cm) in deepening.measurements.iter_mut().zip([0.2, 0.5, 0.8, 1.4]) {
        m.depth = Some(depth_cm);
    }

    let a = orchestrator.perform_pre_eligibility_checks(&steady, &standard_care(30));
    let b = orchestrator.perform_pre_eligibility_checks(&deepening, &standard_care(30));

    assert!(!b.advisory.alerts.is_empty());
    assert_eq!(a.compliance.overall, b.compliance.overall);
    assert_eq!(a.compliance.reduction_percent, b.compliance.reduction_percent);
    assert_eq!(a.eligible, b.eligible);
    assert_eq!(a.failure_reasons, b.failure_reasons);
    assert!(b
        .audit_trail
        .iter()
        .any(|e| e.contains("ADVISORY ONLY") && e.contains("not part of the coverage decision")));
}

#[test]
fn test_long_gap_withholds_urgent_alert() {
    let config = CoverageConfig::default();
    // 40 days without a visit, then 3.5 mm deeper over two weeks
    let history = MeasurementHistory::ingest(
        &[(0, 2.0), (40, 2.0), (47, 3.5), (54, 5.5)]
            .iter()
            .enumerate()
            .map(|(i, (d, depth_mm))| {
                raw_with_depth(&format!("m{i}"), *d, *depth_mm).with_status("validated")
            })
            .collect::<Vec<_>>(),
    );
    let quality = assess_measurement_quality(
        history.as_slice(),
        AnatomicalLocation::Foot,
        config.quality.assessment_window_days,
        &config.quality,
    );
    assert_eq!(quality.gap_severity, GapSeverity::Severe);
    assert!(!quality.allow_high_urgency_alerts);

    let report = evaluate_depth_volume_advisory("ep-gap", history.as_slice(), &quality, &config);
    let absolute = report
        .alerts
        .iter()
        .find(|a| a.kind == AlertKind::DepthAbsoluteChange)
        .expect("absolute change alert");
    assert_eq!(absolute.tier, UrgencyTier::Urgent);
    assert!(!absolute.should_issue);
    assert!(absolute
        .prevention_reasons
        .contains(&PreventionReason::HighUrgencyDisallowed));
    assert!(report.acute_deterioration.is_none());
}
