use wound_coverage::algorithm::diabetic::{
    DiabeticClassification, RiskLevel, UtStage, calculate_expected_healing_time,
};

#[test]
fn test_expected_healing_time() {
    assert_eq!(
        calculate_expected_healing_time(2, UtStage::A, 2, RiskLevel::Moderate),
        50
    );
    assert_eq!(
        calculate_expected_healing_time(3, UtStage::D, 3, RiskLevel::Critical),
        280
    );
}

#[test]
fn test_healing_time_grows_with_risk() {
    let times: Vec<u32> = [
        RiskLevel::Low,
        RiskLevel::Moderate,
        RiskLevel::High,
        RiskLevel::Critical,
    ]
    .into_iter()
    .map(|risk| calculate_expected_healing_time(1, UtStage::B, 1, risk))
    .collect();
    assert!(times.windows(2).all(|w| w[0] < w[1]), "{times:?}");
}

#[test]
fn test_classification_summary() {
    let classification = DiabeticClassification::new(2, 2, UtStage::A, RiskLevel::Moderate);
    assert_eq!(classification.expected_healing_days(), 50);
    assert_eq!(
        classification.audit_summary(),
        "Diabetic classification: Wagner grade 2, UT 2A, moderate risk; expected healing time 50 days"
    );
}
