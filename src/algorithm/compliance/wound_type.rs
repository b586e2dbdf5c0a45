//! Wound-type eligibility gate
//!
//! Only diabetic foot ulcers and venous leg ulcers are covered. The ICD-10
//! diagnosis code is checked first; free text is used only to classify
//! non-specific lower-limb ulcers (L97) or episodes without a code. The
//! description is read for keywords and never copied into the result.

use std::fmt;

use itertools::Itertools;
use serde::Serialize;

use crate::config::PolicyMetadata;
use crate::models::episode::DiabeticStatus;

/// Wound etiology as determined for coverage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WoundType {
    /// Diabetic foot ulcer (covered)
    DiabeticFootUlcer,
    /// Venous leg ulcer (covered)
    VenousLegUlcer,
    /// Pressure ulcer / injury
    PressureUlcer,
    /// Traumatic wound or burn
    Traumatic,
    /// Surgical wound complication
    Surgical,
    /// Etiology not established
    Unclassified,
}

impl WoundType {
    /// Whether the wound type is eligible for advanced-therapy coverage
    #[must_use]
    pub const fn is_covered(self) -> bool {
        matches!(self, Self::DiabeticFootUlcer | Self::VenousLegUlcer)
    }

    /// Readable name for audit output
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::DiabeticFootUlcer => "diabetic foot ulcer",
            Self::VenousLegUlcer => "venous leg ulcer",
            Self::PressureUlcer => "pressure ulcer",
            Self::Traumatic => "traumatic wound",
            Self::Surgical => "surgical wound",
            Self::Unclassified => "unclassified wound",
        }
    }
}

impl fmt::Display for WoundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Outcome of the wound-type gate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WoundTypeResult {
    /// Whether the wound type is covered
    pub eligible: bool,
    /// Determined wound type
    pub wound_type: WoundType,
    /// Normalized diagnosis code, if one was given
    pub diagnosis_code: Option<String>,
    /// Reasons the gate failed
    pub violations: Vec<String>,
    /// Documentation concerns that do not fail the gate
    pub warnings: Vec<String>,
    /// PHI-free audit trail
    pub audit_trail: Vec<String>,
}

/// Category of an ICD-10 diagnosis code relevant to wound coverage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeCategory {
    Injury,
    DiabeticUlcer,
    VenousUlcer,
    PressureUlcer,
    LowerLimbUlcer,
    SurgicalComplication,
    Other,
}

const VENOUS_CODES: [&str; 5] = ["I830", "I832", "I872", "I8731", "I8733"];

const DIABETIC_TERMS: [&str; 4] = ["diabetic", "diabetes", "dfu", "neuropathic"];
const VENOUS_TERMS: [&str; 4] = ["venous", "vlu", "stasis", "varicose"];
const VENOUS_CONFIRMATION_TERMS: [&str; 4] = [
    "venous insufficiency",
    "venous reflux",
    "venous hypertension",
    "chronic venous disease",
];
const TRAUMA_TERMS: [&str; 5] = ["trauma", "traumatic", "laceration", "abrasion", "burn"];
const PRESSURE_TERMS: [&str; 3] = ["pressure ulcer", "pressure injury", "decubitus"];

/// Normalize an ICD-10 code: trimmed, upper case, without the dot
fn normalize_code(code: &str) -> String {
    code.trim()
        .chars()
        .filter(|c| *c != '.')
        .flat_map(char::to_uppercase)
        .collect()
}

/// Two-digit category number following the chapter letter, e.g. 97 for L97
fn category_number(code: &str) -> Option<u32> {
    code.get(1..3).and_then(|n| n.parse().ok())
}

fn categorize_code(code: &str) -> CodeCategory {
    let Some(chapter) = code.chars().next() else {
        return CodeCategory::Other;
    };
    let number = category_number(code);

    match (chapter, number) {
        ('S', Some(_)) => CodeCategory::Injury,
        ('T', Some(n)) if n <= 14 => CodeCategory::Injury,
        // Burns and corrosions
        ('T', Some(n)) if (20..=32).contains(&n) => CodeCategory::Injury,
        ('T', Some(81)) => CodeCategory::SurgicalComplication,
        ('E', Some(n)) if (8..=13).contains(&n) => CodeCategory::DiabeticUlcer,
        ('I', Some(83 | 87)) if VENOUS_CODES.iter().any(|v| code.starts_with(v)) => {
            CodeCategory::VenousUlcer
        }
        ('L', Some(89)) => CodeCategory::PressureUlcer,
        ('L', Some(97)) => CodeCategory::LowerLimbUlcer,
        _ => CodeCategory::Other,
    }
}

fn contains_any(text: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| text.contains(t))
}

struct WoundTypeBuilder {
    result: WoundTypeResult,
}

impl WoundTypeBuilder {
    fn pass(mut self, wound_type: WoundType, basis: &str) -> WoundTypeResult {
        self.result
            .audit_trail
            .push(format!("Wound type: {wound_type} ({basis}); eligible"));
        self.result.eligible = true;
        self.result.wound_type = wound_type;
        self.result
    }

    fn fail(mut self, wound_type: WoundType, violation: String) -> WoundTypeResult {
        self.result
            .audit_trail
            .push(format!("Wound type: {wound_type}; not eligible: {violation}"));
        self.result.eligible = false;
        self.result.wound_type = wound_type;
        self.result.violations.push(violation);
        self.result
    }

    fn warn(&mut self, warning: String) {
        self.result.audit_trail.push(format!("WARNING: {warning}"));
        self.result.warnings.push(warning);
    }
}

/// Decide whether the wound type is eligible for coverage.
///
/// # Arguments
/// * `description` - Free-text wound description (read for keywords only)
/// * `diagnosis_code` - Primary ICD-10 code
/// * `note_keywords` - Keywords extracted from clinical notes
/// * `diabetic_status` - Documented diabetic status
/// * `policy` - Policy cited in the audit trail
#[must_use]
pub fn validate_wound_type_for_coverage(
    description: Option<&str>,
    diagnosis_code: Option<&str>,
    note_keywords: &[String],
    diabetic_status: DiabeticStatus,
    policy: &PolicyMetadata,
) -> WoundTypeResult {
    let code = diagnosis_code
        .map(normalize_code)
        .filter(|c| !c.is_empty());
    let mut builder = WoundTypeBuilder {
        result: WoundTypeResult {
            eligible: false,
            wound_type: WoundType::Unclassified,
            diagnosis_code: code.clone(),
            violations: Vec::new(),
            warnings: Vec::new(),
            audit_trail: vec![format!(
                "Wound type: LCD {} covers diabetic foot ulcers and venous leg ulcers only",
                policy.lcd_id
            )],
        },
    };

    let text = note_keywords
        .iter()
        .map(String::as_str)
        .chain(description)
        .join(" ")
        .to_lowercase();
    let venous_confirmed = contains_any(&text, &VENOUS_CONFIRMATION_TERMS);

    let category = code.as_deref().map_or(CodeCategory::Other, categorize_code);
    match &code {
        Some(c) => builder
            .result
            .audit_trail
            .push(format!("Diagnosis code {c} categorized as {category:?}")),
        None => builder.warn("no diagnosis code documented".to_string()),
    }

    match category {
        CodeCategory::Injury => builder.fail(
            WoundType::Traumatic,
            "injury diagnosis code (S00-T14 or burn); traumatic wounds are not covered".to_string(),
        ),
        CodeCategory::SurgicalComplication => builder.fail(
            WoundType::Surgical,
            "surgical wound complications are not covered".to_string(),
        ),
        CodeCategory::PressureUlcer => builder.fail(
            WoundType::PressureUlcer,
            "pressure ulcers (L89) are not covered".to_string(),
        ),
        CodeCategory::DiabeticUlcer => match diabetic_status {
            DiabeticStatus::NonDiabetic => builder.fail(
                WoundType::DiabeticFootUlcer,
                "diabetic ulcer diagnosis conflicts with documented non-diabetic status"
                    .to_string(),
            ),
            DiabeticStatus::Unknown => {
                builder.warn(
                    "diabetic ulcer diagnosis without documented diabetic status".to_string(),
                );
                builder.pass(WoundType::DiabeticFootUlcer, "diabetic ulcer diagnosis code")
            }
            DiabeticStatus::Diabetic(_) => {
                builder.pass(WoundType::DiabeticFootUlcer, "diabetic ulcer diagnosis code")
            }
        },
        CodeCategory::VenousUlcer => {
            if venous_confirmed {
                builder.pass(
                    WoundType::VenousLegUlcer,
                    "venous diagnosis code with documented venous insufficiency",
                )
            } else {
                builder.fail(
                    WoundType::VenousLegUlcer,
                    "venous diagnosis code without documented venous insufficiency".to_string(),
                )
            }
        }
        CodeCategory::LowerLimbUlcer | CodeCategory::Other => {
            if category == CodeCategory::Other && code.is_some() {
                return builder.fail(
                    WoundType::Unclassified,
                    "diagnosis code is not a covered wound etiology".to_string(),
                );
            }
            classify_from_text(builder, &text, diabetic_status, venous_confirmed)
        }
    }
}

fn classify_from_text(
    mut builder: WoundTypeBuilder,
    text: &str,
    diabetic_status: DiabeticStatus,
    venous_confirmed: bool,
) -> WoundTypeResult {
    if contains_any(text, &TRAUMA_TERMS) {
        return builder.fail(
            WoundType::Traumatic,
            "documentation describes a traumatic wound".to_string(),
        );
    }
    if contains_any(text, &PRESSURE_TERMS) {
        return builder.fail(
            WoundType::PressureUlcer,
            "documentation describes a pressure ulcer".to_string(),
        );
    }

    let diabetic_terms = contains_any(text, &DIABETIC_TERMS);
    let venous_terms = contains_any(text, &VENOUS_TERMS);

    match diabetic_status {
        DiabeticStatus::Diabetic(_) if diabetic_terms || !venous_terms => {
            return builder.pass(
                WoundType::DiabeticFootUlcer,
                "lower-limb ulcer in a diabetic patient",
            );
        }
        DiabeticStatus::NonDiabetic if diabetic_terms && !venous_terms => {
            return builder.fail(
                WoundType::DiabeticFootUlcer,
                "diabetic ulcer described for a documented non-diabetic patient".to_string(),
            );
        }
        DiabeticStatus::Unknown if diabetic_terms => {
            builder.warn("diabetic ulcer described without documented diabetic status".to_string());
            return builder.pass(
                WoundType::DiabeticFootUlcer,
                "diabetic ulcer described in documentation",
            );
        }
        _ => {}
    }

    if venous_confirmed {
        return builder.pass(
            WoundType::VenousLegUlcer,
            "lower-limb ulcer with documented venous insufficiency",
        );
    }
    if venous_terms {
        return builder.fail(
            WoundType::VenousLegUlcer,
            "venous ulcer described without documented venous insufficiency".to_string(),
        );
    }
    builder.fail(
        WoundType::Unclassified,
        "wound etiology not established as diabetic or venous".to_string(),
    )
}
