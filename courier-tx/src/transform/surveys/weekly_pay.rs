//! Survey 134: weekly pay
//!
//! The questionnaire carries weekly, fortnightly and monthly variants of
//! the same concepts as sibling codes (40/50f/..., 300/300f/300m), so the
//! active output set is computed per request from which codes were
//! actually supplied, on top of a fixed mandatory core. Fortnightly wage
//! and bonus figures fold into the weekly aggregates at half weight.
//!
//! Confirmation markers `d50`/`d60` mean "none this period" and zero their
//! breakdown groups before the table runs.

use super::SurveyTransform;
use crate::rules::{RuleBinding, RuleKind, TypedValue};
use crate::transform::{ActiveSet, PreStep, TransformTable};
use chrono::NaiveDate;
use rust_decimal::Decimal;

const MANDATORY: &[u32] = &[40, 130, 140, 150, 180, 190, 200, 300];

fn date_default() -> TypedValue {
    TypedValue::Date(NaiveDate::from_ymd_opt(1900, 1, 1).expect("valid sentinel date"))
}

fn half() -> Decimal {
    Decimal::new(5, 1)
}

pub(super) fn survey() -> SurveyTransform {
    let bindings = vec![
        // Total weekly pay, with fortnightly pay at weekly equivalence
        RuleBinding::new(
            "40",
            TypedValue::Int(0),
            RuleKind::Aggregate {
                weights: vec![("50f", half())],
                round_to: Some(Decimal::ONE),
            },
        )
        .with_group(&["50f"]),
        // Employees receiving weekly pay
        RuleBinding::new("50", TypedValue::Int(0), RuleKind::UnsignedInteger),
        // Holiday pay, fortnightly folded in
        RuleBinding::new(
            "60",
            TypedValue::Int(0),
            RuleKind::Aggregate {
                weights: vec![("60f", half())],
                round_to: Some(Decimal::ONE),
            },
        )
        .with_group(&["60f"]),
        // Arrears of pay
        RuleBinding::new("70", TypedValue::Int(0), RuleKind::UnsignedInteger),
        // Percentage pay award
        RuleBinding::new("90", TypedValue::Decimal(Decimal::ZERO), RuleKind::Percentage),
        // PAYE scheme changed this period?
        RuleBinding::new("100", TypedValue::Bool(false), RuleKind::MatchAny)
            .with_group(&["100f", "100m"]),
        // Effective dates of reported changes
        RuleBinding::new("110", TypedValue::Dates(vec![]), RuleKind::Events)
            .with_group(&["110f"]),
        // Average weekly hours across pay frequencies
        RuleBinding::new("120", TypedValue::Decimal(Decimal::ZERO), RuleKind::Mean)
            .with_group(&["120f", "120m"]),
        // Reporting period bounds; synthesized when not supplied
        RuleBinding::new("130", date_default(), RuleKind::Date),
        RuleBinding::new("131", date_default(), RuleKind::Date),
        // Total employees on the payroll
        RuleBinding::new("140", TypedValue::Int(0), RuleKind::UnsignedInteger),
        // Total gross pay across payment runs
        RuleBinding::new(
            "151",
            TypedValue::Int(0),
            RuleKind::Aggregate {
                weights: vec![],
                round_to: None,
            },
        )
        .with_group(&["152", "153"]),
        // Bonus payments, fortnightly folded in
        RuleBinding::new(
            "181",
            TypedValue::Int(0),
            RuleKind::Aggregate {
                weights: vec![("181f", half())],
                round_to: Some(Decimal::ONE),
            },
        )
        .with_group(&["181f"]),
        // Significant changes reported?
        RuleBinding::new("190", TypedValue::Bool(false), RuleKind::MatchAny),
        // Any free-text comment supplied?
        RuleBinding::new("200", TypedValue::Bool(false), RuleKind::Boolean)
            .with_group(&["300", "300f", "300m"]),
        // Folded comment text
        RuleBinding::new("300", TypedValue::Text(String::new()), RuleKind::Comment)
            .with_group(&["300f", "300m"]),
    ];

    SurveyTransform {
        survey_id: "134",
        name: "weekly pay",
        instruments: &["0005"],
        table: TransformTable {
            bindings,
            active: ActiveSet::Dynamic {
                mandatory: MANDATORY,
            },
            pre_steps: vec![
                PreStep::ZeroOnConfirmation {
                    marker: "d50",
                    targets: &["50", "50f"],
                },
                PreStep::ZeroOnConfirmation {
                    marker: "d60",
                    targets: &["60", "60f"],
                },
                PreStep::EnsurePeriodDates {
                    start_code: "130",
                    end_code: "131",
                },
            ],
        },
        catalog: serde_json::json!({
            "survey_id": "134",
            "title": "Weekly Pay Survey",
            "codes": {
                "300": "Weekly",
                "300f": "Fortnightly",
                "300m": "Monthly"
            }
        }),
    }
}
