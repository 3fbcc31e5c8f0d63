//! Survey 009: monthly business
//!
//! The smallest family: a static table of turnover, excise duty, exports
//! and change-flag codes.

use super::SurveyTransform;
use crate::rules::{RuleBinding, RuleKind, TypedValue};
use crate::transform::{ActiveSet, PreStep, TransformTable};
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn date_default() -> TypedValue {
    TypedValue::Date(NaiveDate::from_ymd_opt(1900, 1, 1).expect("valid sentinel date"))
}

pub(super) fn survey() -> SurveyTransform {
    let bindings = vec![
        RuleBinding::new("11", date_default(), RuleKind::Date),
        RuleBinding::new("12", date_default(), RuleKind::Date),
        // Total turnover
        RuleBinding::new("40", TypedValue::Int(0), RuleKind::UnsignedInteger),
        // Excise duty across product lines
        RuleBinding::new(
            "42",
            TypedValue::Int(0),
            RuleKind::Aggregate {
                weights: vec![],
                round_to: None,
            },
        )
        .with_group(&["43"]),
        // Share of turnover exported
        RuleBinding::new("49", TypedValue::Decimal(Decimal::ZERO), RuleKind::Percentage),
        // Significant changes reported?
        RuleBinding::new("90", TypedValue::Bool(false), RuleKind::MatchAny),
        // Any comment supplied?
        RuleBinding::new("146", TypedValue::Bool(false), RuleKind::Boolean),
    ];

    SurveyTransform {
        survey_id: "009",
        name: "monthly business",
        instruments: &["0106", "0111"],
        table: TransformTable {
            bindings,
            active: ActiveSet::Static,
            pre_steps: vec![PreStep::EnsurePeriodDates {
                start_code: "11",
                end_code: "12",
            }],
        },
        catalog: serde_json::json!({
            "survey_id": "009",
            "title": "Monthly Business Survey"
        }),
    }
}
