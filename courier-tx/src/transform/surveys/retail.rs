//! Survey 023: retail sales
//!
//! Static table: every declared code is emitted for every submission.
//! Period start/end dates at codes 11/12 are synthesized from the
//! reporting period when the respondent left them out.

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
        // Reporting period bounds
        RuleBinding::new("11", date_default(), RuleKind::Date),
        RuleBinding::new("12", date_default(), RuleKind::Date),
        // Total retail turnover
        RuleBinding::new("20", TypedValue::Int(0), RuleKind::UnsignedInteger),
        // Internet sales
        RuleBinding::new("21", TypedValue::Int(0), RuleKind::UnsignedInteger),
        // Share of turnover from food
        RuleBinding::new("22", TypedValue::Decimal(Decimal::ZERO), RuleKind::Percentage),
        // Staff across full-time and part-time counts
        RuleBinding::new(
            "23",
            TypedValue::Int(0),
            RuleKind::Aggregate {
                weights: vec![],
                round_to: None,
            },
        )
        .with_group(&["24", "25"]),
        // Average weekly trading hours
        RuleBinding::new("26", TypedValue::Decimal(Decimal::ZERO), RuleKind::Mean)
            .with_group(&["27"]),
        // Employees on the payroll
        RuleBinding::new("50", TypedValue::Int(0), RuleKind::UnsignedInteger),
        // Any comment supplied?
        RuleBinding::new("146", TypedValue::Bool(false), RuleKind::Boolean)
            .with_group(&["146a", "146b"]),
        // Folded comment text
        RuleBinding::new("147", TypedValue::Text(String::new()), RuleKind::Comment)
            .with_group(&["146a", "146b"]),
    ];

    SurveyTransform {
        survey_id: "023",
        name: "retail sales",
        instruments: &["0102", "0112"],
        table: TransformTable {
            bindings,
            active: ActiveSet::Static,
            pre_steps: vec![PreStep::EnsurePeriodDates {
                start_code: "11",
                end_code: "12",
            }],
        },
        catalog: serde_json::json!({
            "survey_id": "023",
            "title": "Retail Sales Survey",
            "codes": {
                "146a": "Turnover",
                "146b": "Staffing"
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_common::{Identifiers, RawAnswers};

    fn identifiers(period: &str) -> Identifiers {
        let submission: courier_common::Submission = serde_json::from_str(&format!(
            r#"{{
                "tx_id": "0f534ffc-9442-414c-b39f-a756b4adc6cb",
                "survey_id": "023",
                "submitted_at": "2016-03-12T10:39:40Z",
                "collection": {{"instrument_id": "0102", "period": "{period}"}},
                "metadata": {{"user_id": "789473423", "ru_ref": "12345678901A"}}
            }}"#
        ))
        .unwrap();
        Identifiers::resolve(&submission, 1000, None).unwrap()
    }

    fn answers(pairs: &[(&str, &str)]) -> RawAnswers {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn emits_the_full_static_code_set() {
        let survey = survey();
        let derived = survey
            .table
            .run(&answers(&[("20", "5500")]), &identifiers("200911"), None);
        let codes: Vec<&str> = derived.iter().map(|(c, _)| c).collect();
        assert_eq!(
            codes,
            vec!["11", "12", "20", "21", "22", "23", "26", "50", "146", "147"]
        );
    }

    #[test]
    fn four_digit_period_synthesizes_century_dates() {
        let survey = survey();
        let derived = survey
            .table
            .run(&RawAnswers::new(), &identifiers("1912"), None);
        assert_eq!(
            derived.get("11"),
            Some(&TypedValue::Date(NaiveDate::from_ymd_opt(2019, 12, 1).unwrap()))
        );
        assert_eq!(
            derived.get("12"),
            Some(&TypedValue::Date(NaiveDate::from_ymd_opt(2019, 12, 31).unwrap()))
        );
    }

    #[test]
    fn staff_aggregate_sums_all_present_counts() {
        let survey = survey();
        let derived = survey.table.run(
            &answers(&[("23", "3"), ("24", "10"), ("25", "2")]),
            &identifiers("200911"),
            None,
        );
        assert_eq!(derived.get("23"), Some(&TypedValue::Int(15)));
    }
}
