//! Reducer implementations
//!
//! Each reducer inspects the binding's primary code plus its grouped codes
//! in the raw-answer map and returns `Some(value)` or `None`. `None` covers
//! both "nothing to compute" (all referenced codes absent) and "a present
//! operand would not parse"; the dispatcher turns either into the binding's
//! default. Absent codes are skipped, never treated as zero.

use super::{Catalog, RuleBinding, TypedValue};
use courier_common::time;
use courier_common::RawAnswers;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Parse answer text as a decimal. Thousands separators and surrounding
/// whitespace are tolerated.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text.trim().replace(',', "").as_str()).ok()
}

pub fn parse_int(text: &str) -> Option<i64> {
    text.trim().replace(',', "").parse::<i64>().ok()
}

fn referenced<'a>(binding: &'a RuleBinding) -> impl Iterator<Item = &'a str> {
    std::iter::once(binding.code).chain(binding.group.iter().copied())
}

fn round_half_up(value: Decimal, quantum: Decimal) -> Option<Decimal> {
    let scaled = value.checked_div(quantum)?;
    let rounded = scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    rounded.checked_mul(quantum)
}

/// Weighted sum over present operands. A present operand that fails to
/// parse poisons the whole sum (default, not a partial result).
pub(super) fn aggregate(
    binding: &RuleBinding,
    answers: &RawAnswers,
    weights: &[(&'static str, Decimal)],
    round_to: Option<Decimal>,
) -> Option<TypedValue> {
    let mut total = Decimal::ZERO;
    let mut any_present = false;

    for code in referenced(binding) {
        let Some(text) = answers.get(code) else {
            continue;
        };
        let operand = parse_decimal(text)?;
        let weight = weights
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, w)| *w)
            .unwrap_or(Decimal::ONE);
        total = total.checked_add(operand.checked_mul(weight)?)?;
        any_present = true;
    }

    if !any_present {
        return None;
    }
    let total = match round_to {
        Some(quantum) => round_half_up(total, quantum)?,
        None => total,
    };
    Some(TypedValue::Decimal(total))
}

/// Arithmetic mean over the codes actually present; absent codes are
/// excluded from both the sum and the divisor.
pub(super) fn mean(binding: &RuleBinding, answers: &RawAnswers) -> Option<TypedValue> {
    let mut sum = Decimal::ZERO;
    let mut count = 0u32;

    for code in referenced(binding) {
        let Some(text) = answers.get(code) else {
            continue;
        };
        sum = sum.checked_add(parse_decimal(text)?)?;
        count += 1;
    }

    if count == 0 {
        return None;
    }
    Some(TypedValue::Decimal(sum.checked_div(Decimal::from(count))?))
}

fn yes_like(text: &str) -> bool {
    text.trim()
        .get(..3)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("yes"))
}

/// OR-fold of "answer is yes-like" over present codes; absent codes are
/// skipped rather than counted as false.
pub(super) fn match_any(binding: &RuleBinding, answers: &RawAnswers) -> Option<TypedValue> {
    let mut any_present = false;
    let mut matched = false;

    for code in referenced(binding) {
        if let Some(text) = answers.get(code) {
            any_present = true;
            matched |= yes_like(text);
        }
    }

    any_present.then_some(TypedValue::Bool(matched))
}

fn catalog_label<'a>(catalog: Option<&'a Catalog>, code: &str) -> Option<&'a str> {
    catalog?.get("codes")?.get(code)?.as_str()
}

/// Newline-joined fold of present, non-empty answers in declaration order.
/// When the catalog names a code, its text is prefixed with that label.
pub(super) fn comment(
    binding: &RuleBinding,
    answers: &RawAnswers,
    catalog: Option<&Catalog>,
) -> Option<TypedValue> {
    let mut lines: Vec<String> = Vec::new();

    for code in referenced(binding) {
        let Some(text) = answers.get(code) else {
            continue;
        };
        if text.is_empty() {
            continue;
        }
        match catalog_label(catalog, code) {
            Some(label) => lines.push(format!("{}: {}", label, text)),
            None => lines.push(text.clone()),
        }
    }

    if lines.is_empty() {
        return None;
    }
    Some(TypedValue::Text(lines.join("\n")))
}

/// Parse every present code as a date, discard the unparsable, sort
/// ascending.
pub(super) fn events(binding: &RuleBinding, answers: &RawAnswers) -> Option<TypedValue> {
    let mut dates: Vec<chrono::NaiveDate> = Vec::new();
    let mut any_present = false;

    for code in referenced(binding) {
        if let Some(text) = answers.get(code) {
            any_present = true;
            if let Some(date) = time::parse_date(text) {
                dates.push(date);
            }
        }
    }

    if !any_present {
        return None;
    }
    dates.sort_unstable();
    Some(TypedValue::Dates(dates))
}

/// Primary code as a scalar date.
pub(super) fn date(binding: &RuleBinding, answers: &RawAnswers) -> Option<TypedValue> {
    let text = answers.get(binding.code)?;
    time::parse_date(text).map(TypedValue::Date)
}

/// Bounded integer, >= 0; out-of-range or unparsable degrades to default.
pub(super) fn unsigned_integer(binding: &RuleBinding, answers: &RawAnswers) -> Option<TypedValue> {
    let value = parse_int(answers.get(binding.code)?)?;
    (value >= 0).then_some(TypedValue::Int(value))
}

/// Bounded numeric, 0-100 inclusive.
pub(super) fn percentage(binding: &RuleBinding, answers: &RawAnswers) -> Option<TypedValue> {
    let value = parse_decimal(answers.get(binding.code)?)?;
    (value >= Decimal::ZERO && value <= Decimal::from(100))
        .then_some(TypedValue::Decimal(value))
}

/// True when any referenced code is present and non-empty. Returns `None`
/// only when no referenced code was supplied at all, so a declared default
/// still governs the fully-absent case.
pub(super) fn boolean(binding: &RuleBinding, answers: &RawAnswers) -> Option<TypedValue> {
    let mut any_present = false;
    let mut non_empty = false;

    for code in referenced(binding) {
        if let Some(text) = answers.get(code) {
            any_present = true;
            non_empty |= !text.trim().is_empty();
        }
    }

    any_present.then_some(TypedValue::Bool(non_empty))
}

/// Primary answer verbatim; the dispatcher coerces it to the default's type.
pub(super) fn passthrough(binding: &RuleBinding, answers: &RawAnswers) -> Option<TypedValue> {
    answers
        .get(binding.code)
        .map(|text| TypedValue::Text(text.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{apply, RuleKind};
    use chrono::NaiveDate;

    fn answers(pairs: &[(&str, &str)]) -> RawAnswers {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn mean_excludes_absent_codes_from_divisor() {
        let binding = RuleBinding::new("120", TypedValue::Decimal(Decimal::ZERO), RuleKind::Mean)
            .with_group(&["121", "122"]);
        // Only two of three codes present: (10 + 20) / 2, never / 3
        let got = apply(&binding, &answers(&[("120", "10"), ("122", "20")]), None);
        assert_eq!(got, TypedValue::Decimal(Decimal::from(15)));
    }

    #[test]
    fn unsigned_integer_never_goes_negative() {
        let binding = RuleBinding::new("70", TypedValue::Int(0), RuleKind::UnsignedInteger);
        assert_eq!(apply(&binding, &answers(&[("70", "-4")]), None), TypedValue::Int(0));
        assert_eq!(
            apply(&binding, &answers(&[("70", "4 apples")]), None),
            TypedValue::Int(0)
        );
        assert_eq!(apply(&binding, &answers(&[("70", "1,200")]), None), TypedValue::Int(1200));
    }

    #[test]
    fn percentage_is_bounded_inclusive() {
        let binding =
            RuleBinding::new("90", TypedValue::Decimal(Decimal::ZERO), RuleKind::Percentage);
        assert_eq!(
            apply(&binding, &answers(&[("90", "100")]), None),
            TypedValue::Decimal(Decimal::from(100))
        );
        assert_eq!(
            apply(&binding, &answers(&[("90", "100.1")]), None),
            TypedValue::Decimal(Decimal::ZERO)
        );
        assert_eq!(
            apply(&binding, &answers(&[("90", "-1")]), None),
            TypedValue::Decimal(Decimal::ZERO)
        );
    }

    #[test]
    fn match_any_skips_absent_and_folds_or() {
        let binding = RuleBinding::new("100", TypedValue::Bool(false), RuleKind::MatchAny)
            .with_group(&["100f", "100m"]);
        assert_eq!(
            apply(&binding, &answers(&[("100f", "No"), ("100m", "Yes, in August")]), None),
            TypedValue::Bool(true)
        );
        assert_eq!(
            apply(&binding, &answers(&[("100f", "No")]), None),
            TypedValue::Bool(false)
        );
    }

    #[test]
    fn events_discards_unparsable_and_sorts() {
        let binding = RuleBinding::new("210", TypedValue::Dates(vec![]), RuleKind::Events)
            .with_group(&["211", "212"]);
        let got = apply(
            &binding,
            &answers(&[("210", "30/11/2009"), ("211", "not a date"), ("212", "2009-11-01")]),
            None,
        );
        assert_eq!(
            got,
            TypedValue::Dates(vec![
                NaiveDate::from_ymd_opt(2009, 11, 1).unwrap(),
                NaiveDate::from_ymd_opt(2009, 11, 30).unwrap(),
            ])
        );
    }

    #[test]
    fn boolean_true_on_any_non_empty() {
        let binding = RuleBinding::new("146", TypedValue::Bool(false), RuleKind::Boolean)
            .with_group(&["147"]);
        assert_eq!(
            apply(&binding, &answers(&[("147", "some comment")]), None),
            TypedValue::Bool(true)
        );
        assert_eq!(
            apply(&binding, &answers(&[("146", "  ")]), None),
            TypedValue::Bool(false)
        );
    }

    #[test]
    fn comment_folds_with_catalog_labels() {
        let binding = RuleBinding::new("300", TypedValue::Text(String::new()), RuleKind::Comment)
            .with_group(&["300f"]);
        let catalog = serde_json::json!({
            "codes": { "300": "Weekly", "300f": "Fortnightly" }
        });
        let got = apply(
            &binding,
            &answers(&[("300", "first"), ("300f", "second")]),
            Some(&catalog),
        );
        assert_eq!(got, TypedValue::Text("Weekly: first\nFortnightly: second".into()));
    }

    #[test]
    fn passthrough_coerces_to_default_kind() {
        let binding = RuleBinding::new("11", TypedValue::Int(0), RuleKind::Passthrough);
        assert_eq!(apply(&binding, &answers(&[("11", "42")]), None), TypedValue::Int(42));
        // Unparsable under the declared type degrades to the default
        assert_eq!(apply(&binding, &answers(&[("11", "x")]), None), TypedValue::Int(0));
    }

    #[test]
    fn round_half_up_quantum() {
        assert_eq!(
            round_half_up(Decimal::new(8005, 1), Decimal::ONE).unwrap(),
            Decimal::from(801)
        );
        assert_eq!(
            round_half_up(Decimal::new(1235, 2), Decimal::new(1, 1)).unwrap(),
            Decimal::new(124, 1)
        );
    }
}
