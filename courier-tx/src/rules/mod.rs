//! Rule engine
//!
//! A small library of pure reducers that combine zero or more raw answers
//! into one typed derived value. The rule set is a closed enum interpreted
//! by a single dispatch function; every reducer is total. A reducer reports
//! failure by returning `None` and [`apply`] folds that into the binding's
//! declared default uniformly, so coercion failures never escape this
//! module and the orchestrator can run every binding unconditionally.
//!
//! The variant of a binding's default value fixes the binding's output
//! type: whatever a reducer produces is coerced to that variant or replaced
//! by the default.

pub mod reducers;

use chrono::NaiveDate;
use courier_common::RawAnswers;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Opaque survey catalog, keyed configuration consumed as-is.
pub type Catalog = serde_json::Value;

/// One derived value. Numeric values use `Decimal`, never `f64`.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
    Text(String),
    Date(NaiveDate),
    Dates(Vec<NaiveDate>),
}

/// Discriminant of [`TypedValue`], used for the output-type contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Int,
    Decimal,
    Text,
    Date,
    Dates,
}

impl TypedValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            TypedValue::Bool(_) => ValueKind::Bool,
            TypedValue::Int(_) => ValueKind::Int,
            TypedValue::Decimal(_) => ValueKind::Decimal,
            TypedValue::Text(_) => ValueKind::Text,
            TypedValue::Date(_) => ValueKind::Date,
            TypedValue::Dates(_) => ValueKind::Dates,
        }
    }

    /// Coerce into `kind`. Unsupported conversions return `None`, which the
    /// dispatcher resolves to the binding default.
    pub fn coerce_to(self, kind: ValueKind) -> Option<TypedValue> {
        if self.kind() == kind {
            return Some(self);
        }
        match (self, kind) {
            (TypedValue::Decimal(d), ValueKind::Int) => {
                let rounded =
                    d.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
                rounded.to_i64().map(TypedValue::Int)
            }
            (TypedValue::Int(i), ValueKind::Decimal) => {
                Some(TypedValue::Decimal(Decimal::from(i)))
            }
            (TypedValue::Bool(b), ValueKind::Int) => Some(TypedValue::Int(i64::from(b))),
            (TypedValue::Int(i), ValueKind::Text) => Some(TypedValue::Text(i.to_string())),
            (TypedValue::Decimal(d), ValueKind::Text) => Some(TypedValue::Text(d.to_string())),
            (TypedValue::Text(t), ValueKind::Bool) => Some(TypedValue::Bool(!t.is_empty())),
            (TypedValue::Text(t), ValueKind::Int) => {
                reducers::parse_int(&t).map(TypedValue::Int)
            }
            (TypedValue::Text(t), ValueKind::Decimal) => {
                reducers::parse_decimal(&t).map(TypedValue::Decimal)
            }
            (TypedValue::Text(t), ValueKind::Date) => {
                courier_common::time::parse_date(&t).map(TypedValue::Date)
            }
            (TypedValue::Dates(ds), ValueKind::Bool) => Some(TypedValue::Bool(!ds.is_empty())),
            (TypedValue::Dates(ds), ValueKind::Int) => Some(TypedValue::Int(ds.len() as i64)),
            (TypedValue::Dates(ds), ValueKind::Text) => Some(TypedValue::Text(
                ds.iter()
                    .map(|d| d.format("%d/%m/%Y").to_string())
                    .collect::<Vec<_>>()
                    .join(","),
            )),
            (TypedValue::Dates(ds), ValueKind::Date) => {
                ds.into_iter().next().map(TypedValue::Date)
            }
            (TypedValue::Date(d), ValueKind::Dates) => Some(TypedValue::Dates(vec![d])),
            (TypedValue::Date(d), ValueKind::Text) => {
                Some(TypedValue::Text(d.format("%d/%m/%Y").to_string()))
            }
            _ => None,
        }
    }
}

/// Closed set of reducer kinds. Kind-specific parameters live on the
/// variant; the grouped input codes live on the binding.
#[derive(Debug, Clone)]
pub enum RuleKind {
    /// Primary value plus each grouped value times its declared weight
    /// (weight 1 when undeclared), optionally rounded half-up to `round_to`
    Aggregate {
        weights: Vec<(&'static str, Decimal)>,
        round_to: Option<Decimal>,
    },
    /// Arithmetic mean over the codes actually present
    Mean,
    /// True when any present code is yes-like
    MatchAny,
    /// Newline-joined fold of present answers, labelled from the catalog
    Comment,
    /// Every present code parsed as a date, unparsable discarded, sorted
    Events,
    /// Primary code parsed as a scalar date
    Date,
    /// Bounded integer, >= 0
    UnsignedInteger,
    /// Bounded numeric, 0-100 inclusive
    Percentage,
    /// True when any referenced code is present and non-empty
    Boolean,
    /// Primary answer coerced to the default's type
    Passthrough,
}

/// One row of a transform table: output code, typed default, grouped input
/// codes, and the reducer that combines them.
#[derive(Debug, Clone)]
pub struct RuleBinding {
    pub code: &'static str,
    pub default: TypedValue,
    pub group: Vec<&'static str>,
    pub rule: RuleKind,
}

impl RuleBinding {
    pub fn new(code: &'static str, default: TypedValue, rule: RuleKind) -> Self {
        Self {
            code,
            default,
            group: Vec::new(),
            rule,
        }
    }

    pub fn with_group(mut self, group: &[&'static str]) -> Self {
        self.group = group.to_vec();
        self
    }
}

/// Evaluate one binding against the raw answers.
///
/// Total: parse failures, empty input sets and unsupported coercions all
/// degrade to the declared default.
pub fn apply(binding: &RuleBinding, answers: &RawAnswers, catalog: Option<&Catalog>) -> TypedValue {
    let computed = match &binding.rule {
        RuleKind::Aggregate { weights, round_to } => {
            reducers::aggregate(binding, answers, weights, *round_to)
        }
        RuleKind::Mean => reducers::mean(binding, answers),
        RuleKind::MatchAny => reducers::match_any(binding, answers),
        RuleKind::Comment => reducers::comment(binding, answers, catalog),
        RuleKind::Events => reducers::events(binding, answers),
        RuleKind::Date => reducers::date(binding, answers),
        RuleKind::UnsignedInteger => reducers::unsigned_integer(binding, answers),
        RuleKind::Percentage => reducers::percentage(binding, answers),
        RuleKind::Boolean => reducers::boolean(binding, answers),
        RuleKind::Passthrough => reducers::passthrough(binding, answers),
    };

    computed
        .and_then(|value| value.coerce_to(binding.default.kind()))
        .unwrap_or_else(|| binding.default.clone())
}
