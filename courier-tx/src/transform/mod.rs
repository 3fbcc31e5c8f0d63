//! Transform orchestration
//!
//! A [`TransformTable`] is a per-survey declarative list of rule bindings.
//! Running a table applies survey pre-processing to a working copy of the
//! raw answers, computes the active output-code subset, then evaluates each
//! binding in declaration order. Output order always equals declaration
//! order and no binding is evaluated twice; downstream serialization
//! depends on both.

pub mod surveys;

use crate::rules::{self, Catalog, RuleBinding, TypedValue};
use courier_common::{time, Identifiers, RawAnswers};
use std::collections::HashSet;

/// Ordered derived-value map. Insertion order is significant.
#[derive(Debug, Clone, Default)]
pub struct DerivedValues {
    entries: Vec<(String, TypedValue)>,
}

impl DerivedValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a derived value. Duplicate codes are rejected to uphold the
    /// one-evaluation-per-binding invariant.
    fn insert(&mut self, code: &str, value: TypedValue) {
        debug_assert!(!self.contains(code), "duplicate derived code {code}");
        if !self.contains(code) {
            self.entries.push((code.to_string(), value));
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.iter().any(|(c, _)| c == code)
    }

    pub fn get(&self, code: &str) -> Option<&TypedValue> {
        self.entries.iter().find(|(c, _)| c == code).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, TypedValue)> for DerivedValues {
    fn from_iter<T: IntoIterator<Item = (String, TypedValue)>>(iter: T) -> Self {
        let mut values = DerivedValues::new();
        for (code, value) in iter {
            values.insert(&code, value);
        }
        values
    }
}

/// Which declared output codes a given request emits.
#[derive(Debug, Clone)]
pub enum ActiveSet {
    /// Every binding, always
    Static,
    /// The union of each raw code's base numeric code and a fixed
    /// mandatory set
    Dynamic { mandatory: &'static [u32] },
}

/// Survey-specific answer rewrites that run before the table, never inside
/// individual reducers.
#[derive(Debug, Clone)]
pub enum PreStep {
    /// Marker code present => every target code forced to "0"
    ZeroOnConfirmation {
        marker: &'static str,
        targets: &'static [&'static str],
    },
    /// Absent period-date codes synthesized from the reporting period
    EnsurePeriodDates {
        start_code: &'static str,
        end_code: &'static str,
    },
}

/// Base numeric code of a raw question code: its leading digits floored to
/// the nearest ten. Groups sibling variants such as weekly/fortnightly/
/// monthly versions of one concept.
pub fn base_code(code: &str) -> Option<u32> {
    let digits: &str = {
        let end = code
            .as_bytes()
            .iter()
            .position(|b| !b.is_ascii_digit())
            .unwrap_or(code.len());
        &code[..end]
    };
    digits.parse::<u32>().ok().map(|n| n / 10 * 10)
}

/// Ordered rule table plus the survey's activation mode and pre-steps.
#[derive(Debug, Clone)]
pub struct TransformTable {
    pub bindings: Vec<RuleBinding>,
    pub active: ActiveSet,
    pub pre_steps: Vec<PreStep>,
}

impl TransformTable {
    /// Apply the table to one submission's answers.
    pub fn run(
        &self,
        answers: &RawAnswers,
        identifiers: &Identifiers,
        catalog: Option<&Catalog>,
    ) -> DerivedValues {
        let answers = self.preprocess(answers, identifiers);
        let active = self.active_codes(&answers);
        let mut derived = DerivedValues::new();

        for binding in &self.bindings {
            if derived.contains(binding.code) {
                tracing::warn!(code = binding.code, "duplicate binding skipped");
                continue;
            }
            if let Some(active) = &active {
                match base_code(binding.code) {
                    Some(base) if active.contains(&base) => {}
                    _ => continue,
                }
            }
            derived.insert(binding.code, rules::apply(binding, &answers, catalog));
        }

        tracing::debug!(
            bindings = self.bindings.len(),
            emitted = derived.len(),
            "transform table applied"
        );
        derived
    }

    /// Run the survey's pre-steps against a working copy of the answers.
    fn preprocess(&self, answers: &RawAnswers, identifiers: &Identifiers) -> RawAnswers {
        let mut answers = answers.clone();
        for step in &self.pre_steps {
            match step {
                PreStep::ZeroOnConfirmation { marker, targets } => {
                    if answers.contains_key(*marker) {
                        tracing::debug!(marker, "confirmation marker present, zeroing group");
                        for target in *targets {
                            answers.insert(target.to_string(), "0".to_string());
                        }
                    }
                }
                PreStep::EnsurePeriodDates {
                    start_code,
                    end_code,
                } => {
                    let period = identifiers.period.as_str();
                    if !answers.contains_key(*start_code) {
                        if let Some(start) = time::period_start(period) {
                            answers.insert(
                                start_code.to_string(),
                                start.format("%d/%m/%Y").to_string(),
                            );
                        }
                    }
                    if !answers.contains_key(*end_code) {
                        if let Some(end) = time::period_end(period) {
                            answers
                                .insert(end_code.to_string(), end.format("%d/%m/%Y").to_string());
                        }
                    }
                }
            }
        }
        answers
    }

    /// `None` means every binding is active.
    fn active_codes(&self, answers: &RawAnswers) -> Option<HashSet<u32>> {
        match &self.active {
            ActiveSet::Static => None,
            ActiveSet::Dynamic { mandatory } => {
                let mut active: HashSet<u32> = mandatory.iter().copied().collect();
                active.extend(answers.keys().filter_map(|code| base_code(code)));
                Some(active)
            }
        }
    }
}
