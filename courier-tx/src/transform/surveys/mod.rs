//! Per-survey transform declarations
//!
//! Each survey family declares one ordered rule table, an activation mode,
//! its pre-processing steps and an opaque catalog. The registry is the only
//! lookup point; unknown survey and unknown instrument are distinct
//! failures so the caller can report them separately.

pub mod monthly_business;
pub mod retail;
pub mod weekly_pay;

use crate::rules::Catalog;
use crate::transform::TransformTable;
use courier_common::{Error, Result};
use once_cell::sync::Lazy;

/// One registered survey family.
pub struct SurveyTransform {
    pub survey_id: &'static str,
    pub name: &'static str,
    pub instruments: &'static [&'static str],
    pub table: TransformTable,
    pub catalog: Catalog,
}

static REGISTRY: Lazy<Vec<SurveyTransform>> = Lazy::new(|| {
    vec![
        weekly_pay::survey(),
        retail::survey(),
        monthly_business::survey(),
    ]
});

/// All registered survey families.
pub fn all() -> &'static [SurveyTransform] {
    &REGISTRY
}

/// Find the transform for a survey/instrument pair.
pub fn lookup(survey_id: &str, instrument_id: &str) -> Result<&'static SurveyTransform> {
    let survey = REGISTRY
        .iter()
        .find(|s| s.survey_id == survey_id)
        .ok_or_else(|| Error::UnknownSurvey(survey_id.to_string()))?;

    if !survey.instruments.contains(&instrument_id) {
        return Err(Error::UnknownInstrument(format!(
            "{} for survey {}",
            instrument_id, survey_id
        )));
    }
    Ok(survey)
}
