//! IDBR receipt record
//!
//! A single acknowledgement line:
//! `{ru_ref}:{check}:{survey_id}:{period}` with the survey id zero-padded
//! to three digits and the period normalized to six.

use courier_common::{time, Identifiers};

/// The receipt line, without a trailing newline.
pub fn line(identifiers: &Identifiers) -> String {
    format!(
        "{}:{}:{:0>3}:{}",
        identifiers.ru_ref,
        identifiers.ru_check,
        identifiers.survey_id,
        time::normalize_period(&identifiers.period)
    )
}

/// Full receipt file content.
pub fn render(identifiers: &Identifiers) -> String {
    let mut text = line(identifiers);
    text.push('\n');
    text
}
