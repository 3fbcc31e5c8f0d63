//! Identifier resolution
//!
//! Extracts the canonical identifier set from a raw submission. Resolution
//! is all-or-nothing: either every field is derivable or the whole request
//! fails with a single error naming each missing field. No partial
//! identifier record is ever produced.

use crate::submission::Submission;
use crate::{time, Error, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Canonical identifier set for one in-flight submission.
///
/// Created once per request by [`Identifiers::resolve`]; never mutated.
#[derive(Debug, Clone)]
pub struct Identifiers {
    pub sequence_no: u32,
    pub batch_number: u32,
    pub tx_id: Uuid,
    pub survey_id: String,
    pub instrument_id: String,
    pub user_id: String,
    pub submitted_at: DateTime<Utc>,
    /// Digit-only respondent reference
    pub ru_ref: String,
    /// Trailing check character split off the reference; may be empty
    pub ru_check: String,
    /// Reporting period, 4 or 6 digit text as supplied
    pub period: String,
}

impl Identifiers {
    /// Resolve identifiers from a submission. Pure function of its inputs.
    ///
    /// `batch_number` defaults to 0 when not supplied.
    pub fn resolve(
        submission: &Submission,
        sequence_no: u32,
        batch_number: Option<u32>,
    ) -> Result<Self> {
        let mut missing: Vec<&str> = Vec::new();

        let tx_id = match Uuid::parse_str(submission.tx_id.trim()) {
            Ok(id) => Some(id),
            Err(_) => {
                missing.push("tx_id");
                None
            }
        };

        if submission.survey_id.is_empty() {
            missing.push("survey_id");
        }
        if submission.collection.instrument_id.is_empty() {
            missing.push("collection.instrument_id");
        }

        let period = submission.collection.period.as_str();
        if !is_valid_period(period) {
            missing.push("collection.period");
        }

        let (ru_ref, ru_check) = split_ru_ref(&submission.metadata.ru_ref);
        if ru_ref.is_empty() {
            missing.push("metadata.ru_ref");
        }
        if submission.metadata.user_id.is_empty() {
            missing.push("metadata.user_id");
        }

        let submitted_at = match time::parse_timestamp(&submission.submitted_at) {
            Some(ts) => Some(ts),
            None => {
                missing.push("submitted_at");
                None
            }
        };

        // tx_id and submitted_at are Some exactly when their names were not
        // pushed onto the missing list
        match (tx_id, submitted_at) {
            (Some(tx_id), Some(submitted_at)) if missing.is_empty() => Ok(Identifiers {
                sequence_no,
                batch_number: batch_number.unwrap_or(0),
                tx_id,
                survey_id: submission.survey_id.clone(),
                instrument_id: submission.collection.instrument_id.clone(),
                user_id: submission.metadata.user_id.clone(),
                submitted_at,
                ru_ref,
                ru_check,
                period: period.to_string(),
            }),
            _ => Err(Error::MissingIdentifier(missing.join(", "))),
        }
    }
}

fn is_valid_period(period: &str) -> bool {
    (period.len() == 4 || period.len() == 6) && period.bytes().all(|b| b.is_ascii_digit())
}

/// Split a respondent reference into its digit reference and trailing check
/// character. The check character is only split off when alphabetic.
fn split_ru_ref(raw: &str) -> (String, String) {
    let raw = raw.trim();
    match raw.chars().last() {
        Some(last) if last.is_ascii_alphabetic() => (
            raw[..raw.len() - last.len_utf8()].to_string(),
            last.to_string(),
        ),
        _ => (raw.to_string(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::Submission;

    fn sample() -> Submission {
        serde_json::from_str(
            r#"{
                "tx_id": "0f534ffc-9442-414c-b39f-a756b4adc6cb",
                "survey_id": "134",
                "submitted_at": "2016-03-12T10:39:40Z",
                "collection": {"instrument_id": "0005", "period": "200911"},
                "metadata": {"user_id": "789473423", "ru_ref": "12345678901A"},
                "data": {"40": "1600"}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn resolves_complete_submission() {
        let ids = Identifiers::resolve(&sample(), 1000, None).unwrap();
        assert_eq!(ids.sequence_no, 1000);
        assert_eq!(ids.batch_number, 0);
        assert_eq!(ids.survey_id, "134");
        assert_eq!(ids.instrument_id, "0005");
        assert_eq!(ids.ru_ref, "12345678901");
        assert_eq!(ids.ru_check, "A");
        assert_eq!(ids.period, "200911");
    }

    #[test]
    fn batch_number_is_carried() {
        let ids = Identifiers::resolve(&sample(), 1, Some(30001)).unwrap();
        assert_eq!(ids.batch_number, 30001);
    }

    #[test]
    fn ru_ref_without_check_letter() {
        let mut s = sample();
        s.metadata.ru_ref = "49900001225".to_string();
        let ids = Identifiers::resolve(&s, 1, None).unwrap();
        assert_eq!(ids.ru_ref, "49900001225");
        assert_eq!(ids.ru_check, "");
    }

    #[test]
    fn missing_fields_are_enumerated_by_name() {
        let mut s = sample();
        s.tx_id.clear();
        s.collection.period = "20091".to_string(); // five digits, invalid
        s.metadata.user_id.clear();
        let err = Identifiers::resolve(&s, 1, None).unwrap_err();
        match err {
            Error::MissingIdentifier(names) => {
                assert!(names.contains("tx_id"), "{names}");
                assert!(names.contains("collection.period"), "{names}");
                assert!(names.contains("metadata.user_id"), "{names}");
                assert!(!names.contains("survey_id"), "{names}");
            }
            other => panic!("expected MissingIdentifier, got {other:?}"),
        }
    }

    #[test]
    fn unparsable_timestamp_is_a_missing_identifier() {
        let mut s = sample();
        s.submitted_at = "twelve past ten".to_string();
        let err = Identifiers::resolve(&s, 1, None).unwrap_err();
        assert!(matches!(err, Error::MissingIdentifier(ref names) if names == "submitted_at"));
    }

    #[test]
    fn never_partially_resolves() {
        let err = Identifiers::resolve(&Submission::default(), 1, None).unwrap_err();
        let Error::MissingIdentifier(names) = err else {
            panic!("expected MissingIdentifier");
        };
        for field in [
            "tx_id",
            "survey_id",
            "collection.instrument_id",
            "collection.period",
            "metadata.ru_ref",
            "metadata.user_id",
            "submitted_at",
        ] {
            assert!(names.contains(field), "missing {field} in {names}");
        }
    }
}
