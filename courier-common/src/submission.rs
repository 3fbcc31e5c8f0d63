//! Inbound survey submission model
//!
//! The submission is a nested record: identifier fields plus a flat map of
//! question code to answer text. Every field is optional at the serde layer
//! so that a structurally valid JSON body always deserializes; identifier
//! presence is enforced later by [`crate::Identifiers::resolve`], which can
//! then name every missing field at once.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Raw answers: question code -> answer text. Sparse; an absent code is not
/// the same as an empty answer.
pub type RawAnswers = HashMap<String, String>;

/// One survey response as posted by the upstream collection system.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Submission {
    #[serde(default)]
    pub tx_id: String,

    #[serde(default)]
    pub survey_id: String,

    /// Submission timestamp as supplied upstream; format varies by source
    /// system, so it is kept verbatim and parsed during resolution.
    #[serde(default)]
    pub submitted_at: String,

    #[serde(default)]
    pub collection: Collection,

    #[serde(default)]
    pub metadata: Metadata,

    #[serde(default)]
    pub data: RawAnswers,

    /// Document type marker from the upstream system, e.g.
    /// "uk.gov.ons.edc.eq:surveyresponse". Not interpreted here.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub response_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

/// Collection exercise details
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Collection {
    #[serde(default)]
    pub instrument_id: String,

    /// Reporting period, 4 or 6 digit text
    #[serde(default)]
    pub period: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_sid: Option<String>,
}

/// Respondent metadata
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Metadata {
    #[serde(default)]
    pub user_id: String,

    /// Respondent reference: digits plus an optional trailing check letter
    #[serde(default)]
    pub ru_ref: String,
}

impl Submission {
    /// Answer text for a question code, if that code was supplied.
    pub fn answer(&self, code: &str) -> Option<&str> {
        self.data.get(code).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "uk.gov.ons.edc.eq:surveyresponse",
        "origin": "uk.gov.ons.edc.eq",
        "survey_id": "134",
        "version": "0.0.1",
        "tx_id": "0f534ffc-9442-414c-b39f-a756b4adc6cb",
        "collection": {
            "exercise_sid": "hfjdskf",
            "instrument_id": "0005",
            "period": "200911"
        },
        "submitted_at": "2016-03-12T10:39:40Z",
        "metadata": {
            "user_id": "789473423",
            "ru_ref": "12345678901A"
        },
        "data": {
            "40": "1600",
            "300": "Respondent comment."
        }
    }"#;

    #[test]
    fn deserializes_full_submission() {
        let s: Submission = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(s.survey_id, "134");
        assert_eq!(s.collection.instrument_id, "0005");
        assert_eq!(s.collection.period, "200911");
        assert_eq!(s.metadata.ru_ref, "12345678901A");
        assert_eq!(s.answer("40"), Some("1600"));
        assert_eq!(s.answer("999"), None);
    }

    #[test]
    fn missing_fields_deserialize_to_empty() {
        let s: Submission = serde_json::from_str(r#"{"survey_id": "023"}"#).unwrap();
        assert_eq!(s.survey_id, "023");
        assert!(s.tx_id.is_empty());
        assert!(s.collection.period.is_empty());
        assert!(s.data.is_empty());
    }

    #[test]
    fn round_trips_through_json() {
        let s: Submission = serde_json::from_str(SAMPLE).unwrap();
        let text = serde_json::to_string(&s).unwrap();
        let again: Submission = serde_json::from_str(&text).unwrap();
        assert_eq!(again.tx_id, s.tx_id);
        assert_eq!(again.data, s.data);
    }
}
