//! Shared test fixtures: stub collaborators and sample submissions
#![allow(dead_code)]

use async_trait::async_trait;
use courier_common::config::TxConfig;
use courier_common::{Result, Submission};
use courier_tx::imaging::{
    DocumentRenderer, Rasterizer, RenderedDocument, Sequencer,
};
use courier_tx::rules::Catalog;
use courier_tx::Processor;

/// Renderer that returns fixed document bytes without spawning anything.
pub struct StubRenderer {
    pub document: Vec<u8>,
    pub pages: Option<u32>,
}

#[async_trait]
impl DocumentRenderer for StubRenderer {
    async fn render(&self, _catalog: &Catalog, _submission: &Submission) -> Result<RenderedDocument> {
        Ok(RenderedDocument {
            bytes: self.document.clone(),
            pages: self.pages,
        })
    }
}

/// Rasterizer that replays a canned frame stream (or a canned failure).
pub struct StubRasterizer {
    pub result: Result<Vec<u8>>,
}

#[async_trait]
impl Rasterizer for StubRasterizer {
    async fn rasterize(&self, _document: &[u8]) -> Result<Vec<u8>> {
        match &self.result {
            Ok(stream) => Ok(stream.clone()),
            Err(err) => Err(courier_common::Error::Rasterization(err.to_string())),
        }
    }
}

/// One self-describing raster frame.
pub fn frame(width: u32, height: u32, fill: u8) -> Vec<u8> {
    let mut bytes = format!("P6\n{} {}\n255\n", width, height).into_bytes();
    bytes.extend(std::iter::repeat(fill).take((3 * width * height) as usize));
    bytes
}

/// Processor wired with stubs: canned raster stream, derived sequencing.
pub fn stub_processor(raster_stream: Vec<u8>, pages: Option<u32>) -> Processor {
    Processor::new(
        TxConfig::default(),
        Box::new(StubRenderer {
            document: b"rendered document".to_vec(),
            pages,
        }),
        Box::new(StubRasterizer {
            result: Ok(raster_stream),
        }),
        Sequencer::Derived,
    )
}

/// A complete survey-134 submission.
pub fn submission_134() -> serde_json::Value {
    serde_json::json!({
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
            "40": "1600"
        }
    })
}
