//! Request pipeline
//!
//! One [`Processor`] instance serves the whole service; each call to
//! [`Processor::process`] is self-contained and holds no shared mutable
//! state, so requests proceed in parallel freely. The transform side
//! (identifiers -> derived values -> serializers) and the imaging side
//! (render -> rasterize -> demux -> sequence) both feed one archive that
//! belongs to this request alone.

use crate::archive::Archive;
use crate::imaging::{
    demux, CommandRasterizer, CommandRenderer, DocumentRenderer, PageImage, Rasterizer, Sequencer,
};
use crate::serialize::{index, pck, receipt};
use crate::transform::surveys::{self, SurveyTransform};
use courier_common::{config::TxConfig, Error, Identifiers, Result, Submission};

/// Finished package: archive bytes plus its deterministic name and the
/// ordered entry listing.
#[derive(Debug)]
pub struct TransformedPackage {
    pub name: String,
    pub bytes: Vec<u8>,
    pub entry_names: Vec<String>,
}

/// Transform-and-package pipeline with its injected collaborators.
pub struct Processor {
    config: TxConfig,
    renderer: Box<dyn DocumentRenderer>,
    rasterizer: Box<dyn Rasterizer>,
    sequencer: Sequencer,
}

impl Processor {
    /// Build a processor with command-backed collaborators from config.
    pub fn from_config(config: TxConfig) -> Result<Self> {
        let renderer = Box::new(CommandRenderer::new(config.renderer_command.clone())?);
        let rasterizer = Box::new(CommandRasterizer::new(
            config.rasterizer_command.clone(),
            config.rasterizer_timeout(),
        )?);
        let sequencer = Sequencer::from_config(&config)?;
        Ok(Self::new(config, renderer, rasterizer, sequencer))
    }

    /// Build a processor with explicit collaborators (tests inject stubs).
    pub fn new(
        config: TxConfig,
        renderer: Box<dyn DocumentRenderer>,
        rasterizer: Box<dyn Rasterizer>,
        sequencer: Sequencer,
    ) -> Self {
        Self {
            config,
            renderer,
            rasterizer,
            sequencer,
        }
    }

    /// Transform one submission into its downstream package.
    pub async fn process(
        &self,
        raw: &serde_json::Value,
        sequence_no: u32,
        batch_number: Option<u32>,
    ) -> Result<TransformedPackage> {
        let submission: Submission = serde_json::from_value(raw.clone())
            .map_err(|e| Error::MissingIdentifier(format!("unreadable submission: {}", e)))?;
        let identifiers = Identifiers::resolve(&submission, sequence_no, batch_number)?;

        tracing::info!(
            tx_id = %identifiers.tx_id,
            survey_id = %identifiers.survey_id,
            instrument_id = %identifiers.instrument_id,
            sequence_no,
            "transforming submission"
        );

        let survey = surveys::lookup(&identifiers.survey_id, &identifiers.instrument_id)?;
        let derived = survey
            .table
            .run(&submission.data, &identifiers, Some(&survey.catalog));
        let pck_text = pck::render(&derived, &identifiers);
        let receipt_text = receipt::render(&identifiers);

        let images = self.paginate(survey, &submission, &identifiers).await?;
        let image_names: Vec<String> = images.iter().map(PageImage::file_name).collect();
        let index_text = index::render(&identifiers, &self.config.paths.images, &image_names);

        let response_copy = serde_json::to_vec_pretty(raw)
            .map_err(|e| Error::Internal(format!("response copy: {}", e)))?;

        let paths = &self.config.paths;
        let survey_id = identifiers.survey_id.as_str();
        let seq = identifiers.sequence_no;

        let mut archive = Archive::new();
        archive.add(
            format!("{}/{}_{:04}", paths.data, survey_id, seq),
            pck_text.into_bytes(),
        )?;
        archive.add(
            format!(
                "{}/REC{}_{:04}.DAT",
                paths.receipts,
                identifiers.submitted_at.format("%d%m"),
                seq
            ),
            receipt_text.into_bytes(),
        )?;
        for image in images {
            archive.add(
                format!("{}/{}", paths.images, image.file_name()),
                image.bytes,
            )?;
        }
        archive.add(
            format!(
                "{}/EDC_{}_{}_{:04}.csv",
                paths.index,
                survey_id,
                identifiers.submitted_at.format("%d%m%Y"),
                seq
            ),
            index_text.into_bytes(),
        )?;
        archive.add(
            format!("{}/{}_{:04}.json", paths.response, survey_id, seq),
            response_copy,
        )?;

        let entry_names = archive.names().iter().map(|s| s.to_string()).collect();
        let bytes = archive.into_zip()?;

        tracing::info!(
            tx_id = %identifiers.tx_id,
            entries = %format!("{:?}", entry_names),
            archive_bytes = bytes.len(),
            "package assembled"
        );

        Ok(TransformedPackage {
            name: format!("{}_{:04}.zip", survey_id, seq),
            bytes,
            entry_names,
        })
    }

    /// Render, rasterize, demultiplex and number the page images.
    async fn paginate(
        &self,
        survey: &SurveyTransform,
        submission: &Submission,
        identifiers: &Identifiers,
    ) -> Result<Vec<PageImage>> {
        let document = self.renderer.render(&survey.catalog, submission).await?;
        let raster = self.rasterizer.rasterize(&document.bytes).await?;
        let frames = demux::split_frames(&raster)?;

        if let Some(pages) = document.pages {
            if pages as usize != frames.len() {
                tracing::warn!(
                    declared = pages,
                    extracted = frames.len(),
                    "renderer page count disagrees with raster stream"
                );
            }
        }

        let sequences = self
            .sequencer
            .next(identifiers.tx_id, frames.len())
            .await?;

        Ok(frames
            .into_iter()
            .zip(sequences)
            .map(|(frame, sequence)| PageImage {
                sequence,
                width: frame.width,
                height: frame.height,
                bytes: frame.bytes,
            })
            .collect())
    }
}
