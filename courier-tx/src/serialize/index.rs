//! Image index (manifest)
//!
//! One CSV row per page image. The ordered image name list is the
//! deterministic input; rows carry the submission timestamp in two
//! formats plus the Windows-style destination of each image. Timestamps
//! come from the submission, not the wall clock, so identical submissions
//! produce identical manifests.

use courier_common::{time, Identifiers};

/// Manifest rows for an ordered list of image names.
pub fn rows(identifiers: &Identifiers, image_path: &str, image_names: &[String]) -> Vec<String> {
    let stamp_long = identifiers.submitted_at.format("%d/%m/%Y %H:%M:%S");
    let stamp_short = identifiers.submitted_at.format("%Y%m%d");
    let destination = image_path.replace('/', "\\");
    let total = image_names.len();

    image_names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            format!(
                "{},{},\\\\{}\\{},{},{},{},{:03},{:03}",
                stamp_long,
                stamp_short,
                destination,
                name,
                identifiers.survey_id,
                identifiers.ru_ref,
                time::normalize_period(&identifiers.period),
                i + 1,
                total,
            )
        })
        .collect()
}

/// Full index file content with a trailing newline.
pub fn render(identifiers: &Identifiers, image_path: &str, image_names: &[String]) -> String {
    let mut text = rows(identifiers, image_path, image_names).join("\n");
    text.push('\n');
    text
}
