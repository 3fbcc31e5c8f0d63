//! Document-to-images pipeline
//!
//! The external renderer turns a catalog plus answers into a document; the
//! external rasterizer turns that document into one undelimited stream of
//! raster frames; the demultiplexer splits the stream back into pages; the
//! sequencer assigns each page its deterministic downstream name.

pub mod demux;
pub mod rasterizer;
pub mod renderer;
pub mod sequencer;

pub use demux::Frame;
pub use rasterizer::{CommandRasterizer, Rasterizer};
pub use renderer::{CommandRenderer, DocumentRenderer, RenderedDocument};
pub use sequencer::Sequencer;

/// One page image with its assigned sequence number.
#[derive(Debug, Clone)]
pub struct PageImage {
    pub sequence: u64,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl PageImage {
    /// Deterministic downstream file name for this page.
    pub fn file_name(&self) -> String {
        format!("S{:09}.JPG", self.sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_nine_digit_zero_padded() {
        let image = PageImage {
            sequence: 1000,
            width: 1,
            height: 1,
            bytes: vec![],
        };
        assert_eq!(image.file_name(), "S000001000.JPG");
    }
}
