//! Raster frame demultiplexing
//!
//! The rasterizer writes N frames back-to-back with no delimiter. Each
//! frame is self-describing: a whitespace-separated header (`P6` tag,
//! width, height, max sample value), one whitespace byte, then exactly
//! 3 * width * height bytes of pixel data. Splitting therefore walks the
//! stream header by header, slicing exact lengths; it never looks for a
//! terminator.

use courier_common::{Error, Result};

/// Frame tag the rasterizer emits.
const TAG: &[u8] = b"P6";

const BYTES_PER_PIXEL: usize = 3;

/// One undelimited raster frame, bytes spanning header plus pixel data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

/// Split a concatenated stream into frames. Zero frames (empty stream) is
/// valid; a malformed header or short pixel payload is not.
pub fn split_frames(stream: &[u8]) -> Result<Vec<Frame>> {
    let mut frames = Vec::new();
    let mut offset = 0;

    while offset < stream.len() {
        let frame = read_frame(&stream[offset..], offset)?;
        offset += frame.bytes.len();
        frames.push(frame);
    }

    Ok(frames)
}

fn read_frame(stream: &[u8], stream_offset: usize) -> Result<Frame> {
    let mut pos = 0;

    let tag = read_token(stream, &mut pos)
        .ok_or_else(|| unframeable(stream_offset, "missing frame tag"))?;
    if tag != TAG {
        return Err(unframeable(
            stream_offset,
            &format!("bad frame tag {:?}", String::from_utf8_lossy(tag)),
        ));
    }

    let width = read_number(stream, &mut pos)
        .ok_or_else(|| unframeable(stream_offset, "missing width"))?;
    let height = read_number(stream, &mut pos)
        .ok_or_else(|| unframeable(stream_offset, "missing height"))?;
    let _max_sample = read_number(stream, &mut pos)
        .ok_or_else(|| unframeable(stream_offset, "missing max sample value"))?;

    // Exactly one whitespace byte separates the header from pixel data
    match stream.get(pos) {
        Some(b) if b.is_ascii_whitespace() => pos += 1,
        _ => return Err(unframeable(stream_offset, "missing header terminator")),
    }

    let pixel_len = BYTES_PER_PIXEL
        .checked_mul(width as usize)
        .and_then(|n| n.checked_mul(height as usize))
        .ok_or_else(|| unframeable(stream_offset, "frame dimensions overflow"))?;
    let total = pos + pixel_len;
    if stream.len() < total {
        return Err(unframeable(
            stream_offset,
            &format!(
                "truncated frame: need {} bytes, have {}",
                total,
                stream.len()
            ),
        ));
    }

    Ok(Frame {
        width,
        height,
        bytes: stream[..total].to_vec(),
    })
}

fn read_token<'a>(stream: &'a [u8], pos: &mut usize) -> Option<&'a [u8]> {
    while *pos < stream.len() && stream[*pos].is_ascii_whitespace() {
        *pos += 1;
    }
    let start = *pos;
    while *pos < stream.len() && !stream[*pos].is_ascii_whitespace() {
        *pos += 1;
    }
    (*pos > start).then(|| &stream[start..*pos])
}

fn read_number(stream: &[u8], pos: &mut usize) -> Option<u32> {
    let token = read_token(stream, pos)?;
    std::str::from_utf8(token).ok()?.parse().ok()
}

fn unframeable(offset: usize, detail: &str) -> Error {
    Error::Rasterization(format!("unframeable stream at byte {}: {}", offset, detail))
}
