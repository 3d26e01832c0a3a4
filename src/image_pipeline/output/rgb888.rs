//! Headerless interleaved RGB, the hardware pipeline's output format
//!
//! `width * height * 3` bytes, row-major, R then G then B, no padding.

use std::io::Write;

use crate::image_pipeline::common::error::{FormatError, Result};
use crate::image_pipeline::common::types::Rgb8Image;
use crate::image_pipeline::output::writer::ImageWriter;

/// Interprets `bytes` as a `width` x `height` RGB888 frame.
///
/// The length must match exactly; anything else means the producer used a
/// different geometry.
pub fn decode_rgb888(bytes: &[u8], width: usize, height: usize) -> Result<Rgb8Image> {
    let expected = width * height * 3;
    if width == 0 || height == 0 || bytes.len() != expected {
        return Err(FormatError::RgbBufferSize {
            expected,
            actual: bytes.len(),
            width,
            height,
        }
        .into());
    }
    Ok(Rgb8Image {
        width,
        height,
        data: bytes.to_vec(),
    })
}

pub fn encode_rgb888(image: &Rgb8Image) -> &[u8] {
    &image.data
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RawRgbWriter;

impl ImageWriter for RawRgbWriter {
    fn write_rgb8(&self, image: &Rgb8Image, output: &mut dyn Write) -> Result<()> {
        output.write_all(encode_rgb888(image))?;
        Ok(())
    }
}
