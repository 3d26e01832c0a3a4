use std::io::Write;

use tracing::debug;

use crate::image_pipeline::common::error::{IspError, Result};
use crate::image_pipeline::common::types::Rgb8Image;
use crate::image_pipeline::output::writer::ImageWriter;

/// 8-bit RGB PNG, the default output container.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngWriter;

impl ImageWriter for PngWriter {
    fn write_rgb8(&self, image: &Rgb8Image, output: &mut dyn Write) -> Result<()> {
        debug!("Encoding PNG image: {}x{}", image.width, image.height);

        let mut buffer = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buffer, image.width as u32, image.height as u32);
            encoder.set_color(png::ColorType::Rgb);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder
                .write_header()
                .map_err(|e| IspError::Encode(e.to_string()))?;
            writer
                .write_image_data(&image.data)
                .map_err(|e| IspError::Encode(e.to_string()))?;
            writer.finish().map_err(|e| IspError::Encode(e.to_string()))?;
        }

        output.write_all(&buffer)?;
        debug!("PNG encoding complete");
        Ok(())
    }
}
