use std::io::Write;

use tiff::encoder::compression::DeflateLevel;
use tiff::encoder::{colortype, Compression, TiffEncoder};
use tiff::tags::Predictor;
use tracing::debug;

use crate::image_pipeline::common::error::{IspError, Result};
use crate::image_pipeline::common::types::Rgb8Image;
use crate::image_pipeline::output::types::TiffCompression;
use crate::image_pipeline::output::writer::ImageWriter;

/// 8-bit RGB TIFF with selectable compression.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardTiffWriter {
    pub compression: TiffCompression,
    /// Horizontal differencing; only pays off with LZW or Deflate
    pub horizontal_predictor: bool,
}

impl StandardTiffWriter {
    pub fn new(compression: TiffCompression) -> Self {
        Self {
            compression,
            horizontal_predictor: false,
        }
    }

    pub fn with_predictor(mut self, enabled: bool) -> Self {
        self.horizontal_predictor = enabled;
        self
    }
}

impl ImageWriter for StandardTiffWriter {
    fn write_rgb8(&self, image: &Rgb8Image, output: &mut dyn Write) -> Result<()> {
        debug!("Encoding TIFF image: {}x{} ({:?})", image.width, image.height, self.compression);

        let mut buffer = Vec::new();

        let compression = match self.compression {
            TiffCompression::None => Compression::Uncompressed,
            TiffCompression::Lzw => Compression::Lzw,
            TiffCompression::DeflateFast => Compression::Deflate(DeflateLevel::Fast),
            TiffCompression::DeflateBalanced => Compression::Deflate(DeflateLevel::Balanced),
            TiffCompression::DeflateBest => Compression::Deflate(DeflateLevel::Best),
        };

        let mut encoder = TiffEncoder::new(std::io::Cursor::new(&mut buffer))
            .map_err(|e| IspError::Encode(e.to_string()))?
            .with_compression(compression);

        if self.horizontal_predictor {
            encoder = encoder.with_predictor(Predictor::Horizontal);
        }

        encoder
            .write_image::<colortype::RGB8>(image.width as u32, image.height as u32, &image.data)
            .map_err(|e| IspError::Encode(e.to_string()))?;

        output.write_all(&buffer)?;

        debug!("TIFF encoding complete");
        Ok(())
    }
}
