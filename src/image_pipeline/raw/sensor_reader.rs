//! Reader for headerless sensor dumps.
//!
//! Frames captured straight off the MIPI receiver carry no metadata, so the
//! geometry, pixel format and CFA layout have to be supplied up front.

use tracing::debug;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::raw::decoder::RawDecoder;
use crate::image_pipeline::raw::reader::RawFrameReader;
use crate::image_pipeline::raw::types::{BayerGrid, FrameGeometry, RawFrame};

/// Decodes raw buffers according to a fixed [`FrameGeometry`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SensorDumpReader {
    geometry: FrameGeometry,
}

impl SensorDumpReader {
    pub fn new(geometry: FrameGeometry) -> Self {
        Self { geometry }
    }

    pub fn geometry(&self) -> &FrameGeometry {
        &self.geometry
    }
}

impl RawFrameReader for SensorDumpReader {
    /// Reads one frame of `geometry.frame_bytes()` bytes.
    ///
    /// Trailing bytes past the last row are ignored; a short buffer is a
    /// [`FormatError::BufferTooSmall`](crate::image_pipeline::FormatError::BufferTooSmall).
    fn read_raw(&self, data: &[u8]) -> Result<BayerGrid> {
        let g = &self.geometry;
        debug!("Reading {} byte sensor dump as {}x{} {}", data.len(), g.width, g.height, g.format);

        let frame = RawFrame::new(data, g.width, g.height, g.format, g.stride)?;
        RawDecoder::new(g.cfa)
            .with_low_bit_order(g.low_bit_order)
            .decode(&frame)
    }
}
