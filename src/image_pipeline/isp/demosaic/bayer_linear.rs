use std::io::Cursor;

use bayer::{BayerDepth, CFA, Demosaic, RasterDepth, RasterMut};
use tracing::debug;

use super::DemosaicStrategy;
use crate::image_pipeline::common::error::{IspError, Result};
use crate::image_pipeline::common::types::RgbImage;
use crate::image_pipeline::raw::{BayerPlane, Channel};

const U16_SCALE: f32 = u16::MAX as f32;

/// Linear interpolation from the `bayer` crate.
///
/// The crate works on integer rasters, so the plane is quantized to 16 bits
/// over `[0, max(1.0, peak)]` and scaled back afterwards; sampled values
/// survive up to that quantization step.
#[derive(Debug, Clone, Copy, Default)]
pub struct BayerLinear;

impl DemosaicStrategy for BayerLinear {
    fn name(&self) -> &'static str {
        "bayer-linear"
    }

    fn demosaic(&self, plane: &BayerPlane) -> Result<RgbImage<f32>> {
        let (width, height) = (plane.width, plane.height);
        let peak = plane.samples.iter().copied().fold(1.0f32, f32::max);
        let scale = U16_SCALE / peak;

        let bayer_bytes: Vec<u8> = plane
            .samples
            .iter()
            .flat_map(|&v| ((v.max(0.0) * scale).round() as u16).to_le_bytes())
            .collect();

        let mut output_buf = vec![0u8; width * height * 3 * 2];
        let mut cursor = Cursor::new(&bayer_bytes[..]);
        let mut output_raster = RasterMut::new(width, height, RasterDepth::Depth16, &mut output_buf);

        debug!("Running bayer crate demosaic, CFA={:?}, {}x{}", plane.cfa.tile(), width, height);
        bayer::run_demosaic(
            &mut cursor,
            BayerDepth::Depth16LE,
            cfa_of(plane),
            Demosaic::Linear,
            &mut output_raster,
        )
        .map_err(|e| IspError::InvalidConfig(format!("bayer demosaic failed: {e:?}")))?;

        let data = output_buf
            .chunks_exact(2)
            .map(|b| u16::from_le_bytes([b[0], b[1]]) as f32 / scale)
            .collect();
        Ok(RgbImage { width, height, data })
    }
}

fn cfa_of(plane: &BayerPlane) -> CFA {
    match (plane.channel_at(0, 0), plane.channel_at(0, 1)) {
        (Channel::Red, _) => CFA::RGGB,
        (Channel::Blue, _) => CFA::BGGR,
        (Channel::Green, Channel::Red) => CFA::GRBG,
        (Channel::Green, _) => CFA::GBRG,
    }
}
