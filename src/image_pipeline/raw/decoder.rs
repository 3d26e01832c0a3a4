//! Byte-level decoding of sensor frames into Bayer grids.

use tracing::debug;

use crate::image_pipeline::common::error::{FormatError, Result};
use crate::image_pipeline::raw::cfa::CfaPattern;
use crate::image_pipeline::raw::types::{BayerGrid, LowBitOrder, PixelFormat, RawFrame};

/// Bytes in one RAW10 group: four high bytes plus one byte of remainders.
const PACKED10_GROUP_BYTES: usize = 5;
const PACKED10_GROUP_SAMPLES: usize = 4;

/// Turns validated [`RawFrame`]s into [`BayerGrid`]s for one sensor configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawDecoder {
    pub cfa: CfaPattern,
    pub low_bit_order: LowBitOrder,
}

impl RawDecoder {
    pub fn new(cfa: CfaPattern) -> Self {
        Self {
            cfa,
            low_bit_order: LowBitOrder::default(),
        }
    }

    pub fn with_low_bit_order(mut self, order: LowBitOrder) -> Self {
        self.low_bit_order = order;
        self
    }

    pub fn decode(&self, frame: &RawFrame<'_>) -> Result<BayerGrid> {
        debug!(
            width = frame.width(),
            height = frame.height(),
            stride = frame.stride(),
            format = %frame.format(),
            "Decoding raw frame"
        );

        let width = frame.width();
        let mut samples = Vec::with_capacity(width * frame.height());
        for y in 0..frame.height() {
            let row = frame.pixels(y);
            match frame.format() {
                PixelFormat::Plain8 => samples.extend(row.iter().map(|&b| b as u16)),
                PixelFormat::Packed10Csi2 => unpack_raw10_row(row, width, self.low_bit_order, &mut samples),
            }
        }

        Ok(BayerGrid {
            width,
            height: frame.height(),
            samples,
            bit_depth: frame.format().bit_depth(),
            cfa: self.cfa,
        })
    }
}

/// Decodes `bytes` with the given geometry.
///
/// `stride` defaults to the unpadded row size of `format`.
pub fn decode(
    bytes: &[u8],
    width: usize,
    height: usize,
    format: PixelFormat,
    stride: Option<usize>,
    cfa: CfaPattern,
) -> Result<BayerGrid> {
    let frame = RawFrame::new(bytes, width, height, format, stride)?;
    RawDecoder::new(cfa).decode(&frame)
}

/// Unpacks the first `width` samples of one RAW10 row.
///
/// `packed` holds the row's pixel bytes only; stride padding has already
/// been cut off by [`RawFrame::pixels`].
fn unpack_raw10_row(packed: &[u8], width: usize, order: LowBitOrder, out: &mut Vec<u16>) {
    let mut remaining = width;
    for group in packed.chunks_exact(PACKED10_GROUP_BYTES) {
        let low = group[PACKED10_GROUP_SAMPLES];
        let take = remaining.min(PACKED10_GROUP_SAMPLES);
        for (i, &high) in group[..take].iter().enumerate() {
            let shift = match order {
                LowBitOrder::LsbFirst => 2 * i,
                LowBitOrder::MsbFirst => 6 - 2 * i,
            };
            out.push(((high as u16) << 2) | ((low >> shift) & 0b11) as u16);
        }
        remaining -= take;
    }
}

/// Writes a grid back out as unpadded RAW8, the inverse of decoding `Plain8`.
pub fn encode_plain8(grid: &BayerGrid) -> Result<Vec<u8>> {
    check_bit_depth(grid, PixelFormat::Plain8)?;
    Ok(grid.samples.iter().map(|&s| s as u8).collect())
}

fn check_bit_depth(grid: &BayerGrid, format: PixelFormat) -> Result<()> {
    if grid.bit_depth != format.bit_depth() {
        return Err(FormatError::BitDepthMismatch {
            format,
            expected: format.bit_depth(),
            actual: grid.bit_depth,
        }
        .into());
    }
    Ok(())
}

/// Packs a 10-bit grid into RAW10 rows of `stride` bytes, padding with `pad`.
pub fn encode_packed10(grid: &BayerGrid, stride: usize, order: LowBitOrder, pad: u8) -> Result<Vec<u8>> {
    check_bit_depth(grid, PixelFormat::Packed10Csi2)?;
    let invalid = || FormatError::InvalidGeometry {
        width: grid.width,
        height: grid.height,
    };
    let minimum = PixelFormat::Packed10Csi2.row_bytes(grid.width).ok_or_else(invalid)?;
    if stride < minimum {
        return Err(FormatError::StrideTooSmall { stride, minimum }.into());
    }
    let mut out = Vec::with_capacity(stride.checked_mul(grid.height).ok_or_else(invalid)?);
    for row in grid.samples.chunks_exact(grid.width) {
        let start = out.len();
        for group in row.chunks(PACKED10_GROUP_SAMPLES) {
            let mut low = 0u8;
            for (i, &sample) in group.iter().enumerate() {
                out.push((sample >> 2) as u8);
                let shift = match order {
                    LowBitOrder::LsbFirst => 2 * i,
                    LowBitOrder::MsbFirst => 6 - 2 * i,
                };
                low |= ((sample & 0b11) as u8) << shift;
            }
            out.extend(std::iter::repeat_n(0u8, PACKED10_GROUP_SAMPLES - group.len()));
            out.push(low);
        }
        out.resize(start + stride, pad);
    }
    Ok(out)
}
