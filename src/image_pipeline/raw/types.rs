//! RAW frame data types

use std::fmt;
use std::str::FromStr;

use crate::image_pipeline::common::error::FormatError;
use crate::image_pipeline::raw::cfa::{CfaColor, CfaPattern, Channel};

/// Pixel layout of the bytes coming off the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// One byte per photosite.
    Plain8,
    /// MIPI CSI-2 RAW10: four samples in five bytes, rows padded to `stride`.
    Packed10Csi2,
}

impl PixelFormat {
    pub fn bit_depth(self) -> u32 {
        match self {
            PixelFormat::Plain8 => 8,
            PixelFormat::Packed10Csi2 => 10,
        }
    }

    /// Bytes occupied by the pixel data of one row, padding excluded.
    ///
    /// `None` when the row size does not fit in `usize`.
    pub fn row_bytes(self, width: usize) -> Option<usize> {
        match self {
            PixelFormat::Plain8 => Some(width),
            PixelFormat::Packed10Csi2 => width.div_ceil(4).checked_mul(5),
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PixelFormat::Plain8 => f.write_str("plain8"),
            PixelFormat::Packed10Csi2 => f.write_str("packed10-csi2"),
        }
    }
}

impl FromStr for PixelFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['_', '-'], "").as_str() {
            "plain8" | "raw8" | "sbggr8" | "8" => Ok(PixelFormat::Plain8),
            "packed10csi2" | "packed10" | "raw10" | "csi2p10" | "sbggr10csi2p" | "10" => {
                Ok(PixelFormat::Packed10Csi2)
            }
            _ => Err(FormatError::UnknownPixelFormat(s.to_string())),
        }
    }
}

/// Where the four 2-bit remainders sit inside the fifth byte of a RAW10 group.
///
/// CSI-2 puts the first sample in the two least significant bits, but some
/// sensors ship the opposite order; check the datasheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LowBitOrder {
    #[default]
    LsbFirst,
    MsbFirst,
}

/// Immutable sensor bytes plus the geometry they were captured with.
#[derive(Debug, Clone)]
pub struct RawFrame<'a> {
    bytes: &'a [u8],
    width: usize,
    height: usize,
    format: PixelFormat,
    stride: usize,
    row_bytes: usize,
}

impl<'a> RawFrame<'a> {
    /// Validates that `bytes` can hold `height` rows of `stride` bytes.
    ///
    /// `stride` defaults to the packed row size of `format`.
    pub fn new(
        bytes: &'a [u8],
        width: usize,
        height: usize,
        format: PixelFormat,
        stride: Option<usize>,
    ) -> Result<Self, FormatError> {
        if width == 0 || height == 0 {
            return Err(FormatError::InvalidGeometry { width, height });
        }
        let minimum = format
            .row_bytes(width)
            .ok_or(FormatError::InvalidGeometry { width, height })?;
        let stride = stride.unwrap_or(minimum);
        if stride < minimum {
            return Err(FormatError::StrideTooSmall { stride, minimum });
        }
        let expected = stride
            .checked_mul(height)
            .ok_or(FormatError::InvalidGeometry { width, height })?;
        if bytes.len() < expected {
            return Err(FormatError::BufferTooSmall {
                expected,
                actual: bytes.len(),
                stride,
                height,
            });
        }
        Ok(Self {
            bytes,
            width,
            height,
            format,
            stride,
            row_bytes: minimum,
        })
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The `stride` bytes of one row, padding included.
    pub fn row(&self, y: usize) -> &'a [u8] {
        &self.bytes[y * self.stride..(y + 1) * self.stride]
    }

    /// The packed pixel bytes of one row, padding excluded.
    pub fn pixels(&self, y: usize) -> &'a [u8] {
        &self.row(y)[..self.row_bytes]
    }
}

/// Everything needed to turn a byte buffer into a [`BayerGrid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    pub width: usize,
    pub height: usize,
    pub format: PixelFormat,
    /// Row pitch in bytes; `None` means no padding.
    pub stride: Option<usize>,
    pub cfa: CfaPattern,
    pub low_bit_order: LowBitOrder,
}

impl FrameGeometry {
    pub fn new(width: usize, height: usize, format: PixelFormat, cfa: CfaPattern) -> Self {
        Self {
            width,
            height,
            format,
            stride: None,
            cfa,
            low_bit_order: LowBitOrder::default(),
        }
    }

    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = Some(stride);
        self
    }

    pub fn with_low_bit_order(mut self, order: LowBitOrder) -> Self {
        self.low_bit_order = order;
        self
    }

    /// Total bytes a buffer of this geometry must hold, `None` on overflow.
    pub fn frame_bytes(&self) -> Option<usize> {
        self.stride
            .or_else(|| self.format.row_bytes(self.width))?
            .checked_mul(self.height)
    }
}

impl Default for FrameGeometry {
    /// 640x480 RAW8 BGGR, the reference camera module.
    fn default() -> Self {
        Self::new(640, 480, PixelFormat::Plain8, CfaPattern::bggr())
    }
}

/// Decoded photosite intensities, one per sensor site.
#[derive(Debug, Clone, PartialEq)]
pub struct BayerGrid {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// Row-major samples, `width * height` entries
    pub samples: Vec<u16>,
    /// Significant bits per sample (8 or 10)
    pub bit_depth: u32,
    pub cfa: CfaPattern,
}

impl BayerGrid {
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u16 {
        self.samples[row * self.width + col]
    }

    #[inline]
    pub fn color_at(&self, row: usize, col: usize) -> CfaColor {
        self.cfa.color_at(row, col)
    }

    #[inline]
    pub fn channel_at(&self, row: usize, col: usize) -> Channel {
        self.cfa.channel_at(row, col)
    }

    /// Largest value a sample of this bit depth can hold.
    pub fn max_value(&self) -> u16 {
        ((1u32 << self.bit_depth) - 1) as u16
    }
}

/// Single-channel mosaic in the normalized working space (1.0 = full scale).
#[derive(Debug, Clone, PartialEq)]
pub struct BayerPlane {
    pub width: usize,
    pub height: usize,
    pub samples: Vec<f32>,
    pub cfa: CfaPattern,
}

impl BayerPlane {
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.samples[row * self.width + col]
    }

    #[inline]
    pub fn channel_at(&self, row: usize, col: usize) -> Channel {
        self.cfa.channel_at(row, col)
    }
}
