//! Histogram equalization on 8-bit images

use std::fmt;
use std::str::FromStr;

use crate::image_pipeline::common::error::IspError;
use crate::image_pipeline::common::types::Rgb8Image;
use crate::image_pipeline::isp::color::{rgb_to_yuv, yuv_to_rgb};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EqualizationMode {
    /// Each of R, G and B equalized independently
    #[default]
    PerChannel,
    /// Only the BT.601 luma is equalized; chroma is kept
    Luma,
}

impl fmt::Display for EqualizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EqualizationMode::PerChannel => "per-channel",
            EqualizationMode::Luma => "luma",
        })
    }
}

impl FromStr for EqualizationMode {
    type Err = IspError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per-channel" | "channel" | "rgb" => Ok(EqualizationMode::PerChannel),
            "luma" | "yuv" | "y" => Ok(EqualizationMode::Luma),
            other => Err(IspError::InvalidConfig(format!("unknown equalization mode '{other}'"))),
        }
    }
}

/// Lookup table spreading the cumulative histogram over `0..=255`.
///
/// Returns `None` when all values share one level, which leaves the data
/// untouched.
fn equalization_lut(values: impl Iterator<Item = u8>) -> Option<[u8; 256]> {
    let mut histogram = [0u64; 256];
    let mut total = 0u64;
    for v in values {
        histogram[v as usize] += 1;
        total += 1;
    }

    let first = histogram.iter().position(|&n| n > 0)?;
    let cdf_min = histogram[first];
    if cdf_min == total {
        return None;
    }

    let scale = 255.0 / (total - cdf_min) as f64;
    let mut lut = [0u8; 256];
    let mut cdf = 0u64;
    for (level, count) in histogram.iter().enumerate() {
        cdf += count;
        lut[level] = if level < first {
            0
        } else {
            ((cdf - cdf_min) as f64 * scale).round().clamp(0.0, 255.0) as u8
        };
    }
    Some(lut)
}

pub fn equalize(image: &Rgb8Image, mode: EqualizationMode) -> Rgb8Image {
    match mode {
        EqualizationMode::PerChannel => equalize_channels(image),
        EqualizationMode::Luma => equalize_luma(image),
    }
}

fn equalize_channels(image: &Rgb8Image) -> Rgb8Image {
    let mut out = image.clone();
    for c in 0..3 {
        if let Some(lut) = equalization_lut(image.data.iter().skip(c).step_by(3).copied()) {
            for v in out.data.iter_mut().skip(c).step_by(3) {
                *v = lut[*v as usize];
            }
        }
    }
    out
}

fn equalize_luma(image: &Rgb8Image) -> Rgb8Image {
    let yuv = image.map_pixels(rgb_to_yuv);
    match equalization_lut(yuv.data.iter().step_by(3).copied()) {
        Some(lut) => yuv.map_pixels(|[y, u, v]| yuv_to_rgb([lut[y as usize], u, v])),
        None => image.clone(),
    }
}
