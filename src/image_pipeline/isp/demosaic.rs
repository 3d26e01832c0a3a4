//! Demosaicing module for converting Bayer mosaics to RGB
//!
//! The interpolation itself is a pluggable [`DemosaicStrategy`]; the pipeline
//! only fixes where in the chain it runs.

mod bayer_linear;
mod bilinear;
mod vng;

use std::fmt;
use std::str::FromStr;

use crate::image_pipeline::common::error::{IspError, Result};
use crate::image_pipeline::common::types::RgbImage;
use crate::image_pipeline::raw::BayerPlane;

pub use bayer_linear::BayerLinear;
pub use bilinear::Bilinear;
pub use vng::Vng;

/// Reconstructs a full RGB image from a single-channel mosaic.
///
/// Implementations must write the physically sampled channel of every site
/// unchanged and estimate the two missing ones from neighbors.
pub trait DemosaicStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn demosaic(&self, plane: &BayerPlane) -> Result<RgbImage<f32>>;
}

/// Built-in strategies, selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DemosaicAlgorithm {
    /// Variable number of gradients
    #[default]
    Vng,
    /// Same-color neighbor averaging
    Bilinear,
    /// Linear interpolation from the `bayer` crate, 16-bit quantized
    BayerLinear,
}

impl DemosaicAlgorithm {
    pub fn strategy(self) -> Box<dyn DemosaicStrategy> {
        match self {
            DemosaicAlgorithm::Vng => Box::new(Vng),
            DemosaicAlgorithm::Bilinear => Box::new(Bilinear),
            DemosaicAlgorithm::BayerLinear => Box::new(BayerLinear),
        }
    }
}

impl fmt::Display for DemosaicAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DemosaicAlgorithm::Vng => "vng",
            DemosaicAlgorithm::Bilinear => "bilinear",
            DemosaicAlgorithm::BayerLinear => "bayer-linear",
        })
    }
}

impl FromStr for DemosaicAlgorithm {
    type Err = IspError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vng" => Ok(DemosaicAlgorithm::Vng),
            "bilinear" => Ok(DemosaicAlgorithm::Bilinear),
            "bayer-linear" | "bayer_linear" | "linear" => Ok(DemosaicAlgorithm::BayerLinear),
            other => Err(IspError::InvalidConfig(format!("unknown demosaic algorithm '{other}'"))),
        }
    }
}

/// Clamped neighbor lookup shared by the strategies.
#[inline]
fn sample_clamped(plane: &BayerPlane, y: usize, x: usize, dy: isize, dx: isize) -> f32 {
    let ny = (y as isize + dy).clamp(0, plane.height as isize - 1) as usize;
    let nx = (x as isize + dx).clamp(0, plane.width as isize - 1) as usize;
    plane.samples[ny * plane.width + nx]
}
