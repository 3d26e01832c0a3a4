//! Output container types

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::image_pipeline::common::error::{IspError, Result};
use crate::image_pipeline::output::{ImageWriter, PngWriter, RawRgbWriter, StandardTiffWriter};

/// TIFF compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TiffCompression {
    /// No compression (fastest, largest file)
    #[default]
    None,
    /// LZW compression (slow, good compression)
    Lzw,
    /// Deflate compression - fast level (good speed/size balance)
    DeflateFast,
    /// Deflate compression - balanced
    DeflateBalanced,
    /// Deflate compression - best compression (slower)
    DeflateBest,
}

impl FromStr for TiffCompression {
    type Err = IspError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(TiffCompression::None),
            "lzw" => Ok(TiffCompression::Lzw),
            "deflate-fast" => Ok(TiffCompression::DeflateFast),
            "deflate" | "deflate-balanced" => Ok(TiffCompression::DeflateBalanced),
            "deflate-best" => Ok(TiffCompression::DeflateBest),
            other => Err(IspError::InvalidConfig(format!("unknown TIFF compression '{other}'"))),
        }
    }
}

/// Container of the final image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Png,
    Tiff,
    /// Headerless RGB888
    Rgb,
}

impl OutputFormat {
    /// Picks the container from a file extension; unknown or missing
    /// extensions fall back to PNG.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
            .unwrap_or_default()
    }

    /// Writer for this container; `tiff` carries the TIFF encoder settings
    /// and is ignored by the other formats.
    pub fn writer(self, tiff: StandardTiffWriter) -> Box<dyn ImageWriter + Send + Sync> {
        match self {
            OutputFormat::Png => Box::new(PngWriter),
            OutputFormat::Tiff => Box::new(tiff),
            OutputFormat::Rgb => Box::new(RawRgbWriter),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Png => "png",
            OutputFormat::Tiff => "tiff",
            OutputFormat::Rgb => "rgb",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = IspError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "tif" | "tiff" => Ok(OutputFormat::Tiff),
            "rgb" | "rgb888" => Ok(OutputFormat::Rgb),
            other => Err(IspError::InvalidConfig(format!("unknown output format '{other}'"))),
        }
    }
}
