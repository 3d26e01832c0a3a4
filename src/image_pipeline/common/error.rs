use std::path::PathBuf;

use thiserror::Error;

use crate::image_pipeline::harness::{MetricRecord, Violation};
use crate::image_pipeline::raw::PixelFormat;

/// Problems with the raw bytes or the geometry declared for them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Raw buffer too small: need {expected} bytes ({stride} x {height}), got {actual}")]
    BufferTooSmall {
        expected: usize,
        actual: usize,
        stride: usize,
        height: usize,
    },

    #[error("Invalid frame geometry: width={width}, height={height}")]
    InvalidGeometry { width: usize, height: usize },

    #[error("Stride {stride} is smaller than the {minimum} bytes one row needs")]
    StrideTooSmall { stride: usize, minimum: usize },

    #[error("Unknown pixel format: {0}")]
    UnknownPixelFormat(String),

    #[error("Invalid CFA pattern: {0}")]
    InvalidCfaPattern(String),

    #[error("{format} holds {expected}-bit samples, the grid has {actual}-bit ones")]
    BitDepthMismatch {
        format: PixelFormat,
        expected: u32,
        actual: u32,
    },

    #[error("RGB buffer holds {actual} bytes, expected {expected} for {width}x{height}")]
    RgbBufferSize {
        expected: usize,
        actual: usize,
        width: usize,
        height: usize,
    },
}

#[derive(Error, Debug)]
pub enum IspError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(
        "Dimension mismatch for '{vector}': reference {}x{}, candidate {}x{}",
        .reference.0, .reference.1, .candidate.0, .candidate.1
    )]
    DimensionMismatch {
        vector: String,
        reference: (usize, usize),
        candidate: (usize, usize),
    },

    #[error("Metric threshold violated for '{vector}': {}", describe_violations(.violations))]
    MetricThresholdViolation {
        vector: String,
        record: Box<MetricRecord>,
        violations: Vec<Violation>,
    },

    #[error("External tool failed during {stage}: {reason}")]
    ExternalToolFailure { stage: String, reason: String },

    #[error("Failed to read input file {}: {reason}", .path.display())]
    InputRead { path: PathBuf, reason: String },

    #[error("Failed to write output file {}: {reason}", .path.display())]
    OutputWrite { path: PathBuf, reason: String },

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IspError {
    /// Whether the error comes from the hardware path rather than the comparison itself.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, IspError::ExternalToolFailure { .. })
    }
}

fn describe_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, IspError>;
