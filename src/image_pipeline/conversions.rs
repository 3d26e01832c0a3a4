//! Pipeline conversions module
//!
//! File-level orchestration: raw reader, ISP chain and image writer.

mod raw_to_image;

pub use raw_to_image::{ConversionReport, RawToImagePipeline};

#[cfg(test)]
mod tests;
