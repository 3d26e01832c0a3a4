//! Common utilities module
//!
//! Error types, image containers and stage timing shared across the image pipeline.

pub mod error;
pub mod timing;
pub mod types;

pub use error::{FormatError, IspError, Result};
pub use timing::{PipelineTimings, StepTiming, Timer};
pub use types::{Rgb8Image, RgbImage};
