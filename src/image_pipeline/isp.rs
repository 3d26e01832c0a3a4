//! Image signal processing chain
//!
//! Stages are plain functions over owned images; [`IspPipeline`] runs them
//! in their fixed order according to an [`IspConfig`].

pub mod black_level;
pub mod clip;
pub mod color;
pub mod config;
pub mod demosaic;
pub mod gamma;
pub mod histogram;
pub mod orientation;
mod pipeline;
pub mod resize;
pub mod stats;
pub mod white_balance;

#[cfg(test)]
mod tests;

pub use color::ColorMatrix;
pub use config::{IspConfig, IspConfigBuilder, WhiteBalance, REFERENCE_AS_SHOT_NEUTRAL};
pub use demosaic::{DemosaicAlgorithm, DemosaicStrategy};
pub use histogram::EqualizationMode;
pub use orientation::Orientation;
pub use pipeline::{Diagnostics, IspOutput, IspPipeline};
pub use stats::{ChannelStats, ChannelSums};
pub use white_balance::{AutoWhiteBalance, WhiteBalanceGains};
