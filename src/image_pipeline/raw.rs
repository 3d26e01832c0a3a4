//! RAW frame decoding module
//!
//! Turns packed sensor bytes into Bayer grids with per-site filter identity.

pub mod cfa;
mod decoder;
mod reader;
mod sensor_reader;
pub mod types;

#[cfg(test)]
mod tests;

pub use cfa::{CfaColor, CfaPattern, Channel};
pub use decoder::{decode, encode_packed10, encode_plain8, RawDecoder};
pub use reader::RawFrameReader;
pub use sensor_reader::SensorDumpReader;
pub use types::{BayerGrid, BayerPlane, FrameGeometry, LowBitOrder, PixelFormat, RawFrame};
