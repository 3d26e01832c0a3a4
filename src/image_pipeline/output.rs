//! RGB8 image writing module
//!
//! PNG, TIFF and headerless interleaved RGB, plus the reader for the latter.

mod png_writer;
pub mod rgb888;
mod tiff_writer;
pub mod types;
mod writer;

pub use png_writer::PngWriter;
pub use rgb888::{decode_rgb888, encode_rgb888, RawRgbWriter};
pub use tiff_writer::StandardTiffWriter;
pub use types::{OutputFormat, TiffCompression};
pub use writer::ImageWriter;
