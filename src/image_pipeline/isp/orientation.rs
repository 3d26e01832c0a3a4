use std::fmt;
use std::str::FromStr;

use crate::image_pipeline::common::error::IspError;
use crate::image_pipeline::common::types::RgbImage;

/// Presentation transform applied after every other stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    #[default]
    None,
    /// Top row becomes the bottom row
    FlipVertical,
    /// Quarter turn clockwise; width and height swap
    Rotate90,
}

impl Orientation {
    pub fn apply<T: Copy + Default>(self, image: &RgbImage<T>) -> RgbImage<T> {
        match self {
            Orientation::None => image.clone(),
            Orientation::FlipVertical => flip_vertical(image),
            Orientation::Rotate90 => rotate90(image),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Orientation::None => "none",
            Orientation::FlipVertical => "flip-vertical",
            Orientation::Rotate90 => "rotate90",
        })
    }
}

impl FromStr for Orientation {
    type Err = IspError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Orientation::None),
            "flip" | "flip-vertical" | "vflip" => Ok(Orientation::FlipVertical),
            "rotate90" | "rot90" | "cw" => Ok(Orientation::Rotate90),
            other => Err(IspError::InvalidConfig(format!("unknown orientation '{other}'"))),
        }
    }
}

pub fn flip_vertical<T: Copy + Default>(image: &RgbImage<T>) -> RgbImage<T> {
    let row_len = image.width * 3;
    let mut data = Vec::with_capacity(image.data.len());
    for row in image.data.chunks_exact(row_len).rev() {
        data.extend_from_slice(row);
    }
    RgbImage {
        width: image.width,
        height: image.height,
        data,
    }
}

/// Clockwise: output pixel `(r, c)` comes from input `(h - 1 - c, r)`.
pub fn rotate90<T: Copy + Default>(image: &RgbImage<T>) -> RgbImage<T> {
    let (w, h) = image.dimensions();
    let mut out = RgbImage::new(h, w);
    for r in 0..w {
        for c in 0..h {
            out.set_pixel(r, c, image.pixel(h - 1 - c, r));
        }
    }
    out
}
