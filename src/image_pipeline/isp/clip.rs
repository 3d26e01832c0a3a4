use crate::image_pipeline::common::types::{Rgb8Image, RgbImage};

/// Maps the working range `[0.0, 1.0]` onto `[0, 255]`, rounding to the
/// nearest level. The only saturating stage of the chain.
pub fn clip(image: &RgbImage<f32>) -> Rgb8Image {
    image.map_pixels(|px| px.map(to_u8))
}

#[inline]
fn to_u8(v: f32) -> u8 {
    // NaN saturates to 0 through the cast
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}
