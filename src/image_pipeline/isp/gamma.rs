use crate::image_pipeline::common::types::RgbImage;

/// Raises every component to `1 / gamma`, keeping its sign.
///
/// Negative inputs (left over from color correction) are mirrored rather
/// than clamped; saturation is left to the clip stage.
pub fn encode(image: &RgbImage<f32>, gamma: f32) -> RgbImage<f32> {
    if gamma == 1.0 {
        return image.clone();
    }
    let exponent = 1.0 / gamma;
    image.map_pixels(|px| px.map(|v| v.signum() * v.abs().powf(exponent)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_root_curve() {
        let image = RgbImage::filled(2, 2, [0.25f32, 1.0, 0.0]);
        let out = encode(&image, 2.0);
        assert_eq!(out.pixel(1, 1), [0.5, 1.0, 0.0]);
    }

    #[test]
    fn negative_values_keep_their_sign() {
        let image = RgbImage::filled(1, 1, [-0.25f32, 4.0, 0.09]);
        let out = encode(&image, 2.0);
        assert_eq!(out.pixel(0, 0)[0], -0.5);
        assert_eq!(out.pixel(0, 0)[1], 2.0);
        assert!((out.pixel(0, 0)[2] - 0.3).abs() < 1e-6);
    }

    #[test]
    fn unit_gamma_is_identity() {
        let image = RgbImage::filled(3, 1, [0.1f32, -0.7, 1.2]);
        assert_eq!(encode(&image, 1.0), image);
    }
}
