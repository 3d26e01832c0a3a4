//! Color correction and color-space helpers

use std::str::FromStr;

use crate::image_pipeline::common::error::IspError;
use crate::image_pipeline::common::types::{Rgb8Image, RgbImage};

/// Row-major 3x3 linear transform applied to RGB column vectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMatrix(pub [[f32; 3]; 3]);

impl ColorMatrix {
    /// Standard XYZ to sRGB (D65) matrix.
    pub const XYZ_TO_SRGB: ColorMatrix = ColorMatrix([
        [3.240_454_2, -1.537_138_5, -0.498_531_4],
        [-0.969_266_0, 1.876_010_8, 0.041_556_0],
        [0.055_643_4, -0.204_025_9, 1.057_225_2],
    ]);

    pub fn identity() -> Self {
        Self([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Camera to sRGB from a camera to XYZ matrix (`XYZ_TO_SRGB * cam_to_xyz`).
    pub fn from_cam_to_xyz(cam_to_xyz: [[f32; 3]; 3]) -> Self {
        Self::XYZ_TO_SRGB.multiply(&ColorMatrix(cam_to_xyz))
    }

    pub fn multiply(&self, rhs: &ColorMatrix) -> ColorMatrix {
        let mut out = [[0.0f32; 3]; 3];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.0[r][k] * rhs.0[k][c]).sum();
            }
        }
        ColorMatrix(out)
    }

    /// Every output row scaled so that it sums to one (white stays white).
    pub fn normalized_rows(&self) -> ColorMatrix {
        ColorMatrix(self.0.map(|row| {
            let sum: f32 = row.iter().sum();
            if sum.abs() > f32::EPSILON { row.map(|v| v / sum) } else { row }
        }))
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().flatten().all(|v| v.is_finite())
    }

    #[inline]
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        self.0.map(|row| row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2])
    }
}

impl Default for ColorMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl FromStr for ColorMatrix {
    type Err = IspError;

    /// Nine comma-separated values, row-major.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values: Vec<f32> = s
            .split(',')
            .map(|v| v.trim().parse::<f32>())
            .collect::<Result<_, _>>()
            .map_err(|e| IspError::InvalidConfig(format!("color matrix '{s}': {e}")))?;
        if values.len() != 9 {
            return Err(IspError::InvalidConfig(format!(
                "color matrix needs 9 values, got {}",
                values.len()
            )));
        }
        let mut m = [[0.0f32; 3]; 3];
        for (i, v) in values.into_iter().enumerate() {
            m[i / 3][i % 3] = v;
        }
        Ok(ColorMatrix(m))
    }
}

/// Applies `matrix` to every pixel. Out-of-range results are kept.
pub fn correct(image: &RgbImage<f32>, matrix: &ColorMatrix) -> RgbImage<f32> {
    image.map_pixels(|px| matrix.apply(px))
}

/// Full-range BT.601 luma.
#[inline]
pub fn luma(rgb: [u8; 3]) -> u8 {
    let y = 0.299 * rgb[0] as f32 + 0.587 * rgb[1] as f32 + 0.114 * rgb[2] as f32;
    y.round().clamp(0.0, 255.0) as u8
}

/// Full-range BT.601 RGB to YUV, U and V offset by 128.
pub fn rgb_to_yuv(rgb: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = rgb.map(|v| v as f32);
    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    let u = -0.168_736 * r - 0.331_264 * g + 0.5 * b + 128.0;
    let v = 0.5 * r - 0.418_688 * g - 0.081_312 * b + 128.0;
    [y, u, v].map(|c| c.round().clamp(0.0, 255.0) as u8)
}

pub fn yuv_to_rgb(yuv: [u8; 3]) -> [u8; 3] {
    let y = yuv[0] as f32;
    let u = yuv[1] as f32 - 128.0;
    let v = yuv[2] as f32 - 128.0;
    let r = y + 1.402 * v;
    let g = y - 0.344_136 * u - 0.714_136 * v;
    let b = y + 1.772 * u;
    [r, g, b].map(|c| c.round().clamp(0.0, 255.0) as u8)
}

/// Greyscale rendering, luma replicated over the three channels.
pub fn to_greyscale(image: &Rgb8Image) -> Rgb8Image {
    image.map_pixels(|px| [luma(px); 3])
}
