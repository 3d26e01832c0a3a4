//! Image containers shared by the pipeline stages

/// Interleaved RGB image, row-major, `[R, G, B, R, G, B, ...]`
#[derive(Debug, Clone, PartialEq)]
pub struct RgbImage<T> {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// Channel data, `width * height * 3` values
    pub data: Vec<T>,
}

/// Final 8-bit output image.
pub type Rgb8Image = RgbImage<u8>;

impl<T: Copy + Default> RgbImage<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height * 3],
        }
    }

    pub fn filled(width: usize, height: usize, rgb: [T; 3]) -> Self {
        let mut data = Vec::with_capacity(width * height * 3);
        for _ in 0..width * height {
            data.extend_from_slice(&rgb);
        }
        Self { width, height, data }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn pixel(&self, row: usize, col: usize) -> [T; 3] {
        let i = (row * self.width + col) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    pub fn set_pixel(&mut self, row: usize, col: usize, rgb: [T; 3]) {
        let i = (row * self.width + col) * 3;
        self.data[i..i + 3].copy_from_slice(&rgb);
    }

    /// Applies `f` to every pixel, producing an image of the same size.
    pub fn map_pixels<U, F>(&self, f: F) -> RgbImage<U>
    where
        U: Copy + Default,
        F: Fn([T; 3]) -> [U; 3],
    {
        let data = self
            .data
            .chunks_exact(3)
            .flat_map(|px| f([px[0], px[1], px[2]]))
            .collect();
        RgbImage {
            width: self.width,
            height: self.height,
            data,
        }
    }

    /// Extracts one channel as a row-major plane.
    pub fn channel(&self, channel: usize) -> Vec<T> {
        self.data.iter().skip(channel).step_by(3).copied().collect()
    }
}

impl Rgb8Image {
    /// Back to the normalized working space (0..=255 -> 0.0..=1.0).
    pub fn to_normalized(&self) -> RgbImage<f32> {
        self.map_pixels(|px| px.map(|v| v as f32 / 255.0))
    }
}
