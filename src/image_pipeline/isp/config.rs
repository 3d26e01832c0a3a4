//! ISP configuration types

use crate::image_pipeline::common::error::{IspError, Result};
use crate::image_pipeline::isp::color::ColorMatrix;
use crate::image_pipeline::isp::demosaic::DemosaicAlgorithm;
use crate::image_pipeline::isp::histogram::EqualizationMode;
use crate::image_pipeline::isp::orientation::Orientation;
use crate::image_pipeline::isp::white_balance::{AutoWhiteBalance, WhiteBalanceGains};

/// As-shot neutral of the reference camera module.
pub const REFERENCE_AS_SHOT_NEUTRAL: [f32; 3] = [0.630_188_3, 1.0, 0.655_586_2];

/// How the white-balance gains are obtained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WhiteBalance {
    /// Fixed gains, typically derived from the as-shot neutral.
    Fixed(WhiteBalanceGains),
    /// Gains estimated per frame from channel percentiles.
    Auto(AutoWhiteBalance),
}

/// Configuration for the RAW to RGB ISP chain
#[derive(Debug, Clone, PartialEq)]
pub struct IspConfig {
    /// Sensor value of zero incident light
    pub black_level: f32,
    /// Sensor value mapped to full scale
    pub white_level: f32,
    pub white_balance: WhiteBalance,
    pub demosaic: DemosaicAlgorithm,
    /// Sensor RGB to output color space
    pub color_matrix: ColorMatrix,
    /// Display gamma; samples are raised to `1 / gamma`. 1.0 disables the curve.
    pub gamma: f32,
    /// Histogram equalization, `None` to skip
    pub equalization: Option<EqualizationMode>,
    /// Integer decimation factor; 1 keeps the full resolution
    pub resize_factor: usize,
    /// Presentation transform applied last
    pub orientation: Orientation,
}

impl Default for IspConfig {
    /// Tuning of the reference camera module (RAW8, levels 15..254, gamma 2).
    fn default() -> Self {
        Self {
            black_level: 15.0,
            white_level: 254.0,
            white_balance: WhiteBalance::Fixed(WhiteBalanceGains::from_as_shot_neutral(
                REFERENCE_AS_SHOT_NEUTRAL,
            )),
            demosaic: DemosaicAlgorithm::Vng,
            color_matrix: ColorMatrix::identity(),
            gamma: 2.0,
            equalization: Some(EqualizationMode::PerChannel),
            resize_factor: 1,
            orientation: Orientation::FlipVertical,
        }
    }
}

impl IspConfig {
    pub fn builder() -> IspConfigBuilder {
        IspConfigBuilder::default()
    }

    /// Rejects configurations no stage can honor.
    pub fn validate(&self) -> Result<()> {
        if !self.black_level.is_finite() || !self.white_level.is_finite() {
            return Err(IspError::InvalidConfig("black and white levels must be finite".into()));
        }
        if self.white_level <= self.black_level {
            return Err(IspError::InvalidConfig(format!(
                "white level {} must be above black level {}",
                self.white_level, self.black_level
            )));
        }
        match self.white_balance {
            WhiteBalance::Fixed(gains) => gains.validate()?,
            WhiteBalance::Auto(auto) => auto.validate()?,
        }
        if !(self.gamma.is_finite() && self.gamma > 0.0) {
            return Err(IspError::InvalidConfig(format!("gamma must be positive, got {}", self.gamma)));
        }
        if !self.color_matrix.is_finite() {
            return Err(IspError::InvalidConfig("color matrix contains non-finite entries".into()));
        }
        if self.resize_factor == 0 {
            return Err(IspError::InvalidConfig("resize factor must be at least 1".into()));
        }
        Ok(())
    }

    /// Size of the image `process` produces for a `width` x `height` frame.
    pub fn output_dimensions(&self, width: usize, height: usize) -> (usize, usize) {
        let (w, h) = (width / self.resize_factor.max(1), height / self.resize_factor.max(1));
        match self.orientation {
            Orientation::Rotate90 => (h, w),
            Orientation::None | Orientation::FlipVertical => (w, h),
        }
    }
}

/// Builder for IspConfig
#[derive(Default)]
pub struct IspConfigBuilder {
    black_level: Option<f32>,
    white_level: Option<f32>,
    white_balance: Option<WhiteBalance>,
    demosaic: Option<DemosaicAlgorithm>,
    color_matrix: Option<ColorMatrix>,
    gamma: Option<f32>,
    equalization: Option<Option<EqualizationMode>>,
    resize_factor: Option<usize>,
    orientation: Option<Orientation>,
}

impl IspConfigBuilder {
    pub fn levels(mut self, black: f32, white: f32) -> Self {
        self.black_level = Some(black);
        self.white_level = Some(white);
        self
    }

    pub fn white_balance(mut self, white_balance: WhiteBalance) -> Self {
        self.white_balance = Some(white_balance);
        self
    }

    pub fn gains(self, gains: WhiteBalanceGains) -> Self {
        self.white_balance(WhiteBalance::Fixed(gains))
    }

    pub fn demosaic(mut self, algorithm: DemosaicAlgorithm) -> Self {
        self.demosaic = Some(algorithm);
        self
    }

    pub fn color_matrix(mut self, matrix: ColorMatrix) -> Self {
        self.color_matrix = Some(matrix);
        self
    }

    pub fn gamma(mut self, gamma: f32) -> Self {
        self.gamma = Some(gamma);
        self
    }

    pub fn equalization(mut self, mode: Option<EqualizationMode>) -> Self {
        self.equalization = Some(mode);
        self
    }

    pub fn resize_factor(mut self, factor: usize) -> Self {
        self.resize_factor = Some(factor);
        self
    }

    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    pub fn build(self) -> IspConfig {
        let default = IspConfig::default();
        IspConfig {
            black_level: self.black_level.unwrap_or(default.black_level),
            white_level: self.white_level.unwrap_or(default.white_level),
            white_balance: self.white_balance.unwrap_or(default.white_balance),
            demosaic: self.demosaic.unwrap_or(default.demosaic),
            color_matrix: self.color_matrix.unwrap_or(default.color_matrix),
            gamma: self.gamma.unwrap_or(default.gamma),
            equalization: self.equalization.unwrap_or(default.equalization),
            resize_factor: self.resize_factor.unwrap_or(default.resize_factor),
            orientation: self.orientation.unwrap_or(default.orientation),
        }
    }
}
