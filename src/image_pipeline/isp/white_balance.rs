//! Bayer-phase white balance.
//!
//! Gains are applied to the mosaic before demosaicing, each sample scaled by
//! the gain of the filter that sits on top of it.

use tracing::debug;

use crate::image_pipeline::common::error::{IspError, Result};
use crate::image_pipeline::isp::stats::percentile;
use crate::image_pipeline::raw::{BayerPlane, Channel};

/// Per-channel multipliers in R, G, B order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhiteBalanceGains(pub [f32; 3]);

impl WhiteBalanceGains {
    pub fn unity() -> Self {
        Self([1.0; 3])
    }

    /// Gains that neutralize a DNG-style as-shot neutral (`gain = 1 / neutral`).
    pub fn from_as_shot_neutral(neutral: [f32; 3]) -> Self {
        Self(neutral.map(|n| 1.0 / n))
    }

    pub fn gain(&self, channel: Channel) -> f32 {
        self.0[channel as usize]
    }

    pub fn validate(&self) -> Result<()> {
        if self.0.iter().all(|g| g.is_finite() && *g > 0.0) {
            Ok(())
        } else {
            Err(IspError::InvalidConfig(format!(
                "white balance gains must be positive, got {:?}",
                self.0
            )))
        }
    }
}

impl Default for WhiteBalanceGains {
    fn default() -> Self {
        Self::unity()
    }
}

/// Scales every sample by the gain of its CFA color. No clamping.
pub fn apply(plane: &BayerPlane, gains: &WhiteBalanceGains) -> BayerPlane {
    let mut samples = Vec::with_capacity(plane.samples.len());
    for y in 0..plane.height {
        let row = &plane.samples[y * plane.width..(y + 1) * plane.width];
        // Only two colors alternate along a row.
        let phase = [
            gains.gain(plane.channel_at(y, 0)),
            gains.gain(plane.channel_at(y, 1)),
        ];
        samples.extend(row.iter().enumerate().map(|(x, &v)| v * phase[x % 2]));
    }
    BayerPlane {
        width: plane.width,
        height: plane.height,
        samples,
        cfa: plane.cfa,
    }
}

/// Gray-world style gain estimate: stretch each channel's upper percentile to `ceiling`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoWhiteBalance {
    /// Fraction (0..1) of samples below the reference level of each channel
    pub percentile: f32,
    /// Level the percentile is mapped to
    pub ceiling: f32,
    pub min_gain: f32,
    pub max_gain: f32,
}

impl Default for AutoWhiteBalance {
    fn default() -> Self {
        Self {
            percentile: 0.95,
            ceiling: 254.0 / 255.0,
            min_gain: 1.0,
            max_gain: 1.6,
        }
    }
}

impl AutoWhiteBalance {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.percentile) {
            return Err(IspError::InvalidConfig(format!(
                "AWB percentile must be within 0..=1, got {}",
                self.percentile
            )));
        }
        if !(self.min_gain > 0.0 && self.min_gain <= self.max_gain && self.ceiling > 0.0) {
            return Err(IspError::InvalidConfig(format!(
                "AWB gain range {}..{} with ceiling {} is not usable",
                self.min_gain, self.max_gain, self.ceiling
            )));
        }
        Ok(())
    }

    /// Estimates gains from a normalized mosaic.
    pub fn estimate(&self, plane: &BayerPlane) -> WhiteBalanceGains {
        let mut per_channel: [Vec<f32>; 3] = Default::default();
        for y in 0..plane.height {
            for x in 0..plane.width {
                per_channel[plane.channel_at(y, x) as usize].push(plane.get(y, x));
            }
        }

        let gains = per_channel.map(|mut values| {
            match percentile(&mut values, self.percentile) {
                Some(level) if level > 0.0 => (self.ceiling / level).clamp(self.min_gain, self.max_gain),
                _ => self.min_gain,
            }
        });
        debug!("Auto white balance gains: {:?}", gains);
        WhiteBalanceGains(gains)
    }
}
