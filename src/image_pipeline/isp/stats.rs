//! Image statistics used for auto white balance and diagnostics.

use std::fmt;

use crate::image_pipeline::common::types::{Rgb8Image, RgbImage};

/// Nearest-rank percentile of `values` (`q` in 0..=1). Sorts in place.
pub fn percentile(values: &mut [f32], q: f32) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f32::total_cmp);
    let rank = (q.clamp(0.0, 1.0) * (values.len() - 1) as f32).round() as usize;
    Some(values[rank])
}

/// Summary of one 8-bit channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelStats {
    pub mean: f64,
    pub skewness: f64,
    /// Value below which `percentile_rank` of the pixels fall
    pub percentile: u8,
    pub min: u8,
    pub max: u8,
}

/// Per-channel statistics of an 8-bit image, in R, G, B order.
pub fn channel_stats(image: &Rgb8Image, percentile_rank: f32) -> [ChannelStats; 3] {
    [0, 1, 2].map(|c| {
        let mut histogram = [0u64; 256];
        for &v in image.data.iter().skip(c).step_by(3) {
            histogram[v as usize] += 1;
        }
        stats_from_histogram(&histogram, percentile_rank)
    })
}

fn stats_from_histogram(histogram: &[u64; 256], percentile_rank: f32) -> ChannelStats {
    let n: u64 = histogram.iter().sum();
    if n == 0 {
        return ChannelStats { mean: 0.0, skewness: 0.0, percentile: 0, min: 0, max: 0 };
    }
    let n_f = n as f64;
    let mean = histogram.iter().enumerate().map(|(v, &c)| v as f64 * c as f64).sum::<f64>() / n_f;
    let (m2, m3) = histogram.iter().enumerate().fold((0.0, 0.0), |(m2, m3), (v, &c)| {
        let d = v as f64 - mean;
        (m2 + d * d * c as f64, m3 + d * d * d * c as f64)
    });
    let variance = m2 / n_f;
    let skewness = if variance > 0.0 { (m3 / n_f) / variance.powf(1.5) } else { 0.0 };

    let target = (percentile_rank.clamp(0.0, 1.0) as f64 * n_f).ceil().max(1.0) as u64;
    let mut seen = 0;
    let mut percentile = 255u8;
    for (v, &c) in histogram.iter().enumerate() {
        seen += c;
        if seen >= target {
            percentile = v as u8;
            break;
        }
    }
    let min = histogram.iter().position(|&c| c > 0).unwrap_or(0) as u8;
    let max = histogram.iter().rposition(|&c| c > 0).unwrap_or(0) as u8;

    ChannelStats { mean, skewness, percentile, min, max }
}

/// Per-channel sums of the demosaiced image, the "color contribution" printout.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChannelSums {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl ChannelSums {
    pub fn of(image: &RgbImage<f32>) -> Self {
        let mut sums = [0.0f64; 3];
        for px in image.data.chunks_exact(3) {
            for (sum, &v) in sums.iter_mut().zip(px) {
                *sum += v as f64;
            }
        }
        Self {
            red: sums[0],
            green: sums[1],
            blue: sums[2],
        }
    }
}

impl fmt::Display for ChannelSums {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blue: {:.0}, green: {:.0}, red: {:.0}", self.blue, self.green, self.red)
    }
}
