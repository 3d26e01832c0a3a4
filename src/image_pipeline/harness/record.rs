use std::fmt;

/// Scores of one reference/candidate pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricScores {
    pub mse: f64,
    /// dB; infinite for identical images
    pub psnr: f64,
    /// Mean structural similarity over channels, 1.0 for identical images
    pub ssim: f64,
    /// Largest absolute difference of any channel value
    pub max_abs_diff: u8,
}

impl MetricScores {
    pub fn perfect() -> Self {
        Self {
            mse: 0.0,
            psnr: f64::INFINITY,
            ssim: 1.0,
            max_abs_diff: 0,
        }
    }
}

/// Metric result for one vector of the corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    pub vector: String,
    pub width: usize,
    pub height: usize,
    pub scores: MetricScores,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Mse,
    Psnr,
    Ssim,
    MaxAbsDiff,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Metric::Mse => "MSE",
            Metric::Psnr => "PSNR",
            Metric::Ssim => "SSIM",
            Metric::MaxAbsDiff => "max abs diff",
        })
    }
}

/// A metric outside its configured bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Violation {
    pub metric: Metric,
    pub value: f64,
    pub bound: f64,
}

impl Violation {
    /// Whether the bound is a lower limit (higher values are better).
    pub fn is_minimum(&self) -> bool {
        matches!(self.metric, Metric::Psnr | Metric::Ssim)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let relation = if self.is_minimum() { "below minimum" } else { "above maximum" };
        write!(f, "{} {:.4} {} {:.4}", self.metric, self.value, relation, self.bound)
    }
}
