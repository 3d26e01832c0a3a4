use crate::image_pipeline::harness::record::{Metric, MetricScores, Violation};

/// Acceptance bounds; `None` leaves a metric unchecked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricThresholds {
    pub max_mse: Option<f64>,
    pub min_psnr: Option<f64>,
    pub min_ssim: Option<f64>,
    pub max_abs_diff: Option<u8>,
}

impl Default for MetricThresholds {
    /// Visually equivalent output: PSNR of at least 30 dB and SSIM of at least 0.9.
    fn default() -> Self {
        Self {
            max_mse: None,
            min_psnr: Some(30.0),
            min_ssim: Some(0.9),
            max_abs_diff: None,
        }
    }
}

impl MetricThresholds {
    /// Bit-exact agreement.
    pub fn exact() -> Self {
        Self {
            max_mse: Some(0.0),
            min_psnr: None,
            min_ssim: None,
            max_abs_diff: Some(0),
        }
    }

    pub fn unchecked() -> Self {
        Self {
            max_mse: None,
            min_psnr: None,
            min_ssim: None,
            max_abs_diff: None,
        }
    }

    pub fn with_max_mse(mut self, bound: f64) -> Self {
        self.max_mse = Some(bound);
        self
    }

    pub fn with_min_psnr(mut self, bound: f64) -> Self {
        self.min_psnr = Some(bound);
        self
    }

    pub fn with_min_ssim(mut self, bound: f64) -> Self {
        self.min_ssim = Some(bound);
        self
    }

    pub fn with_max_abs_diff(mut self, bound: u8) -> Self {
        self.max_abs_diff = Some(bound);
        self
    }

    /// Every bound `scores` falls outside of, in a fixed metric order.
    pub fn check(&self, scores: &MetricScores) -> Vec<Violation> {
        let mut violations = Vec::new();
        if let Some(bound) = self.max_mse.filter(|&b| scores.mse > b) {
            violations.push(Violation { metric: Metric::Mse, value: scores.mse, bound });
        }
        if let Some(bound) = self.min_psnr.filter(|&b| scores.psnr < b) {
            violations.push(Violation { metric: Metric::Psnr, value: scores.psnr, bound });
        }
        if let Some(bound) = self.min_ssim.filter(|&b| scores.ssim < b) {
            violations.push(Violation { metric: Metric::Ssim, value: scores.ssim, bound });
        }
        if let Some(bound) = self.max_abs_diff.filter(|&b| scores.max_abs_diff > b) {
            violations.push(Violation {
                metric: Metric::MaxAbsDiff,
                value: scores.max_abs_diff as f64,
                bound: bound as f64,
            });
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(mse: f64, psnr: f64, ssim: f64, max_abs_diff: u8) -> MetricScores {
        MetricScores { mse, psnr, ssim, max_abs_diff }
    }

    #[test]
    fn perfect_scores_pass_every_preset() {
        for thresholds in [MetricThresholds::default(), MetricThresholds::exact(), MetricThresholds::unchecked()] {
            assert!(thresholds.check(&MetricScores::perfect()).is_empty());
        }
    }

    #[test]
    fn reports_every_violation() {
        let thresholds = MetricThresholds::default().with_max_mse(1.0).with_max_abs_diff(2);
        let violations = thresholds.check(&scores(40.0, 20.0, 0.5, 9));
        let metrics: Vec<Metric> = violations.iter().map(|v| v.metric).collect();
        assert_eq!(metrics, vec![Metric::Mse, Metric::Psnr, Metric::Ssim, Metric::MaxAbsDiff]);
        assert_eq!(violations[1].to_string(), "PSNR 20.0000 below minimum 30.0000");
    }

    #[test]
    fn bounds_are_inclusive() {
        let thresholds = MetricThresholds::unchecked().with_min_psnr(30.0).with_max_abs_diff(3);
        assert!(thresholds.check(&scores(1.0, 30.0, 1.0, 3)).is_empty());
    }
}
