//! Cross-validation of the reference ISP against a hardware implementation
//!
//! Every raw vector of a corpus goes through both pipelines; the two RGB8
//! renderings are scored (MSE, PSNR, SSIM, max abs diff) and checked against
//! [`MetricThresholds`]. Failures are recorded per vector and never abort
//! the run.

mod compare;
pub mod corpus;
pub mod hardware;
pub mod metrics;
mod record;
mod runner;
mod summary;
mod thresholds;

#[cfg(test)]
mod tests;

pub use compare::compare;
pub use corpus::{Corpus, TestVector};
pub use hardware::{CommandHardwarePipeline, HardwarePipeline};
pub use record::{Metric, MetricRecord, MetricScores, Violation};
pub use runner::{Harness, HarnessConfig, HarnessConfigBuilder};
pub use summary::{RunSummary, VectorOutcome, VectorStatus};
pub use thresholds::MetricThresholds;
