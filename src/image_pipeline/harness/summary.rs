use std::fmt;
use std::time::Duration;

use crate::image_pipeline::harness::record::{MetricRecord, Violation};

/// How one vector ended.
#[derive(Debug, Clone, PartialEq)]
pub enum VectorStatus {
    Passed(MetricRecord),
    MetricFailure {
        record: MetricRecord,
        violations: Vec<Violation>,
    },
    DimensionMismatch {
        reference: (usize, usize),
        candidate: (usize, usize),
    },
    /// The raw input or the hardware output could not be interpreted
    FormatFailure(String),
    /// The hardware run, or reading a file, failed
    InfrastructureFailure(String),
}

impl VectorStatus {
    pub fn is_pass(&self) -> bool {
        matches!(self, VectorStatus::Passed(_))
    }

    pub fn record(&self) -> Option<&MetricRecord> {
        match self {
            VectorStatus::Passed(record) | VectorStatus::MetricFailure { record, .. } => Some(record),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VectorStatus::Passed(_) => "PASS",
            VectorStatus::MetricFailure { .. } => "FAIL",
            VectorStatus::DimensionMismatch { .. } => "SIZE",
            VectorStatus::FormatFailure(_) => "FORMAT",
            VectorStatus::InfrastructureFailure(_) => "INFRA",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VectorOutcome {
    pub name: String,
    pub status: VectorStatus,
    pub duration: Duration,
}

/// Outcome of every vector of a run, in corpus order.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub outcomes: Vec<VectorOutcome>,
}

impl RunSummary {
    /// True when at least one vector ran and every vector passed.
    pub fn passed(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(|o| o.status.is_pass())
    }

    pub fn passed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.is_pass()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &VectorOutcome> {
        self.outcomes.iter().filter(|o| !o.status.is_pass())
    }

    pub fn get(&self, name: &str) -> Option<&VectorOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }
}

fn fmt_psnr(psnr: f64) -> String {
    if psnr.is_infinite() { "inf".to_string() } else { format!("{psnr:.2}") }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .outcomes
            .iter()
            .map(|o| o.name.len())
            .max()
            .unwrap_or(0)
            .max("vector".len());

        writeln!(
            f,
            "{:<width$}  {:<6}  {:>10}  {:>8}  {:>7}  {:>4}  {:>8}",
            "vector", "status", "mse", "psnr", "ssim", "max", "time"
        )?;
        for outcome in &self.outcomes {
            let time = format!("{:.1}ms", outcome.duration.as_secs_f64() * 1000.0);
            match outcome.status.record() {
                Some(record) => {
                    let s = &record.scores;
                    writeln!(
                        f,
                        "{:<width$}  {:<6}  {:>10.4}  {:>8}  {:>7.4}  {:>4}  {:>8}",
                        outcome.name,
                        outcome.status.label(),
                        s.mse,
                        fmt_psnr(s.psnr),
                        s.ssim,
                        s.max_abs_diff,
                        time
                    )?;
                }
                None => {
                    let detail = match &outcome.status {
                        VectorStatus::DimensionMismatch { reference, candidate } => format!(
                            "reference {}x{} vs candidate {}x{}",
                            reference.0, reference.1, candidate.0, candidate.1
                        ),
                        VectorStatus::FormatFailure(reason) | VectorStatus::InfrastructureFailure(reason) => {
                            reason.clone()
                        }
                        _ => String::new(),
                    };
                    writeln!(f, "{:<width$}  {:<6}  {}", outcome.name, outcome.status.label(), detail)?;
                }
            }
            if let VectorStatus::MetricFailure { violations, .. } = &outcome.status {
                for v in violations {
                    writeln!(f, "{:<width$}    - {}", "", v)?;
                }
            }
        }
        write!(
            f,
            "{}/{} vectors passed: {}",
            self.passed_count(),
            self.outcomes.len(),
            if self.passed() { "PASS" } else { "FAIL" }
        )
    }
}
