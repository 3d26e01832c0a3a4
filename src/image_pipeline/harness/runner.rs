use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use tracing::{error, info, info_span, instrument, warn};

use crate::image_pipeline::common::error::{IspError, Result};
use crate::image_pipeline::common::types::Rgb8Image;
use crate::image_pipeline::harness::compare::compare;
use crate::image_pipeline::harness::corpus::{Corpus, TestVector};
use crate::image_pipeline::harness::hardware::HardwarePipeline;
use crate::image_pipeline::harness::record::MetricRecord;
use crate::image_pipeline::harness::summary::{RunSummary, VectorOutcome, VectorStatus};
use crate::image_pipeline::harness::thresholds::MetricThresholds;
use crate::image_pipeline::isp::{IspConfig, IspPipeline};
use crate::image_pipeline::output::{decode_rgb888, ImageWriter, PngWriter};
use crate::image_pipeline::raw::{FrameGeometry, RawFrameReader, SensorDumpReader};

/// Configuration for a cross-validation run
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Layout of every raw vector
    pub geometry: FrameGeometry,
    /// Reference pipeline tuning; must match the hardware build
    pub isp: IspConfig,
    pub thresholds: MetricThresholds,
    /// Vectors processed concurrently; 0 uses one thread per core
    pub jobs: usize,
    /// When set, both renderings of every vector are saved here as PNG
    pub artifacts_dir: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            geometry: FrameGeometry::default(),
            isp: IspConfig::default(),
            thresholds: MetricThresholds::default(),
            jobs: 1,
            artifacts_dir: None,
        }
    }
}

impl HarnessConfig {
    pub fn builder() -> HarnessConfigBuilder {
        HarnessConfigBuilder::default()
    }
}

/// Builder for HarnessConfig
#[derive(Default)]
pub struct HarnessConfigBuilder {
    geometry: Option<FrameGeometry>,
    isp: Option<IspConfig>,
    thresholds: Option<MetricThresholds>,
    jobs: Option<usize>,
    artifacts_dir: Option<Option<PathBuf>>,
}

impl HarnessConfigBuilder {
    pub fn geometry(mut self, geometry: FrameGeometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn isp(mut self, isp: IspConfig) -> Self {
        self.isp = Some(isp);
        self
    }

    pub fn thresholds(mut self, thresholds: MetricThresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
        self
    }

    pub fn artifacts_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.artifacts_dir = Some(dir);
        self
    }

    pub fn build(self) -> HarnessConfig {
        let default = HarnessConfig::default();
        HarnessConfig {
            geometry: self.geometry.unwrap_or(default.geometry),
            isp: self.isp.unwrap_or(default.isp),
            thresholds: self.thresholds.unwrap_or(default.thresholds),
            jobs: self.jobs.unwrap_or(default.jobs),
            artifacts_dir: self.artifacts_dir.unwrap_or(default.artifacts_dir),
        }
    }
}

/// Runs the reference pipeline and a [`HardwarePipeline`] on every vector
/// of a corpus and compares the two renderings.
pub struct Harness<H: HardwarePipeline> {
    reader: SensorDumpReader,
    reference: IspPipeline,
    hardware: H,
    thresholds: MetricThresholds,
    artifacts_dir: Option<PathBuf>,
    pool: rayon::ThreadPool,
}

impl<H: HardwarePipeline> Harness<H> {
    pub fn new(config: HarnessConfig, hardware: H) -> Result<Self> {
        let reference = IspPipeline::new(config.isp)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.jobs)
            .build()
            .map_err(|e| IspError::InvalidConfig(format!("thread pool: {e}")))?;
        if let Some(dir) = &config.artifacts_dir {
            std::fs::create_dir_all(dir).map_err(|e| IspError::OutputWrite {
                path: dir.clone(),
                reason: e.to_string(),
            })?;
        }
        Ok(Self {
            reader: SensorDumpReader::new(config.geometry),
            reference,
            hardware,
            thresholds: config.thresholds,
            artifacts_dir: config.artifacts_dir,
            pool,
        })
    }

    pub fn reference(&self) -> &IspPipeline {
        &self.reference
    }

    /// Processes every vector; a failing vector never stops the others.
    #[instrument(skip_all, fields(vectors = corpus.len(), hardware = self.hardware.name()))]
    pub fn run(&self, corpus: &Corpus) -> RunSummary {
        info!("Starting validation run");
        let outcomes: Vec<VectorOutcome> = self
            .pool
            .install(|| corpus.vectors.par_iter().map(|v| self.run_vector(v)).collect());

        let summary = RunSummary { outcomes };
        info!(
            passed = summary.passed_count(),
            total = summary.outcomes.len(),
            "Validation run complete"
        );
        summary
    }

    pub fn run_vector(&self, vector: &TestVector) -> VectorOutcome {
        let _span = info_span!("vector", name = %vector.name).entered();
        let started = Instant::now();

        let status = match self.evaluate(vector) {
            Ok(record) => {
                info!(
                    mse = record.scores.mse,
                    psnr = record.scores.psnr,
                    ssim = record.scores.ssim,
                    max_abs_diff = record.scores.max_abs_diff,
                    "Vector passed"
                );
                VectorStatus::Passed(record)
            }
            Err(e) => {
                warn!("Vector failed: {}", e);
                status_of(e)
            }
        };

        VectorOutcome {
            name: vector.name.clone(),
            status,
            duration: started.elapsed(),
        }
    }

    fn evaluate(&self, vector: &TestVector) -> Result<MetricRecord> {
        let raw = std::fs::read(&vector.path).map_err(|e| IspError::InputRead {
            path: vector.path.clone(),
            reason: e.to_string(),
        })?;

        let grid = {
            let _span = info_span!("decode_raw").entered();
            self.reader.read_raw(&raw)?
        };
        let reference = self.reference.process(&grid)?.image;

        let candidate_bytes = {
            let _span = info_span!("hardware", pipeline = self.hardware.name()).entered();
            self.hardware.run(&vector.path)?
        };
        let candidate = decode_rgb888(&candidate_bytes, reference.width, reference.height)?;

        if let Some(dir) = &self.artifacts_dir {
            self.save_artifact(dir, &vector.name, "reference", &reference);
            self.save_artifact(dir, &vector.name, "hardware", &candidate);
        }

        compare(&vector.name, &reference, &candidate, &self.thresholds)
    }

    fn save_artifact(&self, dir: &Path, name: &str, kind: &str, image: &Rgb8Image) {
        let path = dir.join(format!("{name}_{kind}.png"));
        let result = std::fs::File::create(&path)
            .map_err(IspError::from)
            .and_then(|mut file| PngWriter.write_rgb8(image, &mut file));
        if let Err(e) = result {
            error!(path = %path.display(), "Could not save artifact: {}", e);
        }
    }
}

fn status_of(error: IspError) -> VectorStatus {
    match error {
        IspError::MetricThresholdViolation { record, violations, .. } => VectorStatus::MetricFailure {
            record: *record,
            violations,
        },
        IspError::DimensionMismatch { reference, candidate, .. } => {
            VectorStatus::DimensionMismatch { reference, candidate }
        }
        IspError::Format(e) => VectorStatus::FormatFailure(e.to_string()),
        other => VectorStatus::InfrastructureFailure(other.to_string()),
    }
}
