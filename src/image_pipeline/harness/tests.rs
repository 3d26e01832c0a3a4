use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::image_pipeline::common::error::{IspError, Result};
use crate::image_pipeline::common::types::Rgb8Image;
use crate::image_pipeline::harness::*;
use crate::image_pipeline::isp::{IspConfig, IspPipeline};
use crate::image_pipeline::raw::{CfaPattern, FrameGeometry, PixelFormat, RawFrameReader, SensorDumpReader};

const WIDTH: usize = 16;
const HEIGHT: usize = 12;

fn geometry() -> FrameGeometry {
    FrameGeometry::new(WIDTH, HEIGHT, PixelFormat::Plain8, CfaPattern::bggr())
}

/// Hardware stand-in that renders with the reference chain and then lets
/// the test tamper with the result.
struct FakeHardware<F> {
    reference: IspPipeline,
    tamper: F,
}

impl<F> FakeHardware<F>
where
    F: Fn(&str, Vec<u8>) -> Result<Vec<u8>> + Send + Sync,
{
    fn new(tamper: F) -> Self {
        Self {
            reference: IspPipeline::new(IspConfig::default()).unwrap(),
            tamper,
        }
    }
}

impl<F> HardwarePipeline for FakeHardware<F>
where
    F: Fn(&str, Vec<u8>) -> Result<Vec<u8>> + Send + Sync,
{
    fn name(&self) -> &str {
        "fake"
    }

    fn run(&self, raw_path: &Path) -> Result<Vec<u8>> {
        let raw = std::fs::read(raw_path)?;
        let grid = SensorDumpReader::new(geometry()).read_raw(&raw)?;
        let image = self.reference.process(&grid)?.image;
        let stem = raw_path.file_stem().unwrap().to_string_lossy().into_owned();
        (self.tamper)(&stem, image.data)
    }
}

fn corpus(names: &[&str]) -> (TempDir, Corpus) {
    let dir = tempfile::tempdir().unwrap();
    for (k, name) in names.iter().enumerate() {
        let bytes: Vec<u8> = (0..WIDTH * HEIGHT).map(|i| ((i * 37 + k * 11) % 256) as u8).collect();
        std::fs::write(dir.path().join(format!("{name}.raw")), bytes).unwrap();
    }
    let corpus = Corpus::discover(dir.path()).unwrap();
    (dir, corpus)
}

fn config(thresholds: MetricThresholds) -> HarnessConfig {
    HarnessConfig::builder()
        .geometry(geometry())
        .thresholds(thresholds)
        .build()
}

#[test]
fn identical_output_scores_perfectly() {
    let (_dir, corpus) = corpus(&["a", "b"]);
    let harness = Harness::new(config(MetricThresholds::exact()), FakeHardware::new(|_, data| Ok(data))).unwrap();

    let summary = harness.run(&corpus);
    assert!(summary.passed(), "{summary}");
    for outcome in &summary.outcomes {
        let record = outcome.status.record().unwrap();
        assert_eq!((record.width, record.height), (WIDTH, HEIGHT));
        assert_eq!(record.scores.mse, 0.0);
        assert!(record.scores.psnr.is_infinite());
        assert!((record.scores.ssim - 1.0).abs() < 1e-12);
        assert_eq!(record.scores.max_abs_diff, 0);
    }
}

/// Moves one channel of one pixel of vector "b" by a single level.
fn off_by_one_on_b(name: &str, mut data: Vec<u8>) -> Result<Vec<u8>> {
    if name == "b" {
        let v = &mut data[WIDTH * 3 + 4];
        *v = if *v == 255 { 254 } else { *v + 1 };
    }
    Ok(data)
}

#[test]
fn one_level_difference_passes_coarse_thresholds() {
    let (_dir, corpus) = corpus(&["a", "b", "c"]);
    let harness = Harness::new(config(MetricThresholds::default()), FakeHardware::new(off_by_one_on_b)).unwrap();

    let summary = harness.run(&corpus);
    assert!(summary.passed(), "{summary}");
    let b = summary.get("b").unwrap().status.record().unwrap();
    assert!((b.scores.mse - 1.0 / (WIDTH * HEIGHT * 3) as f64).abs() < 1e-12);
    assert_eq!(b.scores.max_abs_diff, 1);
}

#[test]
fn one_level_difference_fails_near_zero_thresholds_without_stopping_the_run() {
    let (_dir, corpus) = corpus(&["a", "b", "c"]);
    let thresholds = MetricThresholds::unchecked().with_max_mse(1e-6);
    let harness = Harness::new(config(thresholds), FakeHardware::new(off_by_one_on_b)).unwrap();

    let summary = harness.run(&corpus);
    assert!(!summary.passed());
    assert_eq!(summary.outcomes.len(), 3);
    assert_eq!(summary.passed_count(), 2);
    match &summary.get("b").unwrap().status {
        VectorStatus::MetricFailure { record, violations } => {
            assert_eq!(record.vector, "b");
            assert_eq!(violations.len(), 1);
            assert_eq!(violations[0].metric, Metric::Mse);
        }
        other => panic!("unexpected status {other:?}"),
    }
    assert!(summary.get("a").unwrap().status.is_pass());
    assert!(summary.get("c").unwrap().status.is_pass());
}

#[test]
fn infrastructure_failure_is_recorded_and_run_continues() {
    let (_dir, corpus) = corpus(&["a", "b", "c"]);
    let hardware = FakeHardware::new(|name: &str, data| {
        if name == "a" {
            Err(IspError::ExternalToolFailure {
                stage: "run".into(),
                reason: "board not connected".into(),
            })
        } else {
            Ok(data)
        }
    });
    let harness = Harness::new(config(MetricThresholds::default()), hardware).unwrap();

    let summary = harness.run(&corpus);
    assert!(!summary.passed());
    assert!(matches!(
        &summary.get("a").unwrap().status,
        VectorStatus::InfrastructureFailure(reason) if reason.contains("board not connected")
    ));
    assert_eq!(summary.passed_count(), 2);
    assert_eq!(summary.failures().count(), 1);
}

#[test]
fn wrong_sized_hardware_output_is_a_format_failure() {
    let (_dir, corpus) = corpus(&["a"]);
    let hardware = FakeHardware::new(|_: &str, mut data: Vec<u8>| {
        data.truncate(data.len() - 3);
        Ok(data)
    });
    let harness = Harness::new(config(MetricThresholds::default()), hardware).unwrap();

    let summary = harness.run(&corpus);
    assert!(matches!(summary.outcomes[0].status, VectorStatus::FormatFailure(_)));
}

#[test]
fn truncated_raw_vector_is_a_format_failure() {
    let (dir, _) = corpus(&[]);
    let path: PathBuf = dir.path().join("short.raw");
    std::fs::write(&path, vec![0u8; 10]).unwrap();
    let corpus = Corpus::discover(dir.path()).unwrap();

    let harness = Harness::new(config(MetricThresholds::default()), FakeHardware::new(|_, data| Ok(data))).unwrap();
    let summary = harness.run(&corpus);
    assert!(matches!(summary.outcomes[0].status, VectorStatus::FormatFailure(_)));
}

#[test]
fn parallel_run_keeps_corpus_order() {
    let names = ["v0", "v1", "v2", "v3", "v4", "v5"];
    let (_dir, corpus) = corpus(&names);
    let cfg = HarnessConfig::builder()
        .geometry(geometry())
        .jobs(4)
        .build();
    let harness = Harness::new(cfg, FakeHardware::new(|_, data| Ok(data))).unwrap();

    let summary = harness.run(&corpus);
    let order: Vec<&str> = summary.outcomes.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(order, names);
    assert!(summary.passed());
}

#[test]
fn artifacts_are_written_when_requested() {
    let (dir, corpus) = corpus(&["a"]);
    let artifacts = dir.path().join("out").join("run1");
    let cfg = HarnessConfig::builder()
        .geometry(geometry())
        .artifacts_dir(Some(artifacts.clone()))
        .build();
    let harness = Harness::new(cfg, FakeHardware::new(|_, data| Ok(data))).unwrap();

    assert!(harness.run(&corpus).passed());
    assert!(artifacts.join("a_reference.png").is_file());
    assert!(artifacts.join("a_hardware.png").is_file());
}

#[test]
fn empty_corpus_does_not_pass() {
    let harness = Harness::new(HarnessConfig::default(), FakeHardware::new(|_, data| Ok(data))).unwrap();
    let summary = harness.run(&Corpus::default());
    assert!(summary.outcomes.is_empty());
    assert!(!summary.passed());
}

#[test]
fn compare_separates_size_mismatch_from_metric_failure() {
    let a = Rgb8Image::filled(4, 4, [10, 20, 30]);
    let b = Rgb8Image::filled(4, 3, [10, 20, 30]);
    let err = compare("v", &a, &b, &MetricThresholds::default()).unwrap_err();
    assert!(matches!(
        err,
        IspError::DimensionMismatch { reference: (4, 4), candidate: (4, 3), .. }
    ));

    let c = Rgb8Image::filled(4, 4, [90, 20, 30]);
    let err = compare("v", &a, &c, &MetricThresholds::default()).unwrap_err();
    match err {
        IspError::MetricThresholdViolation { vector, record, violations } => {
            assert_eq!(vector, "v");
            assert_eq!(record.scores.max_abs_diff, 80);
            assert!(violations.iter().any(|v| v.metric == Metric::Psnr));
        }
        other => panic!("unexpected error {other:?}"),
    }

    let record = compare("v", &a, &a, &MetricThresholds::exact()).unwrap();
    assert_eq!(record.scores, MetricScores::perfect());
}

#[test]
fn single_channel_one_level_difference() {
    let reference = Rgb8Image {
        width: 16,
        height: 16,
        data: (0..16 * 16 * 3).map(|i| (i * 7 % 251) as u8).collect(),
    };
    let mut candidate = reference.clone();
    candidate.data[100] ^= 1;

    let record = compare("v", &reference, &candidate, &MetricThresholds::default()).unwrap();
    assert_eq!(record.scores.max_abs_diff, 1);
    assert!((record.scores.mse - 1.0 / 768.0).abs() < 1e-12);
    assert!(record.scores.psnr > 70.0);
    assert!(record.scores.ssim > 0.99);

    for strict in [
        MetricThresholds::unchecked().with_max_mse(1e-9),
        MetricThresholds::unchecked().with_max_abs_diff(0),
    ] {
        match compare("v", &reference, &candidate, &strict).unwrap_err() {
            IspError::MetricThresholdViolation { record, violations, .. } => {
                assert_eq!(record.scores.max_abs_diff, 1);
                assert_eq!(violations.len(), 1);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}

#[test]
fn summary_table_lists_every_vector() {
    let (_dir, corpus) = corpus(&["alpha", "b"]);
    let thresholds = MetricThresholds::unchecked().with_max_mse(1e-6);
    let harness = Harness::new(config(thresholds), FakeHardware::new(off_by_one_on_b)).unwrap();

    let text = harness.run(&corpus).to_string();
    assert!(text.contains("alpha"));
    assert!(text.contains("PASS"));
    assert!(text.contains("MSE"));
    assert!(text.ends_with("1/2 vectors passed: FAIL"), "{text}");
}
