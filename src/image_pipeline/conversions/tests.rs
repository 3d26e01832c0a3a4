use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};

use crate::image_pipeline::common::error::{FormatError, IspError, Result};
use crate::image_pipeline::common::types::Rgb8Image;
use crate::image_pipeline::conversions::RawToImagePipeline;
use crate::image_pipeline::isp::{ColorMatrix, IspConfig, IspPipeline, WhiteBalanceGains};
use crate::image_pipeline::output::ImageWriter;
use crate::image_pipeline::raw::{BayerGrid, CfaPattern, FrameGeometry, PixelFormat, RawFrameReader, SensorDumpReader};

struct MockReader {
    should_fail: bool,
    mock_data: Option<BayerGrid>,
}

impl RawFrameReader for MockReader {
    fn read_raw(&self, _data: &[u8]) -> Result<BayerGrid> {
        if self.should_fail {
            return Err(FormatError::UnknownPixelFormat("mock".to_string()).into());
        }
        Ok(self.mock_data.clone().unwrap_or(BayerGrid {
            width: 8,
            height: 8,
            samples: vec![128; 64],
            bit_depth: 8,
            cfa: CfaPattern::rggb(),
        }))
    }
}

struct MockWriter {
    should_fail: bool,
    written_data: Arc<Mutex<Vec<Rgb8Image>>>,
}

impl ImageWriter for MockWriter {
    fn write_rgb8(&self, image: &Rgb8Image, _output: &mut dyn Write) -> Result<()> {
        if self.should_fail {
            return Err(IspError::Encode("Mock encode error".to_string()));
        }
        self.written_data.lock().unwrap().push(image.clone());
        Ok(())
    }
}

fn neutral_isp() -> IspPipeline {
    IspPipeline::new(
        IspConfig::builder()
            .levels(0.0, 255.0)
            .gains(WhiteBalanceGains::unity())
            .color_matrix(ColorMatrix::identity())
            .gamma(1.0)
            .build(),
    )
    .unwrap()
}

#[test]
fn test_greyscale_output() {
    let written = Arc::new(Mutex::new(Vec::new()));
    let grid = BayerGrid {
        width: 8,
        height: 8,
        samples: (0..64).map(|i| (i * 29 % 200) as u16 + 20).collect(),
        bit_depth: 8,
        cfa: CfaPattern::rggb(),
    };
    let reader = MockReader { should_fail: false, mock_data: Some(grid) };
    let writer = MockWriter { should_fail: false, written_data: written.clone() };

    let pipeline = RawToImagePipeline::with_custom(reader, writer, neutral_isp()).with_greyscale(true);
    let report = pipeline.convert(b"fake raw data", &mut Cursor::new(Vec::new())).unwrap();

    let written = written.lock().unwrap();
    assert!(written[0].data.chunks_exact(3).all(|px| px[0] == px[1] && px[1] == px[2]));
    assert!(written[0].data.chunks_exact(3).any(|px| px[0] != written[0].data[0]));
    assert_eq!(report.channel_stats[0], report.channel_stats[2]);
    assert!(report.timings.get_step("greyscale").is_some());
}

#[test]
fn test_successful_conversion() {
    let written = Arc::new(Mutex::new(Vec::new()));
    let reader = MockReader { should_fail: false, mock_data: None };
    let writer = MockWriter { should_fail: false, written_data: written.clone() };

    let pipeline = RawToImagePipeline::with_custom(reader, writer, neutral_isp());

    let mut output = Cursor::new(Vec::new());
    let report = pipeline.convert(b"fake raw data", &mut output).unwrap();

    let written = written.lock().unwrap();
    assert_eq!(written.len(), 1);
    assert!(written[0].data.iter().all(|&v| v == 128));
    assert_eq!((report.width, report.height), (8, 8));
    assert!(report.diagnostics.is_some());
    assert_eq!(report.channel_stats[0].mean, 128.0);
    assert_eq!(report.channel_stats[2].max, 128);
    assert!(report.timings.get_step("decode_raw").is_some());
    assert!(report.timings.get_step("demosaic").is_some());
    assert!(report.timings.get_step("encode").is_some());
}

#[test]
fn test_reader_failure() {
    let written = Arc::new(Mutex::new(Vec::new()));
    let reader = MockReader { should_fail: true, mock_data: None };
    let writer = MockWriter { should_fail: false, written_data: written.clone() };

    let pipeline = RawToImagePipeline::with_custom(reader, writer, neutral_isp());

    let mut output = Cursor::new(Vec::new());
    let result = pipeline.convert(b"fake raw data", &mut output);

    assert!(matches!(result.unwrap_err(), IspError::Format(FormatError::UnknownPixelFormat(_))));
    assert!(written.lock().unwrap().is_empty());
}

#[test]
fn test_writer_failure() {
    let written = Arc::new(Mutex::new(Vec::new()));
    let reader = MockReader { should_fail: false, mock_data: None };
    let writer = MockWriter { should_fail: true, written_data: written };

    let pipeline = RawToImagePipeline::with_custom(reader, writer, neutral_isp());

    let mut output = Cursor::new(Vec::new());
    let result = pipeline.convert(b"fake raw data", &mut output);

    assert!(matches!(result.unwrap_err(), IspError::Encode(_)));
}

#[test]
fn test_preview_skips_diagnostics() {
    let written = Arc::new(Mutex::new(Vec::new()));
    let reader = MockReader {
        should_fail: false,
        mock_data: Some(BayerGrid {
            width: 4,
            height: 4,
            samples: vec![255; 16],
            bit_depth: 8,
            cfa: CfaPattern::bggr(),
        }),
    };
    let writer = MockWriter { should_fail: false, written_data: written.clone() };

    let pipeline = RawToImagePipeline::with_custom(reader, writer, neutral_isp()).with_preview(true);

    let mut output = Cursor::new(Vec::new());
    let report = pipeline.convert(b"fake raw data", &mut output).unwrap();

    assert!(report.diagnostics.is_none());
    assert!(report.timings.get_step("preview").is_some());
    assert!(written.lock().unwrap()[0].data.iter().all(|&v| v == 255));
}

#[test]
fn test_convert_file_with_sensor_reader() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("frame.raw");
    let output = dir.path().join("frame.png");
    std::fs::write(&input, vec![100u8; 16 * 8]).unwrap();

    let geometry = FrameGeometry::new(16, 8, PixelFormat::Plain8, CfaPattern::bggr());
    let pipeline = RawToImagePipeline::new(geometry, IspConfig::default()).unwrap();
    let report = pipeline.convert_file(&input, &output).unwrap();

    assert_eq!((report.width, report.height), (16, 8));
    let bytes = std::fs::read(&output).unwrap();
    assert_eq!(&bytes[..4], b"\x89PNG");
}

#[test]
fn test_missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = RawToImagePipeline::with_custom(
        SensorDumpReader::default(),
        MockWriter { should_fail: false, written_data: Arc::new(Mutex::new(Vec::new())) },
        neutral_isp(),
    );
    let result = pipeline.convert_file(dir.path().join("missing.raw"), dir.path().join("out.png"));
    assert!(matches!(result.unwrap_err(), IspError::InputRead { .. }));
}
