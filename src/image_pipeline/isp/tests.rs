use crate::image_pipeline::common::error::{IspError, Result};
use crate::image_pipeline::common::types::RgbImage;
use crate::image_pipeline::isp::*;
use crate::image_pipeline::raw::{decode, BayerGrid, BayerPlane, CfaPattern, PixelFormat};

fn neutral_config() -> IspConfigBuilder {
    IspConfig::builder()
        .levels(0.0, 255.0)
        .gains(WhiteBalanceGains::unity())
        .color_matrix(ColorMatrix::identity())
        .gamma(1.0)
}

fn flat_grid(width: usize, height: usize, value: u8, cfa: CfaPattern) -> BayerGrid {
    let bytes = vec![value; width * height];
    decode(&bytes, width, height, PixelFormat::Plain8, None, cfa).unwrap()
}

#[test]
fn flat_gray_frame_renders_uniform_gray() {
    let grid = flat_grid(4, 4, 128, CfaPattern::rggb());
    for algorithm in [DemosaicAlgorithm::Vng, DemosaicAlgorithm::Bilinear, DemosaicAlgorithm::BayerLinear] {
        let pipeline = IspPipeline::new(neutral_config().demosaic(algorithm).build()).unwrap();
        let output = pipeline.process(&grid).unwrap();
        assert_eq!(output.image.dimensions(), (4, 4));
        assert!(output.image.data.iter().all(|&v| v == 128), "{algorithm}: {:?}", output.image.data);
    }
}

#[test]
fn default_config_flips_vertically() {
    let mut bytes = vec![0u8; 8 * 8];
    bytes[..16].fill(255);
    let grid = decode(&bytes, 8, 8, PixelFormat::Plain8, None, CfaPattern::rggb()).unwrap();

    let pipeline = |orientation| {
        IspPipeline::new(
            neutral_config()
                .equalization(None)
                .demosaic(DemosaicAlgorithm::Bilinear)
                .orientation(orientation)
                .build(),
        )
        .unwrap()
    };
    let upright = pipeline(Orientation::None).process(&grid).unwrap().image;
    let flipped = pipeline(Orientation::FlipVertical).process(&grid).unwrap().image;

    assert_eq!(flipped, orientation::flip_vertical(&upright));
    assert_eq!(upright.pixel(0, 0), [255, 255, 255]);
    assert_eq!(flipped.pixel(7, 0), [255, 255, 255]);
}

#[test]
fn diagnostics_are_taken_before_orientation() {
    let grid = flat_grid(8, 6, 200, CfaPattern::bggr());
    let rotate = IspPipeline::new(neutral_config().orientation(Orientation::Rotate90).build()).unwrap();
    let keep = IspPipeline::new(neutral_config().orientation(Orientation::None).build()).unwrap();

    let rotated = rotate.process(&grid).unwrap();
    let kept = keep.process(&grid).unwrap();
    assert_eq!(rotated.image.dimensions(), (6, 8));
    assert_eq!(rotated.diagnostics.channel_sums, kept.diagnostics.channel_sums);
    let expected = 48.0 * 200.0 / 255.0;
    assert!((kept.diagnostics.channel_sums.red - expected).abs() < 1e-3);
}

#[test]
fn resize_and_output_dimensions_agree() {
    let grid = flat_grid(16, 12, 90, CfaPattern::bggr());
    let config = IspConfig::builder().resize_factor(4).build();
    let expected = config.output_dimensions(16, 12);
    let output = IspPipeline::new(config).unwrap().process(&grid).unwrap();
    assert_eq!(output.image.dimensions(), expected);
    assert_eq!(expected, (4, 3));
}

#[test]
fn oversized_resize_factor_is_a_config_error() {
    let grid = flat_grid(4, 4, 90, CfaPattern::bggr());
    let pipeline = IspPipeline::new(IspConfig::builder().resize_factor(8).build()).unwrap();
    assert!(matches!(pipeline.process(&grid), Err(IspError::InvalidConfig(_))));
}

#[test]
fn invalid_configs_are_rejected_up_front() {
    let cases = [
        IspConfig::builder().levels(200.0, 100.0).build(),
        IspConfig::builder().gamma(0.0).build(),
        IspConfig::builder().resize_factor(0).build(),
        IspConfig::builder().gains(WhiteBalanceGains([1.0, -1.0, 1.0])).build(),
    ];
    for config in cases {
        assert!(matches!(IspPipeline::new(config), Err(IspError::InvalidConfig(_))));
    }
}

#[test]
fn timings_cover_every_enabled_stage() {
    let grid = flat_grid(8, 8, 60, CfaPattern::bggr());
    let output = IspPipeline::new(IspConfig::default()).unwrap().process(&grid).unwrap();
    for stage in ["black_level", "white_balance", "demosaic", "color_correction", "gamma", "clip", "equalization", "orientation"] {
        assert!(output.timings.get_step(stage).is_some(), "missing {stage}");
    }
    assert!(output.timings.get_step("resize").is_none());
}

#[test]
fn auto_white_balance_reports_clamped_gains() {
    let grid = flat_grid(8, 8, 100, CfaPattern::bggr());
    let config = neutral_config()
        .white_balance(WhiteBalance::Auto(AutoWhiteBalance::default()))
        .build();
    let output = IspPipeline::new(config).unwrap().process(&grid).unwrap();
    // 254/100 is far above the 1.6 ceiling.
    assert_eq!(output.diagnostics.white_balance_gains, [1.6; 3]);
}

struct ConstantDemosaic;

impl DemosaicStrategy for ConstantDemosaic {
    fn name(&self) -> &'static str {
        "constant"
    }

    fn demosaic(&self, plane: &BayerPlane) -> Result<RgbImage<f32>> {
        Ok(RgbImage::filled(plane.width, plane.height, [1.0, 0.0, 0.5]))
    }
}

#[test]
fn custom_demosaic_strategy_is_used() {
    let grid = flat_grid(4, 2, 10, CfaPattern::rggb());
    let pipeline = IspPipeline::new(neutral_config().equalization(None).build())
        .unwrap()
        .with_demosaic(Box::new(ConstantDemosaic));
    assert_eq!(pipeline.demosaic_name(), "constant");
    let output = pipeline.process(&grid).unwrap();
    assert!(output.image.data.chunks_exact(3).all(|px| px == [255, 0, 128]));
}

#[test]
fn preview_skips_tone_stages() {
    let grid = flat_grid(4, 4, 51, CfaPattern::rggb());
    let pipeline = IspPipeline::new(IspConfig::default()).unwrap();
    let preview = pipeline.preview(&grid).unwrap();
    assert!(preview.data.iter().all(|&v| v == 51));
}
