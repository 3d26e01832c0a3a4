use tracing::{debug, info, info_span, instrument};

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::common::timing::PipelineTimings;
use crate::image_pipeline::common::types::Rgb8Image;
use crate::image_pipeline::isp::config::{IspConfig, WhiteBalance};
use crate::image_pipeline::isp::demosaic::DemosaicStrategy;
use crate::image_pipeline::isp::stats::ChannelSums;
use crate::image_pipeline::isp::{black_level, clip, color, gamma, histogram, resize, white_balance};
use crate::image_pipeline::raw::BayerGrid;

/// Side information gathered while processing a frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Diagnostics {
    /// Sums of the demosaiced channels, taken before any orientation change
    pub channel_sums: ChannelSums,
    pub white_balance_gains: [f32; 3],
}

/// Result of [`IspPipeline::process`]
#[derive(Debug, Clone)]
pub struct IspOutput {
    pub image: Rgb8Image,
    pub diagnostics: Diagnostics,
    pub timings: PipelineTimings,
}

/// The reference RAW to RGB chain.
///
/// Holds only configuration, so one instance can process any number of
/// frames, from any number of threads.
pub struct IspPipeline {
    config: IspConfig,
    demosaic: Box<dyn DemosaicStrategy>,
}

impl IspPipeline {
    pub fn new(config: IspConfig) -> Result<Self> {
        config.validate()?;
        let demosaic = config.demosaic.strategy();
        Ok(Self { config, demosaic })
    }

    /// Replaces the configured demosaic algorithm with a custom strategy.
    pub fn with_demosaic(mut self, strategy: Box<dyn DemosaicStrategy>) -> Self {
        self.demosaic = strategy;
        self
    }

    pub fn config(&self) -> &IspConfig {
        &self.config
    }

    pub fn demosaic_name(&self) -> &'static str {
        self.demosaic.name()
    }

    #[instrument(skip_all, fields(width = grid.width, height = grid.height, demosaic = self.demosaic.name()))]
    pub fn process(&self, grid: &BayerGrid) -> Result<IspOutput> {
        let cfg = &self.config;
        let mut timings = PipelineTimings::new();

        let plane = timings.measure("black_level", || {
            let _span = info_span!("black_level", black = cfg.black_level, white = cfg.white_level).entered();
            black_level::normalize(grid, cfg.black_level, cfg.white_level)
        });

        let (balanced, gains) = timings.measure("white_balance", || {
            let _span = info_span!("white_balance").entered();
            let gains = match cfg.white_balance {
                WhiteBalance::Fixed(gains) => gains,
                WhiteBalance::Auto(auto) => auto.estimate(&plane),
            };
            (white_balance::apply(&plane, &gains), gains)
        });
        drop(plane);

        let rgb = timings.measure("demosaic", || {
            let _span = info_span!("demosaic", algorithm = self.demosaic.name()).entered();
            self.demosaic.demosaic(&balanced)
        })?;
        drop(balanced);

        let channel_sums = ChannelSums::of(&rgb);
        info!("Color contribution {}", channel_sums);

        let corrected = timings.measure("color_correction", || {
            let _span = info_span!("color_correction").entered();
            color::correct(&rgb, &cfg.color_matrix)
        });

        let encoded = timings.measure("gamma", || {
            let _span = info_span!("gamma", gamma = cfg.gamma).entered();
            gamma::encode(&corrected, cfg.gamma)
        });

        let mut image = timings.measure("clip", || {
            let _span = info_span!("clip").entered();
            clip::clip(&encoded)
        });

        if let Some(mode) = cfg.equalization {
            image = timings.measure("equalization", || {
                let _span = info_span!("equalization", mode = %mode).entered();
                histogram::equalize(&image, mode)
            });
        }

        if cfg.resize_factor != 1 {
            image = timings.measure("resize", || {
                let _span = info_span!("resize", factor = cfg.resize_factor).entered();
                resize::downscale(&image, cfg.resize_factor)
            })?;
        }

        image = timings.measure("orientation", || {
            let _span = info_span!("orientation", orientation = %cfg.orientation).entered();
            cfg.orientation.apply(&image)
        });

        debug!(
            width = image.width,
            height = image.height,
            total_ms = timings.total_duration().as_secs_f64() * 1000.0,
            "ISP complete"
        );

        Ok(IspOutput {
            image,
            diagnostics: Diagnostics {
                channel_sums,
                white_balance_gains: gains.0,
            },
            timings,
        })
    }

    /// Demosaic-only rendering of the unprocessed mosaic.
    ///
    /// Samples are scaled by the full code range of the grid's bit depth,
    /// no levels, gains, color or tone stages are applied. The configured
    /// orientation is kept so the preview lines up with `process` output.
    #[instrument(skip_all, fields(width = grid.width, height = grid.height))]
    pub fn preview(&self, grid: &BayerGrid) -> Result<Rgb8Image> {
        let plane = black_level::normalize(grid, 0.0, grid.max_value() as f32);
        let rgb = self.demosaic.demosaic(&plane)?;
        Ok(self.config.orientation.apply(&clip::clip(&rgb)))
    }
}
