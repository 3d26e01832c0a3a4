use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};

use camera_isp_rs::image_pipeline::harness::{CommandHardwarePipeline, Corpus, Harness, HarnessConfig, MetricThresholds};
use camera_isp_rs::image_pipeline::isp::{
    AutoWhiteBalance, ColorMatrix, DemosaicAlgorithm, EqualizationMode, IspConfig, IspPipeline, Orientation,
    WhiteBalance, WhiteBalanceGains,
};
use camera_isp_rs::image_pipeline::output::{OutputFormat, StandardTiffWriter, TiffCompression};
use camera_isp_rs::image_pipeline::raw::{CfaPattern, FrameGeometry, LowBitOrder, PixelFormat};
use camera_isp_rs::image_pipeline::{RawToImagePipeline, SensorDumpReader};
use camera_isp_rs::logger;

use tracing::{error, info};

#[derive(Parser)]
#[command(name = "camera-isp")]
#[command(version, about = "Reference ISP for Bayer sensor dumps and hardware cross-validation", long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, value_name = "FILTER", default_value = "info")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one raw frame to an image
    Process {
        /// Raw sensor dump
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output image; the extension picks the container (png, tif, rgb)
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Force the output container regardless of extension
        #[arg(long, value_name = "FORMAT")]
        format: Option<OutputFormat>,

        /// TIFF compression: none, lzw, deflate-fast, deflate, deflate-best
        #[arg(long, value_name = "METHOD", default_value = "none")]
        tiff_compression: TiffCompression,

        /// Horizontal differencing in TIFF output; helps lzw and deflate
        #[arg(long)]
        tiff_predictor: bool,

        /// Write luma only, replicated over R, G and B
        #[arg(long)]
        greyscale: bool,

        /// Write the demosaiced raw mosaic instead of the processed image
        #[arg(long)]
        preview: bool,

        /// Print per-stage durations
        #[arg(long)]
        timings: bool,

        #[command(flatten)]
        frame: FrameArgs,

        #[command(flatten)]
        isp: IspArgs,
    },

    /// Compare the reference pipeline with a hardware build over a corpus
    Validate {
        /// Directory holding the *.raw vectors
        #[arg(value_name = "DIR", default_value = "tests/isp/imgs")]
        corpus: PathBuf,

        /// Command producing the RGB888 output; {input} and {output} are substituted
        #[arg(long, value_name = "CMD")]
        run: String,

        /// Command run before each vector, e.g. a firmware rebuild
        #[arg(long, value_name = "CMD")]
        build: Option<String>,

        /// Output path template ({input}, {stem}); defaults to the input with an .rgb extension
        #[arg(long, value_name = "TEMPLATE")]
        hardware_output: Option<String>,

        /// Working directory of the hardware commands
        #[arg(long, value_name = "DIR")]
        workdir: Option<PathBuf>,

        /// Per-command timeout in seconds; a command still running is killed
        #[arg(long, value_name = "SECS", default_value = "600")]
        timeout: u64,

        /// Vectors processed in parallel (0 = one per core)
        #[arg(short = 'j', long, value_name = "N", default_value = "1")]
        jobs: usize,

        /// Save reference and hardware renderings as PNG here
        #[arg(long, value_name = "DIR")]
        artifacts: Option<PathBuf>,

        #[command(flatten)]
        thresholds: ThresholdArgs,

        #[command(flatten)]
        frame: FrameArgs,

        #[command(flatten)]
        isp: IspArgs,
    },
}

#[derive(Args)]
struct FrameArgs {
    #[arg(long, default_value = "640")]
    width: usize,

    #[arg(long, default_value = "480")]
    height: usize,

    /// plain8 (RAW8) or packed10 (MIPI CSI-2 RAW10)
    #[arg(long = "pixel-format", value_name = "FORMAT", default_value = "plain8")]
    pixel_format: PixelFormat,

    /// Bytes per row, when rows carry padding
    #[arg(long)]
    stride: Option<usize>,

    /// 2x2 filter layout: RGGB, BGGR, GRBG, GBRG or indices such as 2,1,1,0
    #[arg(long, default_value = "BGGR")]
    cfa: CfaPattern,

    /// RAW10 remainders packed from the most significant bits down
    #[arg(long)]
    msb_first: bool,
}

impl FrameArgs {
    fn geometry(&self) -> FrameGeometry {
        let mut geometry = FrameGeometry::new(self.width, self.height, self.pixel_format, self.cfa);
        if let Some(stride) = self.stride {
            geometry = geometry.with_stride(stride);
        }
        if self.msb_first {
            geometry = geometry.with_low_bit_order(LowBitOrder::MsbFirst);
        }
        geometry
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Equalization {
    None,
    PerChannel,
    Luma,
}

#[derive(Args)]
struct IspArgs {
    #[arg(long, default_value = "15")]
    black_level: f32,

    #[arg(long, default_value = "254")]
    white_level: f32,

    /// White-balance gains R,G,B
    #[arg(long, value_name = "R,G,B", value_parser = parse_triplet, conflicts_with_all = ["as_shot_neutral", "auto_wb"])]
    gains: Option<[f32; 3]>,

    /// As-shot neutral R,G,B; gains are its reciprocal
    #[arg(long, value_name = "R,G,B", value_parser = parse_triplet, conflicts_with = "auto_wb")]
    as_shot_neutral: Option<[f32; 3]>,

    /// Estimate gains per frame from channel percentiles
    #[arg(long)]
    auto_wb: bool,

    /// Upper gain clamp of the automatic white balance
    #[arg(long, value_name = "GAIN")]
    awb_max_gain: Option<f32>,

    #[arg(long, default_value = "2.0")]
    gamma: f32,

    /// vng, bilinear or bayer-linear
    #[arg(long, default_value = "vng")]
    demosaic: DemosaicAlgorithm,

    /// Nine comma-separated values, row-major
    #[arg(long, value_name = "M")]
    color_matrix: Option<ColorMatrix>,

    #[arg(long, value_enum, default_value = "per-channel")]
    equalize: Equalization,

    /// Integer downscale factor
    #[arg(long, default_value = "1")]
    resize: usize,

    /// none, flip-vertical or rotate90
    #[arg(long, default_value = "flip-vertical")]
    orientation: Orientation,
}

impl IspArgs {
    fn config(&self) -> IspConfig {
        let white_balance = if self.auto_wb {
            let mut auto = AutoWhiteBalance::default();
            if let Some(max_gain) = self.awb_max_gain {
                auto.max_gain = max_gain;
            }
            WhiteBalance::Auto(auto)
        } else if let Some(gains) = self.gains {
            WhiteBalance::Fixed(WhiteBalanceGains(gains))
        } else if let Some(neutral) = self.as_shot_neutral {
            WhiteBalance::Fixed(WhiteBalanceGains::from_as_shot_neutral(neutral))
        } else {
            IspConfig::default().white_balance
        };

        let equalization = match self.equalize {
            Equalization::None => None,
            Equalization::PerChannel => Some(EqualizationMode::PerChannel),
            Equalization::Luma => Some(EqualizationMode::Luma),
        };

        IspConfig::builder()
            .levels(self.black_level, self.white_level)
            .white_balance(white_balance)
            .gamma(self.gamma)
            .demosaic(self.demosaic)
            .color_matrix(self.color_matrix.unwrap_or_default())
            .equalization(equalization)
            .resize_factor(self.resize)
            .orientation(self.orientation)
            .build()
    }
}

#[derive(Args)]
struct ThresholdArgs {
    #[arg(long, value_name = "DB", default_value = "30")]
    min_psnr: f64,

    #[arg(long, value_name = "SSIM", default_value = "0.9")]
    min_ssim: f64,

    #[arg(long, value_name = "MSE")]
    max_mse: Option<f64>,

    #[arg(long, value_name = "LEVELS")]
    max_abs_diff: Option<u8>,
}

impl ThresholdArgs {
    fn thresholds(&self) -> MetricThresholds {
        MetricThresholds {
            max_mse: self.max_mse,
            min_psnr: Some(self.min_psnr),
            min_ssim: Some(self.min_ssim),
            max_abs_diff: self.max_abs_diff,
        }
    }
}

fn parse_triplet(s: &str) -> Result<[f32; 3], String> {
    let values: Vec<f32> = s
        .split(',')
        .map(|v| v.trim().parse::<f32>().map_err(|e| format!("'{v}': {e}")))
        .collect::<Result<_, _>>()?;
    <[f32; 3]>::try_from(values).map_err(|v| format!("expected 3 values, got {}", v.len()))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init_with_default(&cli.log);

    match run(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(2)
        }
    }
}

/// `Ok(false)` when validation ran but did not pass.
fn run(command: Commands) -> anyhow::Result<bool> {
    match command {
        Commands::Process {
            input,
            output,
            format,
            tiff_compression,
            tiff_predictor,
            greyscale,
            preview,
            timings,
            frame,
            isp,
        } => {
            let geometry = frame.geometry();
            let config = isp.config();
            let format = format.unwrap_or_else(|| OutputFormat::from_path(&output));
            info!("Processing {} as {}x{} {} {}", input.display(), geometry.width, geometry.height, geometry.format, geometry.cfa);

            let isp = IspPipeline::new(config).context("invalid ISP configuration")?;
            let tiff = StandardTiffWriter::new(tiff_compression).with_predictor(tiff_predictor);
            let pipeline = RawToImagePipeline::with_custom(SensorDumpReader::new(geometry), format.writer(tiff), isp)
                .with_preview(preview)
                .with_greyscale(greyscale);

            let report = pipeline
                .convert_file(&input, &output)
                .with_context(|| format!("failed to convert {}", input.display()))?;

            if let Some(diagnostics) = &report.diagnostics {
                println!("{}", diagnostics.channel_sums);
            }
            for (name, stats) in ["red", "green", "blue"].iter().zip(report.channel_stats.iter()) {
                println!(
                    "{name:>5}: mean {:.1}, skewness {:.3}, p95 {}, range {}..{}",
                    stats.mean, stats.skewness, stats.percentile, stats.min, stats.max
                );
            }
            if timings {
                report.timings.print_summary();
            }
            info!("Wrote {}x{} {} to {}", report.width, report.height, format, output.display());
            Ok(true)
        }

        Commands::Validate {
            corpus,
            run,
            build,
            hardware_output,
            workdir,
            timeout,
            jobs,
            artifacts,
            thresholds,
            frame,
            isp,
        } => {
            let vectors = Corpus::discover(&corpus).with_context(|| format!("cannot read corpus {}", corpus.display()))?;
            if vectors.is_empty() {
                bail!("no *.raw vectors in {}", corpus.display());
            }

            let mut hardware = CommandHardwarePipeline::new(run);
            if let Some(build) = build {
                hardware = hardware.with_build_command(build);
            }
            if let Some(template) = hardware_output {
                hardware = hardware.with_output(template);
            }
            if let Some(dir) = workdir {
                hardware = hardware.with_working_dir(dir);
            }
            hardware = hardware.with_timeout(Duration::from_secs(timeout));

            let config = HarnessConfig::builder()
                .geometry(frame.geometry())
                .isp(isp.config())
                .thresholds(thresholds.thresholds())
                .jobs(jobs)
                .artifacts_dir(artifacts)
                .build();
            let harness = Harness::new(config, hardware).context("invalid harness configuration")?;

            let summary = harness.run(&vectors);
            println!("{summary}");
            Ok(summary.passed())
        }
    }
}
