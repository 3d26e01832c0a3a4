//! Image processing pipeline module
//!
//! Raw sensor decoding, the reference ISP chain, RGB8 output containers,
//! file conversion orchestration and the hardware cross-validation harness.

pub mod common;
pub mod conversions;
pub mod harness;
pub mod isp;
pub mod output;
pub mod raw;

pub use common::{
    FormatError,
    IspError,
    PipelineTimings,
    Result,
    Rgb8Image,
    RgbImage,
};

pub use raw::{
    BayerGrid,
    CfaPattern,
    FrameGeometry,
    LowBitOrder,
    PixelFormat,
    RawDecoder,
    RawFrame,
    RawFrameReader,
    SensorDumpReader,
};

pub use isp::{
    DemosaicAlgorithm,
    DemosaicStrategy,
    IspConfig,
    IspConfigBuilder,
    IspOutput,
    IspPipeline,
};

pub use output::{
    ImageWriter,
    OutputFormat,
    PngWriter,
    StandardTiffWriter,
    TiffCompression,
};

pub use conversions::{
    ConversionReport,
    RawToImagePipeline,
};

pub use harness::{
    CommandHardwarePipeline,
    Corpus,
    HardwarePipeline,
    Harness,
    HarnessConfig,
    MetricThresholds,
    RunSummary,
};
