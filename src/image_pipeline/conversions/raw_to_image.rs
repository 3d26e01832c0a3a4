use std::io::Write;
use std::path::Path;

use tracing::{info, info_span, instrument};

use crate::image_pipeline::common::error::{IspError, Result};
use crate::image_pipeline::common::timing::PipelineTimings;
use crate::image_pipeline::isp::color;
use crate::image_pipeline::isp::stats::{channel_stats, ChannelStats};
use crate::image_pipeline::isp::{Diagnostics, IspConfig, IspPipeline};
use crate::image_pipeline::output::{ImageWriter, PngWriter};
use crate::image_pipeline::raw::{FrameGeometry, RawFrameReader, SensorDumpReader};

/// What one conversion produced, besides the written file.
#[derive(Debug, Clone)]
pub struct ConversionReport {
    pub width: usize,
    pub height: usize,
    /// `None` for previews, which skip the ISP stages
    pub diagnostics: Option<Diagnostics>,
    /// Statistics of the written image, R, G, B
    pub channel_stats: [ChannelStats; 3],
    pub timings: PipelineTimings,
}

/// Rank reported as `ChannelStats::percentile`.
pub const REPORT_PERCENTILE: f32 = 0.95;

pub struct RawToImagePipeline<R: RawFrameReader, W: ImageWriter> {
    reader: R,
    writer: W,
    isp: IspPipeline,
    preview: bool,
    greyscale: bool,
}

impl RawToImagePipeline<SensorDumpReader, PngWriter> {
    pub fn new(geometry: FrameGeometry, config: IspConfig) -> Result<Self> {
        Ok(Self {
            reader: SensorDumpReader::new(geometry),
            writer: PngWriter,
            isp: IspPipeline::new(config)?,
            preview: false,
            greyscale: false,
        })
    }
}

impl<R: RawFrameReader, W: ImageWriter> RawToImagePipeline<R, W> {
    pub fn with_custom(reader: R, writer: W, isp: IspPipeline) -> Self {
        Self {
            reader,
            writer,
            isp,
            preview: false,
            greyscale: false,
        }
    }

    /// Renders the demosaiced mosaic instead of the full ISP output.
    pub fn with_preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    /// Writes luma replicated over the three channels.
    pub fn with_greyscale(mut self, greyscale: bool) -> Self {
        self.greyscale = greyscale;
        self
    }

    pub fn isp(&self) -> &IspPipeline {
        &self.isp
    }

    #[instrument(skip(self, input_data, output), fields(input_size = input_data.len(), preview = self.preview))]
    pub fn convert(&self, input_data: &[u8], output: &mut dyn Write) -> Result<ConversionReport> {
        info!("Starting RAW to RGB conversion");
        let mut timings = PipelineTimings::new();

        let grid = timings.measure("decode_raw", || {
            let _span = info_span!("decode_raw").entered();
            self.reader.read_raw(input_data)
        })?;

        let (mut image, diagnostics) = if self.preview {
            let image = timings.measure("preview", || self.isp.preview(&grid))?;
            (image, None)
        } else {
            let out = self.isp.process(&grid)?;
            for step in out.timings.steps() {
                timings.add_step(step.name.clone(), step.duration);
            }
            (out.image, Some(out.diagnostics))
        };

        if self.greyscale {
            image = timings.measure("greyscale", || color::to_greyscale(&image));
        }

        timings.measure("encode", || {
            let _span = info_span!("encode_image").entered();
            self.writer.write_rgb8(&image, output)
        })?;

        info!(width = image.width, height = image.height, "Conversion complete");
        Ok(ConversionReport {
            width: image.width,
            height: image.height,
            diagnostics,
            channel_stats: channel_stats(&image, REPORT_PERCENTILE),
            timings,
        })
    }

    #[instrument(skip(self, input_path, output_path))]
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
    ) -> Result<ConversionReport> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        info!(
            input = %input_path.display(),
            output = %output_path.display(),
            "Converting file"
        );

        let input_data = {
            let _span = info_span!("read_input_file").entered();
            std::fs::read(input_path).map_err(|e| IspError::InputRead {
                path: input_path.to_path_buf(),
                reason: e.to_string(),
            })?
        };

        let mut output_file = {
            let _span = info_span!("create_output_file").entered();
            std::fs::File::create(output_path).map_err(|e| IspError::OutputWrite {
                path: output_path.to_path_buf(),
                reason: e.to_string(),
            })?
        };

        self.convert(&input_data, &mut output_file)
    }
}
