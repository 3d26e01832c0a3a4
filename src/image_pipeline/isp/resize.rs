use crate::image_pipeline::common::error::{IspError, Result};
use crate::image_pipeline::common::types::Rgb8Image;

/// Area-averaging decimation by an integer `factor`.
///
/// Each output pixel is the rounded mean of a `factor` x `factor` block;
/// leftover rows and columns that do not fill a whole block are dropped.
pub fn downscale(image: &Rgb8Image, factor: usize) -> Result<Rgb8Image> {
    if factor == 0 {
        return Err(IspError::InvalidConfig("resize factor must be at least 1".into()));
    }
    if factor == 1 {
        return Ok(image.clone());
    }
    let (w, h) = image.dimensions();
    if factor > w || factor > h {
        return Err(IspError::InvalidConfig(format!(
            "resize factor {factor} exceeds image size {w}x{h}"
        )));
    }

    let (out_w, out_h) = (w / factor, h / factor);
    let area = (factor * factor) as u32;
    let mut out = Rgb8Image::new(out_w, out_h);
    for oy in 0..out_h {
        for ox in 0..out_w {
            let mut sum = [0u32; 3];
            for y in oy * factor..(oy + 1) * factor {
                for x in ox * factor..(ox + 1) * factor {
                    let px = image.pixel(y, x);
                    for c in 0..3 {
                        sum[c] += px[c] as u32;
                    }
                }
            }
            out.set_pixel(oy, ox, sum.map(|s| ((s + area / 2) / area) as u8));
        }
    }
    Ok(out)
}
