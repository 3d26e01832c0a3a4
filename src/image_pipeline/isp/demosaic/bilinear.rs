use rayon::prelude::*;

use super::DemosaicStrategy;
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::common::types::RgbImage;
use crate::image_pipeline::raw::BayerPlane;

/// Averages the same-color sites of the 3x3 neighborhood for each missing
/// channel. Cheap, but smears across edges.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bilinear;

impl DemosaicStrategy for Bilinear {
    fn name(&self) -> &'static str {
        "bilinear"
    }

    fn demosaic(&self, plane: &BayerPlane) -> Result<RgbImage<f32>> {
        let (w, h) = (plane.width, plane.height);
        let mut out = RgbImage::new(w, h);
        out.data
            .par_chunks_mut(w * 3)
            .enumerate()
            .for_each(|(y, row)| {
                for x in 0..w {
                    let mut sum = [0.0f32; 3];
                    let mut count = [0u32; 3];
                    for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
                        for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                            let c = plane.channel_at(ny, nx) as usize;
                            sum[c] += plane.get(ny, nx);
                            count[c] += 1;
                        }
                    }
                    let px = &mut row[x * 3..x * 3 + 3];
                    for c in 0..3 {
                        px[c] = if count[c] > 0 { sum[c] / count[c] as f32 } else { 0.0 };
                    }
                    px[plane.channel_at(y, x) as usize] = plane.get(y, x);
                }
            });
        Ok(out)
    }
}
