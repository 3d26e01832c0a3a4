//! Full-reference image quality metrics over RGB8 images
//!
//! Callers are expected to check dimensions first; every function here
//! assumes both images have the same size.

use crate::image_pipeline::common::types::Rgb8Image;
use crate::image_pipeline::harness::record::MetricScores;

const MAX_LEVEL: f64 = 255.0;
const SSIM_WINDOW: usize = 8;
const SSIM_C1: f64 = (0.01 * MAX_LEVEL) * (0.01 * MAX_LEVEL);
const SSIM_C2: f64 = (0.03 * MAX_LEVEL) * (0.03 * MAX_LEVEL);

pub fn mse(a: &Rgb8Image, b: &Rgb8Image) -> f64 {
    if a.data.is_empty() {
        return 0.0;
    }
    let sum: f64 = a
        .data
        .iter()
        .zip(&b.data)
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum();
    sum / a.data.len() as f64
}

/// `10 * log10(255^2 / mse)`, infinite when the images are identical.
pub fn psnr_from_mse(mse: f64) -> f64 {
    if mse == 0.0 {
        f64::INFINITY
    } else {
        10.0 * (MAX_LEVEL * MAX_LEVEL / mse).log10()
    }
}

pub fn psnr(a: &Rgb8Image, b: &Rgb8Image) -> f64 {
    psnr_from_mse(mse(a, b))
}

pub fn max_abs_diff(a: &Rgb8Image, b: &Rgb8Image) -> u8 {
    a.data
        .iter()
        .zip(&b.data)
        .map(|(&x, &y)| x.abs_diff(y))
        .max()
        .unwrap_or(0)
}

/// Mean SSIM over non-overlapping 8x8 windows and the three channels.
///
/// Windows at the right and bottom borders are truncated rather than
/// dropped, so images smaller than a window still get a score.
pub fn ssim(a: &Rgb8Image, b: &Rgb8Image) -> f64 {
    let (w, h) = a.dimensions();
    if w == 0 || h == 0 {
        return 1.0;
    }

    let mut total = 0.0;
    let mut windows = 0usize;
    for c in 0..3 {
        for y0 in (0..h).step_by(SSIM_WINDOW) {
            for x0 in (0..w).step_by(SSIM_WINDOW) {
                let y1 = (y0 + SSIM_WINDOW).min(h);
                let x1 = (x0 + SSIM_WINDOW).min(w);
                total += window_ssim(a, b, c, (y0, y1), (x0, x1));
                windows += 1;
            }
        }
    }
    total / windows as f64
}

fn window_ssim(a: &Rgb8Image, b: &Rgb8Image, c: usize, rows: (usize, usize), cols: (usize, usize)) -> f64 {
    let sample = |img: &Rgb8Image, y: usize, x: usize| img.data[(y * img.width + x) * 3 + c] as f64;
    let n = ((rows.1 - rows.0) * (cols.1 - cols.0)) as f64;

    let (mut sum_a, mut sum_b) = (0.0, 0.0);
    for y in rows.0..rows.1 {
        for x in cols.0..cols.1 {
            sum_a += sample(a, y, x);
            sum_b += sample(b, y, x);
        }
    }
    let (mean_a, mean_b) = (sum_a / n, sum_b / n);

    let (mut var_a, mut var_b, mut cov) = (0.0, 0.0, 0.0);
    for y in rows.0..rows.1 {
        for x in cols.0..cols.1 {
            let da = sample(a, y, x) - mean_a;
            let db = sample(b, y, x) - mean_b;
            var_a += da * da;
            var_b += db * db;
            cov += da * db;
        }
    }
    let (var_a, var_b, cov) = (var_a / n, var_b / n, cov / n);

    ((2.0 * mean_a * mean_b + SSIM_C1) * (2.0 * cov + SSIM_C2))
        / ((mean_a * mean_a + mean_b * mean_b + SSIM_C1) * (var_a + var_b + SSIM_C2))
}

/// All metrics of a same-sized pair.
pub fn score(a: &Rgb8Image, b: &Rgb8Image) -> MetricScores {
    let mse = mse(a, b);
    MetricScores {
        mse,
        psnr: psnr_from_mse(mse),
        ssim: ssim(a, b),
        max_abs_diff: max_abs_diff(a, b),
    }
}
