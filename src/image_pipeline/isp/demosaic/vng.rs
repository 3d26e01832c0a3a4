use rayon::prelude::*;

use super::{sample_clamped, DemosaicStrategy};
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::common::types::RgbImage;
use crate::image_pipeline::raw::{BayerPlane, Channel};

/// Variable Number of Gradients demosaicing.
///
/// Green is estimated first at red/blue sites: eight directional gradients
/// are measured over a 5x5 window, directions whose gradient stays within
/// 1.5x of the smallest one are kept, and their Laplacian-corrected green
/// estimates are averaged. Red and blue are then rebuilt from the color
/// differences (value - green) of the nearest sites that sampled them,
/// keeping only the neighbours whose gradient toward the site passes the
/// same threshold.
#[derive(Debug, Clone, Copy, Default)]
pub struct Vng;

const THRESHOLD_SCALE: f32 = 1.5;

impl DemosaicStrategy for Vng {
    fn name(&self) -> &'static str {
        "vng"
    }

    fn demosaic(&self, plane: &BayerPlane) -> Result<RgbImage<f32>> {
        let (w, h) = (plane.width, plane.height);

        let mut green = vec![0.0f32; w * h];
        green
            .par_chunks_mut(w)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, g) in row.iter_mut().enumerate() {
                    *g = interpolate_green(plane, y, x);
                }
            });

        let mut out = RgbImage::new(w, h);
        out.data
            .par_chunks_mut(w * 3)
            .enumerate()
            .for_each(|(y, row)| {
                for x in 0..w {
                    let rgb = interpolate_rb(plane, &green, y, x);
                    row[x * 3..x * 3 + 3].copy_from_slice(&rgb);
                }
            });
        Ok(out)
    }
}

fn interpolate_green(plane: &BayerPlane, y: usize, x: usize) -> f32 {
    let center = plane.get(y, x);
    if plane.channel_at(y, x) == Channel::Green {
        return center;
    }
    let get = |dy: isize, dx: isize| sample_clamped(plane, y, x, dy, dx);

    let (n1, n2, s1, s2) = (get(-1, 0), get(-2, 0), get(1, 0), get(2, 0));
    let (e1, e2, w1, w2) = (get(0, 1), get(0, 2), get(0, -1), get(0, -2));
    let (ne1, ne2, nw1, nw2) = (get(-1, 1), get(-2, 2), get(-1, -1), get(-2, -2));
    let (se1, se2, sw1, sw2) = (get(1, 1), get(2, 2), get(1, -1), get(2, -2));

    // N, NE, E, SE, S, SW, W, NW
    let grad = [
        (n2 - center).abs() + (n1 - s1).abs() + (nw1 - sw1).abs(),
        (ne2 - center).abs() + (ne1 - sw1).abs(),
        (e2 - center).abs() + (e1 - w1).abs() + (ne1 - nw1).abs(),
        (se2 - center).abs() + (se1 - nw1).abs(),
        (s2 - center).abs() + (s1 - n1).abs() + (se1 - ne1).abs(),
        (sw2 - center).abs() + (sw1 - ne1).abs(),
        (w2 - center).abs() + (w1 - e1).abs() + (sw1 - se1).abs(),
        (nw2 - center).abs() + (nw1 - se1).abs(),
    ];
    let estimate = [
        n1 + (center - n2) * 0.5,
        (n1 + e1) * 0.5 + (2.0 * center - n2 - e2) * 0.25,
        e1 + (center - e2) * 0.5,
        (s1 + e1) * 0.5 + (2.0 * center - s2 - e2) * 0.25,
        s1 + (center - s2) * 0.5,
        (s1 + w1) * 0.5 + (2.0 * center - s2 - w2) * 0.25,
        w1 + (center - w2) * 0.5,
        (n1 + w1) * 0.5 + (2.0 * center - n2 - w2) * 0.25,
    ];

    let threshold = grad.iter().copied().fold(f32::INFINITY, f32::min) * THRESHOLD_SCALE;
    let (sum, count) = grad
        .iter()
        .zip(estimate.iter())
        .filter(|(g, _)| **g <= threshold)
        .fold((0.0f32, 0u32), |(s, c), (_, e)| (s + e, c + 1));

    if count > 0 {
        sum / count as f32
    } else {
        estimate.iter().sum::<f32>() * 0.125
    }
}

fn interpolate_rb(plane: &BayerPlane, green: &[f32], y: usize, x: usize) -> [f32; 3] {
    let g = green[y * plane.width + x];
    let mut rgb = [0.0f32; 3];
    rgb[Channel::Green as usize] = g;

    let ch = plane.channel_at(y, x);
    match ch {
        Channel::Green => {
            let horizontal = plane.channel_at(y, x ^ 1);
            let vertical = if horizontal == Channel::Red { Channel::Blue } else { Channel::Red };
            rgb[horizontal as usize] = g + color_difference(plane, green, y, x, &[(0, -1), (0, 1)], horizontal);
            rgb[vertical as usize] = g + color_difference(plane, green, y, x, &[(-1, 0), (1, 0)], vertical);
        }
        Channel::Red | Channel::Blue => {
            let target = if ch == Channel::Red { Channel::Blue } else { Channel::Red };
            let diagonals: [(isize, isize); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
            rgb[target as usize] = g + color_difference(plane, green, y, x, &diagonals, target);
        }
    }

    // The sampled channel is written last so it is never an estimate.
    rgb[ch as usize] = plane.get(y, x);
    rgb
}

/// Mean `target - green` difference over the neighbours at `offsets` whose
/// gradient stays within the threshold of the smallest one.
///
/// A neighbour's gradient is the green step toward it plus the step between
/// the site and the next same-color site in that direction.
fn color_difference(
    plane: &BayerPlane,
    green: &[f32],
    y: usize,
    x: usize,
    offsets: &[(isize, isize)],
    target: Channel,
) -> f32 {
    let w = plane.width;
    let clamp = |v: usize, d: isize, len: usize| (v as isize + d).clamp(0, len as isize - 1) as usize;
    let center = plane.get(y, x);
    let g = green[y * w + x];

    let candidate = |&(dy, dx): &(isize, isize)| {
        let (ny, nx) = (clamp(y, dy, plane.height), clamp(x, dx, w));
        if plane.channel_at(ny, nx) != target {
            return None;
        }
        let gradient =
            (green[ny * w + nx] - g).abs() + (sample_clamped(plane, y, x, 2 * dy, 2 * dx) - center).abs();
        Some((gradient, plane.get(ny, nx) - green[ny * w + nx]))
    };

    let min = offsets.iter().filter_map(candidate).map(|c| c.0).fold(f32::INFINITY, f32::min);
    if !min.is_finite() {
        return 0.0;
    }

    let threshold = min * THRESHOLD_SCALE;
    let (sum, count) = offsets
        .iter()
        .filter_map(candidate)
        .filter(|(gradient, _)| *gradient <= threshold)
        .fold((0.0f32, 0u32), |(s, c), (_, d)| (s + d, c + 1));
    sum / count as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::isp::demosaic::tests::mosaic;
    use crate::image_pipeline::raw::CfaPattern;

    #[test]
    fn follows_vertical_edge_instead_of_blurring_across() {
        // Left half dark, right half bright; a red site on the dark side of
        // the edge should get its green from the dark side.
        let plane = mosaic(12, 12, CfaPattern::rggb(), |_, x, _| if x < 6 { 0.1 } else { 0.9 });
        let rgb = Vng.demosaic(&plane).unwrap();
        let dark_red_site = rgb.pixel(4, 4);
        assert!((dark_red_site[1] - 0.1).abs() < 1e-6, "green = {}", dark_red_site[1]);
    }

    #[test]
    fn red_at_blue_site_comes_from_its_own_side_of_an_edge() {
        // Dark grey on the left, a bright reddish area on the right.
        let plane = mosaic(12, 12, CfaPattern::rggb(), |_, x, ch| match (x < 6, ch) {
            (true, _) => 0.2,
            (false, Channel::Red) => 0.9,
            (false, _) => 0.6,
        });
        let rgb = Vng.demosaic(&plane).unwrap();
        let blue_site = rgb.pixel(5, 5);
        assert!((blue_site[0] - 0.2).abs() < 1e-6, "red = {}", blue_site[0]);
        assert!((blue_site[1] - 0.2).abs() < 1e-6, "green = {}", blue_site[1]);
        assert_eq!(blue_site[2], 0.2);
    }

    #[test]
    fn single_row_frame_does_not_panic() {
        let plane = mosaic(6, 1, CfaPattern::grbg(), |_, x, _| x as f32 / 6.0);
        let rgb = Vng.demosaic(&plane).unwrap();
        assert_eq!(rgb.dimensions(), (6, 1));
    }
}
