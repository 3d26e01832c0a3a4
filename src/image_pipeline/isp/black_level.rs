use crate::image_pipeline::raw::{BayerGrid, BayerPlane};

/// Full scale of the normalized working space.
pub const WORKING_MAX: f32 = 1.0;

/// Maps `black` to 0 and `white` to [`WORKING_MAX`], clamping anything outside.
///
/// `out = clamp((in - black) / (white - black) * MAX, 0, MAX)`
pub fn normalize(grid: &BayerGrid, black: f32, white: f32) -> BayerPlane {
    let range = white - black;
    let samples = grid
        .samples
        .iter()
        .map(|&s| ((s as f32 - black) / range * WORKING_MAX).clamp(0.0, WORKING_MAX))
        .collect();
    BayerPlane {
        width: grid.width,
        height: grid.height,
        samples,
        cfa: grid.cfa,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::raw::CfaPattern;

    fn grid(samples: Vec<u16>, bit_depth: u32) -> BayerGrid {
        BayerGrid {
            width: samples.len(),
            height: 1,
            samples,
            bit_depth,
            cfa: CfaPattern::rggb(),
        }
    }

    #[test]
    fn maps_levels_linearly() {
        let plane = normalize(&grid(vec![15, 254, 134], 8), 15.0, 254.0);
        assert_eq!(plane.samples[0], 0.0);
        assert_eq!(plane.samples[1], 1.0);
        assert!((plane.samples[2] - 119.0 / 239.0).abs() < 1e-6);
    }

    #[test]
    fn clamps_outside_range() {
        let plane = normalize(&grid(vec![0, 10, 255, 1023], 10), 64.0, 1000.0);
        assert_eq!(plane.samples, vec![0.0, 0.0, (255.0 - 64.0) / 936.0, 1.0]);
    }
}
