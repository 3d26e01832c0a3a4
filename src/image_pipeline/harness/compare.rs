use tracing::debug;

use crate::image_pipeline::common::error::{IspError, Result};
use crate::image_pipeline::common::types::Rgb8Image;
use crate::image_pipeline::harness::metrics;
use crate::image_pipeline::harness::record::MetricRecord;
use crate::image_pipeline::harness::thresholds::MetricThresholds;

/// Scores `candidate` against `reference` and checks the result.
///
/// Different sizes are reported as [`IspError::DimensionMismatch`] before any
/// metric is computed. Out-of-bound metrics give
/// [`IspError::MetricThresholdViolation`] carrying the full record.
pub fn compare(
    vector: &str,
    reference: &Rgb8Image,
    candidate: &Rgb8Image,
    thresholds: &MetricThresholds,
) -> Result<MetricRecord> {
    if reference.dimensions() != candidate.dimensions() {
        return Err(IspError::DimensionMismatch {
            vector: vector.to_string(),
            reference: reference.dimensions(),
            candidate: candidate.dimensions(),
        });
    }

    let record = MetricRecord {
        vector: vector.to_string(),
        width: reference.width,
        height: reference.height,
        scores: metrics::score(reference, candidate),
    };
    debug!(vector, scores = ?record.scores, "Compared images");

    let violations = thresholds.check(&record.scores);
    if violations.is_empty() {
        Ok(record)
    } else {
        Err(IspError::MetricThresholdViolation {
            vector: vector.to_string(),
            record: Box::new(record),
            violations,
        })
    }
}
