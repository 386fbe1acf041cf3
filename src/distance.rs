//! Euclidean distance — the only metric this index supports.
//!
//! The square root is retained rather than optimized away: layer search
//! compares thresholds against these values directly, and dropping the
//! root would change the numeric values callers and tests observe even
//! though it would preserve ordering.

use crate::error::{HnswError, Result};
use crate::vector::Vector;

/// Euclidean (L2) distance between two vectors of equal dimension.
pub fn euclidean_distance(a: &Vector, b: &Vector) -> Result<f32> {
    if !a.has_same_dimension(b) {
        return Err(HnswError::DimensionMismatch {
            expected: a.dimension(),
            actual: b.dimension(),
        });
    }

    Ok(a.as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f32>()
        .sqrt())
}
