//! Construction parameters for the HNSW graph.

use serde::{Deserialize, Serialize};

/// Reference PRNG seed. Level selection and any tie-dependent behavior are
/// driven from this seed by default so that a given insertion sequence
/// produces a reproducible graph (spec §4.2, §5).
pub const DEFAULT_SEED: u64 = 1000;

/// Per-level neighbor cap after pruning, for levels 0..4. Any level above
/// index 4 reuses the last entry.
const REFERENCE_MAX_M: [usize; 5] = [32, 16, 16, 12, 8];

/// Immutable construction parameters for a [`crate::Graph`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphParams {
    /// Highest level index the graph is willing to use during search
    /// descent. This is an initial ceiling, not an absolute one: a drawn
    /// level above `max_level` promotes the entry point and grows it.
    pub max_level: usize,
    /// Candidate-list width used during insertion's layer search.
    pub ef: usize,
    /// Level-generation scale factor (`m_L` in the literature).
    pub m_l: f64,
}

impl GraphParams {
    pub fn new(max_level: usize, ef: usize, m_l: f64) -> Self {
        Self { max_level, ef, m_l }
    }

    /// The neighbor cap kept after pruning at the given level.
    pub(crate) fn max_m(level: usize) -> usize {
        REFERENCE_MAX_M[level.min(REFERENCE_MAX_M.len() - 1)]
    }
}

impl Default for GraphParams {
    fn default() -> Self {
        Self {
            max_level: 4,
            ef: 32,
            m_l: 0.33,
        }
    }
}
