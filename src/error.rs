//! Error types for the HNSW index and its persistence layer.

use thiserror::Error;

/// Result type alias used throughout this crate.
pub type Result<T> = std::result::Result<T, HnswError>;

/// The four error kinds the core distinguishes, plus a passthrough for
/// ordinary I/O failures that don't fit one of the named categories.
#[derive(Error, Debug)]
pub enum HnswError {
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("corrupt persisted image: {reason}")]
    CorruptImage { reason: String },

    #[error("mmap {operation} failed: {source}")]
    MmapFailure {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("persisted image would exceed capacity: needed {needed} bytes, have {capacity}")]
    CapacityExceeded { needed: usize, capacity: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_mismatch_message() {
        let e = HnswError::DimensionMismatch { expected: 3, actual: 4 };
        assert_eq!(e.to_string(), "dimension mismatch: expected 3, got 4");
    }

    #[test]
    fn capacity_exceeded_message() {
        let e = HnswError::CapacityExceeded { needed: 10, capacity: 5 };
        assert!(e.to_string().contains("needed 10 bytes"));
    }
}
