//! The HNSW graph index: insertion, search, and their supporting queue types.

pub mod graph;
pub mod neighbor_queue;

pub use graph::Graph;
