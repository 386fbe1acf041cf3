//! # HNSW mmap index
//!
//! A Hierarchical Navigable Small World approximate-nearest-neighbor index
//! with memory-mapped persistence.
//!
//! This library provides:
//! - A dense vector type and Euclidean distance
//! - An in-memory HNSW graph (insertion, kNN search)
//! - A fixed-layout mmap-backed persistence format for the graph
//!
//! ## Example
//!
//! ```rust
//! use hnsw_mmap_index::config::GraphParams;
//! use hnsw_mmap_index::hnsw::Graph;
//! use hnsw_mmap_index::vector::Vector;
//!
//! let mut graph = Graph::new(GraphParams::default());
//! graph.insert(1, Vector::new(vec![1.0, 2.0, 3.0])).unwrap();
//!
//! let query = Vector::new(vec![1.0, 2.0, 3.0]);
//! let results = graph.knn_search(&query, 1).unwrap();
//! assert_eq!(results[0].0, 1);
//! ```

pub mod config;
pub mod distance;
pub mod error;
pub mod hnsw;
pub mod persistence;
pub mod vector;

pub use config::GraphParams;
pub use error::{HnswError, Result};
pub use hnsw::Graph;
pub use vector::Vector;
