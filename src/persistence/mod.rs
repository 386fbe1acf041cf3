//! Persisting a [`crate::hnsw::Graph`] to a fixed-size memory-mapped file.

pub mod image;
pub mod mmap_store;

use crate::config::GraphParams;
use crate::error::Result;
use crate::hnsw::Graph;
use mmap_store::MmapStore;

/// Serialize `graph` into the mmap-backed file under `dir` and flush it.
pub fn write_to_mmap(graph: &Graph, dir: impl AsRef<std::path::Path>) -> Result<()> {
    let mut store = MmapStore::setup(dir)?;
    let capacity = store.as_slice().len();
    image::write_graph(graph, store.as_mut_slice(), capacity)?;
    store.flush()
}

/// Rebuild a graph from the mmap-backed file under `dir`. If the file is
/// freshly created (all zero), this returns an empty graph.
pub fn read_from_mmap(dir: impl AsRef<std::path::Path>, params: GraphParams, seed: u64) -> Result<Graph> {
    let store = MmapStore::setup(dir)?;
    image::read_graph(store.as_slice(), params, seed)
}
