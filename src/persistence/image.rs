//! Binary encode/decode of a [`Graph`] into the fixed-layout mmap image.
//!
//! Layout (native-endian, two passes over the same deterministic node
//! order):
//!
//! ```text
//! u64  num_nodes
//! repeat num_nodes:
//!     i32  id
//!     i32  level
//!     u64  vec_size
//!     f32  vec[vec_size]
//! repeat num_nodes (same order):
//!     for layer in 0..=level:
//!         u64  num_neighbors
//!         i32  neighbor_id[num_neighbors]
//! ```

use crate::config::GraphParams;
use crate::error::{HnswError, Result};
use crate::hnsw::Graph;
use crate::vector::Vector;

fn need(buf: &[u8], offset: usize, len: usize) -> Result<()> {
    if offset + len > buf.len() {
        return Err(HnswError::CorruptImage {
            reason: format!("read of {len} bytes at offset {offset} overruns {}-byte region", buf.len()),
        });
    }
    Ok(())
}

fn write_u64(buf: &mut [u8], offset: &mut usize, capacity: usize, v: u64) -> Result<()> {
    write_bytes(buf, offset, capacity, &v.to_ne_bytes())
}

fn write_i32(buf: &mut [u8], offset: &mut usize, capacity: usize, v: i32) -> Result<()> {
    write_bytes(buf, offset, capacity, &v.to_ne_bytes())
}

fn write_f32(buf: &mut [u8], offset: &mut usize, capacity: usize, v: f32) -> Result<()> {
    write_bytes(buf, offset, capacity, &v.to_ne_bytes())
}

fn write_bytes(buf: &mut [u8], offset: &mut usize, capacity: usize, bytes: &[u8]) -> Result<()> {
    let needed = *offset + bytes.len();
    if needed > capacity {
        return Err(HnswError::CapacityExceeded { needed, capacity });
    }
    buf[*offset..*offset + bytes.len()].copy_from_slice(bytes);
    *offset += bytes.len();
    Ok(())
}

fn read_u64(buf: &[u8], offset: &mut usize) -> Result<u64> {
    need(buf, *offset, 8)?;
    let v = u64::from_ne_bytes(buf[*offset..*offset + 8].try_into().unwrap());
    *offset += 8;
    Ok(v)
}

fn read_i32(buf: &[u8], offset: &mut usize) -> Result<i32> {
    need(buf, *offset, 4)?;
    let v = i32::from_ne_bytes(buf[*offset..*offset + 4].try_into().unwrap());
    *offset += 4;
    Ok(v)
}

fn read_f32(buf: &[u8], offset: &mut usize) -> Result<f32> {
    need(buf, *offset, 4)?;
    let v = f32::from_ne_bytes(buf[*offset..*offset + 4].try_into().unwrap());
    *offset += 4;
    Ok(v)
}

/// Serialize `graph` into `buf`, starting at offset 0. `capacity` is the
/// total mapped region size; writes past it fail with `CapacityExceeded`.
pub fn write_graph(graph: &Graph, buf: &mut [u8], capacity: usize) -> Result<()> {
    let mut offset = 0usize;

    let nodes: Vec<_> = graph.iter_nodes().collect();
    write_u64(buf, &mut offset, capacity, nodes.len() as u64)?;

    for node in &nodes {
        write_i32(buf, &mut offset, capacity, node.id)?;
        write_i32(buf, &mut offset, capacity, node.level as i32)?;
        write_u64(buf, &mut offset, capacity, node.vector.dimension() as u64)?;
        for &component in node.vector.as_slice() {
            write_f32(buf, &mut offset, capacity, component)?;
        }
    }

    for node in &nodes {
        for layer in 0..=node.level {
            let neighbors = node.neighbors.get(layer).map(|v| v.as_slice()).unwrap_or(&[]);
            write_u64(buf, &mut offset, capacity, neighbors.len() as u64)?;
            for &slot in neighbors {
                // neighbors are stored as slots; slot indices match position
                // in `nodes` since that Vec is pushed in slot order.
                let neighbor_id = nodes[slot as usize].id;
                write_i32(buf, &mut offset, capacity, neighbor_id)?;
            }
        }
    }

    Ok(())
}

/// Rebuild a fresh [`Graph`] from a previously-written image.
///
/// Pass 1 reinserts each node through the real [`Graph::insert`] path,
/// which draws its own fresh random level and descends/links against the
/// graph as it is rebuilt — the same double bookkeeping the reference
/// reader performs. Pass 2 then overwrites whatever adjacency pass 1
/// produced with the adjacency recorded in the image, resolving neighbor
/// ids against nodes registered in pass 1; unresolved ids are silently
/// dropped, matching the reference reader.
pub fn read_graph(buf: &[u8], params: GraphParams, seed: u64) -> Result<Graph> {
    let mut offset = 0usize;
    let mut graph = Graph::with_seed(params, seed);

    let num_nodes = read_u64(buf, &mut offset)? as usize;

    struct PendingNode {
        level: usize,
        slot: u32,
    }
    let mut pending: Vec<PendingNode> = Vec::with_capacity(num_nodes);

    for _ in 0..num_nodes {
        let id = read_i32(buf, &mut offset)?;
        let level = read_i32(buf, &mut offset)?.max(0) as usize;
        let vec_size = read_u64(buf, &mut offset)? as usize;

        let mut components = Vec::with_capacity(vec_size);
        for _ in 0..vec_size {
            components.push(read_f32(buf, &mut offset)?);
        }

        let vector = Vector::new(components);
        graph.insert(id, vector)?;
        let slot = graph.slot_for_id(id).expect("just inserted");
        pending.push(PendingNode { level, slot });
    }

    for node in &pending {
        for layer in 0..=node.level {
            let num_neighbors = read_u64(buf, &mut offset)? as usize;
            let mut neighbor_ids = Vec::with_capacity(num_neighbors);
            for _ in 0..num_neighbors {
                neighbor_ids.push(read_i32(buf, &mut offset)?);
            }
            graph.set_neighbors_at_layer(node.slot, layer, neighbor_ids);
        }
    }

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphParams;

    fn params() -> GraphParams {
        GraphParams::new(4, 32, 0.33)
    }

    #[test]
    fn round_trip_preserves_ids_and_vectors() {
        let mut graph = Graph::with_seed(params(), 1000);
        for i in 0..20 {
            graph.insert(i, Vector::new(vec![i as f32, (i * 2) as f32])).unwrap();
        }

        let mut buf = vec![0u8; 1024 * 1024];
        write_graph(&graph, &mut buf, buf.len()).unwrap();

        let reloaded = read_graph(&buf, params(), 1000).unwrap();
        assert_eq!(reloaded.len(), graph.len());
        for i in 0..20 {
            assert!(reloaded.contains_id(i));
            assert_eq!(
                reloaded.vector_of(i).unwrap().as_slice(),
                graph.vector_of(i).unwrap().as_slice()
            );
        }
    }

    #[test]
    fn overrunning_capacity_fails_with_capacity_exceeded() {
        let mut graph = Graph::with_seed(params(), 1000);
        for i in 0..50 {
            graph.insert(i, Vector::new(vec![i as f32; 32])).unwrap();
        }
        let mut buf = vec![0u8; 64];
        let err = write_graph(&graph, &mut buf, buf.len()).unwrap_err();
        assert!(matches!(err, HnswError::CapacityExceeded { .. }));
    }

    #[test]
    fn truncated_image_fails_with_corrupt_image() {
        let buf = 5u64.to_ne_bytes();
        let err = read_graph(&buf, params(), 1000).unwrap_err();
        assert!(matches!(err, HnswError::CorruptImage { .. }));
    }
}
