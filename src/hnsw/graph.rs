//! The HNSW graph itself: layered proximity graph, insertion, and kNN search.

use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::GraphParams;
use crate::distance::euclidean_distance;
use crate::error::Result;
use crate::hnsw::neighbor_queue::{MaxHeap, MinHeap, Neighbor};
use crate::vector::Vector;

/// A single node's data: its stored vector, external id, top level, and its
/// adjacency list per layer (`neighbors[layer]` holds slot indices).
#[derive(Debug, Clone)]
pub struct NodeData {
    pub id: i32,
    pub level: usize,
    pub vector: Vector,
    pub neighbors: Vec<Vec<u32>>,
}

/// The HNSW graph. Nodes live in a flat arena (`nodes`) addressed by stable
/// `u32` slot; `id_to_slot` maps the caller-facing `i32` id to that slot so
/// the adjacency lists never need to hold `Option` or be reshuffled when
/// nodes are added.
pub struct Graph {
    nodes: Vec<NodeData>,
    id_to_slot: HashMap<i32, u32>,
    entry_point: Option<u32>,
    max_level: usize,
    ef: usize,
    m_l: f64,
    rng: StdRng,
}

impl Graph {
    pub fn new(params: GraphParams) -> Self {
        Self::with_seed(params, crate::config::DEFAULT_SEED)
    }

    pub fn with_seed(params: GraphParams, seed: u64) -> Self {
        Self {
            nodes: Vec::new(),
            id_to_slot: HashMap::new(),
            entry_point: None,
            max_level: params.max_level,
            ef: params.ef,
            m_l: params.m_l,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn max_level(&self) -> usize {
        self.max_level
    }

    pub fn contains_id(&self, id: i32) -> bool {
        self.id_to_slot.contains_key(&id)
    }

    /// The stored vector for `id`, if it's in the graph.
    pub fn vector_of(&self, id: i32) -> Option<&Vector> {
        self.slot_of(id).map(|slot| &self.node(slot).vector)
    }

    /// Draw a random level via an exponential decay distribution scaled by
    /// `m_l`, matching the reference generator (`-ln(uniform) * m_l`).
    fn random_level(&mut self) -> usize {
        let r: f64 = self.rng.gen();
        (-r.ln() * self.m_l).floor() as usize
    }

    fn slot_of(&self, id: i32) -> Option<u32> {
        self.id_to_slot.get(&id).copied()
    }

    fn node(&self, slot: u32) -> &NodeData {
        &self.nodes[slot as usize]
    }

    fn node_mut(&mut self, slot: u32) -> &mut NodeData {
        &mut self.nodes[slot as usize]
    }

    fn distance_to_slot(&self, query: &Vector, slot: u32) -> Result<f32> {
        euclidean_distance(query, &self.node(slot).vector)
    }

    /// Greedy descent from `entry` down to (but not including) `target_layer`,
    /// keeping only the single nearest node found at each layer.
    fn greedy_descend(&self, query: &Vector, entry: u32, from_layer: usize, target_layer: usize) -> Result<u32> {
        let mut current = entry;
        let mut current_dist = self.distance_to_slot(query, current)?;

        for layer in (target_layer + 1..=from_layer).rev() {
            loop {
                let mut improved = false;
                let neighbors = self.node(current).neighbors.get(layer).cloned().unwrap_or_default();
                for n in neighbors {
                    let d = self.distance_to_slot(query, n)?;
                    if d < current_dist {
                        current = n;
                        current_dist = d;
                        improved = true;
                    }
                }
                if !improved {
                    break;
                }
            }
        }
        Ok(current)
    }

    /// Bounded best-first search of a single layer, starting from the full
    /// set `entries` (all of them seed both the candidate and result
    /// queues, per the layer-search definition over a set `ep`). Returns
    /// up to `ef` nearest nodes found, nearest first.
    fn search_layer(&self, query: &Vector, entries: &[u32], layer: usize, ef: usize) -> Result<Vec<Neighbor>> {
        let mut visited: HashSet<u32> = HashSet::new();
        let mut candidates = MinHeap::new();
        let mut results = MaxHeap::new();

        for &e in entries {
            if !visited.insert(e) {
                continue;
            }
            let d = self.distance_to_slot(query, e)?;
            candidates.push(Neighbor::new(e, d));
            results.push_bounded(Neighbor::new(e, d), ef);
        }

        while let Some(closest) = candidates.pop() {
            if let Some(farthest) = results.peek() {
                if closest.distance > farthest.distance {
                    break;
                }
            }

            let neighbors = self.node(closest.id).neighbors.get(layer).cloned().unwrap_or_default();
            for n in neighbors {
                if !visited.insert(n) {
                    continue;
                }
                let d = self.distance_to_slot(query, n)?;
                let should_add = results.len() < ef || results.peek().map(|f| d < f.distance).unwrap_or(true);
                if should_add {
                    candidates.push(Neighbor::new(n, d));
                    results.push_bounded(Neighbor::new(n, d), ef);
                }
            }
        }

        Ok(results.into_sorted_vec())
    }

    /// Select up to `m` neighbors from a candidate set by simple distance
    /// ranking (no diversity heuristic — see design notes).
    fn select_neighbors(candidates: &[Neighbor], m: usize) -> Vec<u32> {
        candidates.iter().take(m).map(|n| n.id).collect()
    }

    /// Insert a vector under the given external id. If the id already
    /// exists, this returns the existing slot without modifying the graph.
    pub fn insert(&mut self, id: i32, vector: Vector) -> Result<()> {
        if self.id_to_slot.contains_key(&id) {
            return Ok(());
        }

        let level = self.random_level();
        let slot = self.nodes.len() as u32;
        self.nodes.push(NodeData {
            id,
            level,
            vector: vector.clone(),
            neighbors: vec![Vec::new(); level + 1],
        });
        self.id_to_slot.insert(id, slot);

        let entry = match self.entry_point {
            None => {
                self.entry_point = Some(slot);
                return Ok(());
            }
            Some(e) => e,
        };

        let mut ep = vec![entry];
        if level < self.max_level {
            ep = vec![self.greedy_descend(&vector, entry, self.max_level, level)?];
        }

        for layer in (0..=level.min(self.max_level)).rev() {
            let candidates = self.search_layer(&vector, &ep, layer, self.ef)?;
            let m = GraphParams::max_m(layer);
            let selected = Self::select_neighbors(&candidates, m);

            self.node_mut(slot).neighbors[layer] = selected.clone();
            for &neighbor_slot in &selected {
                // Reverse edge is added unconditionally, with no re-pruning
                // of the neighbor's own list even if this pushes it past
                // `max_m[layer]` — known looseness preserved from the
                // reference (see DESIGN.md).
                let back = &mut self.node_mut(neighbor_slot).neighbors;
                if back.len() <= layer {
                    back.resize_with(layer + 1, Vec::new);
                }
                back[layer].push(slot);
            }

            // ep = W: the full candidate set found at this layer seeds the
            // next lower layer's search, not just the single nearest.
            ep = candidates.into_iter().map(|n| n.id).collect();
        }

        if level > self.max_level {
            self.entry_point = Some(slot);
        }

        Ok(())
    }

    /// k-nearest-neighbor search: descend via width-1 layer searches from
    /// `max_level` down to layer 1, then run a final layer-0 search with
    /// width `k`.
    pub fn knn_search(&self, query: &Vector, k: usize) -> Result<Vec<(i32, f32)>> {
        let Some(entry) = self.entry_point else {
            return Ok(Vec::new());
        };

        let layer0_entry = if self.max_level > 0 {
            self.greedy_descend(query, entry, self.max_level, 0)?
        } else {
            entry
        };

        let results = self.search_layer(query, &[layer0_entry], 0, k)?;

        Ok(results
            .into_iter()
            .take(k)
            .map(|n| (self.node(n.id).id, n.distance))
            .collect())
    }

    // --- persistence support -------------------------------------------

    pub(crate) fn iter_nodes(&self) -> impl Iterator<Item = &NodeData> {
        self.nodes.iter()
    }

    pub(crate) fn slot_for_id(&self, id: i32) -> Option<u32> {
        self.slot_of(id)
    }

    pub(crate) fn set_neighbors_at_layer(&mut self, slot: u32, layer: usize, neighbor_ids: Vec<i32>) {
        let neighbor_slots: Vec<u32> = neighbor_ids
            .into_iter()
            .filter_map(|id| self.id_to_slot.get(&id).copied())
            .collect();
        let node = self.node_mut(slot);
        if node.neighbors.len() <= layer {
            node.neighbors.resize_with(layer + 1, Vec::new);
        }
        node.neighbors[layer] = neighbor_slots;
    }
}
