//! End-to-end insert/search/persist flows against the public API.

use hnsw_mmap_index::config::GraphParams;
use hnsw_mmap_index::hnsw::Graph;
use hnsw_mmap_index::persistence::{read_from_mmap, write_to_mmap};
use hnsw_mmap_index::vector::Vector;
use tempfile::TempDir;

fn params() -> GraphParams {
    GraphParams::new(4, 32, 0.33)
}

#[test]
fn empty_search_returns_empty() {
    let graph = Graph::with_seed(params(), 1000);
    let results = graph.knn_search(&Vector::new(vec![0.0, 0.0]), 3).unwrap();
    assert!(results.is_empty());
}

#[test]
fn singleton_search_returns_self() {
    let mut graph = Graph::with_seed(params(), 1000);
    graph.insert(7, Vector::new(vec![1.0, 2.0, 3.0])).unwrap();

    let results = graph.knn_search(&Vector::new(vec![1.0, 2.0, 3.0]), 1).unwrap();
    assert_eq!(results, vec![(7, 0.0)]);
}

#[test]
fn two_point_ordering_matches_expected_distances() {
    let mut graph = Graph::with_seed(params(), 1000);
    graph.insert(1, Vector::new(vec![0.0, 0.0])).unwrap();
    graph.insert(2, Vector::new(vec![3.0, 4.0])).unwrap();

    let results = graph.knn_search(&Vector::new(vec![0.0, 0.0]), 2).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, 1);
    assert_eq!(results[1].0, 2);
    assert!((results[1].1 - 5.0).abs() < 1e-5);
}

#[test]
fn k_larger_than_graph_returns_all_nodes() {
    let mut graph = Graph::with_seed(params(), 1000);
    graph.insert(1, Vector::new(vec![0.0])).unwrap();
    graph.insert(2, Vector::new(vec![1.0])).unwrap();
    graph.insert(3, Vector::new(vec![2.0])).unwrap();

    let results = graph.knn_search(&Vector::new(vec![1.0]), 10).unwrap();
    assert_eq!(results.len(), 3);
    for w in results.windows(2) {
        assert!(w[0].1 <= w[1].1);
    }
}

#[test]
fn persistence_round_trip_preserves_top1_for_most_queries() {
    let dir = TempDir::new().unwrap();

    let mut graph = Graph::with_seed(params(), 1000);
    let vectors: Vec<Vector> = (0..100)
        .map(|i| Vector::new(vec![(i as f32) * 0.1, ((i * 3) % 17) as f32, (i % 5) as f32]))
        .collect();
    for (i, v) in vectors.iter().enumerate() {
        graph.insert(i as i32, v.clone()).unwrap();
    }

    let queries: Vec<Vector> = (0..20)
        .map(|i| vectors[i * 5 % vectors.len()].clone())
        .collect();
    let before: Vec<i32> = queries
        .iter()
        .map(|q| graph.knn_search(q, 1).unwrap()[0].0)
        .collect();

    write_to_mmap(&graph, dir.path()).unwrap();
    let reloaded = read_from_mmap(dir.path(), params(), 1000).unwrap();

    let mut matches = 0;
    for (q, &expected) in queries.iter().zip(before.iter()) {
        let got = reloaded.knn_search(q, 1).unwrap()[0].0;
        if got == expected {
            matches += 1;
        }
    }

    assert!(
        matches as f64 / queries.len() as f64 >= 0.95,
        "top-1 stability across reload was only {matches}/{}",
        queries.len()
    );
}

#[test]
fn reloaded_graph_preserves_id_set_and_vectors() {
    let dir = TempDir::new().unwrap();

    let mut graph = Graph::with_seed(params(), 1000);
    for i in 0..25 {
        graph.insert(i, Vector::new(vec![i as f32, (i * 2) as f32])).unwrap();
    }

    write_to_mmap(&graph, dir.path()).unwrap();
    let reloaded = read_from_mmap(dir.path(), params(), 1000).unwrap();

    assert_eq!(reloaded.len(), graph.len());
    for i in 0..25 {
        assert!(reloaded.contains_id(i));
        assert_eq!(
            reloaded.vector_of(i).unwrap().as_slice(),
            graph.vector_of(i).unwrap().as_slice()
        );
    }
}
