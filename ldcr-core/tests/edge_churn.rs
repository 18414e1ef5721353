//! Long runs of edge insertions and deletions keep every count consistent.

mod common;

use std::collections::HashSet;

use common::{assert_valid, seeded_graph};
use ldcr_core::{GraphEvent, max_edge_count};
use rstest::rstest;

#[rstest]
#[case::sparse(&[10, 10], 0.1, 0.01, 1)]
#[case::dense(&[6, 4, 3], 0.9, 0.2, 2)]
#[case::singletons(&[1, 1, 1, 1, 1], 0.5, 0.5, 3)]
fn churn_preserves_the_edge_ledger(
    #[case] sizes: &[usize],
    #[case] p_in: f64,
    #[case] p_out: f64,
    #[case] seed: u64,
) {
    let mut graph = seeded_graph(sizes, p_in, p_out, seed);
    let nodes = graph.node_count() as u64;
    for step in 0..500 {
        if graph.shall_do_edge_insertion() {
            graph.add_edge().expect("insertion succeeds");
        } else {
            graph.remove_edge().expect("deletion succeeds");
        }
        if step % 50 == 0 {
            assert_valid(&graph, &format!("step {step}"));
        }
    }
    assert_eq!(graph.edge_count() + graph.non_edge_count(), max_edge_count(nodes));
    assert_eq!(graph.edges().count() as u64, graph.edge_count());
    assert_valid(&graph, "end of churn");
}

#[test]
fn insert_then_delete_restores_the_journaled_edge_set() {
    let mut graph = seeded_graph(&[5, 5], 0.4, 0.1, 8);
    let before: HashSet<_> = graph.edges().map(|edge| edge.canonical()).collect();

    let mut inserted = Vec::new();
    for _ in 0..10 {
        if let Some(edge) = graph.add_edge().expect("insertion succeeds") {
            inserted.push(edge);
        }
    }
    for edge in inserted.iter().rev() {
        graph
            .remove_edge_between(edge.source(), edge.target())
            .expect("inserted edge exists");
    }

    let after: HashSet<_> = graph.edges().map(|edge| edge.canonical()).collect();
    assert_eq!(before, after);
    let events = graph.journal().graph_events();
    let created = events
        .iter()
        .filter(|event| matches!(event, GraphEvent::CreateEdge { .. }))
        .count();
    let removed = events
        .iter()
        .filter(|event| matches!(event, GraphEvent::RemoveEdge { .. }))
        .count();
    assert_eq!(created - removed, graph.edge_count() as usize);
    assert_eq!(removed, inserted.len());
    assert_valid(&graph, "after round trip");
}

#[test]
fn node_churn_keeps_clusters_populated() {
    let mut graph = seeded_graph(&[4, 4, 4], 0.6, 0.1, 21);
    for round in 0..200 {
        if round % 3 == 0 {
            graph.add_and_connect_node().expect("insertion succeeds");
        } else {
            graph.remove_node().expect("removal succeeds");
        }
        for &cluster in graph.ground_truth_clusters() {
            assert!(!graph.cluster_nodes(cluster).expect("cluster").is_empty());
        }
    }
    assert_eq!(graph.node_count(), graph.nodes().count());
    assert_valid(&graph, "after node churn");
}
