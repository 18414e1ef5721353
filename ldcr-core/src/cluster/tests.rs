//! Tests for ordinary and pseudo clusters in isolation.

use rstest::{fixture, rstest};

use super::*;
use crate::{
    arena::Arena,
    clustering::View,
    edge::{Edge, EdgeKind},
    node::{Node, NodeId},
    pair_index::max_edge_count,
    random::SeededRandom,
};

const TOLERANCE: f64 = 1e-12;

struct Setup {
    nodes: Arena<Node>,
    cluster: OrdinaryCluster,
    pseudo: PseudoCluster,
    ids: Vec<NodeId>,
}

#[fixture]
fn setup() -> Setup {
    let mut nodes = Arena::default();
    let mut cluster = OrdinaryCluster::new(ClusterId::new(0), 1, 0.6, 5);
    cluster.set_view_slot(View::GroundTruth, Some(0), &mut nodes);
    cluster.set_view_slot(View::Reference, Some(0), &mut nodes);
    let mut pseudo = PseudoCluster::default();
    let ids: Vec<NodeId> = (0..5).map(|offset| nodes.insert(Node::new(2 + offset))).collect();
    for &id in &ids {
        cluster.add_node_locally(id, &mut nodes).expect("node exists");
        pseudo.add_node(id, &mut nodes).expect("node exists");
    }
    Setup {
        nodes,
        cluster,
        pseudo,
        ids,
    }
}

fn connect(setup: &mut Setup, first: usize, second: usize) -> Edge {
    let edge = Edge::new(setup.ids[first], setup.ids[second]);
    setup
        .cluster
        .add_intra_edge(edge, &setup.nodes)
        .expect("new edge");
    setup
        .pseudo
        .add_edge(edge, EdgeKind::Intra, &setup.nodes)
        .expect("new edge");
    edge
}

#[rstest]
fn ordinary_weights_follow_edge_counts(mut setup: Setup) {
    let p_out = 0.1;
    assert_eq!(setup.cluster.intra_non_edge_count(), 10);
    assert!((setup.cluster.insertion_weight(p_out) - 10.0 * 0.5).abs() < TOLERANCE);
    connect(&mut setup, 0, 1);
    connect(&mut setup, 2, 4);
    assert!((setup.cluster.insertion_weight(p_out) - 8.0 * 0.5).abs() < TOLERANCE);
    assert!((setup.cluster.deletion_weight(p_out) - 2.0 * 0.4).abs() < TOLERANCE);
}

#[rstest]
fn pseudo_weights_count_every_pair(mut setup: Setup) {
    let p_out = 0.25;
    connect(&mut setup, 0, 3);
    assert_eq!(setup.pseudo.edge_count(), 1);
    assert_eq!(setup.pseudo.non_edge_count(), max_edge_count(5) - 1);
    assert!((setup.pseudo.insertion_weight(p_out) - 9.0 * 0.25).abs() < TOLERANCE);
    assert!(setup.pseudo.deletion_weight(p_out).abs() < TOLERANCE);
}

#[rstest]
fn found_edges_and_non_edges_respect_the_sampler(mut setup: Setup) {
    let edge = connect(&mut setup, 1, 3);
    let mut random = SeededRandom::new(5);
    for _ in 0..20 {
        let found = setup.cluster.find_edge(&mut random).expect("one edge");
        assert_eq!(found.canonical(), edge.canonical());
        let (first, second) = setup.cluster.find_non_edge(&mut random).expect("non-edges left");
        assert_ne!(first, second);
        assert_ne!(Edge::new(first, second).canonical(), edge.canonical());
    }
}

#[rstest]
fn removing_node_reindexes_moved_pairs(mut setup: Setup) {
    connect(&mut setup, 4, 2);
    connect(&mut setup, 4, 3);
    setup
        .pseudo
        .remove_node(setup.ids[0], &mut setup.nodes, &[setup.ids[2], setup.ids[3]])
        .expect("isolated node");
    setup
        .cluster
        .remove_node_locally(setup.ids[0], &mut setup.nodes)
        .expect("isolated node");
    assert_eq!(setup.cluster.node_count(), 4);
    assert_eq!(setup.cluster.sampler.max(), max_edge_count(4));
    assert_eq!(setup.cluster.sampler.len(), 2);
    let moved = setup.cluster.slot(setup.ids[4], &setup.nodes).expect("stored");
    assert_eq!(moved, 0);
    for other in [2, 3] {
        let pair = setup
            .pseudo
            .contains_pair(setup.ids[4], setup.ids[other], &setup.nodes)
            .expect("both stored");
        assert!(pair);
    }
    let mut random = SeededRandom::new(9);
    for _ in 0..20 {
        let found = setup.cluster.find_edge(&mut random).expect("edges left");
        assert!(found.touches(setup.ids[4]));
    }
}

#[rstest]
fn connected_node_removal_leaves_sampler_untouched(mut setup: Setup) {
    connect(&mut setup, 0, 1);
    let before = setup.cluster.sampler.selected_elements();
    assert!(matches!(
        setup.cluster.remove_node_locally(setup.ids[0], &mut setup.nodes),
        Err(crate::GraphError::NodeNotIsolated { degree: 1, .. })
    ));
    assert_eq!(setup.cluster.sampler.selected_elements(), before);
}

#[rstest]
fn status_updates_move_edges_between_lists(mut setup: Setup) {
    let edge = connect(&mut setup, 0, 1);
    assert_eq!(setup.pseudo.inter_edge_count(), 0);
    setup.pseudo.update_status(edge.reversed(), EdgeKind::Inter);
    assert_eq!(setup.pseudo.inter_edges(), &[edge.canonical()]);
    setup.pseudo.update_status(edge, EdgeKind::Inter);
    assert_eq!(setup.pseudo.inter_edge_count(), 1);
    let mut random = SeededRandom::new(2);
    assert_eq!(setup.pseudo.find_edge(&mut random), Some(edge.canonical()));
    setup.pseudo.update_status(edge, EdgeKind::Intra);
    assert_eq!(setup.pseudo.inter_edge_count(), 0);
    assert_eq!(setup.pseudo.find_edge(&mut random), None);
}

#[rstest]
fn pseudo_rejects_duplicates_and_self_loops(mut setup: Setup) {
    let edge = connect(&mut setup, 2, 3);
    assert!(matches!(
        setup.pseudo.add_edge(edge.reversed(), EdgeKind::Intra, &setup.nodes),
        Err(crate::GraphError::DuplicateEdge { .. })
    ));
    assert!(matches!(
        setup
            .pseudo
            .add_edge(Edge::new(setup.ids[1], setup.ids[1]), EdgeKind::Intra, &setup.nodes),
        Err(crate::GraphError::SelfLoop { node: 2 })
    ));
}
