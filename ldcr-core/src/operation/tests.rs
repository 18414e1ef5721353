//! Tests for the operation state machine.

use rstest::rstest;

use super::*;
use crate::{error::GraphErrorCode, node::Node, random::SeededRandom};

fn arena_with_sizes(sizes: &[usize]) -> (Arena<OrdinaryCluster>, Vec<ClusterId>) {
    let mut clusters = Arena::default();
    let mut nodes = Arena::default();
    let mut ids = Vec::new();
    for (offset, &size) in sizes.iter().enumerate() {
        let id = clusters.insert_with(|id| OrdinaryCluster::new(id, offset as u64 + 1, 0.5, size));
        for _ in 0..size {
            let node = nodes.insert(Node::new(nodes.len() as u64 + 2));
            if let Some(cluster) = clusters.get_mut(id) {
                cluster.add_node_locally(node, &mut nodes).expect("node exists");
            }
        }
        ids.push(id);
    }
    (clusters, ids)
}

#[rstest]
#[case::split(OperationKind::Split, 30, false)]
#[case::split_done(OperationKind::Split, 5, true)]
#[case::merge(OperationKind::Merge, 5, false)]
#[case::merge_done(OperationKind::Merge, 30, true)]
fn completeness_depends_on_direction(
    #[case] kind: OperationKind,
    #[case] crossing: u64,
    #[case] expected: bool,
) {
    let (clusters, ids) = arena_with_sizes(&[4, 5, 9]);
    let parts = match kind {
        OperationKind::Split => OperationClusters::Split {
            initial: ids[2],
            first: ids[0],
            second: ids[1],
        },
        OperationKind::Merge => OperationClusters::Merge {
            first: ids[0],
            second: ids[1],
            merged: ids[2],
        },
    };
    let mut operation = ClusterOperation::new(OperationId::new(3), parts, 0.8);
    operation.update_densities(&clusters, 0.1);
    // 20 pairs: 16 expected inside, 2 expected across.
    assert!((operation.threshold(0.5) - 9.0).abs() < 1e-9);
    assert!(!operation.is_complete(0.5));
    operation.set_running(crossing);
    assert_eq!(operation.is_complete(0.5), expected);
    assert_eq!(operation.status(0.5).complete, expected);
}

#[test]
fn completion_is_sticky() {
    let (clusters, ids) = arena_with_sizes(&[2, 2, 4]);
    let mut operation = ClusterOperation::new(
        OperationId::new(1),
        OperationClusters::Split {
            initial: ids[2],
            first: ids[0],
            second: ids[1],
        },
        1.0,
    );
    operation.update_densities(&clusters, 0.0);
    operation.set_running(4);
    assert!(!operation.is_complete(0.5));
    operation.notify_edge_deleted().expect("counted edge");
    operation.notify_edge_deleted().expect("counted edge");
    assert!(operation.is_complete(0.5));
    operation.notify_edge_inserted();
    assert!(operation.is_complete(0.5));
    assert_eq!(operation.state(), OperationState::Complete);
}

#[test]
#[cfg_attr(
    debug_assertions,
    should_panic(expected = "crossing edge counter underflow")
)]
fn losing_an_uncounted_crossing_edge_is_an_invariant_violation() {
    let (clusters, ids) = arena_with_sizes(&[1, 1, 2]);
    let mut operation = ClusterOperation::new(
        OperationId::new(3),
        OperationClusters::Split {
            initial: ids[2],
            first: ids[0],
            second: ids[1],
        },
        0.5,
    );
    operation.update_densities(&clusters, 0.1);
    operation.set_running(0);
    let err = operation
        .notify_edge_deleted()
        .expect_err("no crossing edge is counted");
    assert_eq!(err.code(), GraphErrorCode::InvariantViolation);
    assert_eq!(operation.crossing_edges(), 0);
}

#[test]
fn split_nodes_keep_the_half_they_joined() {
    let (clusters, ids) = arena_with_sizes(&[1, 1, 2]);
    let operation = ClusterOperation::new(
        OperationId::new(2),
        OperationClusters::Split {
            initial: ids[2],
            first: ids[0],
            second: ids[1],
        },
        0.5,
    );
    let mut random = SeededRandom::new(3);
    assert_eq!(
        operation.reference_for_new_node(ids[0], &clusters, &mut random),
        (ids[2], Side::First)
    );
    assert_eq!(
        operation.reference_for_new_node(ids[1], &clusters, &mut random),
        (ids[2], Side::Second)
    );
}

#[test]
fn merge_nodes_follow_initial_sizes() {
    let (clusters, ids) = arena_with_sizes(&[9, 1, 0]);
    let operation = ClusterOperation::new(
        OperationId::new(2),
        OperationClusters::Merge {
            first: ids[0],
            second: ids[1],
            merged: ids[2],
        },
        0.5,
    );
    let mut random = SeededRandom::new(12);
    let firsts = (0..1_000)
        .filter(|_| operation.reference_for_new_node(ids[2], &clusters, &mut random).0 == ids[0])
        .count();
    assert!(firsts > 800);
}

#[test]
fn identifiers_display_with_prefix() {
    assert_eq!(OperationId::new(7).to_string(), "op7");
}
