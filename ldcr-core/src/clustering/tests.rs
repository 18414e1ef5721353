//! Tests for the ground-truth and reference cluster lists.

use rstest::{fixture, rstest};

use super::*;
use crate::{
    error::GraphErrorCode,
    operation::OperationId,
    random::SeededRandom,
};

struct World {
    clusters: Arena<OrdinaryCluster>,
    nodes: Arena<Node>,
    ids: Vec<ClusterId>,
}

impl World {
    fn populate(&mut self, cluster: ClusterId, count: usize) {
        for _ in 0..count {
            let sequence = self.nodes.len() as u64 + 2;
            let node = self.nodes.insert(Node::new(sequence));
            if let Some(target) = self.clusters.get_mut(cluster) {
                target.add_node_locally(node, &mut self.nodes).expect("node exists");
            }
        }
    }
}

#[fixture]
fn world() -> World {
    let mut clusters = Arena::default();
    let ids = [(0.5, 4), (0.3, 1), (0.7, 10)]
        .into_iter()
        .enumerate()
        .map(|(offset, (p_in, size))| {
            clusters.insert_with(|id| OrdinaryCluster::new(id, offset as u64 + 1, p_in, size))
        })
        .collect();
    World {
        clusters,
        nodes: Arena::default(),
        ids,
    }
}

#[rstest]
fn list_add_and_remove_keep_slots_dense(mut world: World) {
    let mut list = ClusterList::new(View::Reference);
    for &id in &world.ids {
        list.add(id, &mut world.clusters, &mut world.nodes).expect("fresh cluster");
    }
    assert_eq!(list.p_in_values(), &[0.5, 0.3, 0.7]);
    list.remove(world.ids[0], &mut world.clusters, &mut world.nodes)
        .expect("present");
    assert_eq!(list.clusters(), &[world.ids[2], world.ids[1]]);
    assert_eq!(list.expected_sizes(), &[10, 1]);
    assert_eq!(world.clusters.get(world.ids[2]).and_then(|c| c.reference_slot), Some(0));
    assert!(!list.contains(world.ids[0], &world.clusters));
    assert!(matches!(
        list.remove(world.ids[0], &mut world.clusters, &mut world.nodes),
        Err(GraphError::UnknownCluster { cluster: 1 })
    ));
}

#[rstest]
fn adding_twice_is_rejected(mut world: World) {
    let mut list = ClusterList::new(View::GroundTruth);
    list.add(world.ids[1], &mut world.clusters, &mut world.nodes)
        .expect("fresh cluster");
    assert!(matches!(
        list.add(world.ids[1], &mut world.clusters, &mut world.nodes),
        Err(GraphError::InvariantViolation { .. })
    ));
}

#[rstest]
fn entering_a_view_places_existing_nodes(mut world: World) {
    world.populate(world.ids[0], 3);
    let mut list = ClusterList::new(View::Reference);
    list.add(world.ids[0], &mut world.clusters, &mut world.nodes)
        .expect("fresh cluster");
    for (_, node) in world.nodes.iter() {
        assert_eq!(node.reference_cluster(), Some(world.ids[0]));
        assert_eq!(node.ground_truth_cluster(), None);
    }
    list.remove(world.ids[0], &mut world.clusters, &mut world.nodes)
        .expect("present");
    assert!(world.nodes.iter().all(|(_, node)| node.reference_cluster().is_none()));
}

#[rstest]
fn equality_ignores_order(mut world: World) {
    let mut left = ClusterList::new(View::GroundTruth);
    let mut right = ClusterList::new(View::Reference);
    for &id in &world.ids {
        left.add(id, &mut world.clusters, &mut world.nodes).expect("fresh cluster");
    }
    for &id in world.ids.iter().rev() {
        right.add(id, &mut world.clusters, &mut world.nodes).expect("fresh cluster");
    }
    assert!(left.same_clusters(&right));
    right
        .remove(world.ids[1], &mut world.clusters, &mut world.nodes)
        .expect("present");
    assert!(!left.same_clusters(&right));
}

#[rstest]
fn locking_tracks_unlocked_node_totals(mut world: World) {
    world.populate(world.ids[0], 4);
    world.populate(world.ids[1], 1);
    world.populate(world.ids[2], 2);
    let mut truth = GroundTruth::default();
    for &id in &world.ids {
        truth.add(id, &mut world.clusters, &mut world.nodes).expect("fresh cluster");
    }
    assert_eq!(truth.unlocked_node_count(), 7);
    truth
        .lock(world.ids[0], OperationId::new(1), &mut world.clusters)
        .expect("present");
    assert_eq!(truth.unlocked(), &[world.ids[2], world.ids[1]]);
    assert_eq!(truth.unlocked_node_count(), 3);
    assert!(world.clusters.get(world.ids[0]).is_some_and(OrdinaryCluster::is_locked));
    truth.unlock(world.ids[0], &mut world.clusters);
    assert_eq!(truth.unlocked_node_count(), 7);
    assert_eq!(truth.unlocked().len(), 3);
}

#[rstest]
fn split_candidates_hold_two_nodes(mut world: World) {
    world.populate(world.ids[0], 3);
    world.populate(world.ids[1], 1);
    world.populate(world.ids[2], 1);
    let mut truth = GroundTruth::default();
    for &id in &world.ids {
        truth.add(id, &mut world.clusters, &mut world.nodes).expect("fresh cluster");
    }
    let mut random = SeededRandom::new(21);
    for _ in 0..50 {
        assert_eq!(
            truth.propose_cluster_for_split(&world.clusters, &mut random),
            Some(world.ids[0])
        );
    }
    truth
        .lock(world.ids[0], OperationId::new(1), &mut world.clusters)
        .expect("present");
    assert_eq!(truth.propose_cluster_for_split(&world.clusters, &mut random), None);
}

#[rstest]
fn merge_needs_two_unlocked_clusters(mut world: World) {
    let mut truth = GroundTruth::default();
    for &id in &world.ids {
        truth.add(id, &mut world.clusters, &mut world.nodes).expect("fresh cluster");
    }
    let mut random = SeededRandom::new(4);
    let (first, second) = truth.propose_clusters_for_merge(&mut random).expect("three unlocked");
    assert_ne!(first, second);
    truth
        .lock(world.ids[0], OperationId::new(1), &mut world.clusters)
        .expect("present");
    truth
        .lock(world.ids[1], OperationId::new(1), &mut world.clusters)
        .expect("present");
    assert_eq!(truth.propose_clusters_for_merge(&mut random), None);
}

#[rstest]
fn new_nodes_follow_expected_sizes(mut world: World) {
    let mut truth = GroundTruth::default();
    for &id in &world.ids {
        truth.add(id, &mut world.clusters, &mut world.nodes).expect("fresh cluster");
    }
    truth
        .remove(world.ids[2], &mut world.clusters, &mut world.nodes)
        .expect("present");
    let mut random = SeededRandom::new(8);
    let mut hits = [0_usize; 2];
    for _ in 0..2_000 {
        let chosen = truth.propose_cluster_for_new_node(&mut random).expect("weighted");
        assert_ne!(chosen, world.ids[2]);
        if chosen == world.ids[0] {
            hits[0] += 1;
        } else {
            hits[1] += 1;
        }
    }
    assert!(hits[0] > hits[1] * 2);
}

#[test]
#[cfg_attr(
    debug_assertions,
    should_panic(expected = "unlocked node counter underflow")
)]
fn removing_an_uncounted_node_is_an_invariant_violation() {
    let mut truth = GroundTruth::default();
    let err = truth.notify_node_removed().expect_err("nothing counted");
    assert_eq!(err.code(), GraphErrorCode::InvariantViolation);
    assert_eq!(truth.unlocked_node_count(), 0);
}

#[rstest]
#[cfg_attr(
    debug_assertions,
    should_panic(expected = "unlocked node counter underflow")
)]
fn locking_a_cluster_with_uncounted_nodes_is_an_invariant_violation(mut world: World) {
    let mut truth = GroundTruth::default();
    truth
        .add(world.ids[0], &mut world.clusters, &mut world.nodes)
        .expect("fresh cluster");
    // Nodes placed behind the free list's back are never counted.
    world.populate(world.ids[0], 2);
    let err = truth
        .lock(world.ids[0], OperationId::new(1), &mut world.clusters)
        .expect_err("counter would underflow");
    assert_eq!(err.code(), GraphErrorCode::InvariantViolation);
}
