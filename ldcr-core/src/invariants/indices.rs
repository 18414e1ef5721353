//! Back-pointer invariants.
//!
//! Dense lists hand out positions that their members remember: the pseudo
//! cluster's node list, each cluster's adjacency slots, both view lists and
//! the free list of unlocked clusters. Every remembered position must point
//! back at its owner.

use tracing::trace;

use crate::{
    clustering::{ClusterList, View, cluster_journal_id},
    node::{Node, NodeId, Placement},
};

use super::{EvaluationMode, GraphContext, GraphInvariantViolation};

pub(super) fn check_index_validity(
    ctx: GraphContext<'_>,
    mode: &mut EvaluationMode<'_>,
) -> Result<(), GraphInvariantViolation> {
    trace!(nodes = ctx.nodes.len(), "checking index validity");
    if ctx.nodes.len() != ctx.pseudo.node_count() {
        mode.record(GraphInvariantViolation::CountMismatch {
            quantity: "nodes",
            expected: ctx.nodes.len() as u64,
            actual: ctx.pseudo.node_count() as u64,
        })?;
    }
    for (slot, &id) in ctx.pseudo.nodes().iter().enumerate() {
        let stored = ctx.nodes.get(id).and_then(|node| node.pseudo_slot);
        if stored != Some(slot) {
            mode.record(GraphInvariantViolation::DanglingIndex {
                structure: "pseudo cluster",
                owner: ctx.node_label(id),
                index: stored,
            })?;
        }
    }
    for (id, node) in ctx.nodes.iter() {
        let ground_truth = ctx.ground_truth.list();
        check_placement(ctx, mode, id, node.ground_truth, ground_truth, "ground-truth placement")?;
        check_placement(ctx, mode, id, node.reference, ctx.reference, "reference placement")?;
    }
    check_view(ctx, mode, ctx.ground_truth.list(), "ground-truth view")?;
    check_view(ctx, mode, ctx.reference, "reference view")?;
    check_unlocked(ctx, mode)
}

fn check_placement(
    ctx: GraphContext<'_>,
    mode: &mut EvaluationMode<'_>,
    id: NodeId,
    placement: Option<Placement>,
    view: &ClusterList,
    structure: &'static str,
) -> Result<(), GraphInvariantViolation> {
    let valid = placement.is_some_and(|placement| {
        view.contains(placement.cluster, ctx.clusters)
            && ctx
                .clusters
                .get(placement.cluster)
                .and_then(|cluster| cluster.adjacency.node_at(placement.slot))
                == Some(id)
    });
    if valid {
        return Ok(());
    }
    mode.record(GraphInvariantViolation::DanglingIndex {
        structure,
        owner: ctx.node_label(id),
        index: placement.map(|placement| placement.slot),
    })
}

fn check_view(
    ctx: GraphContext<'_>,
    mode: &mut EvaluationMode<'_>,
    view: &ClusterList,
    structure: &'static str,
) -> Result<(), GraphInvariantViolation> {
    for (position, &id) in view.clusters().iter().enumerate() {
        let Some(cluster) = ctx.clusters.get(id) else {
            mode.record(GraphInvariantViolation::DanglingIndex {
                structure,
                owner: id.index() as u64,
                index: None,
            })?;
            continue;
        };
        let stored = view.slot_of(cluster);
        if stored != Some(position) {
            mode.record(GraphInvariantViolation::DanglingIndex {
                structure,
                owner: cluster.journal_id(),
                index: stored,
            })?;
        }
        for (slot, &member) in cluster.nodes().iter().enumerate() {
            let placed = ctx.nodes.get(member).and_then(|node| placement_in(node, view));
            if placed.map(|placement| placement.slot) != Some(slot) {
                mode.record(GraphInvariantViolation::DanglingIndex {
                    structure,
                    owner: ctx.node_label(member),
                    index: placed.map(|placement| placement.slot),
                })?;
            }
        }
    }
    Ok(())
}

fn placement_in(node: &Node, view: &ClusterList) -> Option<Placement> {
    match view.view() {
        View::GroundTruth => node.ground_truth,
        View::Reference => node.reference,
    }
}

fn check_unlocked(
    ctx: GraphContext<'_>,
    mode: &mut EvaluationMode<'_>,
) -> Result<(), GraphInvariantViolation> {
    let mut nodes = 0;
    for (position, &id) in ctx.ground_truth.unlocked().iter().enumerate() {
        let cluster = ctx.clusters.get(id);
        let stored = cluster.and_then(|cluster| cluster.unlocked_slot);
        let locked = cluster.is_none_or(|cluster| cluster.is_locked());
        if stored != Some(position) || locked {
            mode.record(GraphInvariantViolation::DanglingIndex {
                structure: "unlocked list",
                owner: cluster_journal_id(ctx.clusters, id),
                index: stored,
            })?;
        }
        nodes += cluster.map_or(0, |cluster| cluster.node_count());
    }
    for (_, cluster) in ctx.ground_truth_clusters() {
        if !cluster.is_locked() && cluster.unlocked_slot.is_none() {
            mode.record(GraphInvariantViolation::DanglingIndex {
                structure: "unlocked list",
                owner: cluster.journal_id(),
                index: None,
            })?;
        }
    }
    if nodes != ctx.ground_truth.unlocked_node_count() {
        mode.record(GraphInvariantViolation::CountMismatch {
            quantity: "nodes in unlocked clusters",
            expected: nodes as u64,
            actual: ctx.ground_truth.unlocked_node_count() as u64,
        })?;
    }
    Ok(())
}
