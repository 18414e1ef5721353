//! Edge twin and edge placement invariants.
//!
//! Every edge is stored once per endpoint: intra-cluster edges as two
//! entries of one store, inter-cluster edges as one entry in each endpoint's
//! store. Clusters that only the reference view still sees keep their nodes
//! but none of their edges.

use tracing::{Level, debug, trace};

use crate::{
    cluster::{ClusterId, OrdinaryCluster},
    edge::{Edge, EdgeKind},
    node::NodeId,
};

use super::{EvaluationMode, GraphContext, GraphInvariantViolation};

pub(super) fn check_edge_symmetry(
    ctx: GraphContext<'_>,
    mode: &mut EvaluationMode<'_>,
) -> Result<(), GraphInvariantViolation> {
    if tracing::enabled!(Level::TRACE) {
        let entries: usize = ctx
            .ground_truth_clusters()
            .map(|(_, cluster)| 2 * cluster.intra_edge_count() + cluster.inter_edge_count())
            .sum();
        trace!(entries, "checking edge twins");
    }
    for (id, cluster) in ctx.ground_truth_clusters() {
        for (slot, &origin) in cluster.nodes().iter().enumerate() {
            let store = &cluster.adjacency;
            for &target in store.intra_neighbours(slot) {
                check_twin(ctx, mode, id, origin, target, EdgeKind::Intra)?;
            }
            for &target in store.inter_neighbours(slot) {
                check_twin(ctx, mode, id, origin, target, EdgeKind::Inter)?;
            }
        }
    }
    Ok(())
}

fn check_twin(
    ctx: GraphContext<'_>,
    mode: &mut EvaluationMode<'_>,
    home: ClusterId,
    origin: NodeId,
    target: NodeId,
    kind: EdgeKind,
) -> Result<(), GraphInvariantViolation> {
    let away = ctx
        .nodes
        .get(target)
        .and_then(|node| node.ground_truth_cluster());
    let classified = match kind {
        EdgeKind::Intra => away == Some(home),
        EdgeKind::Inter => away.is_some_and(|away| away != home),
    };
    if !classified {
        debug!(?origin, ?target, ?kind, "edge stored under the wrong kind");
        return mode.record(GraphInvariantViolation::MisclassifiedEdge {
            origin: ctx.node_label(origin),
            target: ctx.node_label(target),
            stored: match kind {
                EdgeKind::Intra => "intra",
                EdgeKind::Inter => "inter",
            },
        });
    }
    let twin_present = away
        .and_then(|away| ctx.clusters.get(away))
        .is_some_and(|store| store.adjacency.contains_edge(Edge::new(target, origin)));
    if !twin_present {
        debug!(?origin, ?target, "missing twin");
        mode.record(GraphInvariantViolation::MissingTwin {
            origin: ctx.node_label(origin),
            target: ctx.node_label(target),
        })?;
    }
    if !ctx
        .pseudo
        .contains_pair(origin, target, ctx.nodes)
        .unwrap_or(false)
    {
        mode.record(GraphInvariantViolation::UnsampledEdge {
            origin: ctx.node_label(origin),
            target: ctx.node_label(target),
        })?;
    }
    Ok(())
}

pub(super) fn check_reference_only_isolation(
    ctx: GraphContext<'_>,
    mode: &mut EvaluationMode<'_>,
) -> Result<(), GraphInvariantViolation> {
    for &id in ctx.reference.clusters() {
        let Some(cluster) = ctx.clusters.get(id) else {
            continue;
        };
        if cluster.in_ground_truth() {
            continue;
        }
        let edges = stored_entries(cluster);
        trace!(cluster = cluster.journal_id(), edges, "checking reference-only cluster");
        if edges > 0 {
            mode.record(GraphInvariantViolation::ReferenceOnlyEdges {
                cluster: cluster.journal_id(),
                edges,
            })?;
        }
    }
    Ok(())
}

fn stored_entries(cluster: &OrdinaryCluster) -> u64 {
    (cluster.intra_edge_count() + cluster.inter_edge_count()) as u64 + cluster.sampler.len()
}
