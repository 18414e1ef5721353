//! Aggregate count invariants.

use tracing::trace;

use crate::pair_index::max_edge_count;

use super::{EvaluationMode, GraphContext, GraphInvariantViolation};

pub(super) fn check_edge_counts(
    ctx: GraphContext<'_>,
    mode: &mut EvaluationMode<'_>,
) -> Result<(), GraphInvariantViolation> {
    let mut intra = 0_u64;
    let mut inter_twins = 0_u64;
    for (_, cluster) in ctx.ground_truth_clusters() {
        let stored = cluster.intra_edge_count() as u64;
        if cluster.sampler.len() != stored {
            mode.record(GraphInvariantViolation::CountMismatch {
                quantity: "sampled intra-cluster edges",
                expected: stored,
                actual: cluster.sampler.len(),
            })?;
        }
        intra += stored;
        inter_twins += cluster.inter_edge_count() as u64;
    }
    let listed_inter = ctx.pseudo.inter_edge_count() as u64;
    trace!(intra, inter_twins, listed_inter, "checking edge counts");

    let sampled_intra = ctx.pseudo.edge_count().saturating_sub(listed_inter);
    if sampled_intra != intra {
        mode.record(GraphInvariantViolation::CountMismatch {
            quantity: "intra-cluster edges",
            expected: intra,
            actual: sampled_intra,
        })?;
    }
    if inter_twins != 2 * listed_inter {
        mode.record(GraphInvariantViolation::CountMismatch {
            quantity: "inter-cluster twins",
            expected: 2 * listed_inter,
            actual: inter_twins,
        })?;
    }
    for edge in ctx.pseudo.inter_edges() {
        let cluster_of = |id| {
            ctx.nodes
                .get(id)
                .and_then(|node| node.ground_truth_cluster())
        };
        let (home, away) = (cluster_of(edge.source()), cluster_of(edge.target()));
        if home.is_none() || home == away {
            mode.record(GraphInvariantViolation::MisclassifiedEdge {
                origin: ctx.node_label(edge.source()),
                target: ctx.node_label(edge.target()),
                stored: "inter",
            })?;
        }
    }
    Ok(())
}

pub(super) fn check_max_intra_total(
    ctx: GraphContext<'_>,
    mode: &mut EvaluationMode<'_>,
) -> Result<(), GraphInvariantViolation> {
    let pairs: u64 = ctx
        .ground_truth_clusters()
        .map(|(_, cluster)| max_edge_count(cluster.node_count() as u64))
        .sum();
    if pairs == ctx.max_intra_edges {
        return Ok(());
    }
    mode.record(GraphInvariantViolation::CountMismatch {
        quantity: "intra-cluster pairs",
        expected: pairs,
        actual: ctx.max_intra_edges,
    })
}
