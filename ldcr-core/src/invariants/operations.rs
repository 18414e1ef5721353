//! Crossing-edge counters of running splits and merges.

use std::collections::BTreeMap;

use tracing::trace;

use crate::{node::Side, operation::OperationId};

use super::{EvaluationMode, GraphContext, GraphInvariantViolation};

/// Recounts, per running operation, the edges joining its two halves and
/// compares the tally with the operation's incremental counter.
pub(super) fn check_crossing_counts(
    ctx: GraphContext<'_>,
    mode: &mut EvaluationMode<'_>,
) -> Result<(), GraphInvariantViolation> {
    let mut tallies: BTreeMap<OperationId, u64> = BTreeMap::new();
    for (_, cluster) in ctx.ground_truth_clusters() {
        for (slot, &origin) in cluster.nodes().iter().enumerate() {
            let Some(mark) = ctx.nodes.get(origin).and_then(|node| node.operation_mark()) else {
                continue;
            };
            // Each crossing edge is counted from its first-side endpoint.
            if mark.side() != Side::First {
                continue;
            }
            let store = &cluster.adjacency;
            let crossing = store
                .intra_neighbours(slot)
                .iter()
                .chain(store.inter_neighbours(slot))
                .filter_map(|&target| ctx.nodes.get(target))
                .filter(|node| {
                    node.operation_mark().is_some_and(|other| {
                        other.operation() == mark.operation() && other.side() == Side::Second
                    })
                })
                .count() as u64;
            *tallies.entry(mark.operation()).or_default() += crossing;
        }
    }
    trace!(operations = ctx.operations.len(), "checking crossing counters");

    for (&id, operation) in ctx.operations {
        let actual = tallies.remove(&id).unwrap_or(0);
        if actual != operation.crossing_edges() {
            mode.record(GraphInvariantViolation::CrossingMismatch {
                operation: id.get(),
                counted: operation.crossing_edges(),
                actual,
            })?;
        }
    }
    for (id, actual) in tallies {
        if actual > 0 {
            mode.record(GraphInvariantViolation::CrossingMismatch {
                operation: id.get(),
                counted: 0,
                actual,
            })?;
        }
    }
    Ok(())
}
