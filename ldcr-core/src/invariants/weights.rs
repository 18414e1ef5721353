//! Selection-tree weight invariant.
//!
//! Each ground-truth cluster and the pseudo cluster own one entry in both
//! global trees, weighted by what the cluster currently reports. Clusters
//! outside the ground-truth view own no entry.

use tracing::{debug, trace};

use crate::{
    cluster::{ClusterRef, WeightEntries, WeightedCluster},
    selection_tree::{SelectionTree, TreeHandle},
};

use super::{EvaluationMode, GraphContext, GraphInvariantViolation, TreeKind};

const PSEUDO_LABEL: u64 = 0;

pub(super) fn check_tree_weights(
    ctx: GraphContext<'_>,
    mode: &mut EvaluationMode<'_>,
) -> Result<(), GraphInvariantViolation> {
    let expected_entries = ctx.ground_truth.list().len() + 1;
    for (tree, kind) in [
        (ctx.insertion_tree, TreeKind::Insertion),
        (ctx.deletion_tree, TreeKind::Deletion),
    ] {
        trace!(?kind, entries = tree.len(), "checking tree weights");
        if tree.len() != expected_entries {
            mode.record(GraphInvariantViolation::CountMismatch {
                quantity: "selection tree entries",
                expected: expected_entries as u64,
                actual: tree.len() as u64,
            })?;
        }
    }

    let pseudo = ctx.pseudo;
    check_entries(
        ctx,
        mode,
        PSEUDO_LABEL,
        pseudo.weight_entries(),
        pseudo.insertion_weight(ctx.p_out),
        pseudo.deletion_weight(ctx.p_out),
    )?;
    for (_, cluster) in ctx.ground_truth_clusters() {
        check_entries(
            ctx,
            mode,
            cluster.journal_id(),
            cluster.weight_entries(),
            cluster.insertion_weight(ctx.p_out),
            cluster.deletion_weight(ctx.p_out),
        )?;
    }
    for (_, cluster) in ctx.clusters.iter() {
        if cluster.in_ground_truth() {
            continue;
        }
        let entries = cluster.weight_entries();
        for (handle, tree) in [
            (entries.insertion, TreeKind::Insertion),
            (entries.deletion, TreeKind::Deletion),
        ] {
            if handle.is_some() {
                mode.record(GraphInvariantViolation::TreeEntry {
                    tree,
                    cluster: cluster.journal_id(),
                    state: "kept outside the ground-truth view",
                })?;
            }
        }
    }
    Ok(())
}

fn check_entries(
    ctx: GraphContext<'_>,
    mode: &mut EvaluationMode<'_>,
    cluster: u64,
    entries: WeightEntries,
    insertion: f64,
    deletion: f64,
) -> Result<(), GraphInvariantViolation> {
    check_entry(
        mode,
        ctx.insertion_tree,
        TreeKind::Insertion,
        cluster,
        entries.insertion,
        insertion.max(0.0),
    )?;
    check_entry(
        mode,
        ctx.deletion_tree,
        TreeKind::Deletion,
        cluster,
        entries.deletion,
        deletion.max(0.0),
    )
}

fn check_entry(
    mode: &mut EvaluationMode<'_>,
    tree: &SelectionTree<ClusterRef>,
    kind: TreeKind,
    cluster: u64,
    handle: Option<TreeHandle>,
    expected: f64,
) -> Result<(), GraphInvariantViolation> {
    let Some(actual) = handle.and_then(|handle| tree.weight(handle).ok()) else {
        return mode.record(GraphInvariantViolation::TreeEntry {
            tree: kind,
            cluster,
            state: "missing",
        });
    };
    if (actual - expected).abs() <= 1e-9 * expected.max(1.0) {
        return Ok(());
    }
    debug!(?kind, cluster, actual, expected, "stale tree weight");
    mode.record(GraphInvariantViolation::WeightMismatch {
        tree: kind,
        cluster,
        expected,
        actual,
    })
}
