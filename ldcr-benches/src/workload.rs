//! Deterministic workloads shared by the benchmarks.

use ldcr_core::{
    GraphBuilder, InstanceParams, InterDensity, IntraDensity, ProcessParams, SelectionTree,
    TreeHandle,
};
use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::{error::BenchSetupError, params::GeneratorBenchParams};

/// Seed used for every benchmark workload.
pub const SEED: u64 = 42;

/// Expected intra-cluster degree of generated instances.
const DEG_IN: f64 = 8.0;

/// Expected inter-cluster degree of generated instances.
const DEG_OUT: f64 = 1.0;

/// Draws `count` weights from `(0, 1]` with a seeded generator.
#[must_use]
pub fn weights(count: usize, seed: u64) -> Vec<f64> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..count)
        .map(|_| rng.gen_range(f64::EPSILON..=1.0))
        .collect()
}

/// Builds a selection tree holding `0..count` with seeded weights, together
/// with the handle of each entry.
///
/// # Errors
/// Returns [`BenchSetupError::ZeroValue`] when `count` is zero.
pub fn weighted_tree(
    count: usize,
    seed: u64,
) -> Result<(SelectionTree<usize>, Vec<TreeHandle>), BenchSetupError> {
    if count == 0 {
        return Err(BenchSetupError::ZeroValue {
            context: "selection tree size",
        });
    }
    let mut tree = SelectionTree::new();
    let handles = weights(count, seed)
        .into_iter()
        .enumerate()
        .map(|(index, weight)| tree.insert(index, weight))
        .collect();
    Ok((tree, handles))
}

/// Instance with degree-derived densities for `params`.
///
/// # Errors
/// Returns [`BenchSetupError::Graph`] when the layout is rejected.
pub fn instance(params: &GeneratorBenchParams) -> Result<InstanceParams, BenchSetupError> {
    Ok(InstanceParams::builder(params.nodes, params.clusters)
        .with_intra(IntraDensity::Degree(DEG_IN))
        .with_inter(InterDensity::Degree(DEG_OUT))
        .build()?)
}

/// Churn parameters for `params` with frequent large-scale operations.
#[must_use]
pub fn process(params: &GeneratorBenchParams) -> ProcessParams {
    ProcessParams {
        p_omega: 0.05,
        eta: params.eta,
        t_max: params.steps,
        ..ProcessParams::default()
    }
}

/// Builder seeded with [`SEED`].
#[must_use]
pub fn builder() -> GraphBuilder {
    GraphBuilder::new().with_rng_seed(SEED)
}
