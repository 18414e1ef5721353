//! Strategies sampling graph fixtures and operation plans.

use proptest::{collection::vec, prelude::*};

use super::types::{GraphFixture, GraphOperationSeed, GraphPlan};

const MAX_CLUSTERS: usize = 5;
const MAX_CLUSTER_SIZE: usize = 9;
const MAX_STEPS: usize = 64;

/// Samples a fixture whose intra probabilities never fall below `p_out`.
pub(super) fn graph_fixture_strategy() -> impl Strategy<Value = GraphFixture> {
    (
        vec(1_usize..=MAX_CLUSTER_SIZE, 1..=MAX_CLUSTERS),
        0.0_f64..=0.3,
        0.0_f64..=1.0,
        any::<u64>(),
    )
        .prop_flat_map(|(sizes, p_out, theta, seed)| {
            let clusters = sizes.len();
            (
                Just(sizes),
                vec(p_out..=1.0, clusters),
                Just(p_out),
                Just(theta),
                Just(seed),
            )
        })
        .prop_map(|(sizes, p_in, p_out, theta, seed)| GraphFixture {
            sizes,
            p_in,
            p_out,
            theta,
            seed,
        })
}

/// Samples a fixture together with a sequence of operations.
pub(super) fn graph_plan_strategy() -> impl Strategy<Value = GraphPlan> {
    (
        graph_fixture_strategy(),
        vec(any::<GraphOperationSeed>(), 1..=MAX_STEPS),
    )
        .prop_map(|(fixture, operations)| GraphPlan {
            fixture,
            operations,
        })
}
