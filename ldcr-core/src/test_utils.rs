//! Shared test utilities for `ldcr-core`.

use ldcr_test_support::ci::property_test_profile::ProptestRunProfile;
use proptest::test_runner::Config as ProptestConfig;

use crate::{
    builder::GraphBuilder,
    graph::DcrGraph,
    journal::MemoryJournal,
    random::SeededRandom,
};

/// Builds a standard proptest configuration from the shared CI profile.
///
/// This keeps property suites aligned on the same `PROGTEST_CASES` and
/// `LDCR_PBT_FORK` interpretation.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

/// Graph type used throughout the unit tests.
pub(crate) type TestGraph = DcrGraph<SeededRandom, MemoryJournal>;

/// Builds an Erdős–Rényi initialised graph with the given cluster layout.
pub(crate) fn erdos_renyi_graph(
    sizes: &[usize],
    p_in: f64,
    p_out: f64,
    seed: u64,
) -> TestGraph {
    let mut graph = GraphBuilder::new()
        .with_p_out(p_out)
        .with_theta(0.25)
        .with_rng_seed(seed)
        .build()
        .expect("test parameters must be valid");
    let p_in_list = vec![p_in; sizes.len()];
    graph
        .init_erdos_renyi(sizes, &p_in_list)
        .expect("initialisation must succeed");
    graph
}
