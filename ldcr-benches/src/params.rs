//! Benchmark parameter types.
//!
//! Each type renders as a compact Criterion benchmark identifier.

use std::fmt;

/// Parameters for a selection-tree or sampler benchmark.
#[derive(Clone, Copy, Debug)]
pub struct StructureBenchParams {
    /// Number of entries, or the sampler domain size.
    pub size: usize,
}

impl fmt::Display for StructureBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={}", self.size)
    }
}

/// Parameters for a whole-generation benchmark.
#[derive(Clone, Copy, Debug)]
pub struct GeneratorBenchParams {
    /// Initial node count.
    pub nodes: usize,
    /// Initial ground-truth cluster count.
    pub clusters: usize,
    /// Small-scale operations per time step.
    pub eta: u64,
    /// Time steps per run.
    pub steps: u64,
}

impl fmt::Display for GeneratorBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n={},k={},eta={},t={}",
            self.nodes, self.clusters, self.eta, self.steps
        )
    }
}
