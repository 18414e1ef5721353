//! Benchmark support crate for LDCR.
//!
//! Provides deterministic workloads and parameter types used by the
//! Criterion benchmarks for the weighted selection tree, the domain sampler
//! and whole generation runs.

pub mod error;
pub mod params;
pub mod workload;
