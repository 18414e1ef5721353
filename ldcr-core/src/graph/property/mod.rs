//! Property-based operation sequences for the dynamic clustered graph.

mod churn;
mod strategies;
mod types;
