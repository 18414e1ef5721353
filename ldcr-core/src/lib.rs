//! LDCR core library: a dynamic clustered random-graph generator.
//!
//! A [`DcrGraph`] evolves over discrete time steps through node and edge
//! churn plus cluster splits and merges, keeping a ground-truth clustering
//! and a lagging reference clustering side by side. [`Generator`] drives the
//! graph from user-level [`InstanceParams`] and [`ProcessParams`].
#![cfg_attr(docsrs, feature(doc_cfg))]

mod adjacency;
mod arena;
mod builder;
mod cluster;
mod clustering;
mod edge;
mod error;
mod generator;
mod graph;
mod invariants;
mod journal;
mod node;
mod operation;
mod pair_index;
mod random;
mod sampler;
mod selection_tree;
mod sequences;

pub use crate::{
    arena::Id,
    builder::{DEFAULT_SEED, GraphBuilder, PInSampler},
    cluster::{ClusterId, OrdinaryCluster},
    clustering::View,
    edge::{Edge, EdgeKind},
    error::{GraphError, GraphErrorCode, Result},
    generator::{
        ClusterSizes, GenerationSummary, Generator, InstanceParams, InstanceParamsBuilder,
        InterDensity, IntraDensity, ProcessParams, run_batch,
    },
    graph::DcrGraph,
    invariants::{GraphInvariant, GraphInvariantChecker, GraphInvariantViolation, TreeKind},
    journal::{ClusteringEvent, GraphEvent, JournalSink, MemoryJournal, NullJournal},
    node::{Node, NodeId, OperationMark, Side},
    operation::{OperationId, OperationKind, OperationState, OperationStatus},
    pair_index::{edge_index, max_edge_count, node_indices, pair_from_index, pair_index},
    random::{RandomSource, SeededRandom, derive_run_seed},
    sampler::DomainSampler,
    selection_tree::{SelectionTree, TreeHandle},
    sequences::binomial_gap_sequence,
};

#[cfg(test)]
mod test_utils;
