//! Replays generated operation sequences and revalidates the graph after
//! every step.

use proptest::test_runner::{TestCaseError, TestCaseResult};
use tracing::debug;

use super::types::{GraphFixture, GraphOperationSeed, GraphPlan};
use crate::{builder::GraphBuilder, error::GraphError, test_utils::TestGraph};

pub(super) fn run_graph_plan(plan: &GraphPlan) -> TestCaseResult {
    let mut graph = build_fixture(&plan.fixture)?;
    validate(&graph, "initialisation")?;

    for (step, &operation) in plan.operations.iter().enumerate() {
        let applied = apply(&mut graph, operation)
            .map_err(|err| TestCaseError::fail(format!("step {step} ({operation:?}) failed: {err}")))?;
        debug!(step, ?operation, applied, "graph property step");
        validate(&graph, &format!("step {step} ({operation:?})"))?;
    }
    Ok(())
}

/// Builds and seeds the graph described by `fixture`.
pub(super) fn build_fixture(fixture: &GraphFixture) -> Result<TestGraph, TestCaseError> {
    let mut graph = GraphBuilder::new()
        .with_p_out(fixture.p_out)
        .with_theta(fixture.theta)
        .with_rng_seed(fixture.seed)
        .build()
        .map_err(|err| TestCaseError::fail(format!("builder rejected {fixture:?}: {err}")))?;
    graph
        .init_erdos_renyi(&fixture.sizes, &fixture.p_in)
        .map_err(|err| TestCaseError::fail(format!("init rejected {fixture:?}: {err}")))?;
    Ok(graph)
}

fn apply(graph: &mut TestGraph, operation: GraphOperationSeed) -> Result<bool, GraphError> {
    let applied = match operation {
        GraphOperationSeed::AddEdge => graph.add_edge()?.is_some(),
        GraphOperationSeed::RemoveEdge => graph.remove_edge()?.is_some(),
        GraphOperationSeed::EdgeStep => {
            if graph.shall_do_edge_insertion() {
                graph.add_edge()?.is_some()
            } else {
                graph.remove_edge()?.is_some()
            }
        }
        GraphOperationSeed::AddNode => graph.add_node()?.is_some(),
        GraphOperationSeed::AddAndConnectNode => graph.add_and_connect_node()?.is_some(),
        GraphOperationSeed::RemoveNode => graph.remove_node()?.is_some(),
        GraphOperationSeed::Split => graph.split()?.is_some(),
        GraphOperationSeed::Merge => graph.merge()?.is_some(),
        GraphOperationSeed::NextTimeStep => {
            let finished = graph.check_operations_for_completeness()?;
            graph.next_time_step();
            finished > 0
        }
    };
    Ok(applied)
}

fn validate(graph: &TestGraph, context: &str) -> TestCaseResult {
    graph
        .invariants()
        .check_all()
        .map_err(|err| TestCaseError::fail(format!("invariants failed after {context}: {err}")))?;

    let intra = graph.intra_edge_count();
    let inter = graph.inter_edge_count();
    if intra + inter != graph.edge_count() {
        return Err(TestCaseError::fail(format!(
            "after {context}: {intra} intra + {inter} inter != {} edges",
            graph.edge_count()
        )));
    }
    let listed = graph.edges().count() as u64;
    if listed != graph.edge_count() {
        return Err(TestCaseError::fail(format!(
            "after {context}: iterated {listed} edges, counted {}",
            graph.edge_count()
        )));
    }
    if graph.running_operations().is_empty() != graph.clusterings_agree() {
        return Err(TestCaseError::fail(format!(
            "after {context}: clusterings agree = {}, running operations = {}",
            graph.clusterings_agree(),
            graph.running_operations().len()
        )));
    }
    for &cluster in graph.ground_truth_clusters() {
        let size = graph
            .cluster(cluster)
            .map_err(|err| TestCaseError::fail(format!("after {context}: {err}")))?
            .node_count();
        if size == 0 {
            return Err(TestCaseError::fail(format!(
                "after {context}: ground-truth cluster emptied"
            )));
        }
    }
    Ok(())
}
