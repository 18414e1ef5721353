//! Time steps and operation completion.

use tracing::{info, instrument};

use crate::{
    error::Result,
    journal::{ClusteringEvent, GraphEvent, JournalSink},
    operation::{OperationClusters, OperationId},
    random::RandomSource,
};

use super::{DcrGraph, record_finished_operation, record_graph_size};

impl<R, J> DcrGraph<R, J>
where
    R: RandomSource,
    J: JournalSink,
{
    /// Closes the current time step in both journals.
    pub fn next_time_step(&mut self) {
        self.counters.time_step += 1;
        self.journal.record_graph(GraphEvent::NextStep);
        self.journal.record_clustering(ClusteringEvent::NextStep);
        record_graph_size(self.pseudo.node_count(), self.pseudo.edge_count());
    }

    /// Finishes every running operation whose crossing-edge count reached
    /// its threshold, moving the reference view onto the new clusters.
    ///
    /// Returns the number of operations finished.
    ///
    /// # Errors
    /// Propagates structural contract failures as [`GraphError`].
    ///
    /// [`GraphError`]: crate::GraphError
    #[instrument(
        name = "graph.check_operations",
        err,
        skip(self),
        fields(time_step = self.counters.time_step)
    )]
    pub fn check_operations_for_completeness(&mut self) -> Result<usize> {
        let theta = self.config.theta;
        let complete: Vec<OperationId> = self
            .operations
            .iter_mut()
            .filter_map(|(&id, operation)| operation.is_complete(theta).then_some(id))
            .collect();
        for &id in &complete {
            let Some(mut operation) = self.operations.remove(&id) else {
                continue;
            };
            match operation.clusters() {
                OperationClusters::Split {
                    initial,
                    first,
                    second,
                } => self.finish_split(initial, first, second)?,
                OperationClusters::Merge {
                    first,
                    second,
                    merged,
                } => self.finish_merge(first, second, merged)?,
            }
            operation.set_finished();
            self.counters.finished_operations += 1;
            record_finished_operation();
            info!(
                operation = %id,
                kind = ?operation.kind(),
                crossing = operation.crossing_edges(),
                "operation finished"
            );
        }
        Ok(complete.len())
    }
}
