//! Merging two ground-truth clusters into one.

use tracing::{debug, info, instrument};

use crate::{
    cluster::{ClusterId, ClusterRef},
    edge::{Edge, EdgeKind},
    error::{GraphError, Result},
    journal::{ClusteringEvent, GraphEvent, JournalSink},
    node::{NodeId, OperationMark, Side},
    operation::{
        ClusterOperation, OperationClusters, OperationId, sample_merged_size, sample_p_in,
    },
    random::RandomSource,
};

use super::{DcrGraph, ordinary_mut, record_large_operation};

/// Edges of two clusters about to merge, sorted by how they are restored.
struct MergeEdges {
    intra: Vec<Edge>,
    crossing: Vec<Edge>,
    outgoing: Vec<Edge>,
}

impl<R, J> DcrGraph<R, J>
where
    R: RandomSource,
    J: JournalSink,
{
    /// Starts merging two distinct random unlocked clusters.
    ///
    /// Returns `None` when fewer than two clusters are unlocked.
    ///
    /// # Errors
    /// Propagates structural contract failures as [`GraphError`].
    #[instrument(name = "graph.merge", err, skip(self), fields(time_step = self.counters.time_step))]
    pub fn merge(&mut self) -> Result<Option<OperationId>> {
        let Some((first, second)) = self.ground_truth.propose_clusters_for_merge(&mut self.random)
        else {
            debug!("fewer than two unlocked clusters, no merge possible");
            return Ok(None);
        };
        self.merge_clusters(first, second).map(Some)
    }

    /// Starts merging `first` and `second`.
    ///
    /// The nodes move to one fresh ground-truth cluster at once; the
    /// reference view keeps both initial clusters until enough edges cross
    /// between them.
    ///
    /// # Errors
    /// Returns [`GraphError::ClusterLocked`] when an operation owns either
    /// cluster, [`GraphError::UnknownCluster`] when either is not part of
    /// the ground-truth view and [`GraphError::InvalidParameters`] when both
    /// handles name the same cluster.
    #[instrument(name = "graph.merge_clusters", err, skip(self))]
    pub fn merge_clusters(&mut self, first: ClusterId, second: ClusterId) -> Result<OperationId> {
        if first == second {
            return Err(GraphError::invalid("a cluster cannot merge with itself"));
        }
        for id in [first, second] {
            let cluster = self.cluster(id)?;
            if !cluster.in_ground_truth() {
                return Err(GraphError::UnknownCluster {
                    cluster: cluster.journal_id(),
                });
            }
            if cluster.is_locked() {
                return Err(GraphError::ClusterLocked {
                    cluster: cluster.journal_id(),
                });
            }
        }

        let operation_id = self.next_operation_id();
        let p_out = self.config.p_out;
        let sizes = self.ground_truth.list().expected_sizes().to_vec();
        let p_in_values = self.ground_truth.list().p_in_values().to_vec();
        let expected_size = sample_merged_size(&sizes, &mut self.random);
        let p_in = sample_p_in(self.config.p_in_sampler, None, &p_in_values, p_out, &mut self.random);

        let edges = self.merge_edges(first, second)?;
        let first_members = self.cluster(first)?.nodes().to_vec();
        let second_members = self.cluster(second)?.nodes().to_vec();
        self.leave_ground_truth(first)?;
        self.leave_ground_truth(second)?;
        let merged = self.create_cluster(p_in, expected_size);

        let sided = first_members
            .iter()
            .map(|&id| (id, Side::Second))
            .chain(second_members.iter().map(|&id| (id, Side::First)));
        for (id, side) in sided {
            ordinary_mut(&mut self.clusters, merged)?.add_node_locally(id, &mut self.nodes)?;
            if let Some(node) = self.nodes.get_mut(id) {
                node.mark = Some(OperationMark::new(operation_id, side));
            }
        }
        self.enter_ground_truth(merged)?;
        self.ground_truth.lock(merged, operation_id, &mut self.clusters)?;
        for id in [first, second] {
            let retired = ordinary_mut(&mut self.clusters, id)?;
            retired.operation = Some(operation_id);
            retired.clear_edges();
        }

        let crossing = self.restore_merge_edges(&edges, merged)?;
        self.refresh_weights(ClusterRef::Ordinary(merged))?;
        self.refresh_weights(ClusterRef::Pseudo)?;

        let mut operation = ClusterOperation::new(
            operation_id,
            OperationClusters::Merge {
                first,
                second,
                merged,
            },
            p_in,
        );
        operation.update_densities(&self.clusters, p_out);
        operation.set_running(crossing);
        self.operations.insert(operation_id, operation);

        self.journal.record_clustering(ClusteringEvent::Merge {
            first: self.cluster_journal_id(first),
            second: self.cluster_journal_id(second),
            merged: self.cluster_journal_id(merged),
        });
        for &id in first_members.iter().chain(&second_members) {
            let event = GraphEvent::SetCluster {
                node: self.node_journal_id(id),
                cluster: self.cluster_journal_id(merged),
            };
            self.journal.record_graph(event);
        }

        self.counters.large_operations += 1;
        record_large_operation();
        info!(
            operation = %operation_id,
            first = self.cluster_journal_id(first),
            second = self.cluster_journal_id(second),
            crossing,
            "merge started"
        );
        Ok(operation_id)
    }

    /// Commits a complete merge to the reference view.
    pub(crate) fn finish_merge(
        &mut self,
        first: ClusterId,
        second: ClusterId,
        merged: ClusterId,
    ) -> Result<()> {
        let members: Vec<NodeId> = self.cluster(merged)?.nodes().to_vec();
        for &id in &members {
            if let Some(node) = self.nodes.get_mut(id) {
                node.mark = None;
            }
        }
        self.ground_truth.unlock(merged, &mut self.clusters);
        self.reference.remove(first, &mut self.clusters, &mut self.nodes)?;
        self.reference.remove(second, &mut self.clusters, &mut self.nodes)?;
        self.reference.add(merged, &mut self.clusters, &mut self.nodes)?;

        self.journal.record_clustering(ClusteringEvent::MergeDone {
            first: self.cluster_journal_id(first),
            second: self.cluster_journal_id(second),
            merged: self.cluster_journal_id(merged),
        });
        for &id in &members {
            let event = GraphEvent::SetRefCluster {
                node: self.node_journal_id(id),
                cluster: self.cluster_journal_id(merged),
            };
            self.journal.record_graph(event);
        }
        self.clusters.remove(first);
        self.clusters.remove(second);
        Ok(())
    }

    fn merge_edges(&self, first: ClusterId, second: ClusterId) -> Result<MergeEdges> {
        let (mut intra, first_outgoing) = self.stored_edges(first)?;
        let (second_intra, second_outgoing) = self.stored_edges(second)?;
        intra.extend(second_intra);
        let mut crossing = Vec::new();
        let mut outgoing = Vec::new();
        for edge in first_outgoing {
            if self.ground_truth_of(edge.target())? == second {
                crossing.push(edge);
            } else {
                outgoing.push(edge);
            }
        }
        for edge in second_outgoing {
            if self.ground_truth_of(edge.target())? != first {
                outgoing.push(edge);
            }
        }
        Ok(MergeEdges {
            intra,
            crossing,
            outgoing,
        })
    }

    /// Re-adds the edges of two merging clusters to the merged cluster and
    /// returns how many ran between them.
    fn restore_merge_edges(&mut self, edges: &MergeEdges, merged: ClusterId) -> Result<u64> {
        let target = ordinary_mut(&mut self.clusters, merged)?;
        for &edge in edges.intra.iter().chain(&edges.crossing) {
            target.add_intra_edge(edge, &self.nodes)?;
        }
        for &edge in &edges.outgoing {
            target.add_inter_twin(edge, &self.nodes)?;
        }
        for &edge in &edges.crossing {
            self.pseudo.update_status(edge, EdgeKind::Intra);
        }
        Ok(edges.crossing.len() as u64)
    }
}
