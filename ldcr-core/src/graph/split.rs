//! Splitting one ground-truth cluster into two.

use tracing::{debug, info, instrument};

use crate::{
    cluster::{ClusterId, ClusterRef},
    edge::{Edge, EdgeKind},
    error::{GraphError, Result},
    journal::{ClusteringEvent, GraphEvent, JournalSink},
    node::{NodeId, OperationMark, Side},
    operation::{
        ClusterOperation, OperationClusters, OperationId, sample_expected_size, sample_p_in,
    },
    random::RandomSource,
};

use super::{DcrGraph, ordinary_mut, record_large_operation};

impl<R, J> DcrGraph<R, J>
where
    R: RandomSource,
    J: JournalSink,
{
    /// Starts splitting a random unlocked cluster holding at least two nodes.
    ///
    /// Returns `None` when no cluster is eligible.
    ///
    /// # Errors
    /// Propagates structural contract failures as [`GraphError`].
    #[instrument(name = "graph.split", err, skip(self), fields(time_step = self.counters.time_step))]
    pub fn split(&mut self) -> Result<Option<OperationId>> {
        let Some(initial) = self
            .ground_truth
            .propose_cluster_for_split(&self.clusters, &mut self.random)
        else {
            debug!("no cluster eligible for a split");
            return Ok(None);
        };
        self.split_cluster(initial)
    }

    /// Starts splitting `initial`.
    ///
    /// The nodes move to two fresh ground-truth clusters at once; the
    /// reference view keeps `initial` until few enough edges cross the two
    /// halves. Returns `None` when `initial` holds fewer than two nodes.
    ///
    /// # Errors
    /// Returns [`GraphError::ClusterLocked`] when another operation owns
    /// `initial` and [`GraphError::UnknownCluster`] when it is not part of
    /// the ground-truth view.
    #[instrument(name = "graph.split_cluster", err, skip(self))]
    pub fn split_cluster(&mut self, initial: ClusterId) -> Result<Option<OperationId>> {
        let (own_p_in, own_size, members) = {
            let cluster = self.cluster(initial)?;
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
            (cluster.p_in(), cluster.expected_size(), cluster.nodes().to_vec())
        };
        if members.len() < 2 {
            debug!(cluster = self.cluster_journal_id(initial), "cluster too small to split");
            return Ok(None);
        }

        let operation_id = self.next_operation_id();
        let sampler = self.config.p_in_sampler;
        let p_out = self.config.p_out;
        let p_in_values = self.ground_truth.list().p_in_values().to_vec();
        let sizes = self.ground_truth.list().expected_sizes().to_vec();
        let first_p_in = sample_p_in(sampler, Some(own_p_in), &p_in_values, p_out, &mut self.random);
        let second_p_in = sample_p_in(sampler, Some(own_p_in), &p_in_values, p_out, &mut self.random);
        let first_size = sample_expected_size(&sizes, own_size, &mut self.random);
        let second_size = sample_expected_size(&sizes, own_size, &mut self.random);

        let stored = self.stored_edges(initial)?;
        self.leave_ground_truth(initial)?;
        let first = self.create_cluster(first_p_in, first_size);
        let second = self.create_cluster(second_p_in, second_size);

        let mut assigned = (Vec::new(), Vec::new());
        for (position, &id) in members.iter().enumerate() {
            let side = match position {
                0 => Side::First,
                1 => Side::Second,
                _ if self.random.next_below(first_size + second_size) < first_size => Side::First,
                _ => Side::Second,
            };
            let target = if side == Side::First { first } else { second };
            ordinary_mut(&mut self.clusters, target)?.add_node_locally(id, &mut self.nodes)?;
            if let Some(node) = self.nodes.get_mut(id) {
                node.mark = Some(OperationMark::new(operation_id, side));
            }
            match side {
                Side::First => assigned.0.push(id),
                Side::Second => assigned.1.push(id),
            }
        }
        self.enter_ground_truth(first)?;
        self.enter_ground_truth(second)?;
        self.ground_truth.lock(first, operation_id, &mut self.clusters)?;
        self.ground_truth.lock(second, operation_id, &mut self.clusters)?;
        let retired = ordinary_mut(&mut self.clusters, initial)?;
        retired.operation = Some(operation_id);
        retired.clear_edges();

        let crossing = self.restore_split_edges(&stored, first, second)?;
        self.refresh_weights(ClusterRef::Ordinary(first))?;
        self.refresh_weights(ClusterRef::Ordinary(second))?;
        self.refresh_weights(ClusterRef::Pseudo)?;

        let mut operation = ClusterOperation::new(
            operation_id,
            OperationClusters::Split {
                initial,
                first,
                second,
            },
            own_p_in,
        );
        operation.update_densities(&self.clusters, p_out);
        operation.set_running(crossing);
        self.operations.insert(operation_id, operation);

        self.journal.record_clustering(ClusteringEvent::Split {
            initial: self.cluster_journal_id(initial),
            first: self.cluster_journal_id(first),
            second: self.cluster_journal_id(second),
        });
        for (&id, cluster) in assigned
            .0
            .iter()
            .map(|id| (id, first))
            .chain(assigned.1.iter().map(|id| (id, second)))
        {
            let event = GraphEvent::SetCluster {
                node: self.node_journal_id(id),
                cluster: self.cluster_journal_id(cluster),
            };
            self.journal.record_graph(event);
        }

        self.counters.large_operations += 1;
        record_large_operation();
        info!(
            operation = %operation_id,
            initial = self.cluster_journal_id(initial),
            first_size = assigned.0.len(),
            second_size = assigned.1.len(),
            crossing,
            "split started"
        );
        Ok(Some(operation_id))
    }

    /// Commits a complete split to the reference view.
    pub(crate) fn finish_split(
        &mut self,
        initial: ClusterId,
        first: ClusterId,
        second: ClusterId,
    ) -> Result<()> {
        let members: Vec<NodeId> = self
            .cluster(first)?
            .nodes()
            .iter()
            .chain(self.cluster(second)?.nodes())
            .copied()
            .collect();
        for &id in &members {
            if let Some(node) = self.nodes.get_mut(id) {
                node.mark = None;
            }
        }
        self.ground_truth.unlock(first, &mut self.clusters);
        self.ground_truth.unlock(second, &mut self.clusters);
        self.reference.remove(initial, &mut self.clusters, &mut self.nodes)?;
        self.reference.add(first, &mut self.clusters, &mut self.nodes)?;
        self.reference.add(second, &mut self.clusters, &mut self.nodes)?;

        self.journal.record_clustering(ClusteringEvent::SplitDone {
            initial: self.cluster_journal_id(initial),
            first: self.cluster_journal_id(first),
            second: self.cluster_journal_id(second),
        });
        for &id in &members {
            let cluster = self.node(id)?.reference_cluster().ok_or_else(|| {
                GraphError::invariant(format!(
                    "node {} left a finished split without a reference cluster",
                    self.node_journal_id(id)
                ))
            })?;
            let event = GraphEvent::SetRefCluster {
                node: self.node_journal_id(id),
                cluster: self.cluster_journal_id(cluster),
            };
            self.journal.record_graph(event);
        }
        self.clusters.remove(initial);
        Ok(())
    }

    /// Canonical intra-cluster edges of `cluster` followed by its outgoing
    /// inter-cluster twins.
    pub(crate) fn stored_edges(&self, cluster: ClusterId) -> Result<(Vec<Edge>, Vec<Edge>)> {
        let store = &self.cluster(cluster)?.adjacency;
        Ok((store.intra_edges().collect(), store.inter_edges().collect()))
    }

    /// Re-adds the edges of a split cluster to its two halves and returns
    /// how many of them now cross the halves.
    fn restore_split_edges(
        &mut self,
        (intra, inter): &(Vec<Edge>, Vec<Edge>),
        first: ClusterId,
        second: ClusterId,
    ) -> Result<u64> {
        let mut crossing = 0;
        for &edge in intra {
            let home = self.ground_truth_of(edge.source())?;
            let away = self.ground_truth_of(edge.target())?;
            if home == away {
                ordinary_mut(&mut self.clusters, home)?.add_intra_edge(edge, &self.nodes)?;
            } else {
                ordinary_mut(&mut self.clusters, home)?.add_inter_twin(edge, &self.nodes)?;
                ordinary_mut(&mut self.clusters, away)?.add_inter_twin(edge.reversed(), &self.nodes)?;
                self.pseudo.update_status(edge, EdgeKind::Inter);
                crossing += 1;
            }
        }
        for &edge in inter {
            let home = self.ground_truth_of(edge.source())?;
            if home != first && home != second {
                return Err(GraphError::invariant(format!(
                    "twin {edge:?} left the split cluster"
                )));
            }
            ordinary_mut(&mut self.clusters, home)?.add_inter_twin(edge, &self.nodes)?;
        }
        Ok(crossing)
    }
}
