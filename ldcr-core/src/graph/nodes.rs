//! Node insertion and removal.

use tracing::{debug, instrument};

use crate::{
    cluster::{ClusterId, ClusterRef},
    error::{GraphError, Result},
    journal::{GraphEvent, JournalSink},
    node::{Node, NodeId, OperationMark},
    random::RandomSource,
    sequences::binomial_gap_sequence,
};

use super::{DcrGraph, ordinary_mut};

impl<R, J> DcrGraph<R, J>
where
    R: RandomSource,
    J: JournalSink,
{
    /// Adds an isolated node to a ground-truth cluster drawn in proportion to
    /// the expected cluster sizes.
    ///
    /// Returns `None` when the graph has no cluster yet.
    ///
    /// # Errors
    /// Propagates structural contract failures as [`GraphError`].
    #[instrument(name = "graph.add_node", err, skip(self), fields(time_step = self.counters.time_step))]
    pub fn add_node(&mut self) -> Result<Option<NodeId>> {
        let Some(cluster) = self.propose_cluster_for_new_node()? else {
            return Ok(None);
        };
        let id = self.insert_node(cluster)?;
        self.count_small_operations(1);
        Ok(Some(id))
    }

    /// Adds an isolated node to the ground-truth cluster `cluster`.
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownCluster`] when `cluster` is not part of
    /// the ground-truth view.
    #[instrument(name = "graph.add_node_to", err, skip(self))]
    pub fn add_node_to(&mut self, cluster: ClusterId) -> Result<NodeId> {
        let id = self.insert_node(cluster)?;
        self.count_small_operations(1);
        Ok(id)
    }

    /// Adds a node and connects it to every other node independently, with
    /// `p_in` of its cluster inside and `p_out` outside.
    ///
    /// Returns the new node and its degree, or `None` when the graph has no
    /// cluster yet.
    ///
    /// # Errors
    /// Propagates structural contract failures as [`GraphError`].
    #[instrument(
        name = "graph.add_and_connect_node",
        err,
        skip(self),
        fields(time_step = self.counters.time_step)
    )]
    pub fn add_and_connect_node(&mut self) -> Result<Option<(NodeId, usize)>> {
        let Some(cluster) = self.propose_cluster_for_new_node()? else {
            return Ok(None);
        };
        let id = self.insert_node(cluster)?;
        let degree = self.connect_new_node(id, cluster)?;
        self.count_small_operations(1 + degree as u64);
        Ok(Some((id, degree)))
    }

    /// Removes a uniformly drawn node whose ground-truth cluster keeps at
    /// least one other node, together with its edges.
    ///
    /// Returns the removed node's former degree, or `None` when every cluster
    /// is down to a single node.
    ///
    /// # Errors
    /// Propagates structural contract failures as [`GraphError`].
    #[instrument(name = "graph.remove_node", err, skip(self), fields(time_step = self.counters.time_step))]
    pub fn remove_node(&mut self) -> Result<Option<usize>> {
        let total = self.pseudo.node_count();
        if total <= self.ground_truth.list().len() {
            debug!(nodes = total, "no node can be removed without emptying a cluster");
            return Ok(None);
        }
        let id = loop {
            let slot = self.random.next_below(total);
            let candidate = self
                .pseudo
                .node_at(slot)
                .ok_or_else(|| GraphError::invariant(format!("pseudo slot {slot} is empty")))?;
            let cluster = self.ground_truth_of(candidate)?;
            if self.cluster(cluster)?.node_count() > 1 {
                break candidate;
            }
        };
        let removed = self.delete_node(id)?;
        if let Some(degree) = removed {
            self.count_small_operations(1 + degree as u64);
        }
        Ok(removed)
    }

    /// Removes `id` and every edge touching it.
    ///
    /// Returns the removed degree, or `None` when `id` is the last node of
    /// its ground-truth cluster.
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownNode`] when `id` does not exist.
    #[instrument(name = "graph.remove_node_by_id", err, skip(self))]
    pub fn remove_node_by_id(&mut self, id: NodeId) -> Result<Option<usize>> {
        let removed = self.delete_node(id)?;
        if let Some(degree) = removed {
            self.count_small_operations(1 + degree as u64);
        }
        Ok(removed)
    }

    fn propose_cluster_for_new_node(&mut self) -> Result<Option<ClusterId>> {
        if self.ground_truth.list().len() == 0 {
            debug!("no ground-truth cluster to place a node in");
            return Ok(None);
        }
        self.ground_truth
            .propose_cluster_for_new_node(&mut self.random)
            .map(Some)
    }

    /// Creates a node in `cluster`, the pseudo cluster and, while `cluster`
    /// is locked, the reference cluster the running operation picks.
    pub(crate) fn insert_node(&mut self, cluster: ClusterId) -> Result<NodeId> {
        if !self.ground_truth.list().contains(cluster, &self.clusters) {
            return Err(GraphError::UnknownCluster {
                cluster: self.cluster_journal_id(cluster),
            });
        }
        let sequence = self.next_node_sequence();
        let id = self.nodes.insert(Node::new(sequence));
        let target = ordinary_mut(&mut self.clusters, cluster)?;
        let before = target.node_count() as u64;
        let operation = target.operation();
        target.add_node_locally(id, &mut self.nodes)?;
        self.pseudo.add_node(id, &mut self.nodes)?;
        self.counters.max_intra_edges += before;

        let reference = match operation.and_then(|op| self.operations.get(&op)) {
            Some(running) => {
                let (reference, side) =
                    running.reference_for_new_node(cluster, &self.clusters, &mut self.random);
                let operation = running.id();
                ordinary_mut(&mut self.clusters, reference)?.add_node_locally(id, &mut self.nodes)?;
                if let Some(node) = self.nodes.get_mut(id) {
                    node.mark = Some(OperationMark::new(operation, side));
                }
                let p_out = self.config.p_out;
                if let Some(running) = self.operations.get_mut(&operation) {
                    running.update_densities(&self.clusters, p_out);
                }
                reference
            }
            None => {
                self.ground_truth.notify_node_added();
                cluster
            }
        };

        self.refresh_weights(ClusterRef::Ordinary(cluster))?;
        self.refresh_weights(ClusterRef::Pseudo)?;
        let event = GraphEvent::CreateNode {
            cluster: self.cluster_journal_id(cluster),
            reference: self.cluster_journal_id(reference),
        };
        self.journal.record_graph(event);
        Ok(id)
    }

    /// Draws the partners of a fresh node and inserts the edges.
    fn connect_new_node(&mut self, id: NodeId, cluster: ClusterId) -> Result<usize> {
        let (own_slot, p_in, local) = {
            let home = self.cluster(cluster)?;
            (home.slot(id, &self.nodes)?, home.p_in(), home.node_count())
        };
        let outside = self.pseudo.node_count() - local;
        let intra = binomial_gap_sequence(p_in, local.saturating_sub(1) as u64, &mut self.random);
        let inter = binomial_gap_sequence(self.config.p_out, outside as u64, &mut self.random);

        let mut partners = Vec::with_capacity(intra.len() + inter.len());
        let home = self.cluster(cluster)?;
        for offset in intra {
            let mut slot = to_slot(offset)?;
            if slot >= own_slot {
                slot += 1;
            }
            partners.push(home.adjacency.node_at(slot).ok_or_else(|| {
                GraphError::invariant(format!("slot {slot} of the home cluster is empty"))
            })?);
        }

        let mut others = self
            .ground_truth
            .list()
            .clusters()
            .iter()
            .copied()
            .filter(|&other| other != cluster);
        let mut current = others.next();
        let mut skipped = 0;
        for offset in inter {
            let wanted = to_slot(offset)?;
            loop {
                let other = current
                    .ok_or_else(|| GraphError::invariant("inter-cluster offset out of range"))?;
                let other = self.cluster(other)?;
                if wanted < skipped + other.node_count() {
                    let partner = other.adjacency.node_at(wanted - skipped).ok_or_else(|| {
                        GraphError::invariant("inter-cluster partner slot is empty")
                    })?;
                    partners.push(partner);
                    break;
                }
                skipped += other.node_count();
                current = others.next();
            }
        }

        for &partner in &partners {
            self.insert_edge(id, partner)?;
        }
        Ok(partners.len())
    }

    /// Removes `id` with every incident edge from all stores.
    fn delete_node(&mut self, id: NodeId) -> Result<Option<usize>> {
        let cluster = self.ground_truth_of(id)?;
        if self.cluster(cluster)?.node_count() <= 1 {
            debug!(
                node = self.node_journal_id(id),
                "node is the last of its cluster, skipping removal"
            );
            return Ok(None);
        }
        let neighbours = self.neighbours(id)?;
        for &neighbour in &neighbours {
            self.delete_edge(id, neighbour)?;
        }

        let last_neighbours = match self.pseudo.last_node() {
            Some(last) if last != id => self.neighbours(last)?,
            _ => Vec::new(),
        };
        self.pseudo.remove_node(id, &mut self.nodes, &last_neighbours)?;

        let node = self.node(id)?;
        let reference = node.reference_cluster();
        let mark = node.operation_mark();
        let journal_id = node.journal_id();
        let home = ordinary_mut(&mut self.clusters, cluster)?;
        let before = home.node_count() as u64;
        let locked = home.is_locked();
        home.remove_node_locally(id, &mut self.nodes)?;
        if let Some(reference) = reference.filter(|&reference| reference != cluster) {
            ordinary_mut(&mut self.clusters, reference)?.remove_node_locally(id, &mut self.nodes)?;
        }
        self.counters.max_intra_edges -= before - 1;
        if !locked {
            self.ground_truth.notify_node_removed()?;
        }
        if let Some(mark) = mark {
            let p_out = self.config.p_out;
            if let Some(running) = self.operations.get_mut(&mark.operation()) {
                running.update_densities(&self.clusters, p_out);
            }
        }
        self.nodes.remove(id);

        self.refresh_weights(ClusterRef::Ordinary(cluster))?;
        self.refresh_weights(ClusterRef::Pseudo)?;
        self.journal
            .record_graph(GraphEvent::RemoveNode { node: journal_id });
        Ok(Some(neighbours.len()))
    }
}

fn to_slot(offset: u64) -> Result<usize> {
    usize::try_from(offset).map_err(|_| GraphError::invariant(format!("offset {offset} exceeds usize")))
}
