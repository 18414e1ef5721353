//! Erdős–Rényi style seeding of an empty graph.

use tracing::{info, instrument};

use crate::{
    cluster::ClusterId,
    error::{GraphError, Result},
    journal::JournalSink,
    node::NodeId,
    pair_index::{max_edge_count, pair_from_index},
    random::RandomSource,
    sequences::binomial_gap_sequence,
};

use super::DcrGraph;

impl<R, J> DcrGraph<R, J>
where
    R: RandomSource,
    J: JournalSink,
{
    /// Seeds an empty graph with one cluster per entry of `sizes`.
    ///
    /// Every cluster first receives one node; the remaining nodes are placed
    /// in proportion to the expected sizes, so the realised sizes only match
    /// `sizes` in expectation. Each pair inside cluster `c` becomes an edge
    /// with probability `p_in_list[c]`, each pair across clusters with
    /// probability `p_out`.
    ///
    /// # Errors
    /// Returns [`GraphError::InvalidParameters`] when the graph is not
    /// empty, the lists are empty or differ in length, a size is zero, or a
    /// probability lies outside `[p_out, 1]`.
    #[instrument(name = "graph.init_erdos_renyi", err, skip(self, sizes, p_in_list), fields(clusters = sizes.len()))]
    pub fn init_erdos_renyi(&mut self, sizes: &[usize], p_in_list: &[f64]) -> Result<()> {
        self.validate_initial_clustering(sizes, p_in_list)?;

        let mut created = Vec::with_capacity(sizes.len());
        for (&size, &p_in) in sizes.iter().zip(p_in_list) {
            let id = self.create_cluster(p_in, size);
            self.enter_ground_truth(id)?;
            self.reference.add(id, &mut self.clusters, &mut self.nodes)?;
            created.push(id);
        }
        for &id in &created {
            self.insert_node(id)?;
        }
        let total: usize = sizes.iter().sum();
        for _ in created.len()..total {
            let cluster = self.ground_truth.propose_cluster_for_new_node(&mut self.random)?;
            self.insert_node(cluster)?;
        }

        for &id in &created {
            self.seed_intra_edges(id)?;
        }
        for (position, &first) in created.iter().enumerate() {
            for &second in created.iter().skip(position + 1) {
                self.seed_inter_edges(first, second)?;
            }
        }
        info!(
            nodes = self.pseudo.node_count(),
            edges = self.pseudo.edge_count(),
            "graph initialised"
        );
        Ok(())
    }

    fn validate_initial_clustering(&self, sizes: &[usize], p_in_list: &[f64]) -> Result<()> {
        if self.pseudo.node_count() > 0 || !self.clusters.is_empty() {
            return Err(GraphError::invalid("graph is already initialised"));
        }
        if sizes.is_empty() {
            return Err(GraphError::invalid("at least one cluster is required"));
        }
        if sizes.len() != p_in_list.len() {
            return Err(GraphError::invalid(format!(
                "{} cluster sizes but {} intra probabilities",
                sizes.len(),
                p_in_list.len()
            )));
        }
        if sizes.contains(&0) {
            return Err(GraphError::invalid("cluster sizes must be at least 1"));
        }
        let p_out = self.config.p_out;
        if let Some(p_in) = p_in_list
            .iter()
            .find(|&&p_in| !(p_out..=1.0).contains(&p_in))
        {
            return Err(GraphError::invalid(format!(
                "intra probability {p_in} lies outside [{p_out}, 1]"
            )));
        }
        Ok(())
    }

    fn seed_intra_edges(&mut self, id: ClusterId) -> Result<()> {
        let (members, p_in) = {
            let cluster = self.cluster(id)?;
            (cluster.nodes().to_vec(), cluster.p_in())
        };
        let pairs = max_edge_count(members.len() as u64);
        for index in binomial_gap_sequence(p_in, pairs, &mut self.random) {
            let (high, low) = pair_from_index(index);
            self.insert_edge(member(&members, high)?, member(&members, low)?)?;
        }
        Ok(())
    }

    fn seed_inter_edges(&mut self, first: ClusterId, second: ClusterId) -> Result<()> {
        let left = self.cluster(first)?.nodes().to_vec();
        let right = self.cluster(second)?.nodes().to_vec();
        let width = right.len() as u64;
        let pairs = left.len() as u64 * width;
        for index in binomial_gap_sequence(self.config.p_out, pairs, &mut self.random) {
            self.insert_edge(member(&left, index / width)?, member(&right, index % width)?)?;
        }
        Ok(())
    }
}

fn member(members: &[NodeId], position: u64) -> Result<NodeId> {
    usize::try_from(position)
        .ok()
        .and_then(|position| members.get(position).copied())
        .ok_or_else(|| GraphError::invariant(format!("member position {position} out of range")))
}
