//! Derivation of the initial clustering from user-level knobs.

use crate::{
    builder::check_probability,
    error::{GraphError, Result},
};

/// How the initial cluster sizes are chosen.
#[derive(Clone, Debug, PartialEq)]
pub enum ClusterSizes {
    /// Sizes follow `(i/k)^(1/beta)` increments; `beta = 1` yields equal
    /// clusters and larger values skew mass toward the first clusters.
    Skewed {
        /// Skew exponent, strictly positive.
        beta: f64,
    },
    /// Explicit sizes, one per cluster.
    Explicit(Vec<usize>),
}

/// Source of the intra-cluster edge probabilities.
#[derive(Clone, Debug, PartialEq)]
pub enum IntraDensity {
    /// One probability shared by every cluster.
    Probability(f64),
    /// One probability per cluster.
    Probabilities(Vec<f64>),
    /// Expected intra-cluster degree shared by every cluster.
    Degree(f64),
    /// Expected intra-cluster degree per cluster.
    Degrees(Vec<f64>),
}

/// Source of the inter-cluster edge probability.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InterDensity {
    /// Probability of each pair across clusters.
    Probability(f64),
    /// Expected number of inter-cluster neighbours per node.
    Degree(f64),
}

/// Validated initial clustering handed to
/// [`crate::DcrGraph::init_erdos_renyi`].
///
/// # Examples
/// ```
/// use ldcr_core::InstanceParams;
///
/// let params = InstanceParams::builder(10, 3).build()?;
/// assert_eq!(params.sizes(), &[4, 3, 3]);
/// assert_eq!(params.nodes(), 10);
/// # Ok::<(), ldcr_core::GraphError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct InstanceParams {
    sizes: Vec<usize>,
    p_in: Vec<f64>,
    p_out: f64,
}

impl InstanceParams {
    /// Starts a builder for `nodes` nodes in `clusters` clusters.
    ///
    /// Defaults: equal-sized clusters (`beta = 1`), `p_in = 0.1` and
    /// `p_out = 0.01`.
    #[must_use]
    pub fn builder(nodes: usize, clusters: usize) -> InstanceParamsBuilder {
        InstanceParamsBuilder {
            nodes: Some(nodes),
            clusters,
            sizes: ClusterSizes::Skewed { beta: 1.0 },
            intra: IntraDensity::Probability(0.1),
            inter: InterDensity::Probability(0.01),
        }
    }

    /// Initial cluster sizes.
    #[must_use]
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Intra-cluster probability per cluster.
    #[must_use]
    pub fn p_in(&self) -> &[f64] {
        &self.p_in
    }

    /// Inter-cluster probability.
    #[must_use]
    pub const fn p_out(&self) -> f64 {
        self.p_out
    }

    /// Total number of nodes.
    #[must_use]
    pub fn nodes(&self) -> usize {
        self.sizes.iter().sum()
    }

    /// Number of clusters.
    #[must_use]
    pub fn clusters(&self) -> usize {
        self.sizes.len()
    }
}

impl Default for InstanceParams {
    fn default() -> Self {
        Self {
            sizes: vec![30, 30],
            p_in: vec![0.1, 0.1],
            p_out: 0.01,
        }
    }
}

/// Consuming builder for [`InstanceParams`].
#[derive(Clone, Debug)]
pub struct InstanceParamsBuilder {
    nodes: Option<usize>,
    clusters: usize,
    sizes: ClusterSizes,
    intra: IntraDensity,
    inter: InterDensity,
}

impl InstanceParamsBuilder {
    /// Uses skewed sizes with exponent `beta`.
    #[must_use]
    pub fn with_skew(mut self, beta: f64) -> Self {
        self.sizes = ClusterSizes::Skewed { beta };
        self
    }

    /// Uses explicit sizes. The cluster count becomes the list length.
    #[must_use]
    pub fn with_cluster_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.clusters = sizes.len();
        self.sizes = ClusterSizes::Explicit(sizes);
        self
    }

    /// Drops the node count so explicit sizes define it.
    #[must_use]
    pub fn without_node_count(mut self) -> Self {
        self.nodes = None;
        self
    }

    /// Selects the intra-cluster density source.
    #[must_use]
    pub fn with_intra(mut self, intra: IntraDensity) -> Self {
        self.intra = intra;
        self
    }

    /// Selects the inter-cluster density source.
    #[must_use]
    pub fn with_inter(mut self, inter: InterDensity) -> Self {
        self.inter = inter;
        self
    }

    /// Derives and validates the clustering.
    ///
    /// # Errors
    /// Returns [`GraphError::InvalidParameters`] when there are no clusters,
    /// fewer nodes than clusters, sizes that are zero or do not sum to the
    /// node count, lists whose length differs from the cluster count, a
    /// probability outside `[0, 1]` or an intra probability below `p_out`.
    pub fn build(self) -> Result<InstanceParams> {
        let sizes = self.derive_sizes()?;
        let p_in = self.derive_p_in(&sizes)?;
        let p_out = self.derive_p_out(&sizes)?;
        check_probability("p_out", p_out)?;
        for (cluster, &value) in p_in.iter().enumerate() {
            check_probability("p_in", value)?;
            if value < p_out {
                return Err(GraphError::invalid(format!(
                    "p_in of cluster {cluster} is {value}, below p_out {p_out}"
                )));
            }
        }
        Ok(InstanceParams { sizes, p_in, p_out })
    }

    fn derive_sizes(&self) -> Result<Vec<usize>> {
        if self.clusters == 0 {
            return Err(GraphError::invalid("at least one cluster is required"));
        }
        let sizes = match &self.sizes {
            ClusterSizes::Explicit(sizes) => {
                let total: usize = sizes.iter().sum();
                if let Some(nodes) = self.nodes.filter(|&nodes| nodes != total) {
                    return Err(GraphError::invalid(format!(
                        "cluster sizes sum to {total}, expected {nodes} nodes"
                    )));
                }
                sizes.clone()
            }
            ClusterSizes::Skewed { beta } => {
                let nodes = self
                    .nodes
                    .ok_or_else(|| GraphError::invalid("skewed sizes need a node count"))?;
                skewed_sizes(nodes, self.clusters, *beta)?
            }
        };
        if sizes.iter().sum::<usize>() < sizes.len() {
            return Err(GraphError::invalid(format!(
                "{} nodes cannot fill {} clusters",
                sizes.iter().sum::<usize>(),
                sizes.len()
            )));
        }
        if let Some(cluster) = sizes.iter().position(|&size| size == 0) {
            return Err(GraphError::invalid(format!("cluster {cluster} would be empty")));
        }
        Ok(sizes)
    }

    fn derive_p_in(&self, sizes: &[usize]) -> Result<Vec<f64>> {
        let per_cluster = |values: &[f64], what: &str| {
            if values.len() == sizes.len() {
                Ok(values.to_vec())
            } else {
                Err(GraphError::invalid(format!(
                    "{} {what} values for {} clusters",
                    values.len(),
                    sizes.len()
                )))
            }
        };
        match &self.intra {
            IntraDensity::Probability(p_in) => Ok(vec![*p_in; sizes.len()]),
            IntraDensity::Probabilities(values) => per_cluster(values, "p_in"),
            IntraDensity::Degree(degree) => {
                check_degree(*degree)?;
                Ok(sizes
                    .iter()
                    .map(|&size| degree_to_p_in(*degree, size))
                    .collect())
            }
            IntraDensity::Degrees(degrees) => {
                let degrees = per_cluster(degrees, "degree")?;
                degrees.iter().try_for_each(|&degree| check_degree(degree))?;
                Ok(degrees
                    .iter()
                    .zip(sizes)
                    .map(|(&degree, &size)| degree_to_p_in(degree, size))
                    .collect())
            }
        }
    }

    fn derive_p_out(&self, sizes: &[usize]) -> Result<f64> {
        match self.inter {
            InterDensity::Probability(p_out) => Ok(p_out),
            InterDensity::Degree(degree) => {
                check_degree(degree)?;
                let nodes: usize = sizes.iter().sum();
                let outside: usize = sizes.iter().map(|&size| size * (nodes - size)).sum();
                if outside == 0 {
                    return Ok(0.0);
                }
                let mean_outside = outside as f64 / nodes as f64;
                Ok((degree / mean_outside).min(1.0))
            }
        }
    }
}

/// Splits `nodes` into `clusters` skewed parts, handing the rounding
/// remainder to the first clusters.
fn skewed_sizes(nodes: usize, clusters: usize, beta: f64) -> Result<Vec<usize>> {
    if !(beta.is_finite() && beta > 0.0) {
        return Err(GraphError::invalid(format!("skew must be positive, got {beta}")));
    }
    if nodes < clusters {
        return Err(GraphError::invalid(format!(
            "{nodes} nodes cannot fill {clusters} clusters"
        )));
    }
    let k = clusters as f64;
    let proportions: Vec<f64> = (1..=clusters)
        .map(|i| {
            let upper = (i as f64 / k).powf(1.0 / beta);
            let lower = ((i - 1) as f64 / k).powf(1.0 / beta);
            round4(upper - lower)
        })
        .collect();
    let total: f64 = proportions.iter().sum();
    let mut sizes: Vec<usize> = proportions
        .iter()
        .map(|proportion| (proportion / total * nodes as f64).floor() as usize)
        .collect();
    let remainder = nodes.saturating_sub(sizes.iter().sum());
    for index in 0..remainder {
        if let Some(size) = sizes.get_mut(index % clusters) {
            *size += 1;
        }
    }
    Ok(sizes)
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn degree_to_p_in(degree: f64, size: usize) -> f64 {
    if size <= 1 {
        return 1.0;
    }
    (degree / (size - 1) as f64).min(1.0)
}

fn check_degree(degree: f64) -> Result<()> {
    if degree.is_finite() && degree >= 0.0 {
        Ok(())
    } else {
        Err(GraphError::invalid(format!(
            "expected degree must be finite and non-negative, got {degree}"
        )))
    }
}
