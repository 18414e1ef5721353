//! Builder utilities for configuring [`DcrGraph`] instances.
//!
//! Exposes the model parameters shared by every cluster of a graph and the
//! validation performed before a graph is constructed.

use crate::{
    Result,
    error::GraphError,
    graph::DcrGraph,
    journal::{JournalSink, MemoryJournal},
    random::{RandomSource, SeededRandom},
};

/// Default seed used by [`GraphBuilder::build`].
pub const DEFAULT_SEED: u64 = 0x5EED_CAFE;

/// Selects how the intra-cluster probability of a cluster created by a split
/// or merge is drawn.
///
/// # Examples
/// ```
/// use ldcr_core::PInSampler;
///
/// let sampler = PInSampler::default();
/// assert_eq!(sampler, PInSampler::Mean);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PInSampler {
    /// Keep the split cluster's probability, or take the mean of the current
    /// ground-truth probabilities for a merge.
    #[default]
    Mean,
    /// Draw from a normal distribution fitted to the current ground-truth
    /// probabilities, redrawing until the value lies in `[p_out, 1]`.
    Gaussian,
}

/// Validated parameters shared by every cluster of one graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct GraphConfig {
    pub(crate) p_out: f64,
    pub(crate) theta: f64,
    pub(crate) p_in_sampler: PInSampler,
}

/// Configures and constructs [`DcrGraph`] instances.
///
/// # Examples
/// ```
/// use ldcr_core::GraphBuilder;
///
/// let graph = GraphBuilder::new()
///     .with_p_out(0.05)
///     .with_theta(0.5)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(graph.node_count(), 0);
/// assert!((graph.p_out() - 0.05).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    p_out: f64,
    theta: f64,
    p_in_sampler: PInSampler,
    seed: u64,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self {
            p_out: 0.01,
            theta: 0.25,
            p_in_sampler: PInSampler::Mean,
            seed: DEFAULT_SEED,
        }
    }
}

impl GraphBuilder {
    /// Creates a builder populated with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the inter-cluster edge probability.
    #[must_use]
    pub fn with_p_out(mut self, p_out: f64) -> Self {
        self.p_out = p_out;
        self
    }

    /// Returns the configured inter-cluster edge probability.
    #[must_use]
    pub fn p_out(&self) -> f64 {
        self.p_out
    }

    /// Overrides the completeness fraction of splits and merges.
    #[must_use]
    pub fn with_theta(mut self, theta: f64) -> Self {
        self.theta = theta;
        self
    }

    /// Returns the configured completeness fraction.
    #[must_use]
    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// Sets the sampler used for the probability of new clusters.
    ///
    /// # Examples
    /// ```
    /// use ldcr_core::{GraphBuilder, PInSampler};
    ///
    /// let builder = GraphBuilder::new().with_p_in_sampler(PInSampler::Gaussian);
    /// assert_eq!(builder.p_in_sampler(), PInSampler::Gaussian);
    /// ```
    #[must_use]
    pub fn with_p_in_sampler(mut self, sampler: PInSampler) -> Self {
        self.p_in_sampler = sampler;
        self
    }

    /// Returns the configured probability sampler.
    #[must_use]
    pub fn p_in_sampler(&self) -> PInSampler {
        self.p_in_sampler
    }

    /// Sets the seed used by [`Self::build`].
    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Returns the configured seed.
    #[must_use]
    pub fn rng_seed(&self) -> u64 {
        self.seed
    }

    /// Validates the configuration and constructs a graph backed by a seeded
    /// random source and an in-memory journal.
    ///
    /// # Errors
    /// Returns [`GraphError::InvalidParameters`] when `p_out` or `theta` lies
    /// outside `[0, 1]`.
    pub fn build(self) -> Result<DcrGraph<SeededRandom, MemoryJournal>> {
        let random = SeededRandom::new(self.seed);
        self.build_with(random, MemoryJournal::new())
    }

    /// Validates the configuration and constructs a graph around the given
    /// random source and journal.
    ///
    /// # Errors
    /// Returns [`GraphError::InvalidParameters`] when `p_out` or `theta` lies
    /// outside `[0, 1]`.
    pub fn build_with<R, J>(self, random: R, journal: J) -> Result<DcrGraph<R, J>>
    where
        R: RandomSource,
        J: JournalSink,
    {
        let config = self.validate()?;
        Ok(DcrGraph::new(config, random, journal))
    }

    fn validate(&self) -> Result<GraphConfig> {
        check_probability("p_out", self.p_out)?;
        check_probability("theta", self.theta)?;
        Ok(GraphConfig {
            p_out: self.p_out,
            theta: self.theta,
            p_in_sampler: self.p_in_sampler,
        })
    }
}

pub(crate) fn check_probability(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(GraphError::invalid(format!(
            "{name} must lie in [0, 1], got {value}"
        )))
    }
}
