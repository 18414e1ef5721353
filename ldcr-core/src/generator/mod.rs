//! Time-stepped generation driver.
//!
//! A [`Generator`] seeds a graph from [`InstanceParams`] and then advances it
//! one time step at a time, mixing a rare large-scale operation with a budget
//! of small-scale churn as configured by [`ProcessParams`].

mod instance;

pub use self::instance::{
    ClusterSizes, InstanceParams, InstanceParamsBuilder, InterDensity, IntraDensity,
};

use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    builder::{GraphBuilder, check_probability},
    error::Result,
    graph::DcrGraph,
    journal::{JournalSink, MemoryJournal, NullJournal},
    random::{RandomSource, SeededRandom, derive_run_seed},
};

/// Probabilities and budgets steering each time step.
///
/// # Examples
/// ```
/// use ldcr_core::ProcessParams;
///
/// let process = ProcessParams { t_max: 10, ..ProcessParams::default() };
/// process.validate()?;
/// assert_eq!(process.eta, 1);
/// # Ok::<(), ldcr_core::GraphError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProcessParams {
    /// Probability that a small-scale operation touches an edge rather than
    /// a node.
    pub p_chi: f64,
    /// Probability that a node operation inserts rather than removes.
    pub p_nu: f64,
    /// Probability that a large-scale operation is a split.
    pub p_mu: f64,
    /// Probability of a large-scale operation per time step.
    pub p_omega: f64,
    /// Small-scale operations per time step.
    pub eta: u64,
    /// Number of time steps performed by [`Generator::run`].
    pub t_max: u64,
}

impl Default for ProcessParams {
    fn default() -> Self {
        Self {
            p_chi: 0.5,
            p_nu: 0.5,
            p_mu: 0.5,
            p_omega: 0.02,
            eta: 1,
            t_max: 100,
        }
    }
}

impl ProcessParams {
    /// Checks every probability lies in `[0, 1]`.
    ///
    /// # Errors
    /// Returns [`crate::GraphError::InvalidParameters`] naming the offending
    /// probability.
    pub fn validate(&self) -> Result<()> {
        check_probability("p_chi", self.p_chi)?;
        check_probability("p_nu", self.p_nu)?;
        check_probability("p_mu", self.p_mu)?;
        check_probability("p_omega", self.p_omega)
    }
}

/// Snapshot of a generator's graph and counters.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct GenerationSummary {
    /// Completed time steps.
    pub time_step: u64,
    /// Current number of nodes.
    pub nodes: usize,
    /// Current number of edges.
    pub edges: u64,
    /// Edges inside ground-truth clusters.
    pub intra_edges: u64,
    /// Edges across ground-truth clusters.
    pub inter_edges: u64,
    /// Clusters of the ground-truth view.
    pub ground_truth_clusters: usize,
    /// Clusters of the reference view.
    pub reference_clusters: usize,
    /// Splits and merges still running.
    pub running_operations: usize,
    /// Splits and merges finished.
    pub finished_operations: u64,
    /// Small-scale operations performed.
    pub small_operations: u64,
    /// Large-scale operations started.
    pub large_operations: u64,
}

/// Drives a [`DcrGraph`] through time steps.
#[derive(Debug)]
pub struct Generator<R = SeededRandom, J = MemoryJournal> {
    graph: DcrGraph<R, J>,
    process: ProcessParams,
}

impl Generator<SeededRandom, MemoryJournal> {
    /// Builds a graph from `builder`, seeds it from `instance` and prepares
    /// it for `process`.
    ///
    /// The builder's `p_out` is replaced by the instance's.
    ///
    /// # Errors
    /// Returns [`crate::GraphError::InvalidParameters`] when any parameter
    /// set is rejected.
    pub fn new(instance: &InstanceParams, process: ProcessParams, builder: GraphBuilder) -> Result<Self> {
        let seed = builder.rng_seed();
        Self::with_sources(
            instance,
            process,
            builder,
            SeededRandom::new(seed),
            MemoryJournal::new(),
        )
    }
}

impl<R, J> Generator<R, J>
where
    R: RandomSource,
    J: JournalSink,
{
    /// Like [`Generator::new`] with a caller-supplied random source and
    /// journal.
    ///
    /// # Errors
    /// Returns [`crate::GraphError::InvalidParameters`] when any parameter
    /// set is rejected.
    pub fn with_sources(
        instance: &InstanceParams,
        process: ProcessParams,
        builder: GraphBuilder,
        random: R,
        journal: J,
    ) -> Result<Self> {
        process.validate()?;
        let mut graph = builder
            .with_p_out(instance.p_out())
            .build_with(random, journal)?;
        graph.init_erdos_renyi(instance.sizes(), instance.p_in())?;
        Ok(Self { graph, process })
    }

    /// Performs `t_max` time steps and returns the final summary.
    ///
    /// # Errors
    /// Propagates structural contract failures as
    /// [`crate::GraphError`].
    #[instrument(name = "generator.run", err, skip(self), fields(steps = self.process.t_max))]
    pub fn run(&mut self) -> Result<GenerationSummary> {
        for _ in 0..self.process.t_max {
            self.run_step()?;
        }
        let summary = self.summary();
        info!(
            time_step = summary.time_step,
            nodes = summary.nodes,
            edges = summary.edges,
            ground_truth_clusters = summary.ground_truth_clusters,
            finished_operations = summary.finished_operations,
            "generation finished"
        );
        Ok(summary)
    }

    /// Performs a single time step.
    ///
    /// The clock advances first, then a large-scale operation is attempted
    /// with probability `p_omega`, then small-scale operations run until
    /// `eta` have been counted, and finally complete operations finish.
    /// An exhausted small-scale attempt still consumes one unit of the
    /// budget so a step always terminates.
    ///
    /// # Errors
    /// Propagates structural contract failures as
    /// [`crate::GraphError`].
    pub fn run_step(&mut self) -> Result<()> {
        self.graph.next_time_step();
        if self.graph.random_mut().next_f64() < self.process.p_omega {
            self.large_scale_operation()?;
        }
        let mut performed = 0;
        while performed < self.process.eta {
            let before = self.graph.small_operation_count();
            self.small_scale_operation()?;
            performed += (self.graph.small_operation_count() - before).max(1);
        }
        let finished = self.graph.check_operations_for_completeness()?;
        if finished > 0 {
            debug!(finished, time_step = self.graph.time_step(), "operations finished");
        }
        Ok(())
    }

    fn large_scale_operation(&mut self) -> Result<()> {
        let split = self.graph.random_mut().next_f64() < self.process.p_mu;
        let started = if split {
            self.graph.split()?
        } else {
            self.graph.merge()?
        };
        if started.is_none() {
            debug!(split, "large-scale operation skipped");
        }
        Ok(())
    }

    fn small_scale_operation(&mut self) -> Result<()> {
        if self.graph.random_mut().next_f64() < self.process.p_chi {
            if self.graph.shall_do_edge_insertion() {
                self.graph.add_edge()?;
            } else {
                self.graph.remove_edge()?;
            }
        } else if self.graph.random_mut().next_f64() < self.process.p_nu {
            self.graph.add_and_connect_node()?;
        } else {
            self.graph.remove_node()?;
        }
        Ok(())
    }

    /// Summarises the current state.
    #[must_use]
    pub fn summary(&self) -> GenerationSummary {
        let graph = &self.graph;
        GenerationSummary {
            time_step: graph.time_step(),
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            intra_edges: graph.intra_edge_count(),
            inter_edges: graph.inter_edge_count(),
            ground_truth_clusters: graph.ground_truth_clusters().len(),
            reference_clusters: graph.reference_clusters().len(),
            running_operations: graph.running_operations().len(),
            finished_operations: graph.finished_operation_count(),
            small_operations: graph.small_operation_count(),
            large_operations: graph.large_operation_count(),
        }
    }

    /// The driven graph.
    #[must_use]
    pub const fn graph(&self) -> &DcrGraph<R, J> {
        &self.graph
    }

    /// The process parameters.
    #[must_use]
    pub const fn process(&self) -> &ProcessParams {
        &self.process
    }

    /// Consumes the generator, returning the graph.
    #[must_use]
    pub fn into_graph(self) -> DcrGraph<R, J> {
        self.graph
    }
}

/// Executes `runs` independent generations and returns their summaries in
/// run order.
///
/// Run `i` is seeded with [`derive_run_seed`] applied to the builder's seed
/// and `i`, so its outcome does not depend on scheduling. Journals are
/// discarded.
///
/// # Errors
/// Returns the first error raised by any run.
#[instrument(name = "generator.run_batch", err, skip(instance, process, builder))]
pub fn run_batch(
    instance: &InstanceParams,
    process: ProcessParams,
    builder: &GraphBuilder,
    runs: usize,
) -> Result<Vec<GenerationSummary>> {
    let base_seed = builder.rng_seed();
    let run_one = |index: usize| {
        let seed = derive_run_seed(base_seed, index);
        let mut generator = Generator::with_sources(
            instance,
            process,
            builder.clone().with_rng_seed(seed),
            SeededRandom::new(seed),
            NullJournal,
        )?;
        generator.run()
    };

    #[cfg(feature = "parallel")]
    let summaries = (0..runs).into_par_iter().map(run_one).collect();
    #[cfg(not(feature = "parallel"))]
    let summaries = (0..runs).map(run_one).collect();

    summaries
}
