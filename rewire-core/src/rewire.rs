//! Motif significance orchestration.
//!
//! Provides the [`Rewire`] runtime entry point that validates input graphs
//! and hands them to the permutation tester or the mixer.

use std::num::NonZeroUsize;

use tracing::{instrument, warn};

use crate::{
    Result,
    builder::ExecutionStrategy,
    error::RewireError,
    graph::Graph,
    motif::{InducedCountConverter, MotifOracle, MotifSize},
    permutation::{PermutationOutcome, PermutationTester},
    rng::{MIX_STREAM, stream_rng},
    switch::{MixReport, SwitchSampler},
    trajectory::NoCandidatePolicy,
};

/// Entry point for running motif significance tests.
///
/// # Examples
/// ```
/// use rewire_core::{ExactOracle, Graph, RewireBuilder};
///
/// let ring = Graph::from_edges(false, (0..8).map(|node| (node, (node + 1) % 8)))?;
/// let rewire = RewireBuilder::new()
///     .with_num_steps(20)
///     .with_seed(7)
///     .build()?;
/// let outcome = rewire.test(&ring, &ExactOracle)?;
/// assert_eq!(outcome.p_values().len(), 4);
/// assert!(outcome.p_values().iter().all(|&p| p > 0.0 && p <= 1.0));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Rewire {
    motif_size: MotifSize,
    num_steps: NonZeroUsize,
    sampler: SwitchSampler,
    no_candidate_policy: NoCandidatePolicy,
    seed: u64,
    execution_strategy: ExecutionStrategy,
    converter: InducedCountConverter,
}

impl Rewire {
    pub(crate) fn new(
        motif_size: MotifSize,
        num_steps: NonZeroUsize,
        sampler: SwitchSampler,
        no_candidate_policy: NoCandidatePolicy,
        seed: u64,
        execution_strategy: ExecutionStrategy,
        converter: InducedCountConverter,
    ) -> Self {
        Self {
            motif_size,
            num_steps,
            sampler,
            no_candidate_policy,
            seed,
            execution_strategy,
            converter,
        }
    }

    /// Returns the motif size under test.
    #[must_use]
    pub fn motif_size(&self) -> MotifSize {
        self.motif_size
    }

    /// Returns the total number of walk steps.
    #[must_use]
    pub fn num_steps(&self) -> NonZeroUsize {
        self.num_steps
    }

    /// Returns the switch sampler configuration.
    #[must_use]
    pub fn sampler(&self) -> SwitchSampler {
        self.sampler
    }

    /// Returns the no-candidate policy.
    #[must_use]
    pub fn no_candidate_policy(&self) -> NoCandidatePolicy {
        self.no_candidate_policy
    }

    /// Returns the base seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the execution strategy that will be used when testing.
    #[must_use]
    pub fn execution_strategy(&self) -> ExecutionStrategy {
        self.execution_strategy
    }

    /// Returns the validated count converter.
    #[must_use]
    pub fn converter(&self) -> &InducedCountConverter {
        &self.converter
    }

    /// Runs a permutation test with a pivot drawn from the configured seed.
    ///
    /// # Errors
    /// Returns [`RewireError::DirectedGraph`] for directed input,
    /// [`RewireError::GraphTooSmall`] for graphs with fewer than two edges,
    /// and propagates walk, oracle and conversion failures.
    pub fn test<O>(&self, graph: &Graph, oracle: &O) -> Result<PermutationOutcome>
    where
        O: MotifOracle + ?Sized,
    {
        self.run_test(graph, oracle, None)
    }

    /// Runs a permutation test with a caller-chosen pivot.
    ///
    /// # Errors
    /// Same as [`Rewire::test`].
    pub fn test_with_pivot<O>(
        &self,
        graph: &Graph,
        oracle: &O,
        pivot: usize,
    ) -> Result<PermutationOutcome>
    where
        O: MotifOracle + ?Sized,
    {
        self.run_test(graph, oracle, Some(pivot))
    }

    #[instrument(
        name = "core.test",
        err,
        skip(self, graph, oracle),
        fields(
            oracle = %oracle.name(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            motif_size = %self.motif_size,
            num_steps = %self.num_steps,
            strategy = ?self.execution_strategy
        ),
    )]
    fn run_test<O>(
        &self,
        graph: &Graph,
        oracle: &O,
        pivot: Option<usize>,
    ) -> Result<PermutationOutcome>
    where
        O: MotifOracle + ?Sized,
    {
        if graph.is_directed() {
            warn!("directed graph rejected by the motif pipeline");
            return Err(RewireError::DirectedGraph);
        }
        if graph.edge_count() < 2 {
            return Err(RewireError::GraphTooSmall {
                edges: graph.edge_count(),
            });
        }

        let tester = PermutationTester::new(
            oracle,
            &self.converter,
            self.sampler,
            self.no_candidate_policy,
            self.execution_strategy,
        );
        let steps = self.num_steps.get();
        match pivot {
            Some(pivot) => tester.test_with_pivot(graph, self.motif_size, steps, pivot, self.seed),
            None => tester.test(graph, self.motif_size, steps, self.seed),
        }
    }

    /// Randomises `graph` in place with `switches` committed switches; zero
    /// selects five switches per edge.
    ///
    /// # Errors
    /// See [`SwitchSampler::mix`].
    pub fn mix(&self, graph: &mut Graph, switches: usize) -> Result<MixReport> {
        let mut rng = stream_rng(self.seed, MIX_STREAM);
        self.sampler.mix(graph, switches, &mut rng)
    }
}
