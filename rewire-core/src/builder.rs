//! Builder utilities for configuring motif significance tests.
//!
//! Exposes the execution strategy selection surface and builder validation
//! used before constructing [`Rewire`] instances.

use std::num::NonZeroUsize;

use crate::{
    Result,
    error::RewireError,
    motif::{InducedCountConverter, MotifSize},
    rewire::Rewire,
    switch::SwitchSampler,
    trajectory::NoCandidatePolicy,
};

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 0x5EED_CAFE;

/// Indicates how [`Rewire`] schedules the two walks of a permutation test.
///
/// Both strategies produce identical results for the same seed; `Parallel`
/// only changes wall-clock time.
///
/// # Examples
/// ```
/// use rewire_core::ExecutionStrategy;
///
/// let strategy = ExecutionStrategy::default();
/// assert!(matches!(strategy, ExecutionStrategy::Sequential));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// Run the walks one after the other on the calling thread.
    #[default]
    Sequential,
    /// Run the walks concurrently on the rayon thread pool.
    Parallel,
}

/// Configures and constructs [`Rewire`] instances.
///
/// # Examples
/// ```
/// use rewire_core::{ExecutionStrategy, MotifSize, RewireBuilder};
///
/// let rewire = RewireBuilder::new()
///     .with_motif_size(4)
///     .with_num_steps(500)
///     .with_execution_strategy(ExecutionStrategy::Parallel)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(rewire.motif_size(), MotifSize::Four);
/// assert_eq!(rewire.num_steps().get(), 500);
/// ```
#[derive(Debug, Clone)]
pub struct RewireBuilder {
    motif_size: usize,
    num_steps: usize,
    repeat_limit: usize,
    no_candidate_policy: NoCandidatePolicy,
    seed: u64,
    execution_strategy: ExecutionStrategy,
}

impl Default for RewireBuilder {
    fn default() -> Self {
        Self {
            motif_size: 3,
            num_steps: 10_000,
            repeat_limit: SwitchSampler::DEFAULT_REPEAT_LIMIT,
            no_candidate_policy: NoCandidatePolicy::default(),
            seed: DEFAULT_SEED,
            execution_strategy: ExecutionStrategy::default(),
        }
    }
}

impl RewireBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use rewire_core::{ExecutionStrategy, RewireBuilder};
    ///
    /// let builder = RewireBuilder::new();
    /// assert_eq!(builder.motif_size(), 3);
    /// assert_eq!(builder.num_steps(), 10_000);
    /// assert_eq!(builder.execution_strategy(), ExecutionStrategy::Sequential);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the motif size (3, 4 or 5 vertices).
    #[must_use]
    pub fn with_motif_size(mut self, size: usize) -> Self {
        self.motif_size = size;
        self
    }

    /// Returns the configured motif size.
    #[must_use]
    pub fn motif_size(&self) -> usize {
        self.motif_size
    }

    /// Overrides the total number of walk steps.
    #[must_use]
    pub fn with_num_steps(mut self, steps: usize) -> Self {
        self.num_steps = steps;
        self
    }

    /// Returns the configured number of walk steps.
    #[must_use]
    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    /// Overrides how many second edges the sampler draws per sample.
    #[must_use]
    pub fn with_repeat_limit(mut self, limit: usize) -> Self {
        self.repeat_limit = limit;
        self
    }

    /// Returns the configured sampler repeat limit.
    #[must_use]
    pub fn repeat_limit(&self) -> usize {
        self.repeat_limit
    }

    /// Chooses what happens when a step finds no switch.
    ///
    /// # Examples
    /// ```
    /// use rewire_core::{NoCandidatePolicy, RewireBuilder};
    ///
    /// let builder = RewireBuilder::new().with_no_candidate_policy(NoCandidatePolicy::Skip);
    /// assert_eq!(builder.no_candidate_policy(), NoCandidatePolicy::Skip);
    /// ```
    #[must_use]
    pub fn with_no_candidate_policy(mut self, policy: NoCandidatePolicy) -> Self {
        self.no_candidate_policy = policy;
        self
    }

    /// Returns the configured no-candidate policy.
    #[must_use]
    pub fn no_candidate_policy(&self) -> NoCandidatePolicy {
        self.no_candidate_policy
    }

    /// Overrides the base seed for every random stream.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Returns the configured base seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Sets the execution strategy used for the two walks.
    #[must_use]
    pub fn with_execution_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.execution_strategy = strategy;
        self
    }

    /// Returns the currently configured execution strategy.
    #[must_use]
    pub fn execution_strategy(&self) -> ExecutionStrategy {
        self.execution_strategy
    }

    /// Validates the configuration and constructs a [`Rewire`] instance.
    ///
    /// # Errors
    /// Returns [`RewireError::UnsupportedMotifSize`],
    /// [`RewireError::InvalidStepCount`], [`RewireError::InvalidRepeatLimit`]
    /// or [`RewireError::InvalidRetryAttempts`] for out-of-range settings and
    /// [`RewireError::SingularConversion`] if a conversion matrix fails
    /// validation.
    ///
    /// # Examples
    /// ```
    /// use rewire_core::{RewireBuilder, RewireError};
    ///
    /// let err = RewireBuilder::new().with_motif_size(6).build().unwrap_err();
    /// assert!(matches!(err, RewireError::UnsupportedMotifSize { got: 6 }));
    /// ```
    pub fn build(self) -> Result<Rewire> {
        let motif_size = MotifSize::try_from(self.motif_size)?;
        let num_steps = NonZeroUsize::new(self.num_steps).ok_or(RewireError::InvalidStepCount {
            got: self.num_steps,
        })?;
        if self.repeat_limit == 0 {
            return Err(RewireError::InvalidRepeatLimit {
                got: self.repeat_limit,
            });
        }
        if let NoCandidatePolicy::Retry { max_attempts: 0 } = self.no_candidate_policy {
            return Err(RewireError::InvalidRetryAttempts { got: 0 });
        }
        let converter = InducedCountConverter::new()?;

        Ok(Rewire::new(
            motif_size,
            num_steps,
            SwitchSampler::new(self.repeat_limit),
            self.no_candidate_policy,
            self.seed,
            self.execution_strategy,
            converter,
        ))
    }
}
