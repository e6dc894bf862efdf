//! Split-trajectory permutation test.
//!
//! The requested number of steps is split at a random pivot. Two walks start
//! from independent copies of the original graph, one running `pivot` steps
//! and the other the remainder. Every visited vector is compared with the
//! induced counts of the original graph; the p-value of a pattern is the
//! share of vectors that exceed it, with the original itself counted once.

use rand::Rng;
use tracing::{info, instrument};

use crate::{
    builder::ExecutionStrategy,
    error::{Result, RewireError},
    graph::Graph,
    motif::{InducedCountConverter, MotifCounts, MotifOracle, MotifSize, PatternCatalogue},
    rng::{PIVOT_STREAM, stream_rng},
    switch::SwitchSampler,
    trajectory::{NoCandidatePolicy, Trajectory, TrajectoryAccumulator},
};

const FIRST_HALF_STREAM: usize = 1;
const SECOND_HALF_STREAM: usize = 2;

/// p-values for the patterns of one size.
#[derive(Clone, Debug, PartialEq)]
pub struct PValueBlock {
    size: MotifSize,
    names: Vec<&'static str>,
    values: Vec<f64>,
}

impl PValueBlock {
    /// Pattern size of the block.
    #[must_use]
    pub fn size(&self) -> MotifSize {
        self.size
    }

    /// Pattern names in catalogue order.
    #[must_use]
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    /// p-values in catalogue order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// `(name, p-value)` pairs for the connected patterns only.
    pub fn connected(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        let skip = self.names.len().saturating_sub(self.size.connected_len());
        self.names
            .iter()
            .copied()
            .zip(self.values.iter().copied())
            .skip(skip)
    }
}

/// Everything produced by one permutation test.
#[derive(Clone, Debug, PartialEq)]
pub struct PermutationOutcome {
    size: MotifSize,
    num_steps: usize,
    pivot: usize,
    original: MotifCounts,
    first: Trajectory,
    second: Trajectory,
    p_values: Vec<f64>,
}

impl PermutationOutcome {
    /// Motif size tested.
    #[must_use]
    pub fn size(&self) -> MotifSize {
        self.size
    }

    /// Total steps requested.
    #[must_use]
    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    /// Steps assigned to the first walk.
    #[must_use]
    pub fn pivot(&self) -> usize {
        self.pivot
    }

    /// Induced counts of the original graph.
    #[must_use]
    pub fn original(&self) -> &MotifCounts {
        &self.original
    }

    /// Walk over the first `pivot` steps.
    #[must_use]
    pub fn first(&self) -> &Trajectory {
        &self.first
    }

    /// Walk over the remaining steps.
    #[must_use]
    pub fn second(&self) -> &Trajectory {
        &self.second
    }

    /// One p-value per entry of the count vector.
    #[must_use]
    pub fn p_values(&self) -> &[f64] {
        &self.p_values
    }

    /// p-values grouped by pattern size, smallest first.
    #[must_use]
    pub fn blocks(&self) -> Vec<PValueBlock> {
        self.size
            .blocks()
            .map(|block| PValueBlock {
                size: block,
                names: PatternCatalogue::get(block)
                    .patterns()
                    .iter()
                    .map(|pattern| pattern.name())
                    .collect(),
                values: self.p_values[block.block_range()].to_vec(),
            })
            .collect()
    }
}

/// Computes `(1 + exceedances in both walks) / num_steps` per pattern.
///
/// # Errors
/// Returns [`RewireError::InvalidStepCount`] for zero steps and
/// [`RewireError::CountLength`] when vector lengths disagree.
///
/// # Examples
/// ```
/// use rewire_core::p_values_from_exceedances;
///
/// let p = p_values_from_exceedances(&[0, 3, 9], &[0, 1, 0], 10)?;
/// assert_eq!(p, vec![0.1, 0.5, 1.0]);
/// # Ok::<(), rewire_core::RewireError>(())
/// ```
pub fn p_values_from_exceedances(
    first: &[usize],
    second: &[usize],
    num_steps: usize,
) -> Result<Vec<f64>> {
    if num_steps == 0 {
        return Err(RewireError::InvalidStepCount { got: num_steps });
    }
    if first.len() != second.len() {
        return Err(RewireError::CountLength {
            expected: first.len(),
            found: second.len(),
        });
    }
    let denominator = num_steps as f64;
    Ok(first
        .iter()
        .zip(second)
        .map(|(a, b)| (1 + a + b) as f64 / denominator)
        .collect())
}

/// Runs the two walks of a permutation test and derives p-values.
#[derive(Debug)]
pub struct PermutationTester<'a, O: ?Sized> {
    oracle: &'a O,
    converter: &'a InducedCountConverter,
    sampler: SwitchSampler,
    policy: NoCandidatePolicy,
    strategy: ExecutionStrategy,
}

impl<'a, O> PermutationTester<'a, O>
where
    O: MotifOracle + ?Sized,
{
    /// Creates a tester sharing `oracle` and `converter` between both walks.
    #[must_use]
    pub fn new(
        oracle: &'a O,
        converter: &'a InducedCountConverter,
        sampler: SwitchSampler,
        policy: NoCandidatePolicy,
        strategy: ExecutionStrategy,
    ) -> Self {
        Self {
            oracle,
            converter,
            sampler,
            policy,
            strategy,
        }
    }

    /// Draws a pivot in `1..=num_steps` from `seed` and runs the test.
    ///
    /// # Errors
    /// See [`PermutationTester::test_with_pivot`].
    pub fn test(
        &self,
        graph: &Graph,
        size: MotifSize,
        num_steps: usize,
        seed: u64,
    ) -> Result<PermutationOutcome> {
        if num_steps == 0 {
            return Err(RewireError::InvalidStepCount { got: num_steps });
        }
        let pivot = stream_rng(seed, PIVOT_STREAM).gen_range(1..=num_steps);
        self.test_with_pivot(graph, size, num_steps, pivot, seed)
    }

    /// Runs the test with a fixed pivot, clamped to `1..=num_steps`.
    ///
    /// Each walk owns a deep copy of `graph` and a generator derived from
    /// `seed` and its position, so the outcome does not depend on the
    /// execution strategy.
    ///
    /// # Errors
    /// Returns [`RewireError::InvalidStepCount`] for zero steps and
    /// propagates oracle, conversion and sampling failures from either walk.
    #[instrument(
        name = "core.permutation",
        err,
        skip(self, graph),
        fields(
            size = %size,
            num_steps = num_steps,
            pivot = pivot,
            strategy = ?self.strategy,
        ),
    )]
    pub fn test_with_pivot(
        &self,
        graph: &Graph,
        size: MotifSize,
        num_steps: usize,
        pivot: usize,
        seed: u64,
    ) -> Result<PermutationOutcome> {
        if num_steps == 0 {
            return Err(RewireError::InvalidStepCount { got: num_steps });
        }
        let pivot = pivot.clamp(1, num_steps);
        let non_induced = self.oracle.count(graph, size)?;
        let original = self.converter.to_induced(&non_induced, size)?;

        let accumulator =
            TrajectoryAccumulator::new(self.oracle, self.converter, self.sampler, self.policy);
        let run_half = |steps: usize, stream: usize| {
            let mut copy = graph.clone();
            let mut rng = stream_rng(seed, stream);
            accumulator.run(&mut copy, size, steps, &non_induced, &mut rng)
        };
        let (first, second) = match self.strategy {
            ExecutionStrategy::Sequential => (
                run_half(pivot, FIRST_HALF_STREAM),
                run_half(num_steps - pivot, SECOND_HALF_STREAM),
            ),
            ExecutionStrategy::Parallel => rayon::join(
                || run_half(pivot, FIRST_HALF_STREAM),
                || run_half(num_steps - pivot, SECOND_HALF_STREAM),
            ),
        };
        let (first, second) = (first?, second?);

        let p_values = p_values_from_exceedances(
            &first.exceedances(&original)?,
            &second.exceedances(&original)?,
            num_steps,
        )?;
        info!(
            first_len = first.len(),
            second_len = second.len(),
            accepted_switches = first.accepted_switches() + second.accepted_switches(),
            "permutation test completed"
        );
        Ok(PermutationOutcome {
            size,
            num_steps,
            pivot,
            original,
            first,
            second,
            p_values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case::zero_steps(&[0], &[0], 0)]
    #[case::length_mismatch(&[0, 1], &[0], 4)]
    fn p_value_inputs_are_validated(
        #[case] first: &[usize],
        #[case] second: &[usize],
        #[case] steps: usize,
    ) {
        assert!(p_values_from_exceedances(first, second, steps).is_err());
    }

    #[test]
    fn connected_view_keeps_the_tail() {
        let block = PValueBlock {
            size: MotifSize::Three,
            names: vec!["empty", "edge", "wedge", "triangle"],
            values: vec![1.0, 0.9, 0.5, 0.01],
        };
        let connected: Vec<_> = block.connected().collect();
        assert_eq!(connected, vec![("wedge", 0.5), ("triangle", 0.01)]);
    }
}
