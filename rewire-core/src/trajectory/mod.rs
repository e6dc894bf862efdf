//! Random-walk trajectories of cumulative motif counts.
//!
//! A trajectory starts from the original non-induced counts and, for every
//! step, samples a switch, adds the switch delta to the running vector and
//! commits the switch. Once the walk ends every vector is converted to
//! induced form.

mod delta;

use std::fmt;

use rand::Rng;
use tracing::{info, instrument};

pub use self::delta::switch_delta;
use crate::{
    error::{Result, RewireError},
    graph::Graph,
    motif::{InducedCountConverter, MotifCounts, MotifOracle, MotifSize},
    switch::{SwitchCandidate, SwitchSampler},
};

/// What a walk step does when the sampler finds no valid switch.
///
/// # Examples
/// ```
/// use rewire_core::NoCandidatePolicy;
///
/// assert_eq!(NoCandidatePolicy::default(), NoCandidatePolicy::RecordNoOp);
/// assert_eq!(NoCandidatePolicy::Retry { max_attempts: 5 }.to_string(), "retry(5)");
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum NoCandidatePolicy {
    /// Consume the step without recording anything; the trajectory may end up
    /// shorter than requested.
    Skip,
    /// Record the unchanged graph again, keeping one vector per step.
    #[default]
    RecordNoOp,
    /// Keep sampling until a switch is found, failing after `max_attempts`
    /// consecutive misses.
    Retry {
        /// Consecutive sampler calls allowed per step.
        max_attempts: usize,
    },
}

impl fmt::Display for NoCandidatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => f.write_str("skip"),
            Self::RecordNoOp => f.write_str("record"),
            Self::Retry { max_attempts } => write!(f, "retry({max_attempts})"),
        }
    }
}

/// Induced count vectors visited by one walk, original graph first.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    size: MotifSize,
    counts: Vec<MotifCounts>,
    accepted_switches: usize,
    idle_steps: usize,
}

impl Trajectory {
    /// Motif size of every vector.
    #[must_use]
    pub fn size(&self) -> MotifSize {
        self.size
    }

    /// The vectors in walk order.
    #[must_use]
    pub fn counts(&self) -> &[MotifCounts] {
        &self.counts
    }

    /// Number of vectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Never `true`: a trajectory always holds the original counts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Switches committed during the walk.
    #[must_use]
    pub fn accepted_switches(&self) -> usize {
        self.accepted_switches
    }

    /// Steps in which the sampler found no switch.
    #[must_use]
    pub fn idle_steps(&self) -> usize {
        self.idle_steps
    }

    /// Counts, per pattern, the vectors whose entry exceeds `reference`.
    ///
    /// # Errors
    /// Returns [`RewireError::CountLength`] when `reference` has a different
    /// length from the trajectory vectors.
    pub fn exceedances(&self, reference: &MotifCounts) -> Result<Vec<usize>> {
        let mut tally = vec![0_usize; reference.len()];
        for vector in &self.counts {
            if vector.len() != reference.len() {
                return Err(RewireError::CountLength {
                    expected: reference.len(),
                    found: vector.len(),
                });
            }
            let pairs = vector.iter().zip(reference.iter());
            for (slot, (value, threshold)) in tally.iter_mut().zip(pairs) {
                if value > threshold {
                    *slot += 1;
                }
            }
        }
        Ok(tally)
    }
}

/// Drives a single sequential walk.
#[derive(Debug)]
pub struct TrajectoryAccumulator<'a, O: ?Sized> {
    oracle: &'a O,
    converter: &'a InducedCountConverter,
    sampler: SwitchSampler,
    policy: NoCandidatePolicy,
}

impl<'a, O> TrajectoryAccumulator<'a, O>
where
    O: MotifOracle + ?Sized,
{
    /// Creates an accumulator sharing `oracle` and `converter`.
    #[must_use]
    pub fn new(
        oracle: &'a O,
        converter: &'a InducedCountConverter,
        sampler: SwitchSampler,
        policy: NoCandidatePolicy,
    ) -> Self {
        Self {
            oracle,
            converter,
            sampler,
            policy,
        }
    }

    /// Walks `num_steps - 1` steps over `graph`, committing every switch.
    ///
    /// `original` holds the non-induced counts of `graph` at entry. A step
    /// count of zero behaves like one: the trajectory holds the original
    /// vector only. On error the graph may have been partially walked and no
    /// trajectory is returned.
    ///
    /// # Errors
    /// Returns [`RewireError::CountLength`] when `original` does not match
    /// `size`, [`RewireError::SwitchUnavailable`] when a
    /// [`NoCandidatePolicy::Retry`] budget runs out, and propagates oracle
    /// and conversion failures.
    #[instrument(
        name = "core.trajectory",
        err,
        skip(self, graph, original, rng),
        fields(size = %size, num_steps = num_steps, policy = %self.policy, oracle = self.oracle.name()),
    )]
    pub fn run<R: Rng + ?Sized>(
        &self,
        graph: &mut Graph,
        size: MotifSize,
        num_steps: usize,
        original: &MotifCounts,
        rng: &mut R,
    ) -> Result<Trajectory> {
        if original.len() != size.vector_len() {
            return Err(RewireError::CountLength {
                expected: size.vector_len(),
                found: original.len(),
            });
        }

        let mut current = original.clone();
        let mut cumulative = vec![current.clone()];
        let mut accepted_switches = 0_usize;
        let mut idle_steps = 0_usize;

        for _ in 1..num_steps {
            let Some(candidate) = self.next_candidate(graph, rng)? else {
                idle_steps += 1;
                if self.policy == NoCandidatePolicy::RecordNoOp {
                    cumulative.push(current.clone());
                }
                continue;
            };
            let delta = switch_delta(graph, &candidate, size, self.oracle)?;
            current = current.plus(&delta)?;
            cumulative.push(current.clone());
            graph.apply_switch(&candidate)?;
            accepted_switches += 1;
        }

        let counts = cumulative
            .iter()
            .map(|vector| self.converter.to_induced(vector, size))
            .collect::<Result<Vec<_>>>()?;
        info!(
            vectors = counts.len(),
            accepted_switches, idle_steps, "trajectory completed"
        );
        Ok(Trajectory {
            size,
            counts,
            accepted_switches,
            idle_steps,
        })
    }

    fn next_candidate<R: Rng + ?Sized>(
        &self,
        graph: &Graph,
        rng: &mut R,
    ) -> Result<Option<SwitchCandidate>> {
        let NoCandidatePolicy::Retry { max_attempts } = self.policy else {
            return Ok(self.sampler.sample(graph, rng));
        };
        for _ in 0..max_attempts {
            if let Some(candidate) = self.sampler.sample(graph, rng) {
                return Ok(Some(candidate));
            }
        }
        Err(RewireError::SwitchUnavailable {
            attempts: max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{SeedableRng, rngs::SmallRng};
    use rstest::{fixture, rstest};

    use crate::ExactOracle;

    #[fixture]
    fn converter() -> InducedCountConverter {
        InducedCountConverter::new().expect("matrices are invertible")
    }

    fn star() -> Graph {
        Graph::from_edges(false, [(0, 1), (0, 2), (0, 3), (0, 4)]).expect("simple")
    }

    fn walk(
        converter: &InducedCountConverter,
        policy: NoCandidatePolicy,
        graph: &mut Graph,
        num_steps: usize,
    ) -> Result<Trajectory> {
        let original = ExactOracle.count(graph, MotifSize::Three)?;
        let mut rng = SmallRng::seed_from_u64(5);
        TrajectoryAccumulator::new(&ExactOracle, converter, SwitchSampler::default(), policy)
            .run(graph, MotifSize::Three, num_steps, &original, &mut rng)
    }

    #[rstest]
    #[case::skip(NoCandidatePolicy::Skip, 1)]
    #[case::record(NoCandidatePolicy::RecordNoOp, 6)]
    fn stars_never_switch(
        converter: InducedCountConverter,
        #[case] policy: NoCandidatePolicy,
        #[case] expected_len: usize,
    ) {
        let mut graph = star();
        let trajectory = walk(&converter, policy, &mut graph, 6).expect("walk succeeds");
        assert_eq!(trajectory.len(), expected_len);
        assert_eq!(trajectory.accepted_switches(), 0);
        assert_eq!(trajectory.idle_steps(), 5);
        assert!(trajectory.counts().iter().all(|vector| vector == &trajectory.counts()[0]));
    }

    #[rstest]
    fn retry_fails_when_no_switch_exists(converter: InducedCountConverter) {
        let mut graph = star();
        let error = walk(
            &converter,
            NoCandidatePolicy::Retry { max_attempts: 3 },
            &mut graph,
            4,
        )
        .expect_err("stars admit no switch");
        assert!(matches!(error, RewireError::SwitchUnavailable { attempts: 3 }));
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    fn short_walks_hold_only_the_original(converter: InducedCountConverter, #[case] steps: usize) {
        let mut graph = star();
        let trajectory = walk(&converter, NoCandidatePolicy::RecordNoOp, &mut graph, steps)
            .expect("walk succeeds");
        assert_eq!(trajectory.len(), 1);
        // Six wedges through the centre, four edgeless leaf triples.
        assert_eq!(trajectory.counts()[0].as_slice(), &[4.0, 0.0, 6.0, 0.0]);
    }

    #[rstest]
    fn original_must_match_the_motif_size(converter: InducedCountConverter) {
        let mut graph = star();
        let mut rng = SmallRng::seed_from_u64(1);
        let error = TrajectoryAccumulator::new(
            &ExactOracle,
            &converter,
            SwitchSampler::default(),
            NoCandidatePolicy::Skip,
        )
        .run(&mut graph, MotifSize::Four, 3, &MotifCounts::zeros(4), &mut rng)
        .expect_err("length mismatch");
        assert!(matches!(
            error,
            RewireError::CountLength {
                expected: 15,
                found: 4
            }
        ));
    }

    #[test]
    fn exceedances_count_strictly_greater_entries() {
        let trajectory = Trajectory {
            size: MotifSize::Three,
            counts: vec![
                MotifCounts::new(vec![1.0, 2.0, 3.0, 4.0]),
                MotifCounts::new(vec![2.0, 2.0, 1.0, 5.0]),
            ],
            accepted_switches: 1,
            idle_steps: 0,
        };
        let reference = MotifCounts::new(vec![1.0, 2.0, 2.0, 4.0]);
        assert_eq!(
            trajectory.exceedances(&reference).expect("same length"),
            vec![1, 0, 1, 1]
        );
    }
}
