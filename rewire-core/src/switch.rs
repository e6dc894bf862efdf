//! Degree-preserving double-edge swaps.
//!
//! A switch replaces edges `(a, b)` and `(c, d)` with `(a, d)` and `(c, b)`.
//! Every endpoint keeps its degree, so repeated switches walk the space of
//! graphs sharing the original degree sequence.

use rand::{Rng, seq::SliceRandom};
use tracing::{debug, instrument};

use crate::{
    error::{Result, RewireError},
    graph::{Edge, Graph},
};

/// Consecutive failed samples tolerated by [`SwitchSampler::mix`].
pub const MAX_CONSECUTIVE_FAILURES: usize = 1000;

/// Switches performed per edge when [`SwitchSampler::mix`] is asked for zero.
pub const DEFAULT_SWITCHES_PER_EDGE: usize = 5;

/// A proposed double-edge swap.
///
/// # Examples
/// ```
/// use rewire_core::{Edge, SwitchCandidate};
///
/// let candidate = SwitchCandidate::new(Edge::new(0, 1), Edge::new(3, 4));
/// assert_eq!(candidate.added(), [Edge::new(0, 4), Edge::new(3, 1)]);
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SwitchCandidate {
    first: Edge,
    second: Edge,
}

impl SwitchCandidate {
    /// Pairs two edges as a switch.
    #[must_use]
    pub const fn new(first: Edge, second: Edge) -> Self {
        Self { first, second }
    }

    /// First edge to remove.
    #[must_use]
    pub const fn first(&self) -> Edge {
        self.first
    }

    /// Second edge to remove.
    #[must_use]
    pub const fn second(&self) -> Edge {
        self.second
    }

    /// Both edges removed by the switch.
    #[must_use]
    pub const fn removed(&self) -> [Edge; 2] {
        [self.first, self.second]
    }

    /// Both edges added by the switch.
    #[must_use]
    pub const fn added(&self) -> [Edge; 2] {
        [
            Edge::new(self.first.source, self.second.target),
            Edge::new(self.second.source, self.first.target),
        ]
    }

    /// All four edges touched by the switch, removed edges first.
    #[must_use]
    pub const fn touched(&self) -> [Edge; 4] {
        let [third, fourth] = self.added();
        [self.first, self.second, third, fourth]
    }

    /// Checks the swap against the current state of `graph`.
    ///
    /// The four endpoints must be pairwise distinct, both removed edges must
    /// exist and neither added edge may exist yet. Undirected graphs treat
    /// both orientations of an edge as the same edge.
    #[must_use]
    pub fn is_valid_for(&self, graph: &Graph) -> bool {
        let nodes = [
            self.first.source,
            self.first.target,
            self.second.source,
            self.second.target,
        ];
        let distinct = nodes
            .iter()
            .enumerate()
            .all(|(index, node)| !nodes[index + 1..].contains(node));
        let [third, fourth] = self.added();
        distinct
            && graph.contains_edge(self.first.source, self.first.target)
            && graph.contains_edge(self.second.source, self.second.target)
            && !graph.contains_edge(third.source, third.target)
            && !graph.contains_edge(fourth.source, fourth.target)
    }
}

/// Outcome of [`SwitchSampler::mix`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MixReport {
    /// Switches committed.
    pub switches: usize,
    /// Samples that produced no valid candidate.
    pub failed_samples: usize,
}

/// Rejection sampler for valid switches.
///
/// The first edge is drawn uniformly; the second is redrawn up to
/// `repeat_limit` times until the pair forms a valid switch. For undirected
/// graphs the second edge is flipped with probability one half so that both
/// ways of reconnecting the four endpoints are reachable.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SwitchSampler {
    repeat_limit: usize,
}

impl Default for SwitchSampler {
    fn default() -> Self {
        Self::new(Self::DEFAULT_REPEAT_LIMIT)
    }
}

impl SwitchSampler {
    /// Second-edge draws per sample when not configured otherwise.
    pub const DEFAULT_REPEAT_LIMIT: usize = 10;

    /// Creates a sampler; a zero limit is raised to one.
    #[must_use]
    pub fn new(repeat_limit: usize) -> Self {
        Self {
            repeat_limit: repeat_limit.max(1),
        }
    }

    /// Returns the configured number of second-edge draws.
    #[must_use]
    pub fn repeat_limit(&self) -> usize {
        self.repeat_limit
    }

    /// Draws a valid switch, or `None` when the attempt budget runs out.
    ///
    /// Graphs with fewer than two edges always yield `None`.
    pub fn sample<R: Rng + ?Sized>(&self, graph: &Graph, rng: &mut R) -> Option<SwitchCandidate> {
        let edges = graph.edges();
        if edges.len() < 2 {
            return None;
        }
        let first = *edges.choose(rng)?;
        for _ in 0..self.repeat_limit {
            let mut second = *edges.choose(rng)?;
            if !graph.is_directed() && rng.gen_bool(0.5) {
                second = second.reversed();
            }
            let candidate = SwitchCandidate::new(first, second);
            if candidate.is_valid_for(graph) {
                return Some(candidate);
            }
        }
        None
    }

    /// Commits `switches` valid switches to `graph`.
    ///
    /// Passing zero performs [`DEFAULT_SWITCHES_PER_EDGE`] switches per edge.
    ///
    /// # Errors
    /// Returns [`RewireError::GraphTooSmall`] when switches are requested on
    /// a graph with fewer than two edges, and
    /// [`RewireError::SwitchUnavailable`] after
    /// [`MAX_CONSECUTIVE_FAILURES`] samples in a row find no candidate.
    #[instrument(
        name = "core.mix",
        err,
        skip(self, graph, rng),
        fields(edges = graph.edge_count(), repeat_limit = self.repeat_limit),
    )]
    pub fn mix<R: Rng + ?Sized>(
        &self,
        graph: &mut Graph,
        switches: usize,
        rng: &mut R,
    ) -> Result<MixReport> {
        let target = if switches == 0 {
            DEFAULT_SWITCHES_PER_EDGE * graph.edge_count()
        } else {
            switches
        };
        if target > 0 && graph.edge_count() < 2 {
            return Err(RewireError::GraphTooSmall {
                edges: graph.edge_count(),
            });
        }

        let mut report = MixReport::default();
        let mut consecutive = 0_usize;
        while report.switches < target {
            let Some(candidate) = self.sample(graph, rng) else {
                report.failed_samples += 1;
                consecutive += 1;
                if consecutive >= MAX_CONSECUTIVE_FAILURES {
                    return Err(RewireError::SwitchUnavailable {
                        attempts: consecutive,
                    });
                }
                continue;
            };
            graph.apply_switch(&candidate)?;
            report.switches += 1;
            consecutive = 0;
        }
        debug!(
            switches = report.switches,
            failed_samples = report.failed_samples,
            "mixing finished"
        );
        Ok(report)
    }
}
