//! Shared test utilities for `rewire-core`.

use std::sync::atomic::{AtomicUsize, Ordering};

use proptest::test_runner::Config as ProptestConfig;
use rewire_test_support::ci::property_test_profile::ProptestRunProfile;

use crate::{
    ExactOracle,
    error::OracleError,
    graph::Graph,
    motif::{MotifCounts, MotifOracle, MotifSize},
};

/// Builds a proptest configuration from the shared CI profile.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

/// [`MotifOracle`] wrapper around [`ExactOracle`] that counts queries and
/// remembers the largest graph it was asked about.
#[derive(Debug, Default)]
pub(crate) struct CountingOracle {
    calls: AtomicUsize,
    largest: AtomicUsize,
}

impl CountingOracle {
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    pub(crate) fn largest_graph(&self) -> usize {
        self.largest.load(Ordering::Relaxed)
    }
}

impl MotifOracle for CountingOracle {
    fn count(&self, graph: &Graph, size: MotifSize) -> Result<MotifCounts, OracleError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.largest.fetch_max(graph.node_count(), Ordering::Relaxed);
        ExactOracle.count(graph, size)
    }

    fn name(&self) -> &str {
        "counting"
    }
}

/// Cycle on `count` nodes.
pub(crate) fn cycle(count: usize) -> Graph {
    Graph::from_edges(false, (0..count).map(|node| (node, (node + 1) % count)))
        .expect("cycle has no self-loops or duplicates")
}
