use proptest::{prelude::*, test_runner::Config as ProptestConfig};
use rewire_core::{Graph, MotifCounts, MotifSize, NodeId, PatternCatalogue};
use rewire_test_support::ci::property_test_profile::ProptestRunProfile;

/// Proptest configuration honouring the shared CI profile.
#[must_use]
pub fn proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

#[must_use]
pub fn ring(count: usize) -> Graph {
    Graph::from_edges(false, (0..count).map(|node| (node, (node + 1) % count)))
        .expect("ring is simple")
}

#[must_use]
pub fn star(leaves: usize) -> Graph {
    Graph::from_edges(false, (1..=leaves).map(|leaf| (0, leaf))).expect("star is simple")
}

/// Two four-cliques joined by the bridge 3-4 plus a pendant on node 7.
#[must_use]
pub fn barbell() -> Graph {
    let mut edges = Vec::new();
    for offset in [0, 4] {
        for a in 0..4 {
            for b in a + 1..4 {
                edges.push((offset + a, offset + b));
            }
        }
    }
    edges.extend([(3, 4), (7, 8)]);
    Graph::from_edges(false, edges).expect("barbell is simple")
}

/// Builds a simple graph, skipping self-loops and repeated pairs.
#[must_use]
pub fn simple_graph(pairs: &[(NodeId, NodeId)]) -> Graph {
    let mut graph = Graph::new(false);
    for &(u, v) in pairs {
        let _ = graph.add_edge(u, v);
    }
    graph
}

/// Random simple graphs on at most `nodes` vertices.
pub fn graph_strategy(nodes: usize, max_pairs: usize) -> impl Strategy<Value = Graph> {
    proptest::collection::vec((0..nodes, 0..nodes), 2..max_pairs)
        .prop_map(|pairs| simple_graph(&pairs))
}

/// Entries of a concatenated count vector that belong to connected patterns.
#[must_use]
pub fn connected_entries(counts: &MotifCounts, size: MotifSize) -> Vec<f64> {
    size.blocks()
        .flat_map(|block| {
            let offset = block.block_range().start;
            PatternCatalogue::get(block)
                .patterns()
                .iter()
                .enumerate()
                .filter(|(_, pattern)| pattern.is_connected())
                .map(move |(index, _)| counts[offset + index])
        })
        .collect()
}
