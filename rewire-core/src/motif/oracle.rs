//! Motif counting backends.

use std::collections::{BTreeSet, HashMap};

use super::{MotifCounts, MotifSize, PatternCatalogue, catalogue::pair_index};
use crate::{error::OracleError, graph::Graph};

/// Counts non-induced pattern occurrences in a graph.
///
/// Implementations return the concatenated vector for every pattern size from
/// three up to `size`, in [`PatternCatalogue`] order. They are shared between
/// the two halves of a permutation test, which may run on separate threads.
///
/// # Examples
/// ```
/// use rewire_core::{ExactOracle, Graph, MotifOracle, MotifSize};
///
/// let triangle = Graph::from_edges(false, [(0, 1), (1, 2), (2, 0)])?;
/// let counts = ExactOracle.count(&triangle, MotifSize::Three)?;
/// assert_eq!(counts.as_slice(), &[1.0, 3.0, 3.0, 1.0]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait MotifOracle: Send + Sync {
    /// Returns the non-induced counts of `graph`.
    ///
    /// # Errors
    /// Implementations return an [`OracleError`] when counting fails.
    fn count(&self, graph: &Graph, size: MotifSize) -> Result<MotifCounts, OracleError>;

    /// Short identifier used in logs.
    fn name(&self) -> &str;
}

/// In-process oracle.
///
/// Connected patterns are counted by growing every connected vertex set of
/// the pattern size from its smallest member, so the work follows the edges
/// rather than the number of vertex subsets. Disconnected patterns are
/// derived from node and edge totals, degrees and the smaller connected
/// counts. Directed graphs are counted on their underlying undirected
/// structure.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExactOracle;

impl ExactOracle {
    /// Induced counts of the connected patterns with exactly `size`
    /// vertices, indexed like [`PatternCatalogue::connected`].
    #[must_use]
    pub fn connected_census(graph: &Graph, size: MotifSize) -> Vec<u64> {
        Adjacency::new(graph).connected_census(size)
    }
}

impl MotifOracle for ExactOracle {
    fn count(&self, graph: &Graph, size: MotifSize) -> Result<MotifCounts, OracleError> {
        let adjacency = Adjacency::new(graph);
        let mut blocks: Vec<Vec<u128>> = Vec::with_capacity(3);
        for block in size.blocks() {
            let mut counts = adjacency.disconnected_counts(block, &blocks);
            counts.extend(adjacency.connected_counts(block));
            blocks.push(counts);
        }
        let values = blocks.into_iter().flatten().map(|count| count as f64);
        Ok(MotifCounts::new(values.collect()))
    }

    fn name(&self) -> &str {
        "exact"
    }
}

/// Undirected simple view of a graph over dense positions `0..n`.
struct Adjacency {
    neighbours: Vec<Vec<usize>>,
    edges: u128,
}

impl Adjacency {
    fn new(graph: &Graph) -> Self {
        let index: HashMap<_, _> = graph
            .nodes()
            .enumerate()
            .map(|(position, node)| (node, position))
            .collect();
        let mut sets = vec![BTreeSet::new(); index.len()];
        for edge in graph.edges() {
            if let (Some(&a), Some(&b)) = (index.get(&edge.source), index.get(&edge.target)) {
                sets[a].insert(b);
                sets[b].insert(a);
            }
        }
        let neighbours: Vec<Vec<usize>> = sets
            .into_iter()
            .map(|set| set.into_iter().collect())
            .collect();
        let ends: usize = neighbours.iter().map(Vec::len).sum();
        Self {
            neighbours,
            edges: (ends / 2) as u128,
        }
    }

    fn nodes(&self) -> u128 {
        self.neighbours.len() as u128
    }

    fn degree(&self, node: usize) -> u128 {
        self.neighbours[node].len() as u128
    }

    fn adjacent(&self, a: usize, b: usize) -> bool {
        self.neighbours[a].binary_search(&b).is_ok()
    }

    /// Induced counts of the connected `size`-vertex patterns.
    fn connected_census(&self, size: MotifSize) -> Vec<u64> {
        let catalogue = PatternCatalogue::get(size);
        let vertices = size.vertices();
        let offset = catalogue.len() - size.connected_len();
        let mut counts = vec![0_u64; size.connected_len()];
        self.each_connected_set(vertices, |members| {
            let mut mask = 0_usize;
            for (first, &a) in members.iter().enumerate() {
                for (second, &b) in members.iter().enumerate().skip(first + 1) {
                    if self.adjacent(a, b) {
                        mask |= 1 << pair_index(vertices, first, second);
                    }
                }
            }
            if let Some(slot) = catalogue
                .classify(mask)
                .and_then(|class| class.checked_sub(offset))
            {
                counts[slot] += 1;
            }
        });
        counts
    }

    /// Non-induced counts of the connected `size`-vertex patterns.
    ///
    /// A connected pattern only sits inside connected patterns on the same
    /// vertices, so the connected corner of the containment matrix suffices.
    fn connected_counts(&self, size: MotifSize) -> Vec<u128> {
        let induced = self.connected_census(size);
        let catalogue = PatternCatalogue::get(size);
        let offset = catalogue.len() - size.connected_len();
        catalogue.containment()[offset..]
            .iter()
            .map(|row| {
                row[offset..]
                    .iter()
                    .zip(&induced)
                    .map(|(&times, &count)| u128::from(times) * u128::from(count))
                    .sum()
            })
            .collect()
    }

    /// Non-induced counts of the disconnected `size`-vertex patterns.
    ///
    /// `smaller` holds the finished blocks of every smaller size. Each
    /// disconnected pattern is a smaller pattern padded with isolated
    /// vertices, or two vertex-disjoint components.
    fn disconnected_counts(&self, size: MotifSize, smaller: &[Vec<u128>]) -> Vec<u128> {
        let n = self.nodes();
        let m = self.edges;
        match size {
            MotifSize::Three => vec![choose(n, 3), m * n.saturating_sub(2)],
            MotifSize::Four => {
                let (wedges, triangles) = (smaller[0][2], smaller[0][3]);
                let rest = n.saturating_sub(3);
                vec![
                    choose(n, 4),
                    m * choose(n.saturating_sub(2), 2),
                    choose(m, 2) - wedges,
                    wedges * rest,
                    triangles * rest,
                ]
            }
            MotifSize::Five => {
                let (wedges, triangles) = (smaller[0][2], smaller[0][3]);
                let pairs = choose(n.saturating_sub(3), 2);
                let spare = n.saturating_sub(4);
                let mut counts = vec![
                    choose(n, 5),
                    m * choose(n.saturating_sub(2), 3),
                    (choose(m, 2) - wedges) * spare,
                    wedges * pairs,
                    triangles * pairs,
                ];
                let four_connected = MotifSize::Four.connected_len();
                let four = &smaller[1];
                let padded = four[four.len() - four_connected..].iter().map(|count| count * spare);
                counts.extend(padded);
                let (wedge_edge, triangle_edge) = self.component_pairs();
                counts.extend([wedge_edge, triangle_edge]);
                counts
            }
        }
    }

    /// Wedges and triangles paired with a vertex-disjoint edge.
    fn component_pairs(&self) -> (u128, u128) {
        let m = self.edges;
        let mut wedge_edge = 0_u128;
        let mut triangle_edge = 0_u128;
        for (centre, around) in self.neighbours.iter().enumerate() {
            for (position, &a) in around.iter().enumerate() {
                for &b in &around[position + 1..] {
                    let closed = self.adjacent(a, b);
                    let inner = if closed { 3 } else { 2 };
                    let touching = self.degree(centre) + self.degree(a) + self.degree(b) - inner;
                    wedge_edge += m - touching;
                    if closed && centre < a {
                        triangle_edge += m - touching;
                    }
                }
            }
        }
        (wedge_edge, triangle_edge)
    }

    /// Visits every connected set of `vertices` nodes exactly once.
    ///
    /// Each set is grown from its smallest node. A neighbour of the newest
    /// member joins the frontier only when it is larger than the root and
    /// lies outside the closed neighbourhood of the earlier members.
    fn each_connected_set<F>(&self, vertices: usize, mut visit: F)
    where
        F: FnMut(&[usize]),
    {
        let mut members = Vec::with_capacity(vertices);
        for root in 0..self.neighbours.len() {
            let frontier: Vec<usize> = self.neighbours[root]
                .iter()
                .copied()
                .filter(|&node| node > root)
                .collect();
            members.push(root);
            self.grow(vertices, root, &mut members, frontier, &mut visit);
            members.pop();
        }
    }

    fn grow<F>(
        &self,
        vertices: usize,
        root: usize,
        members: &mut Vec<usize>,
        mut frontier: Vec<usize>,
        visit: &mut F,
    ) where
        F: FnMut(&[usize]),
    {
        if members.len() == vertices {
            visit(members.as_slice());
            return;
        }
        while let Some(next) = frontier.pop() {
            let mut extended = frontier.clone();
            for &candidate in &self.neighbours[next] {
                let fresh = candidate > root
                    && !members.contains(&candidate)
                    && !extended.contains(&candidate)
                    && !members.iter().any(|&member| self.adjacent(member, candidate));
                if fresh {
                    extended.push(candidate);
                }
            }
            members.push(next);
            self.grow(vertices, root, members, extended, visit);
            members.pop();
        }
    }
}

/// Binomial coefficient, zero when `k > n`.
fn choose(n: u128, k: u128) -> u128 {
    if k > n {
        return 0;
    }
    (0..k).fold(1, |acc, step| acc * (n - step) / (step + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use rstest::rstest;

    use crate::test_utils::suite_proptest_config;

    fn cycle(len: usize) -> Graph {
        Graph::from_edges(false, (0..len).map(|node| (node, (node + 1) % len))).expect("simple")
    }

    fn clique(len: usize) -> Graph {
        let pairs = (0..len).flat_map(|a| (a + 1..len).map(move |b| (a, b)));
        Graph::from_edges(false, pairs).expect("simple")
    }

    /// Classifies every vertex subset and applies the full containment
    /// matrix. Slow, but independent of the connected-set search.
    fn subset_counts(graph: &Graph, size: MotifSize) -> Vec<f64> {
        let nodes: Vec<_> = graph.nodes().collect();
        let mut values = Vec::new();
        for block in size.blocks() {
            let catalogue = PatternCatalogue::get(block);
            let vertices = block.vertices();
            let mut induced = vec![0_u64; catalogue.len()];
            if nodes.len() >= vertices {
                let mut combination: Vec<usize> = (0..vertices).collect();
                loop {
                    let mut mask = 0_usize;
                    for first in 0..vertices {
                        for second in first + 1..vertices {
                            let (a, b) = (nodes[combination[first]], nodes[combination[second]]);
                            if graph.contains_edge(a, b) || graph.contains_edge(b, a) {
                                mask |= 1 << pair_index(vertices, first, second);
                            }
                        }
                    }
                    induced[catalogue.classify(mask).expect("complete catalogue")] += 1;
                    if !advance(&mut combination, nodes.len()) {
                        break;
                    }
                }
            }
            values.extend(catalogue.containment().iter().map(|row| {
                let total: u64 = row.iter().zip(&induced).map(|(m, c)| m * c).sum();
                total as f64
            }));
        }
        values
    }

    /// Steps to the next `k`-combination of `0..n` in lexicographic order.
    fn advance(combination: &mut [usize], n: usize) -> bool {
        let k = combination.len();
        for position in (0..k).rev() {
            if combination[position] < n - k + position {
                combination[position] += 1;
                for next in position + 1..k {
                    combination[next] = combination[next - 1] + 1;
                }
                return true;
            }
        }
        false
    }

    #[rstest]
    #[case::six_cycle(cycle(6), vec![20.0, 24.0, 6.0, 0.0])]
    #[case::triangle(cycle(3), vec![1.0, 3.0, 3.0, 1.0])]
    #[case::path(Graph::from_edges(false, [(0, 1), (1, 2)]).expect("simple"), vec![1.0, 2.0, 1.0, 0.0])]
    fn three_vertex_counts(#[case] graph: Graph, #[case] expected: Vec<f64>) {
        let counts = ExactOracle.count(&graph, MotifSize::Three).expect("exact");
        assert_eq!(counts.as_slice(), expected.as_slice());
    }

    #[test]
    fn four_clique_counts_every_subpattern() {
        let counts = ExactOracle
            .count(&clique(4), MotifSize::Four)
            .expect("exact");
        let expected = [
            4.0, 12.0, 12.0, 4.0, // three-vertex block
            1.0, 6.0, 3.0, 12.0, 4.0, 4.0, 12.0, 12.0, 3.0, 6.0, 1.0,
        ];
        assert_eq!(counts.as_slice(), expected.as_slice());
    }

    #[test]
    fn five_clique_pairs_components_with_disjoint_edges() {
        let counts = ExactOracle
            .count(&clique(5), MotifSize::Five)
            .expect("exact");
        let names = PatternCatalogue::vector_names(MotifSize::Five);
        let entry = |name: &str| {
            let position = names
                .iter()
                .rposition(|candidate| *candidate == name)
                .expect("catalogued");
            counts.as_slice()[position]
        };
        // Thirty wedges and ten triangles, each leaving exactly one edge.
        assert_eq!(entry("wedge-edge"), 30.0);
        assert_eq!(entry("triangle-edge"), 10.0);
        assert_eq!(entry("matching"), 15.0);
    }

    #[test]
    fn five_cycle_census_has_one_induced_cycle() {
        let induced = ExactOracle::connected_census(&cycle(5), MotifSize::Five);
        let position = PatternCatalogue::get(MotifSize::Five)
            .connected()
            .iter()
            .position(|pattern| pattern.name() == "five-cycle")
            .expect("catalogued");
        assert_eq!(induced.len(), MotifSize::Five.connected_len());
        assert_eq!(induced.iter().sum::<u64>(), 1);
        assert_eq!(induced[position], 1);
    }

    #[test]
    fn long_rings_only_hold_paths() {
        let induced = ExactOracle::connected_census(&cycle(200), MotifSize::Five);
        let position = PatternCatalogue::get(MotifSize::Five)
            .connected()
            .iter()
            .position(|pattern| pattern.name() == "four-path")
            .expect("catalogued");
        assert_eq!(induced.iter().sum::<u64>(), 200);
        assert_eq!(induced[position], 200);
    }

    #[test]
    fn graphs_smaller_than_the_pattern_count_nothing() {
        let counts = ExactOracle
            .count(&cycle(3), MotifSize::Four)
            .expect("exact");
        assert_eq!(&counts.as_slice()[4..], &[0.0; 11]);
    }

    #[test]
    fn isolated_nodes_only_pad_disconnected_patterns() {
        let mut graph = cycle(3);
        graph.add_node(7);
        let counts = ExactOracle.count(&graph, MotifSize::Three).expect("exact");
        assert_eq!(counts.as_slice(), &[4.0, 6.0, 3.0, 1.0]);
    }

    #[rstest]
    #[case(0, 3, 0)]
    #[case(3, 3, 1)]
    #[case(6, 2, 15)]
    #[case(10, 5, 252)]
    fn binomials(#[case] n: u128, #[case] k: u128, #[case] expected: u128) {
        assert_eq!(choose(n, k), expected);
    }

    fn random_graph(pairs: &[(usize, usize)], isolated: usize) -> Graph {
        let mut graph = Graph::new(false);
        for &(u, v) in pairs {
            // Self-loops and repeats are simply skipped.
            let _ = graph.add_edge(u, v);
        }
        for node in 0..isolated {
            graph.add_node(100 + node);
        }
        graph
    }

    proptest! {
        #![proptest_config(suite_proptest_config(48))]

        #[test]
        fn matches_the_subset_census(
            pairs in proptest::collection::vec((0_usize..9, 0_usize..9), 0..24),
            isolated in 0_usize..3,
            size in prop_oneof![
                Just(MotifSize::Three),
                Just(MotifSize::Four),
                Just(MotifSize::Five),
            ],
        ) {
            let graph = random_graph(&pairs, isolated);
            let counts = ExactOracle.count(&graph, size).expect("exact");
            let expected = subset_counts(&graph, size);
            prop_assert_eq!(counts.as_slice(), expected.as_slice());
        }
    }
}
