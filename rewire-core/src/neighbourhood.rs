//! Bounded-depth neighbourhoods around edges.
//!
//! A motif of `k` vertices that contains an edge lies entirely within
//! `k - 2` hops of the edge's endpoints, so re-counting inside that area is
//! enough to observe how a switch changes the motif census.

use std::collections::{BTreeSet, VecDeque};

use crate::{
    error::GraphError,
    graph::{Edge, Graph, NodeId},
    switch::SwitchCandidate,
};

/// Node set returned by the extractor.
pub type Neighbourhood = BTreeSet<NodeId>;

/// Collects the nodes within reach of `edge`.
///
/// Both endpoints and their neighbours are always included. The neighbours
/// enter the queue at level two; the search then proceeds breadth first and
/// stops at the first node whose level exceeds `depth`, expanding every
/// other popped node by one more level. The edge itself need not exist, which
/// lets callers inspect the area around edges a switch is about to add.
///
/// # Examples
/// ```
/// use rewire_core::{Edge, Graph, area_around_edge};
///
/// let path = Graph::from_edges(false, [(0, 1), (1, 2), (2, 3), (3, 4)])?;
/// let near: Vec<_> = area_around_edge(&path, Edge::new(1, 2), 1).into_iter().collect();
/// assert_eq!(near, vec![0, 1, 2, 3]);
/// let wider: Vec<_> = area_around_edge(&path, Edge::new(1, 2), 2).into_iter().collect();
/// assert_eq!(wider, vec![0, 1, 2, 3, 4]);
/// # Ok::<(), rewire_core::GraphError>(())
/// ```
#[must_use]
pub fn area_around_edge(graph: &Graph, edge: Edge, depth: usize) -> Neighbourhood {
    let mut visited = Neighbourhood::from([edge.source, edge.target]);
    let mut queue = VecDeque::new();
    for node in graph
        .neighbours(edge.source)
        .chain(graph.neighbours(edge.target))
    {
        if visited.insert(node) {
            queue.push_back((node, 2_usize));
        }
    }

    while let Some((node, level)) = queue.pop_front() {
        if level > depth {
            break;
        }
        for neighbour in graph.neighbours(node) {
            if visited.insert(neighbour) {
                queue.push_back((neighbour, level + 1));
            }
        }
    }
    visited
}

/// Copies the subgraph induced by [`area_around_edge`].
///
/// # Errors
/// Returns [`GraphError::UnknownNode`] when an endpoint of `edge` is not part
/// of `graph`.
pub fn subgraph_around_edge(graph: &Graph, edge: Edge, depth: usize) -> Result<Graph, GraphError> {
    graph.induced_subgraph(&area_around_edge(graph, edge, depth))
}

/// Union of the areas around all four edges touched by `candidate`.
#[must_use]
pub fn switch_area(graph: &Graph, candidate: &SwitchCandidate, depth: usize) -> Neighbourhood {
    candidate
        .touched()
        .into_iter()
        .flat_map(|edge| area_around_edge(graph, edge, depth))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::{fixture, rstest};

    #[fixture]
    fn path() -> Graph {
        Graph::from_edges(false, (0..9).map(|node| (node, node + 1))).expect("path is simple")
    }

    #[rstest]
    #[case::depth_one(1, 3..=6)]
    #[case::depth_two(2, 2..=7)]
    #[case::depth_three(3, 1..=8)]
    fn depth_controls_radius(
        path: Graph,
        #[case] depth: usize,
        #[case] expected: std::ops::RangeInclusive<NodeId>,
    ) {
        let area = area_around_edge(&path, Edge::new(4, 5), depth);
        assert_eq!(area, expected.collect::<Neighbourhood>());
    }

    #[rstest]
    fn depth_zero_still_includes_direct_neighbours(path: Graph) {
        let area = area_around_edge(&path, Edge::new(4, 5), 0);
        assert_eq!(area, Neighbourhood::from([3, 4, 5, 6]));
    }

    #[rstest]
    fn absent_edges_use_both_endpoints(path: Graph) {
        let area = area_around_edge(&path, Edge::new(0, 9), 1);
        assert_eq!(area, Neighbourhood::from([0, 1, 8, 9]));
    }

    #[rstest]
    fn switch_area_unions_all_four_edges(path: Graph) {
        let candidate = SwitchCandidate::new(Edge::new(1, 2), Edge::new(6, 7));
        let area = switch_area(&path, &candidate, 1);
        assert_eq!(area, Neighbourhood::from([0, 1, 2, 3, 5, 6, 7, 8]));
    }

    #[rstest]
    fn subgraph_keeps_only_internal_edges(path: Graph) {
        let subgraph = subgraph_around_edge(&path, Edge::new(4, 5), 1).expect("nodes exist");
        assert_eq!(subgraph.node_count(), 4);
        assert_eq!(subgraph.edge_count(), 3);
        assert!(!subgraph.contains_edge(2, 3));
    }

    #[rstest]
    fn unknown_endpoints_are_reported(path: Graph) {
        let error = subgraph_around_edge(&path, Edge::new(4, 42), 1)
            .expect_err("node 42 is absent");
        assert!(matches!(error, GraphError::UnknownNode { node: 42 }));
    }
}
