//! In-memory mutable graph used by the rewiring walk.
//!
//! The store keeps three views of the same edge set in lock-step: an edge
//! vector for uniform sampling, an index from edge to vector slot for O(1)
//! removal, and ordered adjacency sets for deterministic traversal. Every
//! mutating method validates before it touches any of the three, so a failed
//! call leaves the graph unchanged.

mod io;
mod relabel;

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fmt,
};

use crate::{error::GraphError, switch::SwitchCandidate};

pub use self::{
    io::{GraphFormat, MAX_DECLARED_NODES},
    relabel::Relabeling,
};

/// Opaque node identifier.
pub type NodeId = usize;

/// An edge between two nodes.
///
/// Undirected graphs store edges canonically with `source < target`; use
/// [`Edge::normalised`] before comparing edges taken from different sources.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Edge {
    /// Tail of the edge (smaller endpoint for undirected graphs).
    pub source: NodeId,
    /// Head of the edge (larger endpoint for undirected graphs).
    pub target: NodeId,
}

impl Edge {
    /// Creates an edge from `source` to `target`.
    ///
    /// # Examples
    /// ```
    /// use rewire_core::Edge;
    ///
    /// let edge = Edge::new(3, 1);
    /// assert_eq!(edge.normalised(false), Edge::new(1, 3));
    /// assert_eq!(edge.normalised(true), Edge::new(3, 1));
    /// ```
    #[must_use]
    pub const fn new(source: NodeId, target: NodeId) -> Self {
        Self { source, target }
    }

    /// Returns the edge with its endpoints swapped.
    #[must_use]
    pub const fn reversed(self) -> Self {
        Self::new(self.target, self.source)
    }

    /// Returns the storage form of the edge for a graph of the given kind.
    #[must_use]
    pub const fn normalised(self, directed: bool) -> Self {
        if directed || self.source <= self.target {
            self
        } else {
            self.reversed()
        }
    }

    /// Returns `true` when both endpoints coincide.
    #[must_use]
    pub const fn is_self_loop(self) -> bool {
        self.source == self.target
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.source, self.target)
    }
}

impl From<(NodeId, NodeId)> for Edge {
    fn from((source, target): (NodeId, NodeId)) -> Self {
        Self::new(source, target)
    }
}

/// Mutable graph with degree tracking.
///
/// Cloning performs a deep copy; two clones never share state.
///
/// # Examples
/// ```
/// use rewire_core::Graph;
///
/// let mut graph = Graph::new(false);
/// graph.add_edge(0, 1)?;
/// graph.add_edge(1, 2)?;
/// assert_eq!(graph.edge_count(), 2);
/// assert_eq!(graph.degree(1), 2);
/// assert!(graph.contains_edge(2, 1));
/// # Ok::<(), rewire_core::GraphError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct Graph {
    directed: bool,
    edges: Vec<Edge>,
    positions: HashMap<Edge, usize>,
    adjacency: BTreeMap<NodeId, BTreeSet<NodeId>>,
    degrees: BTreeMap<NodeId, usize>,
}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new(directed: bool) -> Self {
        Self {
            directed,
            ..Self::default()
        }
    }

    /// Creates a graph holding the isolated nodes `0..count`.
    #[must_use]
    pub fn with_nodes(count: usize, directed: bool) -> Self {
        let mut graph = Self::new(directed);
        for node in 0..count {
            graph.add_node(node);
        }
        graph
    }

    /// Builds a graph from an edge iterator, registering endpoints as needed.
    ///
    /// # Errors
    /// Returns the first [`GraphError`] raised by [`Graph::add_edge`].
    pub fn from_edges<I>(directed: bool, edges: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = (NodeId, NodeId)>,
    {
        let mut graph = Self::new(directed);
        for (source, target) in edges {
            graph.add_edge(source, target)?;
        }
        Ok(graph)
    }

    /// Returns `true` for directed graphs.
    #[must_use]
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Registers an isolated node. Returns `false` when it already existed.
    pub fn add_node(&mut self, node: NodeId) -> bool {
        if self.adjacency.contains_key(&node) {
            return false;
        }
        self.adjacency.insert(node, BTreeSet::new());
        self.degrees.insert(node, 0);
        true
    }

    /// Returns `true` when `node` is part of the graph.
    #[must_use]
    pub fn contains_node(&self, node: NodeId) -> bool {
        self.adjacency.contains_key(&node)
    }

    /// Returns `true` when the edge is present. Undirected graphs accept
    /// either orientation.
    #[must_use]
    pub fn contains_edge(&self, source: NodeId, target: NodeId) -> bool {
        self.positions
            .contains_key(&Edge::new(source, target).normalised(self.directed))
    }

    /// Adds an edge, registering unknown endpoints as new nodes.
    ///
    /// # Errors
    /// Returns [`GraphError::SelfLoop`] or [`GraphError::DuplicateEdge`]; the
    /// graph is left unchanged on error.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId) -> Result<(), GraphError> {
        let edge = Edge::new(source, target);
        if edge.is_self_loop() {
            return Err(GraphError::SelfLoop { node: source });
        }
        let edge = edge.normalised(self.directed);
        if self.positions.contains_key(&edge) {
            return Err(GraphError::DuplicateEdge { edge });
        }

        self.add_node(source);
        self.add_node(target);
        self.positions.insert(edge, self.edges.len());
        self.edges.push(edge);
        self.link(edge.source, edge.target);
        if !self.directed {
            self.link(edge.target, edge.source);
        }
        self.bump_degree(source, true);
        self.bump_degree(target, true);
        Ok(())
    }

    /// Removes an edge. Undirected graphs accept either orientation.
    ///
    /// # Errors
    /// Returns [`GraphError::MissingEdge`] when the edge is absent.
    pub fn remove_edge(&mut self, source: NodeId, target: NodeId) -> Result<(), GraphError> {
        let edge = Edge::new(source, target).normalised(self.directed);
        let Some(slot) = self.positions.remove(&edge) else {
            return Err(GraphError::MissingEdge { edge });
        };

        self.edges.swap_remove(slot);
        if let Some(moved) = self.edges.get(slot) {
            self.positions.insert(*moved, slot);
        }
        self.unlink(edge.source, edge.target);
        if !self.directed {
            self.unlink(edge.target, edge.source);
        }
        self.bump_degree(source, false);
        self.bump_degree(target, false);
        Ok(())
    }

    /// Commits a double-edge swap: removes both candidate edges and adds
    /// both cross edges.
    ///
    /// The candidate is validated against the current graph before any
    /// mutation, so the four changes are applied together or not at all.
    ///
    /// # Errors
    /// Returns [`GraphError::InvalidSwitch`] when the candidate edges are
    /// missing, a cross edge already exists or would be a self-loop, or the
    /// endpoints are not four distinct nodes.
    pub fn apply_switch(&mut self, candidate: &SwitchCandidate) -> Result<(), GraphError> {
        if !candidate.is_valid_for(self) {
            return Err(GraphError::InvalidSwitch {
                first: candidate.first(),
                second: candidate.second(),
            });
        }
        let [first, second] = candidate.removed();
        let [third, fourth] = candidate.added();
        self.remove_edge(first.source, first.target)?;
        self.remove_edge(second.source, second.target)?;
        self.add_edge(third.source, third.target)?;
        self.add_edge(fourth.source, fourth.target)?;
        Ok(())
    }

    /// Iterates the neighbours of `node` in ascending id order.
    ///
    /// For directed graphs these are the successors. Unknown nodes yield an
    /// empty iterator.
    pub fn neighbours(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency
            .get(&node)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Returns the number of edges incident to `node` (in plus out for
    /// directed graphs).
    #[must_use]
    pub fn degree(&self, node: NodeId) -> usize {
        self.degrees.get(&node).copied().unwrap_or(0)
    }

    /// Returns `(node, degree)` pairs in ascending node order.
    #[must_use]
    pub fn degree_sequence(&self) -> Vec<(NodeId, usize)> {
        self.degrees
            .iter()
            .map(|(&node, &degree)| (node, degree))
            .collect()
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Returns the number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the edges in storage order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Iterates the nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency.keys().copied()
    }

    /// Returns the edges sorted lexicographically.
    #[must_use]
    pub fn sorted_edges(&self) -> Vec<Edge> {
        let mut edges = self.edges.clone();
        edges.sort_unstable();
        edges
    }

    /// Copies the subgraph induced by `nodes`.
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownNode`] when a requested node is absent.
    pub fn induced_subgraph(&self, nodes: &BTreeSet<NodeId>) -> Result<Self, GraphError> {
        let mut subgraph = Self::new(self.directed);
        for &node in nodes {
            if !self.contains_node(node) {
                return Err(GraphError::UnknownNode { node });
            }
            subgraph.add_node(node);
        }
        for &node in nodes {
            for neighbour in self.neighbours(node) {
                let keep = nodes.contains(&neighbour) && (self.directed || node < neighbour);
                if keep {
                    subgraph.add_edge(node, neighbour)?;
                }
            }
        }
        Ok(subgraph)
    }

    /// Returns `true` when both graphs hold the same nodes and edges,
    /// regardless of edge storage order.
    #[must_use]
    pub fn same_structure(&self, other: &Self) -> bool {
        self.directed == other.directed
            && self.adjacency == other.adjacency
            && self.edge_count() == other.edge_count()
    }

    fn link(&mut self, from: NodeId, to: NodeId) {
        self.adjacency.entry(from).or_default().insert(to);
    }

    fn unlink(&mut self, from: NodeId, to: NodeId) {
        if let Some(set) = self.adjacency.get_mut(&from) {
            set.remove(&to);
        }
    }

    fn bump_degree(&mut self, node: NodeId, increment: bool) {
        let degree = self.degrees.entry(node).or_insert(0);
        *degree = if increment {
            degree.saturating_add(1)
        } else {
            degree.saturating_sub(1)
        };
    }
}
