//! Canonical edge-list reading and writing.
//!
//! Two layouts are understood. The escape layout starts with an `n m` header
//! and numbers nodes from zero; the compact layout starts with a lone `n` and
//! numbers nodes from one. Both carry one `u v` pair per line afterwards.

use std::{
    fmt,
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use tracing::{instrument, warn};

use super::{Edge, Graph, NodeId, Relabeling};
use crate::error::{FormatErrorKind, GraphError};

/// On-disk layout of a canonical edge list.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum GraphFormat {
    /// `n m` header followed by zero-based edges.
    #[default]
    Escape,
    /// `n` header followed by one-based edges.
    Compact,
}

impl GraphFormat {
    /// Returns the first node id used by the layout.
    #[must_use]
    pub const fn base(self) -> NodeId {
        match self {
            Self::Escape => 0,
            Self::Compact => 1,
        }
    }
}

impl fmt::Display for GraphFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Escape => "escape",
            Self::Compact => "compact",
        })
    }
}

/// Largest node count a canonical header may declare.
///
/// Every declared id becomes a node, isolated or not, so the header alone
/// decides how much the loader allocates.
pub const MAX_DECLARED_NODES: usize = 1 << 24;

#[derive(Clone, Copy, Debug)]
struct Header {
    format: GraphFormat,
    nodes: usize,
    edges: Option<usize>,
    line: usize,
}

impl Header {
    fn parse(tokens: &[&str], line: usize) -> Result<Self, GraphError> {
        let header = match tokens {
            [nodes] => Self {
                format: GraphFormat::Compact,
                nodes: parse_id(nodes, line)?,
                edges: None,
                line,
            },
            [nodes, edges] => Self {
                format: GraphFormat::Escape,
                nodes: parse_id(nodes, line)?,
                edges: Some(parse_id(edges, line)?),
                line,
            },
            _ => {
                return Err(GraphError::Format {
                    line,
                    kind: FormatErrorKind::MalformedHeader {
                        tokens: tokens.len(),
                    },
                });
            }
        };
        if header.nodes > MAX_DECLARED_NODES {
            return Err(GraphError::Format {
                line,
                kind: FormatErrorKind::NodeCountTooLarge {
                    declared: header.nodes,
                    limit: MAX_DECLARED_NODES,
                },
            });
        }
        Ok(header)
    }

    /// One past the last id of the declared range.
    const fn end(&self) -> NodeId {
        self.format.base().saturating_add(self.nodes)
    }

    fn check_node(&self, node: NodeId, line: usize) -> Result<NodeId, GraphError> {
        let first = self.format.base();
        let end = self.end();
        if (first..end).contains(&node) {
            Ok(node)
        } else {
            Err(GraphError::Format {
                line,
                kind: FormatErrorKind::NodeOutOfRange { node, first, end },
            })
        }
    }
}

fn parse_id(token: &str, line: usize) -> Result<usize, GraphError> {
    token.parse().map_err(|_| GraphError::Format {
        line,
        kind: FormatErrorKind::NonInteger {
            token: token.to_owned(),
        },
    })
}

impl Graph {
    /// Loads a canonical edge list from `path`.
    ///
    /// The layout is chosen by the header: two integers select
    /// [`GraphFormat::Escape`], one selects [`GraphFormat::Compact`]. Every id
    /// of the declared range becomes a node, so isolated nodes survive; the
    /// range may hold at most [`MAX_DECLARED_NODES`] ids. Blank
    /// lines and lines starting with `#` are ignored. Self-loops and repeated
    /// edges are dropped with a warning.
    ///
    /// # Errors
    /// Returns [`GraphError::Io`] when the file cannot be read and
    /// [`GraphError::Format`] when its contents are malformed.
    #[instrument(
        name = "core.graph.load",
        err,
        skip(path),
        fields(path = %path.as_ref().display()),
    )]
    pub fn load(path: impl AsRef<Path>, directed: bool) -> Result<Self, GraphError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| GraphError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        parse(BufReader::new(file), directed, path)
    }

    /// Parses a canonical edge list from an in-memory reader.
    ///
    /// # Errors
    /// Same as [`Graph::load`].
    pub fn from_reader<R: BufRead>(reader: R, directed: bool) -> Result<Self, GraphError> {
        parse(reader, directed, Path::new("<reader>"))
    }

    /// Writes the graph to `path` in the requested layout.
    ///
    /// Returns the relabeling applied when the node ids were not already the
    /// contiguous range the layout expects.
    ///
    /// # Errors
    /// Returns [`GraphError::Io`] when the file cannot be written.
    #[instrument(
        name = "core.graph.save",
        err,
        skip(self, path),
        fields(path = %path.as_ref().display(), nodes = self.node_count(), edges = self.edge_count()),
    )]
    pub fn save(
        &self,
        path: impl AsRef<Path>,
        format: GraphFormat,
    ) -> Result<Option<Relabeling>, GraphError> {
        let path = path.as_ref();
        let io_error = |source| GraphError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(io_error)?;
        self.write_to(BufWriter::new(file), format).map_err(io_error)
    }

    /// Serialises the graph in the requested layout.
    ///
    /// Edges are sorted lexicographically and undirected edges are written
    /// with the smaller id first. Ids are relabeled by first appearance in the
    /// sorted edge list, isolated nodes last, unless they already form the
    /// range `base..base + n`.
    ///
    /// # Errors
    /// Propagates failures from `writer`.
    ///
    /// # Examples
    /// ```
    /// use rewire_core::{Graph, GraphFormat};
    ///
    /// let graph = Graph::from_edges(false, [(1, 0), (2, 1)])?;
    /// let mut out = Vec::new();
    /// let relabeling = graph.write_to(&mut out, GraphFormat::Escape)?;
    /// assert!(relabeling.is_none());
    /// assert_eq!(String::from_utf8(out)?, "3 2\n0 1\n1 2\n");
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn write_to<W: Write>(
        &self,
        mut writer: W,
        format: GraphFormat,
    ) -> io::Result<Option<Relabeling>> {
        let base = format.base();
        let sorted = self.sorted_edges();
        let relabeling = (!self.nodes().eq(base..base + self.node_count()))
            .then(|| self.first_appearance(&sorted, base));
        let relabel = |node: NodeId| {
            relabeling
                .as_ref()
                .and_then(|mapping| mapping.id(&node))
                .unwrap_or(node)
        };

        let mut edges: Vec<Edge> = sorted
            .iter()
            .map(|edge| Edge::new(relabel(edge.source), relabel(edge.target)).normalised(self.directed))
            .collect();
        edges.sort_unstable();

        match format {
            GraphFormat::Escape => writeln!(writer, "{} {}", self.node_count(), edges.len())?,
            GraphFormat::Compact => writeln!(writer, "{}", self.node_count())?,
        }
        for edge in &edges {
            writeln!(writer, "{} {}", edge.source, edge.target)?;
        }
        writer.flush()?;
        Ok(relabeling)
    }

    fn first_appearance(&self, sorted: &[Edge], base: NodeId) -> Relabeling {
        let mut relabeling = Relabeling::new(base);
        for edge in sorted {
            relabeling.assign(edge.source);
            relabeling.assign(edge.target);
        }
        for node in self.nodes() {
            relabeling.assign(node);
        }
        relabeling
    }
}

fn parse<R: BufRead>(reader: R, directed: bool, origin: &Path) -> Result<Graph, GraphError> {
    let mut header: Option<Header> = None;
    let mut edges = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|source| GraphError::Io {
            path: origin.to_path_buf(),
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        let Some(layout) = header else {
            header = Some(Header::parse(&tokens, line_no)?);
            continue;
        };
        let [source, target] = tokens.as_slice() else {
            return Err(GraphError::Format {
                line: line_no,
                kind: FormatErrorKind::EdgeArity {
                    tokens: tokens.len(),
                },
            });
        };
        let source = layout.check_node(parse_id(source, line_no)?, line_no)?;
        let target = layout.check_node(parse_id(target, line_no)?, line_no)?;
        edges.push(Edge::new(source, target));
    }

    let Some(layout) = header else {
        return Err(GraphError::Format {
            line: 1,
            kind: FormatErrorKind::MissingHeader,
        });
    };
    if let Some(declared) = layout.edges
        && declared != edges.len()
    {
        return Err(GraphError::Format {
            line: layout.line,
            kind: FormatErrorKind::EdgeCountMismatch {
                declared,
                found: edges.len(),
            },
        });
    }

    let base = layout.format.base();
    let mut graph = Graph::new(directed);
    for node in base..layout.end() {
        graph.add_node(node);
    }
    let mut self_loops = 0_usize;
    let mut duplicates = 0_usize;
    for edge in edges {
        match graph.add_edge(edge.source, edge.target) {
            Ok(()) => {}
            Err(GraphError::SelfLoop { .. }) => self_loops += 1,
            Err(GraphError::DuplicateEdge { .. }) => duplicates += 1,
            Err(other) => return Err(other),
        }
    }
    if self_loops > 0 || duplicates > 0 {
        warn!(
            path = %origin.display(),
            self_loops,
            duplicates,
            "dropped invalid edges while loading graph"
        );
    }
    Ok(graph)
}
