//! Motif-count change caused by a single switch.

use tracing::trace;

use crate::{
    error::Result,
    graph::Graph,
    motif::{MotifCounts, MotifOracle, MotifSize},
    neighbourhood::switch_area,
    switch::SwitchCandidate,
};

/// Non-induced count change produced by applying `candidate` to `graph`.
///
/// Only the subgraph induced by the union of the four edge neighbourhoods is
/// counted, once before and once after the swap; `graph` itself is not
/// modified. Connected patterns are counted exactly. Counts of disconnected
/// patterns that pair the affected area with the rest of the graph are only
/// observed within the area.
///
/// # Errors
/// Propagates oracle failures and rejects candidates that are not valid for
/// `graph`.
pub fn switch_delta<O>(
    graph: &Graph,
    candidate: &SwitchCandidate,
    size: MotifSize,
    oracle: &O,
) -> Result<MotifCounts>
where
    O: MotifOracle + ?Sized,
{
    let area = switch_area(graph, candidate, size.depth());
    let before_graph = graph.induced_subgraph(&area)?;
    let mut after_graph = before_graph.clone();
    after_graph.apply_switch(candidate)?;

    let before = oracle.count(&before_graph, size)?;
    let after = oracle.count(&after_graph, size)?;
    trace!(area = area.len(), oracle = oracle.name(), "switch delta computed");
    after.difference(&before)
}
