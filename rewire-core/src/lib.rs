//! Rewire core library: motif significance testing by degree-preserving
//! random walks.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod error;
mod graph;
pub mod motif;
mod neighbourhood;
mod permutation;
mod rewire;
mod rng;
mod sanitize;
mod switch;
#[cfg(test)]
mod test_utils;
mod trajectory;

pub use crate::{
    builder::{DEFAULT_SEED, ExecutionStrategy, RewireBuilder},
    error::{
        FormatErrorKind, GraphError, GraphErrorCode, OracleError, OracleErrorCode, Result,
        RewireError, RewireErrorCode,
    },
    graph::{Edge, Graph, GraphFormat, MAX_DECLARED_NODES, NodeId, Relabeling},
    motif::{
        CATALOGUE_VERSION, ConversionMatrix, ExactOracle, ExternalOracle, InducedCountConverter,
        MotifCounts, MotifOracle, MotifSize, Pattern, PatternCatalogue, parse_results,
    },
    neighbourhood::{Neighbourhood, area_around_edge, subgraph_around_edge, switch_area},
    permutation::{PValueBlock, PermutationOutcome, PermutationTester, p_values_from_exceedances},
    rewire::Rewire,
    sanitize::{SanitizeReport, Sanitized, sanitize_path, sanitize_reader},
    switch::{
        DEFAULT_SWITCHES_PER_EDGE, MAX_CONSECUTIVE_FAILURES, MixReport, SwitchCandidate,
        SwitchSampler,
    },
    trajectory::{NoCandidatePolicy, Trajectory, TrajectoryAccumulator, switch_delta},
};
