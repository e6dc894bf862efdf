//! Shared test utilities used across rewire crates.

pub mod ci;
pub mod tracing;
