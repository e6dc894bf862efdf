//! Support library for the `rewire` binary.
//!
//! Exposes the command pipeline and logging set-up so doctests and unit tests
//! can drive commands without forking a subprocess.

pub mod cli;
pub mod logging;
