//! CLI command implementations.

pub mod run;
pub mod signal;
pub mod state;
