//! Library half of the `graphmill` binary, split out so tests can drive the
//! argument parsing and run logic directly.

pub mod cli;
pub mod run;

pub use cli::{Cli, LogLevel};
