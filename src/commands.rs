//! Subcommands of the `jsel` binary that don't read JSON.
pub mod generate;
