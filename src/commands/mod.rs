//! CLI subcommand implementations.

pub mod map;
