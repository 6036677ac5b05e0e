//! CLI module for artifact-pipeline - command-line interface and subcommands.

pub mod commands;

pub use commands::Cli;
