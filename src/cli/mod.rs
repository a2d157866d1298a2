//! Command line interface for the taxon binary.

pub mod args;
pub mod commands;
pub mod output;
