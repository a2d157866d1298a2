//! taxon CLI binary.

use clap::Parser;
use std::process;
use taxon::cli::{args::TaxonArgs, commands::execute_command};
use tracing_subscriber::EnvFilter;

fn main() {
    // Parse command line arguments using clap
    let args = TaxonArgs::parse();

    // Map verbosity onto the tracing filter unless RUST_LOG overrides it.
    let default_filter = match args.verbosity() {
        0 => "error",
        1 => "warn",
        2 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Execute the command
    if let Err(e) = execute_command(args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
