//! dcm2niix-task CLI entrypoint.
//!
//! Provides a thin wrapper over the `cli` module: parse args, run the
//! conversion (or print its command line), and exit with appropriate status.
//! For programmatic use, prefer the library API (`dcm2niix_task::api`).

use clap::Parser;

mod cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = cli::CliArgs::parse();
    cli::run(args)
}
