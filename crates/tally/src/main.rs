//! Tallyflow command-line entry point.
//!
//! Thin shell over the library crates: SKU generation/parsing, label
//! encoding/decoding/rendering, and a one-shot reconciliation cycle against
//! a JSON inventory file.

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tally_logging::{init_logging, LogConfig};

mod cli;

#[derive(Parser, Debug)]
#[command(name = "tally", about = "Inventory identity and stock reconciliation tools")]
struct Cli {
    /// Verbose console logging
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate and parse structured SKUs
    #[command(subcommand)]
    Sku(cli::sku::SkuCommand),
    /// Encode, decode and render scannable labels
    #[command(subcommand)]
    Label(cli::label::LabelCommand),
    /// Reconcile a physical count against a JSON inventory file
    Reconcile(cli::reconcile::ReconcileArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(LogConfig {
        app_name: "tally",
        verbose: cli.verbose,
    }) {
        // Logging is ambient, not load-bearing; keep going without it.
        eprintln!("warning: logging unavailable: {err:#}");
    }

    let result = match cli.command {
        Command::Sku(command) => cli::sku::run(command),
        Command::Label(command) => cli::label::run(command),
        Command::Reconcile(args) => cli::reconcile::run(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
