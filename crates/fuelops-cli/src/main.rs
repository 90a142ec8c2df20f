//! fuelops - fuel ledger and LPO checkpoint allocation for long-haul trucks
//!
//! Tracks each truck journey's fuel balance, resolves filling stations to
//! route checkpoints, and records LPO cancellations and diversions.

mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::Cli;
use fuelops_types::OutputFormat;

fn main() {
    let cli = Cli::parse();
    let json = cli.format == Some(OutputFormat::Json);

    if let Err(e) = commands::execute(cli) {
        eprintln!("Error: {}", e);
        if json {
            if let Ok(report) = serde_json::to_string_pretty(&e.report()) {
                println!("{}", report);
            }
        }
        std::process::exit(1);
    }
}
