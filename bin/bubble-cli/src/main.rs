//! Developer CLI for the bubble contract: storage keys, call encoding and local simulation.

mod cli;
mod config;
mod handlers;
mod scenario;

use anyhow::{Error, Result};
use bubble_common::logging::{self, LoggerConfig};
use clap::Parser;

use crate::handlers::{encode, key, simulate};

#[tokio::main]
async fn main() -> Result<(), Error> {
    logging::init(LoggerConfig::with_base_name("bubble-cli"));

    let cli = cli::Cli::parse();
    match cli.command {
        cli::Commands::Key(args) => key::handle_key(args),
        cli::Commands::Encode(args) => encode::handle_encode(args),
        cli::Commands::Decode(args) => encode::handle_decode(args),
        cli::Commands::Simulate(args) => simulate::handle_simulate(args).await,
    }
}
