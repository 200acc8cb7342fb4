//! Sundial CLI - scenario runner for the token engine
//!
//! Drives an in-memory token instance against the reference router, from
//! a built-in demo or from a TOML scenario file. Useful for exploring
//! the gateway semantics without writing a test.

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

mod scenario;

#[derive(Parser)]
#[command(name = "sundial")]
#[command(about = "Sundial token engine - run ledger and liquidity scenarios", long_about = None)]
#[command(version)]
struct Cli {
    /// Verbose output (engine operation log)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the built-in demo scenario
    Demo,

    /// Run a TOML scenario file
    Scenario {
        /// Path to the scenario file
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default()
            .default_filter_or(if cli.verbose { "debug" } else { "warn" }),
    )
    .init();

    let result = match cli.command {
        Commands::Demo => scenario::run_demo(),
        Commands::Scenario { file } => scenario::run_file(&file),
    };

    if let Err(err) = result {
        eprintln!("{} {err:#}", "error:".red().bold());
        std::process::exit(1);
    }
}
