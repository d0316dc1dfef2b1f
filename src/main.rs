use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::Cli;

/// Exit code for aborted runs; 1 is reserved for the help path.
const EXIT_FATAL: i32 = 2;

fn main() {
    let cli = Cli::parse();

    if cli.help {
        // Printing help can only fail on a closed stdout
        let _ = Cli::command().print_help();
        println!();
        std::process::exit(1);
    }

    init_tracing(cli.verbose, cli.quiet);

    if let Err(err) = run(&cli) {
        eprintln!("Error: {:#}", err);
        std::process::exit(EXIT_FATAL);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(commands::handle_check(cli))
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
