use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dep-license-audit")]
#[command(
    about = "Go through each specified repo and check the licenses of node modules that are 3rd-party dependencies"
)]
#[command(override_usage = "dep-license-audit --repo=name [--repo=othername]")]
#[command(version, disable_help_flag = true)]
pub struct Cli {
    /// Repository to check (repeatable)
    #[arg(short, long = "repo", value_name = "NAME")]
    pub repos: Vec<String>,

    /// Directory the repositories are checked out under (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Allow-list document, overrides the configured one
    #[arg(long, value_name = "FILE")]
    pub allow_list: Option<PathBuf>,

    /// Configuration file (default: <root>/license-audit.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Per-repository scan timeout in seconds (at least 1)
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error logging
    #[arg(short, long)]
    pub quiet: bool,

    /// Print help
    #[arg(short, long)]
    pub help: bool,
}
