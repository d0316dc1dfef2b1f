use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::cli::Cli;
use dep_license_audit::config::{load_config, load_config_from};
use dep_license_audit::output::format_report;
use dep_license_audit::{run_audit, AuditOptions, NodeModulesScanner, RepositoryRef};

pub async fn handle_check(cli: &Cli) -> Result<()> {
    let root = match &cli.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };

    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config(&root)?,
    };

    // CLI arguments override config values
    let repo_names = if cli.repos.is_empty() {
        config.repos()
    } else {
        cli.repos.clone()
    };
    if repo_names.is_empty() {
        warn!("No repositories selected. Use --repo=<name> or set `repos` in the configuration.");
    }

    let options = AuditOptions {
        repos: repo_names.into_iter().map(RepositoryRef::new).collect(),
        allow_list_path: cli
            .allow_list
            .clone()
            .unwrap_or_else(|| config.allow_list_path(&root)),
        nested_layouts: config.nested_layouts(),
        scan_timeout: cli
            .timeout
            .map(Duration::from_secs)
            .unwrap_or_else(|| config.scan_timeout()),
        root,
    };

    let report = run_audit(&options, Arc::new(NodeModulesScanner)).await?;
    let output = format_report(&report).context("Failed to render license report")?;
    print!("{}", output);

    Ok(())
}
