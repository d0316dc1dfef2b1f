use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::collector::LicenseCollector;
use crate::compliance::{ComplianceEngine, Report};
use crate::error::AuditError;
use crate::policy::load_allow_list;
use crate::repo::{GateOutcome, RepositoryGate, RepositoryRef};
use crate::scanner::PackageScanner;

/// Everything one audit run needs, resolved from config and CLI flags.
#[derive(Debug, Clone)]
pub struct AuditOptions {
    /// Directory the repositories are checked out under
    pub root: PathBuf,
    pub repos: Vec<RepositoryRef>,
    pub allow_list_path: PathBuf,
    pub nested_layouts: Vec<String>,
    pub scan_timeout: Duration,
}

/// Gate the repositories, scan the eligible ones sequentially, then check
/// every package against the allow-list.
///
/// The allow-list is loaded once collection has finished; a missing or
/// empty list aborts the run before any report exists.
pub async fn run_audit(
    options: &AuditOptions,
    scanner: Arc<dyn PackageScanner>,
) -> Result<Report, AuditError> {
    let gate = RepositoryGate::new(&options.root, options.nested_layouts.clone());
    let GateOutcome { decisions, registry } = gate.admit(&options.repos);
    info!(
        selected = options.repos.len(),
        eligible = registry.names().len(),
        "checking licenses of third-party dependencies"
    );

    let collector = LicenseCollector::new(scanner, options.scan_timeout);
    let outcomes = collector.collect(&options.repos, &decisions).await?;

    let allow_list = load_allow_list(&options.allow_list_path)?;
    Ok(ComplianceEngine::new(allow_list).run(&options.repos, &outcomes, &registry))
}
