use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{AuditError, ScanError};
use crate::repo::{Eligibility, RepositoryRef};
use crate::scanner::{CancelFlag, PackageScanner, RawPackageRecord};

/// Result slot for one repository, aligned by index with the input list.
#[derive(Debug)]
pub enum ScanOutcome {
    Scanned(Vec<RawPackageRecord>),
    /// Placeholder for a repository the gate rejected
    Skipped { note: String },
    Failed { error: ScanError },
    TimedOut { after: Duration },
}

impl ScanOutcome {
    /// Packages found by the scan. Every other outcome yields none.
    pub fn packages(&self) -> &[RawPackageRecord] {
        match self {
            ScanOutcome::Scanned(packages) => packages,
            _ => &[],
        }
    }

    pub fn is_scanned(&self) -> bool {
        matches!(self, ScanOutcome::Scanned(_))
    }

    /// Why no packages were recorded, for anything but a successful scan.
    pub fn reason(&self) -> Option<String> {
        match self {
            ScanOutcome::Scanned(_) => None,
            ScanOutcome::Skipped { note } => Some(note.clone()),
            ScanOutcome::Failed { error } => Some(error.to_string()),
            ScanOutcome::TimedOut { after } => Some(format!("scan timed out after {:?}", after)),
        }
    }
}

/// Runs the scanner once per eligible repository, one scan at a time.
pub struct LicenseCollector {
    scanner: Arc<dyn PackageScanner>,
    timeout: Duration,
}

impl LicenseCollector {
    pub fn new(scanner: Arc<dyn PackageScanner>, timeout: Duration) -> Self {
        Self { scanner, timeout }
    }

    /// Collect outcomes in input order. A scan starts only after the previous
    /// one has returned, including one that timed out and had to be cancelled.
    /// Individual failures and timeouts are recorded and skipped over; a
    /// scanner panic aborts the whole collection.
    pub async fn collect(
        &self,
        repos: &[RepositoryRef],
        decisions: &[Eligibility],
    ) -> Result<Vec<ScanOutcome>, AuditError> {
        let mut results = Vec::with_capacity(repos.len());

        for (repo, decision) in repos.iter().zip(decisions) {
            let outcome = match decision {
                Eligibility::Ineligible { note } => ScanOutcome::Skipped { note: note.clone() },
                Eligibility::Eligible { scan_path } => self.scan_one(repo, scan_path).await?,
            };
            results.push(outcome);
        }

        Ok(results)
    }

    async fn scan_one(
        &self,
        repo: &RepositoryRef,
        scan_path: &Path,
    ) -> Result<ScanOutcome, AuditError> {
        let scanner = Arc::clone(&self.scanner);
        let path = scan_path.to_path_buf();
        let cancel = CancelFlag::default();
        let worker_cancel = cancel.clone();
        let mut task = tokio::task::spawn_blocking(move || scanner.scan(&path, &worker_cancel));

        let collection_error = |join_error: tokio::task::JoinError| AuditError::Collection {
            repo: repo.name().to_string(),
            details: join_error.to_string(),
        };

        match tokio::time::timeout(self.timeout, &mut task).await {
            Err(_) => {
                cancel.cancel();
                // The blocking thread cannot be aborted; wait for the scanner to
                // notice the flag so no two scans ever overlap.
                task.await.map_err(collection_error)?;
                warn!(
                    repo = repo.name(),
                    timeout_secs = self.timeout.as_secs_f64(),
                    "license scan timed out, skipping repository"
                );
                Ok(ScanOutcome::TimedOut {
                    after: self.timeout,
                })
            }
            Ok(Err(join_error)) => Err(collection_error(join_error)),
            Ok(Ok(Err(error))) => {
                warn!(repo = repo.name(), %error, "license scan failed, skipping repository");
                Ok(ScanOutcome::Failed { error })
            }
            Ok(Ok(Ok(packages))) => {
                info!(repo = repo.name(), packages = packages.len(), "scanned repository");
                Ok(ScanOutcome::Scanned(packages))
            }
        }
    }
}
