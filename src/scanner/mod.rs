use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::ScanError;

pub mod extractor;

pub use extractor::NodeModulesScanner;

/// Discovers the installed packages of one directory and their license metadata.
///
/// Implementations must be usable from a blocking worker thread, hence the
/// `Send + Sync` bound. Callers invoke `scan` at most once per repository and
/// wait for it to return before starting the next one, so implementations
/// should poll `cancel` and return [`ScanError::Cancelled`] promptly once set.
pub trait PackageScanner: Send + Sync {
    fn scan(
        &self,
        directory: &Path,
        cancel: &CancelFlag,
    ) -> Result<Vec<RawPackageRecord>, ScanError>;
}

/// Shared stop signal for a running scan.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once the flag is set, for use with `?` between steps.
    pub fn check(&self, path: &Path) -> Result<(), ScanError> {
        if self.is_cancelled() {
            return Err(ScanError::Cancelled {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }
}

/// One installed package instance as reported by a scanner.
///
/// The serde shape follows the `nlf` output format so that recorded scanner
/// output can be fed back in as fixtures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPackageRecord {
    pub name: String,
    /// Unique per package version, e.g. `left-pad@1.3.0`
    pub id: String,
    #[serde(default)]
    pub version: String,
    /// Install location of this instance
    pub directory: String,
    #[serde(default, rename = "licenseSources")]
    pub license_sources: Option<LicenseSources>,
}

/// Where license declarations were found. `package` is the manifest field
/// group and is the first-listed group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LicenseSources {
    #[serde(default)]
    pub package: Option<SourceGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceGroup {
    #[serde(default)]
    pub sources: Vec<LicenseSource>,
}

/// `url` is not part of the report; it is kept so recorded nlf output
/// round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseSource {
    pub license: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl RawPackageRecord {
    /// License identifiers from the first-listed source group, in order.
    ///
    /// A record without any license-source structure declares nothing, which
    /// downstream means it can never pass the allow-list.
    pub fn declared_licenses(&self) -> Vec<String> {
        self.license_sources
            .as_ref()
            .and_then(|sources| sources.package.as_ref())
            .map(|group| group.sources.iter().map(|s| s.license.clone()).collect())
            .unwrap_or_default()
    }
}
