pub mod audit;
pub mod collector;
pub mod compliance;
pub mod config;
pub mod error;
pub mod output;
pub mod policy;
pub mod repo;
pub mod scanner;

// Re-export main types for easy access
pub use audit::{run_audit, AuditOptions};
pub use compliance::{ComplianceEngine, DependencyRecord, FlaggedSet, Report};
pub use error::{AuditError, ScanError};
pub use policy::{has_valid_license, AllowList};
pub use repo::{RepositoryGate, RepositoryRef};
pub use scanner::{CancelFlag, NodeModulesScanner, PackageScanner, RawPackageRecord};
