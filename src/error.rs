use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort an audit run.
///
/// Anything local to a single repository or package is reported through
/// [`ScanError`] and the run keeps going; these variants are the ones that
/// stop the run before a report is produced.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("No valid licenses file at {path}. Please make sure it exists.")]
    AllowListMissing { path: PathBuf },

    #[error("Failed to read valid licenses file {path}: {details}")]
    AllowListUnreadable { path: PathBuf, details: String },

    #[error("Valid licenses file {path} does not list any licenses")]
    AllowListEmpty { path: PathBuf },

    #[error("Invalid license pattern '{pattern}' in {path}: {details}")]
    InvalidPattern {
        path: PathBuf,
        pattern: String,
        details: String,
    },

    #[error("Failed to load configuration {path}: {details}")]
    Config { path: PathBuf, details: String },

    #[error("License collection aborted while scanning '{repo}': {details}")]
    Collection { repo: String, details: String },
}

/// Failure of a single repository scan. Recoverable.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("No package.json found in {path}")]
    ManifestMissing { path: PathBuf },

    #[error("Malformed manifest {path}: {details}")]
    MalformedManifest { path: PathBuf, details: String },

    #[error("Scan of {path} was cancelled")]
    Cancelled { path: PathBuf },

    #[error("I/O error while scanning {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScanError::Io {
            path: path.into(),
            source,
        }
    }
}
