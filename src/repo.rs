use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const MANIFEST: &str = "package.json";

/// Repository name whose packages live one directory down, e.g. `cordova-lib/cordova-lib`.
pub const DEFAULT_NESTED_LAYOUT: &str = "cordova-lib";

/// One source repository, identified by its directory name under the workspace root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    name: String,
}

impl RepositoryRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The repository directory exists and has a manifest either at its
    /// root or in the nested `<name>/<name>` layout.
    pub fn has_dependencies(&self, root: &Path) -> bool {
        let dir = root.join(&self.name);
        dir.is_dir()
            && (dir.join(MANIFEST).is_file() || dir.join(&self.name).join(MANIFEST).is_file())
    }

    /// Path to scan, relative to the workspace root.
    pub fn scan_path(&self, nested_layouts: &[String]) -> PathBuf {
        if nested_layouts.iter().any(|nested| nested == &self.name) {
            PathBuf::from(&self.name).join(&self.name)
        } else {
            PathBuf::from(&self.name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    Eligible { scan_path: PathBuf },
    Ineligible { note: String },
}

/// Ordered record of repositories that passed the gate. Only these appear in
/// the final report.
#[derive(Debug, Clone, Default)]
pub struct DependencyRegistry {
    names: Vec<String>,
}

impl DependencyRegistry {
    pub fn record(&mut self, name: &str) {
        self.names.push(name.to_string());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Gate decisions aligned by index with the input repositories.
#[derive(Debug, Clone, Default)]
pub struct GateOutcome {
    pub decisions: Vec<Eligibility>,
    pub registry: DependencyRegistry,
}

pub struct RepositoryGate {
    root: PathBuf,
    nested_layouts: Vec<String>,
}

impl RepositoryGate {
    pub fn new(root: impl Into<PathBuf>, nested_layouts: Vec<String>) -> Self {
        Self {
            root: root.into(),
            nested_layouts,
        }
    }

    pub fn evaluate(&self, repo: &RepositoryRef) -> Eligibility {
        let dir = self.root.join(repo.name());
        if !dir.is_dir() {
            return Eligibility::Ineligible {
                note: format!(
                    "Repo directory does not exist: {}. First clone the repository.",
                    repo.name()
                ),
            };
        }
        if !repo.has_dependencies(&self.root) {
            return Eligibility::Ineligible {
                note: format!("Repo {} has no package.json, skipping.", repo.name()),
            };
        }

        Eligibility::Eligible {
            scan_path: self.root.join(repo.scan_path(&self.nested_layouts)),
        }
    }

    /// Evaluate every repository in order. Ineligible repositories are
    /// logged and skipped; they never stop the run.
    pub fn admit(&self, repos: &[RepositoryRef]) -> GateOutcome {
        let mut outcome = GateOutcome::default();

        for repo in repos {
            let decision = self.evaluate(repo);
            match &decision {
                Eligibility::Eligible { scan_path } => {
                    debug!(repo = repo.name(), scan_path = %scan_path.display(), "repository has dependencies");
                    outcome.registry.record(repo.name());
                }
                Eligibility::Ineligible { note } => warn!(repo = repo.name(), "{}", note),
            }
            outcome.decisions.push(decision);
        }

        outcome
    }
}
