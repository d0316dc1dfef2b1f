use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::collector::ScanOutcome;
use crate::policy::{has_valid_license, AllowList};
use crate::repo::{DependencyRegistry, RepositoryRef};
use crate::scanner::RawPackageRecord;

/// Normalized view of one package instance kept in the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyRecord {
    pub name: String,
    pub id: String,
    /// Every install location seen for this id; grows when flagged duplicates merge
    pub directory: Vec<String>,
    pub licenses: Vec<String>,
}

impl DependencyRecord {
    pub fn from_raw(raw: &RawPackageRecord) -> Self {
        Self {
            name: raw.name.clone(),
            id: raw.id.clone(),
            directory: vec![raw.directory.clone()],
            licenses: raw.declared_licenses(),
        }
    }
}

/// Packages that failed the allow-list, at most one entry per id, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct FlaggedSet {
    entries: IndexMap<String, DependencyRecord>,
}

impl FlaggedSet {
    /// Record a failing package. A known id only gains the new directories,
    /// repeats included; an unknown id is stored as an independent copy.
    pub fn flag(&mut self, record: &DependencyRecord) {
        match self.entries.get_mut(&record.id) {
            Some(existing) => existing.directory.extend(record.directory.iter().cloned()),
            None => {
                self.entries.insert(record.id.clone(), record.clone());
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&DependencyRecord> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<DependencyRecord> {
        self.entries.into_values().collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RepositoryReport {
    pub dependencies: Vec<DependencyRecord>,
}

/// Per-repository dependency lists plus the global flagged list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub repositories: IndexMap<String, RepositoryReport>,
    pub flagged: Vec<DependencyRecord>,
}

/// Single-pass fold over repositories, packages and licenses. Build one per run.
pub struct ComplianceEngine {
    allow_list: AllowList,
    repositories: IndexMap<String, RepositoryReport>,
    flagged: FlaggedSet,
}

impl ComplianceEngine {
    pub fn new(allow_list: AllowList) -> Self {
        Self {
            allow_list,
            repositories: IndexMap::new(),
            flagged: FlaggedSet::default(),
        }
    }

    /// Normalize every package of one repository and flag the invalid ones.
    /// All records are returned, valid or not.
    pub fn process_packages(&mut self, packages: &[RawPackageRecord]) -> Vec<DependencyRecord> {
        let mut dependencies = Vec::with_capacity(packages.len());

        for raw in packages {
            let record = DependencyRecord::from_raw(raw);
            if !has_valid_license(&record.licenses, &self.allow_list) {
                debug!(id = %record.id, licenses = ?record.licenses, "flagging package");
                self.flagged.flag(&record);
            }
            dependencies.push(record);
        }

        dependencies
    }

    /// Pair repositories with their outcomes by position and build the report.
    /// Repositories missing from the registry are skipped, as are those whose
    /// scan failed or timed out.
    pub fn run(
        mut self,
        repos: &[RepositoryRef],
        outcomes: &[ScanOutcome],
        registry: &DependencyRegistry,
    ) -> Report {
        for (repo, outcome) in repos.iter().zip(outcomes) {
            if !registry.contains(repo.name()) {
                continue;
            }
            if let Some(reason) = outcome.reason() {
                warn!(repo = repo.name(), %reason, "no license results, omitting from report");
                continue;
            }

            let dependencies = self.process_packages(outcome.packages());
            self.repositories
                .insert(repo.name().to_string(), RepositoryReport { dependencies });
        }

        info!(
            repositories = self.repositories.len(),
            flagged = self.flagged.len(),
            "compliance check finished"
        );

        Report {
            repositories: self.repositories,
            flagged: self.flagged.into_entries(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str, directory: &str, licenses: &[&str]) -> RawPackageRecord {
        use crate::scanner::{LicenseSource, LicenseSources, SourceGroup};

        let name = id.split('@').next().unwrap_or(id).to_string();
        RawPackageRecord {
            name,
            id: id.to_string(),
            version: String::new(),
            directory: directory.to_string(),
            license_sources: Some(LicenseSources {
                package: Some(SourceGroup {
                    sources: licenses
                        .iter()
                        .map(|l| LicenseSource {
                            license: l.to_string(),
                            url: None,
                        })
                        .collect(),
                }),
            }),
        }
    }

    fn allow_list(patterns: &[&str]) -> AllowList {
        AllowList::from_patterns(patterns.iter().copied()).unwrap()
    }

    fn registry(names: &[&str]) -> DependencyRegistry {
        let mut registry = DependencyRegistry::default();
        for name in names {
            registry.record(name);
        }
        registry
    }

    #[test]
    fn test_report_lists_all_packages_and_flags_invalid_ones() {
        let repos = vec![RepositoryRef::new("cordova-cli")];
        let outcomes = vec![ScanOutcome::Scanned(vec![
            raw("a@1", "/w/a", &["MIT"]),
            raw("b@1", "/w/b", &["ISC"]),
        ])];

        let report = ComplianceEngine::new(allow_list(&["MIT", "BSD.*", "Apache.*"])).run(
            &repos,
            &outcomes,
            &registry(&["cordova-cli"]),
        );

        let deps = &report.repositories["cordova-cli"].dependencies;
        assert_eq!(deps.len(), 2);
        assert_eq!(report.flagged.len(), 1);
        assert_eq!(report.flagged[0].id, "b@1");
    }

    #[test]
    fn test_flagged_duplicates_merge_directories_across_repositories() {
        let repos = vec![RepositoryRef::new("x"), RepositoryRef::new("y")];
        let outcomes = vec![
            ScanOutcome::Scanned(vec![raw("c@1", "d1", &["GPL-3.0"])]),
            ScanOutcome::Scanned(vec![raw("c@1", "d2", &["GPL-3.0"])]),
        ];

        let report =
            ComplianceEngine::new(allow_list(&["MIT"])).run(&repos, &outcomes, &registry(&["x", "y"]));

        assert_eq!(report.flagged.len(), 1);
        assert_eq!(report.flagged[0].directory, vec!["d1", "d2"]);
        // Report entries are untouched by the merge
        assert_eq!(report.repositories["x"].dependencies[0].directory, vec!["d1"]);
        assert_eq!(report.repositories["y"].dependencies[0].directory, vec!["d2"]);
    }

    #[test]
    fn test_repeated_directories_are_kept() {
        let mut engine = ComplianceEngine::new(allow_list(&["MIT"]));
        let packages = vec![
            raw("e@1", "same", &[]),
            raw("e@1", "same", &[]),
            raw("e@1", "other", &[]),
        ];

        engine.process_packages(&packages);

        let entry = engine.flagged.get("e@1").unwrap();
        assert_eq!(entry.directory, vec!["same", "same", "other"]);
        assert_eq!(engine.flagged.len(), 1);
    }

    #[test]
    fn test_unregistered_and_failed_repositories_are_omitted() {
        let repos = vec![
            RepositoryRef::new("registered"),
            RepositoryRef::new("unregistered"),
            RepositoryRef::new("timed-out"),
        ];
        let outcomes = vec![
            ScanOutcome::Scanned(vec![raw("a@1", "/a", &["MIT"])]),
            ScanOutcome::Scanned(vec![raw("z@1", "/z", &["WTFPL"])]),
            ScanOutcome::TimedOut {
                after: std::time::Duration::from_secs(1),
            },
        ];

        let report = ComplianceEngine::new(allow_list(&["MIT"])).run(
            &repos,
            &outcomes,
            &registry(&["registered", "timed-out"]),
        );

        let names: Vec<&str> = report.repositories.keys().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["registered"]);
        assert!(report.flagged.is_empty());
    }

    #[test]
    fn test_missing_license_metadata_is_flagged() {
        let mut engine = ComplianceEngine::new(allow_list(&[".*"]));
        let package = RawPackageRecord {
            name: "bare".to_string(),
            id: "bare@1".to_string(),
            directory: "/bare".to_string(),
            ..Default::default()
        };

        let deps = engine.process_packages(&[package]);

        assert!(deps[0].licenses.is_empty());
        assert!(engine.flagged.get("bare@1").is_some());
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let repos = vec![RepositoryRef::new("x"), RepositoryRef::new("y")];
        let build = || {
            let outcomes = vec![
                ScanOutcome::Scanned(vec![
                    raw("b@1", "x/b", &["ISC"]),
                    raw("a@1", "x/a", &["MIT", "GPL-2.0"]),
                ]),
                ScanOutcome::Scanned(vec![raw("b@1", "y/b", &["ISC"])]),
            ];
            ComplianceEngine::new(allow_list(&["MIT"])).run(&repos, &outcomes, &registry(&["x", "y"]))
        };

        let first = build();
        let second = build();
        assert_eq!(first, second);
        let ids: Vec<&str> = first.flagged.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["b@1", "a@1"]);
    }
}
