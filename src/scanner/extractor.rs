use rayon::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{
    CancelFlag, LicenseSource, LicenseSources, PackageScanner, RawPackageRecord, SourceGroup,
};
use crate::error::ScanError;

const MANIFEST: &str = "package.json";
const NODE_MODULES: &str = "node_modules";

/// Scans an npm project: the root package plus everything installed under
/// `node_modules`, nested installs and scoped packages included.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeModulesScanner;

impl PackageScanner for NodeModulesScanner {
    fn scan(
        &self,
        directory: &Path,
        cancel: &CancelFlag,
    ) -> Result<Vec<RawPackageRecord>, ScanError> {
        if !directory.join(MANIFEST).is_file() {
            return Err(ScanError::ManifestMissing {
                path: directory.to_path_buf(),
            });
        }

        let mut package_dirs = vec![directory.to_path_buf()];
        collect_installed(&directory.join(NODE_MODULES), &mut package_dirs, cancel)?;
        debug!(
            directory = %directory.display(),
            packages = package_dirs.len(),
            "collected package directories"
        );

        // Indexed parallel collect keeps walk order
        package_dirs
            .par_iter()
            .map(|dir| {
                cancel.check(dir)?;
                read_package(dir)
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct PackageManifest {
    name: Option<String>,
    version: Option<String>,
    license: Option<LicenseField>,
    licenses: Option<LicenseField>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LicenseField {
    Identifier(String),
    // before Object: untagged structs also accept sequences
    List(Vec<LicenseField>),
    Object {
        #[serde(rename = "type")]
        kind: Option<String>,
        url: Option<String>,
    },
    Other(serde_json::Value),
}

impl LicenseField {
    fn push_sources(&self, sources: &mut Vec<LicenseSource>) {
        match self {
            LicenseField::Identifier(license) => sources.push(LicenseSource {
                license: license.clone(),
                url: None,
            }),
            LicenseField::Object {
                kind: Some(kind),
                url,
            } => sources.push(LicenseSource {
                license: kind.clone(),
                url: url.clone(),
            }),
            LicenseField::Object { kind: None, .. } => {}
            LicenseField::List(fields) => {
                for field in fields {
                    field.push_sources(sources);
                }
            }
            LicenseField::Other(value) => {
                debug!(%value, "ignoring unrecognised license field");
            }
        }
    }
}

fn collect_installed(
    node_modules: &Path,
    out: &mut Vec<PathBuf>,
    cancel: &CancelFlag,
) -> Result<(), ScanError> {
    if !node_modules.is_dir() {
        return Ok(());
    }
    cancel.check(node_modules)?;

    for entry in sorted_subdirectories(node_modules)? {
        let name = entry
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if name.starts_with('.') {
            continue;
        }
        if name.starts_with('@') {
            for scoped in sorted_subdirectories(&entry)? {
                visit_package(&scoped, out, cancel)?;
            }
            continue;
        }
        visit_package(&entry, out, cancel)?;
    }

    Ok(())
}

fn visit_package(
    dir: &Path,
    out: &mut Vec<PathBuf>,
    cancel: &CancelFlag,
) -> Result<(), ScanError> {
    if !dir.join(MANIFEST).is_file() {
        debug!(directory = %dir.display(), "no package.json, skipping");
        return Ok(());
    }
    out.push(dir.to_path_buf());
    collect_installed(&dir.join(NODE_MODULES), out, cancel)
}

/// Real subdirectories sorted by name. Symlinks are not followed.
fn sorted_subdirectories(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| ScanError::io(dir, e))? {
        let entry = entry.map_err(|e| ScanError::io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| ScanError::io(entry.path(), e))?;
        if file_type.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn read_package(dir: &Path) -> Result<RawPackageRecord, ScanError> {
    let manifest_path = dir.join(MANIFEST);
    let content =
        fs::read_to_string(&manifest_path).map_err(|e| ScanError::io(&manifest_path, e))?;
    let manifest: PackageManifest =
        serde_json::from_str(&content).map_err(|e| ScanError::MalformedManifest {
            path: manifest_path.clone(),
            details: e.to_string(),
        })?;

    let name = manifest.name.unwrap_or_else(|| {
        dir.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    });
    let version = manifest.version.unwrap_or_else(|| "0.0.0".to_string());

    let mut sources = Vec::new();
    if let Some(license) = &manifest.license {
        license.push_sources(&mut sources);
    }
    if let Some(licenses) = &manifest.licenses {
        licenses.push_sources(&mut sources);
    }

    Ok(RawPackageRecord {
        id: format!("{}@{}", name, version),
        name,
        version,
        directory: dir.display().to_string(),
        license_sources: Some(LicenseSources {
            package: Some(SourceGroup { sources }),
        }),
    })
}
