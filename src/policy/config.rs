use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::AuditError;

/// On-disk allow-list document.
///
/// JSON files use `{"validLicenses": [...]}`, TOML files `valid_licenses = [...]`.
#[derive(Debug, Deserialize)]
struct AllowListFile {
    #[serde(alias = "validLicenses")]
    valid_licenses: Option<Vec<String>>,
}

/// A compiled allow-list entry. Matching is a case-insensitive regex search,
/// so `apache` matches `Apache License 2.0`.
#[derive(Debug, Clone)]
pub struct LicensePattern {
    pub source: String,
    pub(crate) regex: Regex,
}

impl LicensePattern {
    fn compile(source: String) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(&source).case_insensitive(true).build()?;
        Ok(Self { source, regex })
    }
}

/// Ordered set of acceptable license patterns, immutable once loaded.
#[derive(Debug, Clone)]
pub struct AllowList {
    patterns: Vec<LicensePattern>,
}

impl AllowList {
    pub fn from_patterns<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns = patterns
            .into_iter()
            .map(|source| LicensePattern::compile(source.into()))
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { patterns })
    }

    pub fn patterns(&self) -> &[LicensePattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Load the allow-list document. Missing, unreadable, empty or invalid
/// documents are all fatal.
pub fn load_allow_list(path: &Path) -> Result<AllowList, AuditError> {
    if !path.is_file() {
        return Err(AuditError::AllowListMissing {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path).map_err(|e| AuditError::AllowListUnreadable {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;
    if content.trim().is_empty() {
        return Err(AuditError::AllowListMissing {
            path: path.to_path_buf(),
        });
    }

    let is_toml = path.extension().is_some_and(|ext| ext == "toml");
    let document: AllowListFile = if is_toml {
        toml::from_str(&content).map_err(|e| AuditError::AllowListUnreadable {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?
    } else {
        serde_json::from_str(&content).map_err(|e| AuditError::AllowListUnreadable {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?
    };

    let patterns = document.valid_licenses.unwrap_or_default();
    if patterns.is_empty() {
        return Err(AuditError::AllowListEmpty {
            path: path.to_path_buf(),
        });
    }

    let mut compiled = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        let license_pattern =
            LicensePattern::compile(pattern.clone()).map_err(|e| AuditError::InvalidPattern {
                path: path.to_path_buf(),
                pattern,
                details: e.to_string(),
            })?;
        compiled.push(license_pattern);
    }

    debug!(path = %path.display(), patterns = compiled.len(), "loaded allow-list");
    Ok(AllowList { patterns: compiled })
}
