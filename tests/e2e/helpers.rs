use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A temporary checkout root holding fake repositories and an allow-list.
pub struct TestWorkspace {
    pub dir: TempDir,
    pub binary_path: String,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let binary_path = env!("CARGO_BIN_EXE_dep-license-audit").to_string();

        Self { dir, binary_path }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write a package.json at `relative` (a repository or an installed package).
    pub fn add_package(&self, relative: &str, name: &str, version: &str, license: &str) -> PathBuf {
        let dir = self.root().join(relative);
        fs::create_dir_all(&dir).expect("Failed to create package dir");
        fs::write(
            dir.join("package.json"),
            format!(
                r#"{{"name": "{}", "version": "{}", "license": "{}"}}"#,
                name, version, license
            ),
        )
        .expect("Failed to write package.json");
        dir
    }

    pub fn add_empty_repo(&self, name: &str) {
        fs::create_dir_all(self.root().join(name)).expect("Failed to create repo dir");
    }

    pub fn write_allow_list(&self, patterns: &[&str]) {
        let dir = self.root().join("cordova-coho/src");
        fs::create_dir_all(&dir).expect("Failed to create allow-list dir");
        let quoted: Vec<String> = patterns.iter().map(|p| format!("\"{}\"", p)).collect();
        fs::write(
            dir.join("validLicenses.json"),
            format!(r#"{{"validLicenses": [{}]}}"#, quoted.join(", ")),
        )
        .expect("Failed to write validLicenses.json");
    }

    pub fn run_auditor(&self, args: &[&str]) -> Output {
        Command::new(&self.binary_path)
            .args(args)
            .current_dir(self.root())
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to run dep-license-audit")
    }
}
