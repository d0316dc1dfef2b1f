use super::helpers::TestWorkspace;

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_only_repositories_with_manifest_are_reported() {
    let ws = TestWorkspace::new();
    ws.add_package("cordova-lib/cordova-lib", "cordova-lib", "12.0.1", "Apache-2.0");
    ws.add_empty_repo("cordova-cli");
    ws.write_allow_list(&["Apache.*"]);

    let output = ws.run_auditor(&["--repo=cordova-lib", "--repo=cordova-cli"]);

    assert!(output.status.success());
    let stdout = stdout(&output);
    assert!(stdout.contains("cordova-lib"));
    assert!(!stdout.contains("cordova-cli"));
    assert!(stdout.contains("0 packages were flagged"));
}

#[test]
fn test_packages_outside_allow_list_are_flagged() {
    let ws = TestWorkspace::new();
    ws.add_package("cordova-cli", "cordova", "12.0.0", "Apache-2.0");
    ws.add_package("cordova-cli/node_modules/a", "a", "1", "MIT");
    ws.add_package("cordova-cli/node_modules/b", "b", "1", "ISC");
    ws.write_allow_list(&["MIT", "BSD.*", "Apache.*"]);

    let output = ws.run_auditor(&["--repo=cordova-cli"]);

    assert!(output.status.success());
    let stdout = stdout(&output);
    assert!(stdout.contains("id: a@1"));
    let flagged = stdout
        .split("See those packages below.")
        .nth(1)
        .expect("flagged section");
    assert!(flagged.contains("id: b@1"));
    assert!(!flagged.contains("id: a@1"));
    assert_eq!(
        stdout
            .matches("1 packages were flagged. Please verify manually that the licenses are valid.")
            .count(),
        2
    );
}

#[test]
fn test_flagged_package_merges_directories_across_repositories() {
    let ws = TestWorkspace::new();
    ws.add_package("repo-x", "x", "1.0.0", "MIT");
    let d1 = ws.add_package("repo-x/node_modules/c", "c", "1", "GPL-3.0");
    ws.add_package("repo-y", "y", "1.0.0", "MIT");
    let d2 = ws.add_package("repo-y/node_modules/c", "c", "1", "GPL-3.0");
    ws.write_allow_list(&["MIT"]);

    let root = ws.root().display().to_string();
    let output = ws.run_auditor(&["--root", &root, "--repo=repo-x", "--repo=repo-y"]);

    assert!(output.status.success());
    let stdout = stdout(&output);
    let flagged = stdout
        .split("See those packages below.")
        .nth(1)
        .expect("flagged section");
    assert_eq!(flagged.matches("id: c@1").count(), 1);
    let first = flagged.find(&d1.display().to_string()).expect("first directory");
    let second = flagged.find(&d2.display().to_string()).expect("second directory");
    assert!(first < second);
}

#[test]
fn test_missing_allow_list_aborts_without_report() {
    let ws = TestWorkspace::new();
    ws.add_package("cordova-cli", "cordova", "12.0.0", "Apache-2.0");

    let output = ws.run_auditor(&["--repo=cordova-cli"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(!stdout(&output).contains("packages were flagged"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("No valid licenses file"));
}

#[test]
fn test_repositories_from_config_file() {
    let ws = TestWorkspace::new();
    ws.add_package("cordova-js", "cordova-js", "6.0.0", "Apache-2.0");
    ws.write_allow_list(&["Apache.*"]);
    std::fs::write(
        ws.root().join("license-audit.toml"),
        "repos = [\"cordova-js\"]\nscan_timeout_secs = 60\n",
    )
    .unwrap();

    let output = ws.run_auditor(&[]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("└─ cordova-js"));
}

#[test]
fn test_help_exits_with_code_one() {
    let ws = TestWorkspace::new();

    let output = ws.run_auditor(&["--help"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("--repo"));
}

#[test]
fn test_zero_timeout_is_rejected() {
    let ws = TestWorkspace::new();
    ws.add_package("cordova-cli", "cordova", "12.0.0", "Apache-2.0");
    ws.write_allow_list(&["Apache.*"]);

    let output = ws.run_auditor(&["--repo=cordova-cli", "--timeout", "0"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(!stdout(&output).contains("cordova-cli"));
}
