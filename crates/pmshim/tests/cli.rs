//! End-to-end CLI tests. Each test gets its own `PMSHIM_HOME` and working
//! directory so cache state never leaks between tests, and disables the
//! network by default so only scenarios with a pre-populated cache succeed.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn pmshim() -> Command {
    Command::cargo_bin("pmshim").unwrap()
}

fn seed_cache_entry(home: &Path, tool_dir: &str, version: &str) {
    let entry = home.join(tool_dir).join(version);
    fs::create_dir_all(&entry).unwrap();
    fs::write(entry.join("bin.js"), b"#!/usr/bin/env node\n").unwrap();
    fs::write(entry.join(".ready"), b"0").unwrap();
}

#[test]
fn own_help_lists_subcommands() {
    pmshim()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("pack"))
        .stdout(predicate::str::contains("use"))
        .stdout(predicate::str::contains("enable"));
}

#[test]
fn use_without_a_spec_is_a_usage_error() {
    pmshim().arg("use").assert().failure().code(2);
}

#[test]
fn install_unknown_tool_tag_fails_without_network() {
    let home = tempfile::tempdir().unwrap();
    let cwd = tempfile::tempdir().unwrap();

    pmshim()
        .env("PMSHIM_HOME", home.path())
        .env("PMSHIM_ENABLE_NETWORK", "0")
        .current_dir(cwd.path())
        .args(["install", "totally-custom-tool"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn install_known_tool_fails_fast_when_network_disabled_and_cache_empty() {
    let home = tempfile::tempdir().unwrap();
    let cwd = tempfile::tempdir().unwrap();

    pmshim()
        .env("PMSHIM_HOME", home.path())
        .env("PMSHIM_ENABLE_NETWORK", "0")
        .current_dir(cwd.path())
        .args(["install", "npm@10.5.0"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "Network access disabled by the environment",
        ));
}

#[test]
fn install_succeeds_from_a_warm_cache_without_network() {
    let home = tempfile::tempdir().unwrap();
    let cwd = tempfile::tempdir().unwrap();
    seed_cache_entry(home.path(), "npm", "10.5.0");

    pmshim()
        .env("PMSHIM_HOME", home.path())
        .env("PMSHIM_ENABLE_NETWORK", "0")
        .current_dir(cwd.path())
        .args(["install", "npm@10.5.0"])
        .assert()
        .success();
}

#[test]
fn use_rejects_a_url_spec_for_a_known_tool() {
    let home = tempfile::tempdir().unwrap();
    let cwd = tempfile::tempdir().unwrap();
    fs::write(cwd.path().join("package.json"), r#"{"name":"app"}"#).unwrap();

    pmshim()
        .env("PMSHIM_HOME", home.path())
        .current_dir(cwd.path())
        .args(["use", "npm@https://example.invalid/npm.tgz"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "Illegal use of URL for known package manager",
        ));
}

#[test]
fn shim_invocation_rejects_a_name_mismatch_against_the_project_pin() {
    let home = tempfile::tempdir().unwrap();
    let cwd = tempfile::tempdir().unwrap();
    fs::write(
        cwd.path().join("package.json"),
        r#"{"packageManager":"yarn@1.22.22"}"#,
    )
    .unwrap();
    seed_cache_entry(home.path(), "npm", "10.5.0");

    pmshim()
        .env("PMSHIM_HOME", home.path())
        .env("PMSHIM_ENABLE_NETWORK", "0")
        .current_dir(cwd.path())
        .args(["npm", "--version"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "This project is configured to use yarn",
        ));
}

#[test]
fn enable_writes_a_shim_per_bin_entry() {
    let home = tempfile::tempdir().unwrap();
    let install_dir = tempfile::tempdir().unwrap();

    pmshim()
        .env("PMSHIM_HOME", home.path())
        .args([
            "enable",
            "--install-directory",
            install_dir.path().to_str().unwrap(),
            "npm",
        ])
        .assert()
        .success();

    assert!(install_dir.path().join(if cfg!(windows) { "npm.cmd" } else { "npm" }).is_file());
    assert!(install_dir.path().join(if cfg!(windows) { "npx.cmd" } else { "npx" }).is_file());
}

#[test]
fn use_pins_a_project_with_no_existing_packagemanager_field() {
    let home = tempfile::tempdir().unwrap();
    let cwd = tempfile::tempdir().unwrap();
    fs::write(cwd.path().join("package.json"), r#"{"name":"app"}"#).unwrap();
    seed_cache_entry(home.path(), "npm", "10.5.0");

    pmshim()
        .env("PMSHIM_HOME", home.path())
        .env("PMSHIM_ENABLE_NETWORK", "0")
        .current_dir(cwd.path())
        .args(["use", "npm@10.5.0"])
        .assert()
        .success();

    let updated = fs::read_to_string(cwd.path().join("package.json")).unwrap();
    assert!(updated.contains("\"packageManager\": \"npm@10.5.0\""));
}

#[test]
fn pack_then_install_round_trips_a_cached_tool() {
    let home = tempfile::tempdir().unwrap();
    seed_cache_entry(home.path(), "npm", "10.5.0");
    let original_bytes = fs::read(home.path().join("npm/10.5.0/bin.js")).unwrap();

    let archive_dir = tempfile::tempdir().unwrap();
    let archive = archive_dir.path().join("pmshim-pack.tgz");

    pmshim()
        .env("PMSHIM_HOME", home.path())
        .env("PMSHIM_ENABLE_NETWORK", "0")
        .args([
            "pack",
            "npm@10.5.0",
            "--output",
            archive.to_str().unwrap(),
        ])
        .assert()
        .success();
    assert!(archive.is_file());

    let fresh_home = tempfile::tempdir().unwrap();
    pmshim()
        .env("PMSHIM_HOME", fresh_home.path())
        .args(["install", "--global", archive.to_str().unwrap()])
        .assert()
        .success();

    let round_tripped = fs::read(fresh_home.path().join("npm/10.5.0/bin.js")).unwrap();
    assert_eq!(round_tripped, original_bytes);
}
