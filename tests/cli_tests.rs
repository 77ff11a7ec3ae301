//! Integration tests for CLI

use assert_cmd::Command;
use git2::Repository;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command as StdCommand;
use tempfile::TempDir;

fn ci_command() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("nbcollection-ci"))
}

fn init_repo(path: &Path) {
    let mut opts = git2::RepositoryInitOptions::new();
    opts.initial_head("main");
    Repository::init_opts(path, &opts).expect("init fixture repo");
}

#[test]
fn test_cli_version() {
    let mut cmd = ci_command();
    cmd.arg("--version");
    cmd.assert().success().stdout(predicate::str::contains("nbcollection-ci"));
}

#[test]
fn test_cli_help_lists_subcommands() {
    let mut cmd = ci_command();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("uninstall"))
        .stdout(predicate::str::contains("venv"))
        .stdout(predicate::str::contains("replicate"));
}

#[test]
fn test_install_rejects_nonexistent_locator() {
    let mut cmd = ci_command();
    cmd.args(["install", "/no/such/checkout"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("/no/such/checkout"))
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_install_rejects_non_repo_directory() {
    let tmp = TempDir::new().expect("tmp");
    let mut cmd = ci_command();
    cmd.args(["install", tmp.path().to_str().expect("utf8 path")]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("is not a git repository"));
}

#[test]
fn test_replicate_rejects_local_repositories() {
    let tmp = TempDir::new().expect("tmp");
    init_repo(tmp.path());

    let mut cmd = ci_command();
    cmd.args(["replicate", tmp.path().to_str().expect("utf8 path")]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unsupported repository type: local-path"));
}

#[test]
fn test_venv_creates_environment_in_local_repo() {
    if !python3_available() {
        eprintln!("skipping venv integration test: python3 not available");
        return;
    }

    let tmp = TempDir::new().expect("tmp");
    init_repo(tmp.path());

    let mut cmd = ci_command();
    cmd.args([
        "venv",
        tmp.path().to_str().expect("utf8 path"),
        "--venv-dir",
        "env",
    ]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Virtual environment ready"));
    assert!(tmp.path().join("env").join("bin").exists());
}

#[test]
fn test_install_accepts_recorded_generated_files() {
    if !python3_available() {
        eprintln!("skipping install integration test: python3 not available");
        return;
    }

    let tmp = TempDir::new().expect("tmp");
    init_repo(tmp.path());
    fs::write(tmp.path().join("requirements.txt"), "").expect("write requirements");

    let mut cmd = ci_command();
    cmd.args([
        "install",
        tmp.path().to_str().expect("utf8 path"),
        "--record",
        "notebooks/foo.ipynb,notebooks/bar.ipynb",
    ]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Installed dependencies from requirements.txt"));
}

#[test]
fn test_explicit_bad_defaults_file_fails() {
    let repo = TempDir::new().expect("tmp repo");
    init_repo(repo.path());
    let cfg = TempDir::new().expect("tmp cfg");
    let cfg_path = cfg.path().join("defaults.toml");
    fs::write(&cfg_path, "branch = 123\n").expect("write defaults");

    let mut cmd = ci_command();
    cmd.args([
        "venv",
        repo.path().to_str().expect("utf8 path"),
        "--config",
        cfg_path.to_str().expect("utf8 cfg path"),
    ]);
    cmd.assert().failure().stderr(predicate::str::contains("Invalid defaults file"));
}

fn python3_available() -> bool {
    StdCommand::new("python3")
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}
