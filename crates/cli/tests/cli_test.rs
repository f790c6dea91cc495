//! End-to-end tests for the buildprobe binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_config(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("buildprobe.json");
    let config = format!(r#"{{ "log_root": "{}" }}"#, dir.join("logs").display());
    fs::write(&path, config).unwrap();
    path
}

fn buildprobe() -> Command {
    Command::cargo_bin("buildprobe").unwrap()
}

#[test]
fn test_help_lists_commands() {
    buildprobe()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("exec"))
        .stdout(predicate::str::contains("locate"));
}

#[test]
fn test_locate_prints_the_artifact() {
    let temp_dir = TempDir::new().unwrap();
    let app = temp_dir.path().join("Foo/bin/Debug/Foo.app");
    fs::create_dir_all(app.join("Sub/Foo.app")).unwrap();
    let config = write_config(temp_dir.path());

    buildprobe()
        .arg("--config")
        .arg(&config)
        .arg("locate")
        .arg(temp_dir.path())
        .args(["--configuration", "Debug"])
        .assert()
        .success()
        .stdout(predicate::str::contains(app.to_str().unwrap()));
}

#[test]
fn test_locate_reports_ambiguity() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("A/bin/Release/A.app")).unwrap();
    fs::create_dir_all(temp_dir.path().join("B/bin/Release/B.app")).unwrap();
    let config = write_config(temp_dir.path());

    buildprobe()
        .arg("--config")
        .arg(&config)
        .arg("locate")
        .arg(temp_dir.path())
        .args(["-c", "Release"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("More than one app directory found"));
}

#[cfg(unix)]
#[test]
fn test_exec_reports_unexpected_exit_code() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path());

    buildprobe()
        .arg("--config")
        .arg(&config)
        .args(["exec", "--context", "nuget restore", "/bin/sh", "-c"])
        .arg("echo 'error MSB1001: Unknown switch.'; exit 1")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Execution log for sh"))
        .stderr(predicate::str::contains("nuget restore failed (unexpected exit code)"))
        .stderr(predicate::str::contains("error MSB1001: Unknown switch."));
}

#[cfg(unix)]
#[test]
fn test_exec_success_prints_summary() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path());

    buildprobe()
        .arg("--config")
        .arg(&config)
        .args(["exec", "/bin/sh", "-c", "echo hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exit code: 0 Timed out: false"));

    let logs: Vec<_> = fs::read_dir(temp_dir.path().join("logs")).unwrap().collect();
    assert_eq!(logs.len(), 1);
}

#[test]
fn test_bad_env_override_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path());
    fs::write(temp_dir.path().join("Foo.sln"), "").unwrap();

    buildprobe()
        .arg("--config")
        .arg(&config)
        .arg("build")
        .arg(temp_dir.path().join("Foo.sln"))
        .args(["--env", "NOVALUE"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected NAME=VALUE"));
}
