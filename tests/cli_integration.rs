//! CLI integration tests
//!
//! Runs the `arbor` binary against throwaway repositories and checks its
//! output and exit status.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn arbor_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_arbor"))
}

/// Command rooted at `repo` with no inherited ARBOR_* settings
fn arbor(repo: &Path) -> Command {
    let mut command = Command::new(arbor_bin());
    for (key, _) in std::env::vars() {
        if key.starts_with("ARBOR_") {
            command.env_remove(key);
        }
    }
    command
        .env("ARBOR_SOURCE_ROOT", repo)
        .env("ARBOR_LOG_LEVEL", "warn");
    command
}

fn create_repo(config: &str) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(dir.path().join("arbor.toml"), config).expect("Failed to write arbor.toml");
    dir
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_cli_help() {
    let output = Command::new(arbor_bin())
        .arg("--help")
        .output()
        .expect("Failed to execute arbor");

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("build"));
    assert!(text.contains("variables"));
    assert!(text.contains("tools"));
}

#[test]
fn test_tools_lists_execution_order() {
    let repo = create_repo("");
    let output = arbor(repo.path())
        .args(["tools", "--format", "json"])
        .output()
        .expect("Failed to execute arbor");

    assert!(output.status.success());
    let tools: Vec<serde_json::Value> =
        serde_json::from_slice(&output.stdout).expect("Output should be JSON");
    let names: Vec<&str> = tools.iter().filter_map(|t| t["name"].as_str()).collect();

    assert_eq!(
        names,
        vec![
            "help",
            "variables_report",
            "artifacts_cleanup",
            "restore",
            "compile",
            "test",
            "package",
            "process_cleanup"
        ]
    );
    assert_eq!(tools[7]["run_always"], serde_json::Value::Bool(true));
    assert_eq!(tools[4]["run_always"], serde_json::Value::Bool(false));
}

#[test]
fn test_variables_redacts_secrets() {
    let repo = create_repo(
        r#"[variables]
"Arbor.Build.Version.Major" = 2
"#,
    );
    let output = arbor(repo.path())
        .arg("variables")
        .arg(repo.path())
        .args(["--var", "Arbor.Build.Publish.ApiKey=hunter2"])
        .output()
        .expect("Failed to execute arbor");

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Arbor.Build.Publish.ApiKey: *****"));
    assert!(text.contains("Arbor_Build_Publish_ApiKey: *****"));
    assert!(text.contains("Arbor.Build.Version: 2.0.0."));
    assert!(!text.contains("hunter2"));
}

#[test]
fn test_verbose_logging_never_shows_override_values() {
    let repo = create_repo("");
    let output = arbor(repo.path())
        .arg("-v")
        .arg("variables")
        .arg(repo.path())
        .args(["--var", "Arbor.Build.Nuget.ApiKey=hunter2"])
        .output()
        .expect("Failed to execute arbor");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Parsed arguments"));
    assert!(!stderr.contains("hunter2"));
    assert!(!stdout(&output).contains("hunter2"));
}

#[test]
fn test_variables_json_without_aliases() {
    let repo = create_repo("");
    let output = arbor(repo.path())
        .arg("variables")
        .arg(repo.path())
        .args(["--no-aliases", "--format", "json"])
        .output()
        .expect("Failed to execute arbor");

    assert!(output.status.success());
    let entries: Vec<serde_json::Value> =
        serde_json::from_slice(&output.stdout).expect("Output should be JSON");
    assert!(entries
        .iter()
        .any(|e| e["key"] == "Arbor.Build.SourceRoot"));
    assert!(entries
        .iter()
        .all(|e| !e["key"].as_str().unwrap_or_default().starts_with("Arbor.X.")));
}

#[test]
fn test_underscore_environment_override_wins() {
    let repo = create_repo("");
    let output = arbor(repo.path())
        .env("ARBOR_BUILD_CONFIGURATION", "Release")
        .arg("variables")
        .arg(repo.path())
        .output()
        .expect("Failed to execute arbor");

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Arbor.Build.CONFIGURATION: Release"));
    assert!(!text.contains(": Debug"));
}

#[test]
fn test_variables_rejects_malformed_var() {
    let repo = create_repo("");
    let output = arbor(repo.path())
        .args(["variables", "--var", "no-equals-sign"])
        .output()
        .expect("Failed to execute arbor");

    assert!(!output.status.success());
}

#[test]
fn test_variables_reports_ambiguous_configuration() {
    let repo = create_repo("");
    let output = arbor(repo.path())
        .arg("variables")
        .arg(repo.path())
        .args([
            "--var",
            "Arbor.Build.Configuration=Debug",
            "--var",
            "arbor.build.configuration=Release",
        ])
        .output()
        .expect("Failed to execute arbor");

    assert_eq!(output.status.code(), Some(1));
}

#[cfg(unix)]
#[test]
fn test_build_exit_status_is_first_failing_tool() {
    let repo = create_repo(
        r#"[variables]
"Arbor.Build.Tools.Compile.Command" = "touch compiled.marker"
"Arbor.Build.Tools.Test.Command" = "exit 4"
"Arbor.Build.Tools.Package.Command" = "touch packaged.marker"
"#,
    );
    let output = arbor(repo.path())
        .arg("build")
        .arg(repo.path())
        .output()
        .expect("Failed to execute arbor");

    assert_eq!(output.status.code(), Some(4));
    assert!(repo.path().join("compiled.marker").exists());
    assert!(!repo.path().join("packaged.marker").exists());
}

#[cfg(unix)]
#[test]
fn test_build_succeeds_when_all_commands_pass() {
    let repo = create_repo(
        r#"[variables]
"Arbor.Build.Tools.Compile.Command" = "test -n \"$Arbor_Build_Id\""
"#,
    );
    let output = arbor(repo.path())
        .arg("build")
        .arg(repo.path())
        .output()
        .expect("Failed to execute arbor");

    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_build_help_passthrough_fails() {
    let repo = create_repo("");
    let output = arbor(repo.path())
        .arg("build")
        .arg(repo.path())
        .args(["--", "--help"])
        .output()
        .expect("Failed to execute arbor");

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_build_missing_repository_path() {
    let repo = create_repo("");
    let output = arbor(repo.path())
        .args(["build", "/nonexistent/arbor/repository"])
        .output()
        .expect("Failed to execute arbor");

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_invalid_duplicate_policy_fails() {
    let repo = create_repo("");
    let output = arbor(repo.path())
        .env("ARBOR_DUPLICATE_KEYS", "sometimes")
        .arg("variables")
        .arg(repo.path())
        .output()
        .expect("Failed to execute arbor");

    assert_eq!(output.status.code(), Some(1));
}
