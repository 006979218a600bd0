use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

/// `sgit` with an isolated home and none of the configuration variables set.
fn sgit_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("sgit"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env_remove("GITHUB_TOKEN")
        .env_remove("GITHUB_USERNAME")
        .env_remove("CODE_HOME_DIR")
        .env_remove("SGIT_API_URL")
        .env_remove("SGIT_LAYOUT")
        .env_remove("SGIT_CONCURRENCY")
        .env_remove("SGIT_REQUEST_TIMEOUT_SECS")
        .env_remove("SGIT_LOG")
        .env_remove("RUST_LOG");
    cmd
}

fn configured_cmd(home: &Path, base: &Path) -> Command {
    let mut cmd = sgit_cmd(home);
    cmd.env("GITHUB_TOKEN", "test-token")
        .env("GITHUB_USERNAME", "octo")
        .env("CODE_HOME_DIR", base)
        // Nothing listens here; requests fail fast with a connection error.
        .env("SGIT_API_URL", "http://127.0.0.1:9");
    cmd
}

#[test]
fn help_lists_subcommands() {
    let home = TempDir::new().expect("home");
    sgit_cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("ls"))
        .stdout(contains("sync"))
        .stdout(contains("clone"))
        .stdout(contains("create"))
        .stdout(contains("delete"));
}

#[test]
fn missing_configuration_names_every_variable() {
    let home = TempDir::new().expect("home");
    sgit_cmd(home.path())
        .arg("ls")
        .assert()
        .failure()
        .stderr(contains("GITHUB_TOKEN"))
        .stderr(contains("GITHUB_USERNAME"))
        .stderr(contains("CODE_HOME_DIR"));
}

#[test]
fn unknown_state_fails_before_configuration_is_read() {
    let home = TempDir::new().expect("home");
    sgit_cmd(home.path())
        .args(["ls", "--states", "bogus"])
        .assert()
        .failure()
        .stderr(contains("invalid --states value \"bogus\""))
        .stderr(contains("IncorrectLanguageParentDirectory"))
        .stderr(contains("missing required configuration").not());
}

#[test]
fn ambiguous_state_prefix_is_rejected() {
    let home = TempDir::new().expect("home");
    sgit_cmd(home.path())
        .args(["sync", "-s", "no"])
        .assert()
        .failure()
        .stderr(contains("ambiguous"))
        .stderr(contains("NotGitRepo"));
}

#[test]
fn delete_requires_a_filter() {
    let home = TempDir::new().expect("home");
    sgit_cmd(home.path())
        .args(["delete", "--target", "local"])
        .assert()
        .failure()
        .stderr(contains("refusing to delete without a filter"));
}

#[test]
fn delete_rejects_unknown_target() {
    let home = TempDir::new().expect("home");
    sgit_cmd(home.path())
        .args(["delete", "--target", "everywhere", "-n", "x"])
        .assert()
        .failure()
        .stderr(contains("expected local, remote, or both"));
}

#[test]
fn malformed_clone_argument_is_rejected() {
    let home = TempDir::new().expect("home");
    sgit_cmd(home.path())
        .args(["clone", "a/b/c"])
        .assert()
        .failure()
        .stderr(contains("invalid repository"));
}

#[test]
fn config_file_supplies_required_values() {
    let home = TempDir::new().expect("home");
    let base = TempDir::new().expect("base");
    let dir = home.path().join(".sgit");
    std::fs::create_dir_all(&dir).expect("mkdir");
    std::fs::write(
        dir.join("config.yaml"),
        format!(
            "token: from-file\naccount: octo\nbase_dir: {}\napi_url: http://127.0.0.1:9\n",
            base.path().display()
        ),
    )
    .expect("write config");

    // Configuration resolves, so the failure is the unreachable API.
    sgit_cmd(home.path())
        .arg("ls")
        .assert()
        .failure()
        .stderr(contains("listing repositories failed"))
        .stderr(contains("missing required configuration").not());
}

#[test]
fn unreachable_api_is_fatal_to_the_run() {
    let home = TempDir::new().expect("home");
    let base = TempDir::new().expect("base");
    configured_cmd(home.path(), base.path())
        .args(["ls", "--json"])
        .assert()
        .failure()
        .stderr(contains("remote listing failed"));
}
