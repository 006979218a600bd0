//! Config file layering and error-message tests.
//! File location: <home>/.sgit/config.yaml

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use assert_fs::prelude::*;
use predicates::prelude::predicate;
use sgit_core::{
    config::{self, ACCOUNT_VAR, BASE_DIR_VAR, TOKEN_VAR},
    Config, ConfigError, Layout,
};

fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn file_supplies_required_values() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(".sgit/config.yaml")
        .write_str(
            "token: file-token\naccount: octo\nbase_dir: /srv/code\nconcurrency: 3\nlayout: owner\nrun_timeout_secs: 30\n",
        )
        .expect("write config");

    let cfg = Config::load_at(home.path(), |_| None).expect("load");
    assert_eq!(cfg.token, "file-token");
    assert_eq!(cfg.account, "octo");
    assert_eq!(cfg.base_dir, PathBuf::from("/srv/code"));
    assert_eq!(cfg.concurrency, 3);
    assert_eq!(cfg.layout, Layout::Owner);
    assert_eq!(cfg.run_timeout, Duration::from_secs(30));
}

#[test]
fn env_overrides_file() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(".sgit/config.yaml")
        .write_str("token: file-token\naccount: file-user\nbase_dir: /srv/code\n")
        .expect("write config");

    let env = vars(&[
        (ACCOUNT_VAR, "env-user"),
        (config::LAYOUT_VAR, "OWNER"),
        (config::REQUEST_TIMEOUT_VAR, "9"),
    ]);
    let cfg = Config::load_at(home.path(), |k| env.get(k).cloned()).expect("load");
    assert_eq!(cfg.token, "file-token");
    assert_eq!(cfg.account, "env-user");
    assert_eq!(cfg.layout, Layout::Owner);
    assert_eq!(cfg.request_timeout, Duration::from_secs(9));
}

#[test]
fn malformed_file_reports_path() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let file = home.child(".sgit/config.yaml");
    file.write_str("token: [unclosed\n").expect("write config");
    file.assert(predicate::path::exists());

    let err = Config::load_at(home.path(), |_| None).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("config.yaml"));
}

#[test]
fn unknown_key_is_rejected() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(".sgit/config.yaml")
        .write_str("tokn: typo\n")
        .expect("write config");

    let err = Config::load_at(home.path(), |_| None).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
}

#[test]
fn invalid_layout_names_choices() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let env = vars(&[
        (TOKEN_VAR, "t"),
        (ACCOUNT_VAR, "octo"),
        (BASE_DIR_VAR, "/code"),
        (config::LAYOUT_VAR, "nested"),
    ]);
    let err = Config::load_at(home.path(), |k| env.get(k).cloned()).unwrap_err();
    assert!(err.to_string().contains("flat, owner"), "got: {err}");
}

#[test]
fn missing_everything_names_all_three() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let err = Config::load_at(home.path(), |_| None).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains(TOKEN_VAR));
    assert!(msg.contains(ACCOUNT_VAR));
    assert!(msg.contains(BASE_DIR_VAR));
}

#[test]
fn zero_run_timeout_in_file_is_rejected() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(".sgit/config.yaml")
        .write_str("token: t\naccount: octo\nbase_dir: /code\nrun_timeout_secs: 0\n")
        .expect("write config");

    let err = Config::load_at(home.path(), |_| None).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }), "got: {err}");
    assert!(err.to_string().contains("run_timeout_secs"), "got: {err}");
}
