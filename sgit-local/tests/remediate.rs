mod common;

use std::fs;
use std::process::Command;
use std::sync::Arc;

use tempfile::TempDir;

use sgit_core::{Language, RemoteRepo, RepoName, Remediator, SourceError};
use sgit_local::{staging_path, CloneRemediator, GitCli, Vcs, VcsError};

use common::FakeVcs;

fn remote(name: &str, url: &str) -> RemoteRepo {
    RemoteRepo {
        name: RepoName::from(name),
        owner: "octo".to_string(),
        language: Language::from("go"),
        clone_url: url.to_string(),
        fork: false,
    }
}

#[tokio::test]
async fn successful_clone_is_renamed_into_place() {
    let base = TempDir::new().expect("base");
    let target = base.path().join("go/foo");
    let vcs = Arc::new(FakeVcs::default());
    let remediator = CloneRemediator::new(vcs.clone());

    remediator
        .clone_repo(&remote("foo", "git@example:octo/foo.git"), &target)
        .await
        .expect("clone");

    assert!(target.join(".git").is_dir());
    assert!(target.join("README.md").is_file());
    assert!(!staging_path(&target).exists());

    let cloned = vcs.cloned.lock().unwrap();
    assert_eq!(cloned.len(), 1);
    assert_eq!(cloned[0].1, staging_path(&target));
}

#[tokio::test]
async fn failed_clone_leaves_nothing_behind() {
    let base = TempDir::new().expect("base");
    let target = base.path().join("go/broken");
    let mut vcs = FakeVcs::default();
    vcs.failing_urls.insert("git@example:octo/broken.git".to_string());
    let remediator = CloneRemediator::new(Arc::new(vcs));

    let err = remediator
        .clone_repo(&remote("broken", "git@example:octo/broken.git"), &target)
        .await
        .unwrap_err();

    assert!(matches!(err, SourceError::Clone { .. }));
    assert!(!target.exists());
    assert!(!staging_path(&target).exists());
}

#[tokio::test]
async fn existing_target_is_refused() {
    let base = TempDir::new().expect("base");
    let target = base.path().join("go/foo");
    fs::create_dir_all(&target).expect("mkdir");
    let remediator = CloneRemediator::new(Arc::new(FakeVcs::default()));

    let err = remediator
        .clone_url("git@example:octo/foo.git", &target)
        .await
        .unwrap_err();
    assert!(matches!(err, VcsError::TargetExists { .. }));
}

#[tokio::test]
async fn stale_staging_directory_is_replaced() {
    let base = TempDir::new().expect("base");
    let target = base.path().join("go/foo");
    let stale = staging_path(&target);
    fs::create_dir_all(stale.join("junk")).expect("mkdir");
    let remediator = CloneRemediator::new(Arc::new(FakeVcs::default()));

    remediator
        .clone_url("git@example:octo/foo.git", &target)
        .await
        .expect("clone");
    assert!(!target.join("junk").exists());
    assert!(!stale.exists());
}

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &std::path::Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "test")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_COMMITTER_NAME", "test")
        .env("GIT_COMMITTER_EMAIL", "test@example.com")
        .status()
        .expect("run git");
    assert!(status.success(), "git {args:?} failed");
}

#[tokio::test]
async fn git_cli_clones_and_probes_a_local_repository() {
    if !git_available() {
        eprintln!("git not on PATH; skipping");
        return;
    }
    let tmp = TempDir::new().expect("tmp");
    let upstream = tmp.path().join("upstream");
    fs::create_dir_all(&upstream).expect("mkdir");
    git(&upstream, &["init", "--quiet"]);
    fs::write(upstream.join("README.md"), "hello").expect("write");
    git(&upstream, &["add", "README.md"]);
    git(&upstream, &["commit", "--quiet", "-m", "init"]);

    let target = tmp.path().join("code/unknown/upstream");
    let vcs = Arc::new(GitCli::new());
    let remediator = CloneRemediator::new(vcs.clone());
    remediator
        .clone_url(&upstream.to_string_lossy(), &target)
        .await
        .expect("clone");

    assert!(target.join(".git").exists());
    assert!(!vcs.has_uncommitted_changes(&target).await.expect("status"));
    let address = vcs.remote_address(&target).await.expect("remote");
    assert!(address.ends_with("upstream"), "address: {address}");

    fs::write(target.join("new.txt"), "change").expect("write");
    assert!(vcs.has_uncommitted_changes(&target).await.expect("status"));
    assert!(!vcs.has_merge_conflicts(&target).await.expect("conflicts"));
}

#[tokio::test]
async fn git_cli_reports_failure_for_a_missing_source() {
    if !git_available() {
        eprintln!("git not on PATH; skipping");
        return;
    }
    let tmp = TempDir::new().expect("tmp");
    let vcs = GitCli::new();
    let err = vcs
        .clone_to(
            &tmp.path().join("nowhere").to_string_lossy(),
            &tmp.path().join("dest"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, VcsError::Failed { .. }), "got: {err}");
}

#[tokio::test]
async fn git_cli_stash_reset_push_and_pull_round_trip() {
    if !git_available() {
        eprintln!("git not on PATH; skipping");
        return;
    }
    let tmp = TempDir::new().expect("tmp");
    let seed = tmp.path().join("seed");
    fs::create_dir_all(&seed).expect("mkdir");
    git(&seed, &["init", "--quiet"]);
    fs::write(seed.join("README.md"), "hello").expect("write");
    git(&seed, &["add", "README.md"]);
    git(&seed, &["commit", "--quiet", "-m", "init"]);
    let upstream = tmp.path().join("upstream.git");
    git(
        tmp.path(),
        &["clone", "--quiet", "--bare", "seed", "upstream.git"],
    );

    let vcs = Arc::new(GitCli::new());
    let remediator = CloneRemediator::new(vcs.clone());
    let ours = tmp.path().join("code/go/ours");
    let theirs = tmp.path().join("code/go/theirs");
    for copy in [&ours, &theirs] {
        remediator
            .clone_url(&upstream.to_string_lossy(), copy)
            .await
            .expect("clone");
        git(copy, &["config", "user.name", "test"]);
        git(copy, &["config", "user.email", "test@example.com"]);
    }

    fs::write(ours.join("scratch.txt"), "scratch").expect("write");
    assert!(vcs.has_uncommitted_changes(&ours).await.expect("status"));
    vcs.stash(&ours).await.expect("stash");
    assert!(!vcs.has_uncommitted_changes(&ours).await.expect("status"));
    assert!(!ours.join("scratch.txt").exists());

    fs::write(ours.join("README.md"), "edited").expect("write");
    fs::write(ours.join("junk.txt"), "junk").expect("write");
    vcs.reset(&ours).await.expect("reset");
    assert!(!vcs.has_uncommitted_changes(&ours).await.expect("status"));
    assert_eq!(fs::read_to_string(ours.join("README.md")).expect("read"), "hello");
    assert!(!ours.join("junk.txt").exists());

    fs::write(ours.join("feature.txt"), "shared").expect("write");
    vcs.push(&ours).await.expect("push");
    assert!(!vcs.has_uncommitted_changes(&ours).await.expect("status"));

    vcs.pull(&theirs).await.expect("pull");
    assert_eq!(
        fs::read_to_string(theirs.join("feature.txt")).expect("read"),
        "shared"
    );
    assert!(!vcs.has_merge_conflicts(&theirs).await.expect("conflicts"));
}
