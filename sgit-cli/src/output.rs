//! Console presentation: state tables, JSON, per-repository outcome lines.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use sgit_core::{RepoStatePair, RepositoryState};
use sgit_sync::{CloneOutcome, CloneStatus, Reconciliation};

// ---------------------------------------------------------------------------
// State labels
// ---------------------------------------------------------------------------

pub fn state_label(state: RepositoryState) -> &'static str {
    match state {
        RepositoryState::UpToDate => "UP TO DATE",
        RepositoryState::UncommittedChanges => "UNCOMMITTED",
        RepositoryState::NotGitRepo => "NOT GIT",
        RepositoryState::NoRemoteRepo => "NO REMOTE",
        RepositoryState::IncorrectLanguageParentDirectory => "WRONG DIR",
        RepositoryState::NotCloned => "NOT CLONED",
        RepositoryState::FailedToClone => "CLONE FAILED",
    }
}

pub fn state_indicator(state: RepositoryState) -> String {
    match state {
        RepositoryState::UpToDate => "■".green().bold().to_string(),
        RepositoryState::UncommittedChanges => "■".yellow().bold().to_string(),
        RepositoryState::NotGitRepo => "■".bright_black().bold().to_string(),
        RepositoryState::NoRemoteRepo => "■".magenta().bold().to_string(),
        RepositoryState::IncorrectLanguageParentDirectory => "■".red().bold().to_string(),
        RepositoryState::NotCloned => "■".blue().bold().to_string(),
        RepositoryState::FailedToClone => "■".bright_red().bold().to_string(),
    }
}

fn display_path(base: &Path, path: &Path) -> String {
    path.strip_prefix(base)
        .map(|rel| rel.display().to_string())
        .unwrap_or_else(|_| path.display().to_string())
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

#[derive(Tabled)]
struct RepoRow {
    #[tabled(rename = "repository")]
    name: String,
    #[tabled(rename = "state")]
    state: String,
    #[tabled(rename = "path")]
    path: String,
    #[tabled(rename = "fork")]
    fork: &'static str,
}

fn row(base: &Path, pair: &RepoStatePair) -> RepoRow {
    RepoRow {
        name: pair.name.0.clone(),
        state: state_label(pair.state).to_string(),
        path: display_path(base, &pair.path),
        fork: if pair.fork { "fork" } else { "" },
    }
}

/// Header, legend, one table per language, and a per-state summary.
pub fn print_table(base: &Path, result: &Reconciliation) {
    let counts = result.count_by_state();
    println!(
        "sgit v{} | {} repositories | {} languages | {}",
        env!("CARGO_PKG_VERSION"),
        result.len(),
        result.groups.len(),
        base.display(),
    );

    if result.is_empty() {
        println!("No repositories match.");
        return;
    }

    let separator = "■".repeat(67).bright_black().to_string();
    println!("{separator}");
    let legend: Vec<String> = RepositoryState::ALL
        .iter()
        .map(|s| format!("{} {}", state_indicator(*s), state_label(*s)))
        .collect();
    println!("Indicators: {}", legend.join("  "));
    println!("{separator}");

    for (language, pairs) in &result.groups {
        println!("{}", language.as_str().to_uppercase().bold());
        let rows: Vec<RepoRow> = pairs.iter().map(|p| row(base, p)).collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        println!("{separator}");
    }

    let summary: Vec<String> = counts
        .iter()
        .map(|(state, n)| format!("{} {} {}", state_indicator(*state), n, state_label(*state)))
        .collect();
    println!("{}", summary.join("  "));

    if counts.contains_key(&RepositoryState::NotCloned) {
        println!("Run 'sgit sync' to clone missing repositories.");
    }
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ReportJson<'a> {
    summary: SummaryJson,
    repositories: Vec<&'a RepoStatePair>,
    issues: Vec<String>,
}

#[derive(Serialize)]
struct SummaryJson {
    repositories: usize,
    languages: usize,
    states: BTreeMap<&'static str, usize>,
    started_at: String,
    finished_at: String,
}

pub fn print_json(result: &Reconciliation) -> Result<()> {
    let payload = ReportJson {
        summary: SummaryJson {
            repositories: result.len(),
            languages: result.groups.len(),
            states: result
                .count_by_state()
                .into_iter()
                .map(|(state, n)| (state.name(), n))
                .collect(),
            started_at: result.started_at.to_rfc3339(),
            finished_at: result.finished_at.to_rfc3339(),
        },
        repositories: result.pairs().collect(),
        issues: result.issues.iter().map(ToString::to_string).collect(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize report JSON")?
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Outcome lines
// ---------------------------------------------------------------------------

pub fn clone_marker(status: CloneStatus) -> String {
    match status {
        CloneStatus::Cloned => "✓".green().bold().to_string(),
        CloneStatus::AlreadyPresent => "•".bright_black().to_string(),
        CloneStatus::Failed => "✗".red().bold().to_string(),
        CloneStatus::Skipped => "-".yellow().to_string(),
    }
}

pub fn print_clone_outcomes(base: &Path, outcomes: &[CloneOutcome]) {
    for outcome in outcomes {
        let detail = match &outcome.error {
            Some(err) => format!(" ({err})"),
            None => String::new(),
        };
        println!(
            "  {} {} {} {}{}",
            clone_marker(outcome.status),
            outcome.repo,
            "→".bright_black(),
            display_path(base, &outcome.target),
            detail.bright_black(),
        );
    }

    let count = |status: CloneStatus| outcomes.iter().filter(|o| o.status == status).count();
    println!(
        "{} cloned, {} already present, {} failed, {} skipped",
        count(CloneStatus::Cloned),
        count(CloneStatus::AlreadyPresent),
        count(CloneStatus::Failed),
        count(CloneStatus::Skipped),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_shown_relative_to_base() {
        let base = Path::new("/code");
        assert_eq!(display_path(base, Path::new("/code/go/foo")), "go/foo");
        assert_eq!(display_path(base, Path::new("/elsewhere/foo")), "/elsewhere/foo");
    }

    #[test]
    fn every_state_has_a_label() {
        let labels: std::collections::BTreeSet<_> =
            RepositoryState::ALL.iter().map(|s| state_label(*s)).collect();
        assert_eq!(labels.len(), RepositoryState::ALL.len());
    }
}
