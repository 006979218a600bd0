//! Result filter.
//!
//! Language, fork and state predicates are AND-combined. Name fragments are
//! OR-combined among themselves: a pair passes when its name contains at least
//! one fragment.

use std::collections::BTreeSet;

use crate::error::ConfigError;
use crate::types::{RepoStatePair, RepositoryState};

/// Pure predicate over classified pairs. Empty sets mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    languages: BTreeSet<String>,
    states: BTreeSet<RepositoryState>,
    names: Vec<String>,
    fork: Option<bool>,
}

impl Filter {
    /// Build a filter from raw comma-separated flag values.
    pub fn new(
        languages: &str,
        states: &str,
        names: &str,
        fork: Option<bool>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            languages: split_list(languages).into_iter().collect(),
            states: resolve_states(states)?,
            names: split_list(names),
            fork,
        })
    }

    /// Filter that admits everything.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_states(mut self, states: impl IntoIterator<Item = RepositoryState>) -> Self {
        self.states = states.into_iter().collect();
        self
    }

    pub fn states(&self) -> &BTreeSet<RepositoryState> {
        &self.states
    }

    pub fn include(&self, pair: &RepoStatePair) -> bool {
        if !self.states.is_empty() && !self.states.contains(&pair.state) {
            return false;
        }
        self.admits_identity(pair)
    }

    /// Every predicate except the state set.
    ///
    /// Remediation uses this so `sync --langs go` clones only Go repositories
    /// while the state set still applies to what is finally reported.
    pub fn admits_identity(&self, pair: &RepoStatePair) -> bool {
        if !self.languages.is_empty() && !self.languages.contains(pair.language.as_str()) {
            return false;
        }

        if let Some(fork) = self.fork {
            if pair.fork != fork {
                return false;
            }
        }

        if !self.names.is_empty() {
            return self.names.iter().any(|n| pair.name.0.contains(n.as_str()));
        }

        true
    }
}

/// Split a comma-separated flag value, dropping empty and blank entries.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Resolve raw `--states` tokens against canonical state names.
///
/// Each token is a case-insensitive prefix. A token equal to a full canonical
/// name always resolves to that state; otherwise it must be a prefix of
/// exactly one name. Zero or several matches are rejected with the list of
/// valid names.
pub fn resolve_states(raw: &str) -> Result<BTreeSet<RepositoryState>, ConfigError> {
    let mut resolved = BTreeSet::new();
    for token in split_list(raw) {
        resolved.insert(resolve_state(&token)?);
    }
    Ok(resolved)
}

fn resolve_state(token: &str) -> Result<RepositoryState, ConfigError> {
    let lowered = token.to_lowercase();

    if let Some(exact) = RepositoryState::ALL
        .iter()
        .find(|s| s.name().to_lowercase() == lowered)
    {
        return Ok(*exact);
    }

    let matches: Vec<RepositoryState> = RepositoryState::ALL
        .iter()
        .copied()
        .filter(|s| s.name().to_lowercase().starts_with(&lowered))
        .collect();

    match matches.as_slice() {
        [single] => Ok(*single),
        [] => Err(ConfigError::InvalidState {
            token: token.to_owned(),
            valid: RepositoryState::valid_names(),
        }),
        many => Err(ConfigError::AmbiguousState {
            token: token.to_owned(),
            matches: many.iter().map(|s| s.name()).collect(),
            valid: RepositoryState::valid_names(),
        }),
    }
}
