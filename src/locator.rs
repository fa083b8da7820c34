//! Change-Locator (§4.F): resolve a user-supplied change identifier (a
//! numeric change ID, a commit revision, or a change-signature string) to
//! its canonical repository, branch, release, revision, and submission
//! time.

use std::collections::HashMap;

use buildcore_client::GerritClient;
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::instrument;

use crate::{
    config::BranchRule,
    error::{Error, Result},
};

/// The maximum number of matches requested from the code-review system
/// (§4.F): enough to distinguish "exactly one" from "ambiguous" without
/// paging.
const QUERY_LIMIT: u32 = 2;

const SUBMITTED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A single change submitted to one of the constituent repositories (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub change_number: u64,
    /// Prefixed with the configured repository-name prefix so downstream
    /// lookups in the manifest repo resolve (§4.F).
    pub repository: String,
    pub branch: String,
    pub release: String,
    pub revision: String,
    pub submitted_at: DateTime<Utc>,
}

#[instrument(skip(client, branch_rules), fields(identifier, repo_prefix))]
pub async fn locate_change(
    client: &GerritClient,
    identifier: &str,
    repo_prefix: &str,
    branch_rules: &HashMap<String, BranchRule>,
) -> Result<Change> {
    let mut matches = client
        .query_changes(identifier, QUERY_LIMIT)
        .await
        .map_err(Error::Transport)?;

    let change_info = match matches.len() {
        0 => return Err(Error::ChangeNotFound(identifier.to_string())),
        1 => matches.remove(0),
        _ => return Err(Error::AmbiguousIdentifier(identifier.to_string())),
    };

    let submitted_raw = change_info
        .submitted
        .filter(|s| !s.is_empty())
        .ok_or(Error::ChangeNotSubmitted(change_info.number))?;
    let submitted_at = parse_submitted_at(&submitted_raw)?;

    let revision = change_info.current_revision.clone().ok_or_else(|| {
        Error::MalformedHistory(format!(
            "change {} has no current_revision",
            change_info.number
        ))
    })?;

    let release = resolve_release(&change_info.project, &change_info.branch, branch_rules);

    Ok(Change {
        change_number: change_info.number,
        repository: format!("{repo_prefix}{}", change_info.project),
        branch: change_info.branch,
        release,
        revision,
        submitted_at,
    })
}

/// Derive the `release` field (§3, §4.F): the configured regex's capture
/// group 1 when present, else the rule's default release; or, for
/// repositories with no configured rule, the branch name itself.
fn resolve_release(repo: &str, branch: &str, branch_rules: &HashMap<String, BranchRule>) -> String {
    match branch_rules.get(repo) {
        Some(rule) => rule
            .regex
            .captures(branch)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| rule.default_release.clone()),
        None => branch.to_string(),
    }
}

fn parse_submitted_at(raw: &str) -> Result<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(raw, SUBMITTED_AT_FORMAT).map_err(|e| {
        Error::MalformedHistory(format!("unparseable submission timestamp {raw:?}: {e}"))
    })?;
    Ok(DateTime::from_naive_utc_and_offset(naive, Utc))
}
