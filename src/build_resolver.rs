//! Build-Resolver (§4.I): given a change's revision, the candidates map from
//! Build-Mapper, and the change repository's commit list, find the earliest
//! build whose pinned SHA is a descendant of — or equal to — the change's
//! commit.

use std::collections::HashMap;

use buildcore_client::Commit;
use tracing::instrument;

use crate::error::{Error, Result};

#[instrument(skip(commits, candidates), fields(revision, commits = commits.len()))]
pub fn resolve_build(
    revision: &str,
    candidates: &HashMap<String, String>,
    commits: &[Commit],
) -> Result<String> {
    let k = commits
        .iter()
        .position(|c| c.id == revision)
        .ok_or_else(|| Error::ChangeNotLanded(revision.to_string()))?;

    // commits is newest-first; scanning from k toward index 0 walks toward
    // newer commits, so the first candidate hit is the earliest build that
    // contains the change.
    commits[..=k]
        .iter()
        .rev()
        .find_map(|c| candidates.get(&c.id).cloned())
        .ok_or_else(|| Error::ChangeNotLanded(revision.to_string()))
}
