//! Manifest-Window Selector (§4.G): bisect the tag-ordered commit sequence
//! of the manifest repository to the contiguous slice within 5 days of a
//! change's submission time.
//!
//! The window must satisfy the invariant tested in §8-5: every returned
//! commit's timestamp lies in `[t, t+5d]`, and every commit immediately
//! outside the slice is outside that interval. The commit list is newest
//! first, so timestamps are non-increasing as the index grows — both
//! boundaries are found with a single `partition_point` binary search each.

use buildcore_client::Commit;
use chrono::{DateTime, Duration, Utc};

use crate::error::{Error, Result};

/// The heuristic bound on submission-to-release latency (§9 Open Question
/// 3): if release cadence changes, this becomes a configuration knob, but
/// today it is fixed.
pub fn window_span() -> Duration {
    Duration::days(5)
}

pub fn select_window<'a>(commits: &'a [Commit], submitted_at: DateTime<Utc>) -> Result<&'a [Commit]> {
    for commit in commits {
        if commit.committer_name.is_empty() {
            return Err(Error::MalformedHistory(format!(
                "commit {} has no committer",
                commit.id
            )));
        }
    }

    let upper_bound = submitted_at + window_span();

    // First index whose commit time has dropped to or below the upper bound
    // — the start of the window (commits newer than this are too new).
    let start = commits.partition_point(|c| c.timestamp > upper_bound);

    // First index whose commit time has dropped below the lower bound — the
    // exclusive end of the window (commits at or after this are too old).
    let end = commits.partition_point(|c| c.timestamp >= submitted_at);

    if start >= end {
        return Ok(&[]);
    }
    Ok(&commits[start..end])
}
