use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::ClientError;

/// The JSON shape of a single log entry as returned by the Gitiles-shaped
/// `Log` endpoint (§4.A), before trailer extraction. Kept separate from
/// [`Commit`] so a whole page can be deserialized with `serde_json` and
/// converted to the domain record only once, at the end of paging (§4.D).
#[derive(Debug, Clone, Deserialize)]
pub struct RawCommit {
    pub commit: String,
    pub committer: RawIdentity,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawIdentity {
    pub name: String,
    pub email: String,
    /// RFC 2822-ish timestamp as emitted by the log endpoint, e.g.
    /// `"Tue Mar 05 10:00:00 2024 +0000"`.
    pub time: String,
}

/// A single commit in a repository's history (§3). The commit stream a
/// repository's log endpoint returns is topologically ordered, newest first;
/// this record carries just enough of a raw commit to support changelog
/// rendering and build localization — nothing the core doesn't need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub id: String,
    pub committer_name: String,
    pub committer_email: String,
    pub timestamp: DateTime<Utc>,
    pub subject: String,
    pub bug_refs: Vec<String>,
    pub release_notes: Option<String>,
}

impl Commit {
    /// Parse a page's raw commits into domain records, extracting the
    /// `Bug:`/`Release-Note:` trailers conventionally carried in a commit
    /// message's final paragraph.
    pub fn from_raw(raw: RawCommit, host: &str) -> Result<Self, ClientError> {
        let timestamp = DateTime::parse_from_str(&raw.committer.time, "%a %b %d %T %Y %z")
            .map_err(|e| {
                ClientError::malformed(
                    host,
                    format!("unparseable committer timestamp {:?}: {e}", raw.committer.time),
                )
            })?
            .with_timezone(&Utc);

        let mut lines = raw.message.lines();
        let subject = lines.next().unwrap_or_default().to_string();

        let mut bug_refs = Vec::new();
        let mut release_notes = None;
        for line in raw.message.lines() {
            if let Some(value) = line.strip_prefix("Bug:") {
                bug_refs.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string),
                );
            } else if let Some(value) = line.strip_prefix("Release-Note:") {
                release_notes = Some(value.trim().to_string());
            }
        }

        Ok(Commit {
            id: raw.commit,
            committer_name: raw.committer.name,
            committer_email: raw.committer.email,
            timestamp,
            subject,
            bug_refs,
            release_notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_subject_and_trailers() {
        let raw = RawCommit {
            commit: "abc123".to_string(),
            committer: RawIdentity {
                name: "Build Cop".to_string(),
                email: "buildcop@cos.example".to_string(),
                time: "Tue Mar 05 10:00:00 2024 +0000".to_string(),
            },
            message: "Fix the frobnicator\n\nLonger body here.\n\nBug: 12345, 6789\nRelease-Note: Fixed frobnicator crash\n".to_string(),
        };

        let commit = Commit::from_raw(raw, "cos.googlesource.com").unwrap();
        assert_eq!(commit.subject, "Fix the frobnicator");
        assert_eq!(commit.bug_refs, vec!["12345", "6789"]);
        assert_eq!(
            commit.release_notes.as_deref(),
            Some("Fixed frobnicator crash")
        );
    }

    #[test]
    fn rejects_unparseable_timestamp() {
        let raw = RawCommit {
            commit: "abc123".to_string(),
            committer: RawIdentity {
                name: "Build Cop".to_string(),
                email: "buildcop@cos.example".to_string(),
                time: "not a timestamp".to_string(),
            },
            message: "Fix the frobnicator".to_string(),
        };

        assert!(Commit::from_raw(raw, "cos.googlesource.com").is_err());
    }
}
