use serde::Deserialize;

/// The prefix stripped from a `dest-branch` ref path to recover the bare branch
/// name. The length is part of the manifest wire contract: `refs/heads/` is
/// exactly 11 bytes.
const REFS_HEADS_PREFIX: &str = "refs/heads/";

/// See [Google's documentation](https://gerrit.googlesource.com/git-repo/+/master/docs/manifest-format.md#Element-project)
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    /// A unique name for this project within the manifest — the repository
    /// name used by both the git host and the code-review system.
    #[serde(rename = "@name")]
    pub name: String,

    /// Name of a previously defined remote element. If absent, the manifest's
    /// `<default>` remote is used.
    #[serde(rename = "@remote")]
    pub remote: Option<String>,

    /// The committish this manifest pins the project to.
    #[serde(rename = "@revision")]
    pub revision: Option<String>,

    /// Name of the Git branch changes are submitted against for code review,
    /// stored as it appears on the wire (`refs/heads/<branch>` or a bare
    /// name). Use [`Project::dest_branch`] to resolve it.
    #[serde(rename = "@dest-branch")]
    pub dest_branch: Option<String>,
}

impl Project {
    /// The project's `dest-branch`, with any `refs/heads/` prefix stripped, as
    /// required by the manifest wire contract. Returns `None` when the
    /// project has no `dest-branch` attribute at all, which permissively
    /// matches any branch when locating a project by repository+branch
    /// (§4.H-2).
    pub fn dest_branch(&self) -> Option<&str> {
        self.dest_branch
            .as_deref()
            .map(|raw| raw.strip_prefix(REFS_HEADS_PREFIX).unwrap_or(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_project() -> Project {
        Project {
            name: "platform/frameworks/base".to_string(),
            remote: None,
            revision: None,
            dest_branch: None,
        }
    }

    #[test]
    fn dest_branch_strips_refs_heads_prefix() {
        let mut project = sample_project();
        project.dest_branch = Some("refs/heads/main".to_string());
        assert_eq!(project.dest_branch(), Some("main"));
    }

    #[test]
    fn dest_branch_passes_through_bare_names() {
        let mut project = sample_project();
        project.dest_branch = Some("main".to_string());
        assert_eq!(project.dest_branch(), Some("main"));
    }

    #[test]
    fn dest_branch_absent_is_none() {
        let project = sample_project();
        assert_eq!(project.dest_branch(), None);
    }
}
