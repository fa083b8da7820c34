//! The manifest snapshot data model: the typed projection of a [repo
//! manifest](https://gerrit.googlesource.com/git-repo/+/master/docs/manifest-format.md)
//! XML document, and the resolution logic that turns it into a flat
//! `repoName -> RepoPin` map (§3/§4.B of the build-discovery core).
//!
//! This crate only defines the shape of a manifest and how to resolve it; it
//! does not know how to fetch one or parse XML bytes into this shape — that
//! is the caller's job (`quick-xml::de::from_str`), so that this crate stays
//! free of any particular transport or XML library version.
//!
//! Deserialization tolerates unknown elements and attributes: `<notice>`,
//! `<manifest-server>`, `<remove-project>`, `<extend-project>`,
//! `<repo-hooks>`, `<include>`, and any per-project attribute this data model
//! does not name are simply ignored by `serde`, since none of them are
//! declared as fields here.

pub mod default;
pub mod project;
pub mod remote;

pub mod error;

use std::collections::HashMap;

use self::{default::Default, project::Project, remote::Remote};
use error::ManifestError;
use serde::Deserialize;

pub use repo_pin::RepoPin;

mod repo_pin;

/// The key [`Manifest::resolve_remotes`] installs the default remote's URL
/// under, so that a project without an explicit `@remote` attribute resolves
/// through the same lookup as an explicit one.
const DEFAULT_REMOTE_KEY: &str = "";

#[derive(Debug, Clone, Deserialize)]
/// See [Google's documentation](https://gerrit.googlesource.com/git-repo/+/master/docs/manifest-format.md#Element-manifest) for more.
pub struct Manifest {
    /// One or more remote elements may be specified.
    remote: Option<Vec<Remote>>,

    /// Exactly one default element must be specified (§3).
    default: Option<Default>,

    /// One or more project elements may be specified.
    project: Option<Vec<Project>>,
}

impl Manifest {
    pub fn projects(&self) -> &[Project] {
        self.project.as_deref().unwrap_or(&[])
    }

    pub fn remotes(&self) -> &[Remote] {
        self.remote.as_deref().unwrap_or(&[])
    }

    /// Build the `remoteName -> instanceURL` table described by §4.B: each
    /// remote's `@fetch` URL has its `https://` scheme stripped, and the
    /// default remote's URL is additionally installed under the empty key so
    /// that a remote-less project resolves through the same lookup.
    pub fn resolve_remotes(&self) -> Result<HashMap<String, String>, ManifestError> {
        let mut remotes_by_name: HashMap<String, String> = self
            .remotes()
            .iter()
            .map(|remote| (remote.name.clone(), strip_https(&remote.fetch)))
            .collect();

        let default_remote_name = self
            .default
            .as_ref()
            .and_then(|default| default.remote.as_deref())
            .ok_or(ManifestError::MissingDefaultRemote)?;
        let default_remote_url = remotes_by_name
            .get(default_remote_name)
            .cloned()
            .ok_or(ManifestError::MissingDefaultRemote)?;
        remotes_by_name.insert(DEFAULT_REMOTE_KEY.to_string(), default_remote_url);

        Ok(remotes_by_name)
    }

    /// Resolve this manifest into a flat `repoName -> RepoPin` map (§3, §4.B).
    pub fn build_repo_pins(&self) -> Result<HashMap<String, RepoPin>, ManifestError> {
        let remotes_by_name = self.resolve_remotes()?;

        let mut pins = HashMap::new();
        for project in self.projects() {
            if project.name.is_empty() {
                return Err(ManifestError::ProjectMissingName(project.name.clone()));
            }

            let remote_name = project.remote.as_deref().unwrap_or(DEFAULT_REMOTE_KEY);
            let instance_url = remotes_by_name.get(remote_name).cloned().ok_or_else(|| {
                ManifestError::UnknownRemote {
                    project: project.name.clone(),
                    remote: remote_name.to_string(),
                }
            })?;

            let committish = project
                .revision
                .clone()
                .ok_or_else(|| ManifestError::ProjectMissingRevision(project.name.clone()))?;

            pins.insert(
                project.name.clone(),
                RepoPin {
                    repo_name: project.name.clone(),
                    instance_url,
                    committish,
                },
            );
        }
        Ok(pins)
    }

    /// Locate the project matching a repository name and, if present, a
    /// branch (§4.H-2). Absence of `dest-branch` on a candidate project is
    /// permissive — it matches any requested branch.
    pub fn find_project<'a>(&'a self, repo_name: &str, branch: &str) -> Option<&'a Project> {
        self.projects().iter().find(|project| {
            project.name == repo_name
                && project
                    .dest_branch()
                    .map(|dest| dest == branch)
                    .unwrap_or(true)
        })
    }
}

fn strip_https(url: &str) -> String {
    url.strip_prefix("https://").unwrap_or(url).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::de::from_str;

    const SAMPLE: &str = include_str!("../tests/fixtures/sample_manifest.xml");

    #[test]
    fn test_serialized_sample() {
        let parsed: Manifest = from_str(SAMPLE).unwrap();
        assert_eq!(parsed.remotes().len(), 2);
        assert_eq!(parsed.projects().len(), 2);
    }

    #[test]
    fn build_repo_pins_resolves_default_remote_and_revision() {
        let parsed: Manifest = from_str(SAMPLE).unwrap();
        let pins = parsed.build_repo_pins().unwrap();

        let kernel = &pins["platform/kernel"];
        assert_eq!(kernel.instance_url, "cos.googlesource.com");
        assert_eq!(kernel.committish, "refs/heads/cos-main");

        let overlay = &pins["third_party/overlay"];
        assert_eq!(overlay.instance_url, "third-party.googlesource.com");
        assert_eq!(overlay.committish, "deadbeefcafef00dfeed");
    }

    #[test]
    fn build_repo_pins_fails_without_default_element() {
        let manifest = Manifest {
            remote: Some(vec![]),
            default: None,
            project: Some(vec![]),
        };
        assert_eq!(
            manifest.build_repo_pins().unwrap_err(),
            ManifestError::MissingDefaultRemote
        );
    }

    #[test]
    fn repo_pin_keys_are_unique_within_a_manifest() {
        let parsed: Manifest = from_str(SAMPLE).unwrap();
        let pins = parsed.build_repo_pins().unwrap();
        let mut names: Vec<_> = pins.keys().cloned().collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), pins.len());
    }

    #[test]
    fn tolerates_unknown_elements_and_attributes() {
        const WITH_NOTICE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest>
  <notice>Some legal text</notice>
  <remote name="cos" fetch="https://cos.googlesource.com"/>
  <default remote="cos"/>
  <manifest-server url="https://cos.googlesource.com/manifest"/>
  <project name="platform/kernel" revision="abc123" groups="core,extra" sync-c="true"/>
  <remove-project name="platform/obsolete"/>
</manifest>"#;

        let parsed: Manifest = from_str(WITH_NOTICE).unwrap();
        let pins = parsed.build_repo_pins().unwrap();
        assert_eq!(pins.len(), 1);
        assert!(pins.contains_key("platform/kernel"));
    }

    #[test]
    fn find_project_matches_branch_permissively_when_dest_branch_absent() {
        const NO_DEST_BRANCH: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest>
  <remote name="cos" fetch="https://cos.googlesource.com"/>
  <default remote="cos"/>
  <project name="platform/kernel" revision="abc123"/>
</manifest>"#;
        let parsed: Manifest = from_str(NO_DEST_BRANCH).unwrap();
        assert!(parsed.find_project("platform/kernel", "any-branch").is_some());
        assert!(parsed.find_project("platform/other", "any-branch").is_none());
    }

    #[test]
    fn find_project_requires_matching_dest_branch_when_present() {
        const WITH_DEST_BRANCH: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest>
  <remote name="cos" fetch="https://cos.googlesource.com"/>
  <default remote="cos"/>
  <project name="platform/kernel" revision="abc123" dest-branch="refs/heads/release-22"/>
</manifest>"#;
        let parsed: Manifest = from_str(WITH_DEST_BRANCH).unwrap();
        assert!(parsed.find_project("platform/kernel", "release-22").is_some());
        assert!(parsed.find_project("platform/kernel", "main").is_none());
    }
}
