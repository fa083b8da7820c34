/// A single repository pin extracted from a manifest snapshot: the
/// repository name, the instance (host) URL it is fetched from, and the
/// committish the manifest pins it to.
///
/// Two manifests differ if and only if some `RepoPin` differs — this is the
/// unit the changelog engine diffs between a source and a target build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoPin {
    pub repo_name: String,
    pub instance_url: String,
    pub committish: String,
}
