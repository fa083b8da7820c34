use serde::Deserialize;

/// See [Google's documentation](https://gerrit.googlesource.com/git-repo/+/master/docs/manifest-format.md#Element-remote)
#[derive(Debug, Clone, Deserialize)]
pub struct Remote {
    /// A short name unique to this manifest file, referenced by a project's
    /// `@remote` attribute (or, for remote-less projects, by `<default>`).
    #[serde(rename = "@name")]
    pub name: String,

    /// The instance URL prefix for all projects which use this remote.
    /// Carried on the wire with its `https://` scheme; §4.B strips it.
    #[serde(rename = "@fetch")]
    pub fetch: String,
}
