use serde::Deserialize;

/// See [Google's documentation](https://gerrit.googlesource.com/git-repo/+/master/docs/manifest-format.md#Element-default)
///
/// §3 gives `<default>` exactly one job in this data model: naming the
/// fallback remote for projects that omit their own `@remote`.
#[derive(Debug, Clone, Deserialize)]
pub struct Default {
    #[serde(rename = "@remote")]
    pub remote: Option<String>,
}
