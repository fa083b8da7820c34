use std::collections::HashMap;

use async_trait::async_trait;

use crate::{commit::RawCommit, error::ClientError};

/// One page of a `Log` call: the raw commits it returned, and the
/// continuation token to pass back for the next page (`None` once the
/// server has nothing more to give).
#[derive(Debug, Clone)]
pub struct LogPage {
    pub commits: Vec<RawCommit>,
    pub next_page_token: Option<String>,
}

/// The two narrow capabilities the core needs from a host (§4.A): fetch a
/// file at a ref, and list commits reachable from one committish but not
/// another. A client is bound to exactly one host URL and must be safe for
/// concurrent use — every fan-out point in §5 calls through a shared `Arc`.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// The host URL this client is bound to, as installed in the
    /// [`crate::client_pool::ClientPool`].
    fn host(&self) -> &str;

    /// `GET` the bytes of `path` as it exists at `committish` in `repo`.
    async fn fetch_file(
        &self,
        repo: &str,
        committish: &str,
        path: &str,
    ) -> Result<Vec<u8>, ClientError>;

    /// List one page of commits reachable from `committish` but not from
    /// `exclude_ancestors_of` (when given), newest first.
    async fn log(
        &self,
        repo: &str,
        committish: &str,
        exclude_ancestors_of: Option<&str>,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<LogPage, ClientError>;

    /// List `refs/tags` for `repo` as a `tagRef -> commitID` map. Used by
    /// the Build-Mapper (§4.H-1) to invert tags into a `commitID -> tagRef`
    /// lookup; not one of the two capabilities §4.A names explicitly, but
    /// the same Gitiles-shaped wire convention exposes it, and §4.H has no
    /// other way to discover a manifest commit's build number.
    async fn list_tags(&self, repo: &str) -> Result<HashMap<String, String>, ClientError>;
}
