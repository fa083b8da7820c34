use std::time::Duration;

use serde::Deserialize;
use tracing::instrument;

use crate::{error::ClientError, gitiles::DEFAULT_TIMEOUT, xssi::strip_xssi};

/// The subset of a Gerrit `ChangeInfo` the locator needs (§4.F): enough to
/// resolve a user-supplied identifier to a canonical repository, branch,
/// revision, and submission time.
#[derive(Debug, Clone, Deserialize)]
pub struct GerritChangeInfo {
    #[serde(rename = "_number")]
    pub number: u64,
    pub project: String,
    pub branch: String,
    pub current_revision: Option<String>,
    /// Empty/absent until the change is submitted (§4.F).
    pub submitted: Option<String>,
}

/// A client speaking the wire protocol of a code-review, Gerrit-shaped JSON
/// API (§4.A, §6), used only by the Change-Locator (§4.F). Subject to the
/// same XSSI-guard convention as the Gitiles client.
pub struct GerritClient {
    host: String,
    http: reqwest::Client,
    timeout: Duration,
}

impl GerritClient {
    pub fn new(host: impl Into<String>) -> Self {
        Self::with_timeout(host, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(host: impl Into<String>, timeout: Duration) -> Self {
        GerritClient {
            host: host.into(),
            http: reqwest::Client::new(),
            timeout,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Query for changes matching `identifier`, requesting the attribute set
    /// that includes the currently-submitted revision (§4.F). Callers cap
    /// `limit` at 2 so that more than one match can be distinguished from
    /// exactly one without paging.
    #[instrument(skip(self), fields(host = %self.host, identifier, limit))]
    pub async fn query_changes(
        &self,
        identifier: &str,
        limit: u32,
    ) -> Result<Vec<GerritChangeInfo>, ClientError> {
        let url = format!("https://{}/changes/", self.host);
        let limit = limit.to_string();

        let response = self
            .http
            .get(&url)
            .query(&[
                ("q", identifier),
                ("n", limit.as_str()),
                ("o", "CURRENT_REVISION"),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ClientError::transport(&self.host, e))?
            .error_for_status()
            .map_err(|e| ClientError::transport(&self.host, e))?;

        let body = response
            .text()
            .await
            .map_err(|e| ClientError::transport(&self.host, e))?;

        serde_json::from_str(strip_xssi(&body))
            .map_err(|e| ClientError::malformed(&self.host, format!("invalid changes JSON: {e}")))
    }
}
