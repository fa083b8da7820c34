use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{
    commit::RawCommit,
    error::ClientError,
    remote_client::{LogPage, RemoteClient},
    xssi::strip_xssi,
};

/// Default per-call timeout for `FetchFile`-class calls (§4.A).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A client speaking the wire protocol of a read-only, Gitiles-shaped
/// git-hosting JSON API (§4.A, §6): `FetchFile` is a base64-wrapped `+/`
/// blob fetch, `Log` is a `+log` range query whose JSON body is prefixed
/// with the XSSI guard.
pub struct GitilesClient {
    host: String,
    http: reqwest::Client,
    timeout: Duration,
}

impl GitilesClient {
    pub fn new(host: impl Into<String>) -> Self {
        Self::with_timeout(host, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(host: impl Into<String>, timeout: Duration) -> Self {
        GitilesClient {
            host: host.into(),
            http: reqwest::Client::new(),
            timeout,
        }
    }

    fn base_url(&self) -> String {
        format!("https://{}", self.host)
    }
}

#[derive(Debug, Deserialize)]
struct GitilesLogResponse {
    log: Vec<RawCommit>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RefInfo {
    value: String,
}

#[async_trait]
impl RemoteClient for GitilesClient {
    fn host(&self) -> &str {
        &self.host
    }

    #[instrument(skip(self), fields(host = %self.host, repo, committish, path))]
    async fn fetch_file(
        &self,
        repo: &str,
        committish: &str,
        path: &str,
    ) -> Result<Vec<u8>, ClientError> {
        let url = format!(
            "{}/{repo}/+/{committish}/{path}?format=TEXT",
            self.base_url()
        );

        let response = self
            .http
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ClientError::transport(&self.host, e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound {
                repo: repo.to_string(),
                committish: committish.to_string(),
                path: path.to_string(),
            });
        }

        let response = response
            .error_for_status()
            .map_err(|e| ClientError::transport(&self.host, e))?;
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::transport(&self.host, e))?;

        STANDARD
            .decode(body.trim())
            .map_err(|e| ClientError::malformed(&self.host, format!("invalid base64 body: {e}")))
    }

    #[instrument(skip(self), fields(host = %self.host, repo, committish, page_size, page_token))]
    async fn log(
        &self,
        repo: &str,
        committish: &str,
        exclude_ancestors_of: Option<&str>,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<LogPage, ClientError> {
        let range = match exclude_ancestors_of {
            Some(exclude) => format!("{committish}..{exclude}"),
            None => committish.to_string(),
        };
        let mut url = format!(
            "{}/{repo}/+log/{range}?n={page_size}&format=JSON",
            self.base_url()
        );
        if let Some(token) = page_token {
            url.push_str(&format!("&s={token}"));
        }

        debug!(url, "fetching log page");

        let response = self
            .http
            .get(&url)
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

        let parsed: GitilesLogResponse = serde_json::from_str(strip_xssi(&body))
            .map_err(|e| ClientError::malformed(&self.host, format!("invalid log JSON: {e}")))?;

        Ok(LogPage {
            commits: parsed.log,
            next_page_token: parsed.next,
        })
    }

    #[instrument(skip(self), fields(host = %self.host, repo))]
    async fn list_tags(&self, repo: &str) -> Result<HashMap<String, String>, ClientError> {
        // `+refs` (rather than `+refs/tags`) returns each ref under its full
        // `refs/tags/<buildNum>` path, matching the wire contract of §6.
        let url = format!("{}/{repo}/+refs?format=JSON", self.base_url());

        let response = self
            .http
            .get(&url)
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

        let refs: HashMap<String, RefInfo> = serde_json::from_str(strip_xssi(&body))
            .map_err(|e| ClientError::malformed(&self.host, format!("invalid refs JSON: {e}")))?;

        Ok(refs
            .into_iter()
            .filter(|(ref_name, _)| ref_name.starts_with("refs/tags/"))
            .map(|(tag_ref, info)| (tag_ref, info.value))
            .collect())
    }
}
