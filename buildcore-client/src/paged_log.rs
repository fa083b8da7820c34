use tracing::{debug, instrument};

use crate::{commit::Commit, error::ClientError, remote_client::RemoteClient};

const INITIAL_PAGE_SIZE: u32 = 1000;
const PAGE_SIZE_MULTIPLIER: u32 = 5;
const MAX_PAGE_SIZE: u32 = 10_000;

/// Retrieve the full commit list for one repository between two
/// committishes (§4.D): everything reachable from `committish` but not from
/// `exclude_ancestors_of` (when given), newest first.
///
/// Pages grow geometrically — 1000, 5000, 10000, 10000, … — until the server
/// stops returning a continuation token. A single page's transport failure
/// fails the whole fetch; no partial result is returned.
#[instrument(skip(client), fields(host = %client.host(), repo, committish, exclude_ancestors_of))]
pub async fn fetch_full_log(
    client: &dyn RemoteClient,
    repo: &str,
    committish: &str,
    exclude_ancestors_of: Option<&str>,
) -> Result<Vec<Commit>, ClientError> {
    let mut raw_commits = Vec::new();
    let mut page_size = INITIAL_PAGE_SIZE;
    let mut page_token: Option<String> = None;

    loop {
        let page = client
            .log(
                repo,
                committish,
                exclude_ancestors_of,
                page_size,
                page_token.as_deref(),
            )
            .await?;

        debug!(fetched = page.commits.len(), page_size, "fetched log page");
        raw_commits.extend(page.commits);

        match page.next_page_token {
            Some(token) => {
                page_token = Some(token);
                page_size = (page_size * PAGE_SIZE_MULTIPLIER).min(MAX_PAGE_SIZE);
            }
            None => break,
        }
    }

    raw_commits
        .into_iter()
        .map(|raw| Commit::from_raw(raw, client.host()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        commit::{RawCommit, RawIdentity},
        remote_client::LogPage,
    };
    use async_trait::async_trait;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    struct FakeClient {
        host: String,
        pages: Mutex<Vec<(Vec<RawCommit>, Option<String>)>>,
        page_sizes_seen: Mutex<Vec<u32>>,
        call_count: AtomicUsize,
    }

    #[async_trait]
    impl RemoteClient for FakeClient {
        fn host(&self) -> &str {
            &self.host
        }

        async fn fetch_file(&self, _: &str, _: &str, _: &str) -> Result<Vec<u8>, ClientError> {
            unimplemented!()
        }

        async fn log(
            &self,
            _repo: &str,
            _committish: &str,
            _exclude: Option<&str>,
            page_size: u32,
            _page_token: Option<&str>,
        ) -> Result<LogPage, ClientError> {
            self.page_sizes_seen.lock().unwrap().push(page_size);
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
            let mut pages = self.pages.lock().unwrap();
            let (commits, next) = pages.get(idx).cloned().unwrap_or((vec![], None));
            Ok(LogPage {
                commits,
                next_page_token: next,
            })
        }

        async fn list_tags(
            &self,
            _repo: &str,
        ) -> Result<std::collections::HashMap<String, String>, ClientError> {
            unimplemented!()
        }
    }

    fn raw(id: &str) -> RawCommit {
        RawCommit {
            commit: id.to_string(),
            committer: RawIdentity {
                name: "Build Cop".to_string(),
                email: "buildcop@cos.example".to_string(),
                time: "Tue Mar 05 10:00:00 2024 +0000".to_string(),
            },
            message: format!("commit {id}"),
        }
    }

    #[tokio::test]
    async fn concatenates_pages_in_call_order() {
        let client = FakeClient {
            host: "cos.googlesource.com".to_string(),
            pages: Mutex::new(vec![
                (vec![raw("a"), raw("b")], Some("tok1".to_string())),
                (vec![raw("c")], None),
            ]),
            page_sizes_seen: Mutex::new(vec![]),
            call_count: AtomicUsize::new(0),
        };

        let commits = fetch_full_log(&client, "platform/kernel", "HEAD", None)
            .await
            .unwrap();

        assert_eq!(
            commits.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );
    }

    #[tokio::test]
    async fn page_size_grows_geometrically_and_caps_at_10000() {
        let client = FakeClient {
            host: "cos.googlesource.com".to_string(),
            pages: Mutex::new(vec![
                (vec![], Some("t1".to_string())),
                (vec![], Some("t2".to_string())),
                (vec![], Some("t3".to_string())),
                (vec![], None),
            ]),
            page_sizes_seen: Mutex::new(vec![]),
            call_count: AtomicUsize::new(0),
        };

        fetch_full_log(&client, "platform/kernel", "HEAD", None)
            .await
            .unwrap();

        assert_eq!(
            *client.page_sizes_seen.lock().unwrap(),
            vec![1000, 5000, 10_000, 10_000]
        );
    }

    #[tokio::test]
    async fn single_page_failure_discards_partial_results() {
        struct FailingClient;

        #[async_trait]
        impl RemoteClient for FailingClient {
            fn host(&self) -> &str {
                "cos.googlesource.com"
            }
            async fn fetch_file(&self, _: &str, _: &str, _: &str) -> Result<Vec<u8>, ClientError> {
                unimplemented!()
            }
            async fn log(
                &self,
                _: &str,
                _: &str,
                _: Option<&str>,
                _: u32,
                _: Option<&str>,
            ) -> Result<LogPage, ClientError> {
                Err(ClientError::transport("cos.googlesource.com", "boom"))
            }

            async fn list_tags(
                &self,
                _repo: &str,
            ) -> Result<std::collections::HashMap<String, String>, ClientError> {
                unimplemented!()
            }
        }

        let result = fetch_full_log(&FailingClient, "platform/kernel", "HEAD", None).await;
        assert!(result.is_err());
    }
}
