//! Build-Mapper (§4.H): for each manifest commit in the window, extract the
//! revision pinned for the change's repository, and derive the source/
//! target SHA of that repository's range.

use std::collections::HashMap;

use buildcore_client::{ClientPool, Commit, RemoteClient};
use buildcore_manifest::Manifest;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{instrument, warn};

use crate::{
    cancel::run_cancellable,
    error::{Error, Result},
    locator::Change,
};

/// The literal length of the `refs/tags/` prefix (§6): a wire contract, not
/// an implementation detail.
const TAG_PREFIX_LEN: usize = "refs/tags/".len();

const MANIFEST_FILE_PATH: &str = "default.xml";

/// The output of Build-Mapper (§4.H): a `repoSHA -> buildNum` candidate map,
/// plus the target and source SHAs bounding the change's repository range.
#[derive(Debug, Clone)]
pub struct BuildMapperResult {
    pub candidates: HashMap<String, String>,
    pub target_sha: String,
    pub source_sha: String,
    /// The change repository's remote URL, as pinned consistently across
    /// every windowed manifest that matched — the host Build-Resolver (§4.I)
    /// must fetch the repository's own commit log from.
    pub repo_remote_url: String,
}

struct WindowedExtract {
    position: usize,
    build_num: String,
    matched: Option<(String, String)>,
}

#[instrument(skip(pool, manifest_client, window, change, cancellation), fields(manifest_repo, window_len = window.len()))]
pub async fn map_builds(
    pool: &ClientPool,
    manifest_client: &dyn RemoteClient,
    manifest_repo: &str,
    window: &[Commit],
    change: &Change,
    cancellation: &CancellationToken,
) -> Result<BuildMapperResult> {
    let tags = manifest_client
        .list_tags(manifest_repo)
        .await
        .map_err(Error::Transport)?;

    let mut commit_to_tag: HashMap<&str, &str> = HashMap::with_capacity(tags.len());
    for (tag_ref, commit_id) in &tags {
        commit_to_tag.insert(commit_id.as_str(), tag_ref.as_str());
    }

    // §4.H-1: every windowed commit must be tagged, and the tag must be
    // well-formed, before we spend any concurrency fetching manifests.
    let mut build_nums = Vec::with_capacity(window.len());
    for commit in window {
        let tag_ref = commit_to_tag
            .get(commit.id.as_str())
            .ok_or_else(|| Error::UnmappedManifest(commit.id.clone()))?;
        if tag_ref.len() <= TAG_PREFIX_LEN {
            return Err(Error::MalformedTag((*tag_ref).to_string()));
        }
        build_nums.push(tag_ref[TAG_PREFIX_LEN..].to_string());
    }

    let host = manifest_client.host().to_string();
    let (tx, mut rx) = mpsc::channel(window.len().max(1));
    for (position, (commit, build_num)) in window.iter().zip(build_nums.into_iter()).enumerate() {
        let tx = tx.clone();
        let client = pool
            .get(&host)
            .await
            .ok_or_else(|| Error::Config(format!("no pooled client for {host}")))?;
        let manifest_repo = manifest_repo.to_string();
        let commit_id = commit.id.clone();
        let repo_name = change.repository.clone();
        let branch = change.branch.clone();
        let cancellation = cancellation.clone();

        tokio::spawn(async move {
            let outcome = run_cancellable(
                &cancellation,
                extract_one(client.as_ref(), &manifest_repo, &commit_id, &repo_name, &branch),
            )
            .await;
            let _ = tx
                .send(outcome.map(|matched| WindowedExtract {
                    position,
                    build_num,
                    matched,
                }))
                .await;
        });
    }
    drop(tx);

    let mut extracts = Vec::with_capacity(window.len());
    while let Some(result) = rx.recv().await {
        extracts.push(result?);
    }
    extracts.sort_by_key(|e| e.position);

    // §4.H-5: the remote URL for the change's repository must not change
    // across the window.
    let mut remote_url: Option<&str> = None;
    for extract in &extracts {
        if let Some((_, url)) = &extract.matched {
            match remote_url {
                None => remote_url = Some(url.as_str()),
                Some(existing) if existing != url => {
                    return Err(Error::InconsistentRemote(change.repository.clone()))
                }
                _ => {}
            }
        }
    }

    // (position, sha, buildNum), ordered by position ascending (0 = newest).
    let matched: Vec<(usize, &str, &str)> = extracts
        .iter()
        .filter_map(|e| {
            e.matched
                .as_ref()
                .map(|(sha, _)| (e.position, sha.as_str(), e.build_num.as_str()))
        })
        .collect();
    let (Some(first), Some(last), Some(repo_remote_url)) = (matched.first(), matched.last(), remote_url)
    else {
        return Err(Error::NoBranchMatch {
            repo: change.repository.clone(),
            branch: change.branch.clone(),
        });
    };

    // §4.H-6: retain the lowest window-position build per SHA — position 0
    // is the newest windowed manifest, so "lowest position" is "earliest
    // build that pinned this SHA" only in the sense that ties break toward
    // the build closest to the change's submission time (see DESIGN.md).
    let mut candidates: HashMap<String, String> = HashMap::new();
    let mut candidate_positions: HashMap<String, usize> = HashMap::new();
    for &(position, sha, build_num) in &matched {
        let keep = match candidate_positions.get(sha) {
            Some(&existing) => position < existing,
            None => true,
        };
        if keep {
            candidates.insert(sha.to_string(), build_num.to_string());
            candidate_positions.insert(sha.to_string(), position);
        }
    }

    // position 0 is newest; the window is newest-first, so the first
    // matched entry is the target (newest) and the last is the source
    // (oldest).
    let target_sha = first.1.to_string();
    let source_sha = last.1.to_string();

    Ok(BuildMapperResult {
        candidates,
        target_sha,
        source_sha,
        repo_remote_url: repo_remote_url.to_string(),
    })
}

/// Extracts the change's repository pin from a single windowed manifest.
///
/// §7: per-manifest failures here (a failed fetch, non-UTF-8 or unparseable
/// XML, an unresolvable remote table) are downgraded to a logged warning and
/// treated the same as "no matching project" — this manifest simply
/// contributes nothing to `Candidates`. Only the cross-manifest invariant
/// checked by the caller (§4.H-5, `InconsistentRemote`) is fatal; this
/// function itself never returns `Err` for manifest content, only for
/// cancellation observed by [`run_cancellable`] around its caller.
async fn extract_one(
    manifest_client: &dyn RemoteClient,
    manifest_repo: &str,
    commit_id: &str,
    repo_name: &str,
    branch: &str,
) -> Result<Option<(String, String)>> {
    let bytes = match manifest_client
        .fetch_file(manifest_repo, commit_id, MANIFEST_FILE_PATH)
        .await
    {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(commit_id, error = %e, "manifest fetch failed; skipping");
            return Ok(None);
        }
    };
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!(commit_id, error = %e, "manifest is not UTF-8; skipping");
            return Ok(None);
        }
    };
    let manifest: Manifest = match quick_xml::de::from_str(&text) {
        Ok(manifest) => manifest,
        Err(e) => {
            warn!(commit_id, error = %e, "manifest failed to parse; skipping");
            return Ok(None);
        }
    };

    let Some(project) = manifest.find_project(repo_name, branch) else {
        warn!(commit_id, repo_name, branch, "manifest has no matching project; skipping");
        return Ok(None);
    };

    let remotes = match manifest.resolve_remotes() {
        Ok(remotes) => remotes,
        Err(e) => {
            warn!(commit_id, error = %e, "manifest remotes failed to resolve; skipping");
            return Ok(None);
        }
    };
    let remote_name = project.remote.as_deref().unwrap_or("");
    let (Some(sha), Some(url)) = (
        project.revision.as_ref(),
        remotes.get(remote_name).cloned(),
    ) else {
        warn!(commit_id, repo_name, "manifest project has empty revision or remote; skipping");
        return Ok(None);
    };
    if sha.is_empty() || url.is_empty() {
        warn!(commit_id, repo_name, "manifest project has empty revision or remote; skipping");
        return Ok(None);
    }

    Ok(Some((sha.clone(), url)))
}
