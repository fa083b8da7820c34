//! Changelog Engine (§4.E): the per-repository added/removed revisions
//! between two build manifests.

use std::collections::HashMap;

use buildcore_client::{paged_log::fetch_full_log, ClientPool, Commit, RemoteClient};
use buildcore_manifest::{Manifest, RepoPin};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::{
    cancel::run_cancellable,
    error::{Error, Result},
};

const MANIFEST_FILE_PATH: &str = "default.xml";

/// Both directions of a changelog between two builds (§4.E): `additions` is
/// what `target` has that `source` doesn't, `removals` is the reverse.
#[derive(Debug, Clone, Default)]
pub struct Changelog {
    pub additions: HashMap<String, Vec<Commit>>,
    pub removals: HashMap<String, Vec<Commit>>,
}

#[instrument(skip(pool), fields(manifest_host, manifest_repo, source_build, target_build))]
pub async fn compute_changelog(
    pool: &ClientPool,
    manifest_host: &str,
    manifest_repo: &str,
    source_build: &str,
    target_build: &str,
    cancellation: &CancellationToken,
) -> Result<Changelog> {
    let manifest_client = pool.ensure(manifest_host).await;

    let source_pins = fetch_pins(manifest_client.as_ref(), manifest_repo, source_build).await?;
    let target_pins = fetch_pins(manifest_client.as_ref(), manifest_repo, target_build).await?;

    for pin in source_pins.values().chain(target_pins.values()) {
        pool.ensure(&pin.instance_url).await;
    }

    let (additions, removals) = tokio::try_join!(
        diff_direction(pool, &target_pins, &source_pins, cancellation),
        diff_direction(pool, &source_pins, &target_pins, cancellation),
    )?;

    Ok(Changelog {
        additions,
        removals,
    })
}

async fn fetch_pins(
    manifest_client: &dyn RemoteClient,
    manifest_repo: &str,
    build_num: &str,
) -> Result<HashMap<String, RepoPin>> {
    let tag = format!("refs/tags/{build_num}");
    let bytes = manifest_client
        .fetch_file(manifest_repo, &tag, MANIFEST_FILE_PATH)
        .await
        .map_err(Error::Transport)?;
    let text = String::from_utf8(bytes).map_err(|e| {
        Error::MalformedManifestContent(format!("manifest at {tag} is not UTF-8: {e}"))
    })?;
    let manifest: Manifest = quick_xml::de::from_str(&text)
        .map_err(|e| Error::MalformedManifestContent(format!("manifest at {tag}: {e}")))?;
    manifest.build_repo_pins().map_err(Error::MalformedManifest)
}

/// One direction of §4.E step 4: for each repo `R` in `to_pins`, the log of
/// `to_pins[R].committish` excluding ancestors of `from_pins[R].committish`
/// when `R` is also present in `from_pins`.
async fn diff_direction(
    pool: &ClientPool,
    to_pins: &HashMap<String, RepoPin>,
    from_pins: &HashMap<String, RepoPin>,
    cancellation: &CancellationToken,
) -> Result<HashMap<String, Vec<Commit>>> {
    let (tx, mut rx) = mpsc::channel(to_pins.len().max(1));

    for (repo_name, to_pin) in to_pins {
        let tx = tx.clone();
        let repo_name = repo_name.clone();
        let committish = to_pin.committish.clone();
        let exclude = from_pins.get(&repo_name).map(|p| p.committish.clone());
        let client = pool
            .get(&to_pin.instance_url)
            .await
            .ok_or_else(|| Error::Config(format!("no pooled client for {}", to_pin.instance_url)))?;
        let cancellation = cancellation.clone();

        tokio::spawn(async move {
            let outcome = run_cancellable(
                &cancellation,
                fetch_one(client.as_ref(), &repo_name, &committish, exclude.as_deref()),
            )
            .await;
            let _ = tx.send((repo_name, outcome)).await;
        });
    }
    drop(tx);

    let mut result = HashMap::new();
    while let Some((repo_name, outcome)) = rx.recv().await {
        let commits = outcome?;
        if !commits.is_empty() {
            result.insert(repo_name, commits);
        }
    }
    Ok(result)
}

async fn fetch_one(
    client: &dyn RemoteClient,
    repo_name: &str,
    committish: &str,
    exclude_ancestors_of: Option<&str>,
) -> Result<Vec<Commit>> {
    fetch_full_log(client, repo_name, committish, exclude_ancestors_of)
        .await
        .map_err(Error::Transport)
}
