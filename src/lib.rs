//! Changelog and build-localization core for a manifest-orchestrated
//! multi-repository release pipeline.
//!
//! Two entry points compose the components below: [`run_changelog`] answers
//! "what changed between build S and build T", and [`run_find_build`]
//! answers "which build first contains change X". Both are thin
//! orchestrators — the actual work lives in the component modules, each
//! named after the step of the pipeline it implements.

pub mod build_mapper;
pub mod build_resolver;
pub mod cancel;
pub mod changelog;
pub mod command;
pub mod config;
pub mod error;
pub mod locator;
pub mod window;

use std::collections::HashMap;

use buildcore_client::{paged_log::fetch_full_log, ClientPool, GerritClient};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::{
    changelog::Changelog,
    config::Config,
    error::{Error, Result},
};

/// `refs/heads/` prefixed onto a release name to fetch the manifest
/// repository's commit history on that branch (§4.G).
fn release_ref(release: &str) -> String {
    format!("refs/heads/{release}")
}

#[instrument(skip(config, cancellation), fields(source_build, target_build))]
pub async fn run_changelog(
    config: &Config,
    source_build: &str,
    target_build: &str,
    cancellation: &CancellationToken,
) -> Result<Changelog> {
    let pool = ClientPool::new();
    pool.ensure(&config.git_host).await;

    changelog::compute_changelog(
        &pool,
        &config.git_host,
        &config.manifest_repo,
        source_build,
        target_build,
        cancellation,
    )
    .await
}

/// The result of [`run_find_build`]: the earliest build number containing
/// the located change, and the change metadata it was resolved from.
#[derive(Debug, Clone)]
pub struct FindBuildResult {
    pub build_num: String,
    pub change_number: u64,
}

#[instrument(skip(config, cancellation), fields(identifier))]
pub async fn run_find_build(
    config: &Config,
    identifier: &str,
    cancellation: &CancellationToken,
) -> Result<FindBuildResult> {
    let pool = ClientPool::new();
    let gerrit = GerritClient::new(config.code_review_host.clone());

    let change = locator::locate_change(&gerrit, identifier, &config.repo_prefix, &config.branch_rules).await?;

    let manifest_client = pool.ensure(&config.git_host).await;
    let manifest_history = fetch_full_log(
        manifest_client.as_ref(),
        &config.manifest_repo,
        &release_ref(&change.release),
        None,
    )
    .await
    .map_err(Error::Transport)?;

    let window = window::select_window(&manifest_history, change.submitted_at)?;

    let mapped = build_mapper::map_builds(
        &pool,
        manifest_client.as_ref(),
        &config.manifest_repo,
        window,
        &change,
        cancellation,
    )
    .await?;

    let repo_client = pool.ensure(&mapped.repo_remote_url).await;
    let repo_history = fetch_full_log(
        repo_client.as_ref(),
        &change.repository,
        &mapped.target_sha,
        Some(&mapped.source_sha),
    )
    .await
    .map_err(Error::Transport)?;

    let candidates: HashMap<String, String> = mapped.candidates;
    let build_num = build_resolver::resolve_build(&change.revision, &candidates, &repo_history)?;

    Ok(FindBuildResult {
        build_num,
        change_number: change.change_number,
    })
}
