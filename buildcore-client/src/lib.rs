//! Remote client abstraction, client pool, and paged log fetcher (§4.A,
//! §4.C, §4.D) for the build-discovery core.
//!
//! This crate knows how to talk to a Gitiles-shaped git-hosting instance and
//! a Gerrit-shaped code-review instance over HTTP; it does not know
//! anything about manifests, changelogs, or build numbers — that lives in
//! the `buildcore` crate, composed on top of these primitives.

pub mod client_pool;
pub mod commit;
pub mod error;
pub mod gerrit;
pub mod gitiles;
pub mod paged_log;
pub mod remote_client;
mod xssi;

pub use client_pool::ClientPool;
pub use commit::Commit;
pub use error::ClientError;
pub use gerrit::{GerritChangeInfo, GerritClient};
pub use gitiles::GitilesClient;
pub use remote_client::{LogPage, RemoteClient};
