use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;

use crate::{gitiles::GitilesClient, remote_client::RemoteClient};

/// A mapping from host URL to a lazily constructed [`RemoteClient`] (§4.C).
/// Writes only happen while a request is assembling the hosts it will need
/// (`ensure`); every fan-out task thereafter only reads (`get`), so no lock
/// is held across a remote call. There is no eviction — a pool's lifetime is
/// exactly one top-level request.
#[derive(Default)]
pub struct ClientPool {
    clients: RwLock<HashMap<String, Arc<dyn RemoteClient>>>,
}

impl ClientPool {
    pub fn new() -> Self {
        ClientPool {
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Ensure a client exists for `host`, constructing a Gitiles-shaped
    /// client if one is not already cached. Safe to call repeatedly for the
    /// same host; construction only happens once.
    pub async fn ensure(&self, host: &str) -> Arc<dyn RemoteClient> {
        if let Some(existing) = self.clients.read().await.get(host) {
            return existing.clone();
        }
        let mut clients = self.clients.write().await;
        clients
            .entry(host.to_string())
            .or_insert_with(|| Arc::new(GitilesClient::new(host)) as Arc<dyn RemoteClient>)
            .clone()
    }

    /// Read-only lookup for fan-out tasks, once request setup has called
    /// [`ClientPool::ensure`] for every host the request will touch.
    pub async fn get(&self, host: &str) -> Option<Arc<dyn RemoteClient>> {
        self.clients.read().await.get(host).cloned()
    }

    /// Install an already-constructed client under `host`, overwriting any
    /// existing entry. `ensure` always builds a Gitiles-shaped client, so
    /// this is the seam callers use to install a stub client in tests.
    pub async fn insert(&self, host: &str, client: Arc<dyn RemoteClient>) {
        self.clients.write().await.insert(host.to_string(), client);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ensure_is_idempotent_per_host() {
        let pool = ClientPool::new();
        let a = pool.ensure("cos.googlesource.com").await;
        let b = pool.ensure("cos.googlesource.com").await;
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn get_returns_none_for_unknown_host() {
        let pool = ClientPool::new();
        assert!(pool.get("never-ensured.example").await.is_none());
    }
}
