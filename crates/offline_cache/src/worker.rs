//! Cache lifecycle: install, activate, fetch interception.

use rayon::prelude::*;

use crate::fetch::{AssetFetcher, FetchRequest, FetchResponse, ServedFrom};
use crate::store::CacheStore;
use crate::CacheManifest;

/// Handle over the client sessions a newly activated version takes control of.
pub trait ClientControl {
    /// Route already-open clients to the new version without a reload.
    fn claim(&self);
}

/// No connected clients (CLI and test usage).
pub struct NoClients;

impl ClientControl for NoClients {
    fn claim(&self) {}
}

/// Outcome of the install phase. Failed assets are degraded, not fatal: they
/// stay unavailable offline until a later network fetch repopulates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub version: String,
    /// Install completion time, RFC3339.
    pub created_at: String,
    pub cached: Vec<String>,
    pub failed: Vec<String>,
}

/// Outcome of the activate phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationReport {
    pub version: String,
    pub evicted: Vec<String>,
    /// Stale tags that survived a failed deletion; the store is degraded
    /// until a later activation evicts them.
    pub failed: Vec<String>,
}

/// Drives the lifecycle of one deployed cache version against a store and a
/// fetcher. Holds no cache data itself; the store is the only shared state.
pub struct CacheWorker<'a, S: CacheStore + ?Sized, F: AssetFetcher + ?Sized> {
    store: &'a S,
    fetcher: &'a F,
    manifest: CacheManifest,
    skip_waiting: bool,
}

impl<'a, S: CacheStore + ?Sized, F: AssetFetcher + ?Sized> CacheWorker<'a, S, F> {
    pub fn new(store: &'a S, fetcher: &'a F, manifest: CacheManifest) -> Self {
        Self {
            store,
            fetcher,
            manifest,
            skip_waiting: false,
        }
    }

    pub fn version(&self) -> &str {
        &self.manifest.version
    }

    /// Whether install has requested immediate takeover of a waiting
    /// predecessor.
    pub fn skip_waiting_requested(&self) -> bool {
        self.skip_waiting
    }

    // ========================
    // Install
    // ========================

    /// Pre-cache every manifest asset under the current version tag.
    ///
    /// Assets are fetched in parallel. A failed fetch or store write is
    /// logged and recorded in the report; it never aborts the phase. On
    /// completion the worker requests to skip any waiting predecessor.
    pub fn install(&mut self) -> InstallReport {
        log::info!(
            "pre-caching {} assets for {}",
            self.manifest.assets.len(),
            self.manifest.version
        );

        let results: Vec<(String, anyhow::Result<()>)> = self
            .manifest
            .assets
            .par_iter()
            .map(|asset| {
                let outcome = self
                    .fetcher
                    .fetch(asset)
                    .and_then(|body| self.store.put(&self.manifest.version, asset, &body));
                (asset.clone(), outcome)
            })
            .collect();

        let mut report = InstallReport {
            version: self.manifest.version.clone(),
            created_at: chrono::Utc::now().to_rfc3339(),
            cached: Vec::new(),
            failed: Vec::new(),
        };
        for (asset, outcome) in results {
            match outcome {
                Ok(()) => report.cached.push(asset),
                Err(err) => {
                    log::error!("asset pre-cache failed for {}: {:#}", asset, err);
                    report.failed.push(asset);
                }
            }
        }

        self.skip_waiting = true;
        report
    }

    // ========================
    // Activate
    // ========================

    /// Evict every cache whose tag differs from the current version, then
    /// claim the connected clients.
    ///
    /// Deletions run in parallel and are each idempotent; all of them
    /// complete before `claim`, so no client is ever handed control while
    /// stale and fresh caches coexist. A stale tag that survives a failed
    /// deletion is reported in `failed` rather than dropped from view.
    pub fn activate<C: ClientControl + ?Sized>(&self, clients: &C) -> ActivationReport {
        let stale: Vec<String> = self
            .store
            .list()
            .into_iter()
            .filter(|tag| tag != &self.manifest.version)
            .collect();

        stale.par_iter().for_each(|tag| {
            self.store.delete(tag);
        });

        let remaining: std::collections::HashSet<String> = self.store.list().into_iter().collect();
        let mut evicted = Vec::new();
        let mut failed = Vec::new();
        for tag in stale {
            if remaining.contains(&tag) {
                log::error!("stale cache {} survived eviction", tag);
                failed.push(tag);
            } else {
                evicted.push(tag);
            }
        }

        clients.claim();
        log::info!(
            "{} activated, {} stale cache(s) cleared",
            self.manifest.version,
            evicted.len()
        );

        ActivationReport {
            version: self.manifest.version.clone(),
            evicted,
            failed,
        }
    }

    // ========================
    // Fetch interception
    // ========================

    /// Cache-first interception: exact-path lookup in the current version's
    /// cache, falling back to the network on a miss.
    pub fn handle_fetch(&self, request: &FetchRequest) -> anyhow::Result<FetchResponse> {
        if let Some(body) = self.store.get(&self.manifest.version, &request.path) {
            return Ok(FetchResponse {
                body,
                served_from: ServedFrom::Cache,
            });
        }
        let body = self.fetcher.fetch(&request.path)?;
        Ok(FetchResponse {
            body,
            served_from: ServedFrom::Network,
        })
    }

    /// Like [`handle_fetch`](Self::handle_fetch), but writes network
    /// responses back into the current cache for future offline use.
    ///
    /// Only GET requests over http/https are written back; a failed write is
    /// logged and the response still served.
    pub fn handle_fetch_caching(&self, request: &FetchRequest) -> anyhow::Result<FetchResponse> {
        let response = self.handle_fetch(request)?;
        if response.served_from == ServedFrom::Network && request.is_cacheable() {
            if let Err(err) = self
                .store
                .put(&self.manifest.version, &request.path, &response.body)
            {
                log::warn!("write-through failed for {}: {:#}", request.path, err);
            }
        }
        Ok(response)
    }

    /// Delete every cache regardless of version (factory reset).
    pub fn purge_all(&self) {
        for tag in self.store.list() {
            self.store.delete(&tag);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct FakeFetcher {
        bodies: HashMap<String, Vec<u8>>,
    }

    impl FakeFetcher {
        fn with_assets(assets: &[(&str, &[u8])]) -> Self {
            Self {
                bodies: assets
                    .iter()
                    .map(|(path, body)| (path.to_string(), body.to_vec()))
                    .collect(),
            }
        }
    }

    impl AssetFetcher for FakeFetcher {
        fn fetch(&self, path: &str) -> anyhow::Result<Vec<u8>> {
            self.bodies
                .get(path)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("unreachable asset: {}", path))
        }
    }

    fn manifest(version: &str, assets: &[&str]) -> CacheManifest {
        CacheManifest::new(version, assets.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_install_populates_store() {
        let store = MemoryStore::new();
        let fetcher = FakeFetcher::with_assets(&[("index.html", b"doc".as_slice()), ("style.css", b"css".as_slice())]);
        let mut worker =
            CacheWorker::new(&store, &fetcher, manifest("v3", &["index.html", "style.css"]));

        assert!(!worker.skip_waiting_requested());
        let report = worker.install();

        assert_eq!(report.cached.len(), 2);
        assert!(report.failed.is_empty());
        assert!(chrono::DateTime::parse_from_rfc3339(&report.created_at).is_ok());
        assert_eq!(store.get("v3", "index.html"), Some(b"doc".to_vec()));
        assert!(worker.skip_waiting_requested());
    }

    #[test]
    fn test_install_failures_are_not_fatal() {
        let store = MemoryStore::new();
        let fetcher = FakeFetcher::with_assets(&[("index.html", b"doc".as_slice())]);
        let mut worker = CacheWorker::new(
            &store,
            &fetcher,
            manifest("v3", &["index.html", "missing.png"]),
        );

        let report = worker.install();
        assert_eq!(report.cached, vec!["index.html"]);
        assert_eq!(report.failed, vec!["missing.png"]);
        // The reachable asset is still cached.
        assert_eq!(store.get("v3", "index.html"), Some(b"doc".to_vec()));
    }

    #[test]
    fn test_activate_evicts_every_other_version() {
        let store = MemoryStore::new();
        store.put("v1", "index.html", b"old").unwrap();
        store.put("v2", "index.html", b"older").unwrap();

        let fetcher = FakeFetcher::with_assets(&[("index.html", b"doc".as_slice())]);
        let mut worker = CacheWorker::new(&store, &fetcher, manifest("v3", &["index.html"]));
        worker.install();
        let report = worker.activate(&NoClients);

        let mut evicted = report.evicted.clone();
        evicted.sort();
        assert_eq!(evicted, vec!["v1", "v2"]);
        assert!(report.failed.is_empty());
        assert_eq!(store.list(), vec!["v3"]);
    }

    /// Delegates to a memory store but refuses to delete one tag.
    struct StubbornStore {
        inner: MemoryStore,
        stuck: &'static str,
    }

    impl CacheStore for StubbornStore {
        fn list(&self) -> Vec<String> {
            self.inner.list()
        }

        fn delete(&self, tag: &str) -> bool {
            if tag == self.stuck {
                false
            } else {
                self.inner.delete(tag)
            }
        }

        fn put(&self, tag: &str, path: &str, body: &[u8]) -> anyhow::Result<()> {
            self.inner.put(tag, path, body)
        }

        fn get(&self, tag: &str, path: &str) -> Option<Vec<u8>> {
            self.inner.get(tag, path)
        }

        fn usage_bytes(&self) -> u64 {
            self.inner.usage_bytes()
        }
    }

    #[test]
    fn test_activate_reports_surviving_stale_caches() {
        let store = StubbornStore {
            inner: MemoryStore::new(),
            stuck: "v1",
        };
        store.put("v1", "index.html", b"old").unwrap();
        store.put("v2", "index.html", b"older").unwrap();

        let fetcher = FakeFetcher::with_assets(&[("index.html", b"doc".as_slice())]);
        let mut worker = CacheWorker::new(&store, &fetcher, manifest("v3", &["index.html"]));
        worker.install();
        let report = worker.activate(&NoClients);

        assert_eq!(report.failed, vec!["v1"]);
        assert_eq!(report.evicted, vec!["v2"]);
        let mut tags = store.list();
        tags.sort();
        assert_eq!(tags, vec!["v1", "v3"], "the surviving tag stays visible");
    }

    #[test]
    fn test_activate_treats_downgrade_as_new_version() {
        let store = MemoryStore::new();
        store.put("v9", "index.html", b"newer").unwrap();

        let fetcher = FakeFetcher::with_assets(&[("index.html", b"doc".as_slice())]);
        let mut worker = CacheWorker::new(&store, &fetcher, manifest("v1", &["index.html"]));
        worker.install();
        worker.activate(&NoClients);

        assert_eq!(store.list(), vec!["v1"]);
    }

    /// Records what the store looked like at claim time.
    struct WatchingClients<'a> {
        store: &'a MemoryStore,
        tags_at_claim: RefCell<Option<Vec<String>>>,
    }

    impl ClientControl for WatchingClients<'_> {
        fn claim(&self) {
            *self.tags_at_claim.borrow_mut() = Some(self.store.list());
        }
    }

    #[test]
    fn test_clients_claimed_only_after_eviction() {
        let store = MemoryStore::new();
        store.put("v1", "index.html", b"old").unwrap();

        let fetcher = FakeFetcher::with_assets(&[("index.html", b"doc".as_slice())]);
        let mut worker = CacheWorker::new(&store, &fetcher, manifest("v2", &["index.html"]));
        worker.install();

        let clients = WatchingClients {
            store: &store,
            tags_at_claim: RefCell::new(None),
        };
        worker.activate(&clients);

        let seen = clients.tags_at_claim.borrow().clone().unwrap();
        assert_eq!(seen, vec!["v2"], "stale caches must be gone before claim");
    }

    #[test]
    fn test_fetch_is_cache_first() {
        let store = MemoryStore::new();
        let fetcher =
            FakeFetcher::with_assets(&[("index.html", b"network".as_slice()), ("app.js", b"network js".as_slice())]);
        let worker = CacheWorker::new(&store, &fetcher, manifest("v1", &["index.html"]));

        store.put("v1", "index.html", b"cached").unwrap();

        let hit = worker.handle_fetch(&FetchRequest::get("index.html")).unwrap();
        assert_eq!(hit.served_from, ServedFrom::Cache);
        assert_eq!(hit.body, b"cached");

        let miss = worker.handle_fetch(&FetchRequest::get("app.js")).unwrap();
        assert_eq!(miss.served_from, ServedFrom::Network);
        assert_eq!(miss.body, b"network js");
        // Plain cache-first does not write back.
        assert_eq!(store.get("v1", "app.js"), None);
    }

    #[test]
    fn test_fetch_miss_surfaces_network_failure() {
        let store = MemoryStore::new();
        let fetcher = FakeFetcher::with_assets(&[]);
        let worker = CacheWorker::new(&store, &fetcher, manifest("v1", &[]));
        assert!(worker.handle_fetch(&FetchRequest::get("gone.png")).is_err());
    }

    #[test]
    fn test_write_through_caches_get_responses_only() {
        let store = MemoryStore::new();
        let fetcher = FakeFetcher::with_assets(&[("app.js", b"js".as_slice()), ("api/submit", b"ok".as_slice())]);
        let worker = CacheWorker::new(&store, &fetcher, manifest("v1", &[]));

        worker
            .handle_fetch_caching(&FetchRequest::get("app.js"))
            .unwrap();
        assert_eq!(store.get("v1", "app.js"), Some(b"js".to_vec()));

        let post = FetchRequest {
            method: "POST".to_string(),
            ..FetchRequest::get("api/submit")
        };
        worker.handle_fetch_caching(&post).unwrap();
        assert_eq!(store.get("v1", "api/submit"), None);
    }

    #[test]
    fn test_purge_all_wipes_every_version() {
        let store = MemoryStore::new();
        store.put("v1", "a", b"1").unwrap();
        store.put("v2", "b", b"2").unwrap();

        let fetcher = FakeFetcher::with_assets(&[]);
        let worker = CacheWorker::new(&store, &fetcher, manifest("v2", &[]));
        worker.purge_all();

        assert!(store.list().is_empty());
        assert_eq!(store.usage_bytes(), 0);
    }
}
