//! Offline Cache Manager
//!
//! Maintains one named, versioned store of static assets and guarantees that
//! after activation exactly one store (the current version) remains. The
//! lifecycle has three phases: install (parallel pre-fetch of the manifest
//! assets), activate (parallel eviction of every other version, then client
//! claim), and steady-state fetch interception (cache-first with an optional
//! write-through variant).
//!
//! The manager is independent of the match engine and shares no state with it.

pub mod fetch;
pub mod store;
pub mod worker;

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub use fetch::{AssetFetcher, FetchRequest, FetchResponse, FileFetcher, ServedFrom};
pub use store::{CacheStore, DirStore, MemoryStore};
pub use worker::{ActivationReport, CacheWorker, ClientControl, InstallReport, NoClients};

/// Version tag baked in at deployment time.
///
/// Plain string equality only: any differing tag, including a downgrade, is
/// treated as a stale version and evicted on activation.
pub const CACHE_VERSION: &str = concat!("cuescore-v", env!("CARGO_PKG_VERSION"));

/// The version tag plus the explicit list of asset paths pre-cached under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheManifest {
    pub version: String,
    pub assets: Vec<String>,
}

impl CacheManifest {
    pub fn new(version: impl Into<String>, assets: Vec<String>) -> Self {
        Self {
            version: version.into(),
            assets,
        }
    }

    /// The deployed application shell: document, stylesheet, script, PWA
    /// manifest, icons, and the drill image gallery.
    pub fn current() -> Self {
        let mut assets: Vec<String> = [
            "index.html",
            "style.css",
            "app.js",
            "manifest.json",
            "favicon.png",
            "icon-192.png",
            "icon-512.png",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        for n in 1..=9 {
            assets.push(format!("drills/drill{}.png", n));
        }
        Self::new(CACHE_VERSION, assets)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse cache manifest JSON")
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest file: {}", path.display()))?;
        Self::from_json_str(&json)
    }
}
