//! Asset fetching and request/response types for fetch interception.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Source of asset bodies: the network during install and on cache misses.
pub trait AssetFetcher: Sync {
    fn fetch(&self, path: &str) -> Result<Vec<u8>>;
}

/// Fetcher backed by a local directory, used when the deployment artifacts
/// sit next to the store (and by the CLI).
#[derive(Debug)]
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }
}

impl AssetFetcher for FileFetcher {
    fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        let file = self.root.join(path.trim_start_matches("./"));
        std::fs::read(&file).with_context(|| format!("Failed to fetch asset: {}", file.display()))
    }
}

/// An intercepted asset request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// HTTP method, uppercase ("GET", "POST", ...).
    pub method: String,
    /// URL scheme ("http", "https", "chrome-extension", ...).
    pub scheme: String,
    /// Asset path used for the exact-match cache lookup.
    pub path: String,
}

impl FetchRequest {
    /// A plain HTTPS GET for `path`.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            scheme: "https".to_string(),
            path: path.into(),
        }
    }

    /// Only GET responses over a network scheme may be written back into the
    /// cache; anything else is non-cacheable.
    pub fn is_cacheable(&self) -> bool {
        self.method == "GET" && matches!(self.scheme.as_str(), "http" | "https")
    }
}

/// Where an intercepted request was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedFrom {
    Cache,
    Network,
}

/// Response to an intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub body: Vec<u8>,
    pub served_from: ServedFrom,
}
