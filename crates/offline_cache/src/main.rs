//! Offline Cache CLI
//!
//! Manages on-disk cache stores: pre-cache a deployment's assets, prune
//! stale versions, and inspect store usage.

#[cfg(feature = "cli")]
use anyhow::Result;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use offline_cache::{
    CacheManifest, CacheStore, CacheWorker, DirStore, FileFetcher, NoClients,
};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "offline_cache")]
#[command(about = "Manage versioned offline asset caches", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Pre-cache a deployment's assets under its version tag
    Install {
        /// Manifest JSON file (defaults to the built-in app shell manifest)
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Directory holding the deployment artifacts
        #[arg(long)]
        source: PathBuf,

        /// Store root directory
        #[arg(long)]
        store: PathBuf,
    },

    /// Evict every cached version except the manifest's
    Activate {
        /// Manifest JSON file (defaults to the built-in app shell manifest)
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Store root directory
        #[arg(long)]
        store: PathBuf,
    },

    /// List cached versions and total usage
    Status {
        /// Store root directory
        #[arg(long)]
        store: PathBuf,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Install {
            manifest,
            source,
            store,
        } => {
            let manifest = load_manifest(manifest)?;
            println!("🛠️  Pre-caching {} assets", manifest.assets.len());
            println!("   Version: {}", manifest.version);
            println!("   Source:  {}", source.display());
            println!("   Store:   {}", store.display());

            let store = DirStore::new(&store)?;
            let fetcher = FileFetcher::new(&source);
            let mut worker = CacheWorker::new(&store, &fetcher, manifest);
            let report = worker.install();

            println!("\n✅ Cached {} asset(s)", report.cached.len());
            for asset in &report.failed {
                println!("⚠️  Unavailable offline: {}", asset);
            }
        }

        Commands::Activate { manifest, store } => {
            let manifest = load_manifest(manifest)?;
            let store = DirStore::new(&store)?;
            let fetcher = FileFetcher::new(std::path::Path::new("."));
            let worker = CacheWorker::new(&store, &fetcher, manifest);
            let report = worker.activate(&NoClients);

            println!("✅ {} active", report.version);
            for tag in &report.evicted {
                println!("   Evicted: {}", tag);
            }
            for tag in &report.failed {
                println!("⚠️  Could not evict: {}", tag);
            }
            if report.evicted.is_empty() && report.failed.is_empty() {
                println!("   No stale versions found");
            }
        }

        Commands::Status { store } => {
            let store = DirStore::new(&store)?;
            let mut tags = store.list();
            tags.sort();
            println!("Cached versions: {}", if tags.is_empty() { "(none)".to_string() } else { tags.join(", ") });
            println!(
                "Storage: {:.2} MB",
                store.usage_bytes() as f64 / (1024.0 * 1024.0)
            );
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn load_manifest(path: Option<PathBuf>) -> Result<CacheManifest> {
    match path {
        Some(path) => CacheManifest::from_json_file(&path),
        None => Ok(CacheManifest::current()),
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("offline_cache CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
