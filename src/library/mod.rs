//! The in-memory media library.
//!
//! A [`Library`] owns the current [`Catalog`] snapshot. Scans build a
//! complete new catalog off to the side and swap it in when done, so request
//! handlers always see either the previous catalog or the new one.

pub mod filter;
pub mod genres;
mod indexer;

pub use filter::MovieFilter;
pub use indexer::{Indexer, IndexerOptions, COVER_ATTACHMENT, TMDB_ATTACHMENT};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use duckflix_av::Extractor;
use duckflix_common::{Error, MovieId, Result};
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// One indexed container file.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub id: MovieId,
    /// Absolute path of the source file.
    pub path: PathBuf,
    /// Parsed `tmdb.json` attachment.
    pub details: serde_json::Value,
    /// `cover.jpg` attachment bytes, when the file has one.
    pub cover: Option<Bytes>,
}

/// Identifier to entry mapping built by one scan.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<MovieId, CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &MovieId) -> Option<&CatalogEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert an entry, replacing any previous entry with the same id.
    ///
    /// Returns the replaced entry.
    pub fn insert(&mut self, entry: CatalogEntry) -> Option<CatalogEntry> {
        self.entries.insert(entry.id.clone(), entry)
    }

    /// Entries ordered by numeric identifier.
    pub fn entries(&self) -> Vec<&CatalogEntry> {
        let mut entries: Vec<&CatalogEntry> = self.entries.values().collect();
        entries.sort_by_key(|e| sort_key(&e.id));
        entries
    }

    /// Identifiers ordered numerically.
    pub fn ids(&self) -> Vec<&MovieId> {
        self.entries().into_iter().map(|e| &e.id).collect()
    }
}

fn sort_key(id: &MovieId) -> (usize, &str) {
    let number = id.number().trim_start_matches('0');
    (number.len(), number)
}

/// The live catalog plus the machinery to rebuild it.
pub struct Library {
    root: PathBuf,
    indexer: Indexer,
    catalog: RwLock<Arc<Catalog>>,
    scan_lock: Arc<Mutex<()>>,
}

impl Library {
    /// Create a library with an empty catalog. Nothing is scanned yet.
    pub fn new(root: impl Into<PathBuf>, indexer: Indexer) -> Self {
        Self {
            root: root.into(),
            indexer,
            catalog: RwLock::new(Arc::new(Catalog::new())),
            scan_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extractor(&self) -> &Arc<dyn Extractor> {
        self.indexer.extractor()
    }

    /// The current catalog. Cheap; holds no lock after returning.
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.catalog.read().clone()
    }

    pub fn is_scanning(&self) -> bool {
        self.scan_lock.try_lock().is_err()
    }

    /// Scan the media root and swap in the result, waiting for any scan
    /// already in progress.
    ///
    /// Returns the number of entries in the new catalog.
    pub async fn rescan(&self) -> Result<usize> {
        let _guard = self.scan_lock.lock().await;
        self.scan_and_swap().await
    }

    /// Start a scan on a background task.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] if a scan is already running.
    pub fn start_rescan(self: &Arc<Self>) -> Result<JoinHandle<Result<usize>>> {
        let guard = self
            .scan_lock
            .clone()
            .try_lock_owned()
            .map_err(|_| Error::Conflict("a library scan is already running".into()))?;

        let library = Arc::clone(self);
        Ok(tokio::spawn(async move {
            let _guard = guard;
            let result = library.scan_and_swap().await;
            if let Err(e) = &result {
                tracing::error!(error = %e, "Library rescan failed");
            }
            result
        }))
    }

    async fn scan_and_swap(&self) -> Result<usize> {
        let catalog = self.indexer.scan(&self.root).await?;
        let count = catalog.len();
        *self.catalog.write() = Arc::new(catalog);
        tracing::info!(root = %self.root.display(), movies = count, "Catalog updated");
        Ok(count)
    }
}
