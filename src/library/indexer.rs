use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use duckflix_av::attachments::find_by_name;
use duckflix_av::{tags, Extractor};
use duckflix_common::paths::{has_extension, DEFAULT_CONTAINER_EXTENSIONS};
use duckflix_common::{Error, Result};
use futures::stream::{self, StreamExt};
use walkdir::WalkDir;

use super::{Catalog, CatalogEntry};
use crate::config::LibraryConfig;

/// Attachment holding the descriptive metadata document.
pub const TMDB_ATTACHMENT: &str = "tmdb.json";

/// Attachment holding the poster image.
pub const COVER_ATTACHMENT: &str = "cover.jpg";

#[derive(Debug, Clone)]
pub struct IndexerOptions {
    pub extensions: Vec<String>,
    pub require_cover: bool,
    pub concurrency: usize,
}

impl Default for IndexerOptions {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_CONTAINER_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            require_cover: false,
            concurrency: 4,
        }
    }
}

impl From<&LibraryConfig> for IndexerOptions {
    fn from(config: &LibraryConfig) -> Self {
        Self {
            extensions: config.extensions.clone(),
            require_cover: config.require_cover,
            concurrency: config.scan_concurrency.max(1),
        }
    }
}

/// Builds catalogs by running the [`Extractor`] over every container file
/// under a directory.
pub struct Indexer {
    extractor: Arc<dyn Extractor>,
    options: IndexerOptions,
}

impl Indexer {
    pub fn new(extractor: Arc<dyn Extractor>, options: IndexerOptions) -> Self {
        Self { extractor, options }
    }

    pub fn extractor(&self) -> &Arc<dyn Extractor> {
        &self.extractor
    }

    /// Scan `root` recursively and build a fresh catalog.
    ///
    /// Individual files that cannot be indexed are logged and left out.
    /// When two files carry the same identifier the later one in walk order
    /// (file name order within each directory) wins.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `root` is not a directory.
    pub async fn scan(&self, root: &Path) -> Result<Catalog> {
        let root = tokio::fs::canonicalize(root)
            .await
            .map_err(|e| Error::Validation(format!("media root {}: {e}", root.display())))?;
        if !root.is_dir() {
            return Err(Error::Validation(format!(
                "media root {} is not a directory",
                root.display()
            )));
        }

        tracing::info!(
            root = %root.display(),
            extensions = ?self.options.extensions,
            "Starting library scan"
        );

        let extensions = self.options.extensions.clone();
        let walk_root = root.clone();
        let files = tokio::task::spawn_blocking(move || discover_files(&walk_root, &extensions))
            .await
            .map_err(|e| Error::Internal(format!("file discovery task failed: {e}")))?;

        let found = files.len();

        // `buffered` yields in input order, which keeps last-write-wins stable.
        let results: Vec<(PathBuf, Result<Option<CatalogEntry>>)> = stream::iter(files)
            .map(|path| async move {
                let result = self.index_file(&path).await;
                (path, result)
            })
            .buffered(self.options.concurrency.max(1))
            .collect()
            .await;

        let mut catalog = Catalog::new();
        let mut skipped = 0usize;
        for (path, result) in results {
            match result {
                Ok(Some(entry)) => {
                    tracing::info!("{} = {}", path.display(), entry.id);
                    if let Some(previous) = catalog.insert(entry) {
                        tracing::warn!(
                            movie_id = %previous.id,
                            replaced = %previous.path.display(),
                            path = %path.display(),
                            "Duplicate identifier, keeping later file"
                        );
                    }
                }
                Ok(None) => skipped += 1,
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(path = %path.display(), error = %e, "Skipping file");
                }
            }
        }

        tracing::info!(
            root = %root.display(),
            found,
            indexed = catalog.len(),
            skipped,
            "Library scan complete"
        );

        Ok(catalog)
    }

    /// Index a single container file.
    ///
    /// Returns `Ok(None)` when the file simply is not part of the library:
    /// the tag read failed or came back empty, or no movie identifier is
    /// tagged. Returns `Err` when the file is tagged but unusable.
    pub async fn index_file(&self, path: &Path) -> Result<Option<CatalogEntry>> {
        let xml = match self.extractor.read_tags(path).await {
            Ok(xml) => xml,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Could not read tags");
                return Ok(None);
            }
        };

        if xml.iter().all(u8::is_ascii_whitespace) {
            tracing::debug!(path = %path.display(), "No tags");
            return Ok(None);
        }

        let Some(id) = tags::find_tmdb_id(&xml)? else {
            tracing::debug!(path = %path.display(), "No TMDB identifier tag");
            return Ok(None);
        };

        let attachments = self.extractor.list_attachments(path).await?;

        let details_attachment = find_by_name(&attachments, TMDB_ATTACHMENT)
            .ok_or_else(|| Error::not_found("attachment", TMDB_ATTACHMENT))?;
        let raw = self
            .extractor
            .read_attachment(path, details_attachment.id)
            .await?;
        let details: serde_json::Value = serde_json::from_slice(&raw)?;

        let cover = match find_by_name(&attachments, COVER_ATTACHMENT) {
            Some(attachment) => match self.extractor.read_attachment(path, attachment.id).await {
                Ok(bytes) => Some(Bytes::from(bytes)),
                Err(e) if self.options.require_cover => return Err(e),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Could not read cover");
                    None
                }
            },
            None if self.options.require_cover => {
                return Err(Error::not_found("attachment", COVER_ATTACHMENT));
            }
            None => None,
        };

        Ok(Some(CatalogEntry {
            id,
            path: path.to_path_buf(),
            details,
            cover,
        }))
    }
}

/// Every file under `root` with one of `extensions`, in walk order.
fn discover_files(root: &Path, extensions: &[String]) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(error = %e, "Error walking media root");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| has_extension(entry.path(), extensions))
        .map(|entry| entry.into_path())
        .collect()
}
