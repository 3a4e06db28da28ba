//! Shared test harness for integration tests.
//!
//! Provides [`FakeExtractor`], an in-memory stand-in for mkvtoolnix keyed by
//! file name, and [`TestLibrary`], which lays real files out in a temporary
//! media root and builds the [`AppContext`] and router around them.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::Request;
use axum::Router;
use duckflix::config::Config;
use duckflix::library::{Indexer, IndexerOptions, Library};
use duckflix::server::{create_router, AppContext};
use duckflix_av::{Attachment, Extractor};
use duckflix_common::{Error, Result};
use http_body_util::BodyExt;
use parking_lot::RwLock;
use serde_json::Value;
use tempfile::TempDir;

/// What the fake tool reports for one file.
#[derive(Debug, Clone, Default)]
pub struct FakeFile {
    /// Tag XML, or `None` to make the tag read fail.
    pub tags: Option<Vec<u8>>,
    /// (file name, mime type, bytes)
    pub attachments: Vec<(String, String, Vec<u8>)>,
}

impl FakeFile {
    /// A file tagged with `movie/<number>` carrying a `tmdb.json` document.
    pub fn movie(number: u64, details: Value) -> Self {
        Self {
            tags: Some(tmdb_tags(&format!("movie/{number}")).into_bytes()),
            attachments: vec![(
                "tmdb.json".into(),
                "application/json".into(),
                serde_json::to_vec(&details).unwrap(),
            )],
        }
    }

    pub fn with_attachment(mut self, name: &str, mime: &str, bytes: &[u8]) -> Self {
        self.attachments
            .push((name.to_string(), mime.to_string(), bytes.to_vec()));
        self
    }

    pub fn without_attachment(mut self, name: &str) -> Self {
        self.attachments.retain(|(n, _, _)| n != name);
        self
    }
}

/// Matroska tag XML with a file-level TMDB tag.
pub fn tmdb_tags(value: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<!DOCTYPE Tags SYSTEM "matroskatags.dtd">
<Tags>
  <Tag>
    <Targets>
      <TargetTypeValue>50</TargetTypeValue>
    </Targets>
    <Simple>
      <Name>TMDB</Name>
      <String>{value}</String>
    </Simple>
  </Tag>
</Tags>
"#
    )
}

/// [`Extractor`] answering from memory, keyed by file name.
#[derive(Default)]
pub struct FakeExtractor {
    files: RwLock<HashMap<String, FakeFile>>,
    /// Number of `read_attachment` calls, to check caching.
    pub attachment_reads: AtomicUsize,
}

impl FakeExtractor {
    pub fn set(&self, file_name: &str, file: FakeFile) {
        self.files.write().insert(file_name.to_string(), file);
    }

    /// Forget a file so every later tool call on it fails.
    pub fn remove(&self, file_name: &str) {
        self.files.write().remove(file_name);
    }

    fn file(&self, path: &Path) -> Result<FakeFile> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.files
            .read()
            .get(&name)
            .cloned()
            .ok_or_else(|| Error::tool("fake", format!("unknown file {name}")))
    }
}

#[async_trait]
impl Extractor for FakeExtractor {
    async fn read_tags(&self, path: &Path) -> Result<Vec<u8>> {
        self.file(path)?
            .tags
            .ok_or_else(|| Error::tool("mkvextract", "exit status 2"))
    }

    async fn list_attachments(&self, path: &Path) -> Result<Vec<Attachment>> {
        Ok(self
            .file(path)?
            .attachments
            .iter()
            .enumerate()
            .map(|(i, (name, mime, _))| Attachment {
                id: i as u32 + 1,
                mime_type: mime.clone(),
                file_name: name.clone(),
            })
            .collect())
    }

    async fn read_attachment(&self, path: &Path, attachment_id: u32) -> Result<Vec<u8>> {
        self.attachment_reads.fetch_add(1, Ordering::SeqCst);
        let file = self.file(path)?;
        file.attachments
            .get(attachment_id as usize - 1)
            .map(|(_, _, bytes)| bytes.clone())
            .ok_or_else(|| Error::tool("mkvextract", "no such attachment"))
    }
}

/// A temporary media root plus the library and server built over it.
pub struct TestLibrary {
    pub dir: TempDir,
    pub extractor: Arc<FakeExtractor>,
    pub config: Config,
}

impl TestLibrary {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create temp dir"),
            extractor: Arc::new(FakeExtractor::default()),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to `relative` under the media root and register what
    /// the fake tool reports for it.
    pub fn add_file(&self, relative: &str, contents: &[u8], file: FakeFile) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        self.extractor.set(&name, file);
        path
    }

    pub fn indexer(&self) -> Indexer {
        Indexer::new(
            self.extractor.clone(),
            IndexerOptions::from(&self.config.library),
        )
    }

    /// Build the library and run the initial scan.
    pub async fn library(&self) -> Arc<Library> {
        let library = Arc::new(Library::new(self.root(), self.indexer()));
        library.rescan().await.expect("scan failed");
        library
    }

    /// Scan and build the router.
    pub async fn router(&self) -> (Router, Arc<Library>) {
        let library = self.library().await;
        let ctx = AppContext::new(library.clone(), self.config.clone());
        (create_router(ctx), library)
    }
}

/// GET request from a loopback peer.
pub fn get(uri: &str) -> Request<Body> {
    request("GET", uri, None)
}

/// Request with an optional Range header from a loopback peer.
pub fn request(method: &str, uri: &str, range: Option<&str>) -> Request<Body> {
    from_peer(method, uri, range, "127.0.0.1:50000".parse().unwrap())
}

/// Request that appears to come from `peer`.
pub fn from_peer(
    method: &str,
    uri: &str,
    range: Option<&str>,
    peer: SocketAddr,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(range) = range {
        builder = builder.header("Range", range);
    }
    let mut request = builder.body(Body::empty()).unwrap();
    request.extensions_mut().insert(ConnectInfo(peer));
    request
}

/// Collect a response body.
pub async fn body_bytes(body: Body) -> Vec<u8> {
    body.collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(body: Body) -> Value {
    serde_json::from_slice(&body_bytes(body).await).unwrap()
}

/// Deterministic non-repeating-looking file contents.
pub fn content(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
