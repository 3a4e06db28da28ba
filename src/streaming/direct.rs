//! Range-aware content delivery.
//!
//! Content is streamed through a bounded channel: a spawned task reads fixed
//! size chunks and pushes them into the response body, racing every send
//! against the client going away. The task owns the reader, so the file
//! handle is released on whichever path the task leaves by.

use std::io::{self, Cursor, SeekFrom};
use std::path::PathBuf;

use axum::{
    body::Body,
    http::{header, Method, StatusCode},
    response::Response,
};
use bytes::Bytes;
use duckflix_common::{Error, Result};
use serde_json::json;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use super::range::{RangeError, RangeRequest};

/// Size of each streamed chunk. Only the final chunk may be shorter.
pub const CHUNK_SIZE: usize = 4096;

/// Where response bytes come from.
#[derive(Debug, Clone)]
pub enum ContentSource {
    /// A file on disk, opened per request.
    File(PathBuf),
    /// Bytes already in memory (cached attachments, JSON documents).
    Bytes(Bytes),
}

impl From<Bytes> for ContentSource {
    fn from(bytes: Bytes) -> Self {
        ContentSource::Bytes(bytes)
    }
}

impl From<Vec<u8>> for ContentSource {
    fn from(bytes: Vec<u8>) -> Self {
        ContentSource::Bytes(Bytes::from(bytes))
    }
}

/// How a streaming task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// All content was handed to the client.
    Completed { bytes: u64 },
    /// The client went away first.
    Disconnected { bytes: u64 },
    /// Reading the source failed part way through.
    Failed { bytes: u64 },
}

/// Serves [`ContentSource`]s with HTTP range semantics.
#[derive(Debug, Clone, Copy)]
pub struct ContentServer {
    chunk_size: usize,
}

impl Default for ContentServer {
    fn default() -> Self {
        Self::new(CHUNK_SIZE)
    }
}

impl ContentServer {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    /// Build the response for `source`.
    ///
    /// Without a range the whole content is sent with 200. A valid
    /// `bytes=<start>-` range is sent with 206 from `start` to the end. Any
    /// other range is answered with 416 and a JSON body naming the problem.
    /// HEAD gets the same status and headers with an empty body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if a file source no longer exists and
    /// [`Error::Io`] for other I/O failures before streaming starts.
    pub async fn serve(
        &self,
        source: ContentSource,
        range: Option<&str>,
        media_type: &str,
        method: &Method,
    ) -> Result<Response> {
        match source {
            ContentSource::File(path) => {
                let file = File::open(&path).await.map_err(|e| match e.kind() {
                    io::ErrorKind::NotFound => Error::not_found("file", path.display()),
                    _ => Error::from(e),
                })?;
                self.respond(file, range, media_type, method).await
            }
            ContentSource::Bytes(bytes) => {
                self.respond(Cursor::new(bytes), range, media_type, method)
                    .await
            }
        }
    }

    async fn respond<R>(
        &self,
        mut reader: R,
        range: Option<&str>,
        media_type: &str,
        method: &Method,
    ) -> Result<Response>
    where
        R: AsyncRead + AsyncSeek + Unpin + Send + 'static,
    {
        let total = reader.seek(SeekFrom::End(0)).await?;

        let range = match range.map(|h| RangeRequest::parse(h).and_then(|r| r.validate(total))) {
            None => None,
            Some(Ok(range)) => Some(range),
            Some(Err(e)) => {
                tracing::debug!(reason = e.reason(), "Unsatisfiable range");
                return unsatisfiable(e, total);
            }
        };

        let start = range.map(|r| r.start).unwrap_or(0);
        let length = total - start;

        let mut builder = Response::builder()
            .header(header::CONTENT_TYPE, media_type)
            .header(header::CONTENT_LENGTH, length.to_string())
            .header(header::ACCEPT_RANGES, "bytes");
        builder = match range {
            Some(range) => builder
                .status(StatusCode::PARTIAL_CONTENT)
                .header(header::CONTENT_RANGE, range.content_range(total)),
            None => builder.status(StatusCode::OK),
        };

        if method == Method::HEAD {
            return build(builder, Body::empty());
        }

        reader.seek(SeekFrom::Start(start)).await?;

        // Capacity 1: at most one chunk waits beyond the one being written.
        let (tx, rx) = mpsc::channel(1);
        let chunk_size = self.chunk_size;
        tokio::spawn(async move {
            match pump(reader.take(length), tx, chunk_size).await {
                StreamOutcome::Completed { bytes } => {
                    tracing::trace!(bytes, "Stream complete");
                }
                StreamOutcome::Disconnected { bytes } => {
                    tracing::debug!(bytes, "Client disconnected mid-stream");
                }
                StreamOutcome::Failed { bytes } => {
                    tracing::warn!(bytes, "Stream aborted by read error");
                }
            }
        });

        build(builder, Body::from_stream(ReceiverStream::new(rx)))
    }
}

fn build(builder: axum::http::response::Builder, body: Body) -> Result<Response> {
    builder
        .body(body)
        .map_err(|e| Error::Internal(format!("failed to build response: {e}")))
}

fn unsatisfiable(error: RangeError, total: u64) -> Result<Response> {
    let body = json!({
        "error": error.reason(),
        "code": error.code(),
    });
    build(
        Response::builder()
            .status(StatusCode::RANGE_NOT_SATISFIABLE)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_RANGE, format!("bytes */{total}")),
        Body::from(body.to_string()),
    )
}

/// Copy `reader` into `sink` in `chunk_size` chunks.
///
/// Stops without error as soon as the receiving side is dropped. A chunk
/// shorter than `chunk_size` is always the last one.
pub async fn pump<R>(
    mut reader: R,
    sink: mpsc::Sender<io::Result<Bytes>>,
    chunk_size: usize,
) -> StreamOutcome
where
    R: AsyncRead + Unpin,
{
    let mut sent = 0u64;
    let mut buf = vec![0u8; chunk_size.max(1)];

    loop {
        let read = tokio::select! {
            biased;
            _ = sink.closed() => return StreamOutcome::Disconnected { bytes: sent },
            read = read_chunk(&mut reader, &mut buf) => read,
        };

        let n = match read {
            Ok(0) => return StreamOutcome::Completed { bytes: sent },
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(error = %e, "Read failed while streaming");
                let _ = sink.send(Err(e)).await;
                return StreamOutcome::Failed { bytes: sent };
            }
        };

        let chunk = Bytes::copy_from_slice(&buf[..n]);
        let delivered = tokio::select! {
            biased;
            _ = sink.closed() => false,
            result = sink.send(Ok(chunk)) => result.is_ok(),
        };
        if !delivered {
            return StreamOutcome::Disconnected { bytes: sent };
        }
        sent += n as u64;

        if n < buf.len() {
            return StreamOutcome::Completed { bytes: sent };
        }
    }
}

/// Fill `buf` unless the reader runs dry first.
async fn read_chunk<R>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]).await? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}
