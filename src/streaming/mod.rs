//! Byte delivery with HTTP range support.
//!
//! [`ContentServer`] is the single place range semantics live; every route
//! that returns bytes (the movie download, attachments) goes through it.

mod direct;
mod range;

pub use direct::{pump, ContentServer, ContentSource, StreamOutcome, CHUNK_SIZE};
pub use range::{RangeError, RangeRequest};
