//! duckflix-common: shared types and utilities.
//!
//! - **Errors**: the unified [`Error`] with an HTTP status mapping
//! - **Identifiers**: [`MovieId`], the catalog key embedded in each file
//! - **Path utilities**: container-file detection by extension
//!
//! # Examples
//!
//! ```
//! use duckflix_common::{MovieId, Error};
//! use duckflix_common::paths::has_extension;
//! use std::path::Path;
//!
//! let id = MovieId::from_number(603);
//! assert_eq!(id.as_str(), "movie/603");
//!
//! assert!(has_extension(Path::new("The Matrix.mkv"), &["mkv"]));
//!
//! let err = Error::not_found("movie", &id);
//! assert_eq!(err.http_status(), 404);
//! ```

pub mod error;
pub mod ids;
pub mod paths;

pub use error::{Error, Result};
pub use ids::MovieId;
