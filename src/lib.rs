//! duckflix - serve a directory of tagged Matroska movies over HTTP
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod library;
pub mod server;
pub mod streaming;
