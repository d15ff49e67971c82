//! Daily content service library
//!
//! Exposes the content cache, fetchers, service and HTTP API for use by the
//! binary and integration tests.

pub mod api;
pub mod cache;
pub mod cli;
pub mod content;
pub mod fetch;
pub mod refresh;
pub mod service;
