//! Common utilities for the Quire layout engine.
//!
//! This crate provides shared infrastructure used by all pipeline stages:
//! - **Diagnostics** - structured warnings and errors with stable identifiers
//! - **URL resolution** - relative reference resolution against a base URI
//! - **Fetching** - loading `file:`, `data:` and `http(s):` resources

pub mod diagnostics;
pub mod fetch;
pub mod url;

pub use diagnostics::{Diagnostic, DiagnosticId, Diagnostics, Severity};
pub use fetch::{DefaultFetcher, FetchError, MapFetcher, ResourceFetcher};
pub use url::resolve_url;
