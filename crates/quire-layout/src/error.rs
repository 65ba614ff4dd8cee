//! Fatal conversion errors.
//!
//! Everything a document can get wrong is reported through diagnostics and
//! degraded; these are the failures that leave nothing to lay out.

use quire_common::FetchError;
use quire_dom::DomError;
use thiserror::Error;

/// Why a conversion could not run.
#[derive(Debug, Error)]
pub enum QuireError {
    /// The styled tree has no document element.
    #[error("document has no root element")]
    NoRootElement,
    /// The font provider is empty, so no text can be measured.
    #[error("font provider has no faces")]
    NoFonts,
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The input document could not be read.
    #[error(transparent)]
    Dom(#[from] DomError),
    /// Reading an input file failed.
    #[error("cannot read '{path}': {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// A configuration file is not valid JSON.
    #[error("malformed configuration: {0}")]
    ConfigJson(#[from] serde_json::Error),
    /// A required resource could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}
