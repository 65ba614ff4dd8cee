//! Resource fetching for stylesheets and other document resources.
//!
//! The layout pipeline never touches the network or the filesystem
//! directly. It goes through a [`ResourceFetcher`], so that tests can supply
//! an in-memory [`MapFetcher`] and embedders can add caching or sandboxing.
//!
//! [`DefaultFetcher`] understands `data:` URLs, `file:` URLs and plain paths,
//! and `http(s):` through a blocking reqwest client.
use base64::Engine;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use crate::url::scheme_of;

/// User-Agent header sent with all HTTP requests.
const USER_AGENT: &str = concat!("Quire/", env!("CARGO_PKG_VERSION"));

/// Default request timeout.
const TIMEOUT: Duration = Duration::from_secs(30);

/// Why a resource could not be loaded.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL uses a scheme nobody handles.
    #[error("unsupported URL scheme '{0}'")]
    UnsupportedScheme(String),
    /// A `data:` URL is malformed.
    #[error("invalid data URL: {0}")]
    InvalidDataUrl(String),
    /// Reading a local file failed.
    #[error("cannot read '{path}': {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The HTTP request failed or returned a non-success status.
    #[error("HTTP request for '{url}' failed: {reason}")]
    Http {
        /// Requested URL.
        url: String,
        /// Client error or status line.
        reason: String,
    },
    /// The payload is not valid UTF-8.
    #[error("resource '{0}' is not valid UTF-8")]
    NotUtf8(String),
    /// No resource is registered under this URL.
    #[error("resource '{0}' not found")]
    NotFound(String),
}

/// Loads the text of a resource by absolute URL or path.
pub trait ResourceFetcher {
    /// Fetch `url` and return its body decoded as UTF-8.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] describing why the resource is unavailable.
    fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
}

/// Fetcher backed by the filesystem, `data:` decoding and reqwest.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFetcher;

impl ResourceFetcher for DefaultFetcher {
    fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        match scheme_of(url) {
            Some("data") => {
                let bytes = decode_data_url(url)?;
                String::from_utf8(bytes).map_err(|_| FetchError::NotUtf8(url.to_string()))
            }
            Some("http" | "https") => fetch_http_text(url),
            Some("file") => {
                let path = url.trim_start_matches("file://");
                read_file(path)
            }
            None => read_file(url),
            Some(other) => Err(FetchError::UnsupportedScheme(other.to_string())),
        }
    }
}

fn read_file(path: &str) -> Result<String, FetchError> {
    std::fs::read_to_string(path).map_err(|source| FetchError::Io {
        path: path.to_string(),
        source,
    })
}

fn fetch_http_text(url: &str) -> Result<String, FetchError> {
    let http_err = |reason: String| FetchError::Http {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(TIMEOUT)
        .build()
        .map_err(|e| http_err(format!("cannot create client: {e}")))?;

    let response = client
        .get(url)
        .header("User-Agent", USER_AGENT)
        .send()
        .map_err(|e| http_err(e.to_string()))?;

    if !response.status().is_success() {
        return Err(http_err(response.status().to_string()));
    }

    response.text().map_err(|e| http_err(e.to_string()))
}

/// Decode the payload of a `data:` URL.
///
/// [RFC 2397](https://www.rfc-editor.org/rfc/rfc2397)
///
/// Both `;base64` payloads and percent-encoded payloads are supported.
///
/// # Errors
///
/// Returns [`FetchError::InvalidDataUrl`] if the URL has no comma separator
/// or the payload cannot be decoded.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, FetchError> {
    let body = url.trim_start_matches("data:");
    let Some((metadata, data)) = body.split_once(',') else {
        return Err(FetchError::InvalidDataUrl("missing comma".to_string()));
    };

    if metadata.ends_with(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(data.trim())
            .map_err(|e| FetchError::InvalidDataUrl(format!("base64: {e}")))
    } else {
        percent_decode(data)
    }
}

fn percent_decode(data: &str) -> Result<Vec<u8>, FetchError> {
    let bytes = data.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = data
                .get(i + 1..i + 3)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| {
                    FetchError::InvalidDataUrl(format!("bad percent escape at byte {i}"))
                })?;
            out.push(hex);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}

/// In-memory fetcher keyed by exact URL.
#[derive(Debug, Clone, Default)]
pub struct MapFetcher {
    resources: HashMap<String, String>,
}

impl MapFetcher {
    /// Create an empty fetcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `body` under `url`, builder style.
    #[must_use]
    pub fn with(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        let _ = self.resources.insert(url.into(), body.into());
        self
    }
}

impl ResourceFetcher for MapFetcher {
    fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        if scheme_of(url) == Some("data") {
            return DefaultFetcher.fetch_text(url);
        }
        self.resources
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(url.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_base64() {
        // "p{}" in base64
        let text = DefaultFetcher.fetch_text("data:text/css;base64,cHt9");
        assert_eq!(text.ok().as_deref(), Some("p{}"));
    }

    #[test]
    fn data_url_percent_encoded() {
        let text = DefaultFetcher.fetch_text("data:text/css,p%20%7B%7D");
        assert_eq!(text.ok().as_deref(), Some("p {}"));
    }

    #[test]
    fn data_url_errors_are_reported_not_panicked() {
        assert!(matches!(
            decode_data_url("data:text/css"),
            Err(FetchError::InvalidDataUrl(_))
        ));
        assert!(matches!(
            decode_data_url("data:,%zz"),
            Err(FetchError::InvalidDataUrl(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = DefaultFetcher.fetch_text("/definitely/not/here.css");
        assert!(matches!(err, Err(FetchError::Io { .. })));
    }

    #[test]
    fn unsupported_scheme() {
        let err = DefaultFetcher.fetch_text("ftp://example.com/a.css");
        assert!(matches!(err, Err(FetchError::UnsupportedScheme(s)) if s == "ftp"));
    }

    #[test]
    fn map_fetcher_lookup() {
        let fetcher = MapFetcher::new().with("mem:/a.css", "a{}");
        assert_eq!(fetcher.fetch_text("mem:/a.css").ok().as_deref(), Some("a{}"));
        assert!(matches!(
            fetcher.fetch_text("mem:/b.css"),
            Err(FetchError::NotFound(_))
        ));
    }
}
