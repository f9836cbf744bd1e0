//! Object metadata and the caching headers derived from it.
//!
//! [`FileHeaders::build`] is pure: it turns already-fetched
//! [`ObjectMetadata`] and a [`RequestPath`] into the header set sent with
//! every file response.

use chrono::{DateTime, Utc};

use crate::location::BucketLocation;
use crate::media::media_type;
use crate::path::RequestPath;

/// Metadata of a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMetadata {
    /// Size in bytes.
    pub size: u64,
    /// Last modification time.
    pub last_modified: DateTime<Utc>,
    /// Content fingerprint, without quotes.
    pub etag: String,
}

/// Format a timestamp as an HTTP date (`Sun, 06 Nov 1994 08:49:37 GMT`).
#[must_use]
pub fn http_date(ts: &DateTime<Utc>) -> String {
    ts.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Strip one pair of surrounding double quotes and a weak prefix, if present.
///
/// # Examples
///
/// ```
/// use hipsgate_core::metadata::normalize_etag;
///
/// assert_eq!(normalize_etag("\"abc\""), "abc");
/// assert_eq!(normalize_etag("W/\"abc\""), "abc");
/// assert_eq!(normalize_etag("abc"), "abc");
/// ```
#[must_use]
pub fn normalize_etag(etag: &str) -> &str {
    let etag = etag.strip_prefix("W/").unwrap_or(etag);
    etag.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(etag)
}

/// Header set of a file response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeaders {
    /// `Cache-Control`.
    pub cache_control: String,
    /// `Content-Length`; omitted from `304` responses.
    pub content_length: u64,
    /// `Last-Modified`, as an HTTP date.
    pub last_modified: String,
    /// `Etag`, quoted.
    pub etag: String,
    /// `Content-Type`.
    pub content_type: String,
}

impl FileHeaders {
    /// Derive headers for `path` from its metadata.
    #[must_use]
    pub fn build(metadata: &ObjectMetadata, path: &RequestPath, cache_control: &str) -> Self {
        Self {
            cache_control: cache_control.to_owned(),
            content_length: metadata.size,
            last_modified: http_date(&metadata.last_modified),
            etag: format!("\"{}\"", metadata.etag),
            content_type: media_type(path),
        }
    }

    /// Header pairs in response order. `Content-Length` is left out when
    /// `with_length` is false.
    #[must_use]
    pub fn pairs(&self, with_length: bool) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("cache-control", self.cache_control.clone()),
            ("last-modified", self.last_modified.clone()),
            ("etag", self.etag.clone()),
            ("content-type", self.content_type.clone()),
        ];
        if with_length {
            pairs.push(("content-length", self.content_length.to_string()));
        }
        pairs
    }
}

/// A request path resolved to a stored object.
#[derive(Debug, Clone)]
pub struct ResolvedFile {
    /// The validated request path.
    pub path: RequestPath,
    /// Where the object lives.
    pub location: BucketLocation,
    /// Full object key (prefix joined with path).
    pub key: String,
    /// Fetched metadata.
    pub metadata: ObjectMetadata,
    /// Derived response headers.
    pub headers: FileHeaders,
}

impl ResolvedFile {
    /// The bucket holding the object.
    #[must_use]
    pub fn bucket(&self) -> &str {
        self.location.bucket()
    }
}
