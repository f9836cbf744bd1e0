//! Error types for the gateway.
//!
//! [`GatewayError`] is the client-facing taxonomy: every variant maps to
//! exactly one HTTP status through [`GatewayError::status_code`] and carries a
//! message safe to show to callers through [`GatewayError::detail`].
//!
//! [`StoreError`] is produced by [`ObjectStore`](crate::storage::ObjectStore)
//! backends and keeps a well-formed "not found" answer apart from transport
//! or backend failures.
//!
//! # Usage
//!
//! ```
//! use hipsgate_core::error::GatewayError;
//!
//! let err = GatewayError::UnknownSelector {
//!     selector: "nope".to_owned(),
//!     available: vec!["ds1".to_owned(), "ds2".to_owned()],
//! };
//! assert_eq!(err.status_code(), 404);
//! assert!(err.detail().contains("ds1, ds2"));
//! ```

/// Failure reported by an object store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend answered that the object does not exist.
    #[error("object {bucket}:{key} not found")]
    NotFound {
        /// Bucket that was queried.
        bucket: String,
        /// Object key that was queried.
        key: String,
    },

    /// Transport or backend failure, distinct from a "not found" answer.
    #[error("failed to access {bucket}:{key}: {source}")]
    Backend {
        /// Bucket that was queried.
        bucket: String,
        /// Object key that was queried.
        key: String,
        /// Underlying cause.
        #[source]
        source: anyhow::Error,
    },
}

impl StoreError {
    /// Construct a [`StoreError::NotFound`].
    #[must_use]
    pub fn not_found(bucket: &str, key: &str) -> Self {
        Self::NotFound {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
        }
    }

    /// Construct a [`StoreError::Backend`] from any error.
    #[must_use]
    pub fn backend(bucket: &str, key: &str, source: impl Into<anyhow::Error>) -> Self {
        Self::Backend {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            source: source.into(),
        }
    }

    /// Whether this is a well-formed "not found" answer.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Client-facing gateway error.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    // -----------------------------------------------------------------------
    // Input errors
    // -----------------------------------------------------------------------
    /// The request path does not match the accepted path grammar.
    #[error("invalid path: {path}")]
    InvalidPath {
        /// The rejected (decoded) path.
        path: String,
    },

    /// A versioned route was requested without its selector segment.
    #[error("You must specify the bucket key as the first path component after {prefix}")]
    SelectorRequired {
        /// The versioned URL prefix.
        prefix: String,
    },

    /// The selector segment names no configured bucket.
    #[error(
        "Bucket key {selector} not found. Available bucket keys: {}",
        .available.join(", ")
    )]
    UnknownSelector {
        /// The requested selector.
        selector: String,
        /// Every configured selector, sorted.
        available: Vec<String>,
    },

    // -----------------------------------------------------------------------
    // Routing errors
    // -----------------------------------------------------------------------
    /// The HTTP method is not supported on gateway routes.
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    /// The path is outside every configured prefix.
    #[error("Not Found")]
    RouteNotFound,

    // -----------------------------------------------------------------------
    // Lookup errors
    // -----------------------------------------------------------------------
    /// The request was well formed but no object exists at the resolved key.
    #[error("File not found: {key}")]
    FileNotFound {
        /// The resolved object key (logged, never sent to clients).
        key: String,
    },

    /// The object store failed.
    #[error(transparent)]
    Storage(StoreError),
}

impl GatewayError {
    /// HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidPath { .. } => 422,
            Self::SelectorRequired { .. } => 400,
            Self::UnknownSelector { .. } | Self::RouteNotFound | Self::FileNotFound { .. } => 404,
            Self::MethodNotAllowed => 405,
            Self::Storage(StoreError::NotFound { .. }) => 404,
            Self::Storage(StoreError::Backend { .. }) => 500,
        }
    }

    /// Message sent to the client.
    ///
    /// Not-found and storage failures use generic wording so the backend
    /// layout does not leak.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::FileNotFound { .. } | Self::Storage(StoreError::NotFound { .. }) => {
                "File not found".to_owned()
            }
            Self::Storage(StoreError::Backend { .. }) => {
                "Failed to retrieve file from storage".to_owned()
            }
            other => other.to_string(),
        }
    }
}

impl From<StoreError> for GatewayError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { key, .. } => Self::FileNotFound { key },
            backend @ StoreError::Backend { .. } => Self::Storage(backend),
        }
    }
}

/// Startup configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The default bucket key is not among the configured buckets.
    #[error(
        "Default bucket key {key} not found. Available bucket keys: {}",
        .available.join(", ")
    )]
    UnknownDefaultBucket {
        /// The configured default key.
        key: String,
        /// Every configured key, sorted.
        available: Vec<String>,
    },

    /// A URL prefix is malformed.
    #[error("invalid URL prefix {prefix:?}: {reason}")]
    InvalidUrlPrefix {
        /// The offending prefix.
        prefix: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A bucket's object prefix contains an illegal segment.
    #[error("invalid object prefix {prefix:?} for bucket key {key}")]
    InvalidObjectPrefix {
        /// The bucket key whose prefix was rejected.
        key: String,
        /// The offending prefix.
        prefix: String,
    },

    /// A bucket name is empty.
    #[error("bucket key {key} has an empty bucket name")]
    EmptyBucketName {
        /// The bucket key.
        key: String,
    },

    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        /// Path of the file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for [`GatewayConfig`](crate::config::GatewayConfig).
    #[error("failed to parse configuration file {path}: {source}")]
    Parse {
        /// Path of the file.
        path: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}
