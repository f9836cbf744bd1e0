//! The file retrieval pipeline.
//!
//! [`FileService`] turns a selector and a URL tail into a response outcome:
//!
//! ```text
//! tail ──> RequestPath (422) ──> BucketTable (404 with keys)
//!      ──> exists (404) ──> metadata (500 on backend failure)
//!      ──> FileHeaders ──> If-None-Match (GET only, 304)
//!      ──> body (buffered or streamed, GET only)
//! ```
//!
//! Validation and resolution complete before the object store is touched.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, error};

use crate::conditional::CacheValidationSet;
use crate::config::GatewayConfig;
use crate::error::{ConfigError, GatewayError};
use crate::location::BucketTable;
use crate::metadata::{FileHeaders, ResolvedFile};
use crate::path::RequestPath;
use crate::storage::{ByteStream, ObjectStore};

/// Object content returned for a `GET`.
pub enum FileContent {
    /// Fully downloaded content.
    Buffered(Bytes),
    /// Content streamed from the store; `size` is the advertised length.
    Streaming {
        /// Chunk stream.
        stream: ByteStream,
        /// Expected total length in bytes.
        size: u64,
    },
}

impl fmt::Debug for FileContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buffered(data) => f.debug_tuple("Buffered").field(&data.len()).finish(),
            Self::Streaming { size, .. } => {
                f.debug_struct("Streaming").field("size", size).finish()
            }
        }
    }
}

/// Result of a successful pass through the pipeline.
#[derive(Debug)]
pub enum FileOutcome {
    /// `200` with content (`GET`).
    Content(ResolvedFile, FileContent),
    /// `200` without content (`HEAD`).
    Metadata(ResolvedFile),
    /// `304`; headers are sent without `Content-Length`.
    NotModified(ResolvedFile),
}

impl FileOutcome {
    /// The resolved file.
    #[must_use]
    pub fn file(&self) -> &ResolvedFile {
        match self {
            Self::Content(file, _) | Self::Metadata(file) | Self::NotModified(file) => file,
        }
    }
}

/// Request-independent state of the pipeline. Immutable after construction.
#[derive(Clone)]
pub struct FileService {
    store: Arc<dyn ObjectStore>,
    table: Arc<BucketTable>,
    cache_control: String,
    max_buffered_size: u64,
}

impl fmt::Debug for FileService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileService")
            .field("store", &self.store)
            .field("table", &self.table)
            .field("cache_control", &self.cache_control)
            .field("max_buffered_size", &self.max_buffered_size)
            .finish()
    }
}

impl FileService {
    /// Build the pipeline from validated parts.
    #[must_use]
    pub fn new(
        store: Arc<dyn ObjectStore>,
        table: BucketTable,
        cache_control: impl Into<String>,
        max_buffered_size: u64,
    ) -> Self {
        Self {
            store,
            table: Arc::new(table),
            cache_control: cache_control.into(),
            max_buffered_size,
        }
    }

    /// Build the pipeline from configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the bucket table is invalid.
    pub fn from_config(
        config: &GatewayConfig,
        store: Arc<dyn ObjectStore>,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(
            store,
            config.bucket_table()?,
            config.cache_control(),
            config.max_buffered_size,
        ))
    }

    /// The selector table.
    #[must_use]
    pub fn table(&self) -> &BucketTable {
        &self.table
    }

    /// Validate, resolve and fetch metadata for `tail` under `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidPath`],
    /// [`GatewayError::UnknownSelector`], [`GatewayError::FileNotFound`] or
    /// [`GatewayError::Storage`], in that order of precedence.
    pub async fn resolve(
        &self,
        selector: Option<&str>,
        tail: &str,
    ) -> Result<ResolvedFile, GatewayError> {
        let path = RequestPath::parse(tail)?;
        let location = self.table.resolve(selector)?;
        let key = location.object_key(&path);
        let bucket = location.bucket();

        let exists = self
            .store
            .exists(bucket, &key)
            .await
            .map_err(|e| log_store_error(bucket, &key, e))?;
        if !exists {
            debug!(bucket, key = %key, "file not found");
            return Err(GatewayError::FileNotFound { key });
        }

        let metadata = self
            .store
            .metadata(bucket, &key)
            .await
            .map_err(|e| log_store_error(bucket, &key, e))?;
        let headers = FileHeaders::build(&metadata, &path, &self.cache_control);

        Ok(ResolvedFile {
            path,
            location: location.clone(),
            key,
            metadata,
            headers,
        })
    }

    /// `HEAD`: metadata only, never `304`.
    ///
    /// # Errors
    ///
    /// See [`FileService::resolve`].
    pub async fn head(
        &self,
        selector: Option<&str>,
        tail: &str,
    ) -> Result<FileOutcome, GatewayError> {
        self.resolve(selector, tail).await.map(FileOutcome::Metadata)
    }

    /// `GET`: content, or `304` if `if_none_match` lists the object's ETag.
    ///
    /// # Errors
    ///
    /// See [`FileService::resolve`]; content retrieval failures are
    /// [`GatewayError::Storage`] or [`GatewayError::FileNotFound`] if the
    /// object vanished in between.
    pub async fn get(
        &self,
        selector: Option<&str>,
        tail: &str,
        if_none_match: Option<&str>,
    ) -> Result<FileOutcome, GatewayError> {
        let file = self.resolve(selector, tail).await?;

        if CacheValidationSet::from_header(if_none_match).is_not_modified(&file.metadata.etag) {
            debug!(key = %file.key, etag = %file.metadata.etag, "not modified");
            return Ok(FileOutcome::NotModified(file));
        }

        let bucket = file.bucket();
        let content = if file.metadata.size > self.max_buffered_size {
            let stream = self
                .store
                .open_stream(bucket, &file.key)
                .await
                .map_err(|e| log_store_error(bucket, &file.key, e))?;
            FileContent::Streaming {
                stream,
                size: file.metadata.size,
            }
        } else {
            let data = self
                .store
                .download(bucket, &file.key)
                .await
                .map_err(|e| log_store_error(bucket, &file.key, e))?;
            FileContent::Buffered(data)
        };

        Ok(FileOutcome::Content(file, content))
    }
}

fn log_store_error(bucket: &str, key: &str, err: crate::error::StoreError) -> GatewayError {
    if !err.is_not_found() {
        error!(bucket, key, error = %err, "object store failure");
    }
    GatewayError::from(err)
}
