//! Local directory object store.
//!
//! Bucket `b` maps to the directory `<root>/b` and object key `k` to the file
//! `<root>/b/k`. The ETag is derived from the modification time and size, the
//! same generation-style fingerprint many object stores use, so it changes
//! whenever the file is rewritten.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bytes::{Bytes, BytesMut};
use chrono::{DateTime, Utc};
use tokio::io::AsyncReadExt;
use tracing::trace;

use super::{ByteStream, ObjectStore};
use crate::error::StoreError;
use crate::metadata::ObjectMetadata;

/// Read buffer size used when streaming.
const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// Object store backed by a local directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Serve buckets from subdirectories of `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, bucket: &str, key: &str) -> PathBuf {
        let mut path = self.root.join(bucket);
        path.extend(key.split('/'));
        path
    }

    fn map_io(bucket: &str, key: &str, err: std::io::Error) -> StoreError {
        if err.kind() == ErrorKind::NotFound {
            StoreError::not_found(bucket, key)
        } else {
            StoreError::backend(bucket, key, err)
        }
    }
}

#[async_trait::async_trait]
impl ObjectStore for FsStore {
    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, StoreError> {
        match tokio::fs::metadata(self.object_path(bucket, key)).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::backend(bucket, key, e)),
        }
    }

    async fn metadata(&self, bucket: &str, key: &str) -> Result<ObjectMetadata, StoreError> {
        let path = self.object_path(bucket, key);
        let meta = tokio::fs::metadata(&path)
            .await
            .map_err(|e| Self::map_io(bucket, key, e))?;
        if !meta.is_file() {
            return Err(StoreError::not_found(bucket, key));
        }
        let modified = meta
            .modified()
            .map_err(|e| StoreError::backend(bucket, key, e))?;
        let last_modified = DateTime::<Utc>::from(modified);
        let nanos = last_modified.timestamp_nanos_opt().unwrap_or_default();
        trace!(path = %path.display(), size = meta.len(), "read file metadata");
        Ok(ObjectMetadata {
            size: meta.len(),
            last_modified,
            etag: format!("{nanos:x}-{:x}", meta.len()),
        })
    }

    async fn open_stream(&self, bucket: &str, key: &str) -> Result<ByteStream, StoreError> {
        let file = tokio::fs::File::open(self.object_path(bucket, key))
            .await
            .map_err(|e| Self::map_io(bucket, key, e))?;
        let (bucket, key) = (bucket.to_owned(), key.to_owned());
        let stream = futures::stream::try_unfold(file, move |mut file| {
            let (bucket, key) = (bucket.clone(), key.clone());
            async move {
                let mut buf = BytesMut::with_capacity(STREAM_CHUNK_SIZE);
                let n = file
                    .read_buf(&mut buf)
                    .await
                    .map_err(|e| StoreError::backend(&bucket, &key, e))?;
                if n == 0 {
                    Ok(None)
                } else {
                    Ok(Some((buf.freeze(), file)))
                }
            }
        });
        Ok(Box::pin(stream))
    }

    async fn download(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError> {
        tokio::fs::read(self.object_path(bucket, key))
            .await
            .map(Bytes::from)
            .map_err(|e| Self::map_io(bucket, key, e))
    }
}
