//! In-memory object store.
//!
//! Objects are keyed by `(bucket, key)` in a [`DashMap`]. The ETag is the hex
//! MD5 digest of the content, so re-putting identical bytes keeps the ETag.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use md5::{Digest, Md5};
use tracing::debug;

use super::{ByteStream, ObjectStore};
use crate::error::StoreError;
use crate::metadata::ObjectMetadata;

/// Chunk size used by [`ObjectStore::open_stream`].
const STREAM_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    metadata: ObjectMetadata,
}

/// Thread-safe in-memory object store.
///
/// # Examples
///
/// ```
/// use hipsgate_core::storage::{MemoryStore, ObjectStore};
///
/// # tokio_test::block_on(async {
/// let store = MemoryStore::new();
/// store.put_object("hips", "Norder3/Allsky.fits", "SIMPLE  = T");
/// assert!(store.exists("hips", "Norder3/Allsky.fits").await.unwrap());
/// let meta = store.metadata("hips", "Norder3/Allsky.fits").await.unwrap();
/// assert_eq!(meta.size, 11);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: DashMap<(String, String), StoredObject>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `data` at `bucket:key`, stamped with the current time.
    ///
    /// Returns the new object's metadata.
    pub fn put_object(&self, bucket: &str, key: &str, data: impl Into<Bytes>) -> ObjectMetadata {
        self.put_object_at(bucket, key, data, Utc::now())
    }

    /// Store `data` at `bucket:key` with an explicit modification time.
    pub fn put_object_at(
        &self,
        bucket: &str,
        key: &str,
        data: impl Into<Bytes>,
        last_modified: DateTime<Utc>,
    ) -> ObjectMetadata {
        let data = data.into();
        let metadata = ObjectMetadata {
            size: data.len() as u64,
            last_modified,
            etag: hex::encode(Md5::digest(&data)),
        };
        debug!(bucket, key, size = metadata.size, etag = %metadata.etag, "stored object");
        self.objects.insert(
            (bucket.to_owned(), key.to_owned()),
            StoredObject {
                data,
                metadata: metadata.clone(),
            },
        );
        metadata
    }

    /// Remove `bucket:key`. Returns whether it existed.
    pub fn delete_object(&self, bucket: &str, key: &str) -> bool {
        self.objects
            .remove(&(bucket.to_owned(), key.to_owned()))
            .is_some()
    }

    /// Number of stored objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn get(&self, bucket: &str, key: &str) -> Result<StoredObject, StoreError> {
        self.objects
            .get(&(bucket.to_owned(), key.to_owned()))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::not_found(bucket, key))
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryStore {
    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, StoreError> {
        Ok(self
            .objects
            .contains_key(&(bucket.to_owned(), key.to_owned())))
    }

    async fn metadata(&self, bucket: &str, key: &str) -> Result<ObjectMetadata, StoreError> {
        self.get(bucket, key).map(|obj| obj.metadata)
    }

    async fn open_stream(&self, bucket: &str, key: &str) -> Result<ByteStream, StoreError> {
        let data = self.get(bucket, key)?.data;
        let chunks: Vec<Result<Bytes, StoreError>> = (0..data.len())
            .step_by(STREAM_CHUNK_SIZE)
            .map(|start| Ok(data.slice(start..data.len().min(start + STREAM_CHUNK_SIZE))))
            .collect();
        Ok(Box::pin(futures::stream::iter(chunks)))
    }

    async fn download(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError> {
        self.get(bucket, key).map(|obj| obj.data)
    }
}
