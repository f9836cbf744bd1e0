//! Object store capability and its backends.
//!
//! The gateway consumes storage only through [`ObjectStore`]. Backends report
//! a missing object as `Ok(false)` from [`ObjectStore::exists`] or as
//! [`StoreError::NotFound`], and every other failure as
//! [`StoreError::Backend`].
//!
//! - [`MemoryStore`] keeps objects in a [`DashMap`](dashmap::DashMap).
//! - [`FsStore`] serves `<root>/<bucket>/<key>` from a local directory.
//! - `S3Store` (feature `s3`) talks to any S3-compatible service.

mod fs;
mod memory;
#[cfg(feature = "s3")]
mod s3;

use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;

pub use self::fs::FsStore;
pub use self::memory::MemoryStore;
#[cfg(feature = "s3")]
pub use self::s3::S3Store;
use crate::error::StoreError;
use crate::metadata::ObjectMetadata;

/// A stream of object content chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StoreError>> + Send>>;

/// Read-only access to objects in buckets.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug + 'static {
    /// Whether an object exists at `bucket:key`.
    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, StoreError>;

    /// Fetch the metadata of `bucket:key`.
    async fn metadata(&self, bucket: &str, key: &str) -> Result<ObjectMetadata, StoreError>;

    /// Open the content of `bucket:key` as a stream of chunks.
    async fn open_stream(&self, bucket: &str, key: &str) -> Result<ByteStream, StoreError>;

    /// Download the full content of `bucket:key`.
    async fn download(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError>;
}
