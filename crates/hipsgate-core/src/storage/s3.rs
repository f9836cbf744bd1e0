//! S3-compatible object store.
//!
//! Works against AWS S3 and any service speaking its API (MinIO, the GCS XML
//! interoperability endpoint, LocalStack). A missing object surfaces as a
//! `NotFound`/`NoSuchKey` service error and is mapped to
//! [`StoreError::NotFound`]; everything else is a backend failure.

use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::Client;
use aws_sdk_s3::operation::head_object::HeadObjectOutput;
use aws_sdk_s3::primitives::DateTime as SmithyDateTime;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;

use super::{ByteStream, ObjectStore};
use crate::error::StoreError;
use crate::metadata::{ObjectMetadata, normalize_etag};

/// Object store backed by an S3 client.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
}

impl S3Store {
    /// Wrap an existing client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the SDK's environment chain, optionally overriding
    /// the region and endpoint.
    pub async fn from_env(
        region: Option<String>,
        endpoint_url: Option<String>,
        force_path_style: bool,
    ) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        if let Some(endpoint) = endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let shared = loader.load().await;
        let config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(force_path_style)
            .build();
        Self::new(Client::from_conf(config))
    }
}

fn to_chrono(ts: Option<&SmithyDateTime>) -> DateTime<Utc> {
    ts.and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos()))
        .unwrap_or_default()
}

/// Object metadata from a `HeadObject` answer. A missing or negative
/// `Content-Length` is a backend failure.
fn metadata_from_head(
    bucket: &str,
    key: &str,
    out: &HeadObjectOutput,
) -> Result<ObjectMetadata, StoreError> {
    let size = out
        .content_length()
        .and_then(|n| u64::try_from(n).ok())
        .ok_or_else(|| {
            let cause = anyhow::anyhow!("HeadObject returned no content length");
            StoreError::backend(bucket, key, cause)
        })?;
    Ok(ObjectMetadata {
        size,
        last_modified: to_chrono(out.last_modified()),
        etag: out.e_tag().map(normalize_etag).unwrap_or_default().to_owned(),
    })
}

#[async_trait::async_trait]
impl ObjectStore for S3Store {
    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, StoreError> {
        match self.metadata(bucket, key).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn metadata(&self, bucket: &str, key: &str) -> Result<ObjectMetadata, StoreError> {
        let out = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_not_found()) {
                    StoreError::not_found(bucket, key)
                } else {
                    StoreError::backend(bucket, key, e)
                }
            })?;

        metadata_from_head(bucket, key, &out)
    }

    async fn open_stream(&self, bucket: &str, key: &str) -> Result<ByteStream, StoreError> {
        let out = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    StoreError::not_found(bucket, key)
                } else {
                    StoreError::backend(bucket, key, e)
                }
            })?;

        let (bucket, key) = (bucket.to_owned(), key.to_owned());
        let stream = futures::stream::try_unfold(out.body, |mut body| async move {
            let chunk = body.try_next().await?;
            Ok::<_, aws_sdk_s3::primitives::ByteStreamError>(chunk.map(|chunk| (chunk, body)))
        })
        .map_err(move |e| StoreError::backend(&bucket, &key, e));
        Ok(Box::pin(stream))
    }

    async fn download(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError> {
        let out = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    StoreError::not_found(bucket, key)
                } else {
                    StoreError::backend(bucket, key, e)
                }
            })?;
        out.body
            .collect()
            .await
            .map(aws_sdk_s3::primitives::AggregatedBytes::into_bytes)
            .map_err(|e| StoreError::backend(bucket, key, e))
    }
}
