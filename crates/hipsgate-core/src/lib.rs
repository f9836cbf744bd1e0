//! Core of hipsgate, a read-only HTTP gateway serving files out of object
//! storage buckets with browser-caching semantics.
//!
//! This crate is transport-agnostic: it validates untrusted paths, resolves
//! selectors to bucket locations, talks to the object store, derives caching
//! headers and evaluates `If-None-Match`. The HTTP layer lives in
//! `hipsgate-http`.
//!
//! # Architecture
//!
//! ```text
//! URL tail + selector
//!        |
//!        v
//!   RequestPath (path grammar)
//!        |
//!        v
//!   BucketTable (selector -> BucketLocation)
//!        |
//!        v
//!   ObjectStore (memory / filesystem / S3)
//!        |
//!        v
//!   FileHeaders + CacheValidationSet
//!        |
//!        v
//!   FileOutcome (200 / 304 / HEAD)
//! ```

pub mod conditional;
pub mod config;
pub mod error;
pub mod location;
pub mod media;
pub mod metadata;
pub mod path;
pub mod service;
pub mod storage;

pub use config::GatewayConfig;
pub use error::{ConfigError, GatewayError, StoreError};
pub use service::{FileContent, FileOutcome, FileService};
