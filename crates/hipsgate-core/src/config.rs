//! Gateway configuration.
//!
//! Provides [`GatewayConfig`]. Values come from an optional JSON file named by
//! `CONFIG_PATH`, then from environment variables, and are checked by
//! [`GatewayConfig::validate`] before the gateway starts.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::error::ConfigError;
use crate::location::{BucketLocation, BucketTable};

/// A configured bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct BucketConfig {
    /// Name of the bucket in the object store.
    #[builder(setter(into))]
    pub bucket_name: String,

    /// Object-key prefix inside the bucket (`/`-separated, may be empty).
    #[serde(default)]
    #[builder(default, setter(into))]
    pub object_prefix: String,
}

/// Which object store backend serves the buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StorageConfig {
    /// In-process memory store, empty at startup.
    #[default]
    Memory,
    /// Local directory; bucket `b` is served from `<root>/b`.
    Filesystem {
        /// Root directory.
        root: PathBuf,
    },
    /// S3-compatible object store.
    #[serde(rename_all = "camelCase")]
    S3 {
        /// Region override; falls back to the SDK's environment chain.
        #[serde(default)]
        region: Option<String>,
        /// Custom endpoint (MinIO, GCS interoperability, LocalStack...).
        #[serde(default)]
        endpoint_url: Option<String>,
        /// Use path-style bucket addressing.
        #[serde(default)]
        force_path_style: bool,
    },
}

/// Gateway configuration.
///
/// # Examples
///
/// ```
/// use hipsgate_core::config::GatewayConfig;
///
/// let config = GatewayConfig::default();
/// assert_eq!(config.url_prefix, "/api/hips");
/// assert_eq!(config.cache_control(), "private, max-age=3600");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayConfig {
    /// Bind address (e.g. `"0.0.0.0:8080"`).
    #[builder(default = String::from("0.0.0.0:8080"))]
    pub gateway_listen: String,

    /// Application name, reported by the root metadata endpoint.
    #[builder(default = String::from("hipsgate"))]
    pub name: String,

    /// Prefix of the unversioned routes, served from the default bucket.
    #[builder(default = String::from("/api/hips"))]
    pub url_prefix: String,

    /// Prefix of the versioned routes, which require a selector segment.
    #[builder(default = String::from("/api/hips/v2"))]
    pub v2_url_prefix: String,

    /// Seconds for which browsers may cache responses.
    #[builder(default = 3600)]
    pub cache_max_age: u64,

    /// Selector key → bucket.
    #[builder(default)]
    pub buckets: BTreeMap<String, BucketConfig>,

    /// Selector key used by unversioned routes.
    #[builder(default = String::from("default"))]
    pub default_bucket_key: String,

    /// Object store backend.
    #[builder(default)]
    pub storage: StorageConfig,

    /// Objects larger than this many bytes are streamed instead of buffered.
    #[builder(default = 1_048_576)]
    pub max_buffered_size: u64,

    /// `development` for human-readable logs, `production` for JSON logs.
    #[builder(default = String::from("production"))]
    pub profile: String,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            gateway_listen: String::from("0.0.0.0:8080"),
            name: String::from("hipsgate"),
            url_prefix: String::from("/api/hips"),
            v2_url_prefix: String::from("/api/hips/v2"),
            cache_max_age: 3600,
            buckets: BTreeMap::new(),
            default_bucket_key: String::from("default"),
            storage: StorageConfig::Memory,
            max_buffered_size: 1_048_576,
            profile: String::from("production"),
            log_level: String::from("info"),
        }
    }
}

impl GatewayConfig {
    /// Load the configuration file named by `CONFIG_PATH` (if set), apply
    /// environment overrides, and validate the result.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed, or if
    /// validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("CONFIG_PATH") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON configuration file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`].
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Parse a JSON document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns the parse error.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Override fields from environment variables.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `GATEWAY_LISTEN` | `gateway_listen` |
    /// | `NAME` | `name` |
    /// | `URL_PREFIX` | `url_prefix` |
    /// | `V2_URL_PREFIX` | `v2_url_prefix` |
    /// | `CACHE_MAX_AGE` | `cache_max_age` |
    /// | `DEFAULT_BUCKET_KEY` | `default_bucket_key` |
    /// | `STORAGE_ROOT` | `storage` (filesystem) |
    /// | `MAX_BUFFERED_SIZE` | `max_buffered_size` |
    /// | `PROFILE` | `profile` |
    /// | `LOG_LEVEL` | `log_level` |
    pub fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("GATEWAY_LISTEN") {
            self.gateway_listen = v;
        }
        if let Ok(v) = std::env::var("NAME") {
            self.name = v;
        }
        if let Ok(v) = std::env::var("URL_PREFIX") {
            self.url_prefix = v;
        }
        if let Ok(v) = std::env::var("V2_URL_PREFIX") {
            self.v2_url_prefix = v;
        }
        if let Ok(v) = std::env::var("CACHE_MAX_AGE") {
            if let Ok(n) = v.parse::<u64>() {
                self.cache_max_age = n;
            }
        }
        if let Ok(v) = std::env::var("DEFAULT_BUCKET_KEY") {
            self.default_bucket_key = v;
        }
        if let Ok(v) = std::env::var("STORAGE_ROOT") {
            self.storage = StorageConfig::Filesystem { root: v.into() };
        }
        if let Ok(v) = std::env::var("MAX_BUFFERED_SIZE") {
            if let Ok(n) = v.parse::<u64>() {
                self.max_buffered_size = n;
            }
        }
        if let Ok(v) = std::env::var("PROFILE") {
            self.profile = v;
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            self.log_level = v;
        }
    }

    /// Check prefixes and build the bucket table once to validate it.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_url_prefix(&self.url_prefix)?;
        validate_url_prefix(&self.v2_url_prefix)?;
        self.bucket_table().map(|_| ())
    }

    /// Build the selector table.
    ///
    /// With no buckets configured, a single entry named after
    /// `default_bucket_key` (same bucket name, no prefix) is synthesized.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a bucket is malformed or the default key
    /// is unknown.
    pub fn bucket_table(&self) -> Result<BucketTable, ConfigError> {
        let mut locations = BTreeMap::new();
        if self.buckets.is_empty() {
            locations.insert(
                self.default_bucket_key.clone(),
                BucketLocation::new(&self.default_bucket_key, &self.default_bucket_key, "")?,
            );
        }
        for (key, bucket) in &self.buckets {
            locations.insert(
                key.clone(),
                BucketLocation::new(key, &bucket.bucket_name, &bucket.object_prefix)?,
            );
        }
        BucketTable::new(locations, self.default_bucket_key.clone())
    }

    /// The `Cache-Control` value sent with every file response.
    #[must_use]
    pub fn cache_control(&self) -> String {
        format!("private, max-age={}", self.cache_max_age)
    }

    /// Whether logs should be emitted as JSON.
    #[must_use]
    pub fn json_logs(&self) -> bool {
        !self.profile.eq_ignore_ascii_case("development")
    }
}

fn validate_url_prefix(prefix: &str) -> Result<(), ConfigError> {
    let reason = if !prefix.starts_with('/') {
        "must start with /"
    } else if prefix.len() > 1 && prefix.ends_with('/') {
        "must not end with /"
    } else if prefix == "/" {
        "must not be the application root"
    } else if prefix.contains("//") {
        "must not contain //"
    } else {
        return Ok(());
    };
    Err(ConfigError::InvalidUrlPrefix {
        prefix: prefix.to_owned(),
        reason,
    })
}
