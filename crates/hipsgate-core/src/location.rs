//! Backend locations and selector resolution.
//!
//! A [`BucketLocation`] names a bucket and an object-key prefix. The
//! [`BucketTable`] maps selector keys (datasets, releases, named buckets) to
//! locations and designates one of them as the default used by unversioned
//! routes. Resolution is pure and never touches the object store.

use std::collections::BTreeMap;

use crate::error::{ConfigError, GatewayError};
use crate::path::RequestPath;

/// A bucket plus an object-key prefix.
///
/// Prefix segments never contain `.` and are never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketLocation {
    bucket: String,
    prefix: Vec<String>,
}

impl BucketLocation {
    /// Build a location from a bucket name and a `/`-separated prefix.
    ///
    /// Leading and trailing `/` are ignored; `""` and `"/"` mean no prefix.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyBucketName`] if `bucket` is empty and
    /// [`ConfigError::InvalidObjectPrefix`] if any prefix segment is empty or
    /// contains `.`. `key` only labels the error.
    ///
    /// # Examples
    ///
    /// ```
    /// use hipsgate_core::location::BucketLocation;
    /// use hipsgate_core::path::RequestPath;
    ///
    /// let loc = BucketLocation::new("ds1", "B", "/p1/").unwrap();
    /// let path = RequestPath::parse("a.fits").unwrap();
    /// assert_eq!(loc.object_key(&path), "p1/a.fits");
    /// ```
    pub fn new(key: &str, bucket: &str, prefix: &str) -> Result<Self, ConfigError> {
        if bucket.is_empty() {
            return Err(ConfigError::EmptyBucketName {
                key: key.to_owned(),
            });
        }

        let trimmed = prefix.trim_matches('/');
        let segments: Vec<String> = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed.split('/').map(str::to_owned).collect()
        };

        if segments.iter().any(|s| s.is_empty() || s.contains('.')) {
            return Err(ConfigError::InvalidObjectPrefix {
                key: key.to_owned(),
                prefix: prefix.to_owned(),
            });
        }

        Ok(Self {
            bucket: bucket.to_owned(),
            prefix: segments,
        })
    }

    /// The bucket name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// The prefix segments.
    #[must_use]
    pub fn prefix(&self) -> &[String] {
        &self.prefix
    }

    /// The object key for `path`: the prefix joined with the path.
    #[must_use]
    pub fn object_key(&self, path: &RequestPath) -> String {
        self.prefix
            .iter()
            .chain(path.segments())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Immutable selector → location table.
#[derive(Debug, Clone)]
pub struct BucketTable {
    locations: BTreeMap<String, BucketLocation>,
    default_key: String,
}

impl BucketTable {
    /// Build a table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownDefaultBucket`] if `default_key` is not
    /// one of the keys of `locations`.
    pub fn new(
        locations: BTreeMap<String, BucketLocation>,
        default_key: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let default_key = default_key.into();
        if !locations.contains_key(&default_key) {
            return Err(ConfigError::UnknownDefaultBucket {
                key: default_key,
                available: locations.keys().cloned().collect(),
            });
        }
        Ok(Self {
            locations,
            default_key,
        })
    }

    /// Resolve an optional selector.
    ///
    /// No selector resolves to the default location.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnknownSelector`], listing every configured
    /// key, if the selector is not configured.
    pub fn resolve(&self, selector: Option<&str>) -> Result<&BucketLocation, GatewayError> {
        match selector {
            None => Ok(self.default_location()),
            Some(key) => self
                .locations
                .get(key)
                .ok_or_else(|| GatewayError::UnknownSelector {
                    selector: key.to_owned(),
                    available: self.keys(),
                }),
        }
    }

    /// The location used by unversioned routes.
    #[must_use]
    pub fn default_location(&self) -> &BucketLocation {
        // Presence is checked in `new`.
        &self.locations[&self.default_key]
    }

    /// The default selector key.
    #[must_use]
    pub fn default_key(&self) -> &str {
        &self.default_key
    }

    /// Every configured selector key, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.locations.keys().cloned().collect()
    }
}
