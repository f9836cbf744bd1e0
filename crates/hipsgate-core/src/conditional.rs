//! `If-None-Match` parsing and freshness evaluation.
//!
//! The header is a comma-separated list of quoted entity tags, each optionally
//! prefixed with `W/`. Weak and strong validators compare equal. Tokens that
//! do not match the entity-tag grammar are logged and dropped; they never fail
//! the request. The `*` wildcard is not a quoted tag and is dropped too.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static ENTITY_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:W/)?"([^"\s]+)"$"#).expect("static entity tag grammar should compile")
});

/// Entity tags parsed from an `If-None-Match` header, without quotes or the
/// weak prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheValidationSet {
    tags: HashSet<String>,
}

impl CacheValidationSet {
    /// Parse a raw `If-None-Match` value.
    ///
    /// # Examples
    ///
    /// ```
    /// use hipsgate_core::conditional::CacheValidationSet;
    ///
    /// let set = CacheValidationSet::parse(r#"W/"abc", garbage, "def""#);
    /// assert!(set.contains("abc"));
    /// assert!(set.contains("def"));
    /// assert_eq!(set.len(), 2);
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut tags = HashSet::new();
        for token in raw.split(',').map(str::trim) {
            match ENTITY_TAG.captures(token).and_then(|c| c.get(1)) {
                Some(tag) => {
                    tags.insert(tag.as_str().to_owned());
                }
                None => {
                    tracing::warn!(
                        header = raw,
                        etag = token,
                        "Ignoring invalid ETag in If-None-Match header"
                    );
                }
            }
        }
        Self { tags }
    }

    /// Parse an optional header value; `None` yields an empty set.
    #[must_use]
    pub fn from_header(raw: Option<&str>) -> Self {
        raw.map(Self::parse).unwrap_or_default()
    }

    /// Whether `etag` (unquoted) is in the set.
    #[must_use]
    pub fn contains(&self, etag: &str) -> bool {
        self.tags.contains(etag)
    }

    /// Whether a response for an object with this `etag` can be replaced by
    /// `304 Not Modified`.
    #[must_use]
    pub fn is_not_modified(&self, etag: &str) -> bool {
        self.contains(etag)
    }

    /// Number of valid tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether no valid tag was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
