//! Validation and normalization of untrusted request paths.
//!
//! A path is accepted only if it is empty or consists of zero or more
//! directory names free of `.` and `/`, followed by a file name free of `.`
//! except for at most one `.` introducing a simple extension. This rules out
//! `..`, bare `.` segments, trailing slashes and empty segments, so a
//! [`RequestPath`] can be appended to an object prefix without any further
//! escaping checks.
//!
//! Runs of `/` are not silently normalized here. Callers detect them with
//! [`has_duplicate_separators`] on the raw URL and redirect to
//! [`collapse_separators`].

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::GatewayError;

/// File served when the request path is empty.
pub const INDEX_FILE: &str = "index.html";

static PATH_GRAMMAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(([^/.]+/)*[^/.]+(\.[^/.]+)?)?$").expect("static path grammar should compile")
});

/// A validated, normalized relative path.
///
/// Never empty: an empty request path becomes [`INDEX_FILE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPath {
    segments: Vec<String>,
}

impl RequestPath {
    /// Validate a decoded URL tail (everything after the route prefix and any
    /// selector segment, without the separating `/`).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidPath`] if the tail violates the path
    /// grammar.
    ///
    /// # Examples
    ///
    /// ```
    /// use hipsgate_core::path::RequestPath;
    ///
    /// let path = RequestPath::parse("Norder4/Dir0/Npix1794.png").unwrap();
    /// assert_eq!(path.extension(), Some("png"));
    /// assert_eq!(RequestPath::parse("").unwrap().as_str(), "index.html");
    /// assert!(RequestPath::parse("../etc/passwd").is_err());
    /// ```
    pub fn parse(tail: &str) -> Result<Self, GatewayError> {
        if !PATH_GRAMMAR.is_match(tail) {
            return Err(GatewayError::InvalidPath {
                path: tail.to_owned(),
            });
        }
        if tail.is_empty() {
            return Ok(Self::index());
        }
        Ok(Self {
            segments: tail.split('/').map(str::to_owned).collect(),
        })
    }

    /// The path used for an empty request.
    #[must_use]
    pub fn index() -> Self {
        Self {
            segments: vec![INDEX_FILE.to_owned()],
        }
    }

    /// Path segments, in order.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The final segment.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.segments.last().map_or(INDEX_FILE, String::as_str)
    }

    /// The extension of the final segment, without the dot.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        self.file_name().split_once('.').map(|(_, ext)| ext)
    }

    /// The path joined with `/`.
    #[must_use]
    pub fn as_str(&self) -> String {
        self.segments.join("/")
    }
}

impl fmt::Display for RequestPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

/// Whether the raw URL path contains a run of two or more `/`.
#[must_use]
pub fn has_duplicate_separators(raw: &str) -> bool {
    raw.contains("//")
}

/// Collapse every run of `/` in `raw` to a single `/`.
///
/// # Examples
///
/// ```
/// use hipsgate_core::path::collapse_separators;
///
/// assert_eq!(collapse_separators("/api//hips///a.fits"), "/api/hips/a.fits");
/// ```
#[must_use]
pub fn collapse_separators(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut previous_slash = false;
    for c in raw.chars() {
        if c == '/' {
            if previous_slash {
                continue;
            }
            previous_slash = true;
        } else {
            previous_slash = false;
        }
        out.push(c);
    }
    out
}
