//! Request routing: maps a method and raw URL path to a [`Route`].
//!
//! Rules are applied in this order:
//!
//! 1. Only `GET` and `HEAD` are accepted (`405` otherwise).
//! 2. `/` is the application metadata endpoint, `/health` and `/_health` are
//!    health probes.
//! 3. A raw path with a run of `/` is redirected (`301`) to its collapsed form.
//! 4. The versioned prefix is matched before the unversioned one, since it
//!    usually lives underneath it. A request for the versioned root, with or
//!    without a trailing `/`, is rejected (`400`) because a selector is
//!    required.
//! 5. `<prefix>` and `<v2-prefix>/<selector>` are redirected (`307`) to the
//!    same path with a trailing `/`.
//! 6. Everything else under a prefix is a file request. The selector and tail
//!    are percent-decoded here; the tail is validated later by the pipeline.
//!
//! Redirect locations are absolute paths without scheme, host or query.

use http::{Method, StatusCode};
use hipsgate_core::GatewayError;
use hipsgate_core::path::{collapse_separators, has_duplicate_separators};
use percent_encoding::percent_decode_str;

/// Whether a file request wants content or headers only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMethod {
    /// Full retrieval, subject to `If-None-Match`.
    Get,
    /// Metadata only.
    Head,
}

/// The result of routing a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `GET /`: application metadata.
    Metadata,
    /// Health probe.
    Health,
    /// Redirect that does not depend on configuration lookups.
    Redirect {
        /// `301` or `307`.
        status: StatusCode,
        /// Target path.
        location: String,
    },
    /// `<v2-prefix>/<selector>`: redirected once the selector is known to exist.
    SelectorRoot {
        /// Decoded selector.
        selector: String,
        /// Target path, with a trailing `/`.
        location: String,
    },
    /// A file under a prefix.
    File {
        /// `GET` or `HEAD`.
        method: FileMethod,
        /// Decoded selector, for versioned routes.
        selector: Option<String>,
        /// Decoded path after the prefix and selector.
        tail: String,
    },
}

/// Prefix configuration for routing.
#[derive(Debug, Clone)]
pub struct GatewayRouter {
    url_prefix: String,
    v2_url_prefix: String,
}

impl GatewayRouter {
    /// Create a router for the given prefixes.
    #[must_use]
    pub fn new(url_prefix: impl Into<String>, v2_url_prefix: impl Into<String>) -> Self {
        Self {
            url_prefix: url_prefix.into(),
            v2_url_prefix: v2_url_prefix.into(),
        }
    }

    /// Route a request by method and raw (still percent-encoded) path.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MethodNotAllowed`],
    /// [`GatewayError::SelectorRequired`] or [`GatewayError::RouteNotFound`].
    pub fn resolve(&self, method: &Method, raw_path: &str) -> Result<Route, GatewayError> {
        let file_method = if *method == Method::GET {
            FileMethod::Get
        } else if *method == Method::HEAD {
            FileMethod::Head
        } else {
            return Err(GatewayError::MethodNotAllowed);
        };

        match raw_path {
            "/" => return Ok(Route::Metadata),
            "/health" | "/_health" => return Ok(Route::Health),
            _ => {}
        }

        if has_duplicate_separators(raw_path) {
            return Ok(Route::Redirect {
                status: StatusCode::MOVED_PERMANENTLY,
                location: collapse_separators(raw_path),
            });
        }

        if let Some(rest) = strip_prefix(raw_path, &self.v2_url_prefix) {
            return self.resolve_versioned(file_method, rest);
        }

        match strip_prefix(raw_path, &self.url_prefix) {
            Some("") => Ok(Route::Redirect {
                status: StatusCode::TEMPORARY_REDIRECT,
                location: format!("{}/", self.url_prefix),
            }),
            Some(rest) => Ok(Route::File {
                method: file_method,
                selector: None,
                tail: decode_uri_component(&rest[1..]),
            }),
            None => Err(GatewayError::RouteNotFound),
        }
    }

    /// Route the part of a versioned path after the prefix (`""` or `/...`).
    fn resolve_versioned(&self, method: FileMethod, rest: &str) -> Result<Route, GatewayError> {
        let after = rest.strip_prefix('/').unwrap_or(rest);
        if after.is_empty() {
            return Err(GatewayError::SelectorRequired {
                prefix: self.v2_url_prefix.clone(),
            });
        }

        match after.split_once('/') {
            None => Ok(Route::SelectorRoot {
                selector: decode_uri_component(after),
                location: format!("{}/{after}/", self.v2_url_prefix),
            }),
            Some((selector, tail)) => Ok(Route::File {
                method,
                selector: Some(decode_uri_component(selector)),
                tail: decode_uri_component(tail),
            }),
        }
    }
}

/// Strip `prefix` from `path` only at a segment boundary. The remainder is
/// either empty or starts with `/`.
fn strip_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    path.strip_prefix(prefix)
        .filter(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Decode a percent-encoded URI component.
fn decode_uri_component(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}
