//! Pipeline outcome to HTTP response serialization.
//!
//! Response categories:
//! - **File**: `200` with content for `GET`, without content for `HEAD`, and
//!   `304` with the caching headers but no `Content-Length`.
//! - **Redirect**: `301`/`307` with a `Location` header.
//! - **JSON**: error bodies of the form `{"detail": "..."}`, the metadata
//!   document and the health probe.

use http::StatusCode;
use http::header::{ALLOW, CONTENT_TYPE, HeaderValue, LOCATION};
use hipsgate_core::metadata::ResolvedFile;
use hipsgate_core::{FileContent, FileOutcome, GatewayError};
use serde::Serialize;

use crate::body::GatewayBody;

/// Application metadata served at `/`.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceMetadata {
    /// Application name.
    pub name: String,
    /// Application version.
    pub version: String,
    /// Short description.
    pub description: String,
    /// Source repository.
    pub repository_url: String,
    /// Documentation home.
    pub documentation_url: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    detail: &'a str,
}

// ---------------------------------------------------------------------------
// Helper functions for building responses
// ---------------------------------------------------------------------------

/// Set a header on a response builder if the value is a valid header value.
fn set_header(
    builder: http::response::Builder,
    name: &str,
    value: &str,
) -> http::response::Builder {
    match HeaderValue::from_str(value) {
        Ok(hv) => builder.header(name, hv),
        Err(_) => builder,
    }
}

/// Build a response, falling back to an empty `500` if the builder is invalid.
fn build_response(
    builder: http::response::Builder,
    body: GatewayBody,
) -> http::Response<GatewayBody> {
    builder.body(body).unwrap_or_else(|err| {
        tracing::error!(error = %err, "failed to build response");
        http::Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .body(GatewayBody::empty())
            .expect("static response should be valid")
    })
}

fn file_builder(
    status: StatusCode,
    file: &ResolvedFile,
    with_length: bool,
) -> http::response::Builder {
    file.headers
        .pairs(with_length)
        .into_iter()
        .fold(http::Response::builder().status(status), |builder, (name, value)| {
            set_header(builder, name, &value)
        })
}

/// Convert a pipeline outcome into a response.
#[must_use]
pub fn outcome_to_response(outcome: FileOutcome) -> http::Response<GatewayBody> {
    match outcome {
        FileOutcome::Content(file, content) => {
            let body = match content {
                FileContent::Buffered(data) => GatewayBody::from_bytes(data),
                FileContent::Streaming { stream, size } => GatewayBody::streaming(stream, size),
            };
            build_response(file_builder(StatusCode::OK, &file, true), body)
        }
        FileOutcome::Metadata(file) => build_response(
            file_builder(StatusCode::OK, &file, true),
            GatewayBody::empty(),
        ),
        FileOutcome::NotModified(file) => build_response(
            file_builder(StatusCode::NOT_MODIFIED, &file, false),
            GatewayBody::empty(),
        ),
    }
}

/// A redirect to `location`.
#[must_use]
pub fn redirect_response(status: StatusCode, location: &str) -> http::Response<GatewayBody> {
    build_response(
        set_header(http::Response::builder().status(status), LOCATION.as_str(), location),
        GatewayBody::empty(),
    )
}

/// A JSON response.
fn json_response<T: Serialize>(status: StatusCode, value: &T) -> http::Response<GatewayBody> {
    match serde_json::to_vec(value) {
        Ok(json) => build_response(
            http::Response::builder()
                .status(status)
                .header(CONTENT_TYPE, "application/json"),
            GatewayBody::from_bytes(json),
        ),
        Err(err) => {
            tracing::error!(error = %err, "failed to serialize response body");
            build_response(
                http::Response::builder().status(StatusCode::INTERNAL_SERVER_ERROR),
                GatewayBody::empty(),
            )
        }
    }
}

/// Convert an error into a `{"detail": ...}` response. `405` carries `Allow`.
#[must_use]
pub fn error_to_response(err: &GatewayError) -> http::Response<GatewayBody> {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let detail = err.detail();
    let mut response = json_response(status, &ErrorBody { detail: &detail });
    if matches!(err, GatewayError::MethodNotAllowed) {
        response
            .headers_mut()
            .insert(ALLOW, HeaderValue::from_static("GET, HEAD"));
    }
    response
}

/// The application metadata document.
#[must_use]
pub fn metadata_response(metadata: &ServiceMetadata) -> http::Response<GatewayBody> {
    json_response(StatusCode::OK, metadata)
}

/// Produce a health check response.
#[must_use]
pub fn health_check_response() -> http::Response<GatewayBody> {
    http::Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "application/json")
        .body(GatewayBody::from_string(r#"{"status":"running"}"#))
        .expect("static health response should be valid")
}
