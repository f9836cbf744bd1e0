//! The gateway HTTP service implementing hyper's `Service` trait.
//!
//! [`GatewayHttpService`] ties together routing, dispatch and response
//! serialization. It handles:
//!
//! 1. Routing via [`GatewayRouter`] (method check, health probes, metadata,
//!    redirects)
//! 2. Selector-root redirects, once the selector is known
//! 3. File dispatch to the [`FileHandler`]
//! 4. Common response headers (`X-Request-Id`, `Server`)
//! 5. Error response formatting
//!
//! Request bodies are never read, so the service accepts any body type.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http::StatusCode;
use http::header::{HeaderValue, IF_NONE_MATCH, SERVER};
use hyper::service::Service;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::body::GatewayBody;
use crate::dispatch::{FileHandler, dispatch_file};
use crate::response::{
    ServiceMetadata, error_to_response, health_check_response, metadata_response,
    outcome_to_response, redirect_response,
};
use crate::router::{GatewayRouter, Route};

/// Configuration for the gateway HTTP service.
#[derive(Debug, Clone)]
pub struct GatewayHttpConfig {
    /// Prefix of the unversioned routes.
    pub url_prefix: String,
    /// Prefix of the versioned routes.
    pub v2_url_prefix: String,
    /// Document served at `/`.
    pub metadata: ServiceMetadata,
}

impl Default for GatewayHttpConfig {
    fn default() -> Self {
        Self {
            url_prefix: "/api/hips".to_owned(),
            v2_url_prefix: "/api/hips/v2".to_owned(),
            metadata: ServiceMetadata {
                name: "hipsgate".to_owned(),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                description: "Read-only HTTP gateway for files in object storage".to_owned(),
                repository_url: env!("CARGO_PKG_REPOSITORY").to_owned(),
                documentation_url: env!("CARGO_PKG_REPOSITORY").to_owned(),
            },
        }
    }
}

impl GatewayHttpConfig {
    /// Derive the HTTP configuration from the gateway configuration.
    #[must_use]
    pub fn from_gateway_config(config: &hipsgate_core::GatewayConfig) -> Self {
        let mut http = Self::default();
        http.url_prefix.clone_from(&config.url_prefix);
        http.v2_url_prefix.clone_from(&config.v2_url_prefix);
        http.metadata.name.clone_from(&config.name);
        http
    }
}

/// The gateway HTTP service.
///
/// # Type Parameters
///
/// - `H`: The retrieval logic implementing [`FileHandler`].
#[derive(Debug)]
pub struct GatewayHttpService<H: FileHandler> {
    handler: Arc<H>,
    router: GatewayRouter,
    config: Arc<GatewayHttpConfig>,
}

impl<H: FileHandler> GatewayHttpService<H> {
    /// Create a new service with the given handler and configuration.
    #[must_use]
    pub fn new(handler: H, config: GatewayHttpConfig) -> Self {
        Self::from_shared(Arc::new(handler), config)
    }

    /// Create a new service from a shared handler.
    #[must_use]
    pub fn from_shared(handler: Arc<H>, config: GatewayHttpConfig) -> Self {
        let router = GatewayRouter::new(&config.url_prefix, &config.v2_url_prefix);
        Self {
            handler,
            router,
            config: Arc::new(config),
        }
    }

    /// Process one request to completion.
    pub async fn handle<B>(&self, req: http::Request<B>) -> http::Response<GatewayBody> {
        let request_id = Uuid::new_v4().to_string();
        let (parts, _) = req.into_parts();
        let response = process_request(
            &parts,
            self.handler.as_ref(),
            &self.router,
            &self.config,
            &request_id,
        )
        .await;
        add_common_headers(response, &request_id)
    }
}

impl<H: FileHandler> Clone for GatewayHttpService<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            router: self.router.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<H: FileHandler, B: Send + 'static> Service<http::Request<B>> for GatewayHttpService<H> {
    type Response = http::Response<GatewayBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        let service = self.clone();
        Box::pin(async move { Ok(service.handle(req).await) })
    }
}

/// Process an incoming HTTP request through the gateway pipeline.
async fn process_request<H: FileHandler>(
    parts: &http::request::Parts,
    handler: &H,
    router: &GatewayRouter,
    config: &GatewayHttpConfig,
    request_id: &str,
) -> http::Response<GatewayBody> {
    let method = &parts.method;
    let path = parts.uri.path();
    debug!(%method, path, request_id, "processing request");

    // 1. Route.
    let route = match router.resolve(method, path) {
        Ok(route) => route,
        Err(err) => {
            debug!(%method, path, error = %err, request_id, "failed to route request");
            return error_to_response(&err);
        }
    };

    match route {
        Route::Health => health_check_response(),
        Route::Metadata => metadata_response(&config.metadata),
        Route::Redirect { status, location } => {
            debug!(status = status.as_u16(), %location, request_id, "redirecting");
            redirect_response(status, &location)
        }

        // 2. Selector roots redirect only for configured selectors.
        Route::SelectorRoot { selector, location } => match handler.check_selector(&selector) {
            Ok(()) => redirect_response(StatusCode::TEMPORARY_REDIRECT, &location),
            Err(err) => error_to_response(&err),
        },

        // 3. Files.
        Route::File {
            method: file_method,
            selector,
            tail,
        } => {
            let if_none_match = parts
                .headers
                .get(IF_NONE_MATCH)
                .and_then(|v| v.to_str().ok());
            match dispatch_file(handler, file_method, selector.as_deref(), &tail, if_none_match)
                .await
            {
                Ok(outcome) => {
                    let file = outcome.file();
                    info!(
                        bucket = file.bucket(),
                        key = %file.key,
                        size = file.metadata.size,
                        request_id,
                        "serving file"
                    );
                    outcome_to_response(outcome)
                }
                Err(err) => {
                    if err.status_code() >= 500 {
                        warn!(path, error = %err, request_id, "file request failed");
                    } else {
                        debug!(path, error = %err, request_id, "file request rejected");
                    }
                    error_to_response(&err)
                }
            }
        }
    }
}

/// Add common response headers to every response.
fn add_common_headers(
    mut response: http::Response<GatewayBody>,
    request_id: &str,
) -> http::Response<GatewayBody> {
    let headers = response.headers_mut();

    if let Ok(hv) = HeaderValue::from_str(request_id) {
        headers.insert("x-request-id", hv);
    }
    headers.insert(SERVER, HeaderValue::from_static("hipsgate"));

    response
}
