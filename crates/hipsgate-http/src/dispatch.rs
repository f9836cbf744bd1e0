//! File request dispatch: bridges the router and the retrieval pipeline.
//!
//! The [`FileHandler`] trait is the boundary between the HTTP layer and the
//! business logic. [`FileService`] implements it; tests and embedders can
//! substitute their own.

use std::future::Future;
use std::pin::Pin;

use hipsgate_core::{FileOutcome, FileService, GatewayError};

use crate::router::FileMethod;

/// Boxed future returned by [`FileHandler`] methods.
pub type HandlerFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, GatewayError>> + Send + 'a>>;

/// Trait the retrieval logic must implement.
pub trait FileHandler: Send + Sync + 'static {
    /// Retrieve (or only describe, for `HEAD`) the file at `tail` under
    /// `selector`.
    fn handle_file<'a>(
        &'a self,
        method: FileMethod,
        selector: Option<&'a str>,
        tail: &'a str,
        if_none_match: Option<&'a str>,
    ) -> HandlerFuture<'a, FileOutcome>;

    /// Check that `selector` is configured, without touching storage.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnknownSelector`] if it is not.
    fn check_selector(&self, selector: &str) -> Result<(), GatewayError>;
}

impl FileHandler for FileService {
    fn handle_file<'a>(
        &'a self,
        method: FileMethod,
        selector: Option<&'a str>,
        tail: &'a str,
        if_none_match: Option<&'a str>,
    ) -> HandlerFuture<'a, FileOutcome> {
        Box::pin(async move {
            match method {
                FileMethod::Get => self.get(selector, tail, if_none_match).await,
                FileMethod::Head => self.head(selector, tail).await,
            }
        })
    }

    fn check_selector(&self, selector: &str) -> Result<(), GatewayError> {
        self.table().resolve(Some(selector)).map(|_| ())
    }
}

/// Dispatch a routed file request to the handler.
///
/// `If-None-Match` is only forwarded for `GET`.
pub async fn dispatch_file<H: FileHandler>(
    handler: &H,
    method: FileMethod,
    selector: Option<&str>,
    tail: &str,
    if_none_match: Option<&str>,
) -> Result<FileOutcome, GatewayError> {
    tracing::debug!(?method, selector, tail, "dispatching file request");
    let if_none_match = match method {
        FileMethod::Get => if_none_match,
        FileMethod::Head => None,
    };
    handler.handle_file(method, selector, tail, if_none_match).await
}
