//! HTTP routing, response building, and hyper service for hipsgate.
//!
//! - **Routing** ([`router`]): maps a method and raw path to a [`Route`],
//!   handling duplicate-separator and root redirects before any lookup.
//!
//! - **Dispatch** ([`dispatch`]): hands file requests to the
//!   [`FileHandler`](dispatch::FileHandler) trait, implemented by
//!   [`FileService`](hipsgate_core::FileService).
//!
//! - **Response** ([`response`]): turns pipeline outcomes and errors into
//!   HTTP responses.
//!
//! - **Service** ([`service`]): [`GatewayHttpService`](service::GatewayHttpService)
//!   implements hyper's `Service` trait.
//!
//! - **Body** ([`body`]): [`GatewayBody`](body::GatewayBody) supports
//!   buffered, streamed and empty responses.
//!
//! - **Server** ([`server`]): the accept loop with graceful shutdown.
//!
//! # Architecture
//!
//! ```text
//! HTTP Request
//!   -> GatewayHttpService (hyper Service)
//!     -> GatewayRouter (405 / health / metadata / 301 / 307 / 400)
//!     -> dispatch_file (FileHandler trait)
//!       -> FileService (422 / 404 / 500 / 304 / 200)
//!     -> Common response headers (X-Request-Id, Server)
//!   <- HTTP Response
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use hipsgate_core::{FileService, GatewayConfig};
//! use hipsgate_core::storage::MemoryStore;
//! use hipsgate_http::service::{GatewayHttpConfig, GatewayHttpService};
//!
//! let config = GatewayConfig::default();
//! let files = FileService::from_config(&config, Arc::new(MemoryStore::new())).unwrap();
//! let service = GatewayHttpService::new(files, GatewayHttpConfig::from_gateway_config(&config));
//! // Use `service` with hyper server.
//! ```

pub mod body;
pub mod dispatch;
pub mod response;
pub mod router;
pub mod server;
pub mod service;

pub use body::GatewayBody;
pub use dispatch::{FileHandler, dispatch_file};
pub use router::{FileMethod, GatewayRouter, Route};
pub use service::{GatewayHttpConfig, GatewayHttpService};
