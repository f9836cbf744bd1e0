//! hipsgate server - read-only HTTP gateway for files in object storage.
//!
//! Serves HiPS survey files (and any other static tree) out of one or more
//! buckets with browser-caching headers and `If-None-Match` support.
//!
//! # Usage
//!
//! ```text
//! CONFIG_PATH=/etc/hipsgate.json hipsgate-server
//! STORAGE_ROOT=/srv/hips GATEWAY_LISTEN=127.0.0.1:8080 hipsgate-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CONFIG_PATH` | *(unset)* | JSON configuration file |
//! | `GATEWAY_LISTEN` | `0.0.0.0:8080` | Bind address |
//! | `URL_PREFIX` | `/api/hips` | Unversioned route prefix |
//! | `V2_URL_PREFIX` | `/api/hips/v2` | Versioned route prefix |
//! | `CACHE_MAX_AGE` | `3600` | `Cache-Control` max-age in seconds |
//! | `STORAGE_ROOT` | *(unset)* | Serve buckets from this directory |
//! | `PROFILE` | `production` | `development` for human-readable logs |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use hipsgate_core::config::StorageConfig;
use hipsgate_core::storage::{FsStore, MemoryStore, ObjectStore};
use hipsgate_core::{FileService, GatewayConfig};
use hipsgate_http::server::{ctrl_c, serve};
use hipsgate_http::service::{GatewayHttpConfig, GatewayHttpService};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Server version reported in logs and the metadata endpoint.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }

    Ok(())
}

/// Build the object store selected by the configuration.
async fn build_store(storage: &StorageConfig) -> Result<Arc<dyn ObjectStore>> {
    match storage {
        StorageConfig::Memory => Ok(Arc::new(MemoryStore::new())),
        StorageConfig::Filesystem { root } => {
            anyhow::ensure!(
                root.is_dir(),
                "storage root {} is not a directory",
                root.display()
            );
            let store = FsStore::new(root.clone());
            info!(root = %store.root().display(), "serving buckets from local directory");
            Ok(Arc::new(store))
        }
        #[cfg(feature = "s3")]
        StorageConfig::S3 {
            region,
            endpoint_url,
            force_path_style,
        } => Ok(Arc::new(
            hipsgate_core::storage::S3Store::from_env(
                region.clone(),
                endpoint_url.clone(),
                *force_path_style,
            )
            .await,
        )),
        #[cfg(not(feature = "s3"))]
        StorageConfig::S3 { .. } => {
            anyhow::bail!("S3 storage requires building hipsgate-server with the `s3` feature")
        }
    }
}

/// Perform a health check by connecting to the gateway and requesting the health endpoint.
///
/// Exits with code 0 if healthy, 1 otherwise.
async fn run_health_check(addr: &str) -> Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;

    let (mut reader, mut writer) = stream.into_split();

    let request = format!("GET /health HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    writer.write_all(request.as_bytes()).await?;
    writer.shutdown().await?;

    let mut response = String::new();
    reader.read_to_string(&mut response).await?;

    if response.contains("200 OK") && response.contains("\"status\":\"running\"") {
        Ok(())
    } else {
        anyhow::bail!("unhealthy response from {addr}")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = GatewayConfig::load().context("invalid configuration")?;

    // Handle --health-check flag for Docker HEALTHCHECK.
    if std::env::args().any(|a| a == "--health-check") {
        let addr = config.gateway_listen.replace("0.0.0.0", "127.0.0.1");
        let healthy = run_health_check(&addr).await.is_ok();
        std::process::exit(i32::from(!healthy));
    }

    init_tracing(&config.log_level, config.json_logs())?;

    info!(
        gateway_listen = %config.gateway_listen,
        url_prefix = %config.url_prefix,
        v2_url_prefix = %config.v2_url_prefix,
        default_bucket_key = %config.default_bucket_key,
        storage = ?config.storage,
        version = VERSION,
        "starting hipsgate server",
    );

    let store = build_store(&config.storage).await?;
    let files = FileService::from_config(&config, store).context("invalid bucket table")?;
    info!(keys = ?files.table().keys(), "configured bucket keys");

    let service = GatewayHttpService::new(files, GatewayHttpConfig::from_gateway_config(&config));

    let addr: SocketAddr = config
        .gateway_listen
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.gateway_listen))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(%addr, "listening for connections");

    serve(listener, service, ctrl_c()).await;
    Ok(())
}
