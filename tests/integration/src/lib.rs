//! Integration tests for the hipsgate server.
//!
//! Each test starts an in-process gateway on an ephemeral port, backed by a
//! [`MemoryStore`] seeded with a small HiPS-like tree, and talks to it over
//! HTTP with `reqwest`. Redirects are never followed.
//!
//! ```text
//! cargo test -p hipsgate-integration
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, Once};

use chrono::{TimeZone, Utc};
use hipsgate_core::config::BucketConfig;
use hipsgate_core::storage::{MemoryStore, ObjectStore};
use hipsgate_core::{FileService, GatewayConfig};
use hipsgate_http::server::serve;
use hipsgate_http::service::{GatewayHttpConfig, GatewayHttpService};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

static INIT: Once = Once::new();

/// Bucket holding every seeded object.
pub const BUCKET: &str = "hips-bucket";

/// Objects larger than this are streamed.
pub const MAX_BUFFERED: u64 = 1024;

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// A running gateway. Shuts down when dropped.
#[derive(Debug)]
pub struct TestGateway {
    /// `http://127.0.0.1:<port>`.
    pub base_url: String,
    /// The backing store, for seeding more objects.
    pub store: Arc<MemoryStore>,
    _shutdown: oneshot::Sender<()>,
}

impl TestGateway {
    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Configuration used by every test: a default location at the bucket root
/// and two selectors under `p1` and `p2`.
#[must_use]
pub fn test_config() -> GatewayConfig {
    let mut buckets = BTreeMap::new();
    buckets.insert(
        "default".to_owned(),
        BucketConfig::builder().bucket_name(BUCKET).build(),
    );
    for key in ["ds1", "ds2"] {
        let prefix = if key == "ds1" { "p1" } else { "p2" };
        buckets.insert(
            key.to_owned(),
            BucketConfig::builder()
                .bucket_name(BUCKET)
                .object_prefix(prefix)
                .build(),
        );
    }
    GatewayConfig::builder()
        .gateway_listen("127.0.0.1:0".into())
        .cache_max_age(3600)
        .buckets(buckets)
        .max_buffered_size(MAX_BUFFERED)
        .build()
}

fn seed(store: &MemoryStore) {
    let ts = Utc
        .with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp");
    store.put_object_at(BUCKET, "index.html", "<html>root</html>", ts);
    store.put_object_at(BUCKET, "properties", "creator_did = ivo://test", ts);
    store.put_object_at(BUCKET, "a.fits", "root fits", ts);
    store.put_object_at(BUCKET, "Norder3/Allsky.png", vec![0x89u8; 64], ts);
    store.put_object_at(BUCKET, "Norder4/Dir0/Npix1794.png", vec![0x89u8; 32], ts);
    store.put_object_at(BUCKET, "Moc.xml", "<VOTABLE/>", ts);
    store.put_object_at(BUCKET, "p1/index.html", "<html>ds1</html>", ts);
    store.put_object_at(BUCKET, "p1/a.fits", "ds1 fits", ts);
    store.put_object_at(BUCKET, "p2/only-ds2.txt", "ds2", ts);
    store.put_object_at(BUCKET, "big.bin", vec![7u8; 10 * 1024], ts);
}

/// Start a gateway on an ephemeral port.
pub async fn spawn_gateway() -> TestGateway {
    init_tracing();

    let config = test_config();
    config.validate().expect("valid test config");

    let store = Arc::new(MemoryStore::new());
    seed(&store);

    let shared: Arc<dyn ObjectStore> = store.clone();
    let files = FileService::from_config(&config, shared).expect("valid bucket table");
    let service = GatewayHttpService::new(files, GatewayHttpConfig::from_gateway_config(&config));

    let listener = TcpListener::bind(&config.gateway_listen)
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");

    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(serve(listener, service, async move {
        rx.await.ok();
    }));

    TestGateway {
        base_url: format!("http://{addr}"),
        store,
        _shutdown: tx,
    }
}

/// HTTP client that never follows redirects.
#[must_use]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("build client")
}

/// A header value as a string.
#[must_use]
pub fn header<'a>(resp: &'a reqwest::Response, name: &str) -> Option<&'a str> {
    resp.headers().get(name).and_then(|v| v.to_str().ok())
}

mod test_conditional;
mod test_errors;
mod test_files;
mod test_redirect;
mod test_selector;
