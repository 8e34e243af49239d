//! HTTP client setup and the production [`Transport`].
//!
//! The transport is constructed once, owns the connection pool and is
//! reused by every fetch of a [`Downloader`](crate::Downloader) and its
//! clones.
//!
//! # Features
//!
//! - **Timeouts**: connect and read timeouts on every request
//! - **Connection caps**: a total cap and a per-route cap, both enforced
//!   by semaphores held for the lifetime of a response body
//! - **Compression**: asks for gzip; decoding happens in the stream pipeline
//! - **Tracing**: requests are traced by `reqwest_tracing`
//!
//! # Examples
//!
//! ```rust
//! use cachedl::http::{HttpClientConfig, HttpTransport};
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpClientConfig {
//!     connect_timeout: Duration::from_secs(5),
//!     ..HttpClientConfig::default()
//! };
//! let transport = HttpTransport::new(&config)?;
//! # Ok(())
//! # }
//! ```

use super::transport::{RemoteResponse, Transport};
use crate::error::{Error, Result};

use futures::future::{BoxFuture, FutureExt};
use futures::stream::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};
use reqwest::{Proxy, Url};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

/// Default user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 6.0; WOW64) AppleWebKit/534.24 (KHTML, like Gecko) Chrome/11.0.696.16 Safari/534.24";

/// Configuration for HTTP client setup.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Maximum time to establish a connection.
    pub connect_timeout: Duration,
    /// Maximum time between two reads on a connection.
    pub read_timeout: Duration,
    /// Maximum time to wait for a free connection slot.
    pub pool_wait_timeout: Duration,
    /// Maximum number of connections in use at once.
    pub max_connections: usize,
    /// Maximum number of connections in use at once to one host and port.
    pub max_connections_per_route: usize,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Optional proxy configuration.
    pub proxy: Option<Proxy>,
    /// Default headers to include with all requests.
    pub headers: Option<HeaderMap>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(10),
            pool_wait_timeout: Duration::from_secs(60),
            max_connections: 800,
            max_connections_per_route: 400,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy: None,
            headers: None,
        }
    }
}

/// Creates an HTTP client with middleware configuration.
///
/// This function sets up a reqwest client with:
/// - Connect and read timeouts
/// - Per-host connection pooling, keeping at most
///   `max_connections_per_route` idle sockets
/// - `Accept-Encoding: gzip` unless the default headers already set it
/// - Tracing middleware for request/response logging
/// - Optional proxy support
///
/// # Example
///
/// ```rust
/// use cachedl::http::{create_http_client, HttpClientConfig};
///
/// let config = HttpClientConfig::default();
/// let client = create_http_client(&config).unwrap();
/// ```
pub fn create_http_client(
    config: &HttpClientConfig,
) -> std::result::Result<ClientWithMiddleware, reqwest::Error> {
    let mut headers = config.headers.clone().unwrap_or_default();
    if !headers.contains_key(ACCEPT_ENCODING) {
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
    }

    let mut inner_client_builder = reqwest::Client::builder()
        .connect_timeout(config.connect_timeout)
        .read_timeout(config.read_timeout)
        .pool_max_idle_per_host(config.max_connections_per_route)
        .tcp_nodelay(true)
        .user_agent(config.user_agent.as_str())
        .default_headers(headers);

    if let Some(proxy) = config.proxy.clone() {
        inner_client_builder = inner_client_builder.proxy(proxy);
    }

    let inner_client = inner_client_builder.build()?;

    let client = ClientBuilder::new(inner_client)
        // Trace HTTP requests. See the tracing crate to make use of these traces.
        .with(TracingMiddleware::default())
        .build();

    Ok(client)
}

/// The production [`Transport`], backed by a pooled reqwest client.
///
/// Clones are cheap and share the pool and the connection caps.
#[derive(Clone)]
pub struct HttpTransport {
    client: ClientWithMiddleware,
    connections: Arc<Semaphore>,
    routes: Arc<Mutex<HashMap<String, Arc<Semaphore>>>>,
    max_connections_per_route: usize,
    pool_wait_timeout: Duration,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("available_connections", &self.connections.available_permits())
            .field("max_connections_per_route", &self.max_connections_per_route)
            .field("pool_wait_timeout", &self.pool_wait_timeout)
            .finish()
    }
}

impl HttpTransport {
    /// Builds the client and the connection caps.
    pub fn new(config: &HttpClientConfig) -> Result<Self> {
        let client = create_http_client(config)?;
        Ok(Self {
            client,
            connections: Arc::new(Semaphore::new(config.max_connections.max(1))),
            routes: Arc::new(Mutex::new(HashMap::new())),
            max_connections_per_route: config.max_connections_per_route.max(1),
            pool_wait_timeout: config.pool_wait_timeout,
        })
    }

    /// Number of connection slots currently free.
    pub fn available_connections(&self) -> usize {
        self.connections.available_permits()
    }

    /// Number of connection slots currently free for the host and port of
    /// `url`.
    pub fn available_route_connections(&self, url: &Url) -> usize {
        self.route(url).available_permits()
    }

    /// Stops accepting new requests. Bodies already streaming complete
    /// normally; later requests fail with [`Error::Internal`].
    pub fn shutdown(&self) {
        self.connections.close();
    }

    /// Whether [`shutdown`](Self::shutdown) was called on this transport or
    /// one of its clones.
    pub fn is_shutdown(&self) -> bool {
        self.connections.is_closed()
    }

    /// The semaphore capping connections to the route of `url`.
    fn route(&self, url: &Url) -> Arc<Semaphore> {
        let key = route_key(url);
        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        routes
            .entry(key)
            .or_insert_with(|| Arc::new(Semaphore::new(self.max_connections_per_route)))
            .clone()
    }

    /// Waits for a slot of `semaphore`, at most `pool_wait_timeout`.
    async fn acquire(&self, semaphore: Arc<Semaphore>) -> Result<OwnedSemaphorePermit> {
        tokio::time::timeout(self.pool_wait_timeout, semaphore.acquire_owned())
            .await
            .map_err(|_| Error::PoolTimeout(self.pool_wait_timeout))?
            .map_err(|_| Error::Internal("the HTTP transport was shut down".into()))
    }
}

/// `host:port` of a URL, the unit the per-route cap applies to.
fn route_key(url: &Url) -> String {
    format!(
        "{}:{}",
        url.host_str().unwrap_or_default(),
        url.port_or_known_default().unwrap_or_default()
    )
}

impl Transport for HttpTransport {
    fn get<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Result<RemoteResponse>> {
        async move {
            if self.is_shutdown() {
                return Err(Error::Internal("the HTTP transport was shut down".into()));
            }
            let route = self.acquire(self.route(url)).await?;
            let total = self.acquire(self.connections.clone()).await?;

            debug!("Fetching {}", url);
            let response = self.client.get(url.clone()).send().await?;
            let status = response.status();
            let headers = response.headers().clone();

            // The slots stay taken until the body is dropped.
            let body = response
                .bytes_stream()
                .map(move |chunk| {
                    let _slots = (&route, &total);
                    chunk.map_err(Error::from)
                })
                .boxed();

            Ok(RemoteResponse::new(status, headers, body))
        }
        .boxed()
    }
}
