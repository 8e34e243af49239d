//! Builder pattern implementation for creating Downloader instances.
//!
//! # Examples
//!
//! ## Basic Builder Usage
//!
//! ```rust
//! use cachedl::downloader::DownloaderBuilder;
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), cachedl::Error> {
//! let downloader = DownloaderBuilder::new()
//!     .retries(3)
//!     .connect_timeout(Duration::from_secs(5))
//!     .progress_callbacks(20)
//!     .build()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom Transport
//!
//! ```rust
//! use cachedl::downloader::DownloaderBuilder;
//! use cachedl::http::{HttpClientConfig, HttpTransport};
//!
//! # fn example() -> Result<(), cachedl::Error> {
//! let transport = HttpTransport::new(&HttpClientConfig::default())?;
//! let downloader = DownloaderBuilder::new().build_with_transport(transport);
//! # Ok(())
//! # }
//! ```

use super::{config::DownloaderConfig, downloader::Downloader};
use crate::error::Result;
use crate::http::{HttpTransport, Transport};

use reqwest::header::{HeaderMap, HeaderValue, IntoHeaderName};
use reqwest::Proxy;
use std::sync::Arc;
use std::time::Duration;

/// A builder used to create a [`Downloader`].
///
/// ```rust
/// # fn main() -> Result<(), cachedl::Error> {
/// use cachedl::downloader::DownloaderBuilder;
///
/// let d = DownloaderBuilder::new().retries(5).build()?;
/// assert_eq!(d.retries(), 5);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct DownloaderBuilder {
    config: DownloaderConfig,
}

impl DownloaderBuilder {
    /// Creates a builder with the default options.
    pub fn new() -> Self {
        DownloaderBuilder::default()
    }

    /// Set the number of retries after a transient failure.
    pub fn retries(mut self, retries: u32) -> Self {
        self.config.retries = retries;
        self
    }

    /// Set the maximum number of progress notifications per transfer.
    pub fn progress_callbacks(mut self, callbacks: u32) -> Self {
        self.config.progress_callbacks = callbacks;
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.http.connect_timeout = timeout;
        self
    }

    /// Set the read timeout.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.http.read_timeout = timeout;
        self
    }

    /// Set how long a request may wait for a free connection.
    pub fn pool_wait_timeout(mut self, timeout: Duration) -> Self {
        self.config.http.pool_wait_timeout = timeout;
        self
    }

    /// Set the maximum number of connections in use at once.
    pub fn max_connections(mut self, max: usize) -> Self {
        self.config.http.max_connections = max;
        self
    }

    /// Set the maximum number of pooled connections per host.
    pub fn max_connections_per_route(mut self, max: usize) -> Self {
        self.config.http.max_connections_per_route = max;
        self
    }

    /// Set the user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.http.user_agent = user_agent.into();
        self
    }

    /// Route requests through a proxy.
    pub fn proxy(mut self, proxy: Proxy) -> Self {
        self.config.http.proxy = Some(proxy);
        self
    }

    /// Helper method to get or create a new HeaderMap.
    fn new_header(&self) -> HeaderMap {
        match self.config.http.headers {
            Some(ref h) => h.to_owned(),
            _ => HeaderMap::new(),
        }
    }

    /// Add the http headers.
    ///
    /// You can call `.headers()` multiple times and all `HeaderMap` will be
    /// merged into a single one.
    ///
    /// ```
    /// use reqwest::header::{self, HeaderValue, HeaderMap};
    /// use cachedl::downloader::DownloaderBuilder;
    ///
    /// let referer = HeaderValue::from_static("https://example.com/");
    ///
    /// let builder = DownloaderBuilder::new()
    ///     .headers(HeaderMap::from_iter([(header::REFERER, referer)]));
    /// ```
    ///
    /// See also [`header()`].
    ///
    /// [`header()`]: DownloaderBuilder::header
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        let mut new = self.new_header();
        new.extend(headers);

        self.config.http.headers = Some(new);
        self
    }

    /// Add the http header
    ///
    /// ```
    /// use reqwest::header::{self, HeaderValue};
    /// use cachedl::downloader::DownloaderBuilder;
    ///
    /// let auth = HeaderValue::from_str("Basic aGk6MTIzNDU2Cg==").expect("Invalid auth");
    ///
    /// let builder = DownloaderBuilder::new()
    ///     .header(header::AUTHORIZATION, auth)
    ///     .header(header::ACCEPT, HeaderValue::from_static("image/*"));
    /// ```
    pub fn header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        let mut new = self.new_header();

        new.insert(name, value);

        self.config.http.headers = Some(new);
        self
    }

    /// Get the configuration built so far.
    pub fn config(&self) -> &DownloaderConfig {
        &self.config
    }

    /// Create the [`Downloader`] with the specified options.
    ///
    /// Fails if the HTTP client cannot be built, for instance because the
    /// user agent is not a valid header value.
    pub fn build(self) -> Result<Downloader> {
        let transport = HttpTransport::new(&self.config.http)?;
        Ok(Downloader::new(self.config, Arc::new(transport)))
    }

    /// Create the [`Downloader`] on top of a custom [`Transport`].
    ///
    /// The transport-related options of this builder are ignored.
    pub fn build_with_transport<T>(self, transport: T) -> Downloader
    where
        T: Transport + 'static,
    {
        Downloader::new(self.config, Arc::new(transport))
    }
}
