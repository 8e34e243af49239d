//! Configuration structures and defaults for the downloader.
//!
//! [`DownloaderConfig`] is filled in by the
//! [`DownloaderBuilder`](super::DownloaderBuilder); its defaults are the
//! ones documented on each field.
//!
//! ```rust
//! use cachedl::downloader::DownloaderConfig;
//! use std::time::Duration;
//!
//! let config = DownloaderConfig::default();
//! assert_eq!(config.retries, 1);
//! assert_eq!(config.progress_callbacks, 10);
//! assert_eq!(config.http.connect_timeout, Duration::from_secs(10));
//! ```

use crate::http::HttpClientConfig;

/// Configuration structure for the downloader.
#[derive(Clone, Debug)]
pub struct DownloaderConfig {
    /// Number of retries after a transient failure. Defaults to 1.
    pub retries: u32,
    /// Maximum number of progress notifications per transfer. Defaults to 10.
    pub progress_callbacks: u32,
    /// Transport settings.
    pub http: HttpClientConfig,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            retries: 1,
            progress_callbacks: 10,
            http: HttpClientConfig::default(),
        }
    }
}
