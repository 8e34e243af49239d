//! Core downloader implementation with fetch logic.
//!
//! This module contains the main [`Downloader`] struct that orchestrates a
//! fetch: per-resource locking, cancellation checkpoints, the cache fast
//! path, response validation and the retry loop.
//!
//! # Examples
//!
//! ## Fetching Into the Cache
//!
//! ```rust,no_run
//! use cachedl::downloader::DownloaderBuilder;
//! use cachedl::download::{DownloadRequest, Outcome};
//! use std::convert::TryFrom;
//!
//! # async fn example() -> Result<(), cachedl::Error> {
//! let downloader = DownloaderBuilder::new().build()?;
//! let request = DownloadRequest::try_from("https://example.com/a.png")?
//!     .with_cache_file("/var/cache/images/a.png");
//!
//! match downloader.fetch(&request).await? {
//!     Outcome::File { path, fresh } => println!("{:?} (fresh: {})", path, fresh),
//!     Outcome::Rejected(why) => println!("no result: {}", why),
//!     other => println!("{:?}", other),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Cancelling From Another Task
//!
//! ```rust,no_run
//! use cachedl::downloader::DownloaderBuilder;
//! use cachedl::download::{CancelFlag, DownloadRequest};
//! use std::convert::TryFrom;
//!
//! # async fn example() -> Result<(), cachedl::Error> {
//! let downloader = DownloaderBuilder::new().build()?;
//! let cancel = CancelFlag::new();
//! let request = DownloadRequest::try_from("https://example.com/a.png")?
//!     .with_cancel_flag(cancel.clone());
//!
//! let task = tokio::spawn(async move { downloader.fetch(&request).await });
//! cancel.cancel();
//! let outcome = task.await.expect("fetch task panicked")?;
//! # Ok(())
//! # }
//! ```

use super::config::DownloaderConfig;
use super::locks::LockRegistry;
use crate::download::{DownloadRequest, Outcome};
use crate::error::Result;
use crate::http::{HttpClientConfig, Transport};
use crate::pipeline;

use std::fmt;
use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, error, warn};

/// Represents the download controller.
///
/// A downloader can be created via its builder:
///
/// ```rust
/// # fn main() -> Result<(), cachedl::Error> {
/// use cachedl::downloader::DownloaderBuilder;
///
/// let d = DownloaderBuilder::new().build()?;
/// # Ok(())
/// # }
/// ```
///
/// Clones share the transport and the lock registry, so deduplication
/// holds across every clone of one downloader.
#[derive(Clone)]
pub struct Downloader {
    config: DownloaderConfig,
    transport: Arc<dyn Transport>,
    locks: Arc<LockRegistry>,
}

impl Debug for Downloader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Downloader")
            .field("config", &self.config)
            .field("locks", &self.locks)
            .finish()
    }
}

impl Downloader {
    /// Creates a new Downloader with the given configuration.
    pub(crate) fn new(config: DownloaderConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            locks: Arc::new(LockRegistry::new()),
        }
    }

    /// Gets the number of retries after a transient failure.
    pub fn retries(&self) -> u32 {
        self.config.retries
    }

    /// Gets the maximum number of progress notifications per transfer.
    pub fn progress_callbacks(&self) -> u32 {
        self.config.progress_callbacks
    }

    /// Gets the transport settings.
    pub fn http_config(&self) -> &HttpClientConfig {
        &self.config.http
    }

    /// Gets the registry of per-resource locks.
    pub fn locks(&self) -> &LockRegistry {
        &self.locks
    }

    /// Fetches a resource.
    ///
    /// At most one fetch per resource key runs at a time; concurrent callers
    /// for the same key wait and then usually find the committed cache file.
    /// Rejections and cancellation are reported as [`Outcome`]s; only
    /// failures are errors.
    pub async fn fetch(&self, request: &DownloadRequest) -> Result<Outcome> {
        let guard = self.locks.acquire(request.key()).await;
        let outcome = self.fetch_locked(request).await;
        guard.release();
        outcome
    }

    /// The retry loop. Runs while holding the resource lock.
    async fn fetch_locked(&self, request: &DownloadRequest) -> Result<Outcome> {
        let mut retried = 0;

        loop {
            if request.is_cancelled() {
                warn!("Download of {} cancelled before starting", request.url);
                return Ok(Outcome::Cancelled);
            }

            if let Some(path) = request.cache_file() {
                if is_cached(path).await {
                    debug!("{} is already cached at {:?}", request.url, path);
                    return Ok(Outcome::File {
                        path: path.to_path_buf(),
                        fresh: false,
                    });
                }
            }

            match self.attempt(request).await {
                Ok(outcome) => return Ok(outcome),
                Err(e) if e.is_transient() && retried < self.config.retries => {
                    retried += 1;
                    warn!(
                        "Download of {} failed ({}), retrying ({}/{})",
                        request.url, e, retried, self.config.retries
                    );
                }
                Err(e) => {
                    error!(
                        "Download of {} failed after {} attempt(s): {}",
                        request.url,
                        retried + 1,
                        e
                    );
                    return Err(e);
                }
            }
        }
    }

    /// One network attempt: request, validate, then stream.
    async fn attempt(&self, request: &DownloadRequest) -> Result<Outcome> {
        let response = self.transport.get(&request.url).await?;

        if request.is_cancelled() {
            warn!("Download of {} cancelled after the response arrived", request.url);
            response.release();
            return Ok(Outcome::Cancelled);
        }

        let content_length = match response.validate() {
            Ok(length) => length,
            Err(rejection) => {
                warn!("Rejected response for {}: {}", request.url, rejection);
                response.release();
                return Ok(Outcome::Rejected(rejection));
            }
        };

        pipeline::stream(
            request,
            response,
            content_length,
            self.config.progress_callbacks,
        )
        .await
    }
}

/// Whether a complete artifact sits in the cache slot.
///
/// Temporary files never carry the slot's name, so any regular file there
/// was committed whole.
async fn is_cached(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|metadata| metadata.is_file())
        .unwrap_or(false)
}
