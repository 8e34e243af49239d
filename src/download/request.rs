//! Download requests and cooperative cancellation.

use super::space::{CacheSpace, UnlimitedSpace};
use crate::error::Error;
use crate::progress::ProgressListener;

use reqwest::Url;
use std::convert::TryFrom;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Shared cancellation flag.
///
/// Clones observe the same flag, so the caller can keep one and hand the
/// other to the request. The downloader polls it at fixed checkpoints; I/O
/// already in flight is never interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(CancellationToken);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Calling it again has no further effect.
    pub fn cancel(&self) {
        self.0.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.is_cancelled()
    }

    /// Resolves once cancellation was requested.
    pub async fn cancelled(&self) {
        self.0.cancelled().await
    }
}

impl From<CancellationToken> for CancelFlag {
    /// Wraps a token shared with other parts of the application, such as a
    /// shutdown token.
    fn from(token: CancellationToken) -> Self {
        Self(token)
    }
}

/// Represents a resource to fetch.
///
/// The URL is both the resource identifier and the deduplication key: two
/// requests with the same URL never transfer concurrently.
///
/// ```rust
/// use cachedl::download::{CancelFlag, DownloadRequest};
/// use std::convert::TryFrom;
///
/// # fn main() -> Result<(), cachedl::Error> {
/// let cancel = CancelFlag::new();
/// let request = DownloadRequest::try_from("https://example.com/a.png")?
///     .with_cache_file("/cache/a.png")
///     .with_cancel_flag(cancel.clone());
///
/// assert_eq!(request.key(), "https://example.com/a.png");
/// cancel.cancel();
/// assert!(request.is_cancelled());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DownloadRequest {
    /// URL of the resource.
    pub url: Url,
    /// Cache slot the resource is committed to, if any.
    pub cache_file: Option<PathBuf>,
    cancel: CancelFlag,
    space: Arc<dyn CacheSpace>,
    progress: Option<Arc<dyn ProgressListener>>,
}

impl fmt::Debug for DownloadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadRequest")
            .field("url", &self.url.as_str())
            .field("cache_file", &self.cache_file)
            .field("cancelled", &self.cancel.is_cancelled())
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl DownloadRequest {
    /// Creates a request that downloads into memory.
    pub fn new(url: &Url) -> Self {
        Self {
            url: url.clone(),
            cache_file: None,
            cancel: CancelFlag::new(),
            space: Arc::new(UnlimitedSpace),
            progress: None,
        }
    }

    /// Sets the cache slot the resource is committed to.
    pub fn with_cache_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_file = Some(path.into());
        self
    }

    /// Shares an existing cancellation flag with the request.
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Sets the allocator asked for disk space before writing the cache file.
    pub fn with_space<S>(mut self, space: S) -> Self
    where
        S: CacheSpace + 'static,
    {
        self.space = Arc::new(space);
        self
    }

    /// Same as [`with_space`](Self::with_space) for an allocator shared
    /// between requests.
    pub fn with_shared_space(mut self, space: Arc<dyn CacheSpace>) -> Self {
        self.space = space;
        self
    }

    /// Sets the listener receiving progress notifications.
    pub fn with_progress<P>(mut self, listener: P) -> Self
    where
        P: ProgressListener + 'static,
    {
        self.progress = Some(Arc::new(listener));
        self
    }

    /// Deduplication key of the request.
    pub fn key(&self) -> &str {
        self.url.as_str()
    }

    pub fn cache_file(&self) -> Option<&Path> {
        self.cache_file.as_deref()
    }

    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn space(&self) -> &dyn CacheSpace {
        self.space.as_ref()
    }

    pub(crate) fn progress(&self) -> Option<&dyn ProgressListener> {
        self.progress.as_deref()
    }
}

impl TryFrom<&Url> for DownloadRequest {
    type Error = crate::error::Error;

    fn try_from(value: &Url) -> Result<Self, Self::Error> {
        match value.scheme() {
            "http" | "https" => Ok(DownloadRequest::new(value)),
            scheme => Err(Error::InvalidUrl(format!(
                "The url \"{}\" uses the unsupported scheme \"{}\"",
                value, scheme
            ))),
        }
    }
}

impl TryFrom<&str> for DownloadRequest {
    type Error = crate::error::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Url::parse(value)
            .map_err(|e| {
                Error::InvalidUrl(format!("The url \"{}\" cannot be parsed: {}", value, e))
            })
            .and_then(|u| DownloadRequest::try_from(&u))
    }
}
