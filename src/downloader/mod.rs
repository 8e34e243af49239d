//! Downloader module containing the orchestrator, its builder and
//! configuration, and the per-resource lock registry.
//!
//! - `downloader` - [`Downloader`] with the fetch orchestration
//! - `builder` - [`DownloaderBuilder`] for configuring a downloader
//! - `config` - [`DownloaderConfig`] and its defaults
//! - `locks` - [`LockRegistry`] deduplicating concurrent fetches
//!
//! # Examples
//!
//! ```rust,no_run
//! use cachedl::downloader::DownloaderBuilder;
//! use cachedl::download::DownloadRequest;
//! use std::convert::TryFrom;
//!
//! # async fn example() -> Result<(), cachedl::Error> {
//! let downloader = DownloaderBuilder::new().retries(2).build()?;
//!
//! // Both calls share one transfer: the second waits for the first and
//! // then finds the committed file.
//! let request = DownloadRequest::try_from("https://example.com/a.png")?
//!     .with_cache_file("cache/a.png");
//! let (first, second) = tokio::join!(downloader.fetch(&request), downloader.fetch(&request));
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod downloader;
pub mod locks;

pub use builder::DownloaderBuilder;
pub use config::DownloaderConfig;
pub use downloader::Downloader;
pub use locks::{LockRegistry, ResourceGuard};
