//! cachedl fetches remote resources over HTTP(S) into a local file cache,
//! making sure that concurrent requests for one resource share a single
//! transfer and that a cache slot only ever holds complete files.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use cachedl::{DownloadRequest, DownloaderBuilder, Error, Outcome};
//! use std::convert::TryFrom;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Error> {
//! let downloader = DownloaderBuilder::new().build()?;
//! let request = DownloadRequest::try_from("https://example.com/a.png")?
//!     .with_cache_file("cache/a.png");
//!
//! match downloader.fetch(&request).await? {
//!     Outcome::File { path, .. } => println!("cached at {:?}", path),
//!     Outcome::Rejected(why) => println!("not cacheable: {}", why),
//!     _ => {}
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`download`] - Requests, cancellation flags, outcomes and the cache space seam
//! - [`downloader`] - The `Downloader` orchestrator, its builder and the lock registry
//! - [`error`] - Centralized error handling with the `Error` enum
//! - [`http`] - The `Transport` seam and the reqwest-backed implementation
//! - [`pipeline`] - Body decoding, temporary sinks and atomic commit
//! - [`progress`] - Bounded progress notifications
//! - [`utils`] - Shared utility functions

pub mod download;
pub mod downloader;
pub mod error;
pub mod http;
pub mod pipeline;
pub mod progress;
pub mod utils;

pub use download::{CacheSpace, CancelFlag, DownloadRequest, Outcome, Rejection, UnlimitedSpace};
pub use downloader::{Downloader, DownloaderBuilder, DownloaderConfig};
pub use error::{Error, Result};
pub use http::{HttpClientConfig, HttpTransport, RemoteResponse, Transport};
pub use progress::ProgressListener;
