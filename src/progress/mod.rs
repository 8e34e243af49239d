//! Progress reporting.
//!
//! A transfer reports `(completed, total)` pairs to a [`ProgressListener`].
//! The number of notifications per transfer is bounded by the downloader's
//! `progress_callbacks` setting, whatever the payload size: the
//! [`ProgressTicker`] spreads the notification points evenly over the
//! announced length instead of firing once per chunk.
//!
//! # Examples
//!
//! ## Closure Listener
//!
//! ```rust
//! use cachedl::progress::ProgressListener;
//!
//! let listener = |completed: u64, total: u64| {
//!     println!("{}/{} bytes", completed, total);
//! };
//! listener.on_progress(512, 1024);
//! ```
//!
//! ## Terminal Progress Bar
//!
//! ```rust
//! use cachedl::download::DownloadRequest;
//! use indicatif::ProgressBar;
//! use std::convert::TryFrom;
//!
//! # fn example() -> Result<(), cachedl::Error> {
//! let request = DownloadRequest::try_from("https://example.com/a.png")?
//!     .with_progress(ProgressBar::new(0));
//! # Ok(())
//! # }
//! ```

pub(crate) mod ticker;

pub use ticker::ProgressTicker;

use indicatif::ProgressBar;

/// Receives progress notifications for a single transfer.
pub trait ProgressListener: Send + Sync {
    /// Called with the number of bytes written so far and the announced
    /// length of the resource.
    ///
    /// `total` is the response's `Content-Length`. For gzip-encoded bodies
    /// that is the compressed size while `completed` counts decoded bytes,
    /// so `completed` can exceed `total` and the notifications bunch up
    /// early in the transfer.
    fn on_progress(&self, completed: u64, total: u64);
}

impl<F> ProgressListener for F
where
    F: Fn(u64, u64) + Send + Sync,
{
    fn on_progress(&self, completed: u64, total: u64) {
        self(completed, total)
    }
}

impl ProgressListener for ProgressBar {
    fn on_progress(&self, completed: u64, total: u64) {
        if self.length() != Some(total) {
            self.set_length(total);
        }
        self.set_position(completed.min(total));
    }
}
