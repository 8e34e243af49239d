//! Transfer outcomes.
//!
//! Every call to [`Downloader::fetch`](crate::Downloader::fetch) ends in
//! exactly one [`Outcome`] or an [`Error`](crate::Error). There is no
//! partial state: a fetch either committed a complete file, produced a
//! complete buffer, or left nothing behind.
//!
//! ```rust
//! use cachedl::download::Outcome;
//! use std::path::PathBuf;
//!
//! let outcome = Outcome::File { path: PathBuf::from("/cache/a.png"), fresh: true };
//! match &outcome {
//!     Outcome::File { path, fresh: true } => println!("downloaded {:?}", path),
//!     Outcome::File { path, fresh: false } => println!("already cached {:?}", path),
//!     Outcome::Bytes(bytes) => println!("{} bytes in memory", bytes.len()),
//!     Outcome::Rejected(why) => println!("no result: {}", why),
//!     Outcome::Cancelled => println!("cancelled"),
//! }
//! ```

use bytes::Bytes;
use reqwest::StatusCode;
use std::fmt;
use std::path::{Path, PathBuf};

/// Result of one fetch call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The resource is available in its cache slot.
    ///
    /// `fresh` is true when this call downloaded it, false when a complete
    /// file was already there and no network activity happened.
    File { path: PathBuf, fresh: bool },
    /// The resource was downloaded into memory.
    Bytes(Bytes),
    /// The server response was not usable. Never retried.
    Rejected(Rejection),
    /// The request was cancelled. Nothing was left on disk.
    Cancelled,
}

impl Outcome {
    /// Get the cache file, if the outcome refers to one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Outcome::File { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Get the in-memory payload, if any.
    pub fn bytes(&self) -> Option<&Bytes> {
        match self {
            Outcome::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Whether the payload was transferred by this call.
    pub fn is_fresh(&self) -> bool {
        matches!(self, Outcome::File { fresh: true, .. } | Outcome::Bytes(_))
    }

    /// Whether the fetch was satisfied by an existing cache file.
    pub fn is_cached(&self) -> bool {
        matches!(self, Outcome::File { fresh: false, .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }
}

/// Why a response was refused before streaming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The response carried no status line.
    MissingStatus,
    /// The status code was anything but 200.
    Status(StatusCode),
    /// `Content-Length` was missing, malformed, zero or negative.
    ContentLength(Option<String>),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::MissingStatus => write!(f, "missing status line"),
            Rejection::Status(code) => write!(f, "unexpected status {}", code),
            Rejection::ContentLength(None) => write!(f, "missing content length"),
            Rejection::ContentLength(Some(raw)) => write!(f, "invalid content length {:?}", raw),
        }
    }
}
