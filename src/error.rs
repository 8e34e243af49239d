//! Error handling for cachedl.
//!
//! All failures of a fetch are reported through the single [`Error`] enum.
//! Protocol rejections and cancellation are *not* errors: they are distinct
//! [`Outcome`](crate::download::Outcome) variants.
//!
//! Whether a failure is worth another attempt is decided by
//! [`Error::is_transient`]. Only timeouts and interrupted network I/O
//! qualify; everything else, including connection resets and local disk
//! errors, ends the fetch.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can happen when using cachedl.
#[derive(Error, Debug)]
pub enum Error {
    /// Error from an underlying system.
    ///
    /// Returned for unexpected states, such as using a transport after it
    /// was shut down.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Error from the underlying URL parser or the expected URL format.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// I/O error on the network side of a transfer.
    #[error("I/O error")]
    IOError {
        #[from]
        source: io::Error,
    },

    /// Error from the Reqwest library.
    #[error("Reqwest Error")]
    Reqwest {
        #[from]
        source: reqwest::Error,
    },

    /// Error from the HTTP middleware stack.
    #[error("Middleware Error")]
    Middleware {
        #[from]
        source: reqwest_middleware::Error,
    },

    /// No connection slot became available in time.
    #[error("Timed out after {0:?} waiting for a free connection")]
    PoolTimeout(Duration),

    /// The temporary sink could not be created, written or flushed.
    #[error("Failed to write temporary file {path:?}")]
    Sink {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The temporary sink could not be renamed onto its cache slot.
    #[error("Failed to commit cache file {path:?}")]
    Commit {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Returns true for failures eligible for an immediate retry:
    /// connect/read timeouts and interrupted network I/O.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::IOError { source } => is_transient_kind(source.kind()),
            Error::Reqwest { source } => is_transient_reqwest(source),
            Error::Middleware { source } => match source {
                reqwest_middleware::Error::Reqwest(e) => is_transient_reqwest(e),
                _ => false,
            },
            Error::PoolTimeout(_) => true,
            Error::Internal(_)
            | Error::InvalidUrl(_)
            | Error::Sink { .. }
            | Error::Commit { .. } => false,
        }
    }
}

fn is_transient_kind(kind: io::ErrorKind) -> bool {
    matches!(kind, io::ErrorKind::TimedOut | io::ErrorKind::Interrupted)
}

fn is_transient_reqwest(error: &reqwest::Error) -> bool {
    if error.is_timeout() {
        return true;
    }

    // Body read errors surface the socket error somewhere down the chain.
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        if let Some(io_error) = cause.downcast_ref::<io::Error>() {
            return is_transient_kind(io_error.kind());
        }
        source = std::error::Error::source(cause);
    }
    false
}

/// Result type alias for operations that can fail with a cachedl error.
pub type Result<T> = std::result::Result<T, Error>;
