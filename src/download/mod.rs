//! Download requests, outcomes and the collaborators a request carries.
//!
//! - [`request`] - [`DownloadRequest`] and the shared [`CancelFlag`]
//! - [`outcome`] - [`Outcome`] of a fetch and the [`Rejection`] reasons
//! - [`space`] - The [`CacheSpace`] allocator consulted before writing to disk

pub mod outcome;
pub mod request;
pub mod space;

pub use outcome::{Outcome, Rejection};
pub use request::{CancelFlag, DownloadRequest};
pub use space::{CacheSpace, UnlimitedSpace};
