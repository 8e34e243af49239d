//! Shared utility functions.
//!
//! The utils module currently contains:
//!
//! - [`content_length`](mod@content_length) - Strict `Content-Length` validation

pub mod content_length;

pub use content_length::{content_length, parse_content_length};
