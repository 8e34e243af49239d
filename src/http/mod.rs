//! HTTP module containing the transport layer.
//!
//! - [`transport`] - The [`Transport`] trait and the unread [`RemoteResponse`]
//! - [`client`] - Client construction and the reqwest-backed [`HttpTransport`]
//!
//! # Examples
//!
//! ```rust
//! use cachedl::http::{create_http_client, HttpClientConfig};
//! use reqwest::header::{HeaderMap, USER_AGENT};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut headers = HeaderMap::new();
//! headers.insert(USER_AGENT, "MyApp/1.0".parse()?);
//!
//! let config = HttpClientConfig {
//!     headers: Some(headers),
//!     ..HttpClientConfig::default()
//! };
//!
//! let client = create_http_client(&config)?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod transport;

pub use client::{create_http_client, HttpClientConfig, HttpTransport, DEFAULT_USER_AGENT};
pub use transport::{BodyStream, RemoteResponse, Transport};
