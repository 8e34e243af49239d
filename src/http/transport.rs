//! The transport seam between the orchestrator and the network.
//!
//! A [`Transport`] performs one GET and hands back a [`RemoteResponse`]:
//! status, headers and a lazily read body. The response is validated before
//! a single body byte is consumed; rejected responses are released without
//! reading their body.

use crate::download::Rejection;
use crate::error::Result;
use crate::utils::content_length;

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::header::HeaderMap;
use reqwest::{StatusCode, Url};
use std::fmt;

/// Body of a response, read chunk by chunk.
pub type BodyStream = BoxStream<'static, Result<Bytes>>;

/// Performs HTTP GET requests on behalf of the downloader.
///
/// The production implementation is [`HttpTransport`](super::HttpTransport).
/// Tests and embedders can provide their own, for instance to count
/// requests or serve canned bodies.
pub trait Transport: Send + Sync {
    /// Sends a GET request and resolves once the response headers arrived.
    fn get<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Result<RemoteResponse>>;
}

/// A response whose body has not been read yet.
pub struct RemoteResponse {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: BodyStream,
}

impl fmt::Debug for RemoteResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl RemoteResponse {
    /// Creates a response from its parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: BodyStream) -> Self {
        Self {
            status: Some(status),
            headers,
            body,
        }
    }

    /// Creates a response that came back without a status line.
    pub fn without_status(headers: HeaderMap, body: BodyStream) -> Self {
        Self {
            status: None,
            headers,
            body,
        }
    }

    /// Creates a response with an in-memory body delivered as one chunk.
    pub fn from_bytes(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        let body = stream::once(async move { Ok::<_, crate::error::Error>(body) }).boxed();
        Self::new(status, headers, body)
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Checks the response can be streamed and returns its content length.
    ///
    /// The status must be exactly `200 OK`; other 2xx codes are rejected
    /// too. `Content-Length` must be a positive integer.
    pub fn validate(&self) -> std::result::Result<u64, Rejection> {
        match self.status {
            None => Err(Rejection::MissingStatus),
            Some(StatusCode::OK) => content_length(&self.headers),
            Some(code) => Err(Rejection::Status(code)),
        }
    }

    /// Takes the body stream out of the response.
    pub fn into_body(self) -> BodyStream {
        self.body
    }

    /// Drops the response without reading its body, giving the connection
    /// back.
    pub fn release(self) {
        drop(self.body);
    }
}
