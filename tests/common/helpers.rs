#![allow(dead_code)]

use bytes::Bytes;
use cachedl::http::{RemoteResponse, Transport};
use cachedl::{CancelFlag, DownloadRequest, Downloader, DownloaderBuilder, Error, ProgressListener, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_ENCODING, CONTENT_LENGTH};
use reqwest::{StatusCode, Url};
use std::collections::VecDeque;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

// Common test constants
pub const TEST_URL: &str = "https://example.com/a.png";
pub const TEST_PAYLOAD: &[u8] = b"\x89PNG";

/// Creates a temporary directory for testing purposes
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Creates test file content of specified size
pub fn create_test_content(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 256) as u8).collect()
}

/// Gzip-compresses `data`
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("Failed to compress");
    encoder.finish().expect("Failed to finish compression")
}

/// Lists the file names in `dir`, sorted
pub fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("Failed to read directory")
        .map(|entry| {
            entry
                .expect("Failed to read entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}

/// Asserts that no temporary file is left in `dir`
pub fn assert_no_temp_files(dir: &Path) {
    let leftovers: Vec<String> = list_dir(dir)
        .into_iter()
        .filter(|name| name.ends_with(".temp"))
        .collect();
    assert!(leftovers.is_empty(), "Temporary files left: {:?}", leftovers);
}

/// Creates a request for the common test URL
pub fn create_test_request() -> DownloadRequest {
    DownloadRequest::try_from(TEST_URL).expect("Failed to create request")
}

/// Creates a request caching into `dir/name`
pub fn create_cached_request(dir: &Path, name: &str) -> (DownloadRequest, PathBuf) {
    let path = dir.join(name);
    (create_test_request().with_cache_file(&path), path)
}

/// Builds a downloader on top of a shared mock transport
pub fn create_test_downloader(transport: &Arc<MockTransport>, retries: u32) -> Downloader {
    DownloaderBuilder::new()
        .retries(retries)
        .build_with_transport(SharedTransport(transport.clone()))
}

// === Mock transport ===

/// A scripted response
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: Option<StatusCode>,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    pub chunk_size: usize,
    /// Yields a read timeout instead of the chunk with this index
    pub fail_at_chunk: Option<usize>,
}

impl MockResponse {
    /// A 200 response announcing the exact body length
    pub fn ok(body: &[u8]) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len() as u64));
        Self {
            status: Some(StatusCode::OK),
            headers,
            body: body.to_vec(),
            chunk_size: 1024,
            fail_at_chunk: None,
        }
    }

    /// A gzip-encoded 200 response; the length is the compressed size
    pub fn gzipped(body: &[u8]) -> Self {
        let mut response = Self::ok(&gzip(body));
        response
            .headers
            .insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        response
    }

    pub fn status(code: StatusCode, body: &[u8]) -> Self {
        Self {
            status: Some(code),
            ..Self::ok(body)
        }
    }

    pub fn without_status(body: &[u8]) -> Self {
        Self {
            status: None,
            ..Self::ok(body)
        }
    }

    pub fn content_length(mut self, value: Option<&'static str>) -> Self {
        match value {
            Some(value) => {
                self.headers
                    .insert(CONTENT_LENGTH, HeaderValue::from_static(value));
            }
            None => {
                self.headers.remove(CONTENT_LENGTH);
            }
        }
        self
    }

    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    pub fn fail_at_chunk(mut self, index: usize) -> Self {
        self.fail_at_chunk = Some(index);
        self
    }

    fn into_remote(self, delay: Duration) -> RemoteResponse {
        let chunks: Vec<Bytes> = self
            .body
            .chunks(self.chunk_size)
            .map(Bytes::copy_from_slice)
            .collect();
        let fail_at = self.fail_at_chunk;

        let body = stream::iter(chunks.into_iter().enumerate())
            .then(move |(index, chunk)| async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                match fail_at {
                    Some(at) if index >= at => Err(Error::from(io::Error::new(
                        io::ErrorKind::TimedOut,
                        "mock read timeout",
                    ))),
                    _ => Ok(chunk),
                }
            })
            .boxed();

        match self.status {
            Some(status) => RemoteResponse::new(status, self.headers, body),
            None => RemoteResponse::without_status(self.headers, body),
        }
    }
}

/// One scripted reaction of the mock transport
#[derive(Debug, Clone)]
pub enum Step {
    Respond(MockResponse),
    /// Fails the request itself with an I/O error of this kind
    Fail(io::ErrorKind),
}

/// A transport replaying scripted steps and counting requests.
///
/// Once the script is exhausted the last step repeats.
#[derive(Debug, Default)]
pub struct MockTransport {
    steps: Mutex<VecDeque<Step>>,
    last: Mutex<Option<Step>>,
    calls: AtomicUsize,
    chunk_delay: Duration,
}

impl MockTransport {
    pub fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            ..Self::default()
        })
    }

    pub fn serving(response: MockResponse) -> Arc<Self> {
        Self::new(vec![Step::Respond(response)])
    }

    /// Same as [`serving`](Self::serving), sleeping before every chunk
    pub fn slow(response: MockResponse, chunk_delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(vec![Step::Respond(response)].into()),
            chunk_delay,
            ..Self::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_step(&self) -> Option<Step> {
        let mut last = self.last.lock().unwrap();
        if let Some(step) = self.steps.lock().unwrap().pop_front() {
            *last = Some(step);
        }
        last.clone()
    }
}

/// Lets tests keep a handle on the transport they gave away
pub struct SharedTransport(pub Arc<MockTransport>);

impl Transport for SharedTransport {
    fn get<'a>(&'a self, _url: &'a Url) -> BoxFuture<'a, Result<RemoteResponse>> {
        self.0.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.0.next_step();
        let delay = self.0.chunk_delay;

        async move {
            match step {
                Some(Step::Respond(response)) => Ok(response.into_remote(delay)),
                Some(Step::Fail(kind)) => Err(Error::from(io::Error::new(kind, "mock failure"))),
                None => Err(Error::Internal("no scripted response".into())),
            }
        }
        .boxed()
    }
}

/// Serves one response, cancelling `flag` once its headers are out
pub struct CancellingTransport {
    pub flag: CancelFlag,
    pub response: MockResponse,
}

impl Transport for CancellingTransport {
    fn get<'a>(&'a self, _url: &'a Url) -> BoxFuture<'a, Result<RemoteResponse>> {
        self.flag.cancel();
        let response = self.response.clone().into_remote(Duration::ZERO);
        async move { Ok(response) }.boxed()
    }
}

// === Progress ===

/// Records every progress notification
#[derive(Debug, Clone, Default)]
pub struct RecordingListener {
    events: Arc<Mutex<Vec<(u64, u64)>>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(u64, u64)> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressListener for RecordingListener {
    fn on_progress(&self, completed: u64, total: u64) {
        self.events.lock().unwrap().push((completed, total));
    }
}

/// Routes crate logs to the test output, filtered by `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
