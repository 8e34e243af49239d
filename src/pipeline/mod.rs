//! The stream pipeline: from a validated response to a committed artifact.
//!
//! ```text
//! Idle -> RequestSent -> ResponseValidated -> Streaming -> Committing
//!                                                     -> Committed | Cancelled | Failed
//! ```
//!
//! The orchestrator covers the first two transitions; [`stream`] runs from
//! `ResponseValidated` onwards. Whatever happens after the temporary file
//! is created, it is either renamed onto the cache slot or removed.

pub(crate) mod decode;
pub mod sink;

use crate::download::{DownloadRequest, Outcome};
use crate::error::Result;
use crate::http::{BodyStream, RemoteResponse};
use crate::progress::ProgressTicker;
use decode::ContentDecoder;
use sink::{Sink, TempFile};

use bytes::Bytes;
use futures::stream::StreamExt;
use tokio::fs;
use tracing::{debug, warn};

/// Streams a validated response into the request's sink and commits it.
pub(crate) async fn stream(
    request: &DownloadRequest,
    response: RemoteResponse,
    content_length: u64,
    progress_callbacks: u32,
) -> Result<Outcome> {
    let decoder = ContentDecoder::for_headers(response.headers());
    if !decoder.is_identity() {
        debug!("Inflating gzip-encoded body of {}", request.url);
    }

    let mut sink = open_sink(request, content_length).await?;
    if let Sink::File(file) = &sink {
        debug!("Writing {} to {:?}", request.url, file.path());
    }

    let body = response.into_body();
    if request.is_cancelled() {
        warn!("Download cancelled after opening the body of {}", request.url);
        drop(body);
        sink.discard().await;
        return Ok(Outcome::Cancelled);
    }

    let mut ticker = ProgressTicker::new(content_length, progress_callbacks);
    let copied = copy(request, body, decoder, &mut sink, &mut ticker, content_length).await;
    let completed = match copied {
        Ok(completed) => completed,
        Err(e) => {
            warn!("Failed to read {}: {}", request.url, e);
            sink.discard().await;
            return Err(e);
        }
    };

    if let Err(e) = sink.close().await {
        sink.discard().await;
        return Err(e);
    }

    if request.is_cancelled() {
        warn!("Download cancelled after reading {}", request.url);
        sink.discard().await;
        return Ok(Outcome::Cancelled);
    }

    debug!(
        "Downloaded {} ({}/{} bytes)",
        request.url, completed, content_length
    );

    match sink {
        Sink::File(file) => {
            let path = file.commit().await?;
            Ok(Outcome::File { path, fresh: true })
        }
        Sink::Memory(data) => Ok(Outcome::Bytes(Bytes::from(data))),
    }
}

/// Chooses between a temporary file and a memory buffer.
async fn open_sink(request: &DownloadRequest, content_length: u64) -> Result<Sink> {
    let Some(target) = request.cache_file() else {
        return Ok(Sink::memory(content_length));
    };

    if !request.space().apply_for_space(content_length) {
        debug!(
            "No cache space for {} bytes, downloading {} into memory",
            content_length, request.url
        );
        return Ok(Sink::memory(content_length));
    }

    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            warn!(
                "Cannot create cache directory {:?}, downloading {} into memory: {}",
                parent, request.url, e
            );
            return Ok(Sink::memory(content_length));
        }
    }

    Ok(Sink::File(TempFile::create(target).await?))
}

/// Copies the decoded body into the sink, returning the bytes written.
async fn copy(
    request: &DownloadRequest,
    mut body: BodyStream,
    mut decoder: ContentDecoder,
    sink: &mut Sink,
    ticker: &mut ProgressTicker,
    total: u64,
) -> Result<u64> {
    let mut completed: u64 = 0;

    while let Some(chunk) = body.next().await {
        let decoded = decoder.decode(chunk?)?;
        write(request, sink, ticker, &decoded, &mut completed, total).await?;
    }

    let tail = decoder.finish()?;
    write(request, sink, ticker, &tail, &mut completed, total).await?;

    Ok(completed)
}

async fn write(
    request: &DownloadRequest,
    sink: &mut Sink,
    ticker: &mut ProgressTicker,
    data: &[u8],
    completed: &mut u64,
    total: u64,
) -> Result<()> {
    if data.is_empty() {
        return Ok(());
    }

    sink.write_all(data).await?;
    *completed += data.len() as u64;

    if ticker.advance(*completed) {
        if let Some(listener) = request.progress() {
            listener.on_progress(*completed, total);
        }
    }
    Ok(())
}
