//! Transparent content decoding.
//!
//! The decoder is picked once per response from its `Content-Encoding`
//! header and sits between the body stream and the sink, so sinks only ever
//! see decoded bytes.

use bytes::Bytes;
use flate2::write::GzDecoder;
use reqwest::header::{HeaderMap, CONTENT_ENCODING};
use std::io::{self, Write};

/// Decoder wrapper for response bodies.
pub(crate) enum ContentDecoder {
    Identity,
    Gzip(Box<GzDecoder<Vec<u8>>>),
}

impl ContentDecoder {
    /// Picks the decoder matching the response's content encoding.
    pub(crate) fn for_headers(headers: &HeaderMap) -> Self {
        if is_gzip_encoded(headers) {
            Self::Gzip(Box::new(GzDecoder::new(Vec::new())))
        } else {
            Self::Identity
        }
    }

    pub(crate) fn is_identity(&self) -> bool {
        matches!(self, Self::Identity)
    }

    /// Feeds one chunk of the raw body and returns the bytes it decoded to.
    pub(crate) fn decode(&mut self, chunk: Bytes) -> io::Result<Bytes> {
        match self {
            Self::Identity => Ok(chunk),
            Self::Gzip(decoder) => {
                decoder.write_all(&chunk)?;
                Ok(Bytes::from(std::mem::take(decoder.get_mut())))
            }
        }
    }

    /// Flushes whatever the decoder still holds once the body ended.
    pub(crate) fn finish(self) -> io::Result<Bytes> {
        match self {
            Self::Identity => Ok(Bytes::new()),
            Self::Gzip(decoder) => decoder.finish().map(Bytes::from),
        }
    }
}

/// Whether any element of the `Content-Encoding` header is `gzip`.
pub(crate) fn is_gzip_encoded(headers: &HeaderMap) -> bool {
    headers
        .get_all(CONTENT_ENCODING)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .any(|element| element.trim().eq_ignore_ascii_case("gzip"))
}
