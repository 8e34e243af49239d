//! Content length extraction utilities.
//!
//! A transfer only starts when the response announces how many bytes it is
//! going to send. The announced length sizes the cache-space request and
//! spreads the progress notifications, so it has to be trustworthy.

use crate::download::Rejection;

use reqwest::header::{HeaderMap, CONTENT_LENGTH};

/// Extract a strictly positive content length from the response headers.
///
/// A missing header, a value that is not a plain integer, zero, or a
/// negative number are all rejected. The rejection carries the raw value,
/// if any, for logging.
///
/// # Example
///
/// ```rust
/// use cachedl::utils::content_length;
/// use reqwest::header::{HeaderMap, HeaderValue, CONTENT_LENGTH};
///
/// let mut headers = HeaderMap::new();
/// headers.insert(CONTENT_LENGTH, HeaderValue::from_static("2048"));
/// assert_eq!(content_length(&headers), Ok(2048));
/// ```
pub fn content_length(headers: &HeaderMap) -> Result<u64, Rejection> {
    let Some(value) = headers.get(CONTENT_LENGTH) else {
        return Err(Rejection::ContentLength(None));
    };

    let raw = match value.to_str() {
        Ok(raw) => raw,
        Err(_) => {
            return Err(Rejection::ContentLength(Some(
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )))
        }
    };

    match parse_content_length(raw) {
        Some(length) => Ok(length),
        None => Err(Rejection::ContentLength(Some(raw.to_string()))),
    }
}

/// Parse a `Content-Length` value, returning `None` unless it is an
/// integer greater than zero.
///
/// ```rust
/// use cachedl::utils::parse_content_length;
///
/// assert_eq!(parse_content_length(" 4 "), Some(4));
/// assert_eq!(parse_content_length("0"), None);
/// assert_eq!(parse_content_length("-12"), None);
/// ```
pub fn parse_content_length(value: &str) -> Option<u64> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|length| *length > 0)
}
