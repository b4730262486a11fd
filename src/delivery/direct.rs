use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use http_range_header::parse_range_header;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::catalog::{mime::mime_for_extension, CatalogEntry};
use crate::delivery::DeliveryError;

fn direct_headers(entry: &CatalogEntry, length: u64) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(mime_for_extension(&entry.extension)),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    headers
}

/// HEAD for a direct entry. Reports the scan-time size; the file is not opened.
///
/// The length may be stale if the file changed after the scan, while GET reports the live length.
pub fn head(entry: &CatalogEntry) -> Response {
    (StatusCode::OK, direct_headers(entry, entry.size_bytes)).into_response()
}

/// Stream the whole file, or a single byte range of it per RFC 7233.
///
/// The length is taken from the open handle, so a file that changed size since
/// the scan is still served consistently. Dropping the body closes the file.
pub async fn deliver(
    entry: &CatalogEntry,
    range: Option<&HeaderValue>,
) -> Result<Response, DeliveryError> {
    let file = tokio::fs::File::open(&entry.path)
        .await
        .map_err(|e| DeliveryError::from_io(entry, e))?;
    let file_size = file
        .metadata()
        .await
        .map_err(|e| DeliveryError::from_io(entry, e))?
        .len();

    let Some(range_val) = range else {
        let body = Body::from_stream(ReaderStream::new(file));
        return Ok((StatusCode::OK, direct_headers(entry, file_size), body).into_response());
    };

    let (start, end) = match classify_range(range_val, file_size) {
        RangeRequest::Satisfiable(start, end) => (start, end),
        RangeRequest::Unsatisfiable => return Ok(range_not_satisfiable(file_size)),
        RangeRequest::Ignored => {
            tracing::debug!("Ignoring unusable Range header for {}", entry.relative_path);
            let body = Body::from_stream(ReaderStream::new(file));
            return Ok((StatusCode::OK, direct_headers(entry, file_size), body).into_response());
        }
    };

    let length = end - start + 1;
    let mut file = file;
    file.seek(std::io::SeekFrom::Start(start))
        .await
        .map_err(|e| DeliveryError::from_io(entry, e))?;

    let mut headers = direct_headers(entry, length);
    let content_range = format!("bytes {}-{}/{}", start, end, file_size);
    headers.insert(
        header::CONTENT_RANGE,
        HeaderValue::from_str(&content_range)
            .unwrap_or_else(|_| HeaderValue::from_static("bytes 0-0/0")),
    );

    let body = Body::from_stream(ReaderStream::new(file.take(length)));
    Ok((StatusCode::PARTIAL_CONTENT, headers, body).into_response())
}

/// Outcome of matching a `Range` header against the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeRequest {
    /// Inclusive `(start, end)` of the first requested range.
    Satisfiable(u64, u64),
    /// A well-formed `bytes=` range that lies outside the file: 416.
    Unsatisfiable,
    /// Unknown unit, non-ASCII or malformed value: served as if absent.
    Ignored,
}

/// Resolve a `Range` header value against `file_size`.
///
/// Multi-range requests are served with their first range only.
pub fn classify_range(range: &HeaderValue, file_size: u64) -> RangeRequest {
    let Ok(text) = range.to_str() else {
        return RangeRequest::Ignored;
    };
    if !text.trim_start().starts_with("bytes=") {
        return RangeRequest::Ignored;
    }
    let Ok(parsed) = parse_range_header(text.trim_start()) else {
        return RangeRequest::Ignored;
    };
    match parsed.validate(file_size) {
        Ok(ranges) => match ranges.first() {
            Some(first) => RangeRequest::Satisfiable(*first.start(), *first.end()),
            None => RangeRequest::Unsatisfiable,
        },
        Err(_) => RangeRequest::Unsatisfiable,
    }
}

fn range_not_satisfiable(file_size: u64) -> Response {
    (
        StatusCode::RANGE_NOT_SATISFIABLE,
        [(header::CONTENT_RANGE, format!("bytes */{}", file_size))],
    )
        .into_response()
}
