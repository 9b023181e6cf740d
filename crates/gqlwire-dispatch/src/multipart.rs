//! Multipart encoder for incremental (deferred/streamed) outcomes.
//!
//! Wire layout, with `-` as the boundary:
//!
//! ```text
//! ---
//! \r\nContent-Type: application/json; charset=utf-8
//! \r\nContent-Length: N
//! \r\n
//! \r\n{json}
//! \r\n---              (only when hasNext is true)
//! ...
//! \r\n-----\r\n        (on natural completion)
//! ```

use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::response::Response;
use bytes::Bytes;
use futures_core::Stream;
use http::header::{CONNECTION, CONTENT_TYPE, TRANSFER_ENCODING};
use http::{HeaderValue, StatusCode};
use serde::Serialize;
use tracing::error;

use gqlwire_core::{BoxStream, IncrementalChunk, Subscription};

use crate::teardown::{Teardown, TeardownReason};

pub const OPENING_BOUNDARY: &[u8] = b"---";
pub const CLOSING_SEQUENCE: &[u8] = b"\r\n-----\r\n";
const PART_HEADERS: &[u8] = b"\r\nContent-Type: application/json; charset=utf-8\r\nContent-Length: ";
const NEXT_BOUNDARY: &[u8] = b"\r\n---";

/// Encode an incremental subscription as a `multipart/mixed` response.
pub fn encode_incremental<V>(subscription: Subscription<IncrementalChunk<V>>) -> Response
where
    V: Serialize + Send + 'static,
{
    let body = MultipartBody::new(subscription);

    let mut response = Response::new(Body::from_stream(body));
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    headers.append(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.append(
        CONTENT_TYPE,
        HeaderValue::from_static("multipart/mixed; boundary=\"-\""),
    );
    headers.append(TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
    response
}

/// Serialise one chunk into a multipart part.
pub fn encode_part<V: Serialize>(chunk: &IncrementalChunk<V>) -> serde_json::Result<Bytes> {
    let json = serde_json::to_vec(chunk)?;
    let length = json.len().to_string();

    let mut part = Vec::with_capacity(PART_HEADERS.len() + length.len() + json.len() + 9);
    part.extend_from_slice(PART_HEADERS);
    part.extend_from_slice(length.as_bytes());
    part.extend_from_slice(b"\r\n\r\n");
    part.extend_from_slice(&json);
    if chunk.has_next {
        part.extend_from_slice(NEXT_BOUNDARY);
    }
    Ok(Bytes::from(part))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Opening,
    Parts,
    /// Terminal chunk written; only the closing sequence remains.
    Closing,
    Done,
}

/// Response body framing incremental chunks as multipart parts.
///
/// Pull-based like [`EventStreamBody`](crate::EventStreamBody). The closing
/// sequence is written only on natural completion; a dropped body just
/// unsubscribes.
pub struct MultipartBody<V> {
    phase: Phase,
    source: BoxStream<IncrementalChunk<V>>,
    teardown: Teardown,
}

impl<V> MultipartBody<V> {
    pub fn new(subscription: Subscription<IncrementalChunk<V>>) -> Self {
        let (source, unsubscribe) = subscription.into_parts();
        Self {
            phase: Phase::Opening,
            source,
            teardown: Teardown::new(unsubscribe),
        }
    }

    pub fn teardown(&self) -> &Teardown {
        &self.teardown
    }
}

impl<V: Serialize> Stream for MultipartBody<V> {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match this.phase {
                Phase::Opening => {
                    this.phase = Phase::Parts;
                    return Poll::Ready(Some(Ok(Bytes::from_static(OPENING_BOUNDARY))));
                }
                Phase::Parts => match this.source.as_mut().poll_next(cx) {
                    Poll::Pending => return Poll::Pending,
                    Poll::Ready(Some(chunk)) => match encode_part(&chunk) {
                        Ok(part) => {
                            if !chunk.has_next {
                                this.phase = Phase::Closing;
                            }
                            return Poll::Ready(Some(Ok(part)));
                        }
                        Err(e) => {
                            error!(
                                has_next = chunk.has_next,
                                error = %e,
                                "dropping incremental chunk that failed to serialize"
                            );
                            if !chunk.has_next {
                                this.phase = Phase::Closing;
                            }
                        }
                    },
                    Poll::Ready(None) => this.phase = Phase::Closing,
                },
                Phase::Closing => {
                    this.phase = Phase::Done;
                    this.teardown.fire(TeardownReason::Completed);
                    return Poll::Ready(Some(Ok(Bytes::from_static(CLOSING_SEQUENCE))));
                }
                Phase::Done => return Poll::Ready(None),
            }
        }
    }
}

impl<V> Drop for MultipartBody<V> {
    fn drop(&mut self) {
        self.teardown.fire(TeardownReason::Disconnected);
    }
}
