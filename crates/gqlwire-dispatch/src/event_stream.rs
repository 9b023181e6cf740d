//! Event-stream encoder for push (subscription) outcomes.
//!
//! Each emitted value becomes one `data: <json>\n\n` frame. The stream has
//! no terminating frame: when the source ends the body ends, and the
//! connection is left to the transport's keep-alive handling.

use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::response::Response;
use bytes::Bytes;
use futures_core::Stream;
use http::header::{CACHE_CONTROL, CONNECTION, CONTENT_TYPE};
use http::{HeaderValue, StatusCode};
use serde::Serialize;
use tracing::error;

use gqlwire_core::{BoxStream, Subscription};

use crate::teardown::{Teardown, TeardownReason};

/// Encode a subscription as a `text/event-stream` response.
pub fn encode_push<V>(subscription: Subscription<V>) -> Response
where
    V: Serialize + Send + 'static,
{
    let body = EventStreamBody::new(subscription);

    let mut response = Response::new(Body::from_stream(body));
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    headers.append(CONTENT_TYPE, HeaderValue::from_static("text/event-stream"));
    headers.append(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.append(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}

/// Serialise one value into an event frame.
pub fn encode_event<V: Serialize>(value: &V) -> serde_json::Result<Bytes> {
    let json = serde_json::to_vec(value)?;
    let mut frame = Vec::with_capacity(json.len() + 8);
    frame.extend_from_slice(b"data: ");
    frame.extend_from_slice(&json);
    frame.extend_from_slice(b"\n\n");
    Ok(Bytes::from(frame))
}

/// Response body that pulls values from a subscription one at a time.
///
/// The source is only polled when the transport asks for the next frame,
/// so a full write buffer stalls the producer instead of queueing here.
/// Dropping the body before the source ends counts as a disconnect.
pub struct EventStreamBody<V> {
    source: Option<BoxStream<V>>,
    teardown: Teardown,
}

impl<V> EventStreamBody<V> {
    pub fn new(subscription: Subscription<V>) -> Self {
        let (source, unsubscribe) = subscription.into_parts();
        Self {
            source: Some(source),
            teardown: Teardown::new(unsubscribe),
        }
    }

    pub fn teardown(&self) -> &Teardown {
        &self.teardown
    }
}

impl<V: Serialize> Stream for EventStreamBody<V> {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            let Some(source) = this.source.as_mut() else {
                return Poll::Ready(None);
            };

            match source.as_mut().poll_next(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Some(value)) => match encode_event(&value) {
                    Ok(frame) => return Poll::Ready(Some(Ok(frame))),
                    Err(e) => {
                        error!(error = %e, "dropping subscription value that failed to serialize");
                    }
                },
                Poll::Ready(None) => {
                    this.source = None;
                    this.teardown.fire(TeardownReason::Completed);
                    return Poll::Ready(None);
                }
            }
        }
    }
}

impl<V> Drop for EventStreamBody<V> {
    fn drop(&mut self) {
        self.teardown.fire(TeardownReason::Disconnected);
    }
}
