//! gqlwire-dispatch — encodes execution outcomes onto HTTP responses.
//!
//! The outcome's variant picks the encoder, and the encoder owns the
//! response for the rest of its life:
//!
//! | Outcome | Framing |
//! |---|---|
//! | `Single` | status, headers in order, payload |
//! | `Push` | `text/event-stream`, one `data: <json>\n\n` frame per value |
//! | `Incremental` | `multipart/mixed; boundary="-"`, one JSON part per chunk |
//!
//! # Streaming Model
//!
//! Streaming bodies are pull-based `Stream`s polled by hyper. The next
//! value is awaited only after the previous frame was taken by the
//! transport, so backpressure reaches the producer and nothing is buffered
//! in between. Dropping a body (client disconnect, failed write) fires the
//! subscription's one-shot [`Teardown`].

pub mod event_stream;
pub mod multipart;
pub mod single;
pub mod teardown;

use axum::response::Response;
use serde::Serialize;
use tracing::debug;

use gqlwire_core::ExecutionOutcome;

pub use event_stream::{EventStreamBody, encode_event, encode_push};
pub use multipart::{MultipartBody, encode_incremental, encode_part};
pub use single::{encode_single, error_response};
pub use teardown::{Teardown, TeardownReason};

/// Encode an execution outcome with the framing its variant calls for.
pub fn dispatch<V>(outcome: ExecutionOutcome<V>) -> Response
where
    V: Serialize + Send + 'static,
{
    debug!(kind = %outcome.kind(), "dispatching outcome");
    match outcome {
        ExecutionOutcome::Single(single) => encode_single(single),
        ExecutionOutcome::Push(subscription) => encode_push(subscription),
        ExecutionOutcome::Incremental(subscription) => encode_incremental(subscription),
    }
}
