//! Execution outcomes handed to the dispatch layer.
//!
//! An outcome is exactly one of three shapes, modelled as a sum type so the
//! dispatcher matches exhaustively and an unrecognised shape cannot exist.

use std::fmt;
use std::pin::Pin;

use bytes::Bytes;
use futures_core::Stream;
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::DispatchResult;

/// A type-erased stream of emitted values.
pub type BoxStream<T> = Pin<Box<dyn Stream<Item = T> + Send>>;

/// Callback that stops the engine-side producer of a subscription.
pub type Unsubscribe = Box<dyn FnOnce() + Send>;

/// The result of executing one operation, before any HTTP encoding.
pub enum ExecutionOutcome<V = Value> {
    /// One complete response.
    Single(SingleResponse),
    /// A live subscription emitting values over time.
    Push(Subscription<V>),
    /// An initial result followed by deferred/streamed chunks.
    Incremental(Subscription<IncrementalChunk<V>>),
}

/// Tag of an [`ExecutionOutcome`], used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Single,
    Push,
    Incremental,
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Single => "single",
            Self::Push => "push",
            Self::Incremental => "incremental",
        })
    }
}

impl<V> ExecutionOutcome<V> {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Single(_) => OutcomeKind::Single,
            Self::Push(_) => OutcomeKind::Push,
            Self::Incremental(_) => OutcomeKind::Incremental,
        }
    }
}

impl<V> fmt::Debug for ExecutionOutcome<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(resp) => f.debug_tuple("Single").field(resp).finish(),
            Self::Push(sub) => f.debug_tuple("Push").field(sub).finish(),
            Self::Incremental(sub) => f.debug_tuple("Incremental").field(sub).finish(),
        }
    }
}

// ── Single ──────────────────────────────────────────────────────

/// A fully-formed response: status, ordered headers, payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub payload: Bytes,
}

impl SingleResponse {
    pub fn new(status: u16, headers: Vec<(String, String)>, payload: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            payload: payload.into(),
        }
    }

    /// A JSON response with `Content-Type: application/json`.
    pub fn json<T: Serialize>(status: u16, body: &T) -> DispatchResult<Self> {
        let payload = serde_json::to_vec(body)?;
        Ok(Self::new(
            status,
            vec![("Content-Type".to_string(), "application/json".to_string())],
            payload,
        ))
    }

    /// A GraphQL-shaped error response: `{"errors":[{"message":...}]}`.
    pub fn error(status: u16, message: &str) -> Self {
        let body = json!({ "errors": [{ "message": message }] });
        Self::new(
            status,
            vec![("Content-Type".to_string(), "application/json".to_string())],
            body.to_string(),
        )
    }
}

// ── Subscriptions ───────────────────────────────────────────────

/// A value source plus the callback that cancels it.
///
/// Polling the stream is the `subscribe` side: each `poll_next` suspends
/// until the engine emits the next value. `unsubscribe` is called by the
/// dispatcher at most once, when the client goes away or the stream ends.
pub struct Subscription<T> {
    stream: BoxStream<T>,
    unsubscribe: Unsubscribe,
}

impl<T> Subscription<T> {
    pub fn new(
        stream: impl Stream<Item = T> + Send + 'static,
        unsubscribe: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            stream: Box::pin(stream),
            unsubscribe: Box::new(unsubscribe),
        }
    }

    /// A subscription whose producer needs no explicit cancellation.
    pub fn from_stream(stream: impl Stream<Item = T> + Send + 'static) -> Self {
        Self::new(stream, || {})
    }

    pub fn into_parts(self) -> (BoxStream<T>, Unsubscribe) {
        (self.stream, self.unsubscribe)
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

/// One part of an incremental result.
///
/// Serialises as the payload's own fields plus `"hasNext"`, so the payload
/// must serialise as a map (a JSON object).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncrementalChunk<V = Value> {
    #[serde(flatten)]
    pub payload: V,
    #[serde(rename = "hasNext")]
    pub has_next: bool,
}

impl<V> IncrementalChunk<V> {
    pub fn new(payload: V, has_next: bool) -> Self {
        Self { payload, has_next }
    }
}
