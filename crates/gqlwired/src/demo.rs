//! Built-in demo engine.
//!
//! Stands in for a real schema so the daemon can be exercised end to end.
//! It recognises three shapes by looking at the document text:
//!
//! | Document | Outcome |
//! |---|---|
//! | `subscription ...` | push: counts down from `$from` (default 3), one value per second |
//! | contains `@defer` | incremental: `ping` now, `slow` after a short delay |
//! | anything mentioning `ping` | single: `{"data":{"ping":"pong"}}` |
//!
//! Anything else gets a 200 with an `errors` payload.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::StreamExt;
use serde_json::{Value, json};
use tracing::debug;

use gqlwire_core::{
    BoxFuture, ExecutionEngine, ExecutionOutcome, GraphQLParameters, InboundRequest,
    IncrementalChunk, SingleResponse, Subscription,
};

/// Delay between subscription values.
const TICK: Duration = Duration::from_secs(1);
/// Delay before the deferred chunk.
const DEFER_DELAY: Duration = Duration::from_millis(250);

#[derive(Debug, Default)]
pub struct DemoEngine;

impl ExecutionEngine for DemoEngine {
    fn execute<'a>(
        &'a self,
        params: GraphQLParameters,
        _request: &'a InboundRequest,
    ) -> BoxFuture<'a, ExecutionOutcome> {
        Box::pin(async move {
            let document = params.query.trim_start();
            if document.starts_with("subscription") {
                let from = params
                    .variables
                    .get("from")
                    .and_then(Value::as_u64)
                    .unwrap_or(3);
                countdown(from, TICK)
            } else if document.contains("@defer") {
                deferred(DEFER_DELAY)
            } else if document.contains("ping") {
                ExecutionOutcome::Single(SingleResponse::new(
                    200,
                    vec![("Content-Type".to_string(), "application/json".to_string())],
                    r#"{"data":{"ping":"pong"}}"#,
                ))
            } else {
                ExecutionOutcome::Single(SingleResponse::error(
                    200,
                    "the demo engine only resolves `ping`, `@defer` queries and subscriptions",
                ))
            }
        })
    }
}

fn countdown(from: u64, tick: Duration) -> ExecutionOutcome {
    let stopped = Arc::new(AtomicBool::new(false));
    let flag = stopped.clone();

    let values = futures_util::stream::unfold(Some(from), move |state| {
        let stopped = stopped.clone();
        async move {
            let n = state?;
            if n != from {
                tokio::time::sleep(tick).await;
            }
            if stopped.load(Ordering::Acquire) {
                return None;
            }
            let next = n.checked_sub(1);
            Some((json!({ "data": { "countdown": n } }), next))
        }
    });

    ExecutionOutcome::Push(Subscription::new(values, move || {
        debug!("countdown unsubscribed");
        flag.store(true, Ordering::Release);
    }))
}

fn deferred(delay: Duration) -> ExecutionOutcome {
    let initial = futures_util::stream::once(async {
        IncrementalChunk::new(json!({ "data": { "ping": "pong" } }), true)
    });
    let rest = futures_util::stream::once(async move {
        tokio::time::sleep(delay).await;
        IncrementalChunk::new(
            json!({ "incremental": [{ "data": { "slow": "done" }, "path": [] }] }),
            false,
        )
    });

    ExecutionOutcome::Incremental(Subscription::from_stream(initial.chain(rest)))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::http::{HeaderMap, Method};
    use serde_json::Map;

    use super::*;

    fn params(query: &str, variables: Map<String, Value>) -> GraphQLParameters {
        GraphQLParameters {
            operation_name: None,
            query: query.to_string(),
            variables,
            extensions: Map::new(),
        }
    }

    fn request() -> InboundRequest {
        InboundRequest::new(Method::POST, HeaderMap::new(), HashMap::new(), "")
    }

    #[tokio::test]
    async fn ping_is_single() {
        let req = request();
        let outcome = DemoEngine.execute(params("{ ping }", Map::new()), &req).await;
        match outcome {
            ExecutionOutcome::Single(single) => {
                assert_eq!(single.status, 200);
                assert_eq!(single.payload.as_ref(), br#"{"data":{"ping":"pong"}}"#);
            }
            other => panic!("expected single, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_document_is_error_payload() {
        let req = request();
        let outcome = DemoEngine.execute(params("{ users }", Map::new()), &req).await;
        match outcome {
            ExecutionOutcome::Single(single) => {
                let body: Value = serde_json::from_slice(&single.payload).unwrap();
                assert!(body["errors"].is_array());
            }
            other => panic!("expected single, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn countdown_counts_to_zero() {
        let ExecutionOutcome::Push(sub) = countdown(2, Duration::ZERO) else {
            panic!("expected push");
        };
        let (stream, _unsubscribe) = sub.into_parts();
        let values: Vec<Value> = stream.collect().await;
        assert_eq!(
            values,
            vec![
                json!({"data": {"countdown": 2}}),
                json!({"data": {"countdown": 1}}),
                json!({"data": {"countdown": 0}}),
            ]
        );
    }

    #[tokio::test]
    async fn countdown_stops_after_unsubscribe() {
        let ExecutionOutcome::Push(sub) = countdown(5, Duration::ZERO) else {
            panic!("expected push");
        };
        let (mut stream, unsubscribe) = sub.into_parts();
        assert_eq!(stream.next().await, Some(json!({"data": {"countdown": 5}})));
        unsubscribe();
        assert_eq!(stream.next().await, None);
    }

    #[tokio::test]
    async fn subscription_reads_from_variable() {
        let req = request();
        let mut vars = Map::new();
        vars.insert("from".to_string(), json!(1));
        let outcome = DemoEngine
            .execute(params("subscription { countdown }", vars), &req)
            .await;
        assert_eq!(outcome.kind(), gqlwire_core::OutcomeKind::Push);
    }

    #[tokio::test]
    async fn defer_yields_two_chunks() {
        let ExecutionOutcome::Incremental(sub) = deferred(Duration::ZERO) else {
            panic!("expected incremental");
        };
        let (stream, _unsubscribe) = sub.into_parts();
        let chunks: Vec<IncrementalChunk> = stream.collect().await;
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].has_next);
        assert!(!chunks[1].has_next);
    }
}
