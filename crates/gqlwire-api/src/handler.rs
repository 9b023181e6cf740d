//! GraphQL route handler.

use std::collections::HashMap;

use axum::body::Body;
use axum::extract::{Query, Request, State};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http_body_util::LengthLimitError;
use tracing::{Instrument, debug, info_span, warn};

use gqlwire_core::{
    DispatchError, DispatchResult, InboundRequest, extract_parameters, should_render_explorer,
};
use gqlwire_dispatch::{dispatch, error_response};
use gqlwire_explorer::explorer_page;

use crate::GraphqlState;

/// GET/POST handler for the GraphQL endpoint.
pub async fn graphql(State(state): State<GraphqlState>, request: Request) -> Response {
    let span = info_span!(
        "graphql",
        method = %request.method(),
        path = %request.uri().path(),
    );
    handle(state, request).instrument(span).await
}

async fn handle(state: GraphqlState, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let query = match Query::<HashMap<String, String>>::try_from_uri(&parts.uri) {
        Ok(Query(query)) => query,
        Err(e) => {
            let err = DispatchError::MalformedParameters(format!("invalid query string: {e}"));
            warn!(error = %err, "rejecting request");
            return error_response(&err);
        }
    };

    // Mode detection runs before the body is read.
    let inbound = InboundRequest::new(parts.method, parts.headers, query, Bytes::new());
    if let Some(options) = state
        .explorer
        .as_ref()
        .filter(|_| should_render_explorer(&inbound))
    {
        debug!("serving explorer page");
        return explorer_page(options).into_response();
    }

    let inbound = match read_body(body, state.max_body_bytes).await {
        Ok(bytes) => inbound.with_body(bytes),
        Err(e) => {
            warn!(error = %e, "rejecting request");
            return error_response(&e);
        }
    };

    let params = match extract_parameters(&inbound) {
        Ok(params) => params,
        Err(e) => {
            warn!(error = %e, "rejecting request");
            return error_response(&e);
        }
    };

    debug!(
        operation = params.operation_name.as_deref().unwrap_or("<anonymous>"),
        "executing operation"
    );
    let outcome = state.engine.execute(params, &inbound).await;
    dispatch(outcome)
}

async fn read_body(body: Body, limit: usize) -> DispatchResult<Bytes> {
    axum::body::to_bytes(body, limit).await.map_err(|e| {
        let inner = e.into_inner();
        if inner.downcast_ref::<LengthLimitError>().is_some() {
            DispatchError::PayloadTooLarge { limit }
        } else {
            DispatchError::MalformedParameters(format!("failed to read request body: {inner}"))
        }
    })
}
