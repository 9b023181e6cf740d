//! gqlwire-api — HTTP entry point for GraphQL.
//!
//! Mounts a single GraphQL route (GET and POST) that either serves the
//! explorer page to browser navigations or executes the request and hands
//! the outcome to the dispatch layer.
//!
//! # Request flow
//!
//! ```text
//! request ──▶ explorer? ──yes──▶ HTML page
//!                │
//!                no
//!                ▼
//!          read body ──▶ extract parameters ──err──▶ 400 JSON
//!                              │
//!                              ▼
//!                       engine.execute()
//!                              │
//!                              ▼
//!                   dispatch(Single | Push | Incremental)
//! ```

pub mod handler;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;

use gqlwire_core::{ExecutionEngine, GatewayConfig};
use gqlwire_explorer::ExplorerOptions;

/// Shared state for the GraphQL handler.
#[derive(Clone)]
pub struct GraphqlState {
    pub engine: Arc<dyn ExecutionEngine>,
    /// `None` disables the explorer page.
    pub explorer: Option<Arc<ExplorerOptions>>,
    pub max_body_bytes: usize,
}

impl GraphqlState {
    pub fn from_config(config: &GatewayConfig, engine: Arc<dyn ExecutionEngine>) -> Self {
        let explorer = config.explorer.enabled.then(|| {
            Arc::new(ExplorerOptions {
                title: config.explorer.title.clone(),
                endpoint: config.graphql.path.clone(),
                // Subscriptions stream over SSE on `endpoint`; there is no socket.
                subscriptions_endpoint: None,
                default_query: config.explorer.default_query.clone(),
                headers_editor: config.explorer.headers_editor,
            })
        });

        Self {
            engine,
            explorer,
            max_body_bytes: config.graphql.max_body_bytes,
        }
    }
}

/// Build the router with the GraphQL route mounted at the configured path.
pub fn build_router(config: &GatewayConfig, engine: Arc<dyn ExecutionEngine>) -> Router {
    let state = GraphqlState::from_config(config, engine);

    Router::new()
        .route(
            &config.graphql.path,
            get(handler::graphql).post(handler::graphql),
        )
        .with_state(state)
}
