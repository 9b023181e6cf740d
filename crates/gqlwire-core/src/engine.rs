//! Execution engine boundary.

use std::future::Future;
use std::pin::Pin;

use crate::outcome::ExecutionOutcome;
use crate::params::GraphQLParameters;
use crate::request::InboundRequest;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Executes GraphQL operations against a schema.
///
/// Execution errors are the engine's concern: they come back as ordinary
/// outcomes (usually a `Single` with an `errors` payload), never as a Rust
/// error crossing this boundary.
pub trait ExecutionEngine: Send + Sync + 'static {
    fn execute<'a>(
        &'a self,
        params: GraphQLParameters,
        request: &'a InboundRequest,
    ) -> BoxFuture<'a, ExecutionOutcome>;
}
