//! gqlwire-core — request model and execution outcome types.
//!
//! Everything the dispatch layer consumes from the outside world:
//! the inbound request snapshot, parameter extraction, explorer-mode
//! detection, the outcome sum type, and the execution engine trait.

pub mod config;
pub mod engine;
pub mod error;
pub mod mode;
pub mod outcome;
pub mod params;
pub mod request;

pub use config::GatewayConfig;
pub use engine::{BoxFuture, ExecutionEngine};
pub use error::{DispatchError, DispatchResult};
pub use mode::should_render_explorer;
pub use outcome::{
    BoxStream, ExecutionOutcome, IncrementalChunk, OutcomeKind, SingleResponse, Subscription,
    Unsubscribe,
};
pub use params::{GraphQLParameters, extract_parameters};
pub use request::InboundRequest;
