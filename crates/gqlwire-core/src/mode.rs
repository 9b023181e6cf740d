//! Request mode detection: API call or explorer navigation.

use http::{Method, header};

use crate::request::InboundRequest;

/// Returns `true` when the request is a browser navigation that should get
/// the explorer page instead of being executed.
///
/// That is a GET without a `query` parameter whose `Accept` header lists
/// `text/html`. The body is never read.
pub fn should_render_explorer(request: &InboundRequest) -> bool {
    if request.method() != Method::GET {
        return false;
    }
    if request.query_param("query").is_some() {
        return false;
    }
    request
        .header_joined(header::ACCEPT.as_str())
        .is_some_and(|accept| accept.to_ascii_lowercase().contains("text/html"))
}
