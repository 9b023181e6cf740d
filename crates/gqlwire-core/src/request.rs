//! Inbound request model.
//!
//! A transport-neutral snapshot of one HTTP request: method, headers,
//! decoded query-string parameters and the raw body. Built once per
//! request by the HTTP layer and never mutated afterwards.

use std::collections::HashMap;

use bytes::Bytes;
use http::{HeaderMap, Method, header};

#[derive(Debug, Clone)]
pub struct InboundRequest {
    method: Method,
    headers: HeaderMap,
    query: HashMap<String, String>,
    body: Bytes,
}

impl InboundRequest {
    pub fn new(
        method: Method,
        headers: HeaderMap,
        query: HashMap<String, String>,
        body: impl Into<Bytes>,
    ) -> Self {
        Self {
            method,
            headers,
            query,
            body: body.into(),
        }
    }

    /// Replace the body, keeping method, headers and query parameters.
    pub fn with_body(self, body: impl Into<Bytes>) -> Self {
        Self {
            body: body.into(),
            ..self
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a header, if present and valid UTF-8.
    ///
    /// Lookup is case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// All values of a header joined the way HTTP list headers combine.
    pub fn header_joined(&self, name: &str) -> Option<String> {
        let values: Vec<&str> = self
            .headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(values.join(", "))
        }
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Media type of the body without parameters, lowercased.
    pub fn content_type(&self) -> Option<String> {
        self.header(header::CONTENT_TYPE.as_str()).map(|ct| {
            ct.split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with_headers(pairs: &[(&'static str, &'static str)]) -> InboundRequest {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.append(*name, value.parse().unwrap());
        }
        InboundRequest::new(Method::GET, headers, HashMap::new(), Bytes::new())
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req = request_with_headers(&[("accept", "text/html")]);
        assert_eq!(req.header("Accept"), Some("text/html"));
        assert_eq!(req.header("ACCEPT"), Some("text/html"));
    }

    #[test]
    fn header_joined_combines_values() {
        let req = request_with_headers(&[("accept", "text/html"), ("accept", "*/*")]);
        assert_eq!(req.header_joined("accept").as_deref(), Some("text/html, */*"));
        assert_eq!(req.header_joined("x-missing"), None);
    }

    #[test]
    fn content_type_strips_parameters() {
        let req = request_with_headers(&[("content-type", "Application/JSON; charset=utf-8")]);
        assert_eq!(req.content_type().as_deref(), Some("application/json"));
    }

    #[test]
    fn with_body_keeps_request_line() {
        let req = request_with_headers(&[("content-type", "application/json")]);
        let req = req.with_body(r#"{"query":"{ ping }"}"#);
        assert_eq!(req.method(), Method::GET);
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.body().as_ref(), br#"{"query":"{ ping }"}"#);
    }

    #[test]
    fn query_param_lookup() {
        let mut query = HashMap::new();
        query.insert("query".to_string(), "{ ping }".to_string());
        let req = InboundRequest::new(Method::GET, HeaderMap::new(), query, Bytes::new());
        assert_eq!(req.query_param("query"), Some("{ ping }"));
        assert_eq!(req.query_param("variables"), None);
    }
}
