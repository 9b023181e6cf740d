//! GraphQL parameter extraction.
//!
//! Structured body fields win over query-string fields. `variables` and
//! `extensions` given in the query string, or as a string-valued body
//! field, are JSON text.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{DispatchError, DispatchResult};
use crate::request::InboundRequest;

/// Parameters of one GraphQL operation, derived once per request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLParameters {
    pub operation_name: Option<String>,
    pub query: String,
    pub variables: Map<String, Value>,
    pub extensions: Map<String, Value>,
}

/// Request body, parsed according to its content type.
enum ParsedBody {
    Empty,
    Json(Map<String, Value>),
    /// `application/graphql`: the whole body is the document text.
    Document(String),
}

/// Derive [`GraphQLParameters`] from a request known to be an API call.
pub fn extract_parameters(request: &InboundRequest) -> DispatchResult<GraphQLParameters> {
    let body = parse_body(request)?;
    let fields = match &body {
        ParsedBody::Json(map) => Some(map),
        _ => None,
    };

    let operation_name = match fields.and_then(|f| string_field(f, "operationName").transpose()) {
        Some(name) => Some(name?),
        None => request.query_param("operationName").map(str::to_string),
    }
    .filter(|name| !name.is_empty());

    let query = match fields.and_then(|f| string_field(f, "query").transpose()) {
        Some(query) => Some(query?),
        None => match &body {
            ParsedBody::Document(text) => Some(text.clone()),
            _ => request.query_param("query").map(str::to_string),
        },
    };
    let query = query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| DispatchError::MalformedParameters("must provide query string".into()))?;

    let variables = object_param(request, fields, "variables")?;
    let extensions = object_param(request, fields, "extensions")?;

    Ok(GraphQLParameters {
        operation_name,
        query,
        variables,
        extensions,
    })
}

fn parse_body(request: &InboundRequest) -> DispatchResult<ParsedBody> {
    let raw = request.body();
    if raw.is_empty() {
        return Ok(ParsedBody::Empty);
    }

    let content_type = request.content_type();
    match content_type.as_deref() {
        Some("application/graphql") => {
            let text = std::str::from_utf8(raw).map_err(|_| {
                DispatchError::MalformedParameters("request body is not valid UTF-8".into())
            })?;
            Ok(ParsedBody::Document(text.to_string()))
        }
        None => parse_json_body(raw),
        Some(ct) if ct == "application/json" || ct.ends_with("+json") => parse_json_body(raw),
        Some(_) => Ok(ParsedBody::Empty),
    }
}

fn parse_json_body(raw: &[u8]) -> DispatchResult<ParsedBody> {
    match serde_json::from_slice::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(ParsedBody::Json(map)),
        Ok(_) => Err(DispatchError::MalformedParameters(
            "request body must be a JSON object".into(),
        )),
        Err(e) => Err(DispatchError::MalformedParameters(format!(
            "invalid JSON body: {e}"
        ))),
    }
}

/// Read an optional string field. JSON `null` counts as absent.
fn string_field(fields: &Map<String, Value>, name: &str) -> DispatchResult<Option<String>> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(DispatchError::MalformedParameters(format!(
            "`{name}` must be a string"
        ))),
    }
}

/// Read an object-valued parameter from the body, falling back to JSON text
/// in the query string. A string-valued body field is JSON text as well.
fn object_param(
    request: &InboundRequest,
    fields: Option<&Map<String, Value>>,
    name: &str,
) -> DispatchResult<Map<String, Value>> {
    match fields.and_then(|f| f.get(name)) {
        Some(Value::String(text)) => parse_object_text(text, name),
        Some(value) => as_object(value.clone(), name),
        None => match request.query_param(name) {
            None => Ok(Map::new()),
            Some(text) => parse_object_text(text, name),
        },
    }
}

fn parse_object_text(text: &str, name: &str) -> DispatchResult<Map<String, Value>> {
    if text.trim().is_empty() {
        return Ok(Map::new());
    }
    let value: Value = serde_json::from_str(text).map_err(|e| {
        DispatchError::MalformedParameters(format!("`{name}` is not valid JSON: {e}"))
    })?;
    as_object(value, name)
}

fn as_object(value: Value, name: &str) -> DispatchResult<Map<String, Value>> {
    match value {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map),
        _ => Err(DispatchError::MalformedParameters(format!(
            "`{name}` must be a JSON object"
        ))),
    }
}
