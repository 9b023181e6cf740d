//! gqlwire-explorer — the interactive query page served to browsers.
//!
//! Rendered with an Askama template. Every option is written into HTML
//! data attributes and read back by the page script, so template escaping
//! is the only escaping needed.

use askama::Template;
use axum::response::Html;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Options for rendering the explorer page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorerOptions {
    pub title: String,
    /// URL the page sends operations to.
    pub endpoint: String,
    pub subscriptions_endpoint: Option<String>,
    pub default_query: Option<String>,
    pub headers_editor: bool,
}

impl Default for ExplorerOptions {
    fn default() -> Self {
        Self {
            title: "GraphQL Explorer".to_string(),
            endpoint: "/graphql".to_string(),
            subscriptions_endpoint: None,
            default_query: None,
            headers_editor: true,
        }
    }
}

#[derive(Template)]
#[template(path = "explorer.html")]
struct ExplorerTemplate<'a> {
    title: &'a str,
    endpoint: &'a str,
    subscriptions_endpoint: &'a str,
    default_query: &'a str,
    headers_editor: bool,
}

/// Render the explorer page to HTML text.
pub fn render_explorer_page(options: &ExplorerOptions) -> String {
    let tmpl = ExplorerTemplate {
        title: &options.title,
        endpoint: &options.endpoint,
        subscriptions_endpoint: options.subscriptions_endpoint.as_deref().unwrap_or_default(),
        default_query: options.default_query.as_deref().unwrap_or_default(),
        headers_editor: options.headers_editor,
    };
    tmpl.render().unwrap_or_else(|e| {
        error!(error = %e, "explorer template failed to render");
        format!("<pre>Template error: {e}</pre>")
    })
}

/// The explorer page as an axum `text/html` response.
pub fn explorer_page(options: &ExplorerOptions) -> Html<String> {
    Html(render_explorer_page(options))
}

#[cfg(test)]
mod tests {
    use axum::response::IntoResponse;

    use super::*;

    #[test]
    fn renders_options_into_page() {
        let options = ExplorerOptions {
            title: "Users API".to_string(),
            endpoint: "/api/graphql".to_string(),
            subscriptions_endpoint: Some("/api/graphql".to_string()),
            default_query: Some("{ ping }".to_string()),
            headers_editor: false,
        };
        let html = render_explorer_page(&options);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Users API</title>"));
        assert!(html.contains(r#"data-endpoint="/api/graphql""#));
        assert!(html.contains(r#"data-default-query="{ ping }""#));
        assert!(html.contains(r#"data-headers-editor="false""#));
    }

    #[test]
    fn escapes_untrusted_values() {
        let options = ExplorerOptions {
            title: "<script>alert(1)</script>".to_string(),
            default_query: Some(r#"{ user(name: "x") { id } }"#.to_string()),
            ..ExplorerOptions::default()
        };
        let html = render_explorer_page(&options);
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains(r#"name: "x""#));
    }

    #[test]
    fn default_options_render() {
        let html = render_explorer_page(&ExplorerOptions::default());
        assert!(html.contains("<title>GraphQL Explorer</title>"));
        assert!(html.contains(r#"data-subscriptions-endpoint="""#));
    }

    #[test]
    fn html_response_content_type() {
        let response = explorer_page(&ExplorerOptions::default()).into_response();
        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers()["content-type"],
            "text/html; charset=utf-8"
        );
    }
}
