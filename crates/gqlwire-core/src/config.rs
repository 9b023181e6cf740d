//! gqlwire.toml configuration parser.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Default request body limit (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    pub graphql: GraphqlConfig,
    pub explorer: ExplorerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 4000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphqlConfig {
    /// Route the GraphQL endpoint is mounted at.
    pub path: String,
    pub max_body_bytes: usize,
}

impl Default for GraphqlConfig {
    fn default() -> Self {
        Self {
            path: "/graphql".to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// When false, browser navigations are treated as API calls.
    pub enabled: bool,
    pub title: String,
    pub default_query: Option<String>,
    pub headers_editor: bool,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            title: "GraphQL Explorer".to_string(),
            default_query: None,
            headers_editor: true,
        }
    }
}

impl GatewayConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: GatewayConfig = toml::from_str(content).context("invalid gqlwire config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.host, self.server.port)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !self.graphql.path.starts_with('/') {
            anyhow::bail!("graphql.path must start with '/': {}", self.graphql.path);
        }
        if self.graphql.max_body_bytes == 0 {
            anyhow::bail!("graphql.max_body_bytes must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = GatewayConfig::from_toml_str("").unwrap();
        assert_eq!(config.graphql.path, "/graphql");
        assert_eq!(config.graphql.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert!(config.explorer.enabled);
        assert_eq!(config.bind_addr().to_string(), "127.0.0.1:4000");
    }

    #[test]
    fn parse_full() {
        let toml_str = r#"
[server]
host = "0.0.0.0"
port = 8080

[graphql]
path = "/api/graphql"
max_body_bytes = 2048

[explorer]
enabled = false
title = "My API"
default_query = "{ ping }"
headers_editor = false
"#;
        let config = GatewayConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.graphql.path, "/api/graphql");
        assert_eq!(config.graphql.max_body_bytes, 2048);
        assert!(!config.explorer.enabled);
        assert_eq!(config.explorer.title, "My API");
        assert_eq!(config.explorer.default_query.as_deref(), Some("{ ping }"));
        assert!(!config.explorer.headers_editor);
    }

    #[test]
    fn relative_path_is_rejected() {
        let err = GatewayConfig::from_toml_str("[graphql]\npath = \"graphql\"\n").unwrap_err();
        assert!(err.to_string().contains("must start with '/'"));
    }

    #[test]
    fn roundtrips_through_toml() {
        let config = GatewayConfig::default();
        let text = config.to_toml_string().unwrap();
        let parsed = GatewayConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed.graphql.path, config.graphql.path);
        assert_eq!(parsed.server.port, config.server.port);
    }
}
