//! gqlwired — the gqlwire daemon.
//!
//! Serves the GraphQL endpoint (explorer page, single responses,
//! event streams and multipart incremental delivery) backed by the
//! built-in demo engine.
//!
//! # Usage
//!
//! ```text
//! gqlwired serve --config gqlwire.toml --port 4000
//! gqlwired config --config gqlwire.toml
//! ```

mod demo;

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use gqlwire_core::GatewayConfig;

use crate::demo::DemoEngine;

#[derive(Parser)]
#[command(name = "gqlwired", about = "GraphQL over HTTP gateway daemon")]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the GraphQL endpoint.
    Serve {
        /// Path to a gqlwire.toml file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Address to bind, overriding `server.host`.
        #[arg(long)]
        host: Option<IpAddr>,

        /// Port to listen on, overriding `server.port`.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the effective configuration as TOML.
    Config {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.command {
        Command::Serve { config, host, port } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await
        }
        Command::Config { config } => {
            let config = load_config(config.as_deref())?;
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

/// Used when `RUST_LOG` is unset. `gqlwire` matches every `gqlwire_*` target.
const DEFAULT_LOG_FILTER: &str = "info,gqlwired=debug,gqlwire=debug";

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<GatewayConfig> {
    match path {
        Some(path) => GatewayConfig::from_file(path),
        None => Ok(GatewayConfig::default()),
    }
}

async fn serve(config: GatewayConfig) -> anyhow::Result<()> {
    let addr = config.bind_addr();
    let router = gqlwire_api::build_router(&config, Arc::new(DemoEngine));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, path = %config.graphql.path, explorer = config.explorer.enabled, "gqlwired listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("shutdown signal received");
        })
        .await
        .context("server error")?;

    info!("gqlwired stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_log_filter_parses() {
        let filter = EnvFilter::try_new(DEFAULT_LOG_FILTER).unwrap();
        let rendered = filter.to_string();
        assert!(rendered.contains("gqlwire=debug"));
        assert!(rendered.contains("gqlwired=debug"));
    }
}
