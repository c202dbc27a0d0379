// src/main.rs
use anyhow::{Context, Result};
use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use serde::Deserialize;
use std::{net::SocketAddr, sync::Arc};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod absence;
mod day_view;
mod grid;
mod plan;
mod roster;
mod server;
mod store;

#[cfg(test)]
mod day_view_tests;
#[cfg(test)]
mod roster_tests;

const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Environment configuration, read from SCHICHTPLAN_* variables.
#[derive(Debug, Deserialize, Default)]
struct EnvConfig {
    bind: Option<String>,
    cert_path: Option<String>,
    key_path: Option<String>,
}

#[derive(Parser, Debug)]
#[command(name = "schichtplan-core", about = "Shift plan and absence backend")]
struct Args {
    /// Bind address, e.g. 127.0.0.1:3000 (overrides SCHICHTPLAN_BIND)
    #[arg(long)]
    bind: Option<String>,
    /// TLS certificate PEM path (overrides SCHICHTPLAN_CERT_PATH)
    #[arg(long)]
    cert: Option<String>,
    /// TLS key PEM path (overrides SCHICHTPLAN_KEY_PATH)
    #[arg(long)]
    key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    info!("Tracing subscriber initialized.");

    let args = Args::parse();
    let env_config: EnvConfig = envy::prefixed("SCHICHTPLAN_")
        .from_env()
        .context("Reading SCHICHTPLAN_* environment configuration failed")?;

    let bind = args
        .bind
        .or(env_config.bind)
        .unwrap_or_else(|| DEFAULT_BIND.to_string());
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", bind))?;
    let cert = args.cert.or(env_config.cert_path);
    let key = args.key.or(env_config.key_path);

    // The store is owned here and injected into the services; there is no
    // ambient global connection state.
    let store = Arc::new(store::PlanStore::new());
    let state = server::AppState::new(store);
    let app = server::router(state);
    info!("Application state initialized.");

    match (cert, key) {
        (Some(cert), Some(key)) => {
            let tls_config = RustlsConfig::from_pem_file(&cert, &key)
                .await
                .context("Failed to load TLS cert/key")?;
            info!("Starting server on https://{}", addr);
            axum_server::bind_rustls(addr, tls_config)
                .serve(app.into_make_service())
                .await
                .context("HTTPS server failed")?;
        }
        _ => {
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            info!("Starting server on http://{}", addr);
            axum::serve(listener, app)
                .await
                .context("HTTP server failed")?;
        }
    }

    Ok(())
}
