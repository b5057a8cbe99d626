mod backend;
mod config;
mod errors;
mod models;
mod notify;
mod pages;
mod routes;
mod search;
mod session;
mod state;
mod upload;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::backend::HttpBackend;
use crate::config::Config;
use crate::pages::Pages;
use crate::routes::build_router;
use crate::session::TabRegistry;
use crate::state::AppState;

/// How often idle tabs are swept.
const PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Job Tracker web v{}", env!("CARGO_PKG_VERSION"));

    // Backend client
    let backend = HttpBackend::new(
        &config.backend_url,
        &config.backend_api_prefix,
        config.request_timeout(),
    )?;
    info!(
        "Backend client initialized ({}{}, timeout {}s)",
        config.backend_url, config.backend_api_prefix, config.request_timeout_secs
    );

    let pages = Pages::new().context("Failed to compile page templates")?;
    let tabs = Arc::new(TabRegistry::default());
    spawn_tab_purge(Arc::clone(&tabs), config.tab_idle_timeout());

    let state = AppState {
        backend: Arc::new(backend),
        tabs,
        pages: Arc::new(pages),
        config: config.clone(),
    };

    let app = build_router(state).layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Drops tabs that have been idle longer than `max_idle`, once a minute.
fn spawn_tab_purge(tabs: Arc<TabRegistry>, max_idle: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            tabs.purge_idle(max_idle).await;
        }
    });
}
