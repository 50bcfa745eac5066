//! holdover gateway entry point.
//!
//! Boot order mirrors the agent lifecycle: install the precache, activate
//! (pruning stale namespaces), and only then start serving intercepted
//! traffic. An install failure aborts startup, leaving whatever was
//! serving before untouched. Logging goes to stderr as JSON.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use holdover_client::{FetchClient, FetchConfig};
use holdover_core::policy::REFRESH_TAG;
use holdover_core::{AppConfig, CacheAgent, CacheDb};

mod control;
mod error;
mod gateway;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    tracing::info!(upstream = %config.upstream, bind = %config.bind_addr, "starting holdover gateway");

    let db = CacheDb::open(&config.db_path)
        .await
        .with_context(|| format!("failed to open cache at {}", config.db_path.display()))?;

    let client = Arc::new(
        FetchClient::new(FetchConfig {
            upstream: config.upstream.clone(),
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            ..Default::default()
        })
        .context("failed to build upstream client")?,
    );

    let agent = CacheAgent::new(db, client.clone());

    // Install must succeed before this version takes over; activate must
    // complete before the first intercepted request is served.
    let install = agent
        .install()
        .await
        .context("precache install failed, refusing to take over")?;
    tracing::info!(namespace = %install.namespace, entries = install.entries, "precache ready");

    let activation = agent.activate().await.context("activation failed")?;
    tracing::info!(removed = activation.removed.len(), "stale namespaces pruned");

    spawn_periodic_refresh(agent.clone(), config.refresh_interval());

    let app = gateway::router(gateway::GatewayState { agent, client });
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Recurring refresh of the api namespace, independent of page traffic.
/// Failures inside a run are already swallowed per endpoint.
fn spawn_periodic_refresh(agent: CacheAgent, period: std::time::Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // The first tick fires immediately; install just ran, skip it.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            agent.handle_periodic_sync(REFRESH_TAG).await;
        }
    });
}
