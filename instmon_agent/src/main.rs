//! instmon_agent entrypoint: instance API on one port, metric stream on another.

use std::net::SocketAddr;

use anyhow::Context;
use instmon_agent::{
    api,
    config::{AgentConfig, RunMode},
    error::ConfigError,
    state::AppState,
    store::InstanceStore,
    ws,
};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(mode: RunMode) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(mode.default_log_filter()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match mode {
        RunMode::Development => builder.with_target(true).init(),
        RunMode::Production => builder.compact().with_ansi(false).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match AgentConfig::from_args_and_env(std::env::args(), |k| std::env::var(k).ok()) {
        Ok(c) => c,
        Err(ConfigError::Help(usage)) => {
            println!("{usage}");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    init_tracing(config.mode);

    let store = InstanceStore::open(&config.db_path)
        .with_context(|| format!("opening {}", config.db_path.display()))?;
    let state = AppState::new(store);

    let api_addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let stream_addr = SocketAddr::from(([0, 0, 0, 0], config.stream_port));
    let api_listener = tokio::net::TcpListener::bind(api_addr)
        .await
        .with_context(|| format!("binding {api_addr}"))?;
    let stream_listener = tokio::net::TcpListener::bind(stream_addr)
        .await
        .with_context(|| format!("binding {stream_addr}"))?;
    info!(
        mode = ?config.mode,
        "instance API on http://{}, metric stream on ws://{}",
        api_listener.local_addr()?,
        stream_listener.local_addr()?
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let registry = state.registry.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("ctrl-c handler failed: {e}");
            return;
        }
        info!("shutting down");
        registry.shutdown();
        shutdown_tx.send_replace(true);
    });

    let wait = |mut rx: watch::Receiver<bool>| async move {
        let _ = rx.wait_for(|v| *v).await;
    };

    let api_server = axum::serve(api_listener, api::router(state.clone()))
        .with_graceful_shutdown(wait(shutdown_rx.clone()));
    let stream_server = axum::serve(stream_listener, ws::router(state))
        .with_graceful_shutdown(wait(shutdown_rx));

    tokio::try_join!(
        async { api_server.await.context("instance API server") },
        async { stream_server.await.context("metric stream server") },
    )?;
    Ok(())
}
