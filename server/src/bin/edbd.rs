use anyhow::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use edb_core::{FetcherSupervisor, TracingLogger};
use edb_github::GithubClient;
use edb_server::{Assets, Config, EventsServer};
use edb_storage_sled::SledEventStore;

/// Cancels `shutdown` on Ctrl-C or SIGTERM
fn setup_shutdown_signal(shutdown: CancellationToken) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!("failed to listen for SIGTERM: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("received Ctrl+C, shutting down"),
            _ = terminate => info!("received SIGTERM, shutting down"),
        }

        shutdown.cancel();
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    info!("starting up...");

    let store = Arc::new(SledEventStore::with_path(&config.data_path)?);
    let source = Arc::new(GithubClient::new(&config.github_api_url, config.access_token.clone()));

    let supervisor = FetcherSupervisor::new(source, store.clone(), Arc::new(TracingLogger)).with_interval(config.poll_interval);
    supervisor.start(&config.usernames);

    let shutdown = CancellationToken::new();
    setup_shutdown_signal(shutdown.clone());

    // the server returns once shutdown is signalled, or immediately if it cannot bind
    let served = EventsServer::new(store.clone(), Assets::new(config.local_assets)).run(&config.bind_address, shutdown).await;

    // fetchers must be gone before the store closes underneath them
    supervisor.shutdown().await;
    store.close()?;
    info!("shut down");

    served
}
