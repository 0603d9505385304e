use std::{env, io};

use event_time::IcsSettings;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::EnvFilter;

mod cache;
mod cli;
mod error;
mod server;
mod upstream;

use crate::server::{router, AppState};
use crate::upstream::Upstream;

#[tokio::main]
async fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("event_proxy=info")),
        )
        .with_target(true)
        .init();

    let args = cli::parse(env::args().collect());

    let upstream = match Upstream::new(args.upstream.clone(), args.api_key.clone()) {
        Ok(upstream) => upstream,
        Err(err) => {
            tracing::error!(error = %err, "failed to build event api client");
            return Err(io::Error::new(io::ErrorKind::Other, err));
        }
    };

    let settings = IcsSettings {
        zone: args.zone,
        ..IcsSettings::default()
    };

    let state = AppState::new(
        upstream,
        settings,
        cache::Config {
            enabled: args.enable_cache,
            ttl: args.cache_ttl,
        },
    );

    tracing::info!(
        upstream = %args.upstream,
        zone = %args.zone,
        cache = args.enable_cache,
        "configured"
    );

    let listener = TcpListener::bind(args.address).await?;
    tracing::info!("Listening at http://{}", args.address);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutting down");
}
