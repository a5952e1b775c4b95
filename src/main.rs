use std::time::Duration;

use barkeep::{
    auth::{Audience, Authority, Issuer, KeyStore},
    config::Config,
    routes::{self, AppState},
    store::DrinkStore,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();

    // A bad key set source fails here, before the server starts listening.
    let keys = KeyStore::from_url(
        config.jwks_url.clone(),
        Duration::from_secs(config.jwks_timeout_secs),
    )
    .await?;
    keys.spawn_refresh(Duration::from_secs(config.jwks_refresh_secs));

    let authority = Authority::new(
        keys,
        Issuer::new(config.issuer),
        Audience::new(config.audience),
    );

    let app = routes::router(AppState {
        authority,
        store: DrinkStore::with_seed_data(),
    });

    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    tracing::info!(address = %config.listen, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutting down");
}
