use std::net::SocketAddr;

use axum::extract::Request;
use color_eyre::eyre::WrapErr as _;
use sentry_tower::{NewSentryLayer, SentryHttpLayer};
use tower::ServiceBuilder;
use tracing::info;

use birdgate::{
    routes,
    setup::{setup_sentry, setup_tracing},
    state::AppState,
};

const DEFAULT_PORT: u16 = 3000;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // Initialize Sentry for error tracking
    let _sentry_guard = setup_sentry();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async { run_application().await })
}

async fn run_application() -> color_eyre::Result<()> {
    setup_tracing("birdgate")?;

    let app_state = AppState::from_env()?;
    info!(config = ?app_state.x_oauth, "Loaded X OAuth configuration");

    let app = routes::routes(app_state).layer(
        ServiceBuilder::new()
            .layer(NewSentryLayer::<Request>::new_from_top())
            .layer(SentryHttpLayer::with_transaction()),
    );

    let port = port_from_env()?;
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("Failed to bind to {addr}"))?;

    info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

fn port_from_env() -> color_eyre::Result<u16> {
    std::env::var("PORT")
        .map(|port| port.parse().wrap_err("PORT must be a valid port number"))
        .unwrap_or(Ok(DEFAULT_PORT))
}
