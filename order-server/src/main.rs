use std::net::SocketAddr;

use order_server::{Config, ServerState, api, utils};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    utils::logger::init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());

    tracing::info!("Order server starting...");

    let shutdown = CancellationToken::new();
    let state = ServerState::initialize(&config, shutdown.clone()).await?;
    let app = api::build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Shutdown signal received");
            shutdown.cancel();
        })
        .await?;

    Ok(())
}
