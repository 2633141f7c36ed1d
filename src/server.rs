mod error;
mod routes;
mod state;
mod views;

use std::sync::Arc;

pub use error::ServerError;
use state::AppState;

use crate::config::store::AppConfig;

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(&config)?);

    // The app stays up when the vector database is unreachable; requests
    // that need it will surface the failure themselves.
    match state.rag.health_check().await {
        Ok(()) => log::info!("vector database ready"),
        Err(why) => log::warn!("vector database health check failed: {why:?}"),
    }

    let app = routes::router(Arc::clone(&state));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(why) = tokio::signal::ctrl_c().await {
        log::warn!("failed to install ctrl-c handler: {why}");
    }
}
