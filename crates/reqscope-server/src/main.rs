//! reqscope server
//!
//! - Instrumented demo routes: `/`, `/work?ms=N`, `/fail`
//! - Prometheus scrape endpoint: `/metrics`
//! - One structured log line per request on stdout

use reqscope_core::log;
use reqscope_server::{app_state::AppState, config, router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Misconfiguration stops here, before anything is served.
    let cfg = config::load_from_env()?;
    let level = config::log_level_from_env(&cfg)?;
    let listen = cfg.server.listen_addr()?;

    // Lossy writer: a stalled stdout drops lines instead of stalling requests.
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stdout());
    tracing::subscriber::set_global_default(log::subscriber(level, writer))?;

    let state = AppState::new(cfg)?;
    let app = router::build_router(state);

    tracing::info!(%listen, log_level = %level, "reqscope-server starting");
    let listener = tokio::net::TcpListener::bind(listen).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
