use anyhow::{Context, Result};
use clap::Parser;
use convertrail_web::{AppState, ServerConfig, create_router};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::parse();
    let state = AppState::from_config(&config).context("failed to initialise game server")?;
    log::info!(
        "{} element(s) in catalog, sessions expire after {} min, at most {} kept",
        state.rules.catalog().len(),
        config.session_ttl_mins,
        config.max_sessions
    );

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    log::info!("Convertrail listening on http://{}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    log::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("failed to install CTRL+C handler: {err}");
        std::future::pending::<()>().await;
    }
}
