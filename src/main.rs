use play_calendar::{
    AppState, LastFmClient, MonthCursor, Settings, load_counts_or_default, load_or_create_config,
    refresh::spawn_refresh_timer, router,
};
use std::net::SocketAddr;
use tokio::fs;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let settings = Settings::from_env();
    if let Some(parent) = settings.counts_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let config = load_or_create_config(&settings.config_path);
    if config.credentials().is_none() {
        info!(
            "no scrobble account configured; edit {} to enable fetching",
            settings.config_path.display()
        );
    }

    let counts = load_counts_or_default(&settings.counts_path).await;
    info!(days = counts.len(), "loaded play counts");

    let fetcher = LastFmClient::new(settings.api_base.clone())?;
    let state = AppState::new(
        settings.counts_path.clone(),
        counts,
        MonthCursor::current(),
        config,
        fetcher,
    );

    let timer = spawn_refresh_timer(state.clone(), settings.refresh_interval);

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    timer.abort();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
