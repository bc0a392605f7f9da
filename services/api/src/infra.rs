use ballpark::config::AppConfig;
use ballpark::error::AppError;
use ballpark::players::{GeminiDescriber, HttpStatsFeed, PlayerService, SqlitePlayerRepository};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type LivePlayerService =
    PlayerService<SqlitePlayerRepository, HttpStatsFeed, GeminiDescriber>;

/// Wires the SQLite store, the HTTP stats feed, and the Gemini client from
/// configuration.
pub(crate) fn build_player_service(config: &AppConfig) -> Result<Arc<LivePlayerService>, AppError> {
    let repository = if config.database.is_in_memory() {
        SqlitePlayerRepository::open_in_memory()?
    } else {
        SqlitePlayerRepository::open(&config.database.path)?
    };
    info!(path = %config.database.path.display(), "opened player database");

    let feed = HttpStatsFeed::new(&config.feed)?;
    let describer = GeminiDescriber::new(config.description.clone())?;
    if !describer.is_configured() {
        info!("GEMINI_API_KEY not set; description endpoint will report unavailable");
    }

    Ok(Arc::new(PlayerService::new(
        Arc::new(repository),
        Arc::new(feed),
        Arc::new(describer),
    )))
}
