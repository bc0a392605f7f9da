use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::describe::{DescribeError, DescriptionGenerator};
use super::domain::{PlayerId, PlayerSort, PlayerUpdate, PlayerView, SortKey, SortOrder};
use super::feed::StatsFeed;
use super::repository::{PlayerRepository, RepositoryError};
use super::service::{PlayerService, PlayerServiceError};

type SharedService<R, F, D> = Arc<PlayerService<R, F, D>>;

/// Router builder exposing the player API.
pub fn player_router<R, F, D>(service: SharedService<R, F, D>) -> Router
where
    R: PlayerRepository + 'static,
    F: StatsFeed + 'static,
    D: DescriptionGenerator + 'static,
{
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/players", get(list_handler::<R, F, D>))
        .route(
            "/api/players/:player_id",
            get(get_handler::<R, F, D>).put(update_handler::<R, F, D>),
        )
        .route(
            "/api/players/:player_id/description",
            post(describe_handler::<R, F, D>),
        )
        .route("/api/seed", post(seed_handler::<R, F, D>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

impl ListQuery {
    fn sort(&self) -> PlayerSort {
        PlayerSort::new(
            SortKey::parse(self.sort_by.as_deref()),
            SortOrder::parse(self.order.as_deref()),
        )
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DescribeQuery {
    #[serde(default)]
    pub refresh: bool,
}

pub(crate) async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

pub(crate) async fn list_handler<R, F, D>(
    State(service): State<SharedService<R, F, D>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<PlayerView>>, ApiError>
where
    R: PlayerRepository + 'static,
    F: StatsFeed + 'static,
    D: DescriptionGenerator + 'static,
{
    let Query(query) = query?;
    let sort = query.sort();
    let players = run_blocking(move || service.list(sort)).await?;
    Ok(Json(players.iter().map(|player| player.view()).collect()))
}

pub(crate) async fn get_handler<R, F, D>(
    State(service): State<SharedService<R, F, D>>,
    player_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<PlayerView>, ApiError>
where
    R: PlayerRepository + 'static,
    F: StatsFeed + 'static,
    D: DescriptionGenerator + 'static,
{
    let Path(player_id) = player_id?;
    let player = run_blocking(move || service.get(PlayerId(player_id))).await?;
    Ok(Json(player.view()))
}

pub(crate) async fn update_handler<R, F, D>(
    State(service): State<SharedService<R, F, D>>,
    player_id: Result<Path<i64>, PathRejection>,
    update: Result<Json<PlayerUpdate>, JsonRejection>,
) -> Result<Json<PlayerView>, ApiError>
where
    R: PlayerRepository + 'static,
    F: StatsFeed + 'static,
    D: DescriptionGenerator + 'static,
{
    let Path(player_id) = player_id?;
    let Json(update) = update?;
    let player = run_blocking(move || service.update(PlayerId(player_id), update)).await?;
    Ok(Json(player.view()))
}

pub(crate) async fn describe_handler<R, F, D>(
    State(service): State<SharedService<R, F, D>>,
    player_id: Result<Path<i64>, PathRejection>,
    query: Result<Query<DescribeQuery>, QueryRejection>,
) -> Result<Response, ApiError>
where
    R: PlayerRepository + 'static,
    F: StatsFeed + 'static,
    D: DescriptionGenerator + 'static,
{
    let Path(player_id) = player_id?;
    let Query(query) = query?;
    let player = service.describe(PlayerId(player_id), query.refresh).await?;
    let payload = json!({
        "id": player.id,
        "description": player.description,
    });
    Ok((StatusCode::OK, Json(payload)).into_response())
}

pub(crate) async fn seed_handler<R, F, D>(
    State(service): State<SharedService<R, F, D>>,
) -> Result<Response, ApiError>
where
    R: PlayerRepository + 'static,
    F: StatsFeed + 'static,
    D: DescriptionGenerator + 'static,
{
    let summary = service.seed().await?;
    let mut message = format!("Successfully seeded {} players", summary.seeded);
    if summary.skipped > 0 {
        message.push_str(&format!(
            " (skipped {} records without a player name)",
            summary.skipped
        ));
    }
    let payload = json!({
        "message": message,
        "seeded": summary.seeded,
        "skipped": summary.skipped,
        "guessed_fields": summary.guessed_fields,
    });
    Ok((StatusCode::OK, Json(payload)).into_response())
}

/// Runs a synchronous, storage-bound service call on the blocking pool.
async fn run_blocking<T, Op>(operation: Op) -> Result<T, ApiError>
where
    T: Send + 'static,
    Op: FnOnce() -> Result<T, PlayerServiceError> + Send + 'static,
{
    let outcome = tokio::task::spawn_blocking(operation)
        .await
        .map_err(|err| {
            ApiError::Service(PlayerServiceError::Repository(RepositoryError::Unavailable(
                format!("storage task failed: {err}"),
            )))
        })?;
    Ok(outcome?)
}

/// Error returned by the player handlers: either a service failure or a
/// request the extractors could not decode.
#[derive(Debug)]
pub enum ApiError {
    Service(PlayerServiceError),
    Rejected { status: StatusCode, message: String },
}

impl From<PlayerServiceError> for ApiError {
    fn from(value: PlayerServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::Rejected {
            status: value.status(),
            message: value.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(value: PathRejection) -> Self {
        Self::Rejected {
            status: value.status(),
            message: value.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        Self::Rejected {
            status: value.status(),
            message: value.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Service(err) => err.into_response(),
            ApiError::Rejected { status, message } => {
                tracing::debug!(%status, %message, "rejected player request");
                (status, Json(json!({ "error": message }))).into_response()
            }
        }
    }
}

impl PlayerServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PlayerServiceError::NotFound(_)
            | PlayerServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            PlayerServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PlayerServiceError::Describe(DescribeError::NotConfigured) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            PlayerServiceError::Feed(_) | PlayerServiceError::Describe(_) => StatusCode::BAD_GATEWAY,
            PlayerServiceError::Repository(RepositoryError::Unavailable(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for PlayerServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "player request failed");
        }

        let payload = json!({ "error": self.to_string() });
        (status, Json(payload)).into_response()
    }
}
