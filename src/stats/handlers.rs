use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{info, instrument};

use super::{LivestreamStatistics, UserStatistics};
use crate::shared::{AppError, AppState};

/// HTTP handler for a user's statistics
///
/// GET /api/user/:username/statistics
#[instrument(name = "get_user_statistics", skip(state))]
pub async fn get_user_statistics(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserStatistics>, AppError> {
    info!(username = %username, "Computing user statistics");

    let stats = state
        .stats_service
        .compute_user_statistics(&username)
        .await?;

    Ok(Json(stats))
}

/// HTTP handler for a livestream's statistics
///
/// GET /api/livestream/:livestream_id/statistics
#[instrument(name = "get_livestream_statistics", skip(state))]
pub async fn get_livestream_statistics(
    State(state): State<AppState>,
    Path(livestream_id): Path<String>,
) -> Result<Json<LivestreamStatistics>, AppError> {
    let livestream_id: i64 = livestream_id.parse().map_err(|_| {
        AppError::BadRequest("livestream_id in path must be integer".to_string())
    })?;

    info!(livestream_id, "Computing livestream statistics");

    let stats = state
        .stats_service
        .compute_livestream_statistics(livestream_id)
        .await?;

    Ok(Json(stats))
}
