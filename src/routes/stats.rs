use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::models::stats::{RefreshResponse, StatsRequest, StatsResponse, StatsScope};
use crate::state::AppState;
use crate::stats::query;

pub async fn request_stats(
    State(state): State<AppState>,
    Json(body): Json<StatsRequest>,
) -> Result<Json<StatsResponse>, AppError> {
    let table = state.stats.table(body.scope).await?;
    let data = query::query(&table.rows, &body);
    Ok(Json(StatsResponse {
        source: table.source.clone(),
        data,
    }))
}

/// Re-pull both source tables. Blocks until the new data is in place.
pub async fn refresh_stats(
    State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, AppError> {
    let neighbourhood = state.stats.refresh(StatsScope::Neighbourhood).await?;
    let cluster = state.stats.refresh(StatsScope::Cluster).await?;
    Ok(Json(RefreshResponse {
        neighbourhood,
        cluster,
    }))
}
