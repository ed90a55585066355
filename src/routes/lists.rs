use axum::extract::State;
use axum::Json;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::AppError;
use crate::models::stats::StatsScope;
use crate::state::AppState;
use crate::stats::{clusters, query};

/// Cluster groups → clusters → neighbourhoods, as found in the neighbourhood table.
pub async fn neighbourhood_list(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, BTreeMap<String, BTreeSet<String>>>>, AppError> {
    let table = state.stats.table(StatsScope::Neighbourhood).await?;
    Ok(Json(query::neighbourhoods_by_group(&table.rows)))
}

/// Cluster groups → clusters.
pub async fn cluster_list() -> Json<BTreeMap<&'static str, BTreeSet<&'static str>>> {
    Json(clusters::clusters_by_group())
}
