mod health;
mod lists;
mod stats;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let index = ServeFile::new(state.static_dir.join("index.html"));
    let static_files = ServeDir::new(&state.static_dir);

    Router::new()
        .route_service("/", index)
        .route("/health", get(health::health))
        .route("/version", get(health::version))
        .route("/live", get(crate::live::ws_upgrade))
        .route("/list/cluster", get(lists::cluster_list))
        .route("/list/neighbourhood", get(lists::neighbourhood_list))
        .route(
            "/stats",
            post(stats::request_stats).delete(stats::refresh_stats),
        )
        .nest_service("/static", static_files)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
