#![allow(dead_code)]

use chartstats::config::SheetConfig;
use chartstats::live::heartbeat::Heartbeat;
use chartstats::live::registry::SessionRegistry;
use chartstats::routes;
use chartstats::state::AppState;
use chartstats::stats::sheets::SheetsClient;
use chartstats::stats::StatsStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub const INDEX_HTML: &str = "<!doctype html><title>chart</title>";

/// A fresh static directory holding an `index.html` and one script.
pub fn temp_static_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("chartstats-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("failed to create static dir");
    std::fs::write(dir.join("index.html"), INDEX_HTML).expect("failed to write index.html");
    std::fs::write(dir.join("app.js"), "console.log('chart');").expect("failed to write app.js");
    dir
}

/// State with no spreadsheet sources configured.
pub fn test_state() -> AppState {
    state_with_store(StatsStore::new(
        SheetsClient::new("http://127.0.0.1:1".to_string()),
        None,
        None,
    ))
}

/// State whose sources point at `sheets_base` (e.g. a fake Sheets API).
pub fn test_state_with_sources(sheets_base: &str) -> AppState {
    state_with_store(StatsStore::new(
        SheetsClient::new(sheets_base.to_string()).with_api_key("test-key".to_string()),
        Some(SheetConfig {
            sheet_id: "nbhd-sheet".to_string(),
            tab: "Nbhd Stats".to_string(),
        }),
        Some(SheetConfig {
            sheet_id: "cluster-sheet".to_string(),
            tab: "Clusters".to_string(),
        }),
    ))
}

pub fn state_with_store(store: StatsStore) -> AppState {
    AppState {
        live: Arc::new(SessionRegistry::new()),
        stats: Arc::new(store),
        static_dir: temp_static_dir(),
        join_timeout: Duration::from_secs(2),
        heartbeat: Heartbeat::default(),
    }
}

pub fn test_app() -> axum::Router {
    routes::router(test_state())
}

/// Bind on port 0, serve `app` in the background, and return `host:port`.
pub async fn spawn(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("127.0.0.1:{}", addr.port())
}
