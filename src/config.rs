use std::path::PathBuf;
use std::time::Duration;

use crate::live::heartbeat::{Heartbeat, HEARTBEAT_INTERVAL, HEARTBEAT_TIMEOUT};

/// Location of one source table inside a spreadsheet document.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetConfig {
    pub sheet_id: String,
    pub tab: String,
}

impl SheetConfig {
    fn from_env(id_var: &str, tab_var: &str) -> Option<Self> {
        let sheet_id = non_empty_var(id_var)?;
        let tab = non_empty_var(tab_var)?;
        Some(Self { sheet_id, tab })
    }
}

pub struct Config {
    pub port: u16,
    pub static_dir: PathBuf,
    pub join_timeout: Duration,
    pub heartbeat: Heartbeat,
    pub sheets_api_base: String,
    pub sheets_api_key: Option<String>,
    pub neighbourhood_sheet: Option<SheetConfig>,
    pub cluster_sheet: Option<SheetConfig>,
}

impl Config {
    pub fn from_env() -> Self {
        let join_timeout_secs: u64 = std::env::var("LIVE_JOIN_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(30);
        let heartbeat = Heartbeat {
            interval: secs_var("LIVE_HEARTBEAT_INTERVAL_SECS").unwrap_or(HEARTBEAT_INTERVAL),
            timeout: secs_var("LIVE_HEARTBEAT_TIMEOUT_SECS").unwrap_or(HEARTBEAT_TIMEOUT),
        };

        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            static_dir: std::env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./static")),
            join_timeout: Duration::from_secs(join_timeout_secs),
            heartbeat,
            sheets_api_base: non_empty_var("SHEETS_API_BASE")
                .unwrap_or_else(|| "https://sheets.googleapis.com".to_string()),
            sheets_api_key: non_empty_var("SHEETS_API_KEY"),
            neighbourhood_sheet: SheetConfig::from_env("NBHD_SHEET_ID", "NBHD_SOURCE_TAB"),
            cluster_sheet: SheetConfig::from_env("CLUSTER_SHEET_ID", "CLUSTER_SOURCE_TAB"),
        }
    }
}

/// A positive whole number of seconds.
fn secs_var(name: &str) -> Option<Duration> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
