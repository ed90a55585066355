use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::live::heartbeat::Heartbeat;
use crate::live::registry::SessionRegistry;
use crate::stats::StatsStore;

#[derive(Clone)]
pub struct AppState {
    pub live: Arc<SessionRegistry>,
    pub stats: Arc<StatsStore>,
    pub static_dir: PathBuf,
    pub join_timeout: Duration,
    pub heartbeat: Heartbeat,
}
