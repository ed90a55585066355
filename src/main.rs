use std::sync::Arc;
use tokio::net::TcpListener;

use chartstats::config::Config;
use chartstats::live::registry::SessionRegistry;
use chartstats::models::stats::StatsScope;
use chartstats::state::AppState;
use chartstats::stats::sheets::SheetsClient;
use chartstats::stats::StatsStore;

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| {
            let level = std::env::var("LOG_LEVEL")
                .unwrap_or_else(|_| "info".to_string())
                .to_lowercase();
            tracing_subscriber::EnvFilter::try_new(format!("chartstats={level},tower_http={level}"))
        })
        .unwrap_or_else(|_| "chartstats=info,tower_http=info".into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    let config = Config::from_env();
    print_banner(&config);

    let mut sheets = SheetsClient::new(config.sheets_api_base.clone());
    if let Some(ref key) = config.sheets_api_key {
        sheets = sheets.with_api_key(key.clone());
    }
    let stats = Arc::new(StatsStore::new(
        sheets,
        config.neighbourhood_sheet.clone(),
        config.cluster_sheet.clone(),
    ));

    // Warm both tables so the first chart request does not wait on the source.
    for scope in [StatsScope::Neighbourhood, StatsScope::Cluster] {
        if let Err(e) = stats.table(scope).await {
            tracing::warn!(scope = scope.as_str(), "initial data load failed: {:?}", e);
        }
    }

    let state = AppState {
        live: Arc::new(SessionRegistry::new()),
        stats,
        static_dir: config.static_dir.clone(),
        join_timeout: config.join_timeout,
        heartbeat: config.heartbeat,
    };

    let app = chartstats::routes::router(state);

    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .expect("failed to bind");

    let actual_port = listener
        .local_addr()
        .expect("failed to get local address")
        .port();
    tracing::info!("server setup complete");
    eprintln!("  \x1b[32m→ listening on 0.0.0.0:{actual_port}\x1b[0m");
    eprintln!();

    axum::serve(listener, app).await.expect("server error");
}

fn print_banner(config: &Config) {
    let version = env!("CARGO_PKG_VERSION");
    let describe = |sheet: &Option<chartstats::config::SheetConfig>| match sheet {
        Some(s) => format!("{} ({})", s.sheet_id, s.tab),
        None => "not configured".to_string(),
    };

    eprintln!();
    eprintln!("  \x1b[1;36mchartstats\x1b[0m \x1b[2mv{version}\x1b[0m");
    eprintln!();
    eprintln!("  \x1b[2mport\x1b[0m          {}", config.port);
    eprintln!("  \x1b[2mstatic\x1b[0m        {}", config.static_dir.display());
    eprintln!("  \x1b[2mneighbourhood\x1b[0m {}", describe(&config.neighbourhood_sheet));
    eprintln!("  \x1b[2mcluster\x1b[0m       {}", describe(&config.cluster_sheet));
    eprintln!();
}
