pub mod clusters;
pub mod query;
pub mod reshape;
pub mod sheets;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::SheetConfig;
use crate::error::AppError;
use crate::models::stats::{Activity, SourceInfo, StatsScope, StatsType};
use sheets::SheetsClient;

/// One area's figures for one period.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsRow {
    pub group: String,
    pub cluster: String,
    /// Empty for cluster-scope rows.
    pub neighbourhood: String,
    pub date: NaiveDate,
    /// nDG, pDG, nCC, pCC, nJY, pJY, nSC, pSC.
    pub counts: [Option<u32>; 8],
}

impl StatsRow {
    pub fn area_name(&self, scope: StatsScope) -> &str {
        match scope {
            StatsScope::Cluster => &self.cluster,
            StatsScope::Neighbourhood => &self.neighbourhood,
        }
    }

    pub fn has_data(&self) -> bool {
        self.counts.iter().any(Option::is_some)
    }

    /// Sum of the selected activities' counts, or None if none of them has a
    /// value. A present zero still yields `Some(0)`.
    pub fn data_point(&self, activities: &HashSet<Activity>, kind: StatsType) -> Option<u64> {
        Activity::ALL
            .iter()
            .filter(|activity| activities.contains(*activity))
            .filter_map(|activity| self.counts[2 * activity.index() + kind.offset()])
            .fold(None, |sum, value| Some(sum.unwrap_or(0) + u64::from(value)))
    }
}

#[derive(Debug, Clone)]
pub struct StatsTable {
    pub rows: Vec<StatsRow>,
    pub source: SourceInfo,
}

impl StatsTable {
    fn unconfigured() -> Self {
        Self {
            rows: Vec::new(),
            source: SourceInfo {
                title: String::new(),
                url: String::new(),
                last_pulled: Utc::now(),
            },
        }
    }
}

/// A source spreadsheet and the last table pulled from it.
struct SourceSlot {
    sheet: Option<SheetConfig>,
    table: ArcSwapOption<StatsTable>,
    refresh: Mutex<()>,
}

impl SourceSlot {
    fn new(sheet: Option<SheetConfig>) -> Self {
        Self {
            sheet,
            table: ArcSwapOption::empty(),
            refresh: Mutex::new(()),
        }
    }
}

/// Cached statistics tables, one per scope.
///
/// Tables are fetched on first use and replaced wholesale on refresh;
/// readers keep whatever snapshot they loaded.
pub struct StatsStore {
    sheets: SheetsClient,
    neighbourhood: SourceSlot,
    cluster: SourceSlot,
}

impl StatsStore {
    pub fn new(
        sheets: SheetsClient,
        neighbourhood: Option<SheetConfig>,
        cluster: Option<SheetConfig>,
    ) -> Self {
        Self {
            sheets,
            neighbourhood: SourceSlot::new(neighbourhood),
            cluster: SourceSlot::new(cluster),
        }
    }

    fn slot(&self, scope: StatsScope) -> &SourceSlot {
        match scope {
            StatsScope::Cluster => &self.cluster,
            StatsScope::Neighbourhood => &self.neighbourhood,
        }
    }

    /// Current table for `scope`, pulling it from the source on first use.
    pub async fn table(&self, scope: StatsScope) -> Result<Arc<StatsTable>, AppError> {
        let slot = self.slot(scope);
        if let Some(table) = slot.table.load_full() {
            return Ok(table);
        }

        let _guard = slot.refresh.lock().await;
        // Another request may have loaded it while we waited.
        if let Some(table) = slot.table.load_full() {
            return Ok(table);
        }
        let table = Arc::new(self.pull(scope, slot).await?);
        slot.table.store(Some(Arc::clone(&table)));
        Ok(table)
    }

    /// Re-pull `scope` from its source and return the new pull timestamp.
    pub async fn refresh(&self, scope: StatsScope) -> Result<DateTime<Utc>, AppError> {
        let slot = self.slot(scope);
        let _guard = slot.refresh.lock().await;
        let table = self.pull(scope, slot).await?;
        let last_pulled = table.source.last_pulled;
        slot.table.store(Some(Arc::new(table)));
        Ok(last_pulled)
    }

    /// Replace the cached table for `scope` without touching the source.
    #[cfg(test)]
    fn load(&self, scope: StatsScope, table: StatsTable) {
        self.slot(scope).table.store(Some(Arc::new(table)));
    }

    async fn pull(&self, scope: StatsScope, slot: &SourceSlot) -> Result<StatsTable, AppError> {
        let Some(ref sheet) = slot.sheet else {
            tracing::error!(
                scope = scope.as_str(),
                "source sheet id and/or tab are not configured, serving an empty table"
            );
            return Ok(StatsTable::unconfigured());
        };

        tracing::info!(scope = scope.as_str(), "retrieving fresh data from source");
        let values = self.sheets.fetch_values(sheet).await?;
        let title = self.sheets.fetch_title(sheet).await?;
        let rows = match scope {
            StatsScope::Cluster => reshape::reshape_cluster(&values),
            StatsScope::Neighbourhood => reshape::reshape_neighbourhood(&values),
        };
        tracing::info!(scope = scope.as_str(), rows = rows.len(), "source data loaded");

        Ok(StatsTable {
            rows,
            source: SourceInfo {
                title,
                url: SheetsClient::document_url(sheet),
                last_pulled: Utc::now(),
            },
        })
    }
}
