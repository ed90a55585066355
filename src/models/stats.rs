use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Core activity types, in the column order used by the source tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    Dg,
    Cc,
    Jy,
    Sc,
}

impl Activity {
    pub const ALL: [Activity; 4] = [Activity::Dg, Activity::Cc, Activity::Jy, Activity::Sc];

    /// Position of this activity's column pair within a row's counts.
    pub fn index(self) -> usize {
        match self {
            Activity::Dg => 0,
            Activity::Cc => 1,
            Activity::Jy => 2,
            Activity::Sc => 3,
        }
    }
}

/// Whether to count activities or participants. Sent as `0` or `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum StatsType {
    NumActivities,
    NumParticipants,
}

impl StatsType {
    pub fn offset(self) -> usize {
        match self {
            StatsType::NumActivities => 0,
            StatsType::NumParticipants => 1,
        }
    }
}

impl TryFrom<u8> for StatsType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(StatsType::NumActivities),
            1 => Ok(StatsType::NumParticipants),
            other => Err(format!("invalid stats_type: {other}")),
        }
    }
}

impl From<StatsType> for u8 {
    fn from(value: StatsType) -> Self {
        value.offset() as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatsScope {
    Cluster,
    Neighbourhood,
}

impl StatsScope {
    pub fn as_str(self) -> &'static str {
        match self {
            StatsScope::Cluster => "cluster",
            StatsScope::Neighbourhood => "neighbourhood",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub title: String,
    pub url: String,
    /// When the data was last pulled from the source (UTC).
    pub last_pulled: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub x: NaiveDate,
    pub y: Option<u64>,
}

/// A chart.js-ready data series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<DataPoint>,
    pub background_color: String,
    pub border_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsData {
    pub name: String,
    pub goal: Option<u32>,
    pub dataset: Dataset,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatsRequest {
    pub names: Vec<String>,
    pub scope: StatsScope,
    pub activities: HashSet<Activity>,
    pub stats_type: StatsType,
    /// Only rows dated on or after this day are returned.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub source: SourceInfo,
    pub data: Vec<StatsData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub neighbourhood: DateTime<Utc>,
    pub cluster: DateTime<Utc>,
}
