//! Turns raw spreadsheet tabs into [`StatsRow`]s.

use chrono::NaiveDate;

use super::clusters::group_for;
use super::StatsRow;

/// Row of the neighbourhood tab holding the period headers.
const NBHD_HEADER_ROW: usize = 2;
/// First data row of the neighbourhood tab.
const NBHD_FIRST_DATA_ROW: usize = 4;
/// A period must head this many sub-tables (one per core activity) to count.
const SUBTABLES: usize = 4;

/// Reshape the neighbourhood tab. The source lays out one sub-table per
/// activity side by side, each with a two-column (count, participants) block
/// per period. The output has one row per neighbourhood and period, skipping
/// rows without any data point.
pub fn reshape_neighbourhood(data: &[Vec<String>]) -> Vec<StatsRow> {
    let Some(header) = data.get(NBHD_HEADER_ROW) else {
        tracing::warn!("neighbourhood table has no header row");
        return Vec::new();
    };
    let periods = period_columns(header);

    let mut table = Vec::new();
    for row in data.iter().skip(NBHD_FIRST_DATA_ROW) {
        let cluster = cell(row, 0).trim();
        if cluster.is_empty() {
            break;
        }
        let neighbourhood = cell(row, 1).trim();
        let group = lookup_group(cluster);

        for (date, columns) in &periods {
            let mut counts = [None; 8];
            for (i, &col) in columns.iter().take(SUBTABLES).enumerate() {
                counts[2 * i] = count(row, col);
                counts[2 * i + 1] = count(row, col + 1);
            }
            let reshaped = StatsRow {
                group: group.to_string(),
                cluster: cluster.to_string(),
                neighbourhood: neighbourhood.to_string(),
                date: *date,
                counts,
            };
            if reshaped.has_data() {
                table.push(reshaped);
            }
        }
    }
    table
}

/// Reshape the cluster tab: a header row, then
/// `Cluster, Period, nDG, pDG, nCC, pCC, nJY, pJY, nSC, pSC` per row.
pub fn reshape_cluster(data: &[Vec<String>]) -> Vec<StatsRow> {
    let mut table = Vec::new();
    for row in data.iter().skip(1) {
        let cluster = cell(row, 0).trim();
        if cluster.is_empty() {
            break;
        }
        let Some(date) = parse_period(cell(row, 1)) else {
            tracing::warn!(cluster, period = cell(row, 1), "skipping cluster row with bad period");
            continue;
        };
        let mut counts = [None; 8];
        for (i, slot) in counts.iter_mut().enumerate() {
            *slot = count(row, 2 + i);
        }
        let reshaped = StatsRow {
            group: lookup_group(cluster).to_string(),
            cluster: cluster.to_string(),
            neighbourhood: String::new(),
            date,
            counts,
        };
        if reshaped.has_data() {
            table.push(reshaped);
        }
    }
    table
}

/// Map each period header to the columns it heads, in first-seen order.
/// Scanning stops at the first header that is not `<month> <year>`.
fn period_columns(header: &[String]) -> Vec<(NaiveDate, Vec<usize>)> {
    let mut periods: Vec<(NaiveDate, Vec<usize>)> = Vec::new();
    for (i, label) in header.iter().enumerate() {
        if label.trim().is_empty() {
            continue;
        }
        if label.split_whitespace().count() != 2 {
            break;
        }
        let Some(date) = parse_period(label) else {
            tracing::warn!(column = i, label = label.as_str(), "unparseable period header");
            continue;
        };
        match periods.iter_mut().find(|(d, _)| *d == date) {
            Some((_, columns)) => columns.push(i),
            None => periods.push((date, vec![i])),
        }
    }
    periods.retain(|(_, columns)| columns.len() >= SUBTABLES);
    periods
}

/// Parse `"Jan 2019"` / `"January   2019"` into the first day of the month.
pub fn parse_period(label: &str) -> Option<NaiveDate> {
    let mut tokens = label.split_whitespace();
    let (month, year) = (tokens.next()?, tokens.next()?);
    if tokens.next().is_some() {
        return None;
    }
    let month: String = month.chars().take(3).collect();
    NaiveDate::parse_from_str(&format!("1 {month} {year}"), "%d %b %Y").ok()
}

fn lookup_group(cluster: &str) -> &'static str {
    group_for(cluster).unwrap_or_else(|| {
        tracing::error!(cluster, "cluster is not in the mapping of clusters to cluster groups");
        ""
    })
}

fn cell(row: &[String], col: usize) -> &str {
    row.get(col).map(String::as_str).unwrap_or("")
}

/// A count is present only if the cell is all digits.
fn count(row: &[String], col: usize) -> Option<u32> {
    let value = cell(row, col);
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}
