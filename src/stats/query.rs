use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::colour::colours_for;
use crate::models::stats::{DataPoint, Dataset, StatsData, StatsRequest};

use super::StatsRow;

/// Build one chart series per requested area, in the order the areas first
/// appear in the table.
pub fn query(rows: &[StatsRow], request: &StatsRequest) -> Vec<StatsData> {
    let wanted: HashSet<&str> = request.names.iter().map(String::as_str).collect();
    let mut results: Vec<StatsData> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for row in rows {
        let name = row.area_name(request.scope);
        if !wanted.contains(name) {
            continue;
        }
        if request.start_date.is_some_and(|start| row.date < start) {
            continue;
        }

        let slot = *index.entry(name).or_insert_with(|| {
            let (background_color, border_color) = colours_for(name);
            results.push(StatsData {
                name: name.to_string(),
                goal: Some(0),
                dataset: Dataset {
                    label: name.to_string(),
                    data: Vec::new(),
                    background_color,
                    border_color,
                },
            });
            results.len() - 1
        });
        results[slot].dataset.data.push(DataPoint {
            x: row.date,
            y: row.data_point(&request.activities, request.stats_type),
        });
    }
    results
}

/// Cluster groups → clusters → neighbourhoods present in the table.
pub fn neighbourhoods_by_group(
    rows: &[StatsRow],
) -> BTreeMap<String, BTreeMap<String, BTreeSet<String>>> {
    let mut groups: BTreeMap<String, BTreeMap<String, BTreeSet<String>>> = BTreeMap::new();
    for row in rows {
        groups
            .entry(row.group.clone())
            .or_default()
            .entry(row.cluster.clone())
            .or_default()
            .insert(row.neighbourhood.clone());
    }
    groups
}
