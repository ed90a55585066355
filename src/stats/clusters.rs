use std::collections::{BTreeMap, BTreeSet};

/// Cluster name to cluster group.
const CLUSTER_GROUPS: &[(&str, &str)] = &[
    ("Abbotsford-Mission", "LM East"),
    ("Caribou North", "Interior North"),
    ("Central Interior", "Interior North"),
    ("Central Okanagan", "Interior South"),
    ("Chilliwack-Hope", "LM East"),
    ("Comox Valley", "Island North"),
    ("Cowichan Valley", "Island North"),
    ("Golden Ears", "LM East"),
    ("Langley", "LM East"),
    ("Mid Island", "Island North"),
    ("North Shore", "LM West"),
    ("SE Vic", "Island South"),
    ("Sooke", "Island South"),
    ("Strathcona", "Island North"),
    ("Surrey-Delta-White Rock", "LM East"),
    ("Tri Cities", "LM East"),
    ("Vancouver", "LM West"),
    ("West Shore", "Island South"),
];

pub fn group_for(cluster: &str) -> Option<&'static str> {
    CLUSTER_GROUPS
        .iter()
        .find(|(name, _)| *name == cluster)
        .map(|(_, group)| *group)
}

/// Cluster groups mapped to their clusters.
pub fn clusters_by_group() -> BTreeMap<&'static str, BTreeSet<&'static str>> {
    let mut groups: BTreeMap<&'static str, BTreeSet<&'static str>> = BTreeMap::new();
    for &(cluster, group) in CLUSTER_GROUPS {
        groups.entry(group).or_default().insert(cluster);
    }
    groups
}
