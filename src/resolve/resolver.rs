use std::sync::Arc;

use ahash::AHashSet;

use super::policy::{
    CountyPolicy, HsaPolicy, PolicySet, RegionPolicy, RegistryPolicy, StatePolicy, TractPolicy,
};
use crate::refdata::ReferenceTables;
use crate::types::GeoLevel;

/// Per-level sets of identifiers carrying (or ancestral to) data, derived
/// from the valid records before resolution.
#[derive(Debug, Default)]
pub struct DataSets {
    pub region: AHashSet<Arc<str>>,
    pub state: AHashSet<Arc<str>>,
    pub registry: AHashSet<Arc<str>>,
    pub hsa: AHashSet<Arc<str>>,
    pub county: AHashSet<Arc<str>>,
    pub tract: AHashSet<Arc<str>>,
}

impl DataSets {
    pub fn get(&self, level: GeoLevel) -> &AHashSet<Arc<str>> {
        match level {
            GeoLevel::Region => &self.region,
            GeoLevel::State => &self.state,
            GeoLevel::Registry => &self.registry,
            GeoLevel::Hsa => &self.hsa,
            GeoLevel::County => &self.county,
            GeoLevel::Tract => &self.tract,
        }
    }
}

/// Resolved presentation lists: per level, the ids to draw.
///
/// `None` means the level does not participate at all; `Some(empty)` is a
/// legitimate outcome (most often the registry level, since registries
/// never cover all of any state).
#[derive(Debug, Default)]
pub struct PLists {
    pub region: Option<Vec<Arc<str>>>,
    pub state: Option<Vec<Arc<str>>>,
    pub registry: Option<Vec<Arc<str>>>,
    pub hsa: Option<Vec<Arc<str>>>,
    pub county: Option<Vec<Arc<str>>>,
    pub tract: Option<Vec<Arc<str>>>,
}

impl PLists {
    pub fn get(&self, level: GeoLevel) -> Option<&[Arc<str>]> {
        match level {
            GeoLevel::Region => self.region.as_deref(),
            GeoLevel::State => self.state.as_deref(),
            GeoLevel::Registry => self.registry.as_deref(),
            GeoLevel::Hsa => self.hsa.as_deref(),
            GeoLevel::County => self.county.as_deref(),
            GeoLevel::Tract => self.tract.as_deref(),
        }
    }
}

fn sorted(set: &AHashSet<Arc<str>>) -> Vec<Arc<str>> {
    let mut out: Vec<Arc<str>> = set.iter().cloned().collect();
    out.sort_unstable();
    out
}

fn sorted_vec(mut ids: Vec<Arc<str>>) -> Vec<Arc<str>> {
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Union of a level's own data ids with a sibling expansion, used for the
/// SEER/HSA/COUNTY policy values. Starting from the data ids preserves
/// areas that carry data but fall outside any registry/HSA grouping.
fn add_by_ancestor(own: &AHashSet<Arc<str>>, expanded: Vec<Arc<str>>) -> Vec<Arc<str>> {
    let mut merged: Vec<Arc<str>> = own.iter().cloned().collect();
    merged.extend(expanded);
    sorted_vec(merged)
}

/// Evaluate every level's boundary policy into presentation lists.
///
/// `data_level` is the detected level of the dataset; `tract_universe` is
/// the id list of the loaded tract geometry for the data states, needed
/// because tracts have no reference table of their own.
pub fn resolve(
    data_level: GeoLevel,
    data: &DataSets,
    tables: &ReferenceTables,
    policies: &PolicySet,
    tract_universe: Option<&[Arc<str>]>,
) -> PLists {
    let mut plists = PLists::default();

    plists.region = match policies.region {
        RegionPolicy::None => None,
        RegionPolicy::Data => Some(sorted(&data.region)),
        RegionPolicy::All => Some(sorted_vec(tables.region_ids())),
    };

    plists.state = match policies.state {
        StatePolicy::None => None,
        StatePolicy::Data => Some(sorted(&data.state)),
        StatePolicy::Region => Some(sorted_vec(tables.states_in_regions(&data.region))),
        StatePolicy::All => Some(sorted_vec(tables.state_ids())),
    };

    plists.registry = match policies.registry {
        RegistryPolicy::None => None,
        RegistryPolicy::Data => Some(sorted(&data.registry)),
        RegistryPolicy::State => Some(sorted_vec(tables.registries_in_states(&data.state))),
        RegistryPolicy::All => {
            // Ad hoc narrowing from the source: with state-level data and a
            // state policy that draws only data states (or none), "all
            // registries" means all registries within those states, not the
            // whole country. Applies at the STATE data level only.
            let narrow = data_level == GeoLevel::State
                && matches!(policies.state, StatePolicy::Data | StatePolicy::None);
            if narrow {
                Some(sorted_vec(tables.registries_in_states(&data.state)))
            } else {
                Some(sorted_vec(tables.registry_ids()))
            }
        }
    };

    // HSA, county and tract lists exist only at or above the data level.
    if !GeoLevel::Hsa.finer_than(data_level) {
        plists.hsa = match policies.hsa {
            HsaPolicy::None => None,
            HsaPolicy::Data => Some(sorted(&data.hsa)),
            HsaPolicy::Seer => Some(add_by_ancestor(
                &data.hsa,
                tables.hsas_in_registries(&data.registry),
            )),
            HsaPolicy::State => Some(sorted_vec(tables.hsas_in_states(&data.state))),
        };
    }

    if !GeoLevel::County.finer_than(data_level) {
        plists.county = match policies.county {
            CountyPolicy::None => None,
            CountyPolicy::Data => Some(sorted(&data.county)),
            CountyPolicy::Hsa => Some(add_by_ancestor(
                &data.county,
                tables.counties_in_hsas(&data.hsa),
            )),
            CountyPolicy::Seer => Some(add_by_ancestor(
                &data.county,
                tables.counties_in_registries(&data.registry),
            )),
            CountyPolicy::State => Some(sorted_vec(tables.counties_in_states(&data.state))),
        };
    }

    if data_level == GeoLevel::Tract {
        let universe = tract_universe.unwrap_or(&[]);
        plists.tract = match policies.tract {
            TractPolicy::None => None,
            TractPolicy::Data => Some(sorted(&data.tract)),
            TractPolicy::County => Some(add_by_ancestor(
                &data.tract,
                tracts_in_counties(universe, &data.county),
            )),
            TractPolicy::Hsa => Some(add_by_ancestor(
                &data.tract,
                tracts_by_county(universe, tables, |c| {
                    c.hsa_id.as_ref().is_some_and(|h| data.hsa.contains(h))
                }),
            )),
            TractPolicy::Seer => Some(add_by_ancestor(
                &data.tract,
                tracts_by_county(universe, tables, |c| {
                    c.registry_id.as_ref().is_some_and(|r| data.registry.contains(r))
                }),
            )),
            TractPolicy::State => Some(sorted_vec(
                universe
                    .iter()
                    .filter(|id| data.state.contains(&id[..id.len().min(2)]))
                    .cloned()
                    .collect(),
            )),
        };
    }

    plists
}

/// Tracts in the universe whose 5-digit county prefix is in `counties`.
fn tracts_in_counties(universe: &[Arc<str>], counties: &AHashSet<Arc<str>>) -> Vec<Arc<str>> {
    universe
        .iter()
        .filter(|id| counties.contains(&id[..id.len().min(5)]))
        .cloned()
        .collect()
}

/// Tracts whose parent county row satisfies `keep`. Tract->county is
/// prefix-encoded; county->registry/HSA needs the county table.
fn tracts_by_county(
    universe: &[Arc<str>],
    tables: &ReferenceTables,
    keep: impl Fn(&crate::refdata::CountyRow) -> bool,
) -> Vec<Arc<str>> {
    universe
        .iter()
        .filter(|id| {
            tables
                .county(&id[..id.len().min(5)])
                .is_some_and(&keep)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refdata::{CountyRow, HsaRow, RegionRow, RegistryRow, StateRow};

    /// Two western states: California with a registry (CA-LA over Los
    /// Angeles county) and Nevada with no registry coverage at all.
    fn tables() -> ReferenceTables {
        ReferenceTables::from_rows(
            vec![
                RegionRow { id: "4".into(), name: "West".into() },
                RegionRow { id: "3".into(), name: "South".into() },
            ],
            vec![
                StateRow {
                    id: "06".into(),
                    region_id: "4".into(),
                    name: "California".into(),
                    abbr: "CA".into(),
                    lower48: true,
                    territory: false,
                },
                StateRow {
                    id: "32".into(),
                    region_id: "4".into(),
                    name: "Nevada".into(),
                    abbr: "NV".into(),
                    lower48: true,
                    territory: false,
                },
                StateRow {
                    id: "48".into(),
                    region_id: "3".into(),
                    name: "Texas".into(),
                    abbr: "TX".into(),
                    lower48: true,
                    territory: false,
                },
            ],
            vec![
                RegistryRow {
                    id: "CA-LA".into(),
                    state_id: "06".into(),
                    name: "Los Angeles".into(),
                    aliases: vec![],
                },
                RegistryRow {
                    id: "TX".into(),
                    state_id: "48".into(),
                    name: "Texas".into(),
                    aliases: vec![],
                },
            ],
            vec![HsaRow {
                id: "035".into(),
                state_id: "06".into(),
                registry_id: Some("CA-LA".into()),
                name: "Los Angeles HSA".into(),
                county_count: 2,
            }],
            vec![
                CountyRow {
                    id: "06037".into(),
                    state_id: "06".into(),
                    registry_id: Some("CA-LA".into()),
                    hsa_id: Some("035".into()),
                    name: "Los Angeles".into(),
                    tract_count: 2,
                },
                CountyRow {
                    id: "06059".into(),
                    state_id: "06".into(),
                    registry_id: Some("CA-LA".into()),
                    hsa_id: Some("035".into()),
                    name: "Orange".into(),
                    tract_count: 1,
                },
                CountyRow {
                    id: "06073".into(),
                    state_id: "06".into(),
                    registry_id: None,
                    hsa_id: None,
                    name: "San Diego".into(),
                    tract_count: 1,
                },
                CountyRow {
                    id: "32003".into(),
                    state_id: "32".into(),
                    registry_id: None,
                    hsa_id: None,
                    name: "Clark".into(),
                    tract_count: 1,
                },
            ],
        )
    }

    fn set(ids: &[&str]) -> AHashSet<Arc<str>> {
        ids.iter().map(|s| Arc::from(*s)).collect()
    }

    fn as_strs(list: &[Arc<str>]) -> Vec<&str> {
        list.iter().map(|s| &**s).collect()
    }

    #[test]
    fn county_data_defaults_to_data_counties_only() {
        let data = DataSets {
            region: set(&["4"]),
            state: set(&["06"]),
            registry: set(&["CA-LA"]),
            hsa: set(&["035"]),
            county: set(&["06037", "32003"]),
            ..Default::default()
        };
        let policies = PolicySet::defaults_for(GeoLevel::County);
        let plists = resolve(GeoLevel::County, &data, &tables(), &policies, None);
        assert_eq!(as_strs(plists.county.as_ref().unwrap()), vec!["06037", "32003"]);
        assert!(plists.state.is_none());
        assert!(plists.tract.is_none());
    }

    #[test]
    fn seer_policy_unions_data_with_registry_counties() {
        // Data in a registry-covered state and a non-covered one: the
        // registry expansion adds siblings but never drops the uncovered
        // data counties.
        let data = DataSets {
            region: set(&["4"]),
            state: set(&["06", "32"]),
            registry: set(&["CA-LA"]),
            hsa: set(&["035"]),
            county: set(&["06037", "32003"]),
            ..Default::default()
        };
        let mut policies = PolicySet::defaults_for(GeoLevel::County);
        policies.county = CountyPolicy::Seer;
        let plists = resolve(GeoLevel::County, &data, &tables(), &policies, None);
        let county = plists.county.unwrap();
        assert_eq!(as_strs(&county), vec!["06037", "06059", "32003"]);
    }

    #[test]
    fn state_value_draws_all_counties_in_data_states() {
        let data = DataSets {
            region: set(&["4"]),
            state: set(&["06"]),
            county: set(&["06037"]),
            ..Default::default()
        };
        let mut policies = PolicySet::defaults_for(GeoLevel::County);
        policies.county = CountyPolicy::State;
        let plists = resolve(GeoLevel::County, &data, &tables(), &policies, None);
        assert_eq!(
            as_strs(plists.county.as_ref().unwrap()),
            vec!["06037", "06059", "06073"]
        );
    }

    #[test]
    fn registry_all_narrows_to_data_states_for_state_data() {
        let data = DataSets {
            region: set(&["4"]),
            state: set(&["06"]),
            ..Default::default()
        };
        let mut policies = PolicySet::defaults_for(GeoLevel::State);
        policies.state = StatePolicy::Data;
        policies.registry = RegistryPolicy::All;
        let plists = resolve(GeoLevel::State, &data, &tables(), &policies, None);
        assert_eq!(as_strs(plists.registry.as_ref().unwrap()), vec!["CA-LA"]);
    }

    #[test]
    fn registry_all_stays_nationwide_when_all_states_drawn() {
        let data = DataSets {
            region: set(&["4"]),
            state: set(&["06"]),
            ..Default::default()
        };
        let mut policies = PolicySet::defaults_for(GeoLevel::State); // state = ALL
        policies.registry = RegistryPolicy::All;
        let plists = resolve(GeoLevel::State, &data, &tables(), &policies, None);
        assert_eq!(as_strs(plists.registry.as_ref().unwrap()), vec!["CA-LA", "TX"]);
    }

    #[test]
    fn registry_data_may_be_empty() {
        let data = DataSets {
            region: set(&["4"]),
            state: set(&["32"]),
            county: set(&["32003"]),
            ..Default::default()
        };
        let mut policies = PolicySet::defaults_for(GeoLevel::County);
        policies.registry = RegistryPolicy::Data;
        let plists = resolve(GeoLevel::County, &data, &tables(), &policies, None);
        assert_eq!(plists.registry.as_ref().unwrap().len(), 0);
    }

    #[test]
    fn tract_county_policy_expands_within_data_counties() {
        let universe: Vec<Arc<str>> = vec![
            "06037100000".into(),
            "06037200000".into(),
            "06059100000".into(),
        ];
        let data = DataSets {
            region: set(&["4"]),
            state: set(&["06"]),
            registry: set(&["CA-LA"]),
            hsa: set(&["035"]),
            county: set(&["06037"]),
            tract: set(&["06037100000"]),
        };
        let mut policies = PolicySet::defaults_for(GeoLevel::Tract);
        policies.tract = TractPolicy::County;
        let plists = resolve(GeoLevel::Tract, &data, &tables(), &policies, Some(&universe));
        assert_eq!(
            as_strs(plists.tract.as_ref().unwrap()),
            vec!["06037100000", "06037200000"]
        );
    }

    #[test]
    fn all_policy_is_superset_of_data() {
        let data = DataSets {
            region: set(&["4"]),
            state: set(&["06", "32"]),
            ..Default::default()
        };
        let mut policies = PolicySet::defaults_for(GeoLevel::State);
        policies.state = StatePolicy::All;
        let plists = resolve(GeoLevel::State, &data, &tables(), &policies, None);
        let states = plists.state.unwrap();
        for id in &data.state {
            assert!(states.contains(id));
        }
        assert_eq!(states.len(), 3);
    }
}
