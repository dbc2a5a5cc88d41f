use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One census region (parent of states).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionRow {
    pub id: Arc<str>,
    pub name: Arc<str>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateRow {
    pub id: Arc<str>, // 2-digit FIPS
    pub region_id: Arc<str>,
    pub name: Arc<str>,
    pub abbr: Arc<str>,
    /// Part of the contiguous 48 (plus DC).
    #[serde(default)]
    pub lower48: bool,
    /// Territory rather than a state (PR, GU, ...).
    #[serde(default)]
    pub territory: bool,
}

/// A Seer registry: a county grouping that need not cover its state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryRow {
    pub id: Arc<str>, // uppercase abbreviation, e.g. "CA-LA"
    pub state_id: Arc<str>,
    pub name: Arc<str>,
    /// Free-text strings matched by substring against raw registry names.
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HsaRow {
    pub id: Arc<str>, // 3-digit code
    pub state_id: Arc<str>,
    pub registry_id: Option<Arc<str>>,
    pub name: Arc<str>,
    #[serde(default)]
    pub county_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountyRow {
    pub id: Arc<str>, // 5-digit FIPS
    pub state_id: Arc<str>,
    pub registry_id: Option<Arc<str>>,
    pub hsa_id: Option<Arc<str>>,
    pub name: Arc<str>,
    #[serde(default)]
    pub tract_count: u32,
}

/// On-disk shape of the bundled reference tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TablesFile {
    regions: Vec<RegionRow>,
    states: Vec<StateRow>,
    registries: Vec<RegistryRow>,
    hsas: Vec<HsaRow>,
    counties: Vec<CountyRow>,
}

/// The five reference tables with id indexes, read-only per run.
#[derive(Debug, Clone)]
pub struct ReferenceTables {
    regions: Vec<RegionRow>,
    states: Vec<StateRow>,
    registries: Vec<RegistryRow>,
    hsas: Vec<HsaRow>,
    counties: Vec<CountyRow>,

    region_index: AHashMap<Arc<str>, usize>,
    state_index: AHashMap<Arc<str>, usize>,
    registry_index: AHashMap<Arc<str>, usize>,
    hsa_index: AHashMap<Arc<str>, usize>,
    county_index: AHashMap<Arc<str>, usize>,

    /// States removed by the scope flags, kept so a lookup miss can be
    /// told apart from an id that never existed.
    pruned_states: AHashSet<Arc<str>>,
}

fn build_index<T>(rows: &[T], id: impl Fn(&T) -> Arc<str>) -> AHashMap<Arc<str>, usize> {
    rows.iter().enumerate().map(|(i, row)| (id(row), i)).collect()
}

impl ReferenceTables {
    pub fn from_rows(
        regions: Vec<RegionRow>,
        states: Vec<StateRow>,
        registries: Vec<RegistryRow>,
        hsas: Vec<HsaRow>,
        counties: Vec<CountyRow>,
    ) -> Self {
        Self {
            region_index: build_index(&regions, |r| r.id.clone()),
            state_index: build_index(&states, |r| r.id.clone()),
            registry_index: build_index(&registries, |r| r.id.clone()),
            hsa_index: build_index(&hsas, |r| r.id.clone()),
            county_index: build_index(&counties, |r| r.id.clone()),
            regions,
            states,
            registries,
            hsas,
            counties,
            pruned_states: AHashSet::new(),
        }
    }

    /// Parse the bundled JSON reference tables.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let file: TablesFile =
            serde_json::from_slice(bytes).context("failed to parse reference tables")?;
        Ok(Self::from_rows(
            file.regions,
            file.states,
            file.registries,
            file.hsas,
            file.counties,
        ))
    }

    /// Returns a copy pruned by the scope flags: `lower48_only` drops
    /// non-contiguous states, `include_territories` keeps territories.
    /// Registries, HSAs and counties of dropped states are dropped too.
    pub fn scoped(&self, lower48_only: bool, include_territories: bool) -> Self {
        let (states, dropped): (Vec<StateRow>, Vec<StateRow>) = self
            .states
            .iter()
            .cloned()
            .partition(|s| {
                !(lower48_only && !s.lower48) && !(s.territory && !include_territories)
            });
        let live: AHashSet<Arc<str>> = states.iter().map(|s| s.id.clone()).collect();

        let registries = self
            .registries
            .iter()
            .filter(|r| live.contains(&r.state_id))
            .cloned()
            .collect();
        let hsas = self
            .hsas
            .iter()
            .filter(|h| live.contains(&h.state_id))
            .cloned()
            .collect();
        let counties = self
            .counties
            .iter()
            .filter(|c| live.contains(&c.state_id))
            .cloned()
            .collect();

        let mut scoped = Self::from_rows(self.regions.clone(), states, registries, hsas, counties);
        scoped.pruned_states = self.pruned_states.clone();
        scoped
            .pruned_states
            .extend(dropped.into_iter().map(|s| s.id));
        scoped
    }

    /// True if the scope flags removed this state for the current run.
    pub fn state_pruned(&self, id: &str) -> bool {
        self.pruned_states.contains(id)
    }

    pub fn region(&self, id: &str) -> Option<&RegionRow> {
        self.region_index.get(id).map(|&i| &self.regions[i])
    }

    pub fn state(&self, id: &str) -> Option<&StateRow> {
        self.state_index.get(id).map(|&i| &self.states[i])
    }

    pub fn registry(&self, id: &str) -> Option<&RegistryRow> {
        self.registry_index.get(id).map(|&i| &self.registries[i])
    }

    pub fn hsa(&self, id: &str) -> Option<&HsaRow> {
        self.hsa_index.get(id).map(|&i| &self.hsas[i])
    }

    pub fn county(&self, id: &str) -> Option<&CountyRow> {
        self.county_index.get(id).map(|&i| &self.counties[i])
    }

    pub fn region_ids(&self) -> Vec<Arc<str>> {
        self.regions.iter().map(|r| r.id.clone()).collect()
    }

    pub fn state_ids(&self) -> Vec<Arc<str>> {
        self.states.iter().map(|s| s.id.clone()).collect()
    }

    pub fn registry_ids(&self) -> Vec<Arc<str>> {
        self.registries.iter().map(|r| r.id.clone()).collect()
    }

    pub fn hsa_ids(&self) -> Vec<Arc<str>> {
        self.hsas.iter().map(|h| h.id.clone()).collect()
    }

    pub fn county_ids(&self) -> Vec<Arc<str>> {
        self.counties.iter().map(|c| c.id.clone()).collect()
    }

    /// States whose region is in `regions`, in table order.
    pub fn states_in_regions(&self, regions: &AHashSet<Arc<str>>) -> Vec<Arc<str>> {
        self.states
            .iter()
            .filter(|s| regions.contains(&s.region_id))
            .map(|s| s.id.clone())
            .collect()
    }

    /// Registries whose state is in `states`, in table order.
    pub fn registries_in_states(&self, states: &AHashSet<Arc<str>>) -> Vec<Arc<str>> {
        self.registries
            .iter()
            .filter(|r| states.contains(&r.state_id))
            .map(|r| r.id.clone())
            .collect()
    }

    pub fn hsas_in_states(&self, states: &AHashSet<Arc<str>>) -> Vec<Arc<str>> {
        self.hsas
            .iter()
            .filter(|h| states.contains(&h.state_id))
            .map(|h| h.id.clone())
            .collect()
    }

    pub fn hsas_in_registries(&self, registries: &AHashSet<Arc<str>>) -> Vec<Arc<str>> {
        self.hsas
            .iter()
            .filter(|h| h.registry_id.as_ref().is_some_and(|r| registries.contains(r)))
            .map(|h| h.id.clone())
            .collect()
    }

    pub fn counties_in_states(&self, states: &AHashSet<Arc<str>>) -> Vec<Arc<str>> {
        self.counties
            .iter()
            .filter(|c| states.contains(&c.state_id))
            .map(|c| c.id.clone())
            .collect()
    }

    pub fn counties_in_registries(&self, registries: &AHashSet<Arc<str>>) -> Vec<Arc<str>> {
        self.counties
            .iter()
            .filter(|c| c.registry_id.as_ref().is_some_and(|r| registries.contains(r)))
            .map(|c| c.id.clone())
            .collect()
    }

    pub fn counties_in_hsas(&self, hsas: &AHashSet<Arc<str>>) -> Vec<Arc<str>> {
        self.counties
            .iter()
            .filter(|c| c.hsa_id.as_ref().is_some_and(|h| hsas.contains(h)))
            .map(|c| c.id.clone())
            .collect()
    }

    /// Exact-match a raw registry name against the abbreviation list, then
    /// fall back to substring matching against the alias table. First alias
    /// match wins; `None` means unmapped.
    pub fn match_registry(&self, raw: &str) -> Option<Arc<str>> {
        let upper = raw.to_ascii_uppercase();
        if let Some(row) = self.registry(&upper) {
            return Some(row.id.clone());
        }
        let lower = raw.to_ascii_lowercase();
        for row in &self.registries {
            for alias in &row.aliases {
                if lower.contains(&alias.to_ascii_lowercase()) {
                    return Some(row.id.clone());
                }
            }
        }
        None
    }
}
