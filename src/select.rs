//! Boundary selection: apply resolved presentation lists against loaded
//! geometry, producing per-level selected shapes, bounding boxes, and the
//! per-level go/no-go flags the renderer consumes.

use std::sync::Arc;

use ahash::AHashSet;
use anyhow::{bail, ensure, Result};
use geo::{MultiPolygon, Rect};

use crate::refdata::{BoundaryRepository, CensusYear, ReferenceTables};
use crate::report::{Report, Warning};
use crate::resolve::PLists;
use crate::types::{GeoId, GeoLevel};

/// The shapes chosen for one level, in geometry-collection order.
#[derive(Debug, Clone)]
pub struct LevelSelection {
    pub level: GeoLevel,
    pub ids: Vec<Arc<str>>,
    pub shapes: Vec<MultiPolygon<f64>>,
    pub bbox: Option<Rect<f64>>,
    /// Whether the renderer should draw this overlay at all.
    pub go: bool,
}

/// Per-level selections for one run.
#[derive(Debug, Default)]
pub struct Selections {
    pub region: Option<LevelSelection>,
    pub state: Option<LevelSelection>,
    pub registry: Option<LevelSelection>,
    pub hsa: Option<LevelSelection>,
    pub county: Option<LevelSelection>,
    pub tract: Option<LevelSelection>,
}

impl Selections {
    pub fn get(&self, level: GeoLevel) -> Option<&LevelSelection> {
        match level {
            GeoLevel::Region => self.region.as_ref(),
            GeoLevel::State => self.state.as_ref(),
            GeoLevel::Registry => self.registry.as_ref(),
            GeoLevel::Hsa => self.hsa.as_ref(),
            GeoLevel::County => self.county.as_ref(),
            GeoLevel::Tract => self.tract.as_ref(),
        }
    }

    fn set(&mut self, level: GeoLevel, selection: LevelSelection) {
        match level {
            GeoLevel::Region => self.region = Some(selection),
            GeoLevel::State => self.state = Some(selection),
            GeoLevel::Registry => self.registry = Some(selection),
            GeoLevel::Hsa => self.hsa = Some(selection),
            GeoLevel::County => self.county = Some(selection),
            GeoLevel::Tract => self.tract = Some(selection),
        }
    }
}

/// Subset each level's geometry by its presentation list.
///
/// An id missing from the data level's geometry drops with a warning (a
/// user-data problem); an id missing from an overlay level's geometry is a
/// repository inconsistency and aborts. The data level must select at
/// least one shape.
pub fn select(
    data_level: GeoLevel,
    plists: &PLists,
    tables: &ReferenceTables,
    repo: &mut dyn BoundaryRepository,
    year: CensusYear,
    report: &mut Report,
) -> Result<Selections> {
    let mut selections = Selections::default();

    for level in GeoLevel::order() {
        let plist = match plists.get(level) {
            Some(plist) => plist,
            None => continue,
        };
        ensure!(
            plist.iter().all(|id| !id.is_empty()),
            "internal error: unresolved id in the {level} presentation list"
        );

        let states = covering_states(level, plist, tables);
        let collection = repo.load_level(level, &states, year)?;

        let keep: AHashSet<Arc<str>> = plist.iter().cloned().collect();
        let subset = collection.subset(&keep);

        if subset.len() < keep.len() {
            let missing: Vec<&Arc<str>> =
                plist.iter().filter(|id| !collection.contains(id)).collect();
            if level == data_level {
                for id in missing {
                    report.push(Warning::UnmatchedBoundary { id: id.to_string() });
                }
            } else if let Some(id) = missing.first() {
                bail!(
                    "boundary package inconsistency: {level} id {id} is in the \
                     reference tables but not in the loaded geometry"
                );
            }
        }

        let selection = LevelSelection {
            level,
            ids: subset.ids().to_vec(),
            shapes: subset.shapes().to_vec(),
            bbox: subset.bounds(),
            go: !subset.is_empty(),
        };
        if level == data_level {
            ensure!(selection.go, "no rows left to map");
        }
        selections.set(level, selection);
    }

    Ok(selections)
}

/// States whose geometry files must be loaded to cover a presentation list.
fn covering_states(level: GeoLevel, plist: &[Arc<str>], tables: &ReferenceTables) -> Vec<Arc<str>> {
    let mut states: Vec<Arc<str>> = match level {
        GeoLevel::Region => tables
            .state_ids(), // region files are nationwide; subset is ignored
        GeoLevel::State => plist.to_vec(),
        GeoLevel::Registry => plist
            .iter()
            .filter_map(|id| tables.registry(id).map(|r| r.state_id.clone()))
            .collect(),
        GeoLevel::Hsa => plist
            .iter()
            .filter_map(|id| tables.hsa(id).map(|h| h.state_id.clone()))
            .collect(),
        GeoLevel::County | GeoLevel::Tract => plist
            .iter()
            .map(|id| GeoId::new(level, id.clone()).state_prefix())
            .collect(),
    };
    states.sort_unstable();
    states.dedup();
    states
}
