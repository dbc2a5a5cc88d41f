use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use anyhow::{bail, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};

use super::geometry::GeometryCollection;
use super::tables::ReferenceTables;
use crate::types::GeoLevel;

/// Census boundary vintage. Tract and county boundaries change between
/// decennial censuses, so geometry is keyed by year as well as level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CensusYear {
    Y2000,
    #[default]
    Y2010,
    Y2020,
}

impl CensusYear {
    pub fn as_str(&self) -> &'static str {
        match self {
            CensusYear::Y2000 => "2000",
            CensusYear::Y2010 => "2010",
            CensusYear::Y2020 => "2020",
        }
    }
}

impl fmt::Display for CensusYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CensusYear {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "2000" => Ok(CensusYear::Y2000),
            "2010" => Ok(CensusYear::Y2010),
            "2020" => Ok(CensusYear::Y2020),
            other => bail!("unknown census year {other:?} (expected 2000, 2010 or 2020)"),
        }
    }
}

/// Narrow interface the core uses to reach boundary data.
///
/// Implementations memoize by (level, state subset, census year); loaded
/// collections are never mutated, so shared `Arc`s are safe to hand out.
pub trait BoundaryRepository {
    /// The reference tables bundled with the boundary data.
    fn tables(&mut self) -> Result<Arc<ReferenceTables>>;

    /// Geometry for one level, restricted to `state_subset`.
    /// Fails with a missing-boundary-package error when geometry for a
    /// needed state/level/year is not installed.
    fn load_level(
        &mut self,
        level: GeoLevel,
        state_subset: &[Arc<str>],
        year: CensusYear,
    ) -> Result<Arc<GeometryCollection>>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PackEntry {
    file: String,
    /// States covered by the file. Empty means nationwide (used for the
    /// region layer, which is not split by state).
    #[serde(default)]
    states: Vec<Arc<str>>,
}

/// Manifest at the root of a boundary pack directory, listing which
/// level/year geometry files are installed and what states they cover.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackManifest {
    pub version: String,
    levels: BTreeMap<String, BTreeMap<String, PackEntry>>,
}

impl PackManifest {
    fn entry(&self, level: GeoLevel, year: CensusYear) -> Option<&PackEntry> {
        self.levels.get(level.to_str())?.get(year.as_str())
    }
}

/// One feature in a geometry file: an id, its owning state, and polygons
/// as lists of exterior rings.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeomFeature {
    id: Arc<str>,
    state: Arc<str>,
    polygons: Vec<Vec<[f64; 2]>>,
}

fn feature_to_multipolygon(feature: &GeomFeature) -> MultiPolygon<f64> {
    MultiPolygon(
        feature
            .polygons
            .iter()
            .map(|ring| {
                let exterior = LineString(
                    ring.iter().map(|&[x, y]| Coord { x, y }).collect(),
                );
                Polygon::new(exterior, vec![])
            })
            .collect(),
    )
}

type CacheKey = (GeoLevel, CensusYear, String);

fn subset_key(level: GeoLevel, year: CensusYear, states: &[Arc<str>]) -> CacheKey {
    let mut sorted: Vec<&str> = states.iter().map(|s| &**s).collect();
    sorted.sort_unstable();
    sorted.dedup();
    (level, year, sorted.join(","))
}

/// Boundary pack rooted at a directory: `manifest.json`, `tables.json`,
/// and one JSON geometry file per level/year as listed in the manifest.
pub struct JsonPackRepository {
    root: PathBuf,
    manifest: PackManifest,
    tables: Option<Arc<ReferenceTables>>,
    full: AHashMap<(GeoLevel, CensusYear), Arc<GeometryCollection>>,
    subsets: AHashMap<CacheKey, Arc<GeometryCollection>>,
}

impl JsonPackRepository {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let manifest_path = root.join("manifest.json");
        let bytes = fs::read(&manifest_path).with_context(|| {
            format!("boundary pack not installed at {}", root.display())
        })?;
        let manifest: PackManifest = serde_json::from_slice(&bytes)
            .with_context(|| format!("failed to parse {}", manifest_path.display()))?;
        Ok(Self {
            root,
            manifest,
            tables: None,
            full: AHashMap::new(),
            subsets: AHashMap::new(),
        })
    }

    pub fn manifest(&self) -> &PackManifest {
        &self.manifest
    }

    fn load_full(&mut self, level: GeoLevel, year: CensusYear) -> Result<Arc<GeometryCollection>> {
        if let Some(full) = self.full.get(&(level, year)) {
            return Ok(full.clone());
        }
        let entry = match self.manifest.entry(level, year) {
            Some(entry) => entry,
            None => bail!(
                "missing boundary package: no {level} geometry for census year {year} in {}",
                self.root.display()
            ),
        };
        let path = self.root.join(&entry.file);
        let bytes = fs::read(&path)
            .with_context(|| format!("missing boundary package file {}", path.display()))?;
        let features: Vec<GeomFeature> = serde_json::from_slice(&bytes)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        let ids = features.iter().map(|f| f.id.clone()).collect();
        let states = features.iter().map(|f| f.state.clone()).collect();
        let shapes = features.iter().map(feature_to_multipolygon).collect();
        let full = Arc::new(GeometryCollection::new(level, ids, states, shapes));
        self.full.insert((level, year), full.clone());
        Ok(full)
    }
}

impl BoundaryRepository for JsonPackRepository {
    fn tables(&mut self) -> Result<Arc<ReferenceTables>> {
        if let Some(tables) = &self.tables {
            return Ok(tables.clone());
        }
        let path = self.root.join("tables.json");
        let bytes = fs::read(&path)
            .with_context(|| format!("missing reference tables {}", path.display()))?;
        let tables = Arc::new(ReferenceTables::from_json(&bytes)?);
        self.tables = Some(tables.clone());
        Ok(tables)
    }

    fn load_level(
        &mut self,
        level: GeoLevel,
        state_subset: &[Arc<str>],
        year: CensusYear,
    ) -> Result<Arc<GeometryCollection>> {
        let key = subset_key(level, year, state_subset);
        if let Some(cached) = self.subsets.get(&key) {
            return Ok(cached.clone());
        }

        if let Some(entry) = self.manifest.entry(level, year) {
            // Empty coverage list means the file is nationwide.
            if !entry.states.is_empty() {
                let covered: AHashSet<&str> = entry.states.iter().map(|s| &**s).collect();
                for state in state_subset {
                    if !covered.contains(&**state) {
                        bail!(
                            "missing boundary package: {level} geometry for state {state} \
                             (census year {year}) is not installed"
                        );
                    }
                }
            }
        }

        let full = self.load_full(level, year)?;
        let collection = if level == GeoLevel::Region {
            // Regions are not split by state.
            full
        } else {
            let wanted: AHashSet<Arc<str>> = state_subset.iter().cloned().collect();
            Arc::new(full.restrict_to_states(&wanted))
        };
        self.subsets.insert(key, collection.clone());
        Ok(collection)
    }
}

/// In-memory repository, used by tests and by callers that assemble
/// boundary data themselves.
pub struct MemoryRepository {
    tables: Arc<ReferenceTables>,
    levels: AHashMap<(GeoLevel, CensusYear), Arc<GeometryCollection>>,
}

impl MemoryRepository {
    pub fn new(tables: ReferenceTables) -> Self {
        Self { tables: Arc::new(tables), levels: AHashMap::new() }
    }

    pub fn insert_level(&mut self, year: CensusYear, collection: GeometryCollection) {
        self.levels
            .insert((collection.level(), year), Arc::new(collection));
    }
}

impl BoundaryRepository for MemoryRepository {
    fn tables(&mut self) -> Result<Arc<ReferenceTables>> {
        Ok(self.tables.clone())
    }

    fn load_level(
        &mut self,
        level: GeoLevel,
        state_subset: &[Arc<str>],
        year: CensusYear,
    ) -> Result<Arc<GeometryCollection>> {
        let full = match self.levels.get(&(level, year)) {
            Some(full) => full.clone(),
            None => bail!("missing boundary package: no {level} geometry for census year {year}"),
        };
        if level == GeoLevel::Region {
            return Ok(full);
        }
        let wanted: AHashSet<Arc<str>> = state_subset.iter().cloned().collect();
        Ok(Arc::new(full.restrict_to_states(&wanted)))
    }
}
