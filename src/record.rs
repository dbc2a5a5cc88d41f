//! The per-run data model: input rows, validated location records, and
//! the per-level data-id sets fed to the resolver.

use std::sync::Arc;

use anyhow::{ensure, Result};

use crate::classify::Classification;
use crate::refdata::ReferenceTables;
use crate::report::{Report, Warning};
use crate::resolve::DataSets;
use crate::types::{GeoId, GeoLevel};

/// A raw measurement, a category code, or a literal color, depending on
/// the categorization mode.
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    Number(f64),
    Text(String),
}

impl DataValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            DataValue::Number(n) => Some(*n),
            DataValue::Text(_) => None,
        }
    }
}

/// One row of caller-supplied data, before validation.
#[derive(Debug, Clone)]
pub struct InputRow {
    pub id: Option<String>,
    pub value: Option<DataValue>,
    /// Statistical-significance flag for the hatch overlay.
    pub significant: bool,
}

/// Ancestor ids derived from the reference tables. Registry and HSA are
/// optional: an area outside any registry/HSA keeps its data but has no
/// grouping to expand into.
#[derive(Debug, Clone)]
pub struct AncestorIds {
    pub region: Arc<str>,
    pub state: Arc<str>,
    pub registry: Option<Arc<str>>,
    pub hsa: Option<Arc<str>>,
    pub county: Option<Arc<str>>,
}

/// A validated, canonicalized row. Invalid rows never become records;
/// they are dropped with a warning during `build_records`.
#[derive(Debug, Clone)]
pub struct LocationRecord {
    pub raw_id: String,
    pub canonical_id: Arc<str>,
    pub level: GeoLevel,
    pub value: DataValue,
    pub significant: bool,
    pub ancestors: AncestorIds,
}

/// Validate rows against the reference tables and derive ancestors,
/// building the per-level data-id sets as a side product.
///
/// Fails only when nothing survives; every per-row problem drops that row
/// with a warning and the run continues.
pub fn build_records(
    rows: &[InputRow],
    classification: &Classification,
    tables: &ReferenceTables,
    report: &mut Report,
) -> Result<(Vec<LocationRecord>, DataSets)> {
    let level = classification.level;
    let mut seen: ahash::AHashSet<Arc<str>> = ahash::AHashSet::new();
    let mut records = Vec::with_capacity(rows.len());
    let mut data = DataSets::default();

    for (row, canonical) in rows.iter().zip(&classification.ids) {
        let canonical = match canonical {
            Some(id) => id.clone(),
            None => continue, // already warned during classification
        };
        let value = match &row.value {
            Some(value) => value.clone(),
            None => {
                report.push(Warning::MissingValue { id: canonical.to_string() });
                continue;
            }
        };
        if !seen.insert(canonical.clone()) {
            report.push(Warning::DuplicateId { id: canonical.to_string() });
            continue;
        }

        let ancestors = match derive_ancestors(level, &canonical, tables, report) {
            Some(ancestors) => ancestors,
            None => continue,
        };

        data.region.insert(ancestors.region.clone());
        data.state.insert(ancestors.state.clone());
        if let Some(registry) = &ancestors.registry {
            data.registry.insert(registry.clone());
        }
        if let Some(hsa) = &ancestors.hsa {
            data.hsa.insert(hsa.clone());
        }
        if let Some(county) = &ancestors.county {
            data.county.insert(county.clone());
        }
        match level {
            GeoLevel::Tract => {
                data.tract.insert(canonical.clone());
            }
            GeoLevel::Hsa => {
                data.hsa.insert(canonical.clone());
            }
            GeoLevel::Registry => {
                data.registry.insert(canonical.clone());
            }
            _ => {}
        }

        records.push(LocationRecord {
            raw_id: row.id.clone().unwrap_or_default(),
            canonical_id: canonical,
            level,
            value,
            significant: row.significant,
            ancestors,
        });
    }

    ensure!(!records.is_empty(), "no rows left to map after validation");
    Ok((records, data))
}

/// Walk one id up the hierarchy. `None` drops the row (warning already
/// recorded).
fn derive_ancestors(
    level: GeoLevel,
    id: &Arc<str>,
    tables: &ReferenceTables,
    report: &mut Report,
) -> Option<AncestorIds> {
    match level {
        GeoLevel::State => {
            let state = match tables.state(id) {
                Some(state) => state,
                None => {
                    report.push(Warning::InvalidStateCode { id: id.to_string() });
                    return None;
                }
            };
            Some(AncestorIds {
                region: state.region_id.clone(),
                state: state.id.clone(),
                registry: None,
                hsa: None,
                county: None,
            })
        }
        GeoLevel::County | GeoLevel::Tract => {
            let geo = GeoId::new(level, id.clone());
            let county_id = geo.to_parent(GeoLevel::County).id;
            // A missing county row means a bad id, unless the scope flags
            // dropped the whole state it belongs to.
            let county = match tables.county(&county_id) {
                Some(county) => county,
                None => {
                    if tables.state_pruned(&geo.state_prefix()) {
                        report.push(Warning::InvalidStateCode { id: id.to_string() });
                    } else {
                        report.push(Warning::UnmatchedBoundary { id: id.to_string() });
                    }
                    return None;
                }
            };
            let state = match tables.state(&county.state_id) {
                Some(state) => state,
                None => {
                    report.push(Warning::InvalidStateCode { id: id.to_string() });
                    return None;
                }
            };
            Some(AncestorIds {
                region: state.region_id.clone(),
                state: state.id.clone(),
                registry: county.registry_id.clone(),
                hsa: county.hsa_id.clone(),
                county: Some(county.id.clone()),
            })
        }
        GeoLevel::Hsa => {
            let hsa = match tables.hsa(id) {
                Some(hsa) => hsa,
                None => {
                    report.push(Warning::UnmatchedBoundary { id: id.to_string() });
                    return None;
                }
            };
            let state = match tables.state(&hsa.state_id) {
                Some(state) => state,
                None => {
                    report.push(Warning::InvalidStateCode { id: id.to_string() });
                    return None;
                }
            };
            Some(AncestorIds {
                region: state.region_id.clone(),
                state: state.id.clone(),
                registry: hsa.registry_id.clone(),
                hsa: Some(hsa.id.clone()),
                county: None,
            })
        }
        GeoLevel::Registry => {
            let registry = match tables.registry(id) {
                Some(registry) => registry,
                None => {
                    report.push(Warning::UnmatchedBoundary { id: id.to_string() });
                    return None;
                }
            };
            let state = match tables.state(&registry.state_id) {
                Some(state) => state,
                None => {
                    report.push(Warning::InvalidStateCode { id: id.to_string() });
                    return None;
                }
            };
            Some(AncestorIds {
                region: state.region_id.clone(),
                state: state.id.clone(),
                registry: Some(registry.id.clone()),
                hsa: None,
                county: None,
            })
        }
        GeoLevel::Region => None, // regions are never a data level
    }
}
