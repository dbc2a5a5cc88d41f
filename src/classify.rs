//! Identifier classification.
//!
//! The geographic level of a dataset is inferred purely from the shape of
//! its location ids: digit width for numeric ids, registry abbreviation or
//! alias matching for text ids. The whole dataset must be homogeneous;
//! mixed formats are a configuration error, not a row problem.

use std::sync::Arc;

use anyhow::{bail, Result};
use regex::Regex;

use crate::refdata::ReferenceTables;
use crate::report::{Report, Warning};
use crate::types::{canonicalize, GeoLevel};

/// Result of classifying a whole dataset's ids.
#[derive(Debug)]
pub struct Classification {
    pub level: GeoLevel,
    /// Canonical id per input row, `None` where the row was dropped.
    pub ids: Vec<Option<Arc<str>>>,
}

/// Detect the dataset's level and canonicalize every id.
///
/// Non-fatal problems (missing ids, unmatched registry names) drop the row
/// and accumulate in `report`; mixed formats and unrecognizable digit
/// widths abort.
pub fn classify(
    raw_ids: &[Option<String>],
    tables: &ReferenceTables,
    report: &mut Report,
) -> Result<Classification> {
    let numeric = Regex::new(r"^[0-9]+$").expect("static pattern");

    let mut present: Vec<(usize, &str)> = Vec::with_capacity(raw_ids.len());
    for (row, raw) in raw_ids.iter().enumerate() {
        match raw.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => present.push((row, id)),
            _ => report.push(Warning::MissingId { row }),
        }
    }
    if present.is_empty() {
        bail!("no location ids to classify");
    }

    let numeric_count = present.iter().filter(|(_, id)| numeric.is_match(id)).count();
    if numeric_count != 0 && numeric_count != present.len() {
        bail!("location ids mix numeric and non-numeric formats; cannot infer a single level");
    }

    let mut ids: Vec<Option<Arc<str>>> = vec![None; raw_ids.len()];
    let level = if numeric_count == present.len() {
        let level = detect_numeric_level(&present, tables)?;
        for &(row, id) in &present {
            ids[row] = Some(canonicalize(level, id));
        }
        level
    } else {
        // Registry names: exact abbreviation match first, then alias
        // substring match; unmapped names drop their rows.
        for &(row, id) in &present {
            match tables.match_registry(id) {
                Some(registry) => ids[row] = Some(registry),
                None => report.push(Warning::UnmatchedRegistryName { name: id.to_string() }),
            }
        }
        GeoLevel::Registry
    };

    Ok(Classification { level, ids })
}

/// Level from the maximum digit width across the dataset.
///
/// One- and two-digit ids are states unless they fail the state-table
/// existence check, in which case they are reinterpreted as 3-digit HSA
/// codes (HSA codes with dropped leading zeros overlap the state range).
/// Ids matching neither table are a hard error requiring user correction.
fn detect_numeric_level(present: &[(usize, &str)], tables: &ReferenceTables) -> Result<GeoLevel> {
    let max_len = present.iter().map(|(_, id)| id.len()).max().unwrap_or(0);

    match max_len {
        1 | 2 => {
            let all_states = present
                .iter()
                .all(|(_, id)| tables.state(&canonicalize(GeoLevel::State, id)).is_some());
            if all_states {
                return Ok(GeoLevel::State);
            }
            let all_hsas = present
                .iter()
                .all(|(_, id)| tables.hsa(&canonicalize(GeoLevel::Hsa, id)).is_some());
            if all_hsas {
                return Ok(GeoLevel::Hsa);
            }
            let offender = present
                .iter()
                .find(|(_, id)| {
                    tables.state(&canonicalize(GeoLevel::State, id)).is_none()
                        && tables.hsa(&canonicalize(GeoLevel::Hsa, id)).is_none()
                })
                .map(|(_, id)| *id)
                .unwrap_or("?");
            bail!(
                "id {offender:?} matches neither a state code nor an HSA code; \
                 correct the input ids"
            )
        }
        3 => Ok(GeoLevel::Hsa),
        4 | 5 => Ok(GeoLevel::County),
        10 | 11 => Ok(GeoLevel::Tract),
        other => bail!("cannot infer a geographic level from {other}-digit identifiers"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refdata::{CountyRow, HsaRow, RegionRow, RegistryRow, StateRow};

    fn tables() -> ReferenceTables {
        ReferenceTables::from_rows(
            vec![RegionRow { id: "4".into(), name: "West".into() }],
            vec![
                StateRow {
                    id: "01".into(),
                    region_id: "4".into(),
                    name: "Alabama".into(),
                    abbr: "AL".into(),
                    lower48: true,
                    territory: false,
                },
                StateRow {
                    id: "02".into(),
                    region_id: "4".into(),
                    name: "Alaska".into(),
                    abbr: "AK".into(),
                    lower48: false,
                    territory: false,
                },
                StateRow {
                    id: "06".into(),
                    region_id: "4".into(),
                    name: "California".into(),
                    abbr: "CA".into(),
                    lower48: true,
                    territory: false,
                },
                StateRow {
                    id: "15".into(),
                    region_id: "4".into(),
                    name: "Hawaii".into(),
                    abbr: "HI".into(),
                    lower48: false,
                    territory: false,
                },
            ],
            vec![
                RegistryRow {
                    id: "CA-LA".into(),
                    state_id: "06".into(),
                    name: "Los Angeles".into(),
                    aliases: vec!["Los Angeles".into()],
                },
                RegistryRow {
                    id: "HI".into(),
                    state_id: "15".into(),
                    name: "Hawaii".into(),
                    aliases: vec!["Hawaii".into()],
                },
            ],
            vec![
                HsaRow {
                    id: "035".into(),
                    state_id: "06".into(),
                    registry_id: None,
                    name: "Los Angeles HSA".into(),
                    county_count: 1,
                },
                HsaRow {
                    id: "099".into(),
                    state_id: "06".into(),
                    registry_id: None,
                    name: "Inland HSA".into(),
                    county_count: 1,
                },
            ],
            vec![CountyRow {
                id: "06037".into(),
                state_id: "06".into(),
                registry_id: Some("CA-LA".into()),
                hsa_id: Some("035".into()),
                name: "Los Angeles County".into(),
                tract_count: 2,
            }],
        )
    }

    fn raw(ids: &[&str]) -> Vec<Option<String>> {
        ids.iter().map(|s| Some(s.to_string())).collect()
    }

    #[test]
    fn five_digit_ids_are_counties() {
        let mut report = Report::new();
        let c = classify(&raw(&["06037", "06073"]), &tables(), &mut report).unwrap();
        assert_eq!(c.level, GeoLevel::County);
        assert_eq!(c.ids[0].as_deref(), Some("06037"));
        assert_eq!(c.ids[1].as_deref(), Some("06073"));
        assert!(report.is_empty());
    }

    #[test]
    fn short_numeric_ids_are_states_zero_padded() {
        let mut report = Report::new();
        let c = classify(&raw(&["1", "2"]), &tables(), &mut report).unwrap();
        assert_eq!(c.level, GeoLevel::State);
        assert_eq!(c.ids[0].as_deref(), Some("01"));
        assert_eq!(c.ids[1].as_deref(), Some("02"));
    }

    #[test]
    fn registry_names_match_by_alias() {
        let mut report = Report::new();
        let c = classify(&raw(&["Los Angeles", "Hawaii"]), &tables(), &mut report).unwrap();
        assert_eq!(c.level, GeoLevel::Registry);
        assert_eq!(c.ids[0].as_deref(), Some("CA-LA"));
        assert_eq!(c.ids[1].as_deref(), Some("HI"));
    }

    #[test]
    fn unknown_state_codes_downgrade_to_hsa() {
        // "35" and "99" are not state codes but "035"/"099" are HSAs.
        let mut report = Report::new();
        let c = classify(&raw(&["35", "99"]), &tables(), &mut report).unwrap();
        assert_eq!(c.level, GeoLevel::Hsa);
        assert_eq!(c.ids[0].as_deref(), Some("035"));
    }

    #[test]
    fn id_matching_neither_table_is_fatal() {
        let mut report = Report::new();
        let err = classify(&raw(&["77"]), &tables(), &mut report).unwrap_err();
        assert!(err.to_string().contains("77"));
    }

    #[test]
    fn mixed_formats_are_fatal() {
        let mut report = Report::new();
        assert!(classify(&raw(&["06037", "Hawaii"]), &tables(), &mut report).is_err());
    }

    #[test]
    fn missing_ids_drop_with_warning() {
        let mut report = Report::new();
        let rows = vec![Some("06037".to_string()), None, Some("  ".to_string())];
        let c = classify(&rows, &tables(), &mut report).unwrap();
        assert_eq!(c.level, GeoLevel::County);
        assert!(c.ids[1].is_none());
        assert!(c.ids[2].is_none());
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn unmatched_registry_name_drops_row() {
        let mut report = Report::new();
        let c = classify(&raw(&["Hawaii", "Atlantis"]), &tables(), &mut report).unwrap();
        assert_eq!(c.ids[0].as_deref(), Some("HI"));
        assert!(c.ids[1].is_none());
        assert_eq!(
            report.warnings()[0],
            Warning::UnmatchedRegistryName { name: "Atlantis".into() }
        );
    }

    #[test]
    fn classification_is_idempotent() {
        let mut report = Report::new();
        let first = classify(&raw(&["6037", "6073"]), &tables(), &mut report).unwrap();
        let canonical: Vec<Option<String>> = first
            .ids
            .iter()
            .map(|id| id.as_deref().map(String::from))
            .collect();
        let second = classify(&canonical, &tables(), &mut report).unwrap();
        assert_eq!(second.level, first.level);
        assert_eq!(second.ids, first.ids);
    }
}
