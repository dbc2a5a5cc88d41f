//! Shared fixture: a small three-state world with partial registry/HSA
//! coverage, exercised by the integration tests.
//!
//! ```text
//!   y
//!   1 +-----------+----+   +----+
//!     | 06 (CA)   | 32 |   | 15 |   states
//!   0 | a  b  c   | d  |   |e  f|   counties (a=06037 b=06059 c=06073
//!     +-----------+----+   +----+    d=32003 e=15001 f=15003)
//! ```
//!
//! Registry CA-LA covers counties a and b only; county c and state 32
//! have no registry. HSA 035 covers a+b, HSA 099 covers c, HSA 801
//! covers d.

use std::sync::Arc;

use choromap::refdata::{
    CensusYear, CountyRow, GeometryCollection, HsaRow, MemoryRepository, ReferenceTables,
    RegionRow, RegistryRow, StateRow,
};
use choromap::types::GeoLevel;
use geo::{polygon, MultiPolygon};

pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
    MultiPolygon(vec![polygon![
        (x: x0, y: y0),
        (x: x1, y: y0),
        (x: x1, y: y1),
        (x: x0, y: y1),
        (x: x0, y: y0),
    ]])
}

pub fn tables() -> ReferenceTables {
    ReferenceTables::from_rows(
        vec![RegionRow { id: "4".into(), name: "West".into() }],
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
                registry_id: Some("CA-LA".into()),
                name: "Los Angeles HSA".into(),
                county_count: 2,
            },
            HsaRow {
                id: "099".into(),
                state_id: "06".into(),
                registry_id: None,
                name: "San Diego HSA".into(),
                county_count: 1,
            },
            HsaRow {
                id: "801".into(),
                state_id: "32".into(),
                registry_id: None,
                name: "Clark HSA".into(),
                county_count: 1,
            },
        ],
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
                hsa_id: Some("099".into()),
                name: "San Diego".into(),
                tract_count: 1,
            },
            CountyRow {
                id: "32003".into(),
                state_id: "32".into(),
                registry_id: None,
                hsa_id: Some("801".into()),
                name: "Clark".into(),
                tract_count: 1,
            },
            CountyRow {
                id: "15001".into(),
                state_id: "15".into(),
                registry_id: Some("HI".into()),
                hsa_id: None,
                name: "Hawaii County".into(),
                tract_count: 1,
            },
            CountyRow {
                id: "15003".into(),
                state_id: "15".into(),
                registry_id: Some("HI".into()),
                hsa_id: None,
                name: "Honolulu".into(),
                tract_count: 1,
            },
        ],
    )
}

fn level(
    level: GeoLevel,
    entries: &[(&str, &str, MultiPolygon<f64>)],
) -> GeometryCollection {
    let ids: Vec<Arc<str>> = entries.iter().map(|(id, _, _)| Arc::from(*id)).collect();
    let states: Vec<Arc<str>> = entries.iter().map(|(_, st, _)| Arc::from(*st)).collect();
    let shapes = entries.iter().map(|(_, _, shape)| shape.clone()).collect();
    GeometryCollection::new(level, ids, states, shapes)
}

pub fn repo() -> MemoryRepository {
    let mut repo = MemoryRepository::new(tables());
    let year = CensusYear::Y2010;

    repo.insert_level(
        year,
        level(
            GeoLevel::Region,
            &[("4", "06", rect(0.0, -2.0, 10.0, 1.0))],
        ),
    );
    repo.insert_level(
        year,
        level(
            GeoLevel::State,
            &[
                ("06", "06", rect(0.0, 0.0, 3.0, 1.0)),
                ("32", "32", rect(4.0, 0.0, 5.0, 1.0)),
                ("15", "15", rect(8.0, -2.0, 10.0, -1.0)),
            ],
        ),
    );
    repo.insert_level(
        year,
        level(
            GeoLevel::Registry,
            &[
                ("CA-LA", "06", rect(0.0, 0.0, 2.0, 1.0)),
                ("HI", "15", rect(8.0, -2.0, 10.0, -1.0)),
            ],
        ),
    );
    repo.insert_level(
        year,
        level(
            GeoLevel::Hsa,
            &[
                ("035", "06", rect(0.0, 0.0, 2.0, 1.0)),
                ("099", "06", rect(2.0, 0.0, 3.0, 1.0)),
                ("801", "32", rect(4.0, 0.0, 5.0, 1.0)),
            ],
        ),
    );
    repo.insert_level(
        year,
        level(
            GeoLevel::County,
            &[
                ("06037", "06", rect(0.0, 0.0, 1.0, 1.0)),
                ("06059", "06", rect(1.0, 0.0, 2.0, 1.0)),
                ("06073", "06", rect(2.0, 0.0, 3.0, 1.0)),
                ("32003", "32", rect(4.0, 0.0, 5.0, 1.0)),
                ("15001", "15", rect(8.0, -2.0, 9.0, -1.0)),
                ("15003", "15", rect(9.0, -2.0, 10.0, -1.0)),
            ],
        ),
    );
    repo.insert_level(
        year,
        level(
            GeoLevel::Tract,
            &[
                ("06037100000", "06", rect(0.0, 0.0, 0.5, 1.0)),
                ("06037200000", "06", rect(0.5, 0.0, 1.0, 1.0)),
                ("06059100000", "06", rect(1.0, 0.0, 2.0, 1.0)),
            ],
        ),
    );

    repo
}
