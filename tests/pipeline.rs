//! End-to-end pipeline tests over the shared fixture world.

mod common;

use choromap::pipeline::{run, RunOptions};
use choromap::record::{DataValue, InputRow};
use choromap::report::Warning;
use choromap::resolve::{ClipPolicy, PolicyValue};
use choromap::types::GeoLevel;

fn rows(entries: &[(&str, f64)]) -> Vec<InputRow> {
    entries
        .iter()
        .map(|(id, value)| InputRow {
            id: Some(id.to_string()),
            value: Some(DataValue::Number(*value)),
            significant: false,
        })
        .collect()
}

#[test]
fn county_run_maps_and_clips_to_data() {
    let mut repo = common::repo();
    let output = run(
        &rows(&[("06037", 1.0), ("06073", 2.0)]),
        &RunOptions::default(),
        &mut repo,
    )
    .unwrap();

    assert_eq!(output.level, GeoLevel::County);
    assert_eq!(output.records.len(), 2);
    assert_eq!(&*output.records[0].ancestors.state, "06");

    let county = output.selections.county.as_ref().unwrap();
    assert!(county.go);
    assert_eq!(county.ids.len(), 2);

    // Clip defaults to DATA: the two county squares.
    assert_eq!(output.extent.x_range, (0.0, 3.0));
    assert_eq!(output.extent.y_range, (0.0, 1.0));
    assert!(output.report.is_empty());
}

#[test]
fn unknown_county_is_dropped_and_run_continues() {
    let mut repo = common::repo();
    let output = run(
        &rows(&[("06037", 1.0), ("99999", 2.0)]),
        &RunOptions::default(),
        &mut repo,
    )
    .unwrap();

    assert_eq!(output.records.len(), 1);
    assert_eq!(
        output.report.warnings(),
        &[Warning::UnmatchedBoundary { id: "99999".into() }]
    );
}

#[test]
fn all_rows_invalid_is_fatal() {
    let mut repo = common::repo();
    let err = run(&rows(&[("99999", 1.0)]), &RunOptions::default(), &mut repo).unwrap_err();
    assert!(err.to_string().contains("no rows left to map"));
}

#[test]
fn state_data_draws_every_state_by_default() {
    let mut repo = common::repo();
    let output = run(&rows(&[("06", 1.0), ("32", 2.0)]), &RunOptions::default(), &mut repo)
        .unwrap();

    assert_eq!(output.level, GeoLevel::State);
    // Default state policy for state data is ALL.
    let plist = output.plists.state.as_ref().unwrap();
    assert_eq!(plist.len(), 3);
    assert!(output.selections.state.as_ref().unwrap().go);
}

#[test]
fn clip_at_data_level_downgrades_with_one_warning() {
    let mut repo = common::repo();
    let opts = RunOptions { clip: ClipPolicy::State, ..Default::default() };
    let output = run(&rows(&[("06", 1.0), ("32", 2.0)]), &opts, &mut repo).unwrap();

    let downgrades: Vec<_> = output
        .report
        .warnings()
        .iter()
        .filter(|w| matches!(w, Warning::ClipDowngraded { .. }))
        .collect();
    assert_eq!(downgrades.len(), 1);

    let mut repo = common::repo();
    let data_only = run(
        &rows(&[("06", 1.0), ("32", 2.0)]),
        &RunOptions { clip: ClipPolicy::Data, ..Default::default() },
        &mut repo,
    )
    .unwrap();
    assert_eq!(output.extent, data_only.extent);
}

#[test]
fn registry_names_map_through_aliases() {
    let mut repo = common::repo();
    let output = run(
        &rows(&[("Los Angeles", 1.0), ("Hawaii", 2.0)]),
        &RunOptions::default(),
        &mut repo,
    )
    .unwrap();

    assert_eq!(output.level, GeoLevel::Registry);
    let ids: Vec<&str> = output.records.iter().map(|r| &*r.canonical_id).collect();
    assert_eq!(ids, vec!["CA-LA", "HI"]);
}

#[test]
fn seer_expansion_keeps_uncovered_counties() {
    // 06037 sits in registry CA-LA; 32003 is in a state with no registry
    // at all. SEER expansion adds the registry sibling 06059 but must not
    // drop 32003.
    let mut repo = common::repo();
    let opts = RunOptions {
        policies: vec![(GeoLevel::County, PolicyValue::Seer)],
        ..Default::default()
    };
    let output = run(&rows(&[("06037", 1.0), ("32003", 2.0)]), &opts, &mut repo).unwrap();

    let plist: Vec<&str> = output
        .plists
        .county
        .as_ref()
        .unwrap()
        .iter()
        .map(|s| &**s)
        .collect();
    assert_eq!(plist, vec!["06037", "06059", "32003"]);
}

#[test]
fn seer_plist_always_contains_the_data_ids() {
    let mut repo = common::repo();
    let opts = RunOptions {
        policies: vec![(GeoLevel::County, PolicyValue::Seer)],
        ..Default::default()
    };
    let output = run(
        &rows(&[("06073", 1.0), ("32003", 2.0), ("06037", 3.0)]),
        &opts,
        &mut repo,
    )
    .unwrap();

    let plist = output.plists.county.as_ref().unwrap();
    for record in &output.records {
        assert!(plist.contains(&record.canonical_id));
    }
}

#[test]
fn state_overlay_policy_draws_sibling_counties() {
    let mut repo = common::repo();
    let opts = RunOptions {
        policies: vec![
            (GeoLevel::County, PolicyValue::State),
            (GeoLevel::State, PolicyValue::Data),
        ],
        ..Default::default()
    };
    let output = run(&rows(&[("06037", 1.0)]), &opts, &mut repo).unwrap();

    let counties: Vec<&str> = output
        .plists
        .county
        .as_ref()
        .unwrap()
        .iter()
        .map(|s| &**s)
        .collect();
    assert_eq!(counties, vec!["06037", "06059", "06073"]);
    assert!(output.selections.state.as_ref().unwrap().go);
}

#[test]
fn clip_none_widens_to_every_active_overlay() {
    let mut repo = common::repo();
    let opts = RunOptions {
        policies: vec![(GeoLevel::State, PolicyValue::Data)],
        clip: ClipPolicy::None,
        ..Default::default()
    };
    let output = run(&rows(&[("06037", 1.0)]), &opts, &mut repo).unwrap();

    // The state box (0..3) is wider than the single county (0..1).
    assert_eq!(output.extent.x_range, (0.0, 3.0));
}

#[test]
fn lower48_scope_drops_hawaii_rows() {
    let mut repo = common::repo();
    let opts = RunOptions { lower48_only: true, ..Default::default() };
    let output = run(&rows(&[("06037", 1.0), ("15001", 2.0)]), &opts, &mut repo).unwrap();

    assert_eq!(output.records.len(), 1);
    assert_eq!(
        output.report.warnings(),
        &[Warning::InvalidStateCode { id: "15001".into() }]
    );
}

#[test]
fn tract_run_expands_within_counties() {
    let mut repo = common::repo();
    let opts = RunOptions {
        policies: vec![(GeoLevel::Tract, PolicyValue::County)],
        mode: choromap::categorize::CategorizeMode::Quantiles { categories: 2 },
        ..Default::default()
    };
    let output = run(
        &rows(&[("06037100000", 1.0), ("06037200000", 2.0)]),
        &opts,
        &mut repo,
    )
    .unwrap();

    assert_eq!(output.level, GeoLevel::Tract);
    let tracts: Vec<&str> = output
        .plists
        .tract
        .as_ref()
        .unwrap()
        .iter()
        .map(|s| &**s)
        .collect();
    // County expansion stays inside 06037: the 06059 tract is not added.
    assert_eq!(tracts, vec!["06037100000", "06037200000"]);
}

#[test]
fn duplicate_rows_warn_and_keep_first() {
    let mut repo = common::repo();
    let output = run(
        &rows(&[("06037", 1.0), ("6037", 9.0), ("06073", 2.0)]),
        &RunOptions::default(),
        &mut repo,
    )
    .unwrap();

    assert_eq!(output.records.len(), 2);
    assert_eq!(output.records[0].value, DataValue::Number(1.0));
    assert_eq!(
        output.report.warnings(),
        &[Warning::DuplicateId { id: "06037".into() }]
    );
}
