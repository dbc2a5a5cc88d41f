//! The linear run pipeline: classify -> resolve -> select -> extent ->
//! categorize -> plan. Each stage consumes the previous stage's output;
//! nothing is shared or mutated across runs, so the whole pipeline is
//! re-entrant over a shared (read-only) boundary repository.

use anyhow::Result;

use crate::categorize::{categorize, Categorized, CategorizeMode};
use crate::classify::classify;
use crate::extent::{compute_extent, Extent};
use crate::record::{build_records, InputRow, LocationRecord};
use crate::refdata::{BoundaryRepository, CensusYear};
use crate::render::{build_render_plan, LegendPosition, RenderPlan};
use crate::report::Report;
use crate::resolve::{resolve, ClipPolicy, PLists, PolicySet, PolicyValue};
use crate::select::{select, Selections};
use crate::types::GeoLevel;

/// Declarative settings for one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Per-level boundary policy overrides; anything not set here keeps
    /// the default for the detected data level.
    pub policies: Vec<(GeoLevel, PolicyValue)>,
    pub clip: ClipPolicy,
    pub lower48_only: bool,
    pub include_territories: bool,
    pub year: CensusYear,
    pub mode: CategorizeMode,
    pub legend_position: LegendPosition,
    pub title: Option<String>,
    pub verbose: u8,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            policies: Vec::new(),
            clip: ClipPolicy::Data,
            lower48_only: false,
            include_territories: false,
            year: CensusYear::default(),
            mode: CategorizeMode::Quantiles { categories: 5 },
            legend_position: LegendPosition::Right,
            title: None,
            verbose: 0,
        }
    }
}

/// Everything a completed run produced.
#[derive(Debug)]
pub struct RunOutput {
    pub level: GeoLevel,
    pub records: Vec<LocationRecord>,
    pub plists: PLists,
    pub selections: Selections,
    pub extent: Extent,
    pub categorized: Categorized,
    pub plan: RenderPlan,
    pub report: Report,
}

/// Run the full pipeline over one dataset.
///
/// Fatal problems abort with an error; everything recoverable lands in
/// the returned report and the run completes with whatever rows survive.
pub fn run(
    rows: &[InputRow],
    opts: &RunOptions,
    repo: &mut dyn BoundaryRepository,
) -> Result<RunOutput> {
    let mut report = Report::new();

    let tables = repo
        .tables()?
        .scoped(opts.lower48_only, opts.include_territories);

    let raw_ids: Vec<Option<String>> = rows.iter().map(|row| row.id.clone()).collect();
    let classification = classify(&raw_ids, &tables, &mut report)?;
    let level = classification.level;
    if opts.verbose > 0 {
        eprintln!("[classify] level={level} rows={}", rows.len());
    }

    let (records, data) = build_records(rows, &classification, &tables, &mut report)?;
    if opts.verbose > 0 {
        eprintln!("[records] valid={} dropped={}", records.len(), rows.len() - records.len());
    }

    let mut policies = PolicySet::defaults_for(level);
    for &(target, value) in &opts.policies {
        policies.apply(target, value, level, &mut report);
    }

    // Tracts have no reference table; the resolver needs the loaded tract
    // geometry ids as its universe for sibling expansion.
    let tract_universe = if level == GeoLevel::Tract {
        let mut states: Vec<_> = data.state.iter().cloned().collect();
        states.sort_unstable();
        let collection = repo.load_level(GeoLevel::Tract, &states, opts.year)?;
        Some(collection.ids().to_vec())
    } else {
        None
    };

    let plists = resolve(level, &data, &tables, &policies, tract_universe.as_deref());
    if opts.verbose > 1 {
        for lvl in GeoLevel::order() {
            if let Some(plist) = plists.get(lvl) {
                eprintln!("[resolve] {lvl}: {} ids", plist.len());
            }
        }
    }

    let selections = select(level, &plists, &tables, repo, opts.year, &mut report)?;
    let extent = compute_extent(&selections, opts.clip, level, &mut report)?;
    if opts.verbose > 0 {
        eprintln!(
            "[extent] x=({:.3}, {:.3}) y=({:.3}, {:.3}) aspect={:.3}",
            extent.x_range.0, extent.x_range.1, extent.y_range.0, extent.y_range.1,
            extent.aspect(),
        );
    }

    let values: Vec<_> = records.iter().map(|r| r.value.clone()).collect();
    let categorized = categorize(&values, &opts.mode, &mut report)?;

    let plan = build_render_plan(
        level,
        &selections,
        &records,
        &categorized,
        extent,
        opts.legend_position,
        opts.title.clone(),
    );

    Ok(RunOutput {
        level,
        records,
        plists,
        selections,
        extent,
        categorized,
        plan,
        report,
    })
}
