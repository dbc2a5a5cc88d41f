use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use polars::frame::DataFrame;
use polars::io::SerReader;
use polars::prelude::{CsvReadOptions, CsvReader, DataType, Field, Schema};

use crate::cli::{Cli, MapArgs};
use crate::categorize::CategorizeMode;
use crate::pipeline::{run, RunOptions};
use crate::record::{DataValue, InputRow};
use crate::refdata::JsonPackRepository;
use crate::render::render_svg;
use crate::resolve::PolicyValue;
use crate::types::GeoLevel;

pub fn run_map(cli: &Cli, args: &MapArgs) -> Result<()> {
    if args.output == Path::new("-") {
        bail!("stdout is not supported.");
    }
    if args.output.exists() && !args.force {
        bail!("{} already exists (use --force to overwrite)", args.output.display());
    }

    if cli.verbose > 0 {
        eprintln!("[map] data={} pack={}", args.data.display(), args.pack.display());
    }

    let df = read_data_csv(&args.data, &args.id_column)?;
    let rows = extract_rows(&df, args)?;

    let mut repo = JsonPackRepository::open(&args.pack)?;
    let opts = build_options(cli, args)?;

    let output = run(&rows, &opts, &mut repo)?;
    render_svg(&args.output, &output.plan, &output.selections, args.width)?;

    output.report.print();
    if cli.verbose > 0 || !output.report.is_empty() {
        eprintln!(
            "[map] {} rows mapped at {} level ({} warnings) -> {}",
            output.records.len(),
            output.level,
            output.report.len(),
            args.output.display(),
        );
    }
    Ok(())
}

/// Read the input CSV, forcing the id column to string so leading zeros
/// survive.
fn read_data_csv(path: &Path, id_column: &str) -> Result<DataFrame> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open data file {}", path.display()))?;
    let schema = Schema::from_iter([Field::new(id_column.into(), DataType::String)]);
    let options = CsvReadOptions::default().with_schema_overwrite(Some(Arc::new(schema)));
    CsvReader::new(file)
        .with_options(options)
        .finish()
        .with_context(|| format!("failed to read CSV from {}", path.display()))
}

fn extract_rows(df: &DataFrame, args: &MapArgs) -> Result<Vec<InputRow>> {
    let ids = df
        .column(&args.id_column)
        .with_context(|| format!("missing id column {:?}", args.id_column))?
        .cast(&DataType::String)?;
    let ids = ids.str()?;

    let values = df
        .column(&args.value_column)
        .with_context(|| format!("missing value column {:?}", args.value_column))?
        .cast(&DataType::Float64)?;
    let values = values.f64()?;

    let significant: Option<Vec<bool>> = match &args.significance_column {
        Some(column) => {
            let flags = df
                .column(column)
                .with_context(|| format!("missing significance column {column:?}"))?
                .cast(&DataType::Float64)?;
            Some(
                flags
                    .f64()?
                    .into_iter()
                    .map(|v| v.is_some_and(|v| v != 0.0))
                    .collect(),
            )
        }
        None => None,
    };

    let rows = ids
        .into_iter()
        .zip(values)
        .enumerate()
        .map(|(i, (id, value))| InputRow {
            id: id.map(String::from),
            value: value.map(DataValue::Number),
            significant: significant.as_ref().is_some_and(|flags| flags[i]),
        })
        .collect();
    Ok(rows)
}

fn build_options(cli: &Cli, args: &MapArgs) -> Result<RunOptions> {
    let mut policies: Vec<(GeoLevel, PolicyValue)> = Vec::new();
    let overrides = [
        (GeoLevel::Region, args.region_boundary),
        (GeoLevel::State, args.state_boundary),
        (GeoLevel::Registry, args.registry_boundary),
        (GeoLevel::Hsa, args.hsa_boundary),
        (GeoLevel::County, args.county_boundary),
        (GeoLevel::Tract, args.tract_boundary),
    ];
    for (level, arg) in overrides {
        if let Some(arg) = arg {
            policies.push((level, arg.into()));
        }
    }

    let mode = match &args.breakpoints {
        Some(raw) => {
            let breaks: Vec<f64> = raw
                .split(',')
                .map(|s| s.trim().parse::<f64>().context("invalid breakpoint"))
                .collect::<Result<_>>()?;
            CategorizeMode::Breakpoints { breaks }
        }
        None => CategorizeMode::Quantiles { categories: args.categories },
    };

    Ok(RunOptions {
        policies,
        clip: args.clip.into(),
        lower48_only: args.lower48_only,
        include_territories: args.include_territories,
        year: args.year.into(),
        mode,
        legend_position: args.legend.into(),
        title: args.title.clone(),
        verbose: cli.verbose,
    })
}
