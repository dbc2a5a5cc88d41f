use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;

use crate::refdata::CensusYear;
use crate::render::LegendPosition;
use crate::resolve::{ClipPolicy, PolicyValue};

/// Choropleth mapping CLI (argument schema only)
#[derive(Parser, Debug)]
#[command(name = "choromap", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a choropleth map from a (location-id, value) table
    Map(MapArgs),
}

/// Raw boundary policy value; legality is checked per level at run time
/// and illegal values fall back to the level default with a warning.
#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
pub enum PolicyArg {
    None,
    Data,
    County,
    Hsa,
    Seer,
    State,
    Region,
    All,
}

impl From<PolicyArg> for PolicyValue {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::None => PolicyValue::None,
            PolicyArg::Data => PolicyValue::Data,
            PolicyArg::County => PolicyValue::County,
            PolicyArg::Hsa => PolicyValue::Hsa,
            PolicyArg::Seer => PolicyValue::Seer,
            PolicyArg::State => PolicyValue::State,
            PolicyArg::Region => PolicyValue::Region,
            PolicyArg::All => PolicyValue::All,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
pub enum ClipArg {
    None,
    Data,
    Hsa,
    Seer,
    State,
    Region,
}

impl From<ClipArg> for ClipPolicy {
    fn from(arg: ClipArg) -> Self {
        match arg {
            ClipArg::None => ClipPolicy::None,
            ClipArg::Data => ClipPolicy::Data,
            ClipArg::Hsa => ClipPolicy::Hsa,
            ClipArg::Seer => ClipPolicy::Seer,
            ClipArg::State => ClipPolicy::State,
            ClipArg::Region => ClipPolicy::Region,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
pub enum YearArg {
    #[value(name = "2000")]
    Y2000,
    #[value(name = "2010")]
    Y2010,
    #[value(name = "2020")]
    Y2020,
}

impl From<YearArg> for CensusYear {
    fn from(arg: YearArg) -> Self {
        match arg {
            YearArg::Y2000 => CensusYear::Y2000,
            YearArg::Y2010 => CensusYear::Y2010,
            YearArg::Y2020 => CensusYear::Y2020,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
pub enum LegendArg {
    Left,
    Right,
    Bottom,
}

impl From<LegendArg> for LegendPosition {
    fn from(arg: LegendArg) -> Self {
        match arg {
            LegendArg::Left => LegendPosition::Left,
            LegendArg::Right => LegendPosition::Right,
            LegendArg::Bottom => LegendPosition::Bottom,
        }
    }
}

#[derive(Args, Debug)]
pub struct MapArgs {
    /// Input CSV with a location-id column and a value column
    #[arg(value_hint = ValueHint::FilePath)]
    pub data: PathBuf,

    /// Output SVG file
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: PathBuf,

    /// Boundary pack directory (manifest.json, tables.json, geometry)
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub pack: PathBuf,

    /// Name of the location-id column
    #[arg(long, default_value = "id")]
    pub id_column: String,

    /// Name of the value column
    #[arg(long, default_value = "value")]
    pub value_column: String,

    /// Optional 0/1 column flagging significant rows for hatching
    #[arg(long)]
    pub significance_column: Option<String>,

    /// Per-level boundary policies (defaults depend on the detected level)
    #[arg(long, value_enum)]
    pub region_boundary: Option<PolicyArg>,
    #[arg(long, value_enum)]
    pub state_boundary: Option<PolicyArg>,
    #[arg(long, value_enum)]
    pub registry_boundary: Option<PolicyArg>,
    #[arg(long, value_enum)]
    pub hsa_boundary: Option<PolicyArg>,
    #[arg(long, value_enum)]
    pub county_boundary: Option<PolicyArg>,
    #[arg(long, value_enum)]
    pub tract_boundary: Option<PolicyArg>,

    /// Which levels' bounding boxes set the plot extent
    #[arg(long, value_enum, default_value_t = ClipArg::Data)]
    pub clip: ClipArg,

    /// Drop non-contiguous states before resolution
    #[arg(long)]
    pub lower48_only: bool,

    /// Keep territories (PR, GU, ...) in the state table
    #[arg(long)]
    pub include_territories: bool,

    /// Census boundary vintage
    #[arg(long, value_enum, default_value_t = YearArg::Y2010)]
    pub year: YearArg,

    /// Number of quantile categories (2-9)
    #[arg(long, default_value_t = 5)]
    pub categories: usize,

    /// Comma-separated explicit breakpoints (overrides --categories)
    #[arg(long)]
    pub breakpoints: Option<String>,

    /// Legend placement
    #[arg(long, value_enum, default_value_t = LegendArg::Right)]
    pub legend: LegendArg,

    /// Map title
    #[arg(long)]
    pub title: Option<String>,

    /// Output width in pixels
    #[arg(long, default_value_t = 800.0)]
    pub width: f64,

    /// Overwrite the output file if it exists
    #[arg(long)]
    pub force: bool,
}
