use std::fmt;
use std::str::FromStr;

use anyhow::bail;

use crate::report::{Report, Warning};
use crate::types::GeoLevel;

/// Raw, level-agnostic policy value as supplied by the caller.
/// Each level accepts only a subset; illegal values fall back to that
/// level's default with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyValue {
    None,
    Data,
    County,
    Hsa,
    Seer,
    State,
    Region,
    All,
}

impl PolicyValue {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyValue::None => "none",
            PolicyValue::Data => "data",
            PolicyValue::County => "county",
            PolicyValue::Hsa => "hsa",
            PolicyValue::Seer => "seer",
            PolicyValue::State => "state",
            PolicyValue::Region => "region",
            PolicyValue::All => "all",
        }
    }
}

impl fmt::Display for PolicyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyValue {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(PolicyValue::None),
            "data" => Ok(PolicyValue::Data),
            "county" => Ok(PolicyValue::County),
            "hsa" => Ok(PolicyValue::Hsa),
            "seer" => Ok(PolicyValue::Seer),
            "state" => Ok(PolicyValue::State),
            "region" => Ok(PolicyValue::Region),
            "all" => Ok(PolicyValue::All),
            other => bail!("unknown boundary policy {other:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegionPolicy {
    #[default]
    None,
    Data,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatePolicy {
    #[default]
    None,
    Data,
    Region,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistryPolicy {
    #[default]
    None,
    Data,
    State,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HsaPolicy {
    #[default]
    None,
    Data,
    Seer,
    State,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountyPolicy {
    #[default]
    None,
    Data,
    Hsa,
    Seer,
    State,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TractPolicy {
    #[default]
    None,
    Data,
    County,
    Hsa,
    Seer,
    State,
}

impl RegionPolicy {
    fn from_value(value: PolicyValue) -> Option<Self> {
        match value {
            PolicyValue::None => Some(RegionPolicy::None),
            PolicyValue::Data => Some(RegionPolicy::Data),
            PolicyValue::All => Some(RegionPolicy::All),
            _ => None,
        }
    }
}

impl StatePolicy {
    fn from_value(value: PolicyValue) -> Option<Self> {
        match value {
            PolicyValue::None => Some(StatePolicy::None),
            PolicyValue::Data => Some(StatePolicy::Data),
            PolicyValue::Region => Some(StatePolicy::Region),
            PolicyValue::All => Some(StatePolicy::All),
            _ => None,
        }
    }
}

impl RegistryPolicy {
    fn from_value(value: PolicyValue) -> Option<Self> {
        match value {
            PolicyValue::None => Some(RegistryPolicy::None),
            PolicyValue::Data => Some(RegistryPolicy::Data),
            PolicyValue::State => Some(RegistryPolicy::State),
            PolicyValue::All => Some(RegistryPolicy::All),
            _ => None,
        }
    }
}

impl HsaPolicy {
    fn from_value(value: PolicyValue) -> Option<Self> {
        match value {
            PolicyValue::None => Some(HsaPolicy::None),
            PolicyValue::Data => Some(HsaPolicy::Data),
            PolicyValue::Seer => Some(HsaPolicy::Seer),
            PolicyValue::State => Some(HsaPolicy::State),
            _ => None,
        }
    }
}

impl CountyPolicy {
    fn from_value(value: PolicyValue) -> Option<Self> {
        match value {
            PolicyValue::None => Some(CountyPolicy::None),
            PolicyValue::Data => Some(CountyPolicy::Data),
            PolicyValue::Hsa => Some(CountyPolicy::Hsa),
            PolicyValue::Seer => Some(CountyPolicy::Seer),
            PolicyValue::State => Some(CountyPolicy::State),
            _ => None,
        }
    }
}

impl TractPolicy {
    fn from_value(value: PolicyValue) -> Option<Self> {
        match value {
            PolicyValue::None => Some(TractPolicy::None),
            PolicyValue::Data => Some(TractPolicy::Data),
            PolicyValue::County => Some(TractPolicy::County),
            PolicyValue::Hsa => Some(TractPolicy::Hsa),
            PolicyValue::Seer => Some(TractPolicy::Seer),
            PolicyValue::State => Some(TractPolicy::State),
            _ => None,
        }
    }
}

/// The six per-level boundary policies for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicySet {
    pub region: RegionPolicy,
    pub state: StatePolicy,
    pub registry: RegistryPolicy,
    pub hsa: HsaPolicy,
    pub county: CountyPolicy,
    pub tract: TractPolicy,
}

impl PolicySet {
    /// Defaults keyed on the detected data level: draw the data level
    /// itself (all states for state data), nothing else.
    pub fn defaults_for(data_level: GeoLevel) -> Self {
        let mut set = Self {
            region: RegionPolicy::None,
            state: StatePolicy::None,
            registry: RegistryPolicy::None,
            hsa: HsaPolicy::None,
            county: CountyPolicy::None,
            tract: TractPolicy::None,
        };
        match data_level {
            GeoLevel::State => set.state = StatePolicy::All,
            GeoLevel::County => set.county = CountyPolicy::Data,
            GeoLevel::Tract => set.tract = TractPolicy::Data,
            GeoLevel::Registry => set.registry = RegistryPolicy::Data,
            GeoLevel::Hsa => set.hsa = HsaPolicy::Data,
            GeoLevel::Region => set.region = RegionPolicy::Data,
        }
        set
    }

    /// Apply one caller override. An illegal value for the level keeps the
    /// default and records a warning, as does any non-NONE value for an
    /// HSA/county/tract level finer than the data level (no geometry exists
    /// below the data level). Region, state and registry overlays are
    /// legal at every data level.
    pub fn apply(
        &mut self,
        target: GeoLevel,
        value: PolicyValue,
        data_level: GeoLevel,
        report: &mut Report,
    ) {
        let gated = matches!(target, GeoLevel::Hsa | GeoLevel::County | GeoLevel::Tract);
        if gated && target.finer_than(data_level) && value != PolicyValue::None {
            report.push(Warning::InvalidPolicy { level: target, given: value.to_string() });
            return;
        }
        let accepted = match target {
            GeoLevel::Region => RegionPolicy::from_value(value)
                .map(|p| self.region = p)
                .is_some(),
            GeoLevel::State => StatePolicy::from_value(value)
                .map(|p| self.state = p)
                .is_some(),
            GeoLevel::Registry => RegistryPolicy::from_value(value)
                .map(|p| self.registry = p)
                .is_some(),
            GeoLevel::Hsa => HsaPolicy::from_value(value).map(|p| self.hsa = p).is_some(),
            GeoLevel::County => CountyPolicy::from_value(value)
                .map(|p| self.county = p)
                .is_some(),
            GeoLevel::Tract => TractPolicy::from_value(value)
                .map(|p| self.tract = p)
                .is_some(),
        };
        if !accepted {
            report.push(Warning::InvalidPolicy { level: target, given: value.to_string() });
        }
    }
}

/// Which per-level bounding boxes feed the final plot extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipPolicy {
    /// Union of every active level's box (widest).
    None,
    /// The data level's box only (tightest).
    #[default]
    Data,
    Hsa,
    Seer,
    State,
    Region,
}

impl ClipPolicy {
    /// The hierarchy level this clip value refers to, if any.
    pub fn level(&self) -> Option<GeoLevel> {
        match self {
            ClipPolicy::None | ClipPolicy::Data => None,
            ClipPolicy::Hsa => Some(GeoLevel::Hsa),
            ClipPolicy::Seer => Some(GeoLevel::Registry),
            ClipPolicy::State => Some(GeoLevel::State),
            ClipPolicy::Region => Some(GeoLevel::Region),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClipPolicy::None => "none",
            ClipPolicy::Data => "data",
            ClipPolicy::Hsa => "hsa",
            ClipPolicy::Seer => "seer",
            ClipPolicy::State => "state",
            ClipPolicy::Region => "region",
        }
    }
}

impl fmt::Display for ClipPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClipPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(ClipPolicy::None),
            "data" => Ok(ClipPolicy::Data),
            "hsa" => Ok(ClipPolicy::Hsa),
            "seer" => Ok(ClipPolicy::Seer),
            "state" => Ok(ClipPolicy::State),
            "region" => Ok(ClipPolicy::Region),
            other => bail!("unknown clip policy {other:?}"),
        }
    }
}
