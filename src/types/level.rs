use std::fmt;

/// One level of the administrative hierarchy, coarsest first.
///
/// Registries and HSAs are county groupings that sit between county and
/// state but do not necessarily partition their state: a county may belong
/// to no registry and no HSA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GeoLevel {
    Region,     // Census region, parent of states
    State,      // State -> Region
    Registry,   // Seer registry -> State (partial cover)
    Hsa,        // Health service area -> State (partial cover)
    County,     // County -> State, Registry?, Hsa?
    Tract,      // Census tract -> County (prefix)
}

impl GeoLevel {
    pub fn to_str(&self) -> &'static str {
        match self {
            GeoLevel::Region => "region",
            GeoLevel::State => "state",
            GeoLevel::Registry => "registry",
            GeoLevel::Hsa => "hsa",
            GeoLevel::County => "county",
            GeoLevel::Tract => "tract",
        }
    }

    /// All levels, coarsest to finest. Paint order is the reverse.
    pub fn order() -> [GeoLevel; 6] {
        [
            GeoLevel::Region,
            GeoLevel::State,
            GeoLevel::Registry,
            GeoLevel::Hsa,
            GeoLevel::County,
            GeoLevel::Tract,
        ]
    }

    /// Fixed digit width of a canonical numeric identifier at this level.
    /// Registry ids are alphabetic abbreviations and have no fixed width.
    pub fn canonical_width(&self) -> Option<usize> {
        match self {
            GeoLevel::Region => Some(1),
            GeoLevel::State => Some(2),
            GeoLevel::Hsa => Some(3),
            GeoLevel::County => Some(5),
            GeoLevel::Tract => Some(11),
            GeoLevel::Registry => None,
        }
    }

    /// True if `self` is strictly finer (more detailed) than `other`.
    ///
    /// Fineness follows the drawing hierarchy tract < county < HSA <
    /// registry < state < region, which matches the derived `Ord`.
    pub fn finer_than(&self, other: GeoLevel) -> bool {
        self > &other
    }
}

impl fmt::Display for GeoLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}
