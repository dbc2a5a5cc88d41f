use std::fmt;
use std::sync::Arc;

use super::level::GeoLevel;

/// Stable key for a geographic entity at any level.
/// Keeps the canonical id text (with leading zeros) but avoids repeated
/// owned Strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeoId {
    pub level: GeoLevel,
    pub id: Arc<str>, // e.g. "06" for a state, "06037" for a county
}

impl GeoId {
    pub fn new(level: GeoLevel, id: impl Into<Arc<str>>) -> Self {
        Self { level, id: id.into() }
    }

    /// Returns the ancestor `GeoId` at a coarser prefix-encoded level by
    /// truncating the id string to that level's canonical width.
    ///
    /// Only works along the prefix chain tract -> county -> state: registry
    /// and HSA membership is not prefix-encoded and needs a reference-table
    /// lookup instead.
    pub fn to_parent(&self, parent: GeoLevel) -> GeoId {
        let len = parent.canonical_width().unwrap_or(self.id.len());

        // If the id is shorter than expected, just take the full id.
        let prefix: Arc<str> = Arc::from(&self.id[..self.id.len().min(len)]);

        GeoId { level: parent, id: prefix }
    }

    /// State prefix of a county or tract id.
    pub fn state_prefix(&self) -> Arc<str> {
        Arc::from(&self.id[..self.id.len().min(2)])
    }
}

impl fmt::Display for GeoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.level, self.id)
    }
}

/// Zero-pad a numeric id to the canonical width of `level`.
/// Registry ids are uppercased instead.
pub fn canonicalize(level: GeoLevel, raw: &str) -> Arc<str> {
    match level.canonical_width() {
        Some(width) if raw.len() < width => {
            let mut out = String::with_capacity(width);
            for _ in raw.len()..width {
                out.push('0');
            }
            out.push_str(raw);
            Arc::from(out)
        }
        Some(_) => Arc::from(raw),
        None => Arc::from(raw.to_ascii_uppercase()),
    }
}
