//! Batch accumulation of non-fatal problems.
//!
//! Row drops and policy substitutions never interrupt a run; they collect
//! here and are reported together at the end. Anything fatal goes through
//! `anyhow::Error` instead.

use std::fmt;

use crate::types::GeoLevel;

/// A recoverable problem encountered during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// Row had a null/empty location id; row dropped.
    MissingId { row: usize },
    /// Row had no value; row dropped.
    MissingValue { id: String },
    /// Canonical id appeared more than once; later row dropped.
    DuplicateId { id: String },
    /// Registry name matched neither an abbreviation nor an alias; row dropped.
    UnmatchedRegistryName { name: String },
    /// Id's state is unknown at the state level, or was removed by the
    /// scope flags; row dropped.
    InvalidStateCode { id: String },
    /// Id has no entry in the reference table or loaded geometry; row dropped.
    UnmatchedBoundary { id: String },
    /// Boundary policy value is not legal at this level; level default used.
    InvalidPolicy { level: GeoLevel, given: String },
    /// Clip policy names a level at or below the data level; DATA used.
    ClipDowngraded { requested: String },
    /// Numeric parameter out of range; documented default substituted.
    InvalidCategoryCount { given: usize, default: usize },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MissingId { row } => {
                write!(f, "row {row}: missing location id, row dropped")
            }
            Warning::MissingValue { id } => {
                write!(f, "{id}: missing value, row dropped")
            }
            Warning::DuplicateId { id } => {
                write!(f, "{id}: duplicate location id, later row dropped")
            }
            Warning::UnmatchedRegistryName { name } => {
                write!(f, "{name:?}: no matching registry abbreviation or alias, row dropped")
            }
            Warning::InvalidStateCode { id } => {
                write!(f, "{id}: state code not in the state table, row dropped")
            }
            Warning::UnmatchedBoundary { id } => {
                write!(f, "{id}: no matching boundary, row dropped")
            }
            Warning::InvalidPolicy { level, given } => {
                write!(f, "{given:?} is not a legal {level} boundary policy, using the default")
            }
            Warning::ClipDowngraded { requested } => {
                write!(f, "clip={requested} is finer than the data level, clipping to data instead")
            }
            Warning::InvalidCategoryCount { given, default } => {
                write!(f, "{given} categories out of range, using {default}")
            }
        }
    }
}

/// Accumulator for a run's warnings, printed as one batch at the end.
#[derive(Debug, Default)]
pub struct Report {
    warnings: Vec<Warning>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Write the batch to stderr, one line per warning.
    pub fn print(&self) {
        for warning in &self.warnings {
            eprintln!("[warn] {warning}");
        }
    }
}
