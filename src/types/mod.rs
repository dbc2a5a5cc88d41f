//! Core identifier types shared across the pipeline.

mod geo_id;
mod level;

pub use geo_id::{canonicalize, GeoId};
pub use level::GeoLevel;
