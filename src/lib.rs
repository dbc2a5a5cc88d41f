#![doc = "Choropleth mapping engine for U.S. public-health statistical areas"]
pub mod categorize;
pub mod classify;
pub mod cli;
pub mod commands;
pub mod extent;
pub mod pipeline;
pub mod record;
pub mod refdata;
pub mod render;
pub mod report;
pub mod resolve;
pub mod select;
pub mod types;

#[doc(inline)]
pub use pipeline::{run, RunOptions, RunOutput};

#[doc(inline)]
pub use types::{GeoId, GeoLevel};

#[doc(inline)]
pub use refdata::{BoundaryRepository, CensusYear, JsonPackRepository, MemoryRepository};
