//! Reference tables and the boundary repository.
//!
//! The five reference tables (region, state, registry, HSA, county) form a
//! partial hierarchy: registries and HSAs group counties but need not cover
//! their whole state. Boundary geometry is loaded lazily per level through
//! the `BoundaryRepository` trait and memoized process-wide.

mod geometry;
mod repo;
mod tables;

pub use geometry::GeometryCollection;
pub use repo::{BoundaryRepository, CensusYear, JsonPackRepository, MemoryRepository, PackManifest};
pub use tables::{CountyRow, HsaRow, ReferenceTables, RegionRow, RegistryRow, StateRow};
