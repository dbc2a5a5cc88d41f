//! Boundary policy evaluation.
//!
//! Policies are closed per-level enums (not strings); the resolver maps
//! (level, policy) onto one of four primitive set operations over the
//! reference tables.

mod policy;
mod resolver;

pub use policy::{
    ClipPolicy, CountyPolicy, HsaPolicy, PolicySet, PolicyValue, RegionPolicy, RegistryPolicy,
    StatePolicy, TractPolicy,
};
pub use resolver::{resolve, DataSets, PLists};
