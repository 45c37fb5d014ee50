//! Procedural vegetation placement.
//!
//! `PlacementEngine` turns `SpeciesConfig`s and `ClusterConfig`s into
//! instances on a sampled terrain. Candidates come from a region (disc,
//! rectangle, terrain footprint) or from a strided walk over the terrain
//! vertices; all of them go through the same acceptance pipeline.

pub mod config;
pub mod engine;
pub mod orient;
pub mod presets;
pub mod registry;
pub mod report;

pub use config::{ClusterConfig, ClusterMember, ScatterRegion, SpeciesConfig, Variant, DEFAULT_GROUP};
pub use engine::PlacementEngine;
pub use orient::{Orientation, Upright};
pub use registry::{GroupId, PositionRegistry, RegistryEntry, SeparationScope};
pub use report::{PlacementReport, Rejection, RejectionCounts};
