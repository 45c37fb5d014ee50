//! Point queries against a `MeshGrid`: height, normal and material at a
//! world `(x, z)`, plus configurable surface classification.

pub mod rules;
pub mod sampler;

pub use rules::{MaterialChannel, MaterialRule, SurfaceRejection, SurfaceRules};
pub use sampler::{SurfaceHit, SurfacePoint, SurfaceSampler, NO_HEIGHT};
