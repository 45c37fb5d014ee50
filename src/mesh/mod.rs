//! Terrain mesh contract: vertex layout, borrowed buffer view, and an owned
//! regular heightfield builder.
//!
//! The vertex buffer is a flat `f32` array with a fixed stride. Positions live
//! at offset 0 and normals at offset 3; a colour channel (material weights)
//! is optional. The sampler reads every attribute through `VertexLayout`.

pub mod layout;
pub mod view;
pub mod heightfield;

pub use layout::VertexLayout;
pub use view::{scale_positions, TerrainMesh};
pub use heightfield::HeightfieldMesh;
