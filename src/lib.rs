//! Sylva - terrain spatial queries and procedural vegetation placement

pub mod core;
pub mod math;
pub mod mesh;
pub mod grid;
pub mod surface;
pub mod density;
pub mod placement;
pub mod instance;
pub mod terrain;
pub mod scene;
