//! Mathematical utilities for XZ-plane queries

pub mod rect;
pub mod band;
pub mod barycentric;

pub use rect::Rect;
pub use band::Band;
pub use barycentric::Barycentric;
