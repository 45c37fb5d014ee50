//! Deterministic procedural scalar fields.
//!
//! A `DensityField` is a short sum of sinusoids: cheap, stateless and
//! bit-reproducible for a given `(x, z, seed)`. Fields feed three consumers:
//! acceptance probability (`DensityGate`), biome partitioning (`BiomeMap`,
//! `NoiseGate`) and clumping via `clumped(x, z, power)`.

pub mod field;
pub mod gate;
pub mod biome;

pub use field::{DensityField, Normalization, Wave};
pub use gate::{DensityGate, NoiseGate};
pub use biome::{Biome, BiomeMap};
