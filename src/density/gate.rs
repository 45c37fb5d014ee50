//! Acceptance tests built on a `DensityField`.

use serde::{Deserialize, Serialize};

use super::DensityField;
use crate::core::{Error, Result};
use crate::math::Band;

/// Probabilistic acceptance driven by a clumped density field.
///
/// The threshold at a point is `floor + gain * clumped(x, z, power)`; points
/// whose clumped density falls below `cutoff` are rejected outright. A
/// candidate is accepted when a uniform draw in `[0, 1)` is below the
/// threshold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DensityGate {
    pub field: DensityField,
    #[serde(default = "default_power")]
    pub power: f32,
    #[serde(default)]
    pub cutoff: f32,
    #[serde(default)]
    pub floor: f32,
    #[serde(default = "default_gain")]
    pub gain: f32,
}

fn default_power() -> f32 {
    1.0
}

fn default_gain() -> f32 {
    1.0
}

impl DensityGate {
    pub fn new(field: DensityField) -> Self {
        Self { field, power: 1.0, cutoff: 0.0, floor: 0.0, gain: 1.0 }
    }

    /// Meadow gate: every point keeps at least a 20% chance.
    pub fn grass() -> Self {
        Self { floor: 0.2, gain: 0.8, ..Self::new(DensityField::grass()) }
    }

    /// Sparse tree gate: density raised to the 12th power, weak spots culled.
    pub fn trees(seed: u32) -> Self {
        Self { power: 12.0, cutoff: 0.15, ..Self::new(DensityField::trees(seed)) }
    }

    /// Acceptance threshold at `(x, z)`, or `None` below the cutoff.
    pub fn threshold(&self, x: f32, z: f32) -> Option<f32> {
        let d = self.field.clumped(x, z, self.power);
        if d < self.cutoff {
            None
        } else {
            Some(self.floor + self.gain * d)
        }
    }

    /// `roll` is a uniform draw in `[0, 1)`.
    pub fn admits(&self, x: f32, z: f32, roll: f32) -> bool {
        self.threshold(x, z).is_some_and(|t| roll < t)
    }

    pub fn validate(&self) -> Result<()> {
        self.field.validate()?;
        if !(self.power > 0.0) {
            return Err(Error::config(format!("density power must be positive, got {}", self.power)));
        }
        if !self.cutoff.is_finite() || !self.floor.is_finite() || !self.gain.is_finite() {
            return Err(Error::config("density cutoff, floor and gain must be finite"));
        }
        Ok(())
    }
}

/// Deterministic gate on the raw field value, used for biome partitioning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseGate {
    pub field: DensityField,
    pub band: Band,
}

impl NoiseGate {
    pub fn new(field: DensityField, band: Band) -> Self {
        Self { field, band }
    }

    pub fn value(&self, x: f32, z: f32) -> f32 {
        self.field.noise2d(x, z)
    }

    pub fn admits(&self, x: f32, z: f32) -> bool {
        self.band.contains(self.value(x, z))
    }

    pub fn validate(&self) -> Result<()> {
        self.field.validate()?;
        if !self.band.is_valid() {
            return Err(Error::config(format!(
                "noise gate band [{}, {}] is empty",
                self.band.min, self.band.max
            )));
        }
        Ok(())
    }
}
