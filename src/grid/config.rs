//! Mesh grid configuration.

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// Largest accepted `resolution`; keeps cell counts (and `u32` cell
/// indices) bounded.
pub const MAX_RESOLUTION: u32 = 4096;

/// Resolution and tolerances for `MeshGrid` construction and queries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Cells per axis (the grid is `resolution x resolution`)
    pub resolution: u32,
    /// World units added on every side of the mesh footprint
    pub padding: f32,
    /// Projected triangles with |det| below this are skipped by queries
    pub degenerate_epsilon: f32,
    /// Slack on the barycentric inside test so shared edges never crack
    pub edge_tolerance: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            resolution: 200,
            padding: 1.0,
            degenerate_epsilon: 1e-3,
            edge_tolerance: 1e-6,
        }
    }
}

impl GridConfig {
    /// Default tolerances at a given resolution.
    pub fn with_resolution(resolution: u32) -> Self {
        Self { resolution, ..Self::default() }
    }

    pub fn validate(&self) -> Result<()> {
        if self.resolution == 0 || self.resolution > MAX_RESOLUTION {
            return Err(Error::config(format!(
                "grid resolution must be in 1..={}, got {}",
                MAX_RESOLUTION, self.resolution
            )));
        }
        if !(self.padding > 0.0) || !self.padding.is_finite() {
            return Err(Error::config(format!("grid padding must be positive and finite, got {}", self.padding)));
        }
        if !(self.degenerate_epsilon >= 0.0) {
            return Err(Error::config("degenerate_epsilon must be >= 0"));
        }
        if !(self.edge_tolerance >= 0.0) {
            return Err(Error::config("edge_tolerance must be >= 0"));
        }
        Ok(())
    }
}
