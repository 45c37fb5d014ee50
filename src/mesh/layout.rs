//! Vertex attribute offsets within a fixed-stride float buffer.

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// Float offsets of each attribute inside one vertex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexLayout {
    /// Floats per vertex
    pub stride: usize,
    pub position: usize,
    pub normal: usize,
    /// RGB material weights, if the mesh carries them
    pub color: Option<usize>,
    pub uv: usize,
    pub tangent: usize,
}

impl VertexLayout {
    /// position(3) normal(3) uv(2) tangent(3)
    pub const STANDARD: Self = Self {
        stride: 11,
        position: 0,
        normal: 3,
        color: None,
        uv: 6,
        tangent: 8,
    };

    /// position(3) normal(3) color(3) uv(2) tangent(3)
    pub const COLORED: Self = Self {
        stride: 14,
        position: 0,
        normal: 3,
        color: Some(6),
        uv: 9,
        tangent: 11,
    };

    /// Check that every attribute fits inside the stride.
    pub fn validate(&self) -> Result<()> {
        let spans = [
            ("position", Some(self.position), 3),
            ("normal", Some(self.normal), 3),
            ("color", self.color, 3),
            ("uv", Some(self.uv), 2),
            ("tangent", Some(self.tangent), 3),
        ];
        for (name, offset, width) in spans {
            if let Some(offset) = offset {
                if offset + width > self.stride {
                    return Err(Error::InvalidLayout(format!(
                        "{} at offset {} overruns stride {}",
                        name, offset, self.stride
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn has_color(&self) -> bool {
        self.color.is_some()
    }
}

impl Default for VertexLayout {
    fn default() -> Self {
        Self::STANDARD
    }
}
