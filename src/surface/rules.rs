//! Surface classification rules.
//!
//! The grass, forest and tree placers all ask the same question ("may a
//! plant stand here?") with different thresholds: a height window, a slope
//! ceiling and a material weight read from the vertex buffer.

use serde::{Deserialize, Serialize};

use crate::core::types::Vec3;
use crate::core::{Error, Result};
use crate::math::Band;
use crate::mesh::{TerrainMesh, VertexLayout};
use super::sampler::SurfacePoint;

/// Where a material weight lives in the vertex buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialChannel {
    /// Component 0..3 of the colour channel (R sand, G grass, B rock by convention)
    Color(usize),
    /// Raw float offset within the vertex
    Attribute(usize),
}

impl MaterialChannel {
    /// Read the channel at `vertex`. `None` if the layout has no such channel.
    pub fn read(&self, mesh: &TerrainMesh<'_>, vertex: u32) -> Option<f32> {
        let layout = mesh.layout();
        match *self {
            MaterialChannel::Color(component) => layout
                .color
                .filter(|_| component < 3)
                .map(|offset| mesh.attribute(vertex, offset + component)),
            MaterialChannel::Attribute(offset) if offset < layout.stride => {
                Some(mesh.attribute(vertex, offset))
            }
            MaterialChannel::Attribute(_) => None,
        }
    }

    /// Reject channels the layout cannot provide.
    pub fn validate_for(&self, layout: &VertexLayout) -> Result<()> {
        match *self {
            MaterialChannel::Color(component) if component >= 3 => {
                Err(Error::config(format!("colour component {} out of range", component)))
            }
            MaterialChannel::Color(_) if layout.color.is_none() => {
                Err(Error::config("material rule reads the colour channel but the mesh has none"))
            }
            MaterialChannel::Attribute(offset) if offset >= layout.stride => Err(Error::config(format!(
                "material attribute offset {} outside stride {}",
                offset, layout.stride
            ))),
            _ => Ok(()),
        }
    }
}

/// Material weight must fall inside `band`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialRule {
    pub channel: MaterialChannel,
    pub band: Band,
}

impl MaterialRule {
    pub fn check(&self, mesh: &TerrainMesh<'_>, vertex: u32) -> bool {
        self.channel
            .read(mesh, vertex)
            .is_some_and(|v| self.band.contains(v))
    }
}

/// Why a surface point was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SurfaceRejection {
    /// No triangle under the point
    OutOfBounds,
    Height,
    Slope,
    Material,
}

/// Thresholds for "plantable" surface. Every `None` rule passes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceRules {
    /// Allowed terrain height window
    pub height: Option<Band>,
    /// Ceiling on the angle between surface normal and world up
    pub max_slope_degrees: Option<f32>,
    /// Floor on the normal's Y component (a cheaper slope test)
    pub min_normal_y: Option<f32>,
    pub material: Option<MaterialRule>,
}

impl SurfaceRules {
    /// Rules that accept any point with terrain under it.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn with_height(mut self, band: Band) -> Self {
        self.height = Some(band);
        self
    }

    pub fn with_max_slope(mut self, degrees: f32) -> Self {
        self.max_slope_degrees = Some(degrees);
        self
    }

    pub fn with_min_normal_y(mut self, y: f32) -> Self {
        self.min_normal_y = Some(y);
        self
    }

    pub fn with_material(mut self, channel: MaterialChannel, band: Band) -> Self {
        self.material = Some(MaterialRule { channel, band });
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(band) = self.height {
            if !band.is_valid() {
                return Err(Error::config(format!("inverted height band {:?}", band)));
            }
        }
        if let Some(deg) = self.max_slope_degrees {
            if !(0.0..=180.0).contains(&deg) {
                return Err(Error::config(format!("slope limit {} outside [0, 180] degrees", deg)));
            }
        }
        if let Some(rule) = &self.material {
            if !rule.band.is_valid() {
                return Err(Error::config(format!("inverted material band {:?}", rule.band)));
            }
        }
        Ok(())
    }

    /// `validate` plus checks that depend on the mesh layout.
    pub fn validate_for(&self, layout: &VertexLayout) -> Result<()> {
        self.validate()?;
        if let Some(rule) = &self.material {
            rule.channel.validate_for(layout)?;
        }
        Ok(())
    }

    /// Apply height, slope and material gates in that order.
    pub fn check(&self, mesh: &TerrainMesh<'_>, point: &SurfacePoint) -> std::result::Result<(), SurfaceRejection> {
        if let Some(band) = self.height {
            if !band.contains(point.position.y) {
                return Err(SurfaceRejection::Height);
            }
        }
        if let Some(min_y) = self.min_normal_y {
            if point.normal.y < min_y {
                return Err(SurfaceRejection::Slope);
            }
        }
        if let Some(max_deg) = self.max_slope_degrees {
            if slope_degrees(point.normal) > max_deg {
                return Err(SurfaceRejection::Slope);
            }
        }
        if let Some(rule) = &self.material {
            if !rule.check(mesh, point.vertex) {
                return Err(SurfaceRejection::Material);
            }
        }
        Ok(())
    }
}

/// Angle between `normal` and world up, in degrees.
pub fn slope_degrees(normal: Vec3) -> f32 {
    normal.dot(Vec3::Y).clamp(-1.0, 1.0).acos().to_degrees()
}
