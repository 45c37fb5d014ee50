//! Species and cluster configuration.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::density::{DensityGate, NoiseGate};
use crate::math::{Band, Rect};
use crate::mesh::{TerrainMesh, VertexLayout};
use crate::surface::{MaterialRule, SurfacePoint, SurfaceRules};
use super::orient::Orientation;

/// One asset a species may spawn, with optional local rules.
///
/// Per instance, the engine draws among the variants whose rules hold at the
/// candidate point, weighted by `weight`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub asset: String,
    #[serde(default = "default_weight")]
    pub weight: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Band>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<MaterialRule>,
}

fn default_weight() -> f32 {
    1.0
}

impl Variant {
    pub fn new(asset: impl Into<String>) -> Self {
        Self { asset: asset.into(), weight: 1.0, height: None, material: None }
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_height(mut self, band: Band) -> Self {
        self.height = Some(band);
        self
    }

    pub fn with_material(mut self, rule: MaterialRule) -> Self {
        self.material = Some(rule);
        self
    }

    pub fn admits(&self, mesh: &TerrainMesh<'_>, point: &SurfacePoint) -> bool {
        self.height.is_none_or(|band| band.contains(point.position.y))
            && self.material.is_none_or(|rule| rule.check(mesh, point.vertex))
    }
}

/// Where candidates come from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScatterRegion {
    /// Uniform over a disc
    Disc { center: Vec2, radius: f32 },
    /// Uniform over an axis-aligned XZ rectangle
    Rect { min: Vec2, max: Vec2 },
    /// Uniform over the terrain footprint shrunk by `inset`
    Terrain { inset: f32 },
    /// Every `step`-th terrain vertex, in buffer order
    GridScan { step: usize },
}

impl Default for ScatterRegion {
    fn default() -> Self {
        ScatterRegion::Terrain { inset: 0.0 }
    }
}

impl ScatterRegion {
    pub fn is_scan(&self) -> bool {
        matches!(self, ScatterRegion::GridScan { .. })
    }

    /// Draw a candidate. `terrain` is the unpadded mesh footprint.
    /// Grid scans are not sampled and return `None`.
    pub fn sample<R: Rng>(&self, terrain: Rect, rng: &mut R) -> Option<Vec2> {
        match *self {
            ScatterRegion::Disc { center, radius } => {
                let r = radius * rng.random::<f32>().sqrt();
                let theta = std::f32::consts::TAU * rng.random::<f32>();
                Some(center + Vec2::new(theta.cos(), theta.sin()) * r)
            }
            ScatterRegion::Rect { min, max } => Some(uniform_in(min, max, rng)),
            ScatterRegion::Terrain { inset } => {
                if terrain.is_empty() {
                    return None;
                }
                let area = terrain.inset(inset);
                Some(uniform_in(area.min, area.max, rng))
            }
            ScatterRegion::GridScan { .. } => None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            ScatterRegion::Disc { center, radius } => {
                if !center.is_finite() || !(radius >= 0.0) || !radius.is_finite() {
                    return Err(Error::config(format!("invalid disc region radius {}", radius)));
                }
            }
            ScatterRegion::Rect { min, max } => {
                if !min.is_finite() || !max.is_finite() || min.x > max.x || min.y > max.y {
                    return Err(Error::config(format!("invalid rect region {:?}..{:?}", min, max)));
                }
            }
            ScatterRegion::Terrain { inset } => {
                if !inset.is_finite() || inset < 0.0 {
                    return Err(Error::config(format!("terrain inset must be >= 0, got {}", inset)));
                }
            }
            ScatterRegion::GridScan { step } => {
                if step == 0 {
                    return Err(Error::config("grid scan step must be at least 1"));
                }
            }
        }
        Ok(())
    }
}

fn uniform_in<R: Rng>(min: Vec2, max: Vec2, rng: &mut R) -> Vec2 {
    let t = Vec2::new(rng.random::<f32>(), rng.random::<f32>());
    min + (max - min) * t
}

/// Separation group species join unless configured otherwise.
pub const DEFAULT_GROUP: &str = "default";

/// Everything needed to scatter one species.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeciesConfig {
    pub name: String,
    pub variants: Vec<Variant>,
    pub target_count: usize,
    pub region: ScatterRegion,
    /// Random scale factor range, multiplied by `base_scale`
    pub scale: Band,
    pub base_scale: f32,
    /// Minimum XZ distance to previously accepted instances of the same
    /// separation group (of the same species under `PerSpecies`)
    pub min_distance: f32,
    /// Position registry group. Species only keep their distance from
    /// species in the same group; `None` keeps the species out of the
    /// registry altogether.
    pub separation_group: Option<String>,
    pub surface: SurfaceRules,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biome: Option<NoiseGate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub density: Option<DensityGate>,
    pub orientation: Orientation,
    /// Attempt budget is `target_count * attempt_factor`
    pub attempt_factor: usize,
    pub seed: u64,
}

impl Default for SpeciesConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            variants: Vec::new(),
            target_count: 0,
            region: ScatterRegion::default(),
            scale: Band::new(1.0, 1.0),
            base_scale: 1.0,
            min_distance: 0.0,
            separation_group: Some(DEFAULT_GROUP.to_string()),
            surface: SurfaceRules::any(),
            biome: None,
            density: None,
            orientation: Orientation::default(),
            attempt_factor: 5,
            seed: 0,
        }
    }
}

impl SpeciesConfig {
    pub fn new(name: impl Into<String>, target_count: usize) -> Self {
        Self { name: name.into(), target_count, ..Self::default() }
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variants.push(variant);
        self
    }

    pub fn with_region(mut self, region: ScatterRegion) -> Self {
        self.region = region;
        self
    }

    pub fn with_scale(mut self, scale: Band) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_base_scale(mut self, base_scale: f32) -> Self {
        self.base_scale = base_scale;
        self
    }

    pub fn with_min_distance(mut self, min_distance: f32) -> Self {
        self.min_distance = min_distance;
        self
    }

    pub fn with_separation_group(mut self, group: impl Into<String>) -> Self {
        self.separation_group = Some(group.into());
        self
    }

    /// Neither register positions nor check against the registry.
    pub fn without_separation(mut self) -> Self {
        self.separation_group = None;
        self.min_distance = 0.0;
        self
    }

    pub fn with_surface(mut self, surface: SurfaceRules) -> Self {
        self.surface = surface;
        self
    }

    pub fn with_biome(mut self, gate: NoiseGate) -> Self {
        self.biome = Some(gate);
        self
    }

    pub fn with_density(mut self, gate: DensityGate) -> Self {
        self.density = Some(gate);
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_attempt_factor(mut self, factor: usize) -> Self {
        self.attempt_factor = factor;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Attempt budget for sampled regions.
    pub fn max_attempts(&self) -> usize {
        self.target_count.saturating_mul(self.attempt_factor)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::config("species name is empty"));
        }
        let ctx = |msg: String| Error::config(format!("species '{}': {}", self.name, msg));

        self.region.validate()?;
        if !self.scale.is_valid() || !self.scale.is_finite() || self.scale.min <= 0.0 {
            return Err(ctx(format!("scale range [{}, {}] must be positive and finite", self.scale.min, self.scale.max)));
        }
        if !(self.base_scale > 0.0) || !self.base_scale.is_finite() {
            return Err(ctx(format!("base scale must be positive, got {}", self.base_scale)));
        }
        if !(self.min_distance >= 0.0) || !self.min_distance.is_finite() {
            return Err(ctx(format!("min distance must be >= 0, got {}", self.min_distance)));
        }
        match &self.separation_group {
            None if self.min_distance > 0.0 => {
                return Err(ctx("min distance needs a separation group".to_string()));
            }
            Some(group) if group.is_empty() => {
                return Err(ctx("separation group name is empty".to_string()));
            }
            _ => {}
        }
        if self.attempt_factor == 0 {
            return Err(ctx("attempt factor must be at least 1".to_string()));
        }
        for variant in &self.variants {
            if !(variant.weight >= 0.0) || !variant.weight.is_finite() {
                return Err(ctx(format!("variant '{}' has invalid weight {}", variant.asset, variant.weight)));
            }
            if let Some(band) = variant.height {
                if !band.is_valid() {
                    return Err(ctx(format!("variant '{}' has an inverted height band", variant.asset)));
                }
            }
        }
        self.surface.validate()?;
        if let Some(gate) = &self.biome {
            gate.validate()?;
        }
        if let Some(gate) = &self.density {
            gate.validate()?;
        }
        self.orientation.validate()
    }

    /// `validate` plus checks against the mesh layout material rules read from.
    pub fn validate_for(&self, layout: &VertexLayout) -> Result<()> {
        self.validate()?;
        self.surface.validate_for(layout)?;
        for variant in &self.variants {
            if let Some(rule) = &variant.material {
                rule.channel.validate_for(layout)?;
            }
        }
        Ok(())
    }
}

/// One sub-species spawned around every accepted cluster center.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClusterMember {
    /// Gates, scale and orientation for the member. `region` and
    /// `target_count` are ignored.
    pub species: SpeciesConfig,
    /// Inclusive instance count range per center
    pub count: (u32, u32),
    /// Multiplier on the cluster's offset sigma
    #[serde(default = "default_spread")]
    pub spread: f32,
}

fn default_spread() -> f32 {
    1.0
}

impl ClusterMember {
    pub fn new(species: SpeciesConfig, min: u32, max: u32) -> Self {
        Self { species, count: (min, max), spread: 1.0 }
    }

    pub fn with_spread(mut self, spread: f32) -> Self {
        self.spread = spread;
        self
    }
}

/// Two-level placement: centers first, then members scattered around each.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    pub name: String,
    /// Number of centers to accept
    pub groups: usize,
    /// Center attempt budget is `groups * attempt_factor`
    pub attempt_factor: usize,
    pub region: ScatterRegion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biome: Option<NoiseGate>,
    /// Rules a center must satisfy
    pub surface: SurfaceRules,
    /// Standard deviation of member offsets around the center
    pub spread_sigma: f32,
    pub members: Vec<ClusterMember>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            groups: 0,
            attempt_factor: 50,
            region: ScatterRegion::Terrain { inset: 10.0 },
            biome: None,
            surface: SurfaceRules::any(),
            spread_sigma: 16.0,
            members: Vec::new(),
        }
    }
}

impl ClusterConfig {
    pub fn new(name: impl Into<String>, groups: usize) -> Self {
        Self { name: name.into(), groups, ..Self::default() }
    }

    pub fn with_member(mut self, member: ClusterMember) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_biome(mut self, gate: NoiseGate) -> Self {
        self.biome = Some(gate);
        self
    }

    pub fn with_surface(mut self, surface: SurfaceRules) -> Self {
        self.surface = surface;
        self
    }

    pub fn with_region(mut self, region: ScatterRegion) -> Self {
        self.region = region;
        self
    }

    pub fn with_spread_sigma(mut self, sigma: f32) -> Self {
        self.spread_sigma = sigma;
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.groups.saturating_mul(self.attempt_factor)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::config("cluster name is empty"));
        }
        if self.region.is_scan() {
            return Err(Error::config(format!("cluster '{}': centers cannot come from a grid scan", self.name)));
        }
        self.region.validate()?;
        if self.attempt_factor == 0 {
            return Err(Error::config(format!("cluster '{}': attempt factor must be at least 1", self.name)));
        }
        if !(self.spread_sigma > 0.0) || !self.spread_sigma.is_finite() {
            return Err(Error::config(format!(
                "cluster '{}': spread sigma must be positive, got {}",
                self.name, self.spread_sigma
            )));
        }
        if self.members.is_empty() {
            return Err(Error::config(format!("cluster '{}' has no members", self.name)));
        }
        for member in &self.members {
            if member.count.0 > member.count.1 {
                return Err(Error::config(format!(
                    "cluster '{}': member '{}' count range {:?} is inverted",
                    self.name, member.species.name, member.count
                )));
            }
            if !(member.spread > 0.0) || !member.spread.is_finite() {
                return Err(Error::config(format!(
                    "cluster '{}': member '{}' spread must be positive",
                    self.name, member.species.name
                )));
            }
            member.species.validate()?;
        }
        self.surface.validate()?;
        if let Some(gate) = &self.biome {
            gate.validate()?;
        }
        Ok(())
    }

    pub fn validate_for(&self, layout: &VertexLayout) -> Result<()> {
        self.validate()?;
        self.surface.validate_for(layout)?;
        for member in &self.members {
            member.species.validate_for(layout)?;
        }
        Ok(())
    }
}
