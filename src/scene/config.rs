//! Scene-level scatter configuration

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::grid::GridConfig;
use crate::placement::{presets, ClusterConfig, SeparationScope, SpeciesConfig};
use crate::terrain::TerrainParams;

/// Everything one scatter run needs besides the terrain mesh itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterConfig {
    /// Mixed into every species and cluster seed
    pub seed: u64,
    /// Terrain for callers that generate their own mesh
    pub terrain: TerrainParams,
    pub grid: GridConfig,
    pub separation: SeparationScope,
    /// Place species in parallel instead of one after another
    pub sharded: bool,
    pub species: Vec<SpeciesConfig>,
    pub clusters: Vec<ClusterConfig>,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            terrain: TerrainParams::default(),
            grid: GridConfig::default(),
            separation: SeparationScope::Global,
            sharded: false,
            species: vec![presets::meadow_grass(), presets::leaf_litter(), presets::vertex_trees(12345)],
            clusters: presets::forest_biomes(),
        }
    }
}

impl ScatterConfig {
    /// Config with no species or clusters.
    pub fn empty(seed: u64) -> Self {
        Self { seed, species: Vec::new(), clusters: Vec::new(), ..Self::default() }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        log::info!(
            "Loaded scatter config from {:?}: {} species, {} clusters",
            path,
            config.species.len(),
            config.clusters.len()
        );
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Every species name across `species` and cluster members, in run order.
    pub fn species_names(&self) -> impl Iterator<Item = &str> {
        self.species.iter().map(|s| s.name.as_str()).chain(
            self.clusters
                .iter()
                .flat_map(|c| c.members.iter().map(|m| m.species.name.as_str())),
        )
    }

    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        self.terrain.validate()?;
        for species in &self.species {
            species.validate()?;
        }
        for cluster in &self.clusters {
            cluster.validate()?;
        }
        let mut seen = HashSet::new();
        for name in self.species_names() {
            if !seen.insert(name) {
                return Err(Error::config(format!("species '{}' is configured twice", name)));
            }
        }
        Ok(())
    }
}
