//! Scene-level scatter runs: every configured species and cluster over one
//! terrain, in a fixed order.

pub mod config;

pub use config::ScatterConfig;

use std::path::Path;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::core::Result;
use crate::grid::MeshGrid;
use crate::instance::{AssetLookup, InstanceStore};
use crate::placement::{PlacementEngine, PlacementReport, SpeciesConfig};
use crate::surface::SurfaceSampler;

/// Cluster seeds start here so they never collide with species seeds.
const CLUSTER_SEED_OFFSET: u64 = 1 << 32;

/// Instances plus one report per species (cluster members included).
#[derive(Debug, Serialize)]
pub struct ScatterOutput {
    pub reports: Vec<PlacementReport>,
    pub store: InstanceStore,
}

impl ScatterOutput {
    pub fn placed(&self) -> usize {
        self.reports.iter().map(|r| r.placed).sum()
    }

    pub fn requested(&self) -> usize {
        self.reports.iter().map(|r| r.requested).sum()
    }

    pub fn report(&self, species: &str) -> Option<&PlacementReport> {
        self.reports.iter().find(|r| r.species == species)
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Runs a validated `ScatterConfig`: species first, then clusters.
pub struct ScatterPipeline<'c> {
    config: &'c ScatterConfig,
}

impl<'c> ScatterPipeline<'c> {
    pub fn new(config: &'c ScatterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScatterConfig {
        self.config
    }

    /// Species config with its seed mixed with the scene seed.
    fn seeded(&self, species: &SpeciesConfig) -> SpeciesConfig {
        SpeciesConfig { seed: self.config.seed.wrapping_add(species.seed), ..species.clone() }
    }

    pub fn run(&self, grid: &MeshGrid<'_>, assets: Option<&dyn AssetLookup>) -> Result<ScatterOutput> {
        let sampler = SurfaceSampler::new(grid);
        let mut engine = PlacementEngine::new(sampler).with_scope(self.config.separation);
        if let Some(assets) = assets {
            engine = engine.with_assets(assets);
        }

        let species: Vec<SpeciesConfig> = self.config.species.iter().map(|s| self.seeded(s)).collect();
        let mut reports = if self.config.sharded {
            engine.place_sharded(&species)?
        } else {
            species
                .iter()
                .map(|s| engine.place_seeded(s))
                .collect::<Result<Vec<_>>>()?
        };

        for (i, cluster) in self.config.clusters.iter().enumerate() {
            let seed = self.config.seed.wrapping_add(CLUSTER_SEED_OFFSET + i as u64);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            reports.extend(engine.place_clusters(cluster, &mut rng)?);
        }

        let output = ScatterOutput { reports, store: engine.into_store() };
        log::info!(
            "Scatter finished: {}/{} instances across {} species",
            output.placed(),
            output.requested(),
            output.store.species_count()
        );
        Ok(output)
    }
}
