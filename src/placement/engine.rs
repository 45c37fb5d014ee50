//! The placement loop.
//!
//! Every mode funnels candidates through one acceptance pipeline, rejecting
//! on the first failing stage:
//!
//! 1. surface rules (height band, slope, material)
//! 2. biome noise band
//! 3. density draw
//! 4. minimum separation against the position registry
//! 5. variant selection
//!
//! Accepted candidates become `Instance`s in the engine's `InstanceStore`.

use std::collections::HashMap;
use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;

use crate::core::{Error, Result};
use crate::instance::{AssetHandle, AssetLookup, Instance, InstanceStore, SpeciesId};
use crate::math::Rect;
use crate::surface::{SurfacePoint, SurfaceRejection, SurfaceSampler};
use super::config::{ClusterConfig, ScatterRegion, SpeciesConfig};
use super::orient::Orientation;
use super::registry::{GroupId, PositionRegistry, SeparationScope};
use super::report::{PlacementReport, Rejection};

/// A species registered in the store with its variant assets resolved.
struct Resolved<'s> {
    config: &'s SpeciesConfig,
    id: SpeciesId,
    group: Option<GroupId>,
    assets: Vec<Option<AssetHandle>>,
}

/// What the engine remembers about a species between runs.
#[derive(Clone, Copy, Debug)]
struct Profile {
    orientation: Orientation,
    group: Option<GroupId>,
    seed: u64,
}

/// Scatters species over a sampled terrain and collects the result.
///
/// Runs are destructive only through `regenerate` and `clear`; otherwise each
/// call adds to the store and every later run keeps its distance from what is
/// already there.
pub struct PlacementEngine<'a> {
    sampler: SurfaceSampler<'a>,
    assets: Option<&'a dyn AssetLookup>,
    scope: SeparationScope,
    store: InstanceStore,
    registry: PositionRegistry,
    profiles: HashMap<SpeciesId, Profile>,
}

impl<'a> PlacementEngine<'a> {
    pub fn new(sampler: SurfaceSampler<'a>) -> Self {
        Self {
            sampler,
            assets: None,
            scope: SeparationScope::Global,
            store: InstanceStore::new(),
            registry: PositionRegistry::new(),
            profiles: HashMap::new(),
        }
    }

    /// Resolve variant asset paths through `assets`. Unknown paths become
    /// `Error::UnresolvedAsset`.
    pub fn with_assets(mut self, assets: &'a dyn AssetLookup) -> Self {
        self.assets = Some(assets);
        self
    }

    pub fn with_scope(mut self, scope: SeparationScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn sampler(&self) -> SurfaceSampler<'a> {
        self.sampler
    }

    pub fn scope(&self) -> SeparationScope {
        self.scope
    }

    pub fn store(&self) -> &InstanceStore {
        &self.store
    }

    pub fn into_store(self) -> InstanceStore {
        self.store
    }

    pub fn registry(&self) -> &PositionRegistry {
        &self.registry
    }

    /// Unpadded terrain footprint.
    fn terrain_rect(&self) -> Rect {
        let grid = self.sampler.grid();
        grid.bounds().map_or(Rect::empty(), |b| b.inset(grid.config().padding))
    }

    fn validate_species(&self, species: &SpeciesConfig) -> Result<()> {
        match self.sampler.grid().mesh() {
            Some(mesh) => species.validate_for(&mesh.layout()),
            None => species.validate(),
        }
    }

    fn resolve_asset(&self, path: &str) -> Result<Option<AssetHandle>> {
        match self.assets {
            None => Ok(None),
            Some(lookup) => lookup
                .resolve(path)
                .map(Some)
                .ok_or_else(|| Error::UnresolvedAsset(path.to_string())),
        }
    }

    fn resolve<'s>(&mut self, species: &'s SpeciesConfig) -> Result<Resolved<'s>> {
        let assets = species
            .variants
            .iter()
            .map(|v| self.resolve_asset(&v.asset))
            .collect::<Result<Vec<_>>>()?;
        let default_asset = assets.first().copied().flatten();
        let id = self.store.register(&species.name, default_asset)?;
        let group = species
            .separation_group
            .as_deref()
            .map(|g| self.registry.group(g))
            .transpose()?;
        self.profiles.insert(
            id,
            Profile { orientation: species.orientation, group, seed: species.seed },
        );
        Ok(Resolved { config: species, id, group, assets })
    }

    /// Register `species` without placing anything, e.g. before `add_instance`.
    pub fn register(&mut self, species: &SpeciesConfig) -> Result<SpeciesId> {
        self.validate_species(species)?;
        Ok(self.resolve(species)?.id)
    }

    /// Scatter `species` until its target count or attempt budget is reached.
    pub fn place<R: Rng>(&mut self, species: &SpeciesConfig, rng: &mut R) -> Result<PlacementReport> {
        self.validate_species(species)?;
        let resolved = self.resolve(species)?;
        let mut report = PlacementReport::new(&species.name, species.target_count);

        if self.sampler.grid().is_empty() {
            log::warn!("Grid is empty; skipping '{}'", species.name);
            return Ok(report);
        }

        match species.region {
            ScatterRegion::GridScan { step } => self.scan(&resolved, step, rng, &mut report)?,
            _ => self.scatter(&resolved, rng, &mut report)?,
        }
        report.log();
        Ok(report)
    }

    /// `place` with an RNG seeded from `species.seed`.
    pub fn place_seeded(&mut self, species: &SpeciesConfig) -> Result<PlacementReport> {
        let mut rng = ChaCha8Rng::seed_from_u64(species.seed);
        self.place(species, &mut rng)
    }

    /// Drop `species`' previous instances and place it again from its seed.
    pub fn regenerate(&mut self, species: &SpeciesConfig) -> Result<PlacementReport> {
        if let Some(id) = self.store.id_of(&species.name) {
            let removed = self.store.clear_species(id);
            let profiles = &self.profiles;
            self.registry
                .rebuild_from(&self.store, |s| profiles.get(&s).and_then(|p| p.group));
            log::debug!("Cleared {} '{}' instances", removed, species.name);
        }
        self.place_seeded(species)
    }

    /// Drop every instance and registry entry. Species stay registered.
    pub fn clear(&mut self) {
        self.store.clear();
        self.registry.clear();
    }

    /// Place one instance of a registered species at `(x, z)` on the terrain,
    /// bypassing every gate. Returns `false` when no terrain lies there.
    ///
    /// The yaw is drawn from the species seed and its current instance count.
    pub fn add_instance(&mut self, name: &str, x: f32, z: f32, scale: f32) -> Result<bool> {
        let id = self.species_id(name)?;
        let seed = self.profiles.get(&id).map_or(0, |p| p.seed);
        let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(self.store.instances(id).len() as u64));
        self.add_instance_with(name, x, z, scale, &mut rng)
    }

    /// `add_instance` drawing the yaw from `rng`. The species' orientation
    /// applies in full except for tilt jitter.
    pub fn add_instance_with<R: Rng>(&mut self, name: &str, x: f32, z: f32, scale: f32, rng: &mut R) -> Result<bool> {
        let id = self.species_id(name)?;
        if !(scale > 0.0) || !scale.is_finite() {
            return Err(Error::config(format!("instance scale must be positive, got {}", scale)));
        }
        let Some(hit) = self.sampler.sample(x, z) else {
            log::debug!("No terrain under ({:.2}, {:.2}); '{}' not added", x, z, name);
            return Ok(false);
        };

        let (orientation, group) = self
            .profiles
            .get(&id)
            .map_or((Orientation::default(), None), |p| (p.orientation, p.group));
        let yaw = if orientation.random_yaw { rng.random_range(0.0..TAU) } else { 0.0 };
        let instance = Instance {
            species: id,
            variant: None,
            asset: self.store.entry(id).and_then(|e| e.asset),
            position: hit.position,
            normal: hit.normal,
            yaw,
            scale,
            transform: orientation.transform(hit.position, hit.normal, yaw, Vec2::ZERO, scale),
        };
        self.commit(instance, group)?;
        Ok(true)
    }

    fn species_id(&self, name: &str) -> Result<SpeciesId> {
        self.store
            .id_of(name)
            .ok_or_else(|| Error::UnknownSpecies(name.to_string()))
    }

    /// Accept cluster centers, then scatter every member around each one.
    ///
    /// Returns one report per member. A member candidate that fails any gate
    /// is dropped, not retried.
    pub fn place_clusters<R: Rng>(&mut self, cluster: &ClusterConfig, rng: &mut R) -> Result<Vec<PlacementReport>> {
        match self.sampler.grid().mesh() {
            Some(mesh) => cluster.validate_for(&mesh.layout())?,
            None => cluster.validate()?,
        }
        let members = cluster
            .members
            .iter()
            .map(|m| self.resolve(&m.species))
            .collect::<Result<Vec<_>>>()?;
        let mut reports: Vec<PlacementReport> = cluster
            .members
            .iter()
            .map(|m| PlacementReport::new(&m.species.name, 0))
            .collect();

        if self.sampler.grid().is_empty() {
            log::warn!("Grid is empty; skipping cluster '{}'", cluster.name);
            return Ok(reports);
        }

        let offsets = Normal::new(0.0f32, cluster.spread_sigma)
            .map_err(|e| Error::config(format!("cluster '{}': {}", cluster.name, e)))?;
        let terrain = self.terrain_rect();
        let max_attempts = cluster.max_attempts();
        let mut centers = 0;
        let mut attempts = 0;

        while centers < cluster.groups && attempts < max_attempts {
            attempts += 1;
            let Some(center) = cluster.region.sample(terrain, rng) else {
                break;
            };
            let Some(hit) = self.sampler.sample(center.x, center.y) else {
                continue;
            };
            if self.sampler.check(&hit.point(), &cluster.surface).is_err() {
                continue;
            }
            if cluster.biome.as_ref().is_some_and(|g| !g.admits(center.x, center.y)) {
                continue;
            }

            centers += 1;
            log::debug!("Cluster '{}' center #{} at ({:.1}, {:.1})", cluster.name, centers, center.x, center.y);

            for ((member, resolved), report) in cluster.members.iter().zip(&members).zip(reports.iter_mut()) {
                let count = rng.random_range(member.count.0..=member.count.1) as usize;
                report.requested += count;
                for _ in 0..count {
                    report.attempts += 1;
                    let offset = Vec2::new(offsets.sample(rng), offsets.sample(rng)) * member.spread;
                    self.offer(resolved, center + offset, rng, report)?;
                }
            }
        }

        log::info!(
            "Cluster '{}': {}/{} groups in {} attempts",
            cluster.name,
            centers,
            cluster.groups,
            attempts
        );
        for report in &reports {
            report.log();
        }
        Ok(reports)
    }

    /// Place several species in parallel, one seeded run per species.
    ///
    /// Each worker places against the registry as it was before the batch.
    /// Shards are then merged in input order, re-checking every instance
    /// against the combined registry; instances that crowd an earlier shard
    /// are dropped and counted as separation rejections.
    pub fn place_sharded(&mut self, species: &[SpeciesConfig]) -> Result<Vec<PlacementReport>> {
        for s in species {
            self.register(s)?;
        }
        log::info!(
            "Placing {} species on {} threads",
            species.len(),
            rayon::current_num_threads()
        );

        let template = self.store.registrations();
        let (sampler, assets, scope) = (self.sampler, self.assets, self.scope);
        let (registry, profiles) = (&self.registry, &self.profiles);

        let shards = species
            .par_iter()
            .map(|s| {
                let mut shard = PlacementEngine {
                    sampler,
                    assets,
                    scope,
                    store: template.clone(),
                    registry: registry.clone(),
                    profiles: profiles.clone(),
                };
                let report = shard.place_seeded(s)?;
                Ok((shard, report))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut reports = Vec::with_capacity(shards.len());
        for (config, (shard, mut report)) in species.iter().zip(shards) {
            let id = self.species_id(&config.name)?;
            let group = self.profiles.get(&id).and_then(|p| p.group);
            let mut dropped = 0;
            for instance in shard.store.instances(id) {
                if let Some(group) = group {
                    if !self.registry.check(instance.xz(), config.min_distance, id, group, self.scope) {
                        dropped += 1;
                        continue;
                    }
                }
                self.commit(instance.clone(), group)?;
            }
            if dropped > 0 {
                report.placed -= dropped;
                report.rejections.separation += dropped;
                log::debug!("Dropped {} '{}' instances crowding earlier shards", dropped, config.name);
            }
            reports.push(report);
        }
        Ok(reports)
    }

    fn scatter<R: Rng>(&mut self, species: &Resolved<'_>, rng: &mut R, report: &mut PlacementReport) -> Result<()> {
        let terrain = self.terrain_rect();
        let max_attempts = species.config.max_attempts();
        while report.placed < report.requested && report.attempts < max_attempts {
            report.attempts += 1;
            let Some(p) = species.config.region.sample(terrain, rng) else {
                break;
            };
            self.offer(species, p, rng, report)?;
        }
        Ok(())
    }

    /// Walk every `step`-th vertex, using its own data as the candidate.
    fn scan<R: Rng>(&mut self, species: &Resolved<'_>, step: usize, rng: &mut R, report: &mut PlacementReport) -> Result<()> {
        let vertex_count = self.sampler.grid().mesh().map_or(0, |m| m.vertex_count());
        for vertex in (0..vertex_count).step_by(step) {
            if report.placed >= report.requested {
                break;
            }
            report.attempts += 1;
            let outcome = match self.sampler.vertex_point(vertex as u32) {
                Some(point) => self.consider(species, point, rng),
                None => Err(SurfaceRejection::OutOfBounds.into()),
            };
            self.settle(outcome, report)?;
        }
        Ok(())
    }

    fn offer<R: Rng>(&mut self, species: &Resolved<'_>, p: Vec2, rng: &mut R, report: &mut PlacementReport) -> Result<bool> {
        let outcome = match self.sampler.sample(p.x, p.y) {
            Some(hit) => self.consider(species, hit.point(), rng),
            None => Err(SurfaceRejection::OutOfBounds.into()),
        };
        self.settle(outcome, report)
    }

    fn settle(&mut self, outcome: std::result::Result<Instance, Rejection>, report: &mut PlacementReport) -> Result<bool> {
        match outcome {
            Ok(instance) => {
                let group = self.profiles.get(&instance.species).and_then(|p| p.group);
                self.commit(instance, group)?;
                report.placed += 1;
                Ok(true)
            }
            Err(rejection) => {
                report.rejections.record(rejection);
                Ok(false)
            }
        }
    }

    fn commit(&mut self, instance: Instance, group: Option<GroupId>) -> Result<()> {
        let (xz, species) = (instance.xz(), instance.species);
        self.store.push(instance)?;
        if let Some(group) = group {
            self.registry.push(xz, species, group);
        }
        Ok(())
    }

    fn consider<R: Rng>(
        &self,
        species: &Resolved<'_>,
        point: SurfacePoint,
        rng: &mut R,
    ) -> std::result::Result<Instance, Rejection> {
        let config = species.config;
        let (x, z) = (point.position.x, point.position.z);

        self.sampler.check(&point, &config.surface)?;
        if let Some(gate) = &config.biome {
            if !gate.admits(x, z) {
                return Err(Rejection::Biome);
            }
        }
        if let Some(gate) = &config.density {
            let roll = rng.random::<f32>();
            if !gate.admits(x, z, roll) {
                return Err(Rejection::Density);
            }
        }
        if let Some(group) = species.group {
            if !self.registry.check(Vec2::new(x, z), config.min_distance, species.id, group, self.scope) {
                return Err(Rejection::Separation);
            }
        }
        let variant = self.pick_variant(species, &point, rng)?;
        Ok(self.build_instance(species, variant, point, rng))
    }

    /// Weighted draw among the variants whose rules hold at `point`.
    fn pick_variant<R: Rng>(
        &self,
        species: &Resolved<'_>,
        point: &SurfacePoint,
        rng: &mut R,
    ) -> std::result::Result<Option<u16>, Rejection> {
        let variants = &species.config.variants;
        if variants.is_empty() {
            return Ok(None);
        }
        let mesh = self.sampler.grid().mesh().ok_or(Rejection::Variant)?;
        let eligible: Vec<(usize, f32)> = variants
            .iter()
            .enumerate()
            .filter(|(_, v)| v.weight > 0.0 && v.admits(mesh, point))
            .map(|(i, v)| (i, v.weight))
            .collect();
        let total: f32 = eligible.iter().map(|(_, w)| w).sum();
        let Some(&(last, _)) = eligible.last() else {
            return Err(Rejection::Variant);
        };

        let mut roll = rng.random::<f32>() * total;
        for &(i, weight) in &eligible {
            if roll < weight {
                return Ok(Some(i as u16));
            }
            roll -= weight;
        }
        Ok(Some(last as u16))
    }

    fn build_instance<R: Rng>(
        &self,
        species: &Resolved<'_>,
        variant: Option<u16>,
        point: SurfacePoint,
        rng: &mut R,
    ) -> Instance {
        let config = species.config;
        let orientation = &config.orientation;

        let yaw = if orientation.random_yaw { rng.random_range(0.0..TAU) } else { 0.0 };
        let tilt = if orientation.tilt_jitter_degrees > 0.0 {
            let t = orientation.tilt_jitter_degrees.to_radians();
            Vec2::new(rng.random_range(-t..=t), rng.random_range(-t..=t))
        } else {
            Vec2::ZERO
        };
        let scale = config.base_scale * config.scale.lerp(rng.random::<f32>());
        let asset = variant.and_then(|i| species.assets.get(i as usize).copied().flatten());

        Instance {
            species: species.id,
            variant,
            asset,
            position: point.position,
            normal: point.normal,
            yaw,
            scale,
            transform: orientation.transform(point.position, point.normal, yaw, tilt, scale),
        }
    }
}
