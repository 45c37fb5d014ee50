//! Per-species instance storage.

use std::collections::HashMap;
use std::path::Path;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use super::{AssetHandle, Instance, SpeciesId};
use crate::core::{Error, Result};

/// All instances of one species.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeciesEntry {
    pub id: SpeciesId,
    pub name: String,
    /// Default asset when instances carry none of their own
    pub asset: Option<AssetHandle>,
    pub instances: Vec<Instance>,
}

#[derive(Deserialize)]
struct StoreRepr {
    species: Vec<SpeciesEntry>,
}

/// Instances grouped by species, in registration order.
///
/// Species ids are dense indices into the entry list, so lookups by id are
/// O(1). Serializes to `{"species": [...]}` for export.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(try_from = "StoreRepr")]
pub struct InstanceStore {
    species: Vec<SpeciesEntry>,
    /// Name -> id lookup
    #[serde(skip)]
    by_name: HashMap<String, SpeciesId>,
}

impl TryFrom<StoreRepr> for InstanceStore {
    type Error = Error;

    fn try_from(repr: StoreRepr) -> Result<Self> {
        let mut store = Self::new();
        for mut entry in repr.species {
            let id = store.next_id(&entry.name)?;
            entry.id = id;
            for inst in &mut entry.instances {
                inst.species = id;
            }
            store.by_name.insert(entry.name.clone(), id);
            store.species.push(entry);
        }
        Ok(store)
    }
}

impl InstanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self, name: &str) -> Result<SpeciesId> {
        u16::try_from(self.species.len())
            .map(SpeciesId)
            .map_err(|_| Error::TooManySpecies(name.to_string()))
    }

    /// Register a species, or return the id it already has.
    pub fn register(&mut self, name: &str, asset: Option<AssetHandle>) -> Result<SpeciesId> {
        if let Some(id) = self.by_name.get(name) {
            return Ok(*id);
        }
        let id = self.next_id(name)?;
        self.species.push(SpeciesEntry {
            id,
            name: name.to_string(),
            asset,
            instances: Vec::new(),
        });
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn id_of(&self, name: &str) -> Option<SpeciesId> {
        self.by_name.get(name).copied()
    }

    pub fn entry(&self, id: SpeciesId) -> Option<&SpeciesEntry> {
        self.species.get(id.0 as usize)
    }

    pub fn name_of(&self, id: SpeciesId) -> Option<&str> {
        self.entry(id).map(|e| e.name.as_str())
    }

    pub fn push(&mut self, instance: Instance) -> Result<()> {
        let entry = self
            .species
            .get_mut(instance.species.0 as usize)
            .ok_or_else(|| Error::UnknownSpecies(format!("#{}", instance.species.0)))?;
        entry.instances.push(instance);
        Ok(())
    }

    /// Copy of the store with every species registered and no instances.
    pub fn registrations(&self) -> InstanceStore {
        let species = self
            .species
            .iter()
            .map(|e| SpeciesEntry {
                id: e.id,
                name: e.name.clone(),
                asset: e.asset,
                instances: Vec::new(),
            })
            .collect();
        Self { species, by_name: self.by_name.clone() }
    }

    /// Append every species and instance of `other`, merging by name.
    pub fn extend(&mut self, other: InstanceStore) -> Result<()> {
        for entry in other.species {
            let id = self.register(&entry.name, entry.asset)?;
            let target = &mut self.species[id.0 as usize].instances;
            target.extend(entry.instances.into_iter().map(|mut inst| {
                inst.species = id;
                inst
            }));
        }
        Ok(())
    }

    pub fn instances(&self, id: SpeciesId) -> &[Instance] {
        self.entry(id).map(|e| e.instances.as_slice()).unwrap_or(&[])
    }

    pub fn transforms(&self, id: SpeciesId) -> Vec<Mat4> {
        self.instances(id).iter().map(|i| i.transform).collect()
    }

    pub fn positions(&self, id: SpeciesId) -> Vec<Vec3> {
        self.instances(id).iter().map(|i| i.position).collect()
    }

    /// Remove the species' instances. The registration stays.
    pub fn clear_species(&mut self, id: SpeciesId) -> usize {
        self.species
            .get_mut(id.0 as usize)
            .map(|e| std::mem::take(&mut e.instances).len())
            .unwrap_or(0)
    }

    /// Remove all instances, keeping registrations.
    pub fn clear(&mut self) {
        for entry in &mut self.species {
            entry.instances.clear();
        }
    }

    /// Total instance count across species.
    pub fn len(&self) -> usize {
        self.species.iter().map(|e| e.instances.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.species.iter().all(|e| e.instances.is_empty())
    }

    pub fn species_count(&self) -> usize {
        self.species.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpeciesEntry> {
        self.species.iter()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}
