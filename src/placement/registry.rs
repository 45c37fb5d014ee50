//! Accepted-position registry for minimum-separation checks.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::instance::{InstanceStore, SpeciesId};

/// Which accepted positions a new candidate must keep its distance from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeparationScope {
    /// Every accepted instance in the candidate's separation group
    #[default]
    Global,
    /// Only instances of the candidate's own species
    PerSpecies,
}

/// Interned separation group name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub u16);

/// One accepted position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegistryEntry {
    pub position: Vec2,
    pub species: SpeciesId,
    pub group: GroupId,
}

/// Append-only list of accepted XZ positions.
///
/// Lookups are a linear scan. Instance counts stay in the tens of thousands
/// and placement runs offline, so a spatial index is not worth its upkeep.
#[derive(Clone, Debug, Default)]
pub struct PositionRegistry {
    entries: Vec<RegistryEntry>,
    groups: Vec<String>,
}

impl PositionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of group `name`, interning it on first use.
    pub fn group(&mut self, name: &str) -> Result<GroupId> {
        if let Some(i) = self.groups.iter().position(|g| g == name) {
            return Ok(GroupId(i as u16));
        }
        let id = u16::try_from(self.groups.len())
            .map_err(|_| Error::config(format!("too many separation groups, cannot add '{}'", name)))?;
        self.groups.push(name.to_string());
        Ok(GroupId(id))
    }

    pub fn group_name(&self, id: GroupId) -> Option<&str> {
        self.groups.get(id.0 as usize).map(String::as_str)
    }

    /// Registry holding every instance position in `store` whose species
    /// `group_of` places in a group.
    pub fn rebuild_from(&mut self, store: &InstanceStore, group_of: impl Fn(SpeciesId) -> Option<GroupId>) {
        self.entries.clear();
        for entry in store.iter() {
            let Some(group) = group_of(entry.id) else {
                continue;
            };
            self.entries.extend(entry.instances.iter().map(|inst| RegistryEntry {
                position: inst.xz(),
                species: entry.id,
                group,
            }));
        }
    }

    pub fn push(&mut self, position: Vec2, species: SpeciesId, group: GroupId) {
        self.entries.push(RegistryEntry { position, species, group });
    }

    fn clear_of(&self, position: Vec2, min_distance: f32, mut relevant: impl FnMut(&RegistryEntry) -> bool) -> bool {
        if min_distance <= 0.0 {
            return true;
        }
        let d2 = min_distance * min_distance;
        self.entries
            .iter()
            .filter(|e| relevant(e))
            .all(|e| e.position.distance_squared(position) >= d2)
    }

    /// True when every registered position lies at least `min_distance` away.
    pub fn is_clear(&self, position: Vec2, min_distance: f32) -> bool {
        self.clear_of(position, min_distance, |_| true)
    }

    /// `is_clear` restricted to one group.
    pub fn is_clear_in(&self, position: Vec2, min_distance: f32, group: GroupId) -> bool {
        self.clear_of(position, min_distance, |e| e.group == group)
    }

    /// `is_clear` restricted to one species.
    pub fn is_clear_of(&self, position: Vec2, min_distance: f32, species: SpeciesId) -> bool {
        self.clear_of(position, min_distance, |e| e.species == species)
    }

    pub fn check(
        &self,
        position: Vec2,
        min_distance: f32,
        species: SpeciesId,
        group: GroupId,
        scope: SeparationScope,
    ) -> bool {
        match scope {
            SeparationScope::Global => self.is_clear_in(position, min_distance, group),
            SeparationScope::PerSpecies => self.is_clear_of(position, min_distance, species),
        }
    }

    /// Keep only entries whose species passes `keep`.
    pub fn retain_species(&mut self, mut keep: impl FnMut(SpeciesId) -> bool) {
        self.entries.retain(|e| keep(e.species));
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.entries.iter().map(|e| e.position)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry. Group ids stay valid.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
