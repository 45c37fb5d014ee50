//! Noise-band biome partitioning.

use serde::{Deserialize, Serialize};

use super::{DensityField, NoiseGate};
use crate::core::{Error, Result};
use crate::math::Band;

/// A named slice of the biome field's raw value range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Biome {
    pub name: String,
    pub band: Band,
}

impl Biome {
    pub fn new(name: impl Into<String>, band: Band) -> Self {
        Self { name: name.into(), band }
    }
}

/// Biome lookup over a single field. The first biome whose band holds the
/// raw field value wins, so list narrow bands before catch-alls.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiomeMap {
    pub field: DensityField,
    pub biomes: Vec<Biome>,
}

impl BiomeMap {
    pub fn new(field: DensityField) -> Self {
        Self { field, biomes: Vec::new() }
    }

    pub fn with_biome(mut self, name: impl Into<String>, band: Band) -> Self {
        self.biomes.push(Biome::new(name, band));
        self
    }

    /// Birch highlands, pine lowlands, oak in between and scrub everywhere.
    /// The gaps at +-(0.30..0.35) fall through to scrub.
    pub fn forest() -> Self {
        Self::new(DensityField::biome())
            .with_biome("birch", Band::above(0.35))
            .with_biome("pine", Band::below(-0.35))
            .with_biome("oak", Band::new(-0.3, 0.3))
            .with_biome("scrub", Band::ANY)
    }

    pub fn value_at(&self, x: f32, z: f32) -> f32 {
        self.field.noise2d(x, z)
    }

    pub fn biome_at(&self, x: f32, z: f32) -> Option<&Biome> {
        let v = self.value_at(x, z);
        self.biomes.iter().find(|b| b.band.contains(v))
    }

    pub fn get(&self, name: &str) -> Option<&Biome> {
        self.biomes.iter().find(|b| b.name == name)
    }

    /// Gate admitting exactly the raw values of the named biome's band.
    pub fn gate(&self, name: &str) -> Option<NoiseGate> {
        self.get(name).map(|b| NoiseGate::new(self.field.clone(), b.band))
    }

    pub fn validate(&self) -> Result<()> {
        self.field.validate()?;
        for biome in &self.biomes {
            if !biome.band.is_valid() {
                return Err(Error::config(format!("biome '{}' has an empty band", biome.name)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forest_biomes_cover_everything() {
        let map = BiomeMap::forest();
        for i in 0..500 {
            let x = (i % 25) as f32 * 40.0 - 500.0;
            let z = (i / 25) as f32 * 40.0 - 500.0;
            assert!(map.biome_at(x, z).is_some());
        }
    }

    #[test]
    fn test_first_match_wins() {
        let map = BiomeMap::forest();
        for i in 0..500 {
            let x = (i % 25) as f32 * 40.0 - 500.0;
            let z = (i / 25) as f32 * 40.0 - 500.0;
            let v = map.value_at(x, z);
            let name = map.biome_at(x, z).unwrap().name.as_str();
            match name {
                "birch" => assert!(v >= 0.35),
                "pine" => assert!(v <= -0.35),
                "oak" => assert!((-0.3..=0.3).contains(&v)),
                "scrub" => assert!(v.abs() > 0.3 && v.abs() < 0.35),
                other => panic!("unexpected biome {other}"),
            }
        }
    }

    #[test]
    fn test_biome_variety() {
        let map = BiomeMap::forest();
        let mut names = std::collections::HashSet::new();
        for i in 0..900 {
            let x = (i % 30) as f32 * 35.0 - 525.0;
            let z = (i / 30) as f32 * 35.0 - 525.0;
            names.insert(map.biome_at(x, z).unwrap().name.clone());
        }
        assert!(names.contains("birch"));
        assert!(names.contains("pine"));
        assert!(names.contains("oak"));
    }

    #[test]
    fn test_gate_matches_biome() {
        let map = BiomeMap::forest();
        let gate = map.gate("oak").unwrap();
        for i in 0..100 {
            let x = i as f32 * 9.0 - 450.0;
            let is_oak = map.biome_at(x, 0.0).unwrap().name == "oak";
            assert_eq!(gate.admits(x, 0.0), is_oak);
        }
        assert!(map.gate("palm").is_none());
    }

    #[test]
    fn test_json_roundtrip() {
        let map = BiomeMap::forest();
        let json = serde_json::to_string(&map).unwrap();
        let back: BiomeMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
