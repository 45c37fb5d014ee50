//! Noise-based procedural terrain generation

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::mesh::{HeightfieldMesh, VertexLayout};

/// Upper octave count accepted by the FBM noise
const MAX_OCTAVES: u32 = 32;

/// Parameters controlling terrain generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    pub seed: u32,
    pub scale: f32,        // Horizontal scale (larger = smoother)
    pub height_scale: f32, // Vertical amplitude around base_height
    pub octaves: u32,      // FBM octaves (detail levels)
    pub persistence: f32,  // FBM persistence (0.5 typical)
    pub lacunarity: f32,   // FBM lacunarity (2.0 typical)
    pub base_height: f32,  // Height of the zero noise level
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            seed: 12345,
            scale: 60.0,
            height_scale: 20.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            base_height: 8.0,
        }
    }
}

impl TerrainParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.scale > 0.0) {
            return Err(Error::config(format!("terrain scale must be positive, got {}", self.scale)));
        }
        if !self.height_scale.is_finite() || !self.base_height.is_finite() {
            return Err(Error::config("terrain heights must be finite"));
        }
        if self.octaves == 0 || self.octaves > MAX_OCTAVES {
            return Err(Error::config(format!("terrain octaves {} out of range", self.octaves)));
        }
        Ok(())
    }
}

/// Procedural terrain generator using fractal Brownian motion (FBM)
pub struct TerrainGenerator {
    params: TerrainParams,
    noise: Fbm<Perlin>,
}

impl TerrainGenerator {
    /// Create a new terrain generator with the given parameters
    pub fn new(params: TerrainParams) -> Result<Self> {
        params.validate()?;
        let noise = Fbm::<Perlin>::new(params.seed)
            .set_octaves(params.octaves as usize)
            .set_persistence(params.persistence as f64)
            .set_lacunarity(params.lacunarity as f64);

        Ok(Self { params, noise })
    }

    /// Get terrain parameters
    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    /// Terrain height at world position (x, z), within `base_height +- height_scale`
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        let nx = (x / self.params.scale) as f64;
        let nz = (z / self.params.scale) as f64;
        let noise_value = self.noise.get([nx, nz]).clamp(-1.0, 1.0) as f32;
        self.params.base_height + noise_value * self.params.height_scale
    }

    /// Square heightfield of side `size` split into `cells x cells` quads,
    /// centered on the origin.
    pub fn build_mesh(&self, size: f32, cells: u32, layout: VertexLayout) -> Result<HeightfieldMesh> {
        if cells == 0 || !(size > 0.0) {
            return Err(Error::config(format!("terrain mesh needs positive size and cells, got {} / {}", size, cells)));
        }
        let mesh = HeightfieldMesh::from_height_fn(cells + 1, size / cells as f32, layout, |x, z| self.height_at(x, z))?;
        log::info!(
            "Generated {}x{} terrain mesh ({} vertices, seed {})",
            cells,
            cells,
            mesh.vertex_count(),
            self.params.seed
        );
        Ok(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terrain_params_default() {
        let params = TerrainParams::default();
        assert_eq!(params.seed, 12345);
        assert_eq!(params.octaves, 4);
        assert_eq!(params.persistence, 0.5);
        assert_eq!(params.lacunarity, 2.0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_invalid_params() {
        assert!(TerrainGenerator::new(TerrainParams { scale: 0.0, ..Default::default() }).is_err());
        assert!(TerrainGenerator::new(TerrainParams { octaves: 0, ..Default::default() }).is_err());
    }

    #[test]
    fn test_height_at_bounds() {
        let generator = TerrainGenerator::new(TerrainParams::default()).unwrap();
        for (x, z) in [(0.0, 0.0), (50.0, 50.0), (100.0, 100.0), (-50.0, -37.5)] {
            let h = generator.height_at(x, z);
            assert!((-12.0..=28.0).contains(&h), "height {} at ({}, {})", h, x, z);
            assert_eq!(h, generator.height_at(x, z), "Height should be consistent at ({}, {})", x, z);
        }
    }

    #[test]
    fn test_different_seeds() {
        let gen1 = TerrainGenerator::new(TerrainParams { seed: 1, ..Default::default() }).unwrap();
        let gen2 = TerrainGenerator::new(TerrainParams { seed: 2, ..Default::default() }).unwrap();
        assert_ne!(gen1.height_at(50.0, 50.0), gen2.height_at(50.0, 50.0));
    }

    #[test]
    fn test_build_mesh_matches_height_fn() {
        let generator = TerrainGenerator::new(TerrainParams::default()).unwrap();
        let mesh = generator.build_mesh(64.0, 16, VertexLayout::COLORED).unwrap();
        assert_eq!(mesh.vertex_count(), 17 * 17);

        let view = mesh.as_mesh().unwrap();
        let p = view.position(0);
        assert_eq!(p.x, -32.0);
        assert_eq!(p.z, -32.0);
        assert_eq!(p.y, generator.height_at(p.x, p.z));
        assert!(generator.build_mesh(64.0, 0, VertexLayout::COLORED).is_err());
    }
}
