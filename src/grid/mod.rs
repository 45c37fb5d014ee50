//! Uniform 2D spatial index over a triangle mesh's XZ footprint.
//!
//! Every triangle is registered in every cell its XZ bounding box overlaps
//! (clamped to the grid), so a point query only has to test the triangles of
//! the single cell containing the point.

pub mod config;

pub use config::{GridConfig, MAX_RESOLUTION};

use crate::core::types::Vec2;
use crate::core::Result;
use crate::math::Rect;
use crate::mesh::TerrainMesh;

/// Occupancy statistics, mostly for logging and tuning resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GridStats {
    pub triangles: usize,
    /// Total triangle references across all cells
    pub references: usize,
    pub occupied_cells: usize,
    pub max_occupancy: usize,
}

impl GridStats {
    /// Average references per occupied cell.
    pub fn mean_occupancy(&self) -> f32 {
        if self.occupied_cells == 0 {
            0.0
        } else {
            self.references as f32 / self.occupied_cells as f32
        }
    }
}

/// Uniform grid of triangle start-indices over a borrowed terrain mesh.
///
/// Immutable after `build`. An empty grid (no mesh, or a mesh without
/// triangles) answers every query with "no data".
#[derive(Clone, Debug)]
pub struct MeshGrid<'a> {
    mesh: Option<TerrainMesh<'a>>,
    config: GridConfig,
    /// Padded footprint; `Rect::empty()` for an empty grid
    bounds: Rect,
    cell_size: Vec2,
    /// Row-major in Z: `cells[cz * resolution + cx]`
    cells: Vec<Vec<u32>>,
}

impl<'a> MeshGrid<'a> {
    /// Grid with no mesh. Every query misses.
    pub fn empty() -> Self {
        Self {
            mesh: None,
            config: GridConfig::default(),
            bounds: Rect::empty(),
            cell_size: Vec2::ZERO,
            cells: Vec::new(),
        }
    }

    /// Index `mesh` into a `resolution x resolution` grid.
    pub fn build(mesh: TerrainMesh<'a>, config: &GridConfig) -> Result<Self> {
        config.validate()?;

        if mesh.is_empty() {
            log::warn!("Mesh grid built from a mesh without triangles; all queries will miss");
            return Ok(Self { config: config.clone(), ..Self::empty() });
        }

        let mut footprint = Rect::empty();
        for v in 0..mesh.vertex_count() as u32 {
            let p = mesh.position(v);
            footprint.expand(Vec2::new(p.x, p.z));
        }
        let bounds = footprint.padded(config.padding);
        let res = config.resolution;
        let cell_size = bounds.size() / res as f32;

        let mut grid = Self {
            mesh: Some(mesh),
            config: config.clone(),
            bounds,
            cell_size,
            cells: vec![Vec::new(); (res as usize) * (res as usize)],
        };

        for (start, [a, b, c]) in mesh.triangles() {
            let (pa, pb, pc) = (mesh.position(a), mesh.position(b), mesh.position(c));
            let min = Vec2::new(pa.x.min(pb.x).min(pc.x), pa.z.min(pb.z).min(pc.z));
            let max = Vec2::new(pa.x.max(pb.x).max(pc.x), pa.z.max(pb.z).max(pc.z));

            let (x0, z0) = grid.clamped_cell(min);
            let (x1, z1) = grid.clamped_cell(max);
            for cz in z0..=z1 {
                for cx in x0..=x1 {
                    grid.cells[(cz * res + cx) as usize].push(start);
                }
            }
        }

        let stats = grid.stats();
        log::info!(
            "Mesh grid built: {} triangles into {}x{} cells ({:.2} x {:.2} per cell, {:.1} avg/cell, {} max)",
            stats.triangles, res, res, cell_size.x, cell_size.y,
            stats.mean_occupancy(), stats.max_occupancy,
        );

        Ok(grid)
    }

    /// Cell containing `p`, clamped into `[0, resolution - 1]` on both axes.
    fn clamped_cell(&self, p: Vec2) -> (u32, u32) {
        let max_index = (self.config.resolution - 1) as f32;
        let rel = (p - self.bounds.min) / self.cell_size;
        let cx = rel.x.floor().clamp(0.0, max_index) as u32;
        let cz = rel.y.floor().clamp(0.0, max_index) as u32;
        (cx, cz)
    }

    pub fn is_empty(&self) -> bool {
        self.mesh.is_none()
    }

    pub fn mesh(&self) -> Option<&TerrainMesh<'a>> {
        self.mesh.as_ref()
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Padded footprint, `None` for an empty grid.
    pub fn bounds(&self) -> Option<Rect> {
        if self.is_empty() { None } else { Some(self.bounds) }
    }

    pub fn resolution(&self) -> u32 {
        self.config.resolution
    }

    pub fn cell_size(&self) -> Vec2 {
        self.cell_size
    }

    /// Cell holding world `(x, z)`, or `None` outside the padded bounds.
    pub fn cell_of(&self, x: f32, z: f32) -> Option<(u32, u32)> {
        if self.is_empty() || !self.bounds.contains(Vec2::new(x, z)) {
            return None;
        }
        Some(self.clamped_cell(Vec2::new(x, z)))
    }

    /// Triangle start-indices registered in cell `(cx, cz)`.
    pub fn cell_triangles(&self, cx: u32, cz: u32) -> &[u32] {
        let res = self.config.resolution;
        if self.is_empty() || cx >= res || cz >= res {
            return &[];
        }
        &self.cells[(cz * res + cx) as usize]
    }

    /// Triangles that may contain world `(x, z)`.
    pub fn candidates(&self, x: f32, z: f32) -> &[u32] {
        match self.cell_of(x, z) {
            Some((cx, cz)) => self.cell_triangles(cx, cz),
            None => &[],
        }
    }

    pub fn stats(&self) -> GridStats {
        let mut stats = GridStats {
            triangles: self.mesh.map_or(0, |m| m.triangle_count()),
            ..Default::default()
        };
        for cell in &self.cells {
            if !cell.is_empty() {
                stats.occupied_cells += 1;
                stats.references += cell.len();
                stats.max_occupancy = stats.max_occupancy.max(cell.len());
            }
        }
        stats
    }
}
