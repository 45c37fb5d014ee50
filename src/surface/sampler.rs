//! Height / normal / material queries via barycentric interpolation.

use crate::core::types::{Vec2, Vec3};
use crate::grid::MeshGrid;
use crate::math::Barycentric;
use super::rules::{MaterialChannel, SurfaceRejection, SurfaceRules};

/// Height returned when no triangle lies under the query point.
pub const NO_HEIGHT: f32 = -1000.0;

/// A resolved point on the terrain surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceHit {
    /// `(x, interpolated height, z)`
    pub position: Vec3,
    /// Interpolated, normalized vertex normal
    pub normal: Vec3,
    pub weights: Barycentric,
    /// Index-buffer start of the hit triangle
    pub triangle: u32,
    pub vertices: [u32; 3],
}

impl SurfaceHit {
    /// Corner with the largest barycentric weight.
    pub fn nearest_vertex(&self) -> u32 {
        self.vertices[self.weights.dominant()]
    }

    pub fn point(&self) -> SurfacePoint {
        SurfacePoint {
            position: self.position,
            normal: self.normal,
            vertex: self.nearest_vertex(),
        }
    }
}

/// Minimal input to surface classification: where, which way is up, and
/// which vertex carries the material channels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfacePoint {
    pub position: Vec3,
    pub normal: Vec3,
    pub vertex: u32,
}

/// Read-only query front-end over a built `MeshGrid`.
///
/// Cheap to copy; safe to share across threads while the grid is alive.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceSampler<'a> {
    grid: &'a MeshGrid<'a>,
}

impl<'a> SurfaceSampler<'a> {
    pub fn new(grid: &'a MeshGrid<'a>) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &'a MeshGrid<'a> {
        self.grid
    }

    /// First triangle of the containing cell whose XZ projection holds `(x, z)`.
    ///
    /// First hit wins. On a true heightfield the cell entries never overlap,
    /// so the choice is unique up to shared edges.
    pub fn sample(&self, x: f32, z: f32) -> Option<SurfaceHit> {
        let mesh = self.grid.mesh()?;
        let config = self.grid.config();
        let p = Vec2::new(x, z);

        for &start in self.grid.candidates(x, z) {
            let vertices = mesh.triangle_at(start);
            let [a, b, c] = vertices;
            let (p1, p2, p3) = (mesh.position(a), mesh.position(b), mesh.position(c));

            let Some(weights) = Barycentric::of_xz(p, p1, p2, p3, config.degenerate_epsilon) else {
                continue;
            };
            if !weights.is_inside(config.edge_tolerance) {
                continue;
            }

            let height = weights.interpolate_f32(p1.y, p2.y, p3.y);
            let normal = weights
                .interpolate_vec3(mesh.normal(a), mesh.normal(b), mesh.normal(c))
                .try_normalize()
                .unwrap_or(Vec3::Y);

            return Some(SurfaceHit {
                position: Vec3::new(x, height, z),
                normal,
                weights,
                triangle: start,
                vertices,
            });
        }
        None
    }

    pub fn try_height_at(&self, x: f32, z: f32) -> Option<f32> {
        self.sample(x, z).map(|hit| hit.position.y)
    }

    /// Interpolated height, or `NO_HEIGHT` when nothing lies under `(x, z)`.
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        self.try_height_at(x, z).unwrap_or(NO_HEIGHT)
    }

    /// Interpolated normal, or world up when nothing lies under `(x, z)`.
    pub fn normal_at(&self, x: f32, z: f32) -> Vec3 {
        self.sample(x, z).map_or(Vec3::Y, |hit| hit.normal)
    }

    /// Material weight at the hit triangle's nearest vertex.
    pub fn material_at(&self, x: f32, z: f32, channel: MaterialChannel) -> Option<f32> {
        let mesh = self.grid.mesh()?;
        let hit = self.sample(x, z)?;
        channel.read(mesh, hit.nearest_vertex())
    }

    /// Surface point taken straight from vertex data, without a grid lookup.
    pub fn vertex_point(&self, vertex: u32) -> Option<SurfacePoint> {
        let mesh = self.grid.mesh()?;
        if vertex as usize >= mesh.vertex_count() {
            return None;
        }
        Some(SurfacePoint {
            position: mesh.position(vertex),
            normal: mesh.normal(vertex).try_normalize().unwrap_or(Vec3::Y),
            vertex,
        })
    }

    /// Classify an already-resolved point.
    pub fn check(&self, point: &SurfacePoint, rules: &SurfaceRules) -> Result<(), SurfaceRejection> {
        let mesh = self.grid.mesh().ok_or(SurfaceRejection::OutOfBounds)?;
        rules.check(mesh, point)
    }

    /// Sample `(x, z)` and classify it. Returns the hit on success.
    pub fn check_at(&self, x: f32, z: f32, rules: &SurfaceRules) -> Result<SurfaceHit, SurfaceRejection> {
        let hit = self.sample(x, z).ok_or(SurfaceRejection::OutOfBounds)?;
        self.check(&hit.point(), rules)?;
        Ok(hit)
    }

    /// True if terrain exists under `(x, z)` and passes every rule.
    pub fn classify_surface(&self, x: f32, z: f32, rules: &SurfaceRules) -> bool {
        self.check_at(x, z, rules).is_ok()
    }
}
