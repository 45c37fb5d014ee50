//! Owned regular-grid heightfield mesh.
//!
//! Stands in for the importer-loaded terrain in tests, benches and the
//! `scatter` binary. Vertices are laid out row-major in Z, centered on the
//! origin, with finite-difference normals and a colour channel holding
//! material weights (R sand, G grass, B vegetation).

use crate::core::types::Vec3;
use crate::core::{Error, Result};
use super::layout::VertexLayout;
use super::view::{scale_positions, TerrainMesh};

/// Default material weights. Ground below zero turns to sand over two
/// units; the vegetation weight in B fades out between `normal.y` 0.95
/// and 0.7.
pub fn slope_paint(height: f32, normal: Vec3) -> Vec3 {
    let sand = (-height / 2.0).clamp(0.0, 1.0);
    let lush = ((normal.y - 0.7) / 0.25).clamp(0.0, 1.0);
    Vec3::new(sand, 1.0 - sand, lush * (1.0 - sand))
}

/// Owned vertex + index buffers in a known layout.
#[derive(Clone, Debug)]
pub struct HeightfieldMesh {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
    pub layout: VertexLayout,
}

impl HeightfieldMesh {
    /// Flat grid of `n x n` vertices at constant `height`.
    pub fn flat(n: u32, spacing: f32, height: f32, layout: VertexLayout) -> Result<Self> {
        Self::build(n, spacing, layout, |_, _| height, slope_paint)
    }

    /// Grid of `n x n` vertices sampling `height(x, z)`, painted by slope.
    pub fn from_height_fn<H>(n: u32, spacing: f32, layout: VertexLayout, height: H) -> Result<Self>
    where
        H: Fn(f32, f32) -> f32,
    {
        Self::build(n, spacing, layout, height, slope_paint)
    }

    /// Grid of `n x n` vertices with explicit height and material functions.
    pub fn build<H, P>(n: u32, spacing: f32, layout: VertexLayout, height: H, paint: P) -> Result<Self>
    where
        H: Fn(f32, f32) -> f32,
        P: Fn(f32, Vec3) -> Vec3,
    {
        layout.validate()?;
        if n < 2 {
            return Err(Error::config(format!("heightfield needs at least 2 vertices per side, got {}", n)));
        }
        if !(spacing > 0.0) {
            return Err(Error::config(format!("heightfield spacing must be positive, got {}", spacing)));
        }

        let half = (n - 1) as f32 * spacing * 0.5;
        let uv_scale = 1.0 / (n - 1) as f32;
        let mut vertices = vec![0.0; (n * n) as usize * layout.stride];

        for j in 0..n {
            for i in 0..n {
                let x = i as f32 * spacing - half;
                let z = j as f32 * spacing - half;
                let y = height(x, z);

                // Central differences over one grid spacing
                let dh_dx = (height(x + spacing, z) - height(x - spacing, z)) / (2.0 * spacing);
                let dh_dz = (height(x, z + spacing) - height(x, z - spacing)) / (2.0 * spacing);
                let normal = Vec3::new(-dh_dx, 1.0, -dh_dz).normalize();

                let v = &mut vertices[(j * n + i) as usize * layout.stride..][..layout.stride];
                v[layout.position..layout.position + 3].copy_from_slice(&[x, y, z]);
                v[layout.normal..layout.normal + 3].copy_from_slice(&normal.to_array());
                if let Some(offset) = layout.color {
                    v[offset..offset + 3].copy_from_slice(&paint(y, normal).to_array());
                }
                v[layout.uv..layout.uv + 2].copy_from_slice(&[i as f32 * uv_scale, j as f32 * uv_scale]);
                v[layout.tangent..layout.tangent + 3].copy_from_slice(&[1.0, 0.0, 0.0]);
            }
        }

        let mut indices = Vec::with_capacity(((n - 1) * (n - 1) * 6) as usize);
        for j in 0..n - 1 {
            for i in 0..n - 1 {
                let v00 = j * n + i;
                let v10 = v00 + 1;
                let v01 = v00 + n;
                let v11 = v01 + 1;
                indices.extend_from_slice(&[v00, v01, v11, v00, v11, v10]);
            }
        }

        Ok(Self { vertices, indices, layout })
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / self.layout.stride
    }

    /// Borrow as a validated mesh view.
    pub fn as_mesh(&self) -> Result<TerrainMesh<'_>> {
        TerrainMesh::new(&self.vertices, &self.indices, self.layout)
    }

    /// Scale positions in place, then borrow.
    pub fn scaled_mesh(&mut self, scale: f32) -> Result<TerrainMesh<'_>> {
        scale_positions(&mut self.vertices, self.layout, scale)?;
        TerrainMesh::new(&self.vertices, &self.indices, self.layout)
    }
}
