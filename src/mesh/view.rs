//! Borrowed, validated view over a terrain vertex/index buffer pair.

use crate::core::types::Vec3;
use crate::core::{Error, Result};
use super::layout::VertexLayout;

/// Scale every position component of every vertex in place.
pub fn scale_positions(vertices: &mut [f32], layout: VertexLayout, scale: f32) -> Result<()> {
    layout.validate()?;
    if vertices.len() % layout.stride != 0 {
        return Err(Error::StrideMismatch { len: vertices.len(), stride: layout.stride });
    }
    if scale == 1.0 {
        return Ok(());
    }
    for vertex in vertices.chunks_exact_mut(layout.stride) {
        for c in &mut vertex[layout.position..layout.position + 3] {
            *c *= scale;
        }
    }
    Ok(())
}

/// Terrain mesh data owned by the loading collaborator and borrowed here.
///
/// Construction validates the stride, index count and index range once so
/// that every later accessor can index without bounds surprises.
#[derive(Clone, Copy, Debug)]
pub struct TerrainMesh<'a> {
    vertices: &'a [f32],
    indices: &'a [u32],
    layout: VertexLayout,
}

impl<'a> TerrainMesh<'a> {
    pub fn new(vertices: &'a [f32], indices: &'a [u32], layout: VertexLayout) -> Result<Self> {
        layout.validate()?;
        if vertices.len() % layout.stride != 0 {
            return Err(Error::StrideMismatch { len: vertices.len(), stride: layout.stride });
        }
        if indices.len() % 3 != 0 {
            return Err(Error::IndexCount(indices.len()));
        }
        let vertex_count = vertices.len() / layout.stride;
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(Error::IndexOutOfRange { index, vertex_count });
        }
        Ok(Self { vertices, indices, layout })
    }

    /// Scale positions in place by `scale`, then borrow the buffer as a mesh.
    pub fn scaled(
        vertices: &'a mut [f32],
        indices: &'a [u32],
        layout: VertexLayout,
        scale: f32,
    ) -> Result<Self> {
        scale_positions(vertices, layout, scale)?;
        Self::new(vertices, indices, layout)
    }

    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    pub fn vertices(&self) -> &'a [f32] {
        self.vertices
    }

    pub fn indices(&self) -> &'a [u32] {
        self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / self.layout.stride
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Raw float at `offset` within vertex `vertex`.
    ///
    /// Panics if `offset >= stride`; callers validate offsets up front.
    pub fn attribute(&self, vertex: u32, offset: usize) -> f32 {
        debug_assert!(offset < self.layout.stride);
        self.vertices[vertex as usize * self.layout.stride + offset]
    }

    fn vec3_at(&self, vertex: u32, offset: usize) -> Vec3 {
        let base = vertex as usize * self.layout.stride + offset;
        Vec3::new(self.vertices[base], self.vertices[base + 1], self.vertices[base + 2])
    }

    pub fn position(&self, vertex: u32) -> Vec3 {
        self.vec3_at(vertex, self.layout.position)
    }

    pub fn normal(&self, vertex: u32) -> Vec3 {
        self.vec3_at(vertex, self.layout.normal)
    }

    /// Material weights, if the layout carries a colour channel.
    pub fn color(&self, vertex: u32) -> Option<Vec3> {
        self.layout.color.map(|offset| self.vec3_at(vertex, offset))
    }

    /// Vertex indices of the triangle starting at index-buffer position `start`.
    pub fn triangle_at(&self, start: u32) -> [u32; 3] {
        let s = start as usize;
        [self.indices[s], self.indices[s + 1], self.indices[s + 2]]
    }

    /// Iterate `(start, [a, b, c])` for every triangle.
    pub fn triangles(&self) -> impl Iterator<Item = (u32, [u32; 3])> + 'a {
        self.indices
            .chunks_exact(3)
            .enumerate()
            .map(|(t, tri)| ((t * 3) as u32, [tri[0], tri[1], tri[2]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> (Vec<f32>, Vec<u32>) {
        let mut vertices = Vec::new();
        for (x, z) in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)] {
            vertices.extend_from_slice(&[x, 2.0, z, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
        }
        (vertices, vec![0, 1, 2, 1, 3, 2])
    }

    #[test]
    fn test_accessors() {
        let (vertices, indices) = quad();
        let mesh = TerrainMesh::new(&vertices, &indices, VertexLayout::STANDARD).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.position(3), Vec3::new(1.0, 2.0, 1.0));
        assert_eq!(mesh.normal(0), Vec3::Y);
        assert_eq!(mesh.color(0), None);
        assert_eq!(mesh.triangle_at(3), [1, 3, 2]);
        assert_eq!(mesh.triangles().count(), 2);
    }

    #[test]
    fn test_stride_mismatch() {
        let (mut vertices, indices) = quad();
        vertices.pop();
        let err = TerrainMesh::new(&vertices, &indices, VertexLayout::STANDARD).unwrap_err();
        assert!(matches!(err, Error::StrideMismatch { stride: 11, .. }));
    }

    #[test]
    fn test_index_validation() {
        let (vertices, _) = quad();
        let err = TerrainMesh::new(&vertices, &[0, 1], VertexLayout::STANDARD).unwrap_err();
        assert!(matches!(err, Error::IndexCount(2)));

        let err = TerrainMesh::new(&vertices, &[0, 1, 9], VertexLayout::STANDARD).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { index: 9, vertex_count: 4 }));
    }

    #[test]
    fn test_scaled_in_place() {
        let (mut vertices, indices) = quad();
        let mesh = TerrainMesh::scaled(&mut vertices, &indices, VertexLayout::STANDARD, 2.0).unwrap();
        assert_eq!(mesh.position(3), Vec3::new(2.0, 4.0, 2.0));
        // Normals are untouched
        assert_eq!(mesh.normal(3), Vec3::Y);
    }
}
