//! Barycentric coordinates of a point against an XZ-projected triangle.

use crate::core::types::{Vec2, Vec3};

/// Weights `(l1, l2, l3)` of a point relative to triangle `(p1, p2, p3)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Barycentric {
    pub l1: f32,
    pub l2: f32,
    pub l3: f32,
}

impl Barycentric {
    /// Solve the 2x2 system for `p` against the XZ projection of the triangle.
    ///
    /// Returns `None` when the projected triangle is degenerate, i.e. the
    /// absolute determinant falls below `epsilon`.
    pub fn of_xz(p: Vec2, p1: Vec3, p2: Vec3, p3: Vec3, epsilon: f32) -> Option<Self> {
        let det = (p2.z - p3.z) * (p1.x - p3.x) + (p3.x - p2.x) * (p1.z - p3.z);
        if det.abs() < epsilon {
            return None;
        }

        let l1 = ((p2.z - p3.z) * (p.x - p3.x) + (p3.x - p2.x) * (p.y - p3.z)) / det;
        let l2 = ((p3.z - p1.z) * (p.x - p3.x) + (p1.x - p3.x) * (p.y - p3.z)) / det;
        let l3 = 1.0 - l1 - l2;
        Some(Self { l1, l2, l3 })
    }

    /// Point lies inside (or on an edge, within `tolerance`).
    pub fn is_inside(&self, tolerance: f32) -> bool {
        self.l1 >= -tolerance && self.l2 >= -tolerance && self.l3 >= -tolerance
    }

    pub fn interpolate_f32(&self, a: f32, b: f32, c: f32) -> f32 {
        self.l1 * a + self.l2 * b + self.l3 * c
    }

    pub fn interpolate_vec3(&self, a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
        a * self.l1 + b * self.l2 + c * self.l3
    }

    /// Index (0..3) of the corner with the largest weight.
    pub fn dominant(&self) -> usize {
        if self.l1 >= self.l2 && self.l1 >= self.l3 {
            0
        } else if self.l2 >= self.l3 {
            1
        } else {
            2
        }
    }

    pub fn as_array(&self) -> [f32; 3] {
        [self.l1, self.l2, self.l3]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri() -> (Vec3, Vec3, Vec3) {
        (
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(2.0, 3.0, 0.0),
            Vec3::new(0.0, 5.0, 2.0),
        )
    }

    #[test]
    fn test_vertices_have_unit_weight() {
        let (a, b, c) = tri();
        let w = Barycentric::of_xz(Vec2::new(a.x, a.z), a, b, c, 1e-6).unwrap();
        assert!((w.l1 - 1.0).abs() < 1e-6);
        let w = Barycentric::of_xz(Vec2::new(b.x, b.z), a, b, c, 1e-6).unwrap();
        assert!((w.l2 - 1.0).abs() < 1e-6);
        let w = Barycentric::of_xz(Vec2::new(c.x, c.z), a, b, c, 1e-6).unwrap();
        assert!((w.l3 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_centroid_interpolates_average() {
        let (a, b, c) = tri();
        let centroid = Vec2::new((a.x + b.x + c.x) / 3.0, (a.z + b.z + c.z) / 3.0);
        let w = Barycentric::of_xz(centroid, a, b, c, 1e-6).unwrap();
        assert!(w.is_inside(0.0));
        let h = w.interpolate_f32(a.y, b.y, c.y);
        assert!((h - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_outside_point() {
        let (a, b, c) = tri();
        let w = Barycentric::of_xz(Vec2::new(5.0, 5.0), a, b, c, 1e-6).unwrap();
        assert!(!w.is_inside(1e-6));
    }

    #[test]
    fn test_degenerate_projection() {
        // Vertical sliver: all three points share the same XZ line
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(1.0, 5.0, 0.0);
        let c = Vec3::new(2.0, 9.0, 0.0);
        assert!(Barycentric::of_xz(Vec2::new(1.0, 0.0), a, b, c, 1e-3).is_none());
    }

    #[test]
    fn test_dominant_corner() {
        let w = Barycentric { l1: 0.1, l2: 0.7, l3: 0.2 };
        assert_eq!(w.dominant(), 1);
        let w = Barycentric { l1: 0.2, l2: 0.2, l3: 0.6 };
        assert_eq!(w.dominant(), 2);
    }
}
