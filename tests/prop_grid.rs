use proptest::prelude::*;
use proptest::sample::Index;
use sylva::core::{Vec2, Vec3};
use sylva::grid::{GridConfig, MeshGrid};
use sylva::mesh::{HeightfieldMesh, TerrainMesh, VertexLayout};
use sylva::surface::{SurfaceSampler, NO_HEIGHT};

fn approx(a: f32, b: f32, eps: f32) -> bool { (a - b).abs() <= eps }

/// Integer XZ keeps the barycentric solve exact at the corners.
fn arb_corner() -> impl Strategy<Value = Vec3> {
    (-10i32..=10, -50.0f32..50.0, -10i32..=10).prop_map(|(x, y, z)| Vec3::new(x as f32, y, z as f32))
}

fn arb_triangle() -> impl Strategy<Value = [Vec3; 3]> {
    (arb_corner(), arb_corner(), arb_corner())
        .prop_map(|(a, b, c)| [a, b, c])
        .prop_filter("non-degenerate", |[a, b, c]| {
            let det = (b.z - c.z) * (a.x - c.x) + (c.x - b.x) * (a.z - c.z);
            det.abs() >= 4.0
        })
}

fn triangle_buffer(corners: &[Vec3; 3]) -> Vec<f32> {
    let layout = VertexLayout::STANDARD;
    let mut vertices = vec![0.0; 3 * layout.stride];
    for (i, p) in corners.iter().enumerate() {
        let v = &mut vertices[i * layout.stride..][..layout.stride];
        v[layout.position..layout.position + 3].copy_from_slice(&p.to_array());
        v[layout.normal..layout.normal + 3].copy_from_slice(&[0.0, 1.0, 0.0]);
    }
    vertices
}

/// Side length, spacing, resolution and per-vertex heights.
fn arb_heightfield() -> impl Strategy<Value = (u32, f32, u32, Vec<f32>)> {
    (2u32..12, 1u32..4, 1u32..48).prop_flat_map(|(n, spacing, resolution)| {
        (
            Just(n),
            Just(spacing as f32),
            Just(resolution),
            prop::collection::vec(-20.0f32..20.0, (n * n) as usize),
        )
    })
}

fn lookup_heights(n: u32, spacing: f32, heights: Vec<f32>) -> impl Fn(f32, f32) -> f32 {
    let half = (n - 1) as f32 * spacing * 0.5;
    move |x, z| {
        let i = ((x + half) / spacing).round().clamp(0.0, (n - 1) as f32) as u32;
        let j = ((z + half) / spacing).round().clamp(0.0, (n - 1) as f32) as u32;
        heights[(j * n + i) as usize]
    }
}

proptest! {
    #[test]
    fn corners_report_their_own_height(corners in arb_triangle(), resolution in 1u32..32) {
        let vertices = triangle_buffer(&corners);
        let indices = [0u32, 1, 2];
        let mesh = TerrainMesh::new(&vertices, &indices, VertexLayout::STANDARD).unwrap();
        let grid = MeshGrid::build(mesh, &GridConfig::with_resolution(resolution)).unwrap();
        let sampler = SurfaceSampler::new(&grid);

        for p in &corners {
            let h = sampler.height_at(p.x, p.z);
            prop_assert!(approx(h, p.y, 1e-4), "corner {:?} sampled {}", p, h);
        }
    }

    #[test]
    fn centroid_reports_mean_height(corners in arb_triangle(), resolution in 1u32..32) {
        let vertices = triangle_buffer(&corners);
        let indices = [0u32, 1, 2];
        let mesh = TerrainMesh::new(&vertices, &indices, VertexLayout::STANDARD).unwrap();
        let grid = MeshGrid::build(mesh, &GridConfig::with_resolution(resolution)).unwrap();
        let sampler = SurfaceSampler::new(&grid);

        let centroid = (corners[0] + corners[1] + corners[2]) / 3.0;
        let hit = sampler.sample(centroid.x, centroid.z);
        prop_assert!(hit.is_some());
        prop_assert!(approx(hit.unwrap().position.y, centroid.y, 1e-3));
    }

    #[test]
    fn points_past_the_padding_miss(
        corners in arb_triangle(),
        padding in 0.1f32..5.0,
        beyond in 0.5f32..100.0,
        side in 0usize..4,
    ) {
        let vertices = triangle_buffer(&corners);
        let indices = [0u32, 1, 2];
        let mesh = TerrainMesh::new(&vertices, &indices, VertexLayout::STANDARD).unwrap();
        let config = GridConfig { padding, ..GridConfig::with_resolution(16) };
        let grid = MeshGrid::build(mesh, &config).unwrap();
        let sampler = SurfaceSampler::new(&grid);

        let bounds = grid.bounds().unwrap();
        let center = bounds.center();
        let p = match side {
            0 => Vec2::new(bounds.max.x + beyond, center.y),
            1 => Vec2::new(bounds.min.x - beyond, center.y),
            2 => Vec2::new(center.x, bounds.max.y + beyond),
            _ => Vec2::new(center.x, bounds.min.y - beyond),
        };
        prop_assert!(sampler.sample(p.x, p.y).is_none());
        prop_assert_eq!(sampler.height_at(p.x, p.y), NO_HEIGHT);
        prop_assert_eq!(sampler.normal_at(p.x, p.y), Vec3::Y);
    }

    #[test]
    fn every_triangle_is_reachable_from_its_interior(
        (n, spacing, resolution, heights) in arb_heightfield(),
        pick in any::<Index>(),
        (a, b, c) in (0.05f32..1.0, 0.05f32..1.0, 0.05f32..1.0),
    ) {
        let hf = HeightfieldMesh::from_height_fn(n, spacing, VertexLayout::STANDARD, lookup_heights(n, spacing, heights)).unwrap();
        let mesh = hf.as_mesh().unwrap();
        let grid = MeshGrid::build(mesh, &GridConfig::with_resolution(resolution)).unwrap();
        let sampler = SurfaceSampler::new(&grid);

        let start = pick.index(mesh.triangle_count()) as u32 * 3;
        let [i1, i2, i3] = mesh.triangle_at(start);
        let (p1, p2, p3) = (mesh.position(i1), mesh.position(i2), mesh.position(i3));
        let sum = a + b + c;
        let (w1, w2, w3) = (a / sum, b / sum, c / sum);
        let x = w1 * p1.x + w2 * p2.x + w3 * p3.x;
        let z = w1 * p1.z + w2 * p2.z + w3 * p3.z;

        let hit = sampler.sample(x, z);
        prop_assert!(hit.is_some(), "no hit inside triangle {} at ({}, {})", start, x, z);
        let hit = hit.unwrap();
        prop_assert_eq!(hit.triangle, start);
        let expected = w1 * p1.y + w2 * p2.y + w3 * p3.y;
        prop_assert!(approx(hit.position.y, expected, 1e-3), "{} vs {}", hit.position.y, expected);
    }

    #[test]
    fn cell_lists_cover_triangle_bounding_boxes(
        (n, spacing, resolution, heights) in arb_heightfield(),
    ) {
        let hf = HeightfieldMesh::from_height_fn(n, spacing, VertexLayout::STANDARD, lookup_heights(n, spacing, heights)).unwrap();
        let mesh = hf.as_mesh().unwrap();
        let grid = MeshGrid::build(mesh, &GridConfig::with_resolution(resolution)).unwrap();

        for (start, [a, b, c]) in mesh.triangles() {
            let centroid = (mesh.position(a) + mesh.position(b) + mesh.position(c)) / 3.0;
            prop_assert!(grid.candidates(centroid.x, centroid.z).contains(&start));
        }
        prop_assert!(grid.stats().max_occupancy >= 1);
    }
}
