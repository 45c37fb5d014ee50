use criterion::{criterion_group, criterion_main, Criterion, black_box};

use sylva::density::{DensityField, DensityGate};
use sylva::grid::{GridConfig, MeshGrid};
use sylva::math::Band;
use sylva::mesh::{HeightfieldMesh, VertexLayout};
use sylva::placement::{PlacementEngine, ScatterRegion, SpeciesConfig};
use sylva::surface::{SurfaceRules, SurfaceSampler};
use sylva::terrain::{TerrainGenerator, TerrainParams};

use glam::Vec2;

fn terrain(cells: u32) -> HeightfieldMesh {
    let generator = TerrainGenerator::new(TerrainParams::default()).expect("terrain params");
    generator
        .build_mesh(200.0, cells, VertexLayout::COLORED)
        .expect("terrain mesh")
}

fn bench_grid_build_200(c: &mut Criterion) {
    let hf = terrain(200);
    let config = GridConfig::default();

    c.bench_function("grid_build_200", |b| {
        b.iter(|| {
            let mesh = hf.as_mesh().expect("mesh view");
            MeshGrid::build(black_box(mesh), black_box(&config)).expect("grid")
        });
    });
}

fn bench_height_query(c: &mut Criterion) {
    let hf = terrain(200);
    let grid = MeshGrid::build(hf.as_mesh().expect("mesh view"), &GridConfig::default()).expect("grid");
    let sampler = SurfaceSampler::new(&grid);

    c.bench_function("height_at_1k", |b| {
        b.iter(|| {
            let mut sum = 0.0;
            for i in 0..1000 {
                let x = (i % 40) as f32 * 4.9 - 98.0;
                let z = (i / 40) as f32 * 7.7 - 95.0;
                sum += sampler.height_at(black_box(x), black_box(z));
            }
            sum
        });
    });
}

fn bench_density_field(c: &mut Criterion) {
    let field = DensityField::grass();

    c.bench_function("density_grass_1k", |b| {
        b.iter(|| {
            let mut sum = 0.0;
            for i in 0..1000 {
                sum += field.normalized(black_box(i as f32 * 0.37), black_box(i as f32 * -0.21));
            }
            sum
        });
    });
}

fn bench_scatter_grass(c: &mut Criterion) {
    let hf = terrain(128);
    let grid = MeshGrid::build(hf.as_mesh().expect("mesh view"), &GridConfig::default()).expect("grid");
    let species = SpeciesConfig::new("grass", 2_000)
        .with_region(ScatterRegion::Rect { min: Vec2::splat(-60.0), max: Vec2::splat(60.0) })
        .with_surface(SurfaceRules::any().with_height(Band::new(-3.0, 18.0)).with_max_slope(45.0))
        .with_density(DensityGate::grass())
        .with_seed(1);

    c.bench_function("scatter_grass_2k", |b| {
        b.iter(|| {
            let mut engine = PlacementEngine::new(SurfaceSampler::new(&grid));
            engine.place_seeded(black_box(&species)).expect("placement")
        });
    });
}

fn bench_scatter_separated(c: &mut Criterion) {
    let hf = terrain(128);
    let grid = MeshGrid::build(hf.as_mesh().expect("mesh view"), &GridConfig::default()).expect("grid");
    let species = SpeciesConfig::new("trees", 500)
        .with_min_distance(2.5)
        .with_seed(2);

    c.bench_function("scatter_separated_500", |b| {
        b.iter(|| {
            let mut engine = PlacementEngine::new(SurfaceSampler::new(&grid));
            engine.place_seeded(black_box(&species)).expect("placement")
        });
    });
}

criterion_group!(
    benches,
    bench_grid_build_200,
    bench_height_query,
    bench_density_field,
    bench_scatter_grass,
    bench_scatter_separated,
);
criterion_main!(benches);
