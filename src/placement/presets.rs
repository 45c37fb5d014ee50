//! Ready-made species tables for meadows, leaf litter, scattered trees and
//! biome forests.

use glam::Vec2;

use crate::density::{BiomeMap, DensityGate};
use crate::math::Band;
use crate::surface::{MaterialChannel, MaterialRule, SurfaceRules};
use super::config::{ClusterConfig, ClusterMember, ScatterRegion, SpeciesConfig, Variant};
use super::orient::{Orientation, Upright};

/// Colour channel holding the vegetation weight.
const VEGETATION: MaterialChannel = MaterialChannel::Color(2);

/// Low, gentle ground between the waterline and the foothills.
pub fn grass_surface() -> SurfaceRules {
    SurfaceRules::any()
        .with_height(Band::new(-3.0, 18.0))
        .with_max_slope(45.0)
}

/// Ground forests grow on.
pub fn forest_surface() -> SurfaceRules {
    SurfaceRules::any().with_height(Band::new(2.0, 35.0))
}

/// Grass blades in a square of half-width 50 around the origin, leaning 80%
/// into the slope. Blades stay out of the position registry.
pub fn meadow_grass() -> SpeciesConfig {
    SpeciesConfig::new("grass", 20_000)
        .with_variant(Variant::new("grass/blade.png"))
        .with_region(ScatterRegion::Rect { min: Vec2::splat(-50.0), max: Vec2::splat(50.0) })
        .with_surface(grass_surface())
        .with_density(DensityGate::grass())
        .with_scale(Band::new(0.7, 1.3))
        .with_orientation(Orientation::default().aligned(0.8).with_tilt(5.0))
        .without_separation()
        .with_seed(1)
}

/// Leaves lying flat on the ground, lifted slightly against z-fighting.
pub fn leaf_litter() -> SpeciesConfig {
    SpeciesConfig::new("leaves", 5_000)
        .with_variant(Variant::new("grass/leaf.png"))
        .with_region(ScatterRegion::Rect { min: Vec2::splat(-50.0), max: Vec2::splat(50.0) })
        .with_surface(grass_surface())
        .with_density(DensityGate::grass())
        .with_scale(Band::new(0.7, 1.3))
        .with_orientation(
            Orientation::default()
                .aligned(1.0)
                .with_upright(Upright::LyingFlat)
                .with_tilt(10.0)
                .with_lift(0.02),
        )
        .without_separation()
        .with_seed(2)
}

/// Single trees on every fifth terrain vertex, thinned by a sparse noise field.
///
/// Ground above 2 gets pines. Lower ground with a vegetation weight under 0.5
/// gets dead trees, the rest is 60% oak and 40% pine.
pub fn vertex_trees(seed: u32) -> SpeciesConfig {
    let lush = MaterialRule { channel: VEGETATION, band: Band::above(0.5) };
    let bare = MaterialRule { channel: VEGETATION, band: Band::below(0.5) };
    SpeciesConfig::new("trees", 100_000)
        .with_variant(Variant::new("trees/pine.glb").with_height(Band::above(2.0)))
        .with_variant(Variant::new("trees/dead.glb").with_height(Band::below(2.0)).with_material(bare))
        .with_variant(
            Variant::new("trees/oak.glb")
                .with_height(Band::below(2.0))
                .with_material(lush)
                .with_weight(0.6),
        )
        .with_variant(
            Variant::new("trees/pine.glb")
                .with_height(Band::below(2.0))
                .with_material(lush)
                .with_weight(0.4),
        )
        .with_region(ScatterRegion::GridScan { step: 5 })
        .with_surface(
            SurfaceRules::any()
                .with_height(Band::above(-2.5))
                .with_min_normal_y(0.7)
                .with_material(VEGETATION, Band::above(0.3)),
        )
        .with_density(DensityGate::trees(seed))
        .with_min_distance(2.5)
        .with_separation_group(TREE_GROUP)
        .with_scale(Band::new(0.8, 1.2))
        .with_seed(u64::from(seed))
}

/// Registry group shared by every forest cluster member.
pub const FOREST_GROUP: &str = "forest";

/// Registry group of the vertex-scan trees.
pub const TREE_GROUP: &str = "trees";

fn forest_species(name: &str, assets: &[&str], base_scale: f32, min_distance: f32) -> SpeciesConfig {
    let species = assets
        .iter()
        .fold(SpeciesConfig::new(name, 0), |s, asset| s.with_variant(Variant::new(format!("forest/{}", asset))));
    species
        .with_surface(forest_surface())
        .with_scale(Band::new(0.8, 1.2))
        .with_base_scale(base_scale)
        .with_min_distance(min_distance)
        .with_separation_group(FOREST_GROUP)
        .with_orientation(Orientation::default().with_upright(Upright::NegZUp))
}

/// One forest asset with its own scale and spacing.
fn forest_member(name: &str, asset: &str, base_scale: f32, min_distance: f32, count: (u32, u32)) -> ClusterMember {
    ClusterMember::new(forest_species(name, &[asset], base_scale, min_distance), count.0, count.1)
}

/// Birch, pine, oak and scrub clusters partitioned by `BiomeMap::forest()`.
///
/// Mixed undergrowth is split into one member per asset, each drawing half
/// (or a quarter, for scrub) of the mixed count.
pub fn forest_biomes() -> Vec<ClusterConfig> {
    let biomes = BiomeMap::forest();
    let cluster = |name: &str, groups: usize| {
        let mut config = ClusterConfig::new(name, groups).with_surface(forest_surface());
        config.biome = biomes.gate(name);
        config
    };

    vec![
        cluster("birch", 10)
            .with_member(ClusterMember::new(
                forest_species("birch_tree", &["Birch_Tree_1.glb", "Birch_Tree_2.glb"], 0.0025, 0.3),
                25,
                34,
            ))
            .with_member(forest_member("young_birch", "Young_Birch_Tree_1.glb", 0.0015, 0.2, (25, 25)))
            .with_member(forest_member("birch_blackberry", "Blackberry_Bush_1a.glb", 0.0015, 0.25, (30, 39)).with_spread(1.5))
            .with_member(forest_member("birch_fern", "Fern_1a.glb", 0.002, 0.2, (30, 39)).with_spread(1.5)),
        cluster("pine", 10)
            .with_member(ClusterMember::new(
                forest_species("pine_tree", &["Pine_Tree_1.glb", "Pine_Tree_2.glb", "Fir_Tree_1.glb"], 0.0025, 0.25),
                35,
                44,
            ))
            .with_member(forest_member("young_fir", "Young_Fir_Tree_1.glb", 0.0015, 0.2, (25, 25)))
            .with_member(forest_member("pine_rock", "Rock_1.glb", 0.005, 0.4, (25, 34)))
            .with_member(forest_member("fly_agaric", "Fly_Agaric_Group_1.glb", 0.002, 0.1, (25, 34))),
        cluster("oak", 10)
            .with_member(forest_member("oak_tree", "Oak_Tree_1.glb", 0.0028, 0.6, (18, 22)))
            .with_member(
                ClusterMember::new(
                    forest_species("oak_floor", &["Stinging_Nettle_1.glb", "Forest_Grass_1.glb"], 0.002, 0.15),
                    90,
                    119,
                )
                .with_spread(1.3),
            ),
        cluster("scrub", 10)
            .with_member(forest_member("scrub_fern", "Fern_1a.glb", 0.002, 0.2, (30, 42)).with_spread(2.5))
            .with_member(forest_member("scrub_blackberry", "Blackberry_Bush_1a.glb", 0.0015, 0.2, (30, 42)).with_spread(2.5))
            .with_member(forest_member("scrub_rock", "Rock_2.glb", 0.004, 0.5, (30, 42)).with_spread(2.5))
            .with_member(forest_member("scrub_grass", "Forest_Grass_1.glb", 0.002, 0.2, (30, 42)).with_spread(2.5)),
    ]
}
