//! Scatter vegetation over a generated terrain and export the instances.
//!
//! Usage:
//!     scatter [OPTIONS]
//!
//! Options:
//!     --size <SIZE>       Terrain side length in world units (default: 200)
//!     --cells <N>         Terrain quads per side (default: 200)
//!     --seed <SEED>       Scene seed, overrides the config (default: config seed)
//!     --config <PATH>     Scatter config JSON (default: built-in presets)
//!     --out <PATH>        Instance export JSON (default: instances.json)
//!     --write-config <PATH>  Write the effective config and exit
//!     -h, --help          Show this help message

use std::env;
use std::path::PathBuf;
use std::time::Instant;

use sylva::core::logging;
use sylva::grid::MeshGrid;
use sylva::mesh::VertexLayout;
use sylva::scene::{ScatterConfig, ScatterPipeline};
use sylva::terrain::TerrainGenerator;

fn print_help() {
    eprintln!("scatter - Procedural vegetation placement");
    eprintln!();
    eprintln!("Usage: scatter [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("    --size <SIZE>          Terrain side length in world units (default: 200)");
    eprintln!("    --cells <N>            Terrain quads per side (default: 200)");
    eprintln!("    --seed <SEED>          Scene seed, overrides the config");
    eprintln!("    --config <PATH>        Scatter config JSON (default: built-in presets)");
    eprintln!("    --out <PATH>           Instance export JSON (default: instances.json)");
    eprintln!("    --write-config <PATH>  Write the effective config and exit");
    eprintln!("    -h, --help             Show this help message");
    eprintln!();
    eprintln!("Example:");
    eprintln!("    scatter --seed 42 --out forest.json");
    eprintln!("    RUST_LOG=debug scatter --config meadow.json --size 100 --cells 128");
}

#[derive(Debug)]
struct Args {
    size: f32,
    cells: u32,
    seed: Option<u64>,
    config: Option<PathBuf>,
    out: PathBuf,
    write_config: Option<PathBuf>,
}

fn next_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i).map(String::as_str).ok_or_else(|| format!("Missing value for {}", flag))
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut parsed = Args {
        size: 200.0,
        cells: 200,
        seed: None,
        config: None,
        out: PathBuf::from("instances.json"),
        write_config: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "--size" => {
                let v = next_value(&args, &mut i, "--size")?;
                parsed.size = v.parse().map_err(|_| format!("Invalid size: {}", v))?;
            }
            "--cells" => {
                let v = next_value(&args, &mut i, "--cells")?;
                parsed.cells = v.parse().map_err(|_| format!("Invalid cells: {}", v))?;
            }
            "--seed" => {
                let v = next_value(&args, &mut i, "--seed")?;
                parsed.seed = Some(v.parse().map_err(|_| format!("Invalid seed: {}", v))?);
            }
            "--config" => {
                parsed.config = Some(PathBuf::from(next_value(&args, &mut i, "--config")?));
            }
            "--out" => {
                parsed.out = PathBuf::from(next_value(&args, &mut i, "--out")?);
            }
            "--write-config" => {
                parsed.write_config = Some(PathBuf::from(next_value(&args, &mut i, "--write-config")?));
            }
            other => return Err(format!("Unknown option: {}", other)),
        }
        i += 1;
    }

    Ok(parsed)
}

fn main() {
    logging::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_help();
            std::process::exit(1);
        }
    };

    let mut config = match &args.config {
        Some(path) => ScatterConfig::load(path).expect("Failed to load scatter config"),
        None => ScatterConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
        config.terrain.seed = seed as u32;
    }

    if let Some(path) = &args.write_config {
        config.save(path).expect("Failed to write config");
        println!("Wrote config to {}", path.display());
        return;
    }

    println!("Vegetation Scatter");
    println!("==================");
    println!("Terrain: {}x{} units, {} cells per side", args.size, args.size, args.cells);
    println!("Seed: {}", config.seed);
    println!("Species: {}, clusters: {}", config.species.len(), config.clusters.len());
    println!();

    let start = Instant::now();
    let generator = TerrainGenerator::new(config.terrain.clone()).expect("Invalid terrain parameters");
    let terrain = generator
        .build_mesh(args.size, args.cells, VertexLayout::COLORED)
        .expect("Failed to build terrain mesh");
    let mesh = terrain.as_mesh().expect("Terrain mesh is malformed");
    let grid = MeshGrid::build(mesh, &config.grid).expect("Failed to build mesh grid");
    println!("Terrain ready in {:.2}s", start.elapsed().as_secs_f64());

    let pipeline = ScatterPipeline::new(&config).expect("Invalid scatter config");
    let start = Instant::now();
    let output = pipeline.run(&grid, None).expect("Placement failed");
    let elapsed = start.elapsed();

    println!();
    println!("{:<20} {:>10} {:>10} {:>10}", "species", "placed", "requested", "attempts");
    for report in &output.reports {
        println!(
            "{:<20} {:>10} {:>10} {:>10}",
            report.species, report.placed, report.requested, report.attempts
        );
    }
    println!();
    println!(
        "Placed {} of {} instances in {:.2}s",
        output.placed(),
        output.requested(),
        elapsed.as_secs_f64()
    );

    output.save_json(&args.out).expect("Failed to write instance export");
    println!("Wrote {}", args.out.display());
}
