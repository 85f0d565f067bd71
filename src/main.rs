use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use lode::{EditOutcome, Engine, EngineConfig, ImportLight, TerrainType};

#[derive(Parser, Debug)]
#[command(name = "lode", version, about = "Voxel world engine tools")]
struct Cli {
    /// Engine config (TOML); defaults apply to anything it omits
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Generator parameters (TOML), overriding the config's [generator] table
    #[arg(long, global = true)]
    generator: Option<PathBuf>,
    #[arg(long, global = true)]
    width: Option<usize>,
    #[arg(long, global = true)]
    height: Option<usize>,
    #[arg(long, global = true)]
    depth: Option<usize>,
    #[arg(long, global = true)]
    chunk_size: Option<usize>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug, Clone)]
struct WorldArgs {
    #[arg(long, default_value_t = 1)]
    seed: i32,
    /// noise, sphere or flat
    #[arg(long, default_value = "noise", value_parser = parse_terrain)]
    terrain: TerrainType,
    #[arg(long)]
    skip_lighting: bool,
    /// Simulation steps to run after generating
    #[arg(long, default_value_t = 0)]
    simulate: u32,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a world and print statistics
    Generate(WorldArgs),
    /// Generate a world and print per-chunk face counts
    Mesh {
        #[command(flatten)]
        world: WorldArgs,
        /// Only this chunk, as cx,cy,cz
        #[arg(long, value_parser = parse_triple)]
        chunk: Option<(i32, i32, i32)>,
    },
    /// Generate a world and write its compressed snapshot
    Export {
        #[command(flatten)]
        world: WorldArgs,
        #[arg(long)]
        out: PathBuf,
    },
    /// Load a snapshot and print statistics
    Import {
        #[arg(long)]
        input: PathBuf,
        /// Recompute light instead of trusting the snapshot
        #[arg(long)]
        relight: bool,
    },
    /// Apply one edit to a generated world and print the remesh plan
    Edit {
        #[command(flatten)]
        world: WorldArgs,
        /// Target voxel as x,y,z
        #[arg(long, value_parser = parse_triple)]
        at: (i32, i32, i32),
        /// Material id; 0 removes
        #[arg(long, default_value_t = 1)]
        ty: u8,
        /// Albedo as r,g,b
        #[arg(long, default_value = "255,255,255", value_parser = parse_rgb)]
        rgb: (u8, u8, u8),
    },
}

fn parse_terrain(s: &str) -> Result<TerrainType, String> {
    match s.to_ascii_lowercase().as_str() {
        "noise" | "sphere" | "flat" => Ok(TerrainType::from_name(s)),
        other => Err(format!("unknown terrain '{other}'")),
    }
}

fn parse_triple(s: &str) -> Result<(i32, i32, i32), String> {
    let v: Vec<i32> = s.split(',').map(|p| p.trim().parse::<i32>().map_err(|e| e.to_string())).collect::<Result<_, _>>()?;
    match v.as_slice() {
        [a, b, c] => Ok((*a, *b, *c)),
        _ => Err(format!("expected three comma-separated integers, got '{s}'")),
    }
}

fn parse_rgb(s: &str) -> Result<(u8, u8, u8), String> {
    let (r, g, b) = parse_triple(s)?;
    let c = |v: i32| u8::try_from(v).map_err(|_| format!("color component {v} out of range"));
    Ok((c(r)?, c(g)?, c(b)?))
}

fn load_config(cli: &Cli) -> Result<EngineConfig, Box<dyn Error>> {
    let mut cfg = match &cli.config {
        Some(p) => EngineConfig::from_path(p)?,
        None => EngineConfig::default(),
    };
    if let Some(p) = &cli.generator {
        cfg.generator = lode_world::worldgen::load_params_from_path(p)?;
    }
    cfg.width = cli.width.unwrap_or(cfg.width);
    cfg.height = cli.height.unwrap_or(cfg.height);
    cfg.depth = cli.depth.unwrap_or(cfg.depth);
    cfg.chunk_size = cli.chunk_size.unwrap_or(cfg.chunk_size);
    Ok(cfg)
}

fn build_world(cfg: EngineConfig, w: &WorldArgs) -> Result<Engine, Box<dyn Error>> {
    let mut engine = Engine::load(cfg).wait()?;
    let stats = engine.generate(w.seed, w.terrain, w.skip_lighting);
    log::info!("generated terrain={:?} seed={} solid={} ms={}", w.terrain, w.seed, stats.solid, stats.ms);
    if w.simulate > 0 {
        let moved = engine.simulate(w.simulate);
        log::info!("simulated steps={} moved={}", w.simulate, moved);
    }
    Ok(engine)
}

fn print_summary(engine: &Engine) {
    let d = engine.dims();
    let solid = engine.store().raw().chunks_exact(lode_store::field::STRIDE).filter(|v| v[0] != 0).count();
    let max_h = engine.heightmap().as_slice().iter().copied().max().unwrap_or(0);
    let (sx, sy, sz) = engine.spawn_point();
    println!("world {}x{}x{} chunk={}", d.width, d.height, d.depth, engine.chunk_size());
    println!("solid voxels: {solid}");
    println!("max height: {max_h}");
    println!("spawn: ({sx}, {sy}, {sz})");
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut cfg = load_config(&cli)?;
    match cli.cmd {
        Command::Generate(w) => {
            let engine = build_world(cfg, &w)?;
            print_summary(&engine);
        }
        Command::Mesh { world, chunk } => {
            let engine = build_world(cfg, &world)?;
            let meshes = match chunk {
                Some((cx, cy, cz)) => vec![engine.mesh(cx, cy, cz)?],
                None => engine.mesh_all()?,
            };
            let mut total = 0;
            for m in &meshes {
                if m.is_empty() {
                    continue;
                }
                total += m.quad_count();
                println!(
                    "chunk ({}, {}, {}) quads={} verts={} radius={:.2}",
                    m.coord.cx,
                    m.coord.cy,
                    m.coord.cz,
                    m.quad_count(),
                    m.vertex_count(),
                    m.bounds.radius
                );
            }
            println!("total quads: {total}");
        }
        Command::Export { world, out } => {
            let mut engine = build_world(cfg, &world)?;
            let bytes = engine.export()?;
            fs::write(&out, &bytes)?;
            println!("wrote {} bytes to {}", bytes.len(), out.display());
        }
        Command::Import { input, relight } => {
            if relight {
                cfg.import_light = ImportLight::Relight;
            }
            let bytes = fs::read(&input)?;
            let mut engine = Engine::load(cfg).wait()?;
            engine.import(&bytes)?;
            print_summary(&engine);
        }
        Command::Edit { world, at: (x, y, z), ty, rgb: (r, g, b) } => {
            let mut engine = build_world(cfg, &world)?;
            match engine.update(x, y, z, ty, r, g, b)? {
                EditOutcome::Ignored => println!("({x}, {y}, {z}) is on the world shell; nothing changed"),
                EditOutcome::Applied { prior, light } => {
                    println!(
                        "replaced type {} at ({x}, {y}, {z}); light lit={} darkened={}",
                        prior.ty, light.lit, light.darkened
                    );
                    println!("column height: {}", engine.height_at(x, z)?);
                    for c in engine.affected_chunks(x, y, z)? {
                        println!("remesh ({}, {}, {})", c.cx, c.cy, c.cz);
                    }
                }
            }
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
