mod host;
mod scene_config;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::Vec3;
use lakeside_assets::Heightmap;
use lakeside_components::{GuiText, TerrainMesh, TerrainSettings, WaterMesh, generate};
use lakeside_engine::render::RecordingBackend;
use lakeside_physics::{Physics, StaticMeshWorld};
use tracing_subscriber::EnvFilter;

use host::{Host, HostState, apply_heightmap, demo_assets, rolling_hills};
use scene_config::SceneConfig;

#[derive(Parser)]
#[command(name = "lakeside-cli", about = "Headless host for the lakeside engine")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print engine version and crate info
    Info,
    /// Run the demo scene through the frame loop
    Run {
        /// Number of frames to render
        #[arg(short, long, default_value = "60")]
        frames: u64,
        /// Seconds per frame
        #[arg(long, default_value = "0.016")]
        dt: f32,
        /// Scene configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Swap in a larger heightmap, generated on a worker thread, after this frame
        #[arg(long)]
        reload_at: Option<u64>,
    },
    /// Generate a terrain mesh from a heightmap image and describe it
    Terrain {
        /// Heightmap image; the red channel is used
        #[arg(long)]
        heightmap: PathBuf,
        #[arg(long, default_value = "256")]
        width: f32,
        #[arg(long, default_value = "256")]
        height: f32,
        #[arg(long, default_value = "0.1")]
        strength: f32,
    },
    /// Cast a ray straight down onto terrain and report the hit
    Probe {
        #[arg(long)]
        x: f32,
        #[arg(long)]
        z: f32,
        /// Heightmap image; a generated one is used when omitted
        #[arg(long)]
        heightmap: Option<PathBuf>,
        #[arg(long, default_value = "256")]
        width: f32,
        #[arg(long, default_value = "256")]
        height: f32,
        #[arg(long, default_value = "0.1")]
        strength: f32,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match cli.command {
        Commands::Info => {
            println!("lakeside-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", lakeside_common::crate_info());
            println!("assets: {}", lakeside_assets::crate_info());
            println!("physics: {}", lakeside_physics::crate_info());
            println!("dispatch: {}", lakeside_dispatch::crate_info());
            println!("engine: {}", lakeside_engine::crate_info());
            println!("components: {}", lakeside_components::crate_info());
        }
        Commands::Run {
            frames,
            dt,
            config,
            reload_at,
        } => {
            let config = match config {
                Some(path) => SceneConfig::load(&path)
                    .with_context(|| format!("loading scene config {}", path.display()))?,
                None => SceneConfig::default(),
            };
            let backend = RecordingBackend::new();
            let log = backend.log();
            let mut host = Host::new(Box::new(backend), &config);
            let mut assets = demo_assets(&config);
            let objects = host.build_demo(&config, &mut assets);
            if !assets.missing().is_empty() {
                println!("Missing assets: {:?}", assets.missing());
            }

            let mut worker = None;
            for frame in 0..frames {
                if reload_at == Some(frame) {
                    let handle = host.dispatch_handle();
                    let terrain = objects.terrain;
                    worker = Some(std::thread::spawn(move || {
                        let map = rolling_hills(128, 128);
                        handle.enqueue(move |state: &mut HostState| {
                            if apply_heightmap(state, terrain, map) {
                                tracing::info!("terrain heightmap replaced");
                            }
                        });
                    }));
                }
                let stats = host.tick(dt);
                tracing::info!(%stats, "frame");
                log.clear();
            }
            if let Some(worker) = worker {
                worker
                    .join()
                    .map_err(|_| anyhow::anyhow!("heightmap worker panicked"))?;
                host.tick(dt);
            }

            let state = host.state();
            let terrain = state
                .scene
                .component::<TerrainMesh>(objects.terrain)
                .context("terrain missing from scene")?;
            println!(
                "Rendered {} frames: objects={}, terrain triangles={}, collision meshes={}",
                host.frame(),
                state.scene.len(),
                terrain.geometry().triangle_count(),
                state.physics.mesh_count()
            );
            if let Some(water) = state.scene.component::<WaterMesh>(objects.water) {
                println!("Water: move factor={:.4}", water.move_factor());
            }
            if let Some(camera) = state.scene.transform(objects.camera) {
                println!("Camera: position={}", camera.position);
            }
            if let Some(hud) = state.scene.component::<GuiText>(objects.hud) {
                println!("HUD: \"{}\" ({} lines)", hud.text(), hud.line_count());
            }
        }
        Commands::Terrain {
            heightmap,
            width,
            height,
            strength,
        } => {
            let map = Heightmap::load(&heightmap)
                .with_context(|| format!("reading heightmap {}", heightmap.display()))?;
            let geometry = generate(&map, width, height, strength);
            let (min, max) = geometry
                .collision
                .vertices
                .iter()
                .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
                    (lo.min(v.y), hi.max(v.y))
                });
            println!("Heightmap: {}x{}", map.width(), map.height());
            println!(
                "Mesh: vertices={}, triangles={}",
                geometry.mesh.vertices.len(),
                geometry.triangle_count()
            );
            if !geometry.is_empty() {
                println!("Elevation: min={min:.2}, max={max:.2}");
            }
        }
        Commands::Probe {
            x,
            z,
            heightmap,
            width,
            height,
            strength,
        } => {
            let map = match heightmap {
                Some(path) => Heightmap::load(&path)
                    .with_context(|| format!("reading heightmap {}", path.display()))?,
                None => rolling_hills(64, 64),
            };
            let settings = TerrainSettings {
                width,
                height,
                strength,
                ..TerrainSettings::default()
            };
            let geometry = generate(&map, settings.width, settings.height, settings.strength);
            let mut physics = StaticMeshWorld::new();
            physics.submit_static_mesh(geometry.collision);

            let ceiling = 255.0 * strength.abs() + 1.0;
            match physics.raycast(Vec3::new(x, ceiling, z), Vec3::NEG_Y, 2.0 * ceiling) {
                Some(hit) => println!(
                    "Hit at ({:.3}, {:.3}, {:.3}), distance {:.3}",
                    hit.location.x, hit.location.y, hit.location.z, hit.distance
                ),
                None => println!("No terrain under ({x}, {z})"),
            }
        }
    }

    Ok(())
}
