use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::Vec3;
use tracing_subscriber::EnvFilter;
use terrastream_assets::{FsTileSource, heightmap};
use terrastream_render::{DebugTextRenderer, GridRenderer};
use terrastream_stream::{GridConfig, Heightfield, MissingTilePolicy, TerrainGrid};

#[derive(Parser)]
#[command(name = "terrastream-cli", about = "CLI tool for terrastream tile sets")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct GridArgs {
    /// Directory containing tile-set subdirectories
    #[arg(long)]
    root: PathBuf,
    /// YAML or JSON grid config; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Override the tile set named in the config
    #[arg(long)]
    tile_set: Option<String>,
    /// Substitute blank tiles instead of keeping stale content
    #[arg(long)]
    blank_missing: bool,
}

impl GridArgs {
    fn load(&self) -> anyhow::Result<TerrainGrid<Heightfield, FsTileSource>> {
        let mut config = match &self.config {
            Some(path) => GridConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => GridConfig::default(),
        };
        if let Some(tile_set) = &self.tile_set {
            config.tile_set = tile_set.clone();
        }
        if self.blank_missing {
            config.missing_tile = MissingTilePolicy::Blank;
        }
        let grid = TerrainGrid::new(config, FsTileSource::new(&self.root))?;
        Ok(grid)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Decode a raw heightmap and print its statistics
    Inspect {
        /// Path to a .raw heightmap
        file: PathBuf,
        /// Samples per edge
        #[arg(short, long, default_value = "513")]
        resolution: usize,
    },
    /// Drive the grid with a straight viewer path
    Walk {
        #[command(flatten)]
        grid: GridArgs,
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "10")]
        steps: u32,
        /// Viewer x movement per tick
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        dx: f32,
        /// Viewer z movement per tick
        #[arg(long, default_value = "128", allow_hyphen_values = true)]
        dz: f32,
    },
    /// Print the slot layout of a freshly built grid
    Trace {
        #[command(flatten)]
        grid: GridArgs,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("terrastream-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("assets: {}", terrastream_assets::crate_info());
            println!("stream: {}", terrastream_stream::crate_info());
            println!("render: {}", terrastream_render::crate_info());
            let config = GridConfig::default();
            println!(
                "defaults: tile_set={} cell={} visible>={} -> {}x{} cells, resolution={}",
                config.tile_set,
                config.cell_size,
                config.min_visible_size,
                config.cells_wide(),
                config.cells_wide(),
                config.heightmap_resolution
            );
        }
        Commands::Inspect { file, resolution } => {
            let bytes =
                std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            let map = heightmap::decode(&bytes, resolution)?;
            let (lo, hi) = map.min_max().unwrap_or((0.0, 0.0));
            println!(
                "{}: {resolution}x{resolution}, {} bytes (expected {})",
                file.display(),
                bytes.len(),
                heightmap::byte_len(resolution)
            );
            println!("min={lo:.5} max={hi:.5} mean={:.5}", map.mean());
        }
        Commands::Walk {
            grid,
            steps,
            dx,
            dz,
        } => {
            let mut grid = grid.load()?;
            let mut viewer = grid.viewer();
            println!("Walking {steps} ticks, delta=({dx}, {dz}) per tick");

            for i in 0..steps {
                viewer += Vec3::new(dx, 0.0, dz);
                let report = grid.tick(viewer)?;
                viewer = report.viewer;
                if !report.is_idle() {
                    println!(
                        "tick {i}: moves={:?} skipped={:?} reloaded={} degraded={} viewer=({:.1}, {:.1})",
                        report.moves,
                        report.skipped,
                        report.reloaded.len(),
                        report.degraded.len(),
                        viewer.x,
                        viewer.z
                    );
                }
            }

            let stats = grid.stats();
            println!(
                "Done: ticks={} moves={} skipped={} reloads={} degraded={} last_tick={:?}",
                stats.ticks,
                stats.moves,
                stats.skipped,
                stats.reloads,
                stats.degraded,
                stats.last_tick_time
            );
            print!("{}", DebugTextRenderer::new().render(&grid));
        }
        Commands::Trace { grid } => {
            let grid = grid.load()?;
            print!("{}", DebugTextRenderer::with_positions().render(&grid));
        }
    }

    Ok(())
}
