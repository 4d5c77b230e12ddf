use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use umbra_kernel::{ManualClock, Scene, SceneConfig};
use umbra_render::{DebugTextRenderer, OrbitCamera};
use umbra_runtime::{FrameLoop, FrameScheduler};
use umbra_tools::SceneInspector;

#[derive(Parser)]
#[command(name = "umbra-cli", about = "Headless tool for the umbra shadow demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print the scene state at one point in time
    Sample {
        /// Elapsed time in seconds
        #[arg(short, long, default_value = "0")]
        time: f32,
        /// Scene config (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Run the frame loop headless with a fixed time step
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "10")]
        frames: u64,
        /// Seconds between frames
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f32,
        /// Scene config (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print only the final inspector summary
        #[arg(short, long)]
        quiet: bool,
    },
    /// Print the scene config as JSON (the default one unless --config is given)
    Config {
        /// Scene config (JSON) to validate and print
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Counts re-arm requests; the headless loop drives frames itself.
#[derive(Default)]
struct CountingScheduler {
    scheduled: u64,
}

impl FrameScheduler for CountingScheduler {
    fn schedule_next(&mut self) {
        self.scheduled += 1;
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<SceneConfig> {
    match path {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("loading scene config {}", path.display())),
        None => Ok(SceneConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("umbra-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("render: {}", umbra_render::crate_info());
            let scene = Scene::default();
            println!(
                "scene: {} lights, {} materials, plane y={}",
                scene.lights.len(),
                scene.materials().len(),
                scene.plane_y()
            );
        }
        Commands::Sample { time, config } => {
            if !time.is_finite() {
                bail!("time must be finite, got {time}");
            }
            let config = load_config(config.as_ref())?;
            let mut scene = Scene::from_config(&config);
            scene.advance(time);
            print!("{}", SceneInspector::summary(&scene, time));
        }
        Commands::Simulate {
            frames,
            dt,
            config,
            quiet,
        } => {
            if !(dt.is_finite() && dt >= 0.0) {
                bail!("dt must be a non-negative number, got {dt}");
            }
            let config = load_config(config.as_ref())?;
            let mut scene = Scene::from_config(&config);
            let mut controls = OrbitCamera::from_config(&config.camera, 16.0 / 9.0);
            let mut renderer = DebugTextRenderer::new();
            let mut scheduler = CountingScheduler::default();
            let mut frame_loop = FrameLoop::new(ManualClock::new());

            tracing::info!(frames, dt, "simulating");
            let mut elapsed = 0.0;
            for _ in 0..frames {
                let report =
                    frame_loop.tick(&mut scene, &mut controls, &mut renderer, &mut scheduler)?;
                if !quiet {
                    print!("{}", report.output);
                }
                elapsed = report.elapsed_time;
                if dt > 0.0 {
                    frame_loop.clock_mut().advance(dt);
                }
            }
            print!("{}", SceneInspector::summary(&scene, elapsed));
            println!(
                "frames={} scheduled={}",
                frame_loop.frames(),
                scheduler.scheduled
            );
        }
        Commands::Config { config } => {
            let config = load_config(config.as_ref())?;
            println!("{}", config.to_json()?);
        }
    }

    Ok(())
}
