use std::path::PathBuf;
use std::process::ExitCode;

use bevy::color::Color;
use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use clap::{Parser, Subcommand};
use rand::Rng;
use tracing_subscriber::EnvFilter;

use voicebounce::math::{Point, Real};
use voicebounce::{
    BodyId, ContainerBounds, FreePlayPlugin, FrameQueue, RenderSurface, ScriptedInput,
    SimulationConfig, SimulationLoop,
};

/// Voice-reactive bouncing balls
#[derive(Parser)]
#[command(name = "voicebounce", version, about)]
struct Cli {
    /// TOML file overriding simulation defaults
    #[arg(short, long, env = "VOICEBOUNCE_CONFIG")]
    config: Option<PathBuf>,

    /// Seed for ball placement and bounce jitter (random when omitted)
    #[arg(long, env = "VOICEBOUNCE_SEED")]
    seed: Option<u64>,

    /// Number of balls
    #[arg(long)]
    balls: Option<usize>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the simulation without a window against a constant scripted volume
    Headless {
        /// Frames to simulate
        #[arg(short, long, default_value = "600")]
        frames: u64,

        /// Raw magnitude (0-255) reported for every frequency bin
        #[arg(long, default_value = "60")]
        volume: u8,

        /// Container width
        #[arg(long, default_value = "800")]
        width: Real,

        /// Container height
        #[arg(long, default_value = "600")]
        height: Real,
    },
}

/// Keeps the last published height of each body.
struct HeadlessSurface {
    bounds: ContainerBounds,
    heights: Vec<Real>,
}

impl RenderSurface for HeadlessSurface {
    fn bounds(&self) -> ContainerBounds {
        self.bounds
    }

    fn publish(&mut self, id: BodyId, position: Point, _radius: Real, _color: Color) {
        if self.heights.len() <= id.0 {
            self.heights.resize(id.0 + 1, 0.0);
        }
        self.heights[id.0] = position.y;
    }

    fn clear(&mut self) {
        self.heights.clear();
    }
}

fn load_config(cli: &Cli) -> voicebounce::Result<SimulationConfig> {
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::from_toml_file(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(balls) = cli.balls {
        config = config.with_ball_count(balls);
    }
    config.validate()?;
    Ok(config)
}

fn level_for(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn run_headless(
    config: SimulationConfig,
    seed: u64,
    frames: u64,
    volume: u8,
    bounds: ContainerBounds,
) -> voicebounce::Result<()> {
    let input = ScriptedInput::constant(volume);
    let mut sim = SimulationLoop::new(config, input, FrameQueue::new(), seed)?;
    let mut surface = HeadlessSurface {
        bounds,
        heights: Vec::new(),
    };

    sim.enter_free_play(&mut surface);
    sim.start_listening()?;

    for frame in 0..frames {
        let Some(handle) = sim.scheduler_mut().take_due() else {
            break;
        };
        let Some(report) = sim.on_frame(handle, &mut surface) else {
            continue;
        };
        if frame % 60 == 0 {
            let mean_height =
                surface.heights.iter().sum::<Real>() / surface.heights.len().max(1) as Real;
            tracing::info!(
                frame,
                raw = report.raw_volume,
                normalized = report.normalized_volume,
                impulse = report.impulse,
                feedback = ?report.feedback,
                mean_height,
                "headless frame"
            );
        }
    }

    sim.stop_listening(&mut surface);
    sim.exit_free_play(&mut surface);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("voicebounce: {e}");
            return ExitCode::FAILURE;
        }
    };
    let seed = cli.seed.unwrap_or_else(|| rand::rng().random());
    let level = level_for(cli.verbose);

    match cli.command {
        Some(Command::Headless {
            frames,
            volume,
            width,
            height,
        }) => {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new(level.as_str().to_lowercase()))
                .init();
            tracing::info!(seed, frames, volume, "running headless");

            match run_headless(config, seed, frames, volume, ContainerBounds::new(width, height)) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    tracing::error!("fatal: {e}");
                    ExitCode::FAILURE
                }
            }
        }
        None => {
            let plugin = match FreePlayPlugin::new(config, seed) {
                Ok(plugin) => plugin,
                Err(e) => {
                    eprintln!("voicebounce: {e}");
                    return ExitCode::FAILURE;
                }
            };

            App::new()
                .add_plugins(
                    DefaultPlugins
                        .set(WindowPlugin {
                            primary_window: Some(Window {
                                title: "Voice Bounce".into(),
                                ..default()
                            }),
                            ..default()
                        })
                        .set(LogPlugin {
                            level,
                            filter: "wgpu=error,naga=warn".to_string(),
                            ..default()
                        }),
                )
                .add_plugins(plugin)
                .run();
            ExitCode::SUCCESS
        }
    }
}
