//! Grows a fractal headlessly and reports how it developed.
//!
//! Run with `RUST_LOG=info` to follow the growth tick by tick, or
//! `RUST_LOG=flow_fractal=trace` to see every single spawn.

use std::time::Duration;

use clap::Parser;
use flow_fractal::{
    flow::{self, RunSettings},
    fractal::{config::FractalConfig, flow::FractalFlow},
    resources::Assets,
};

#[derive(Parser)]
#[command(name = "fractal", about = "Grows a self-spawning fractal")]
struct Args {
    /// Levels below the root.
    #[arg(short = 'd', long, default_value_t = 4)]
    max_depth: u32,

    /// Size of a child relative to its parent, in (0, 1].
    #[arg(long, default_value_t = 0.5)]
    child_scale: f32,

    /// Chance of growing a child in each direction, in [0, 1].
    #[arg(short = 'p', long, default_value_t = 0.7)]
    spawn_probability: f32,

    /// Upper bound of the spin in degrees per second.
    #[arg(long, default_value_t = 60.0)]
    max_rotation_speed: f32,

    /// Upper bound of the initial twist in degrees.
    #[arg(long, default_value_t = 20.0)]
    max_twist: f32,

    /// How long to let the fractal grow, in seconds.
    #[arg(short, long, default_value_t = 10.0)]
    seconds: f64,

    /// Frames per second of the simulation.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Sleep between frames instead of simulating as fast as possible.
    #[arg(long)]
    real_time: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    anyhow::ensure!(args.fps > 0, "fps must be greater than zero");
    anyhow::ensure!(
        args.seconds.is_finite() && args.seconds >= 0.0,
        "seconds must be a non-negative number"
    );

    let config = FractalConfig {
        max_depth: args.max_depth,
        child_scale: args.child_scale,
        spawn_probability: args.spawn_probability,
        max_rotation_speed: args.max_rotation_speed,
        max_twist: args.max_twist,
    };
    let constructor = FractalFlow::constructor(config, Assets::default())?;
    let settings = RunSettings {
        duration: Duration::from_secs_f64(args.seconds),
        frame_time: Duration::from_secs_f64(1.0 / args.fps as f64),
        real_time: args.real_time,
        seed: args.seed,
    };

    let stats = flow::run(vec![constructor], settings)?;
    log::info!("Finished after {} ticks.", stats.ticks);
    println!(
        "{} nodes (of at most {}), deepest level {}, {} spawns still pending",
        stats.nodes,
        config.max_node_count(),
        stats
            .deepest
            .map_or_else(|| "-".to_string(), |depth| depth.to_string()),
        stats.pending_spawns
    );
    Ok(())
}
