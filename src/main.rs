//! Headless runner for movement scenarios.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lille_motion::{init_logging, ImpactEvent, ScenarioConfig, TickPipeline};
use log::info;

/// Runs a movement scenario headlessly and reports where every actor ends up
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
    /// Scenario JSON file; a built-in demo runs when omitted
    #[arg(short, long)]
    scenario: Option<PathBuf>,
    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 120)]
    frames: u32,
    /// Frame length in seconds
    #[arg(long, default_value_t = 1.0 / 30.0)]
    dt: f32,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let scenario = match &args.scenario {
        Some(path) => ScenarioConfig::load(path)
            .with_context(|| format!("loading scenario {}", path.display()))?,
        None => ScenarioConfig::default(),
    };
    let terrain = scenario.terrain.build().context("building terrain")?;
    let mut actors = scenario.build_actors();
    let mut pipeline = TickPipeline::new();

    let (mut wall_hits, mut actor_hits) = (0_usize, 0_usize);
    for _ in 0..args.frames {
        for event in pipeline.tick(&mut actors, &terrain, args.dt) {
            match event {
                ImpactEvent::TerrainBounce { .. } => wall_hits += 1,
                ImpactEvent::ActorBounce { .. } => actor_hits += 1,
                ImpactEvent::CollisionSound { .. } => {}
            }
        }
    }

    info!(
        "simulated {} frames ({:.2}s): {wall_hits} wall bounces, {actor_hits} actor bounces",
        args.frames,
        pipeline.clock().total_seconds + f64::from(pipeline.clock().dt)
    );
    for actor in &actors {
        info!(
            "actor {}: position {:?} velocity {:?} moving {}",
            actor.id.0, actor.movement.position, actor.movement.velocity, actor.chassis.moving
        );
    }
    Ok(())
}
