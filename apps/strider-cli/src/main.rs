mod scenario;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use strider_kernel::{SimConfig, Simulation, WorldEvent};
use strider_movement::MovementConfig;
use strider_physics::{PhysicsBackend, RapierWorld, SimpleWorld};
use tracing_subscriber::EnvFilter;

use crate::scenario::Scenario;

#[derive(Parser)]
#[command(name = "strider-cli", about = "Run headless character movement scenarios")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// Analytic floors and box columns
    Simple,
    /// Rapier kinematic character controller
    Rapier,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print the default movement config as YAML
    Config,
    /// Run a scripted scenario and print per-tick state
    Simulate {
        #[arg(short, long, value_enum, default_value = "walk")]
        scenario: Scenario,
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "120")]
        ticks: u64,
        /// Movement config file (.yaml, .yml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value = "simple")]
        backend: Backend,
        /// RNG seed for AI characters
        #[arg(long, default_value = "42")]
        seed: u64,
        /// Print every n-th tick
        #[arg(long, default_value = "1")]
        every: u64,
    },
}

struct RunOptions {
    scenario: Scenario,
    ticks: u64,
    seed: u64,
    every: u64,
    movement: MovementConfig,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("strider-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", strider_common::crate_info());
            println!("input: {}", strider_input::crate_info());
            println!("physics: {}", strider_physics::crate_info());
            println!("movement: {}", strider_movement::crate_info());
            println!("kernel: {}", strider_kernel::crate_info());
        }
        Commands::Config => {
            print!("{}", MovementConfig::default().to_yaml()?);
        }
        Commands::Simulate {
            scenario,
            ticks,
            config,
            backend,
            seed,
            every,
        } => {
            let movement = match config {
                Some(path) => MovementConfig::load(&path).inspect_err(|e| {
                    tracing::error!(path = %path.display(), "failed to load config: {e}");
                })?,
                None => MovementConfig::default(),
            };
            let options = RunOptions {
                scenario,
                ticks,
                seed,
                every: every.max(1),
                movement,
            };
            let geometry = scenario.geometry();
            match backend {
                Backend::Simple => run(SimpleWorld::new(geometry), &options)?,
                Backend::Rapier => run(RapierWorld::new(&geometry), &options)?,
            }
        }
    }

    Ok(())
}

fn run<B: PhysicsBackend>(backend: B, options: &RunOptions) -> anyhow::Result<()> {
    let config = SimConfig {
        seed: options.seed,
        ..SimConfig::default()
    };
    let mut sim = Simulation::new(backend, config);
    let ids = options.scenario.populate(&mut sim, &options.movement)?;
    println!(
        "Scenario {:?}: {} character(s), {} ticks at {} Hz",
        options.scenario,
        ids.len(),
        options.ticks,
        config.tick_rate_hz
    );
    println!("tick  char  position                    velocity                    ground  status");

    let mut ground_events = 0usize;
    for tick in 0..options.ticks {
        options.scenario.drive(&mut sim, &ids, tick, options.ticks);
        let reports = sim.step();
        ground_events += sim
            .world_mut()
            .drain_events()
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    WorldEvent::HitGround { .. } | WorldEvent::LeftGround { .. }
                )
            })
            .count();
        let print = (tick + 1) % options.every == 0 || tick + 1 == options.ticks;
        for (index, id) in ids.iter().enumerate() {
            let Some(c) = sim.character(*id) else {
                continue;
            };
            let transition = reports
                .iter()
                .find(|(rid, _)| rid == id)
                .and_then(|(_, r)| r.transition);
            if !print && transition.is_none() {
                continue;
            }
            let p = c.position();
            let v = c.velocity();
            let marker = transition.map(|t| format!("  <{t:?}>")).unwrap_or_default();
            println!(
                "{:>4}  {:>4}  ({:>7.3}, {:>7.3}, {:>7.3})   ({:>7.3}, {:>7.3}, {:>7.3})   {:<6}  {:?}{}",
                sim.world().tick(),
                index,
                p.x,
                p.y,
                p.z,
                v.x,
                v.y,
                v.z,
                c.is_on_ground(),
                c.move_status(),
                marker
            );
        }
    }

    println!("Ground events: {ground_events}");
    println!("State hash: {:#018x}", sim.state_hash());
    Ok(())
}
