//! Simulation entry point: a full swarm on the in-memory gossip bus
//!
//! Spawns one mission controller with a simulated vehicle per scenario entry,
//! one allocator worker per controller, and a ground-station task collecting
//! mission events, then runs everything until the swarm reports mission
//! complete or the deadline passes.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use allocator::SearchConfig;
use controller::services::{GossipBus, MonotonicClock};
use controller::traits::Clock;
use controller::vehicle::SimulatedVehicle;
use controller::{MissionController, Scenario};
use shared::types::Pose;
use shared::vehicle_info;
use tokio::sync::mpsc;

/// Cooperative SEAD mission simulator
#[derive(Parser)]
#[command(name = "sead-sim")]
#[command(about = "Runs a decentralized SEAD swarm against a scenario")]
struct Args {
    /// Scenario JSON file (built-in demo scenario when omitted)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Hard mission deadline in seconds
    #[arg(long, default_value = "600")]
    deadline: f64,

    /// Fixed allocator RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

/// Controller tick granularity; every periodic activity gates itself on the
/// mission clock inside the tick
const TICK: Duration = Duration::from_millis(20);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    shared::logging::init_tracing(Some(&args.log_level));

    let scenario = match &args.scenario {
        Some(path) => Scenario::from_file(path)
            .with_context(|| format!("loading scenario {}", path.display()))?,
        None => Scenario::demo(),
    };
    scenario.validate().context("scenario validation")?;

    let (bus, mut events) = GossipBus::new();
    let clock = MonotonicClock::new();
    let deadline = args.deadline;

    let mut vehicle_tasks = Vec::new();
    let mut worker_handles = Vec::new();

    for instance in &scenario.vehicles {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        let search_config = SearchConfig {
            population_size: scenario.population_size,
            seed: args.seed.map(|s| s ^ u64::from(instance.id)),
            ..SearchConfig::default()
        };
        let targets = scenario.initial_targets();
        let time_slice = Duration::from_millis(scenario.time_slice_ms);
        worker_handles.push(tokio::task::spawn_blocking(move || {
            allocator::run_worker(targets, time_slice, search_config, update_tx, command_rx)
        }));

        let adapter = SimulatedVehicle::new(
            Pose::at(instance.start[0], instance.start[1], instance.start[2]),
            instance.cruise_speed,
            instance.min_turn_radius,
        );
        let mut mission = MissionController::new(
            scenario.spec_for(instance),
            scenario.initial_targets(),
            scenario.hidden_targets.clone(),
            adapter,
            bus.endpoint(instance.id),
            command_tx,
            update_rx,
        );

        let clock = clock.clone();
        let id = instance.id;
        vehicle_tasks.push(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(TICK);
            loop {
                ticker.tick().await;
                let now = clock.now();
                if now > deadline {
                    vehicle_info!(id, "mission deadline passed");
                    break;
                }
                if let Err(e) = mission.on_tick(now).await {
                    tracing::error!(vehicle = id, error = %e, "controller tick failed");
                    break;
                }
                if mission.mission_complete() && mission.pose().velocity < 0.05 {
                    vehicle_info!(id, "landed at base");
                    break;
                }
            }
        }));
    }
    drop(bus);

    let ground_station = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            tracing::info!(at = event.at, event = ?event.event, "ground station");
        }
    });

    for task in vehicle_tasks {
        task.await.context("vehicle task panicked")?;
    }
    for handle in worker_handles {
        // A worker that outlived its controller reports a closed channel;
        // that is not worth a non-zero exit after the vehicles are down
        if let Err(e) = handle.await.context("allocator task panicked")? {
            tracing::warn!(error = %e, "allocator worker exited with error");
        }
    }
    ground_station.await.context("ground station panicked")?;

    tracing::info!("simulation finished");
    Ok(())
}
