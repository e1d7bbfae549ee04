use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::thread;
use std::time::Duration;

use ring_traffic::simulation::{
    BehaviorMix, RoadMetrics, RoadSummary, SeededRandom, SimulationConfig, SimulationEngine,
    Snapshot,
};

#[derive(Parser)]
#[command(name = "ring_traffic")]
#[command(about = "Ring road traffic simulation comparing ACC and human drivers")]
struct Cli {
    /// Number of cells on each ring road
    #[arg(long, default_value = "120")]
    length: u32,

    /// Number of vehicles on each road
    #[arg(long, default_value = "30")]
    vehicles: u32,

    /// Speed limit in cells per tick
    #[arg(long, default_value = "4")]
    max_speed: u32,

    /// Probability of a random slowdown each tick
    #[arg(long, default_value = "0.1")]
    p_fault: f64,

    /// Probability that a stopped vehicle waits an extra tick before starting
    #[arg(long, default_value = "0.5")]
    p_slow: f64,

    /// Share of human drivers faster than the limit
    #[arg(long, default_value = "0.7")]
    prob_faster: f64,

    /// Share of human drivers slower than the limit
    #[arg(long, default_value = "0.1")]
    prob_slower: f64,

    /// Share of human drivers at the limit
    #[arg(long, default_value = "0.2")]
    prob_normal: f64,

    /// Tick rate of the background loop
    #[arg(long, default_value = "2")]
    steps_per_second: f64,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to run
    #[arg(long, default_value = "100")]
    ticks: u64,

    /// Step on the background thread at the configured rate instead of as fast as possible
    #[arg(long)]
    threaded: bool,

    /// Print one JSON snapshot per line instead of summaries
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn config(&self) -> SimulationConfig {
        SimulationConfig {
            road_length: self.length,
            vehicle_count: self.vehicles,
            max_speed: self.max_speed,
            fault_probability: self.p_fault,
            slow_to_start_probability: self.p_slow,
            behavior: BehaviorMix::new(self.prob_faster, self.prob_slower, self.prob_normal),
            steps_per_second: self.steps_per_second,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn,ring_traffic=info"),
    )
    .init();

    let cli = Cli::parse();
    let config = cli.config();
    let engine = match cli.seed {
        Some(seed) => SimulationEngine::with_seed(config, seed),
        None => SimulationEngine::new(config, SeededRandom::from_entropy()),
    }
    .context("Invalid simulation configuration")?;

    if cli.threaded {
        run_threaded(&engine, cli.ticks, cli.json)?;
    } else {
        run_headless(&engine, cli.ticks, cli.json)?;
    }

    let summary = engine.summary();
    info!("=== SIMULATION FINISHED ===");
    info!("Steps: {}", engine.step());
    info!("Road 1 (ACC): {}", format_summary(&summary.road1));
    info!("Road 2 (human): {}", format_summary(&summary.road2));
    Ok(())
}

/// Step synchronously, reporting once per simulated second
fn run_headless(engine: &SimulationEngine, ticks: u64, json: bool) -> Result<()> {
    let ticks_per_report = engine.config().steps_per_second.ceil().max(1.0) as u64;
    report(&engine.get_state(), json)?;

    for tick in 1..=ticks {
        engine.run_step().context("Simulation tick failed")?;
        if json || tick % ticks_per_report == 0 || tick == ticks {
            report(&engine.get_state(), json)?;
        }
    }
    Ok(())
}

/// Let the background loop drive the simulation and poll snapshots from this thread
fn run_threaded(engine: &SimulationEngine, ticks: u64, json: bool) -> Result<()> {
    let poll = engine.tick_interval();
    engine.start();

    let mut last_step = None;
    while engine.is_running() {
        thread::sleep(poll.max(Duration::from_millis(10)));
        let state = engine.get_state();
        if last_step != Some(state.step) {
            report(&state, json)?;
            last_step = Some(state.step);
        }
        if state.step >= ticks {
            break;
        }
    }

    if !engine.is_running() && engine.step() < ticks {
        anyhow::bail!("Simulation loop halted at step {}", engine.step());
    }
    engine.stop();
    Ok(())
}

fn report(state: &Snapshot, json: bool) -> Result<()> {
    if json {
        let line = serde_json::to_string(state).context("Failed to serialize snapshot")?;
        println!("{}", line);
    } else {
        println!("--- Step {} ---", state.step);
        println!("  Road 1 (ACC):   {}", format_metrics(&state.metrics.road1));
        println!("  Road 2 (human): {}", format_metrics(&state.metrics.road2));
    }
    Ok(())
}

fn format_metrics(metrics: &RoadMetrics) -> String {
    format!(
        "avg speed={:.2}, stopped={}, density={:.2}",
        metrics.avg_speed, metrics.stopped_count, metrics.density
    )
}

fn format_summary(summary: &RoadSummary) -> String {
    format!(
        "vehicles={}, total distance={}, total stops={}, mean distance={:.1}",
        summary.vehicles, summary.total_distance, summary.total_stops, summary.mean_distance
    )
}
