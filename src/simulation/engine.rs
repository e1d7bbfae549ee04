//! Simulation engine that steps both roads on a background thread
//!
//! One mutex guards everything a tick touches, so a snapshot always shows
//! the result of a single completed tick. A tick is computed on copies of the
//! roads and only committed once it has finished, which keeps a failed tick
//! invisible to readers.

use log::{error, info, warn};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::config::{tick_interval, SimulationConfig};
use super::error::{ConfigResult, TickError};
use super::random::{RandomSource, SeededRandom};
use super::road::Road;
use super::snapshot::{RoadMetrics, RoadPair, RoadSummary, Snapshot};
use super::types::VehicleKind;

/// Everything guarded by the engine lock
struct EngineState {
    road1: Road,
    road2: Road,
    step: u64,
    metrics: RoadPair<RoadMetrics>,
    rng: Box<dyn RandomSource>,
    tick_interval: Duration,
}

impl EngineState {
    /// Run one tick and commit it, or leave the committed state untouched
    fn advance(&mut self) -> Result<u64, TickError> {
        let mut road1 = self.road1.clone();
        let mut road2 = self.road2.clone();
        let rng = &mut self.rng;

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            road1.step(rng.as_mut());
            road2.step(rng.as_mut());
            RoadPair {
                road1: road1.metrics(),
                road2: road2.metrics(),
            }
        }));

        match outcome {
            Ok(metrics) => {
                self.road1 = road1;
                self.road2 = road2;
                self.metrics = metrics;
                self.step += 1;
                Ok(self.step)
            }
            Err(payload) => Err(TickError::Aborted {
                step: self.step + 1,
                message: panic_message(payload.as_ref()),
            }),
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            step: self.step,
            roads: RoadPair {
                road1: self.road1.vehicle_states(),
                road2: self.road2.vehicle_states(),
            },
            metrics: self.metrics,
        }
    }
}

/// State shared with the background loop
struct Shared {
    state: Mutex<EngineState>,
    running: AtomicBool,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Two-road ring traffic simulation
///
/// `road1` carries only ACC vehicles and `road2` only human drivers; both
/// share the road length and driving parameters.
pub struct SimulationEngine {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
    config: SimulationConfig,
}

impl SimulationEngine {
    /// Build both roads, drawing placement and behavior from `rng`
    pub fn new(config: SimulationConfig, rng: impl RandomSource + 'static) -> ConfigResult<Self> {
        config.validate()?;
        let mut rng: Box<dyn RandomSource> = Box::new(rng);
        let params = config.vehicle_params();

        let road1 = Road::populate(
            config.road_length,
            config.vehicle_count,
            VehicleKind::AdaptiveCruise,
            &params,
            rng.as_mut(),
        )?;
        let road2 = Road::populate(
            config.road_length,
            config.vehicle_count,
            VehicleKind::Human,
            &params,
            rng.as_mut(),
        )?;

        let state = EngineState {
            metrics: RoadPair {
                road1: road1.metrics(),
                road2: road2.metrics(),
            },
            road1,
            road2,
            step: 0,
            rng,
            tick_interval: tick_interval(config.steps_per_second)?,
        };

        Ok(Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                running: AtomicBool::new(false),
            }),
            worker: Mutex::new(None),
            config,
        })
    }

    /// Create an engine with a reproducible seeded RNG
    pub fn with_seed(config: SimulationConfig, seed: u64) -> ConfigResult<Self> {
        Self::new(config, SeededRandom::new(seed))
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Start the background loop; does nothing if it is already running
    pub fn start(&self) {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if self.shared.running.swap(true, Ordering::SeqCst) {
            return;
        }

        // A loop that ended on a failed tick still has to be joined
        if let Some(handle) = worker.take() {
            join_worker(handle);
        }

        let shared = Arc::clone(&self.shared);
        *worker = Some(thread::spawn(move || run_loop(shared)));
        info!("Simulation started");
    }

    /// Stop the background loop and wait for it to exit
    ///
    /// No tick runs after this returns.
    pub fn stop(&self) {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        self.shared.running.store(false, Ordering::SeqCst);

        if let Some(handle) = worker.take() {
            handle.thread().unpark();
            join_worker(handle);
            info!("Simulation stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Change the loop cadence, effective from the next sleep
    pub fn set_tick_rate(&self, steps_per_second: f64) -> ConfigResult<()> {
        let interval = tick_interval(steps_per_second)?;
        self.shared.lock().tick_interval = interval;
        info!("Tick rate set to {} steps/s", steps_per_second);
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        self.shared.lock().tick_interval
    }

    /// Run a single tick on the calling thread
    ///
    /// Returns the new step count.
    pub fn run_step(&self) -> Result<u64, TickError> {
        self.shared.lock().advance()
    }

    /// Snapshot of the last completed tick
    pub fn get_state(&self) -> Snapshot {
        self.shared.lock().snapshot()
    }

    pub fn step(&self) -> u64 {
        self.shared.lock().step
    }

    /// Accumulated trip statistics for both roads
    pub fn summary(&self) -> RoadPair<RoadSummary> {
        let state = self.shared.lock();
        RoadPair {
            road1: state.road1.summary(),
            road2: state.road2.summary(),
        }
    }
}

impl Drop for SimulationEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_loop(shared: Arc<Shared>) {
    info!("Simulation loop started");

    while shared.running.load(Ordering::SeqCst) {
        let interval = {
            let mut state = shared.lock();
            match state.advance() {
                Ok(_) => state.tick_interval,
                Err(err) => {
                    error!("{err}; halting simulation loop");
                    shared.running.store(false, Ordering::SeqCst);
                    break;
                }
            }
        };
        wait_for_next_tick(&shared, interval);
    }

    info!("Simulation loop ended");
}

/// Sleep for `interval`, waking early if the engine is stopped
fn wait_for_next_tick(shared: &Shared, interval: Duration) {
    let deadline = Instant::now() + interval;
    while shared.running.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::park_timeout(deadline - now);
    }
}

fn join_worker(handle: JoinHandle<()>) {
    if handle.join().is_err() {
        warn!("Simulation loop panicked");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
