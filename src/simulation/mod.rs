//! Ring road traffic simulation
//!
//! This module contains the vehicle update rules, the ring road and the
//! engine that steps two roads in lock-step. It has no presentation
//! dependencies; the binary and any network layer consume `Snapshot`s.

mod config;
mod engine;
mod error;
mod pid;
mod random;
mod road;
mod snapshot;
mod types;
mod vehicle;

pub use config::{tick_interval, BehaviorMix, SimulationConfig, VehicleParams};
pub use engine::SimulationEngine;
pub use error::{ConfigError, ConfigResult, TickError};
pub use pid::{PidState, PID_KD, PID_KI, PID_KP};
pub use random::{RandomSource, SeededRandom};
pub use road::Road;
pub use snapshot::{RoadMetrics, RoadPair, RoadSummary, Snapshot, VehicleState};
pub use types::{
    BehaviorClass, VehicleId, VehicleKind, ACC_CONTROL_THRESHOLD, ACC_FAULT_SCALE,
    ACC_SPEED_WEIGHT, ACC_STANDSTILL_GAP, ACC_TIME_HEADWAY, PROBABILITY_TOLERANCE,
};
pub use vehicle::Vehicle;
