//! Error types for the simulation.
//!
//! Configuration problems are reported when an engine, road or vehicle is
//! built (or when the tick rate changes) and are never clamped. A tick that
//! fails at runtime is reported as a `TickError` and leaves the last
//! committed state untouched.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("behavior probabilities must sum to 1 (got {sum})")]
    BehaviorMix { sum: f64 },

    #[error("{name} must be within [0, 1] (got {value})")]
    Probability { name: &'static str, value: f64 },

    #[error("tick rate must be a positive number of steps per second (got {0})")]
    TickRate(f64),

    #[error("road length must be positive")]
    RoadLength,

    #[error("vehicle count must be positive")]
    VehicleCount,

    #[error("maximum speed must be positive")]
    MaxSpeed,

    #[error("cannot place {vehicles} vehicles on a road of {length} cells")]
    Overcrowded { vehicles: u32, length: u32 },

    #[error("vehicle built for a road of {vehicle} cells placed on a road of {road} cells")]
    RoadMismatch { vehicle: u32, road: u32 },

    #[error("position {position} is outside a road of {length} cells")]
    Position { position: u32, length: u32 },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum TickError {
    #[error("tick {step} aborted: {message}")]
    Aborted { step: u64, message: String },
}
