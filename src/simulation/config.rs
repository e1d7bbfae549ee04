//! Simulation parameters and their validation

use std::time::Duration;

use super::error::{ConfigError, ConfigResult};
use super::types::PROBABILITY_TOLERANCE;

/// Probabilities of the three driver behavior classes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BehaviorMix {
    pub faster: f64,
    pub slower: f64,
    pub normal: f64,
}

impl BehaviorMix {
    pub fn new(faster: f64, slower: f64, normal: f64) -> Self {
        Self {
            faster,
            slower,
            normal,
        }
    }

    /// Everyone drives at the speed limit
    pub fn all_normal() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    /// Weights in the order of `BehaviorClass::ALL`
    pub fn weights(&self) -> [f64; 3] {
        [self.faster, self.slower, self.normal]
    }

    pub fn validate(&self) -> ConfigResult<()> {
        check_probability("faster probability", self.faster)?;
        check_probability("slower probability", self.slower)?;
        check_probability("normal probability", self.normal)?;

        let sum: f64 = self.weights().iter().sum();
        if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(ConfigError::BehaviorMix { sum });
        }
        Ok(())
    }
}

impl Default for BehaviorMix {
    fn default() -> Self {
        Self::new(0.70, 0.10, 0.20)
    }
}

/// Per-vehicle parameters shared by every vehicle on a road
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleParams {
    pub max_speed: u32,
    pub fault_probability: f64,
    pub slow_to_start_probability: f64,
    pub behavior: BehaviorMix,
}

impl VehicleParams {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_speed == 0 {
            return Err(ConfigError::MaxSpeed);
        }
        check_probability("fault probability", self.fault_probability)?;
        check_probability("slow-to-start probability", self.slow_to_start_probability)?;
        self.behavior.validate()
    }
}

/// Full configuration of a two-road simulation
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Number of cells on each ring road
    pub road_length: u32,
    /// Number of vehicles on each road
    pub vehicle_count: u32,
    pub max_speed: u32,
    pub fault_probability: f64,
    pub slow_to_start_probability: f64,
    pub behavior: BehaviorMix,
    pub steps_per_second: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            road_length: 120,
            vehicle_count: 30,
            max_speed: 4,
            fault_probability: 0.1,
            slow_to_start_probability: 0.5,
            behavior: BehaviorMix::default(),
            steps_per_second: 2.0,
        }
    }
}

impl SimulationConfig {
    pub fn vehicle_params(&self) -> VehicleParams {
        VehicleParams {
            max_speed: self.max_speed,
            fault_probability: self.fault_probability,
            slow_to_start_probability: self.slow_to_start_probability,
            behavior: self.behavior,
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.road_length == 0 {
            return Err(ConfigError::RoadLength);
        }
        if self.vehicle_count == 0 {
            return Err(ConfigError::VehicleCount);
        }
        if self.vehicle_count > self.road_length {
            return Err(ConfigError::Overcrowded {
                vehicles: self.vehicle_count,
                length: self.road_length,
            });
        }
        tick_interval(self.steps_per_second)?;
        self.vehicle_params().validate()
    }
}

/// Sleep between ticks for a given rate
pub fn tick_interval(steps_per_second: f64) -> ConfigResult<Duration> {
    if !steps_per_second.is_finite() || steps_per_second <= 0.0 {
        return Err(ConfigError::TickRate(steps_per_second));
    }
    Ok(Duration::from_secs_f64(1.0 / steps_per_second))
}

fn check_probability(name: &'static str, value: f64) -> ConfigResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::Probability { name, value });
    }
    Ok(())
}
