//! A circular single-lane road
//!
//! Vehicles are kept in position order so each one's leader is simply the
//! next entry, wrapping from the last vehicle to the first.

use log::debug;
use std::collections::HashSet;

use super::config::VehicleParams;
use super::error::{ConfigError, ConfigResult};
use super::random::RandomSource;
use super::snapshot::{RoadMetrics, RoadSummary, VehicleState};
use super::types::{VehicleId, VehicleKind};
use super::vehicle::Vehicle;

/// A ring road and the vehicles that drive on it
#[derive(Debug, Clone)]
pub struct Road {
    length: u32,
    vehicles: Vec<Vehicle>,
}

impl Road {
    /// Build a road from existing vehicles
    ///
    /// Every vehicle must have been built for a road of the same length.
    pub fn new(length: u32, vehicles: Vec<Vehicle>) -> ConfigResult<Self> {
        if length == 0 {
            return Err(ConfigError::RoadLength);
        }
        if let Some(vehicle) = vehicles.iter().find(|v| v.road_length() != length) {
            return Err(ConfigError::RoadMismatch {
                vehicle: vehicle.road_length(),
                road: length,
            });
        }

        let mut road = Self { length, vehicles };
        road.sort_vehicles();
        Ok(road)
    }

    /// Place `count` vehicles of one kind at distinct random cells
    ///
    /// Each vehicle starts with a random velocity between 1 and the speed limit.
    pub fn populate(
        length: u32,
        count: u32,
        kind: VehicleKind,
        params: &VehicleParams,
        rng: &mut dyn RandomSource,
    ) -> ConfigResult<Self> {
        if length == 0 {
            return Err(ConfigError::RoadLength);
        }
        if count > length {
            return Err(ConfigError::Overcrowded {
                vehicles: count,
                length,
            });
        }
        params.validate()?;

        let mut occupied = HashSet::new();
        let mut vehicles = Vec::with_capacity(count as usize);
        for index in 0..count as usize {
            let mut position = rng.range_inclusive(0, length - 1);
            while !occupied.insert(position) {
                position = rng.range_inclusive(0, length - 1);
            }
            let velocity = rng.range_inclusive(1, params.max_speed);
            vehicles.push(Vehicle::new(
                VehicleId(index),
                kind,
                position,
                velocity,
                length,
                params,
                rng,
            )?);
        }

        Self::new(length, vehicles)
    }

    /// Number of empty cells between `from` and the vehicle at `to`, going forward
    pub fn gap(length: u32, from: u32, to: u32) -> u32 {
        let raw = to as i64 - from as i64 - 1;
        if raw < 0 {
            (raw + length as i64) as u32
        } else {
            raw as u32
        }
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Advance every vehicle by one tick
    ///
    /// All vehicles decide against the same pre-move view of the road, in
    /// position order, before any of them moves.
    pub fn step(&mut self, rng: &mut dyn RandomSource) {
        if self.vehicles.is_empty() {
            return;
        }

        self.sort_vehicles();
        let before: Vec<(u32, u32)> = self
            .vehicles
            .iter()
            .map(|v| (v.position(), v.velocity()))
            .collect();

        let count = self.vehicles.len();
        for (i, vehicle) in self.vehicles.iter_mut().enumerate() {
            let (next_position, next_velocity) = before[(i + 1) % count];
            let gap = Self::gap(self.length, vehicle.position(), next_position);
            vehicle.decide(gap, next_velocity, rng);
        }

        for vehicle in &mut self.vehicles {
            vehicle.move_forward();
        }

        if log::log_enabled!(log::Level::Debug) && self.has_collision() {
            debug!("Collision detected on road of length {}", self.length);
        }
    }

    /// Whether two vehicles share a cell
    pub fn has_collision(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.vehicles.len());
        !self.vehicles.iter().all(|v| seen.insert(v.position()))
    }

    /// Average speed, stopped vehicles and density for the current state
    pub fn metrics(&self) -> RoadMetrics {
        let count = self.vehicles.len();
        let avg_speed = if count == 0 {
            0.0
        } else {
            self.vehicles.iter().map(|v| v.velocity() as f64).sum::<f64>() / count as f64
        };

        RoadMetrics {
            avg_speed,
            stopped_count: self.vehicles.iter().filter(|v| v.velocity() == 0).count(),
            density: count as f64 / (self.length as f64 / 2.0),
        }
    }

    /// Distance and stop totals since the road was built
    pub fn summary(&self) -> RoadSummary {
        let vehicles = self.vehicles.len();
        let total_distance = self.vehicles.iter().map(|v| v.total_distance).sum();
        let total_stops = self.vehicles.iter().map(|v| v.stop_count).sum();

        RoadSummary {
            vehicles,
            total_distance,
            total_stops,
            mean_distance: if vehicles == 0 {
                0.0
            } else {
                total_distance as f64 / vehicles as f64
            },
        }
    }

    pub fn vehicle_states(&self) -> Vec<VehicleState> {
        self.vehicles.iter().map(VehicleState::from).collect()
    }

    // Ties cannot arise without a collision; the id keeps the order stable if one does
    fn sort_vehicles(&mut self) {
        self.vehicles.sort_by_key(|v| (v.position(), v.id));
    }
}
