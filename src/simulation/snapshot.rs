//! Point-in-time views of the simulation handed to presentation layers
//!
//! Field names serialize in camelCase to match the JSON shape expected by
//! browser clients.

use serde::{Deserialize, Serialize};

use super::types::VehicleId;
use super::vehicle::Vehicle;

/// One value per road
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoadPair<T> {
    /// The adaptive cruise control road
    pub road1: T,
    /// The human driver road
    pub road2: T,
}

/// A vehicle as seen by a snapshot reader
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleState {
    pub id: VehicleId,
    pub position: u32,
    pub velocity: u32,
    #[serde(rename = "isACC")]
    pub is_acc: bool,
}

impl From<&Vehicle> for VehicleState {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            id: vehicle.id,
            position: vehicle.position(),
            velocity: vehicle.velocity(),
            is_acc: vehicle.is_acc(),
        }
    }
}

/// Per-road figures recomputed after every tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadMetrics {
    pub avg_speed: f64,
    pub stopped_count: usize,
    /// Vehicle count over half the road length
    pub density: f64,
}

/// Trip statistics accumulated over the whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadSummary {
    pub vehicles: usize,
    pub total_distance: u64,
    pub total_stops: u64,
    pub mean_distance: f64,
}

/// Consistent view of both roads after a completed tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub step: u64,
    pub roads: RoadPair<Vec<VehicleState>>,
    pub metrics: RoadPair<RoadMetrics>,
}
