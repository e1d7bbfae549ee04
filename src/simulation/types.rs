//! Core types for the ring road simulation
//!
//! Identifiers, vehicle classes and the model constants shared by the
//! update rules.

use serde::{Deserialize, Serialize};

/// A unique identifier for a vehicle on its road
/// Assigned in creation order and used to break position ties when sorting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(pub usize);

/// Which update rule governs a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleKind {
    /// Human driver following the fixed rule table
    Human,
    /// Adaptive cruise control driven by a PID gap controller
    AdaptiveCruise,
}

impl VehicleKind {
    pub fn is_acc(&self) -> bool {
        matches!(self, VehicleKind::AdaptiveCruise)
    }
}

/// Driver temperament assigned once at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BehaviorClass {
    /// Drives one or two cells per tick above the speed limit
    Faster,
    /// Drives one or two cells per tick below the speed limit
    Slower,
    /// Drives at the speed limit
    Normal,
}

impl BehaviorClass {
    /// Order matches the weights passed to the categorical draw
    pub const ALL: [BehaviorClass; 3] = [
        BehaviorClass::Faster,
        BehaviorClass::Slower,
        BehaviorClass::Normal,
    ];
}

/// Desired ACC gap at standstill, in cells
pub const ACC_STANDSTILL_GAP: f64 = 1.0;

/// Desired ACC time gap, in ticks
pub const ACC_TIME_HEADWAY: f64 = 2.0;

/// Weight of the speed error in the combined ACC error
pub const ACC_SPEED_WEIGHT: f64 = 0.5;

/// Controller output needed before an ACC vehicle changes speed
pub const ACC_CONTROL_THRESHOLD: f64 = 0.5;

/// Fraction of the human fault probability applied to ACC vehicles
pub const ACC_FAULT_SCALE: f64 = 0.01;

/// Tolerance when checking that behavior probabilities sum to one
pub const PROBABILITY_TOLERANCE: f64 = 1e-8;
