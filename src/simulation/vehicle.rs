//! Vehicle state and update rules
//!
//! A tick is split in two: every vehicle on a road first runs `decide` against
//! the pre-move positions and velocities of its neighbours, then every vehicle
//! runs `move_forward`.

use log::debug;

use super::config::VehicleParams;
use super::error::{ConfigError, ConfigResult};
use super::pid::PidState;
use super::random::RandomSource;
use super::types::{
    BehaviorClass, VehicleId, VehicleKind, ACC_CONTROL_THRESHOLD, ACC_FAULT_SCALE,
    ACC_SPEED_WEIGHT, ACC_STANDSTILL_GAP, ACC_TIME_HEADWAY,
};

/// A vehicle on a ring road
#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: VehicleId,
    /// Cell index, always below the road length
    position: u32,
    /// Cells advanced per tick, never above `effective_max_speed`
    velocity: u32,
    /// Set when a stopped vehicle has been held back one extra tick
    pub slow_to_start_pending: bool,
    /// Controller state, only updated for ACC vehicles
    pub pid: PidState,

    pub total_distance: u64,
    pub stop_count: u64,
    pub ticks_elapsed: u64,

    kind: VehicleKind,
    behavior: BehaviorClass,
    speed_offset: i32,
    road_length: u32,
    max_speed: u32,
    fault_probability: f64,
    slow_to_start_probability: f64,
}

impl Vehicle {
    /// Create a vehicle, drawing its behavior class from `rng`
    ///
    /// ACC vehicles always drive at the speed limit and make no draw.
    /// An initial velocity above the effective maximum is lowered to it.
    pub fn new(
        id: VehicleId,
        kind: VehicleKind,
        position: u32,
        velocity: u32,
        road_length: u32,
        params: &VehicleParams,
        rng: &mut dyn RandomSource,
    ) -> ConfigResult<Self> {
        params.validate()?;
        if road_length == 0 {
            return Err(ConfigError::RoadLength);
        }
        if position >= road_length {
            return Err(ConfigError::Position {
                position,
                length: road_length,
            });
        }

        let (behavior, speed_offset) = match kind {
            VehicleKind::AdaptiveCruise => (BehaviorClass::Normal, 0),
            VehicleKind::Human => assign_behavior(params, rng)?,
        };

        let mut vehicle = Self {
            id,
            position,
            velocity,
            slow_to_start_pending: false,
            pid: PidState::default(),
            total_distance: 0,
            stop_count: 0,
            ticks_elapsed: 0,
            kind,
            behavior,
            speed_offset,
            road_length,
            max_speed: params.max_speed,
            fault_probability: params.fault_probability,
            slow_to_start_probability: params.slow_to_start_probability,
        };
        vehicle.velocity = vehicle.velocity.min(vehicle.effective_max_speed());
        Ok(vehicle)
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn velocity(&self) -> u32 {
        self.velocity
    }

    pub fn kind(&self) -> VehicleKind {
        self.kind
    }

    pub fn is_acc(&self) -> bool {
        self.kind.is_acc()
    }

    pub fn behavior(&self) -> BehaviorClass {
        self.behavior
    }

    pub fn speed_offset(&self) -> i32 {
        self.speed_offset
    }

    pub fn max_speed(&self) -> u32 {
        self.max_speed
    }

    pub fn road_length(&self) -> u32 {
        self.road_length
    }

    /// Speed an ACC vehicle tries to hold
    pub fn target_speed(&self) -> u32 {
        self.max_speed
    }

    /// Upper bound on velocity for this vehicle
    ///
    /// Human drivers add their behavior offset to the speed limit, floored at
    /// one cell per tick since a start from standstill always moves one cell.
    pub fn effective_max_speed(&self) -> u32 {
        match self.kind {
            VehicleKind::AdaptiveCruise => self.target_speed(),
            VehicleKind::Human => {
                (self.max_speed as i64 + self.speed_offset as i64).max(1) as u32
            }
        }
    }

    /// Choose this tick's velocity from the gap and the velocity of the vehicle ahead
    pub fn decide(&mut self, gap_ahead: u32, velocity_ahead: u32, rng: &mut dyn RandomSource) {
        if self.velocity == 0 {
            self.start_from_standstill(gap_ahead, rng);
            return;
        }

        match self.kind {
            VehicleKind::Human => self.decide_human(gap_ahead, velocity_ahead, rng),
            VehicleKind::AdaptiveCruise => self.decide_adaptive(gap_ahead, velocity_ahead, rng),
        }
    }

    /// Advance by the decided velocity and update the trip statistics
    pub fn move_forward(&mut self) {
        let advanced = self.position as u64 + self.velocity as u64;
        self.position = (advanced % self.road_length as u64) as u32;
        self.total_distance += self.velocity as u64;
        if self.velocity == 0 {
            self.stop_count += 1;
        }
        self.ticks_elapsed += 1;
    }

    fn start_from_standstill(&mut self, gap_ahead: u32, rng: &mut dyn RandomSource) {
        if gap_ahead <= 1 {
            self.slow_to_start_pending = false;
        } else if self.slow_to_start_pending {
            self.velocity = 1;
            self.slow_to_start_pending = false;
        } else if rng.chance(self.slow_to_start_probability) {
            self.slow_to_start_pending = true;
        } else {
            self.velocity = 1;
        }
    }

    fn decide_human(&mut self, gap: u32, ahead: u32, rng: &mut dyn RandomSource) {
        let mut v = self.velocity;

        if gap <= v {
            // Too close: brake hard, or by at most two cells when faster than
            // the leader at speed
            let limit = gap.saturating_sub(1);
            v = if v < ahead || v <= 2 {
                limit
            } else {
                limit.min(v - 2)
            };
        } else if gap <= 2 * v {
            if v >= ahead + 4 {
                v = v.saturating_sub(2);
            } else if (ahead + 2..=ahead + 3).contains(&v) {
                v = v.saturating_sub(1);
            }
        }

        if v < self.effective_max_speed() && gap > v + 1 {
            v += 1;
        }

        if v > 0 && rng.chance(self.fault_probability) {
            v -= 1;
        }

        self.velocity = v;
    }

    fn decide_adaptive(&mut self, gap: u32, ahead: u32, rng: &mut dyn RandomSource) {
        let v = self.velocity as f64;
        let desired_gap = ACC_STANDSTILL_GAP + v * ACC_TIME_HEADWAY;

        // Positive error: too close or closing in
        let error_distance = desired_gap - gap as f64;
        let error_speed = ahead as f64 - v;
        let combined_error = error_distance + ACC_SPEED_WEIGHT * error_speed;

        let control = self.pid.update(combined_error);
        let target = self.target_speed();

        if control > ACC_CONTROL_THRESHOLD {
            self.velocity = self.velocity.saturating_sub(1);
        } else if control < -ACC_CONTROL_THRESHOLD && self.velocity < target {
            self.velocity = (self.velocity + 1).min(target);
        }

        // Never drive past the vehicle ahead
        self.velocity = self.velocity.min(gap);

        if self.velocity > 0 && rng.chance(self.fault_probability * ACC_FAULT_SCALE) {
            self.velocity -= 1;
        }
    }
}

fn assign_behavior(
    params: &VehicleParams,
    rng: &mut dyn RandomSource,
) -> ConfigResult<(BehaviorClass, i32)> {
    let weights = params.behavior.weights();
    let index = rng
        .choose_weighted(&weights)
        .ok_or(ConfigError::BehaviorMix {
            sum: weights.iter().sum(),
        })?;
    let behavior = BehaviorClass::ALL[index];

    let offset = match behavior {
        BehaviorClass::Faster => rng.range_inclusive(1, 2) as i32,
        BehaviorClass::Slower => -(rng.range_inclusive(1, 2) as i32),
        BehaviorClass::Normal => 0,
    };

    debug!("Assigned behavior {:?} with speed offset {}", behavior, offset);
    Ok((behavior, offset))
}
