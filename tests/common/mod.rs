//! Helpers shared by the integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ring_traffic::simulation::{
    BehaviorMix, RandomSource, SeededRandom, VehicleId, VehicleKind, VehicleParams, Vehicle,
};

/// Random source that replays queued uniform draws
///
/// Once the queue is empty every uniform draw is 0.999, so no fault or
/// slow-to-start event fires unless its probability is above that.
pub struct ScriptedRandom {
    uniforms: VecDeque<f64>,
}

impl ScriptedRandom {
    pub fn new(uniforms: &[f64]) -> Self {
        Self {
            uniforms: uniforms.iter().copied().collect(),
        }
    }

    pub fn quiet() -> Self {
        Self::new(&[])
    }

    pub fn remaining(&self) -> usize {
        self.uniforms.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn uniform(&mut self) -> f64 {
        self.uniforms.pop_front().unwrap_or(0.999)
    }

    fn range_inclusive(&mut self, low: u32, _high: u32) -> u32 {
        low
    }

    fn choose_weighted(&mut self, weights: &[f64]) -> Option<usize> {
        weights.iter().position(|w| *w > 0.0)
    }
}

/// Seeded source that panics on uniform draws once armed
pub struct FaultyRandom {
    inner: SeededRandom,
    armed: Arc<AtomicBool>,
}

impl FaultyRandom {
    pub fn new(seed: u64) -> (Self, Arc<AtomicBool>) {
        let armed = Arc::new(AtomicBool::new(false));
        (
            Self {
                inner: SeededRandom::new(seed),
                armed: Arc::clone(&armed),
            },
            armed,
        )
    }
}

impl RandomSource for FaultyRandom {
    fn uniform(&mut self) -> f64 {
        if self.armed.load(Ordering::SeqCst) {
            panic!("random source failure");
        }
        self.inner.uniform()
    }

    fn range_inclusive(&mut self, low: u32, high: u32) -> u32 {
        self.inner.range_inclusive(low, high)
    }

    fn choose_weighted(&mut self, weights: &[f64]) -> Option<usize> {
        self.inner.choose_weighted(weights)
    }
}

pub fn params(max_speed: u32, p_fault: f64, p_slow: f64) -> VehicleParams {
    VehicleParams {
        max_speed,
        fault_probability: p_fault,
        slow_to_start_probability: p_slow,
        behavior: BehaviorMix::all_normal(),
    }
}

pub fn vehicle(kind: VehicleKind, position: u32, velocity: u32, params: &VehicleParams) -> Vehicle {
    Vehicle::new(
        VehicleId(0),
        kind,
        position,
        velocity,
        100,
        params,
        &mut ScriptedRandom::quiet(),
    )
    .unwrap()
}
