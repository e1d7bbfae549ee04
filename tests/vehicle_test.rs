//! Vehicle update rule tests
//!
//! Each test drives a single vehicle with a fixed gap and leader velocity.

mod common;

use common::{params, vehicle, ScriptedRandom};
use ring_traffic::simulation::{
    BehaviorClass, BehaviorMix, ConfigError, PidState, SeededRandom, Vehicle, VehicleId,
    VehicleKind, VehicleParams,
};

fn human(velocity: u32) -> Vehicle {
    vehicle(VehicleKind::Human, 10, velocity, &params(4, 0.0, 0.0))
}

fn acc(velocity: u32) -> Vehicle {
    vehicle(VehicleKind::AdaptiveCruise, 10, velocity, &params(4, 0.0, 0.0))
}

#[test]
fn test_hard_brake_when_slower_than_leader() {
    let mut car = human(3);
    car.decide(3, 5, &mut ScriptedRandom::quiet());
    assert_eq!(car.velocity(), 2);
}

#[test]
fn test_bounded_brake_when_faster_than_leader() {
    // min(gap - 1, v - 2) = 2, then the gap still allows one cell of acceleration
    let mut car = human(4);
    car.decide(4, 2, &mut ScriptedRandom::quiet());
    assert_eq!(car.velocity(), 3);
}

#[test]
fn test_brake_on_zero_gap_stops() {
    let mut car = human(2);
    car.decide(0, 0, &mut ScriptedRandom::quiet());
    assert_eq!(car.velocity(), 0);
}

#[test]
fn test_look_ahead_deceleration() {
    // Closing fast on a stopped leader: -2, then +1
    let mut car = human(4);
    car.decide(6, 0, &mut ScriptedRandom::quiet());
    assert_eq!(car.velocity(), 3);
}

#[test]
fn test_look_ahead_eases_off_when_slightly_faster() {
    // v = ahead + 3: -1, then +1. The look-ahead branch needs gap > v, so
    // acceleration always follows and the net result is no change.
    let mut car = vehicle(VehicleKind::Human, 10, 4, &params(6, 0.0, 0.0));
    car.decide(6, 1, &mut ScriptedRandom::quiet());
    assert_eq!(car.velocity(), 4);

    // v = ahead + 2 takes the same branch
    let mut car = vehicle(VehicleKind::Human, 10, 4, &params(6, 0.0, 0.0));
    car.decide(6, 2, &mut ScriptedRandom::quiet());
    assert_eq!(car.velocity(), 4);
}

#[test]
fn test_look_ahead_keeps_speed_when_matching_leader() {
    // v < ahead + 2: no look-ahead change, so acceleration lifts 4 to 5
    let mut car = vehicle(VehicleKind::Human, 10, 4, &params(6, 0.0, 0.0));
    car.decide(6, 3, &mut ScriptedRandom::quiet());
    assert_eq!(car.velocity(), 5);

    let mut car = human(3);
    car.decide(5, 3, &mut ScriptedRandom::quiet());
    assert_eq!(car.velocity(), 4);
}

#[test]
fn test_accelerates_with_room() {
    let mut car = human(2);
    car.decide(10, 2, &mut ScriptedRandom::quiet());
    assert_eq!(car.velocity(), 3);
}

#[test]
fn test_holds_at_effective_max_speed() {
    let mut car = human(4);
    car.decide(20, 4, &mut ScriptedRandom::quiet());
    assert_eq!(car.velocity(), 4);
}

#[test]
fn test_random_fault_slows_down() {
    let mut car = vehicle(VehicleKind::Human, 10, 2, &params(4, 0.5, 0.0));
    car.decide(10, 2, &mut ScriptedRandom::new(&[0.1]));
    assert_eq!(car.velocity(), 2);
}

#[test]
fn test_pending_latch_releases_regardless_of_slow_probability() {
    let mut car = vehicle(VehicleKind::Human, 10, 0, &params(4, 0.0, 1.0));
    car.slow_to_start_pending = true;

    let mut rng = ScriptedRandom::new(&[0.0]);
    car.decide(5, 0, &mut rng);

    assert_eq!(car.velocity(), 1);
    assert!(!car.slow_to_start_pending);
    // Releasing the latch makes no draw
    assert_eq!(rng.remaining(), 1);
}

#[test]
fn test_slow_to_start_delays_one_tick() {
    let mut car = vehicle(VehicleKind::Human, 10, 0, &params(4, 0.0, 1.0));
    let mut rng = ScriptedRandom::quiet();

    car.decide(5, 0, &mut rng);
    assert_eq!(car.velocity(), 0);
    assert!(car.slow_to_start_pending);

    car.decide(5, 0, &mut rng);
    assert_eq!(car.velocity(), 1);
    assert!(!car.slow_to_start_pending);
}

#[test]
fn test_start_without_delay() {
    let mut car = vehicle(VehicleKind::Human, 10, 0, &params(4, 0.0, 0.0));
    car.decide(5, 0, &mut ScriptedRandom::quiet());
    assert_eq!(car.velocity(), 1);
    assert!(!car.slow_to_start_pending);
}

#[test]
fn test_blocked_vehicle_stays_and_clears_latch() {
    let mut car = human(0);
    car.slow_to_start_pending = true;
    car.decide(1, 0, &mut ScriptedRandom::quiet());
    assert_eq!(car.velocity(), 0);
    assert!(!car.slow_to_start_pending);
}

#[test]
fn test_acc_pid_decelerates_when_too_close() {
    let mut car = acc(3);
    car.pid = PidState {
        last_error: 1.0,
        integral_error: 2.0,
    };

    // desired gap 7, error 3 - 0.5 = 2.5, control 1.25 + 0.2 * 1.5 = 1.55
    car.decide(4, 2, &mut ScriptedRandom::quiet());

    assert_eq!(car.velocity(), 2);
    assert_eq!(car.pid.last_error, 2.5);
    assert_eq!(car.pid.integral_error, 4.5);
}

#[test]
fn test_acc_pid_accelerates_with_large_gap() {
    let mut car = acc(2);

    // desired gap 5, error -5 + 0.5 * 2 = -4, control -2.8
    car.decide(10, 4, &mut ScriptedRandom::quiet());

    assert_eq!(car.velocity(), 3);
    assert_eq!(car.pid.last_error, -4.0);
    assert_eq!(car.pid.integral_error, -4.0);
}

#[test]
fn test_acc_holds_at_desired_gap() {
    let mut car = acc(2);
    car.decide(5, 2, &mut ScriptedRandom::quiet());
    assert_eq!(car.velocity(), 2);
    assert_eq!(car.pid.last_error, 0.0);
}

#[test]
fn test_acc_never_exceeds_target_speed() {
    let mut car = acc(4);
    car.decide(50, 4, &mut ScriptedRandom::quiet());
    assert_eq!(car.velocity(), 4);
    assert_eq!(car.velocity(), car.target_speed());
}

#[test]
fn test_acc_limited_by_gap_ahead() {
    let mut car = acc(4);
    car.decide(1, 0, &mut ScriptedRandom::quiet());
    assert_eq!(car.velocity(), 1);
}

#[test]
fn test_acc_fault_probability_is_reduced() {
    let mut car = vehicle(VehicleKind::AdaptiveCruise, 10, 2, &params(4, 1.0, 0.0));

    // 0.02 is above 1% of the fault probability
    car.decide(5, 2, &mut ScriptedRandom::new(&[0.02]));
    assert_eq!(car.velocity(), 2);

    car.decide(5, 2, &mut ScriptedRandom::new(&[0.005]));
    assert_eq!(car.velocity(), 1);
}

#[test]
fn test_acc_uses_standstill_latch() {
    let mut car = vehicle(VehicleKind::AdaptiveCruise, 10, 0, &params(4, 0.0, 1.0));
    car.slow_to_start_pending = true;
    car.decide(5, 3, &mut ScriptedRandom::quiet());

    assert_eq!(car.velocity(), 1);
    assert_eq!(car.pid, PidState::default());
}

#[test]
fn test_move_wraps_and_tracks_statistics() {
    let mut car = vehicle(VehicleKind::Human, 98, 4, &params(4, 0.0, 0.0));
    car.move_forward();
    assert_eq!(car.position(), 2);
    assert_eq!(car.total_distance, 4);
    assert_eq!(car.stop_count, 0);

    // Blocked by a leader in the next cell
    car.decide(0, 0, &mut ScriptedRandom::quiet());
    assert_eq!(car.velocity(), 0);
    car.move_forward();
    assert_eq!(car.position(), 2);
    assert_eq!(car.stop_count, 1);
    assert_eq!(car.ticks_elapsed, 2);
}

#[test]
fn test_behavior_probabilities_must_sum_to_one() {
    let bad = VehicleParams {
        behavior: BehaviorMix::new(0.5, 0.5, 0.5),
        ..params(4, 0.1, 0.5)
    };
    let result = Vehicle::new(
        VehicleId(0),
        VehicleKind::Human,
        0,
        1,
        10,
        &bad,
        &mut SeededRandom::new(1),
    );
    assert!(matches!(result, Err(ConfigError::BehaviorMix { .. })));
}

#[test]
fn test_negative_behavior_probability_rejected() {
    let bad = VehicleParams {
        behavior: BehaviorMix::new(-0.2, 0.2, 1.0),
        ..params(4, 0.1, 0.5)
    };
    let result = Vehicle::new(
        VehicleId(0),
        VehicleKind::Human,
        0,
        1,
        10,
        &bad,
        &mut SeededRandom::new(1),
    );
    assert!(matches!(result, Err(ConfigError::Probability { .. })));
}

#[test]
fn test_position_outside_road_rejected() {
    let result = Vehicle::new(
        VehicleId(0),
        VehicleKind::Human,
        10,
        1,
        10,
        &params(4, 0.1, 0.5),
        &mut SeededRandom::new(1),
    );
    assert_eq!(
        result.unwrap_err(),
        ConfigError::Position {
            position: 10,
            length: 10
        }
    );
}

#[test]
fn test_speed_offsets_follow_behavior_class() {
    let mut rng = SeededRandom::new(7);
    let cases = [
        (BehaviorMix::new(1.0, 0.0, 0.0), BehaviorClass::Faster, [1, 2]),
        (BehaviorMix::new(0.0, 1.0, 0.0), BehaviorClass::Slower, [-1, -2]),
    ];

    for (mix, class, offsets) in cases {
        let vehicle_params = VehicleParams {
            behavior: mix,
            ..params(4, 0.1, 0.5)
        };
        for _ in 0..20 {
            let car = Vehicle::new(
                VehicleId(0),
                VehicleKind::Human,
                0,
                1,
                10,
                &vehicle_params,
                &mut rng,
            )
            .unwrap();
            assert_eq!(car.behavior(), class);
            assert!(offsets.contains(&car.speed_offset()));
            assert_eq!(
                car.effective_max_speed() as i32,
                4 + car.speed_offset()
            );
        }
    }
}

#[test]
fn test_acc_ignores_behavior_mix() {
    let vehicle_params = VehicleParams {
        behavior: BehaviorMix::new(1.0, 0.0, 0.0),
        ..params(4, 0.1, 0.5)
    };
    let car = Vehicle::new(
        VehicleId(0),
        VehicleKind::AdaptiveCruise,
        0,
        1,
        10,
        &vehicle_params,
        &mut SeededRandom::new(3),
    )
    .unwrap();
    assert_eq!(car.speed_offset(), 0);
    assert_eq!(car.effective_max_speed(), 4);
    assert!(car.is_acc());
}

#[test]
fn test_initial_velocity_capped_by_effective_max() {
    let slower = VehicleParams {
        behavior: BehaviorMix::new(0.0, 1.0, 0.0),
        ..params(4, 0.1, 0.5)
    };
    let car = Vehicle::new(
        VehicleId(0),
        VehicleKind::Human,
        0,
        4,
        10,
        &slower,
        &mut ScriptedRandom::quiet(),
    )
    .unwrap();
    assert_eq!(car.speed_offset(), -1);
    assert_eq!(car.velocity(), 3);
}

#[test]
fn test_effective_max_speed_floor() {
    let slower = VehicleParams {
        behavior: BehaviorMix::new(0.0, 1.0, 0.0),
        ..params(1, 0.0, 0.0)
    };
    let car = Vehicle::new(
        VehicleId(0),
        VehicleKind::Human,
        0,
        1,
        10,
        &slower,
        &mut ScriptedRandom::quiet(),
    )
    .unwrap();
    assert_eq!(car.effective_max_speed(), 1);
}
