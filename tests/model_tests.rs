//! Scenario and property tests for the three car-following models,
//! exercised through the public simulation API.

use car_following::simulation::{
    gipps, idm, wiedemann, FollowerState, GippsParams, IdmParams, LeaderTrajectory, Regime,
    Wiedemann74Params,
};

/// A leader parked at a fixed position
fn stationary_leader(steps: usize, dt: f64, position: f64) -> LeaderTrajectory {
    let time = (0..steps).map(|t| t as f64 * dt).collect();
    LeaderTrajectory::new(time, vec![position; steps], vec![0.0; steps])
}

/// A leader cruising at a constant speed
fn constant_speed_leader(steps: usize, dt: f64, x0: f64, speed: f64) -> LeaderTrajectory {
    let time: Vec<f64> = (0..steps).map(|t| t as f64 * dt).collect();
    let xn1 = time.iter().map(|t| x0 + speed * t).collect();
    LeaderTrajectory::new(time, xn1, vec![speed; steps])
}

fn idm_scenario_params() -> IdmParams {
    IdmParams {
        resolution: 0.1,
        s0: 2.0,
        tg: 1.5,
        a: 1.0,
        b: 1.5,
        v0: 30.0,
        delta: 4.0,
        ln1: 5.0,
    }
}

/// Follower launching from standstill toward a leader parked far ahead:
/// the first step is pure free-road acceleration and the speed climbs
/// toward the desired speed without reaching it.
#[test]
fn idm_free_road_launch() {
    let params = idm_scenario_params();
    let leader = stationary_leader(80, params.resolution, 105.0);
    // spacing observed, speed difference not yet
    let start = FollowerState::new(0.0, 0.0, 100.0, f64::NAN);

    let record = idm::simulate(&params, &leader, &start, 1);

    // standstill with an undefined speed difference leaves sn_star
    // undefined, so the free-road rule applies exactly
    assert!(record.sn_star[0].is_nan());
    assert_eq!(record.v_dot[0], 1.0);

    for t in 0..79 {
        assert!(
            record.vn[t + 1] > record.vn[t],
            "speed not increasing at t={}",
            t
        );
    }
    for t in 0..80 {
        assert!(record.vn[t] < 30.0, "desired speed exceeded at t={}", t);
    }
}

/// IDM deceleration is clamped at -b and the speed floor holds even when
/// the follower charges at a parked leader.
#[test]
fn idm_harsh_braking_respects_bounds() {
    let params = idm_scenario_params();
    let leader = stationary_leader(200, params.resolution, 15.0);
    let start = FollowerState::new(0.0, 20.0, 10.0, 20.0);

    let record = idm::simulate(&params, &leader, &start, 1);

    for t in 0..199 {
        assert!(record.v_dot[t] >= -params.b, "v_dot below -b at t={}", t);
    }
    for t in 0..200 {
        assert!(record.vn[t] >= 0.0, "negative speed at t={}", t);
    }
}

/// IDM spacing is the absolute position difference net of leader length at
/// every computed step.
#[test]
fn idm_spacing_formula() {
    let params = idm_scenario_params();
    let leader = constant_speed_leader(100, params.resolution, 60.0, 15.0);
    let start = FollowerState::new(0.0, 18.0, 55.0, 3.0);

    let record = idm::simulate(&params, &leader, &start, 1);

    for t in 1..100 {
        assert_eq!(
            record.sn[t],
            (record.xn1[t] - record.xn[t]).abs() - record.ln1
        );
    }
}

fn gipps_scenario_params() -> GippsParams {
    GippsParams {
        resolution: 1.0,
        tau: 1.0,
        an: 1.5,
        bn_const: -2.0,
        vn_desired: 30.0,
        bcap: -3.0,
        ln1: 5.0,
    }
}

/// With a leader far ahead at constant speed, the free-flow candidate
/// governs at every step while the safety constraint stays slack.
#[test]
fn gipps_free_flow_governs_with_large_gap() {
    let params = gipps_scenario_params();
    let leader = constant_speed_leader(40, params.resolution, 500.0, 20.0);
    let start = FollowerState::new(0.0, 10.0, 500.0, -10.0);

    let record = gipps::simulate(&params, &leader, &start, 1);

    for t in 1..39 {
        assert_eq!(record.vn[t], record.vn_ff[t], "free flow not governing at t={}", t);
        assert!(record.vn_cf[t] > record.vn_ff[t], "safety constraint tight at t={}", t);
    }
}

/// The selected speed is the lesser candidate whenever both are numeric.
#[test]
fn gipps_selection_rule() {
    let params = gipps_scenario_params();
    let leader = constant_speed_leader(60, params.resolution, 300.0, 5.0);
    let start = FollowerState::new(0.0, 15.0, 300.0, 10.0);

    let record = gipps::simulate(&params, &leader, &start, 1);

    for t in 1..59 {
        if record.vn_ff[t].is_nan() || record.vn_cf[t].is_nan() {
            continue;
        }
        assert_eq!(record.vn[t], record.vn_ff[t].min(record.vn_cf[t]));
        assert!(record.vn[t] >= 0.0);
    }
}

/// Gipps spacing is the signed position difference with no leader-length
/// term, unlike the other two models.
#[test]
fn gipps_spacing_formula() {
    let params = gipps_scenario_params();
    let leader = constant_speed_leader(40, params.resolution, 200.0, 12.0);
    let start = FollowerState::new(0.0, 12.0, 200.0, 0.0);

    let record = gipps::simulate(&params, &leader, &start, 1);

    for t in 1..39 {
        assert_eq!(record.sn[t], record.xn1[t] - record.xn[t]);
    }
}

/// A closed-up gap makes the car-following radicand negative; the NaN it
/// produces is not intercepted and poisons the rest of the run.
#[test]
fn gipps_negative_radicand_propagates_nan() {
    let params = gipps_scenario_params();
    let leader = stationary_leader(6, params.resolution, 5.0);
    // follower sitting right at the leader's rear bumper, still moving
    let start = FollowerState::new(0.0, 5.0, 5.0, 5.0);

    let record = gipps::simulate(&params, &leader, &start, 1);

    assert!(record.vn_cf[1].is_nan());
    assert!(record.vn[1].is_nan());
    assert!(record.xn[1].is_nan());
    assert!(record.sn[1].is_nan());
    // and every later step inherits the poison
    for t in 2..5 {
        assert!(record.vn[t].is_nan(), "NaN did not propagate to t={}", t);
        assert!(record.xn[t].is_nan(), "NaN did not propagate to t={}", t);
    }
}

/// A missing leader speed is read as zero for the affected step without
/// touching the caller's data; the returned vn1 column keeps the NaN.
#[test]
fn gipps_missing_leader_speed_is_read_as_zero() {
    let params = gipps_scenario_params();
    let mut leader = constant_speed_leader(10, params.resolution, 400.0, 20.0);
    leader.vn1[0] = f64::NAN;
    let start = FollowerState::new(0.0, 10.0, 400.0, f64::NAN);

    let record = gipps::simulate(&params, &leader, &start, 1);

    // caller's array survives, NaN included
    assert!(leader.vn1[0].is_nan());
    assert!(record.vn1[0].is_nan());
    // the substituted zero keeps the car-following candidate numeric
    assert!(!record.vn_cf[1].is_nan());
    assert!(!record.vn[1].is_nan());
}

fn wiedemann_scenario_params() -> Wiedemann74Params {
    Wiedemann74Params {
        d_max: 150.0,
        bx_add: 2.5,
        ax: 7.0,
        cx: 40.0,
        ex: 1.5,
        opdv_add: 1.5,
        bmax_mult: 0.05,
        v_max: 60.0,
        faktor_v: 1.17,
        bmin: -5.0,
        bnull: 0.25,
        resolution: 0.1,
    }
}

/// With the leader's speed never observed, every classified step is free
/// driving and the acceleration follows the free-road profile exactly.
#[test]
fn wiedemann_missing_leader_speed_is_free_driving() {
    let params = wiedemann_scenario_params();
    let steps = 30;
    let time = (0..steps).map(|t| t as f64 * params.resolution).collect();
    let leader = LeaderTrajectory::new(
        time,
        (0..steps).map(|t| 200.0 + t as f64).collect(),
        vec![f64::NAN; steps],
    );
    let leader_accel = vec![0.0; steps];
    let start = FollowerState::new(0.0, 12.0, f64::NAN, f64::NAN);

    let record = wiedemann::simulate(&params, &leader, &leader_accel, &start);

    for t in 0..steps - 1 {
        assert_eq!(record.cf_state_sim[t], Some(Regime::FreeDriving));
        assert_eq!(
            record.bn[t],
            params.bmax_mult * (params.v_max - record.vn[t] * params.faktor_v)
        );
    }
    assert_eq!(record.cf_state_sim[steps - 1], None);
}

/// Wiedemann74 spacing is the absolute position difference with no length
/// term, and the speed floor holds through a hard leader stop.
#[test]
fn wiedemann_braking_leader_scenario() {
    let params = wiedemann_scenario_params();
    let steps = 300;
    let dt = params.resolution;

    // leader cruises at 15 m/s then brakes to a stop at 3 m/s^2
    let mut vn1 = vec![0.0; steps];
    let mut xn1 = vec![0.0; steps];
    let mut bn1 = vec![0.0; steps];
    let mut speed = 15.0_f64;
    xn1[0] = 40.0;
    for t in 0..steps {
        vn1[t] = speed;
        if t + 1 < steps {
            let next = if t > 100 { (speed - 3.0 * dt).max(0.0) } else { speed };
            bn1[t] = (next - speed) / dt;
            xn1[t + 1] = xn1[t] + speed * dt;
            speed = next;
        }
    }
    let time = (0..steps).map(|t| t as f64 * dt).collect();
    let leader = LeaderTrajectory::new(time, xn1, vn1);
    let start = FollowerState::new(0.0, 15.0, 40.0, 0.0);

    let record = wiedemann::simulate(&params, &leader, &bn1, &start);

    for t in 0..steps {
        assert!(record.vn[t] >= 0.0, "negative speed at t={}", t);
        assert!(!record.vn[t].is_nan(), "speed went missing at t={}", t);
    }
    for t in 1..steps {
        assert_eq!(record.sn[t], (record.xn1[t] - record.xn[t]).abs());
    }
    // the stop phase must actually engage the braking regimes
    assert!(record
        .cf_state_sim
        .iter()
        .any(|state| *state == Some(Regime::Approaching)));
}

/// Identical inputs produce bit-identical tables for every model.
#[test]
fn runs_are_deterministic() {
    fn bits(values: &[f64]) -> Vec<u64> {
        values.iter().map(|v| v.to_bits()).collect()
    }

    let idm_params = idm_scenario_params();
    let leader = constant_speed_leader(120, idm_params.resolution, 70.0, 14.0);
    let start = FollowerState::new(0.0, 18.0, 65.0, 4.0);
    let first = idm::simulate(&idm_params, &leader, &start, 1);
    let second = idm::simulate(&idm_params, &leader, &start, 1);
    assert_eq!(bits(&first.vn), bits(&second.vn));
    assert_eq!(bits(&first.xn), bits(&second.xn));
    assert_eq!(bits(&first.sn_star), bits(&second.sn_star));

    let gipps_params = gipps_scenario_params();
    let leader = constant_speed_leader(50, gipps_params.resolution, 300.0, 10.0);
    let start = FollowerState::new(0.0, 12.0, 300.0, 2.0);
    let first = gipps::simulate(&gipps_params, &leader, &start, 1);
    let second = gipps::simulate(&gipps_params, &leader, &start, 1);
    assert_eq!(bits(&first.vn), bits(&second.vn));
    assert_eq!(bits(&first.vn_cf), bits(&second.vn_cf));

    let w74_params = wiedemann_scenario_params();
    let leader = constant_speed_leader(50, w74_params.resolution, 60.0, 10.0);
    let leader_accel = vec![0.0; 50];
    let start = FollowerState::new(0.0, 12.0, 60.0, 2.0);
    let first = wiedemann::simulate(&w74_params, &leader, &leader_accel, &start);
    let second = wiedemann::simulate(&w74_params, &leader, &leader_accel, &start);
    assert_eq!(bits(&first.vn), bits(&second.vn));
    assert_eq!(bits(&first.bn), bits(&second.bn));
    assert_eq!(first.cf_state_sim, second.cf_state_sim);
}
