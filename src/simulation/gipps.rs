//! Gipps model stepper
//!
//! Advances the follower with Gipps' two-candidate speed rule: a free-flow
//! speed from a fixed acceleration profile and a car-following speed from
//! the safety-distance constraint, taking whichever is lower. The update
//! looks one step back, so the scan starts at `t = 1`.

use super::types::{FollowerState, KinematicBuffers, LeaderTrajectory};

/// Behavioral parameters for the Gipps model, constant for a whole run
#[derive(Debug, Clone)]
pub struct GippsParams {
    /// Simulation timestep duration in seconds
    pub resolution: f64,
    /// Driver reaction time in seconds
    pub tau: f64,
    /// Maximum acceleration in m/s^2
    pub an: f64,
    /// Apparent (most severe comfortable) deceleration in m/s^2, negative
    pub bn_const: f64,
    /// Desired speed in m/s
    pub vn_desired: f64,
    /// Assumed maximum deceleration of the leader in m/s^2, negative
    pub bcap: f64,
    /// Leader vehicle length in m
    pub ln1: f64,
}

impl GippsParams {
    /// Literature-typical parameter set for a passenger car
    pub fn typical(resolution: f64) -> Self {
        Self {
            resolution,
            tau: 1.0,
            an: 1.5,
            bn_const: -2.0,
            vn_desired: 30.0,
            bcap: -3.0,
            ln1: 5.0,
        }
    }
}

/// Complete Gipps trajectory table, one entry per timestep
#[derive(Debug, Clone)]
pub struct GippsRecord {
    /// Follower vehicle number, echoed from the caller
    pub fvn: u32,
    /// Clock column
    pub time: Vec<f64>,
    /// Leader position
    pub xn1: Vec<f64>,
    /// Leader speed, exactly as supplied by the caller
    pub vn1: Vec<f64>,
    /// Leader length
    pub ln1: f64,
    /// Realized acceleration, derived from the speed change
    pub bn: Vec<f64>,
    /// Follower position
    pub xn: Vec<f64>,
    /// Follower speed
    pub vn: Vec<f64>,
    /// Spacing, signed and gross of the leader's length
    pub sn: Vec<f64>,
    /// Speed difference (follower minus leader)
    pub deltav: Vec<f64>,
    /// Free-flow candidate speed
    pub vn_ff: Vec<f64>,
    /// Car-following candidate speed
    pub vn_cf: Vec<f64>,
}

impl GippsRecord {
    /// Number of timesteps in the record
    pub fn time_length(&self) -> usize {
        self.vn.len()
    }

    /// Column header matching [`GippsRecord::row`]
    pub fn header() -> String {
        format!(
            "{:>5} {:>8} {:>10} {:>8} {:>6} {:>8} {:>10} {:>8} {:>9} {:>8} {:>8} {:>8}",
            "fvn", "Time", "xn1", "vn1", "ln1", "bn", "xn", "vn", "sn", "deltav", "vn_ff", "vn_cf"
        )
    }

    /// One formatted table row
    pub fn row(&self, t: usize) -> String {
        format!(
            "{:>5} {:>8.2} {:>10.3} {:>8.3} {:>6.2} {:>8.3} {:>10.3} {:>8.3} {:>9.3} {:>8.3} {:>8.3} {:>8.3}",
            self.fvn,
            self.time[t],
            self.xn1[t],
            self.vn1[t],
            self.ln1,
            self.bn[t],
            self.xn[t],
            self.vn[t],
            self.sn[t],
            self.deltav[t],
            self.vn_ff[t],
            self.vn_cf[t]
        )
    }
}

/// Run the Gipps model over the full leader trajectory.
///
/// Seeds the follower buffers from `start` at index 0 and fills every index
/// up to `time_length - 2`; the scan reads one step back at every `t`, so
/// the final index is left unwritten.
///
/// Two quirks of this formulation are kept deliberately:
/// - the radicand of the car-following formula is unguarded, so a closed-up
///   gap can make it negative and the resulting NaN speed propagates through
///   every later speed, position, and spacing value;
/// - spacing is the signed position difference with no leader-length
///   subtraction, unlike the IDM and Wiedemann74 formulations.
///
/// A missing (NaN) leader speed at `t - 1` is read as zero for that step
/// only. The substitution happens on a local copy; the caller's array and
/// the returned `vn1` column keep the original NaN.
pub fn simulate(
    params: &GippsParams,
    leader: &LeaderTrajectory,
    start: &FollowerState,
    fvn: u32,
) -> GippsRecord {
    let time_length = leader.time_length();
    let dt = params.resolution;

    let mut state = KinematicBuffers::seeded(time_length, start);
    let mut vn_ff = vec![f64::NAN; time_length];
    let mut vn_cf = vec![f64::NAN; time_length];
    let mut bn = vec![f64::NAN; time_length];

    for t in 1..time_length.saturating_sub(1) {
        // free-flow candidate: fixed acceleration profile toward the
        // desired speed
        vn_ff[t] = state.vn[t - 1]
            + (2.5 * params.an * params.tau * (1.0 - state.vn[t - 1] / params.vn_desired))
                * (0.025 + (state.vn[t - 1] / params.vn_desired).sqrt());

        // missing leader speed reads as zero for this step only
        let vn1_prev = if leader.vn1[t - 1].is_nan() {
            0.0
        } else {
            leader.vn1[t - 1]
        };

        // car-following candidate from the safety-distance constraint;
        // the radicand is unguarded and may go negative
        vn_cf[t] = params.bn_const * params.tau
            + ((params.bn_const.powi(2) * params.tau.powi(2))
                - params.bn_const
                    * (2.0 * (leader.xn1[t - 1] - params.ln1 - state.xn[t - 1])
                        - state.vn[t - 1] * params.tau
                        - vn1_prev.powi(2) / params.bcap))
                .sqrt();

        // the follower never exceeds either candidate; the explicit
        // comparison sends a NaN free-flow candidate to the else branch
        if vn_ff[t] < vn_cf[t] {
            state.vn[t] = vn_ff[t];
        } else {
            state.vn[t] = vn_cf[t];
        }

        // floored at zero; the branch lets NaN pass through
        if state.vn[t] < 0.0 {
            state.vn[t] = 0.0;
        }

        // realized acceleration over the step, written one index back
        bn[t - 1] = (state.vn[t] - state.vn[t - 1]) / dt;

        // position from the previous speed and the realized acceleration
        state.xn[t] = state.xn[t - 1] + state.vn[t - 1] * dt + 0.5 * bn[t - 1] * dt.powi(2);

        // spacing: signed, gross of the leader's length
        state.sn[t] = leader.xn1[t] - state.xn[t];

        // speed difference
        state.deltav[t] = state.vn[t] - leader.vn1[t];
    }

    GippsRecord {
        fvn,
        time: leader.time.clone(),
        xn1: leader.xn1.clone(),
        vn1: leader.vn1.clone(),
        ln1: params.ln1,
        bn,
        xn: state.xn,
        vn: state.vn,
        sn: state.sn,
        deltav: state.deltav,
        vn_ff,
        vn_cf,
    }
}
