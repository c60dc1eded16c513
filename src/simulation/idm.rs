//! Intelligent Driver Model (IDM) stepper
//!
//! Advances the follower with the IDM acceleration rule: free-road
//! acceleration toward the desired speed, reduced by a desired-spacing
//! interaction term whenever the spacing to the leader is defined.

use super::types::{FollowerState, KinematicBuffers, LeaderTrajectory};

/// Behavioral parameters for the IDM, constant for a whole run
#[derive(Debug, Clone)]
pub struct IdmParams {
    /// Simulation timestep duration in seconds
    pub resolution: f64,
    /// Jam spacing (minimum bumper-to-bumper gap at standstill) in m
    pub s0: f64,
    /// Desired time gap to the leader in seconds
    pub tg: f64,
    /// Comfortable acceleration in m/s^2
    pub a: f64,
    /// Comfortable deceleration in m/s^2, as a positive magnitude
    pub b: f64,
    /// Desired speed in m/s
    pub v0: f64,
    /// Acceleration exponent
    pub delta: f64,
    /// Leader vehicle length in m
    pub ln1: f64,
}

impl IdmParams {
    /// Literature-typical parameter set for a passenger car
    pub fn typical(resolution: f64) -> Self {
        Self {
            resolution,
            s0: 2.0,
            tg: 1.5,
            a: 1.0,
            b: 1.5,
            v0: 30.0,
            delta: 4.0,
            ln1: 5.0,
        }
    }
}

/// Complete IDM trajectory table, one entry per timestep
#[derive(Debug, Clone)]
pub struct IdmRecord {
    /// Follower vehicle number, echoed from the caller
    pub fvn: u32,
    /// Clock column
    pub time: Vec<f64>,
    /// Leader position
    pub xn1: Vec<f64>,
    /// Leader speed
    pub vn1: Vec<f64>,
    /// Leader length
    pub ln1: f64,
    /// Desired spacing
    pub sn_star: Vec<f64>,
    /// Follower acceleration
    pub v_dot: Vec<f64>,
    /// Follower position
    pub xn: Vec<f64>,
    /// Follower speed
    pub vn: Vec<f64>,
    /// Spacing, net of the leader's length
    pub sn: Vec<f64>,
    /// Speed difference (follower minus leader)
    pub deltav: Vec<f64>,
}

impl IdmRecord {
    /// Number of timesteps in the record
    pub fn time_length(&self) -> usize {
        self.vn.len()
    }

    /// Column header matching [`IdmRecord::row`]
    pub fn header() -> String {
        format!(
            "{:>5} {:>8} {:>10} {:>8} {:>6} {:>9} {:>8} {:>10} {:>8} {:>9} {:>8}",
            "fvn", "Time", "xn1", "vn1", "ln1", "sn_star", "v_dot", "xn", "vn", "sn", "deltav"
        )
    }

    /// One formatted table row
    pub fn row(&self, t: usize) -> String {
        format!(
            "{:>5} {:>8.2} {:>10.3} {:>8.3} {:>6.2} {:>9.3} {:>8.3} {:>10.3} {:>8.3} {:>9.3} {:>8.3}",
            self.fvn,
            self.time[t],
            self.xn1[t],
            self.vn1[t],
            self.ln1,
            self.sn_star[t],
            self.v_dot[t],
            self.xn[t],
            self.vn[t],
            self.sn[t],
            self.deltav[t]
        )
    }
}

/// Run the IDM over the full leader trajectory.
///
/// Seeds the follower buffers from `start` at index 0 and fills every later
/// index. The returned record is freshly allocated; neither `leader` nor
/// `start` is mutated.
pub fn simulate(
    params: &IdmParams,
    leader: &LeaderTrajectory,
    start: &FollowerState,
    fvn: u32,
) -> IdmRecord {
    let time_length = leader.time_length();
    let dt = params.resolution;

    let mut state = KinematicBuffers::seeded(time_length, start);
    let mut sn_star = vec![f64::NAN; time_length];
    let mut v_dot = vec![f64::NAN; time_length];

    for t in 0..time_length.saturating_sub(1) {
        // desired spacing; a large negative closing term falls back to the
        // jam spacing, a NaN term keeps sn_star undefined
        let gap_term = state.vn[t] * params.tg
            + (state.vn[t] * state.deltav[t]) / (2.0 * (params.a * params.b).sqrt());

        if gap_term < 0.0 {
            sn_star[t] = params.s0;
        } else {
            sn_star[t] = params.s0 + gap_term;
        }

        // acceleration rate: free-road only while desired spacing is undefined
        if sn_star[t].is_nan() {
            v_dot[t] = params.a * (1.0 - (state.vn[t] / params.v0).powf(params.delta));
        } else {
            v_dot[t] = params.a
                * (1.0
                    - (state.vn[t] / params.v0).powf(params.delta)
                    - (sn_star[t] / state.sn[t]).powi(2));
        }

        // bounded deceleration
        if v_dot[t] < -params.b {
            v_dot[t] = -params.b;
        }

        // speed, floored at zero; the branch lets NaN pass through
        state.vn[t + 1] = state.vn[t] + v_dot[t] * dt;
        if state.vn[t + 1] < 0.0 {
            state.vn[t + 1] = 0.0;
        }

        // position
        state.xn[t + 1] = state.xn[t] + state.vn[t] * dt + 0.5 * v_dot[t] * dt.powi(2);

        // spacing, net of the leader's length
        state.sn[t + 1] = (leader.xn1[t + 1] - state.xn[t + 1]).abs() - params.ln1;

        // speed difference
        state.deltav[t + 1] = state.vn[t + 1] - leader.vn1[t + 1];
    }

    IdmRecord {
        fvn,
        time: leader.time.clone(),
        xn1: leader.xn1.clone(),
        vn1: leader.vn1.clone(),
        ln1: params.ln1,
        sn_star,
        v_dot,
        xn: state.xn,
        vn: state.vn,
        sn: state.sn,
        deltav: state.deltav,
    }
}
