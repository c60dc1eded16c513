//! Wiedemann74 psycho-physical stepper
//!
//! Classifies the follower's interaction with the leader into a driving
//! regime each timestep (free driving, approaching, following, emergency
//! braking) from perception thresholds, then applies the acceleration rule
//! of that regime. The largest of the three models because of the
//! threshold set and the regime decision tree.

use super::types::{FollowerState, KinematicBuffers, LeaderTrajectory, Regime};

/// Behavioral parameters for the Wiedemann74 model, constant for a whole run
#[derive(Debug, Clone)]
pub struct Wiedemann74Params {
    /// Maximum perception distance in m; no reaction beyond it
    pub d_max: f64,
    /// Multiplier on the square-root speed term of the perception threshold
    pub bx_add: f64,
    /// Desired standstill distance in m, gross of the leader's length
    pub ax: f64,
    /// Divisor of the closing-speed perception threshold
    pub cx: f64,
    /// Multiplier widening the following-distance threshold
    pub ex: f64,
    /// Multiplier setting the desired closing rate from the perception
    /// threshold
    pub opdv_add: f64,
    /// Slope of the free-road acceleration profile
    pub bmax_mult: f64,
    /// Maximum modeled speed in m/s
    pub v_max: f64,
    /// Speed weighting of the free-road acceleration profile
    pub faktor_v: f64,
    /// Maximum deceleration in m/s^2, negative
    pub bmin: f64,
    /// Magnitude of the oscillating acceleration while following, in m/s^2
    pub bnull: f64,
    /// Simulation timestep duration in seconds
    pub resolution: f64,
}

impl Wiedemann74Params {
    /// Literature-typical parameter set for a passenger car
    pub fn typical(resolution: f64) -> Self {
        Self {
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
            resolution,
        }
    }
}

/// Complete Wiedemann74 trajectory table, one entry per timestep
#[derive(Debug, Clone)]
pub struct Wiedemann74Record {
    /// Leader position
    pub xn1: Vec<f64>,
    /// Leader speed
    pub vn1: Vec<f64>,
    /// Follower acceleration chosen by the governing regime
    pub bn: Vec<f64>,
    /// Follower position
    pub xn: Vec<f64>,
    /// Follower speed
    pub vn: Vec<f64>,
    /// Spacing, gross of the leader's length
    pub sn: Vec<f64>,
    /// Speed difference (follower minus leader)
    pub deltav: Vec<f64>,
    /// Desired standstill distance
    pub ax: f64,
    /// Perception threshold on spacing
    pub bx: Vec<f64>,
    /// Action-point envelope
    pub abx: Vec<f64>,
    /// Closing-speed perception divisor
    pub cx: f64,
    /// Following-distance threshold
    pub sdx: Vec<f64>,
    /// Closing-speed perception threshold
    pub sdv: Vec<f64>,
    /// Closing perception threshold inside the following band
    pub cldv: Vec<f64>,
    /// Desired closing rate
    pub opdv: Vec<f64>,
    /// Free-road acceleration
    pub bmax: Vec<f64>,
    /// Approaching-regime braking, where computed
    pub b_app: Vec<f64>,
    /// Emergency-regime braking, where computed
    pub b_emg: Vec<f64>,
    /// Following-regime acceleration magnitude
    pub bnull: f64,
    /// Regime classified at each step; the final index is never classified
    pub cf_state_sim: Vec<Option<Regime>>,
}

impl Wiedemann74Record {
    /// Number of timesteps in the record
    pub fn time_length(&self) -> usize {
        self.vn.len()
    }

    /// Column header matching [`Wiedemann74Record::row`]
    pub fn header() -> String {
        format!(
            "{:>10} {:>8} {:>8} {:>10} {:>8} {:>9} {:>8} {:>6} {:>8} {:>8} {:>6} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>6} {:>18}",
            "xn1",
            "vn1",
            "bn",
            "xn",
            "vn",
            "sn",
            "deltav",
            "AX",
            "BX",
            "ABX",
            "CX",
            "SDX",
            "SDV",
            "CLDV",
            "OPDV",
            "BMAX",
            "B_App",
            "B_Emg",
            "BNULL",
            "cf_state_sim"
        )
    }

    /// One formatted table row
    pub fn row(&self, t: usize) -> String {
        format!(
            "{:>10.3} {:>8.3} {:>8.3} {:>10.3} {:>8.3} {:>9.3} {:>8.3} {:>6.2} {:>8.3} {:>8.3} {:>6.2} {:>8.3} {:>8.3} {:>8.3} {:>8.3} {:>8.3} {:>8.3} {:>8.3} {:>6.2} {:>18}",
            self.xn1[t],
            self.vn1[t],
            self.bn[t],
            self.xn[t],
            self.vn[t],
            self.sn[t],
            self.deltav[t],
            self.ax,
            self.bx[t],
            self.abx[t],
            self.cx,
            self.sdx[t],
            self.sdv[t],
            self.cldv[t],
            self.opdv[t],
            self.bmax[t],
            self.b_app[t],
            self.b_emg[t],
            self.bnull,
            self.cf_state_sim[t].map(|r| r.as_str()).unwrap_or("")
        )
    }
}

/// Run the Wiedemann74 model over the full leader trajectory.
///
/// `leader_accel` is the leader's per-step acceleration (`bn1`), read by the
/// braking formulas of the approaching and emergency regimes. Seeds the
/// follower buffers from `start` at index 0 and classifies a regime at every
/// index except the last, which stays unclassified.
///
/// When spacing equals the standstill distance or the action-point envelope
/// exactly, the braking formulas divide by zero and the resulting infinity
/// propagates; the model does not intercept it.
pub fn simulate(
    params: &Wiedemann74Params,
    leader: &LeaderTrajectory,
    leader_accel: &[f64],
    start: &FollowerState,
) -> Wiedemann74Record {
    let time_length = leader.time_length();
    let dt = params.resolution;

    let mut state = KinematicBuffers::seeded(time_length, start);
    let mut bx = vec![f64::NAN; time_length];
    let mut abx = vec![f64::NAN; time_length];
    let mut sdv = vec![f64::NAN; time_length];
    let mut sdx = vec![f64::NAN; time_length];
    let mut cldv = vec![f64::NAN; time_length];
    let mut opdv = vec![f64::NAN; time_length];
    let mut bmax = vec![f64::NAN; time_length];
    let mut bn = vec![f64::NAN; time_length];
    let mut b_app = vec![f64::NAN; time_length];
    let mut b_emg = vec![f64::NAN; time_length];
    let mut cf_state_sim: Vec<Option<Regime>> = vec![None; time_length];

    for t in 0..time_length.saturating_sub(1) {
        // perception threshold from the slower vehicle's speed; left
        // undefined when the speeds are exactly equal
        if state.vn[t] < leader.vn1[t] || leader.vn1[t].is_nan() {
            bx[t] = params.bx_add * state.vn[t].sqrt();
        } else if state.vn[t] > leader.vn1[t] {
            bx[t] = params.bx_add * leader.vn1[t].sqrt();
        }

        abx[t] = params.ax + bx[t];

        sdv[t] = ((state.sn[t] - params.ax) / params.cx).powi(2);

        sdx[t] = params.ax + params.ex * bx[t];

        cldv[t] = sdv[t] * params.ex.powi(2);

        opdv[t] = cldv[t] * (-params.opdv_add);

        if state.sn[t].is_nan() || state.deltav[t].is_nan() {
            // no observed interaction: free driving
            bmax[t] = params.bmax_mult * (params.v_max - state.vn[t] * params.faktor_v);

            bn[t] = bmax[t];

            cf_state_sim[t] = Some(Regime::FreeDriving);
        } else if state.sn[t] <= abx[t] {
            // inside the action-point envelope: emergency braking
            b_emg[t] = 0.5 * (state.deltav[t].powi(2) / (params.ax - state.sn[t]))
                + leader_accel[t]
                + params.bmin * ((abx[t] - state.sn[t]) / (abx[t] - params.ax));

            cf_state_sim[t] = Some(Regime::EmergencyBraking);

            if b_emg[t] < params.bmin || b_emg[t] > 0.0 {
                bn[t] = params.bmin;
            } else {
                bn[t] = b_emg[t];
            }
        } else if state.sn[t] < sdx[t] {
            if state.deltav[t] > cldv[t] {
                // closing faster than the perception threshold: approaching
                b_app[t] = 0.5 * (state.deltav[t].powi(2) / (abx[t] - state.sn[t]))
                    + leader_accel[t];

                if b_app[t] < params.bmin {
                    bn[t] = params.bmin;
                } else {
                    bn[t] = b_app[t];
                }

                cf_state_sim[t] = Some(Regime::Approaching);
            } else if state.deltav[t] > opdv[t] {
                // inside the following band: oscillate around the leader's
                // speed with a fixed small acceleration
                if state.deltav[t] < 0.0 {
                    bn[t] = params.bnull;
                } else {
                    bn[t] = -params.bnull;
                }

                cf_state_sim[t] = Some(Regime::Following);
            } else {
                bmax[t] = params.bmax_mult * (params.v_max - state.vn[t] * params.faktor_v);

                bn[t] = bmax[t];

                cf_state_sim[t] = Some(Regime::FreeDriving);
            }
        } else {
            if state.deltav[t] > sdv[t] && state.sn[t] < params.d_max {
                // perceptibly closing from beyond the following band
                b_app[t] = 0.5 * (state.deltav[t].powi(2) / (abx[t] - state.sn[t]))
                    + leader_accel[t];

                if b_app[t] < params.bmin {
                    bn[t] = params.bmin;
                } else {
                    bn[t] = b_app[t];
                }

                cf_state_sim[t] = Some(Regime::Approaching);
            } else {
                bmax[t] = params.bmax_mult * (params.v_max - state.vn[t] * params.faktor_v);

                bn[t] = bmax[t];

                cf_state_sim[t] = Some(Regime::FreeDriving);
            }
        }

        // speed, floored at zero; the branch lets NaN pass through
        state.vn[t + 1] = state.vn[t] + bn[t] * dt;
        if state.vn[t + 1] < 0.0 {
            state.vn[t + 1] = 0.0;
        }

        // position
        state.xn[t + 1] = state.xn[t] + state.vn[t] * dt + 0.5 * bn[t] * dt.powi(2);

        // spacing, gross of the leader's length
        state.sn[t + 1] = (leader.xn1[t + 1] - state.xn[t + 1]).abs();

        // speed difference
        state.deltav[t + 1] = state.vn[t + 1] - leader.vn1[t + 1];
    }

    Wiedemann74Record {
        xn1: leader.xn1.clone(),
        vn1: leader.vn1.clone(),
        bn,
        xn: state.xn,
        vn: state.vn,
        sn: state.sn,
        deltav: state.deltav,
        ax: params.ax,
        bx,
        abx,
        cx: params.cx,
        sdx,
        sdv,
        cldv,
        opdv,
        bmax,
        b_app,
        b_emg,
        bnull: params.bnull,
        cf_state_sim,
    }
}
