//! Core types for the car-following simulation
//!
//! These are standalone leaf types shared by the three stepping models.

use std::fmt;

/// The lead vehicle's trajectory, supplied by the caller.
///
/// All arrays are indexed by timestep and must share one length. The engine
/// treats this data as read-only for the whole run; missing samples are
/// represented as IEEE NaN and flow through the model formulas unchanged.
#[derive(Debug, Clone)]
pub struct LeaderTrajectory {
    /// Clock column, echoed into the IDM and Gipps records
    pub time: Vec<f64>,
    /// Leader position at each timestep
    pub xn1: Vec<f64>,
    /// Leader speed at each timestep
    pub vn1: Vec<f64>,
}

impl LeaderTrajectory {
    pub fn new(time: Vec<f64>, xn1: Vec<f64>, vn1: Vec<f64>) -> Self {
        Self { time, xn1, vn1 }
    }

    /// Number of timesteps in the run
    pub fn time_length(&self) -> usize {
        self.xn1.len()
    }
}

/// Seed state of the follower at the starting index.
///
/// `sn` and `deltav` may be NaN to mean "not observed yet"; the steppers
/// treat that as a missing value, not an error.
#[derive(Debug, Clone, Copy)]
pub struct FollowerState {
    /// Follower position
    pub xn: f64,
    /// Follower speed
    pub vn: f64,
    /// Spacing to the leader
    pub sn: f64,
    /// Speed difference (follower minus leader)
    pub deltav: f64,
}

impl FollowerState {
    pub fn new(xn: f64, vn: f64, sn: f64, deltav: f64) -> Self {
        Self { xn, vn, sn, deltav }
    }
}

/// Fixed-length, time-indexed state arrays for one follower.
///
/// Allocated NaN-filled, seeded at index 0, then written by exactly one
/// sequential scan. Each stepper moves these into its returned record when
/// the scan completes; no resizing ever happens.
#[derive(Debug, Clone)]
pub struct KinematicBuffers {
    /// Follower position
    pub xn: Vec<f64>,
    /// Follower speed
    pub vn: Vec<f64>,
    /// Spacing to the leader
    pub sn: Vec<f64>,
    /// Speed difference (follower minus leader)
    pub deltav: Vec<f64>,
}

impl KinematicBuffers {
    /// Allocate buffers for `time_length` steps, seeded at index 0
    pub fn seeded(time_length: usize, start: &FollowerState) -> Self {
        let mut buffers = Self {
            xn: vec![f64::NAN; time_length],
            vn: vec![f64::NAN; time_length],
            sn: vec![f64::NAN; time_length],
            deltav: vec![f64::NAN; time_length],
        };

        if time_length > 0 {
            buffers.xn[0] = start.xn;
            buffers.vn[0] = start.vn;
            buffers.sn[0] = start.sn;
            buffers.deltav[0] = start.deltav;
        }

        buffers
    }
}

/// Driving regime classified by the Wiedemann74 model at each timestep
///
/// The label selects which acceleration sub-formula governs a step and is
/// reported as an output annotation; it carries no further state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    /// No interaction with the leader; free-road acceleration applies
    FreeDriving,
    /// Closing in on the leader; perception-threshold braking applies
    Approaching,
    /// Inside the following envelope; small oscillating acceleration
    Following,
    /// Below the action-point distance; maximum braking applies
    EmergencyBraking,
}

impl Regime {
    /// The label string used in the output table
    pub fn as_str(&self) -> &'static str {
        match self {
            Regime::FreeDriving => "free_driving",
            Regime::Approaching => "approaching",
            Regime::Following => "following",
            Regime::EmergencyBraking => "emergency_braking",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
