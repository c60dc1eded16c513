//! Standalone car-following simulation module
//!
//! This module contains the three stepping models and their shared leaf
//! types. Each model is a pure function over one follower/leader pair: it
//! scans the timesteps in order and returns a fully populated trajectory
//! record. Everything here runs without the CLI front end and can be tested
//! directly.

pub mod gipps;
pub mod idm;
mod types;
pub mod wiedemann;

// Re-export public types for external use
// These may not be used within this crate but are part of the public API
#[allow(unused_imports)]
pub use gipps::{GippsParams, GippsRecord};
#[allow(unused_imports)]
pub use idm::{IdmParams, IdmRecord};
pub use types::{FollowerState, KinematicBuffers, LeaderTrajectory, Regime};
#[allow(unused_imports)]
pub use wiedemann::{Wiedemann74Params, Wiedemann74Record};
