//! Car-Following Simulation Library
//!
//! A longitudinal car-following engine that advances one follower vehicle
//! against a known leader trajectory under the IDM, Gipps, or Wiedemann74
//! behavioral model. Runs independently or behind the headless CLI runner.

pub mod simulation;
