mod simulation;

use anyhow::{ensure, Result};
use clap::{Parser, ValueEnum};
use log::{info, warn};
use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use simulation::{
    gipps, idm, wiedemann, FollowerState, GippsParams, GippsRecord, IdmParams, IdmRecord,
    LeaderTrajectory, Regime, Wiedemann74Params, Wiedemann74Record,
};

/// Car-following model selection
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Model {
    Idm,
    Gipps,
    Wiedemann74,
}

#[derive(Parser)]
#[command(name = "car_following")]
#[command(about = "Longitudinal car-following simulation against a synthetic leader")]
struct Cli {
    /// Car-following model to run
    #[arg(long, value_enum, default_value = "idm")]
    model: Model,

    /// Number of simulation timesteps
    #[arg(long, default_value = "600")]
    steps: usize,

    /// Timestep duration in seconds
    #[arg(long, default_value = "0.1")]
    resolution: f64,

    /// Seed for the leader speed jitter
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Number of leading table rows to print
    #[arg(long, default_value = "20")]
    rows: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    // The engine itself does not validate preconditions; the marshalling
    // side owns them
    ensure!(cli.steps >= 2, "need at least 2 timesteps, got {}", cli.steps);
    ensure!(
        cli.resolution > 0.0,
        "resolution must be positive, got {}",
        cli.resolution
    );

    info!(
        "Running {:?} for {} steps at {}s resolution (seed {})",
        cli.model, cli.steps, cli.resolution, cli.seed
    );

    let mut rng = StdRng::seed_from_u64(cli.seed);
    let (leader, leader_accel) = synthetic_leader(cli.steps, cli.resolution, &mut rng);

    match cli.model {
        Model::Idm => run_idm(&cli, &leader),
        Model::Gipps => run_gipps(&cli, &leader),
        Model::Wiedemann74 => run_wiedemann(&cli, &leader, &leader_accel),
    }

    info!("SIMULATION COMPLETE");
    Ok(())
}

/// Build a synthetic leader profile: cruise, a braking episode, recovery,
/// and a short sensor-dropout window where the reported speed is missing.
///
/// Positions integrate the true speed, so only the reported speed column
/// carries the dropout. Also returns the leader's per-step acceleration for
/// the Wiedemann74 model.
fn synthetic_leader(steps: usize, dt: f64, rng: &mut StdRng) -> (LeaderTrajectory, Vec<f64>) {
    let mut true_speed = vec![0.0; steps];
    let mut speed = 20.0_f64;

    for (t, slot) in true_speed.iter_mut().enumerate() {
        let phase = t as f64 / steps as f64;
        let target = if (0.40..0.55).contains(&phase) {
            8.0
        } else {
            20.0
        };

        // move toward the target at a bounded rate, with a little jitter
        let step = if target < speed { -1.5 * dt } else { 0.8 * dt };
        if (target - speed).abs() <= step.abs() {
            speed = target;
        } else {
            speed += step;
        }
        speed += rng.random_range(-0.05..0.05);

        *slot = speed.max(0.0);
    }

    let mut time = vec![0.0; steps];
    let mut xn1 = vec![0.0; steps];
    xn1[0] = 80.0;
    for t in 1..steps {
        time[t] = t as f64 * dt;
        xn1[t] = xn1[t - 1] + true_speed[t - 1] * dt;
    }

    let mut bn1 = vec![0.0; steps];
    for t in 0..steps - 1 {
        bn1[t] = (true_speed[t + 1] - true_speed[t]) / dt;
    }

    // sensor dropout: the reported speed goes missing for a stretch
    let mut vn1 = true_speed;
    let dropout = (steps * 70 / 100)..(steps * 75 / 100);
    for t in dropout {
        vn1[t] = f64::NAN;
    }

    (LeaderTrajectory::new(time, xn1, vn1), bn1)
}

/// Follower launch position and speed used by all three demo runs
const START_XN: f64 = 0.0;
const START_VN: f64 = 18.0;

fn run_idm(cli: &Cli, leader: &LeaderTrajectory) {
    let params = IdmParams::typical(cli.resolution);
    let start = FollowerState::new(
        START_XN,
        START_VN,
        (leader.xn1[0] - START_XN).abs() - params.ln1,
        START_VN - leader.vn1[0],
    );

    let record = idm::simulate(&params, leader, &start, 1);

    println!("{}", IdmRecord::header());
    for t in 0..record.time_length().min(cli.rows) {
        println!("{}", record.row(t));
    }

    summarize("vn", &record.vn);
    summarize("v_dot", &record.v_dot);
    summarize("sn", &record.sn);
}

fn run_gipps(cli: &Cli, leader: &LeaderTrajectory) {
    let params = GippsParams::typical(cli.resolution);
    let start = FollowerState::new(
        START_XN,
        START_VN,
        leader.xn1[0] - START_XN,
        START_VN - leader.vn1[0],
    );

    let record = gipps::simulate(&params, leader, &start, 1);

    println!("{}", GippsRecord::header());
    for t in 0..record.time_length().min(cli.rows) {
        println!("{}", record.row(t));
    }

    summarize("vn", &record.vn);
    summarize("bn", &record.bn);
    summarize("sn", &record.sn);
}

fn run_wiedemann(cli: &Cli, leader: &LeaderTrajectory, leader_accel: &[f64]) {
    let params = Wiedemann74Params::typical(cli.resolution);
    let start = FollowerState::new(
        START_XN,
        START_VN,
        (leader.xn1[0] - START_XN).abs(),
        START_VN - leader.vn1[0],
    );

    let record = wiedemann::simulate(&params, leader, leader_accel, &start);

    println!("{}", Wiedemann74Record::header());
    for t in 0..record.time_length().min(cli.rows) {
        println!("{}", record.row(t));
    }

    summarize("vn", &record.vn);
    summarize("bn", &record.bn);
    summarize("sn", &record.sn);

    for regime in [
        Regime::FreeDriving,
        Regime::Approaching,
        Regime::Following,
        Regime::EmergencyBraking,
    ] {
        let count = record
            .cf_state_sim
            .iter()
            .filter(|state| **state == Some(regime))
            .count();
        info!("{}: {} steps", regime, count);
    }
}

/// Log a min/max summary for one float column, warning on missing cells
fn summarize(name: &str, values: &[f64]) {
    let missing = values.iter().filter(|value| value.is_nan()).count();
    let numeric: Vec<OrderedFloat<f64>> = values
        .iter()
        .copied()
        .filter(|value| !value.is_nan())
        .map(OrderedFloat)
        .collect();

    match (numeric.iter().min(), numeric.iter().max()) {
        (Some(min), Some(max)) => info!(
            "{}: min {:.3}, max {:.3} over {} numeric cells",
            name,
            min.into_inner(),
            max.into_inner(),
            numeric.len()
        ),
        _ => info!("{}: no numeric cells", name),
    }

    if missing > 0 {
        warn!("{}: {} missing cells", name, missing);
    }
}
