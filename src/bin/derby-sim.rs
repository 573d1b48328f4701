use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use derby_car::movement::obstacle::MotionRequest;
use derby_car::movement::spec::CarSpec;
use derby_car::sim::SimBoard;
use derby_car::types::UnitsExt;
use derby_car::DerbyCar;
use tracing::info;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Gripper {
    Open,
    Close,
}

/// Runs one obstacle-aware drive on a simulated derby car
#[derive(Parser)]
#[clap(version)]
struct Opts {
    /// Distance to drive in mm, negative drives backwards
    #[clap(long, allow_hyphen_values = true)]
    distance: f32,
    /// Stop when something is this close, in mm
    #[clap(long, default_value_t = 100)]
    limit: u32,
    /// Put a wall this far in front of the car, in mm
    #[clap(long)]
    wall: Option<f32>,
    /// Degrees the simulated wheels turn between two sensor polls
    #[clap(
        long,
        default_value_t = derby_car::sim::DEFAULT_STEP,
        value_parser = clap::value_parser!(i32).range(1..)
    )]
    step: i32,
    /// Milliseconds between two sensor polls
    #[clap(long, default_value_t = 50)]
    poll_ms: u64,
    /// Override the wheel circumference, in mm
    #[clap(long)]
    circumference: Option<f32>,
    /// Move the gripper before driving
    #[clap(long, value_enum)]
    gripper: Option<Gripper>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();

    let mut spec = CarSpec::default().with_poll_interval(Duration::from_millis(opts.poll_ms));
    if let Some(circumference) = opts.circumference {
        spec = spec.with_wheel_circumference(circumference.mm());
    }

    let mut board = SimBoard::new().with_spec(spec).with_step(opts.step);
    if let Some(wall) = opts.wall {
        board = board.with_wall(wall);
    }

    let mut car = DerbyCar::new(board).context("Start car")?;
    info!(
        voltage = car.read_battery_voltage()?,
        "Battery"
    );

    match opts.gripper {
        Some(Gripper::Open) => car.gripper_open()?,
        Some(Gripper::Close) => car.gripper_close()?,
        None => {}
    }

    let outcome = car
        .drive_request(MotionRequest::new(opts.distance, opts.limit))
        .context("Drive")?;

    let travelled = car.board().travelled_mm();
    if outcome.obstacle_detected {
        println!(
            "Stopped early after {travelled:.1} mm, obstacle at {:?} mm ({} polls)",
            outcome.obstacle_mm, outcome.ticks
        );
    } else {
        println!(
            "Drove {travelled:.1} mm of {} mm ({} polls)",
            opts.distance, outcome.ticks
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_must_be_positive() {
        for step in ["0", "-5"] {
            let arg = format!("--step={step}");
            let res = Opts::try_parse_from(["derby-sim", "--distance", "500", &arg]);
            assert!(res.is_err(), "{step}");
        }
    }

    #[test]
    fn defaults() {
        let opts = Opts::try_parse_from(["derby-sim", "--distance=-250"]).unwrap();

        assert_eq!(opts.distance, -250.0);
        assert_eq!(opts.limit, 100);
        assert_eq!(opts.step, derby_car::sim::DEFAULT_STEP);
        assert_eq!(opts.poll_ms, 50);
        assert!(opts.wall.is_none());
    }
}
