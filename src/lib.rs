//! Driver for the RobotDerbyCar, a GoPiGo3 class car with a gripper and a distance sensor.
//!
//! [`DerbyCar`] owns a [`Board`] and adds status colors on the eye LEDs, gripper control and
//! [`DerbyCar::drive`], a straight drive that stops early when the distance sensor sees
//! something within a limit. [`sim::SimBoard`] stands in for the hardware.

pub mod car;
pub mod error;
pub mod gripper;
pub mod leds;
pub mod movement;
pub mod robot;
pub mod sim;
pub mod types;

pub use car::DerbyCar;
pub use error::{BoardError, Result};
pub use leds::LedColor;
pub use robot::Board;
