use std::f32::consts::PI;
use std::time::Duration;

use crate::robot::ServoPort;
use crate::types::{Degrees, Milimeters, UnitsExt};

/// Wheel diameter of a stock GoPiGo3
pub const WHEEL_DIAMETER: Milimeters = Milimeters(66.5);
/// Distance between the two drive wheels of a stock GoPiGo3
pub const WHEEL_BASE_WIDTH: Milimeters = Milimeters(117.0);
/// How often `drive` checks the distance sensor
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);
/// Firmware major version the driver talks to, other major versions are incompatible
pub const REQUIRED_FIRMWARE_MAJOR: u8 = 1;

#[derive(Clone, Debug, PartialEq)]
pub struct CarSpec {
    wheel_circumference: Milimeters,
    wheel_diameter: Milimeters,
    wheelbase_circumference: Milimeters,
    wheelbase_width: Milimeters,

    poll_interval: Duration,
    gripper_port: ServoPort,
    required_firmware_major: u8,
}

impl CarSpec {
    pub fn new(wheel_diameter: Milimeters, wheelbase_width: Milimeters) -> Self {
        CarSpec {
            wheel_circumference: (PI * wheel_diameter.0).mm(),
            wheel_diameter,
            wheelbase_circumference: (PI * wheelbase_width.0).mm(),
            wheelbase_width,
            poll_interval: POLL_INTERVAL,
            gripper_port: ServoPort::Servo1,
            required_firmware_major: REQUIRED_FIRMWARE_MAJOR,
        }
    }

    /// Overrides the computed wheel circumference, for wheels that were measured directly
    pub fn with_wheel_circumference(self, wheel_circumference: Milimeters) -> Self {
        CarSpec {
            wheel_circumference,
            wheel_diameter: (wheel_circumference.0 / PI).mm(),
            ..self
        }
    }

    pub fn with_poll_interval(self, poll_interval: Duration) -> Self {
        CarSpec {
            poll_interval,
            ..self
        }
    }

    pub fn with_gripper_port(self, gripper_port: ServoPort) -> Self {
        CarSpec {
            gripper_port,
            ..self
        }
    }

    /// The circumference of the main wheels on the car
    /// In millimeters
    pub fn wheel_circumference(&self) -> Milimeters {
        self.wheel_circumference
    }

    /// The diameter of the main wheels on the car
    /// In millimeters
    pub fn wheel_diameter(&self) -> Milimeters {
        self.wheel_diameter
    }

    /// The turning circumference of the car's wheelbase
    /// In millimeters
    pub fn wheelbase_circumference(&self) -> Milimeters {
        self.wheelbase_circumference
    }

    /// The distance between the car's 2 wheels
    /// In millimeters
    pub fn wheelbase_width(&self) -> Milimeters {
        self.wheelbase_width
    }

    /// Sleep between two distance sensor reads while driving
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Servo the gripper is plugged into
    pub fn gripper_port(&self) -> ServoPort {
        self.gripper_port
    }

    pub fn required_firmware_major(&self) -> u8 {
        self.required_firmware_major
    }

    /// Calculates the amount of degrees each wheel needs to turn for the car to spin `angle`
    /// degrees in place
    pub fn get_distance_for_turn(&self, Degrees(angle): Degrees) -> Degrees {
        (angle * self.wheelbase_circumference.0 / self.wheel_circumference.0).deg()
    }

    /// Converts wheel degrees to millimeters
    pub fn deg_to_mm(&self, Degrees(deg): Degrees) -> Milimeters {
        (deg / 360.0 * self.wheel_circumference.0).mm()
    }

    /// Converts millimeters to wheel degrees
    pub fn mm_to_deg(&self, Milimeters(mm): Milimeters) -> Degrees {
        (mm / self.wheel_circumference.0 * 360.0).deg()
    }
}

impl Default for CarSpec {
    fn default() -> Self {
        CarSpec::new(WHEEL_DIAMETER, WHEEL_BASE_WIDTH)
    }
}
