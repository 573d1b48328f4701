use crate::error::Result;
use crate::movement::spec::CarSpec;
use crate::types::Rgb;

/// Identifies a drive motor
#[derive(Eq, PartialEq, Copy, Clone, Hash, Debug)]
pub enum MotorPort {
    Left,
    Right,
}

/// Identifies one of the two eye LEDs
#[derive(Eq, PartialEq, Copy, Clone, Hash, Debug)]
pub enum Eye {
    Left,
    Right,
}

impl Eye {
    pub const BOTH: [Eye; 2] = [Eye::Left, Eye::Right];
}

/// Identifies a servo header
#[derive(Eq, PartialEq, Copy, Clone, Hash, Debug)]
pub enum ServoPort {
    Servo1,
    Servo2,
}

/// Identity reported by a board when it is probed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardInfo {
    pub manufacturer: String,
    pub board: String,
    pub firmware: (u8, u8, u8),
}

impl BoardInfo {
    pub const MANUFACTURER: &'static str = "Dexter Industries";
    pub const BOARD: &'static str = "GoPiGo3";

    /// The identity of a stock board running the given firmware
    pub fn gopigo3(firmware: (u8, u8, u8)) -> Self {
        BoardInfo {
            manufacturer: Self::MANUFACTURER.to_string(),
            board: Self::BOARD.to_string(),
            firmware,
        }
    }

    pub fn firmware_version(&self) -> String {
        let (major, minor, patch) = self.firmware;
        format!("{major}.{minor}.{patch}")
    }
}

/// The controller board of a two wheeled car
///
/// Every call talks to the hardware and may fail, errors should carry a
/// [`BoardError`](crate::error::BoardError) so callers can tell detection failures from faults.
pub trait Board {
    /// Probes the board for its identity
    fn board_info(&mut self) -> Result<BoardInfo>;

    /// Physical dimensions of the car this board drives
    fn spec(&self) -> &CarSpec;

    /// Prepares the distance sensor for `read_distance_mm`
    fn init_distance_sensor(&mut self) -> Result<()>;

    /// Reads the distance sensor, `None` when there is no valid reading
    fn read_distance_mm(&mut self) -> Result<Option<f32>>;

    /// Retrieves the encoder of a motor, in degrees
    fn motor_encoder(&mut self, motor: MotorPort) -> Result<i32>;

    /// Starts moving a motor towards an absolute encoder position
    /// Does not wait for the motor to get there
    fn set_motor_position(&mut self, motor: MotorPort, position: i32) -> Result<()>;

    /// Whether both drive motors are at the given encoder targets
    fn target_reached(&mut self, left: i32, right: i32) -> Result<bool>;

    fn set_eye_color(&mut self, eye: Eye, color: Rgb) -> Result<()>;

    /// Turns an eye on with its last color
    fn open_eye(&mut self, eye: Eye) -> Result<()>;

    /// Moves a servo to `position` degrees
    fn rotate_servo(&mut self, servo: ServoPort, position: u8) -> Result<()>;

    /// Battery voltage, in volts
    fn battery_voltage(&mut self) -> Result<f32>;

    /// Sets the speed used by `drive_cm` and `turn_degrees`, in degrees per second
    fn set_speed(&mut self, speed: i32) -> Result<()>;

    /// Drives straight for `distance` centimeters
    fn drive_cm(&mut self, distance: f32, blocking: bool) -> Result<()>;

    /// Spins in place for `angle` degrees, positive is clockwise
    fn turn_degrees(&mut self, angle: f32, blocking: bool) -> Result<()>;
}

impl<B: Board + ?Sized> Board for &mut B {
    fn board_info(&mut self) -> Result<BoardInfo> {
        (**self).board_info()
    }

    fn spec(&self) -> &CarSpec {
        (**self).spec()
    }

    fn init_distance_sensor(&mut self) -> Result<()> {
        (**self).init_distance_sensor()
    }

    fn read_distance_mm(&mut self) -> Result<Option<f32>> {
        (**self).read_distance_mm()
    }

    fn motor_encoder(&mut self, motor: MotorPort) -> Result<i32> {
        (**self).motor_encoder(motor)
    }

    fn set_motor_position(&mut self, motor: MotorPort, position: i32) -> Result<()> {
        (**self).set_motor_position(motor, position)
    }

    fn target_reached(&mut self, left: i32, right: i32) -> Result<bool> {
        (**self).target_reached(left, right)
    }

    fn set_eye_color(&mut self, eye: Eye, color: Rgb) -> Result<()> {
        (**self).set_eye_color(eye, color)
    }

    fn open_eye(&mut self, eye: Eye) -> Result<()> {
        (**self).open_eye(eye)
    }

    fn rotate_servo(&mut self, servo: ServoPort, position: u8) -> Result<()> {
        (**self).rotate_servo(servo, position)
    }

    fn battery_voltage(&mut self) -> Result<f32> {
        (**self).battery_voltage()
    }

    fn set_speed(&mut self, speed: i32) -> Result<()> {
        (**self).set_speed(speed)
    }

    fn drive_cm(&mut self, distance: f32, blocking: bool) -> Result<()> {
        (**self).drive_cm(distance, blocking)
    }

    fn turn_degrees(&mut self, angle: f32, blocking: bool) -> Result<()> {
        (**self).turn_degrees(angle, blocking)
    }
}
