//! A simulated board.
//!
//! Time in the simulation only moves when the driver asks [`Board::target_reached`]: every call
//! advances both motors one step towards their targets. This makes a drive reproducible tick by
//! tick without any real sleeping being involved in the motion itself.

use std::collections::VecDeque;

use anyhow::bail;
use fxhash::FxHashMap as HashMap;

use crate::error::{BoardError, Result};
use crate::movement::spec::CarSpec;
use crate::robot::{Board, BoardInfo, Eye, MotorPort, ServoPort};
use crate::types::{Degrees, Rgb, UnitsExt};

/// Default distance both motors cover per tick, in degrees
pub const DEFAULT_STEP: i32 = 40;
/// How close an encoder has to be to its target to count as reached, in degrees
pub const TARGET_TOLERANCE: i32 = 10;
/// Voltage of a freshly charged battery pack
pub const DEFAULT_VOLTAGE: f32 = 9.6;

/// Calls that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    Encoder,
    Motor,
    Sensor,
    Led,
    Servo,
    Battery,
    Speed,
}

/// A mutating call the board received
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoardEvent {
    EyeColor(Eye, Rgb),
    EyeOpen(Eye),
    Servo(ServoPort, u8),
    MotorPosition(MotorPort, i32),
    Speed(i32),
    DriveCm(f32),
    TurnDegrees(f32),
}

/// Where distance readings come from
#[derive(Debug, Clone, PartialEq)]
pub enum DistanceSource {
    /// The sensor never has a valid reading
    Nothing,
    /// Readings are handed out in order, the last one repeats
    Script(VecDeque<Option<f32>>),
    /// A wall this far in front of the car when the encoders read 0
    Wall(f32),
}

#[derive(Debug, Default, Clone, Copy)]
struct SimMotor {
    encoder: i32,
    target: Option<i32>,
}

#[derive(Debug, Default, Clone, Copy)]
struct SimEye {
    color: Option<Rgb>,
    open: bool,
}

pub struct SimBoard {
    spec: CarSpec,
    info: Option<BoardInfo>,

    motors: HashMap<MotorPort, SimMotor>,
    eyes: HashMap<Eye, SimEye>,
    servos: HashMap<ServoPort, u8>,

    step: i32,
    speed: i32,
    voltage: f32,

    distance: DistanceSource,
    last_reading: Option<f32>,
    sensor_ready: bool,
    sensor_reads: u32,

    /// Calls left before each fault fires
    faults: HashMap<Fault, u32>,
    events: Vec<BoardEvent>,
}

impl SimBoard {
    /// A stock GoPiGo3 with no obstacle in sight
    pub fn new() -> Self {
        SimBoard {
            spec: CarSpec::default(),
            info: Some(BoardInfo::gopigo3((1, 0, 0))),
            motors: HashMap::default(),
            eyes: HashMap::default(),
            servos: HashMap::default(),
            step: DEFAULT_STEP,
            speed: 0,
            voltage: DEFAULT_VOLTAGE,
            distance: DistanceSource::Nothing,
            last_reading: None,
            sensor_ready: false,
            sensor_reads: 0,
            faults: HashMap::default(),
            events: Vec::new(),
        }
    }

    /// A board that does not answer when probed
    pub fn detached() -> Self {
        SimBoard {
            info: None,
            ..SimBoard::new()
        }
    }

    pub fn with_spec(self, spec: CarSpec) -> Self {
        SimBoard { spec, ..self }
    }

    pub fn with_info(self, info: BoardInfo) -> Self {
        SimBoard {
            info: Some(info),
            ..self
        }
    }

    pub fn with_firmware(self, firmware: (u8, u8, u8)) -> Self {
        self.with_info(BoardInfo::gopigo3(firmware))
    }

    /// Sets how many degrees the motors move per tick
    ///
    /// Panics when `step` is not positive.
    pub fn with_step(self, step: i32) -> Self {
        assert!(step > 0, "Step must be greater than 0");
        SimBoard { step, ..self }
    }

    pub fn with_voltage(self, voltage: f32) -> Self {
        SimBoard { voltage, ..self }
    }

    /// Hands out `readings` one per sensor read
    pub fn with_distances(self, readings: impl IntoIterator<Item = Option<f32>>) -> Self {
        SimBoard {
            distance: DistanceSource::Script(readings.into_iter().collect()),
            ..self
        }
    }

    /// Puts a wall `distance_mm` in front of the car
    pub fn with_wall(self, distance_mm: f32) -> Self {
        SimBoard {
            distance: DistanceSource::Wall(distance_mm),
            ..self
        }
    }

    /// Starts the encoders somewhere other than 0
    pub fn with_encoders(mut self, left: i32, right: i32) -> Self {
        self.motor_mut(MotorPort::Left).encoder = left;
        self.motor_mut(MotorPort::Right).encoder = right;
        self
    }

    /// Makes every following call of kind `fault` fail, until `clear_faults`
    pub fn inject(&mut self, fault: Fault) {
        self.inject_after(fault, 0);
    }

    /// Lets `calls` calls of kind `fault` through, then fails every following one
    pub fn inject_after(&mut self, fault: Fault, calls: u32) {
        self.faults.insert(fault, calls);
    }

    pub fn clear_faults(&mut self) {
        self.faults.clear();
    }

    pub fn events(&self) -> &[BoardEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// The color an eye is showing, `None` while it is off
    pub fn eye(&self, eye: Eye) -> Option<Rgb> {
        self.eyes
            .get(&eye)
            .filter(|state| state.open)
            .and_then(|state| state.color)
    }

    pub fn servo(&self, servo: ServoPort) -> Option<u8> {
        self.servos.get(&servo).copied()
    }

    pub fn encoder(&self, motor: MotorPort) -> i32 {
        self.motors.get(&motor).map(|it| it.encoder).unwrap_or(0)
    }

    pub fn target(&self, motor: MotorPort) -> Option<i32> {
        self.motors.get(&motor).and_then(|it| it.target)
    }

    pub fn speed(&self) -> i32 {
        self.speed
    }

    pub fn sensor_reads(&self) -> u32 {
        self.sensor_reads
    }

    /// Millimeters the car has rolled forward since the encoders read 0
    pub fn travelled_mm(&self) -> f32 {
        let left = self.encoder(MotorPort::Left);
        let right = self.encoder(MotorPort::Right);
        let mean = (left + right) as f32 / 2.0;

        self.spec.deg_to_mm(mean.deg()).0
    }

    fn motor_mut(&mut self, motor: MotorPort) -> &mut SimMotor {
        self.motors.entry(motor).or_default()
    }

    fn check(&mut self, fault: Fault) -> Result<()> {
        if let Some(calls) = self.faults.get_mut(&fault) {
            if *calls == 0 {
                bail!(BoardError::fault(format!("simulated {fault:?} failure")));
            }
            *calls -= 1;
        }

        Ok(())
    }

    /// Moves every motor with a target one step closer to it
    fn tick(&mut self) {
        let step = self.step;

        for motor in self.motors.values_mut() {
            if let Some(target) = motor.target {
                let remaining = target - motor.encoder;
                motor.encoder += remaining.clamp(-step, step);
            }
        }
    }

    fn next_reading(&mut self) -> Option<f32> {
        let travelled = self.travelled_mm();

        match &mut self.distance {
            DistanceSource::Nothing => None,
            DistanceSource::Script(readings) => {
                if let Some(reading) = readings.pop_front() {
                    self.last_reading = reading;
                }
                self.last_reading
            }
            DistanceSource::Wall(distance) => Some((*distance - travelled).max(0.0)),
        }
    }

    /// Rolls both wheels instantly, as if a blocking move just finished
    fn roll(&mut self, left: Degrees, right: Degrees) {
        for (motor, Degrees(deg)) in [(MotorPort::Left, left), (MotorPort::Right, right)] {
            let motor = self.motor_mut(motor);
            motor.encoder += deg.round() as i32;
            motor.target = None;
        }
    }
}

impl Default for SimBoard {
    fn default() -> Self {
        SimBoard::new()
    }
}

impl Board for SimBoard {
    fn board_info(&mut self) -> Result<BoardInfo> {
        match &self.info {
            Some(info) => Ok(info.clone()),
            None => bail!(BoardError::HardwareInit(
                "no response on the SPI bus".to_string()
            )),
        }
    }

    fn spec(&self) -> &CarSpec {
        &self.spec
    }

    fn init_distance_sensor(&mut self) -> Result<()> {
        self.check(Fault::Sensor)?;
        self.sensor_ready = true;

        Ok(())
    }

    fn read_distance_mm(&mut self) -> Result<Option<f32>> {
        self.check(Fault::Sensor)?;
        if !self.sensor_ready {
            bail!(BoardError::fault("distance sensor was not initialized"));
        }
        self.sensor_reads += 1;

        Ok(self.next_reading())
    }

    fn motor_encoder(&mut self, motor: MotorPort) -> Result<i32> {
        self.check(Fault::Encoder)?;

        Ok(self.encoder(motor))
    }

    fn set_motor_position(&mut self, motor: MotorPort, position: i32) -> Result<()> {
        self.check(Fault::Motor)?;
        self.motor_mut(motor).target = Some(position);
        self.events.push(BoardEvent::MotorPosition(motor, position));

        Ok(())
    }

    fn target_reached(&mut self, left: i32, right: i32) -> Result<bool> {
        self.check(Fault::Encoder)?;
        self.tick();

        let reached = |encoder: i32, target: i32| (encoder - target).abs() <= TARGET_TOLERANCE;

        Ok(reached(self.encoder(MotorPort::Left), left)
            && reached(self.encoder(MotorPort::Right), right))
    }

    fn set_eye_color(&mut self, eye: Eye, color: Rgb) -> Result<()> {
        self.check(Fault::Led)?;
        self.eyes.entry(eye).or_default().color = Some(color);
        self.events.push(BoardEvent::EyeColor(eye, color));

        Ok(())
    }

    fn open_eye(&mut self, eye: Eye) -> Result<()> {
        self.check(Fault::Led)?;
        self.eyes.entry(eye).or_default().open = true;
        self.events.push(BoardEvent::EyeOpen(eye));

        Ok(())
    }

    fn rotate_servo(&mut self, servo: ServoPort, position: u8) -> Result<()> {
        self.check(Fault::Servo)?;
        self.servos.insert(servo, position);
        self.events.push(BoardEvent::Servo(servo, position));

        Ok(())
    }

    fn battery_voltage(&mut self) -> Result<f32> {
        self.check(Fault::Battery)?;

        Ok(self.voltage)
    }

    fn set_speed(&mut self, speed: i32) -> Result<()> {
        self.check(Fault::Speed)?;
        self.speed = speed;
        self.events.push(BoardEvent::Speed(speed));

        Ok(())
    }

    fn drive_cm(&mut self, distance: f32, _blocking: bool) -> Result<()> {
        self.check(Fault::Motor)?;
        self.events.push(BoardEvent::DriveCm(distance));

        let deg = self.spec.mm_to_deg((distance * 10.0).mm());
        self.roll(deg, deg);

        Ok(())
    }

    fn turn_degrees(&mut self, angle: f32, _blocking: bool) -> Result<()> {
        self.check(Fault::Motor)?;
        self.events.push(BoardEvent::TurnDegrees(angle));

        let Degrees(deg) = self.spec.get_distance_for_turn(angle.deg());
        self.roll(Degrees(deg), Degrees(-deg));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motors_step_towards_target() {
        let mut board = SimBoard::new().with_step(10);
        board.set_motor_position(MotorPort::Left, 25).unwrap();
        board.set_motor_position(MotorPort::Right, -25).unwrap();

        assert!(!board.target_reached(25, -25).unwrap());
        assert_eq!(board.encoder(MotorPort::Left), 10);
        assert_eq!(board.encoder(MotorPort::Right), -10);

        assert!(board.target_reached(25, -25).unwrap());
        assert_eq!(board.encoder(MotorPort::Left), 20);

        board.target_reached(25, -25).unwrap();
        assert_eq!(board.encoder(MotorPort::Left), 25);
        assert_eq!(board.encoder(MotorPort::Right), -25);
    }

    #[test]
    fn script_repeats_last_reading() {
        let mut board = SimBoard::new().with_distances([Some(300.0), None, Some(90.0)]);
        board.init_distance_sensor().unwrap();

        let readings: Vec<_> = (0..5).map(|_| board.read_distance_mm().unwrap()).collect();
        assert_eq!(
            readings,
            vec![Some(300.0), None, Some(90.0), Some(90.0), Some(90.0)]
        );
        assert_eq!(board.sensor_reads(), 5);
    }

    #[test]
    fn wall_gets_closer() {
        let mut board = SimBoard::new().with_wall(500.0);
        board.init_distance_sensor().unwrap();

        assert_eq!(board.read_distance_mm().unwrap(), Some(500.0));

        board.drive_cm(20.0, true).unwrap();
        let reading = board.read_distance_mm().unwrap().unwrap();
        assert!((reading - 300.0).abs() < 1.0, "{reading}");

        board.drive_cm(100.0, true).unwrap();
        assert_eq!(board.read_distance_mm().unwrap(), Some(0.0));
    }

    #[test]
    fn sensor_needs_init() {
        let mut board = SimBoard::new();
        let err = board.read_distance_mm().unwrap_err();
        assert!(matches!(
            BoardError::find(&err),
            Some(BoardError::HardwareFault(_))
        ));
    }

    #[test]
    fn faults_fire_after_allowed_calls() {
        let mut board = SimBoard::new();
        board.inject_after(Fault::Battery, 2);

        assert!(board.battery_voltage().is_ok());
        assert!(board.battery_voltage().is_ok());
        assert!(board.battery_voltage().is_err());
        assert!(board.battery_voltage().is_err());

        board.clear_faults();
        assert_eq!(board.battery_voltage().unwrap(), DEFAULT_VOLTAGE);
    }

    #[test]
    fn injected_fault_sticks_until_cleared() {
        let mut board = SimBoard::new();
        board.inject(Fault::Speed);

        for _ in 0..3 {
            assert!(board.set_speed(300).is_err());
        }
        assert_eq!(board.speed(), 0);

        board.clear_faults();
        board.set_speed(300).unwrap();
        assert_eq!(board.speed(), 300);
    }

    #[test]
    fn turning_rolls_wheels_apart() {
        let mut board = SimBoard::new();
        board.turn_degrees(90.0, true).unwrap();

        let left = board.encoder(MotorPort::Left);
        let right = board.encoder(MotorPort::Right);
        assert!(left > 0);
        assert_eq!(left, -right);
    }

    #[test]
    fn detached_board_fails_probe() {
        let mut board = SimBoard::detached();
        let err = board.board_info().unwrap_err();
        assert!(matches!(
            BoardError::find(&err),
            Some(BoardError::HardwareInit(_))
        ));
    }
}
