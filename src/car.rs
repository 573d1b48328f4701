use std::ops::{Deref, DerefMut};
use std::thread;

use anyhow::{bail, Context};
use tracing::{debug, info, trace, warn};

use crate::error::{BoardError, Result};
use crate::gripper::{self, GripperPosition};
use crate::leds::{self, LedColor};
use crate::movement::obstacle::{MotionOutcome, MotionRequest};
use crate::movement::spec::CarSpec;
use crate::robot::{Board, BoardInfo, MotorPort};
use crate::types::EncoderPosition;

/// A RobotDerbyCar
///
/// Owns the board for its whole life. Every command that moves something shows red on the eyes
/// while it runs and green again afterwards, also when the command fails half way.
pub struct DerbyCar<B: Board> {
    board: B,
    info: BoardInfo,

    led: LedColor,
    gripper: Option<GripperPosition>,
    speed: Option<i32>,
}

impl<B: Board> DerbyCar<B> {
    /// Connects to the board, prepares the distance sensor and turns the eyes green
    pub fn new(mut board: B) -> Result<Self> {
        let info = board.board_info().context("Probe board")?;
        check_board(&info, board.spec().required_firmware_major())?;

        info!(
            board = %info.board,
            firmware = %info.firmware_version(),
            "Found board"
        );

        board
            .init_distance_sensor()
            .context("Init distance sensor")?;

        let mut car = DerbyCar {
            board,
            info,
            led: LedColor::Green,
            gripper: None,
            speed: None,
        };
        car.set_leds(LedColor::Green)?;

        Ok(car)
    }

    /// Sets both eyes to `color`
    pub fn set_leds(&mut self, color: LedColor) -> Result<()> {
        leds::show(&mut self.board, color)?;
        self.led = color;

        Ok(())
    }

    pub fn gripper_open(&mut self) -> Result<()> {
        self.move_gripper(gripper::OPEN)
    }

    /// Closes the gripper onto the ball, see [`gripper::CLOSE`]
    pub fn gripper_close(&mut self) -> Result<()> {
        self.move_gripper(gripper::CLOSE)
    }

    pub fn read_distance_mm(&mut self) -> Result<Option<f32>> {
        self.board
            .read_distance_mm()
            .context("Read distance sensor")
    }

    pub fn read_battery_voltage(&mut self) -> Result<f32> {
        self.board.battery_voltage().context("Read battery")
    }

    /// Sets the speed used by `drive_cm` and `turn_degrees`
    pub fn set_speed(&mut self, speed: i32) -> Result<()> {
        let mut busy = Busy::start(self)?;
        busy.board.set_speed(speed).context("Set speed")?;
        busy.speed = Some(speed);

        busy.finish()
    }

    /// Drives straight, waits until the board is done
    pub fn drive_cm(&mut self, distance: f32) -> Result<()> {
        let mut busy = Busy::start(self)?;
        busy.board
            .drive_cm(distance, true)
            .with_context(|| format!("Drive {distance} cm"))?;

        busy.finish()
    }

    /// Spins in place, waits until the board is done
    pub fn turn_degrees(&mut self, degrees: f32) -> Result<()> {
        let mut busy = Busy::start(self)?;
        busy.board
            .turn_degrees(degrees, true)
            .with_context(|| format!("Turn {degrees} degrees"))?;

        busy.finish()
    }

    /// Drives `requested_mm` straight, stopping early for anything within `stop_limit_mm`
    ///
    /// Returns whether an obstacle cut the drive short. Drives that are not longer than
    /// `stop_limit_mm` always run to the end.
    pub fn drive(&mut self, requested_mm: f32, stop_limit_mm: u32) -> Result<bool> {
        self.drive_request(MotionRequest::new(requested_mm, stop_limit_mm))
            .map(|outcome| outcome.obstacle_detected)
    }

    /// Same as [`DerbyCar::drive`], with the details of how the drive ended
    pub fn drive_request(&mut self, request: MotionRequest) -> Result<MotionOutcome> {
        let spec = self.board.spec();
        let wheel_turn = spec.mm_to_deg(request.requested);
        let poll_interval = spec.poll_interval();
        let stop = request.obstacle_stop();

        let start = self.encoders().context("Read start position")?;
        let target = start.offset(wheel_turn);

        debug!(
            requested_mm = request.requested.0,
            stop_limit_mm = request.stop_limit_mm,
            wheel_deg = wheel_turn.0,
            ?start,
            ?target,
            "Driving"
        );

        let mut busy = Busy::start(self)?;
        busy.command_position(target)
            .context("Start drive")?;

        let mut outcome = MotionOutcome::default();

        while !busy
            .board
            .target_reached(target.left, target.right)
            .context("Check drive target")?
        {
            outcome.ticks += 1;

            let reading = busy.read_distance_mm()?;
            trace!(tick = outcome.ticks, ?reading, "Polled distance");

            if let Some(mm) = reading.filter(|mm| stop.triggered(Some(*mm))) {
                let here = busy.encoders().context("Read stop position")?;
                busy.command_position(here).context("Hold stop position")?;

                warn!(
                    distance_mm = mm,
                    "Obstacle found, stopping before the requested distance"
                );

                outcome.obstacle_detected = true;
                outcome.stopped_at = Some(here);
                outcome.obstacle_mm = Some(mm);
                break;
            }

            thread::sleep(poll_interval);
        }

        busy.finish()?;

        debug!(?outcome, "Drive finished");

        Ok(outcome)
    }

    /// Reads both drive wheel encoders
    pub fn encoders(&mut self) -> Result<EncoderPosition> {
        let left = self
            .board
            .motor_encoder(MotorPort::Left)
            .context("Read left encoder")?;
        let right = self
            .board
            .motor_encoder(MotorPort::Right)
            .context("Read right encoder")?;

        Ok(EncoderPosition::new(left, right))
    }

    /// The status currently shown on the eyes
    pub fn led(&self) -> LedColor {
        self.led
    }

    /// Last position the gripper was sent to
    pub fn gripper(&self) -> Option<GripperPosition> {
        self.gripper
    }

    /// Last speed set with `set_speed`
    pub fn speed(&self) -> Option<i32> {
        self.speed
    }

    pub fn spec(&self) -> &CarSpec {
        self.board.spec()
    }

    pub fn board_info(&self) -> &BoardInfo {
        &self.info
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    pub fn into_board(self) -> B {
        self.board
    }

    fn move_gripper(&mut self, position: GripperPosition) -> Result<()> {
        let port = self.board.spec().gripper_port();

        let mut busy = Busy::start(self)?;
        busy.board
            .rotate_servo(port, position.degrees())
            .with_context(|| format!("Move gripper to {position:?}"))?;
        busy.gripper = Some(position);

        debug!(?position, degrees = position.degrees(), "Moved gripper");

        busy.finish()
    }

    /// Sends both drive motors to `position` without waiting
    fn command_position(&mut self, position: EncoderPosition) -> Result<()> {
        self.board
            .set_motor_position(MotorPort::Left, position.left)
            .context("Set left motor position")?;
        self.board
            .set_motor_position(MotorPort::Right, position.right)
            .context("Set right motor position")?;

        Ok(())
    }
}

fn check_board(info: &BoardInfo, required_major: u8) -> Result<()> {
    if info.manufacturer != BoardInfo::MANUFACTURER || info.board != BoardInfo::BOARD {
        bail!(BoardError::HardwareInit(format!(
            "found {} {} instead of a {}",
            info.manufacturer,
            info.board,
            BoardInfo::BOARD
        )));
    }

    if info.firmware.0 != required_major {
        bail!(BoardError::FirmwareVersion {
            found: info.firmware_version(),
            required: required_major,
        });
    }

    Ok(())
}

/// Shows red while a command runs
///
/// `finish` turns the eyes green and reports LED errors. When the guard is dropped without
/// `finish`, because the command failed, green is still attempted and any error from that is
/// only logged so the original one reaches the caller.
struct Busy<'a, B: Board> {
    car: &'a mut DerbyCar<B>,
    finished: bool,
}

impl<'a, B: Board> Busy<'a, B> {
    fn start(car: &'a mut DerbyCar<B>) -> Result<Self> {
        let busy = Busy {
            car,
            finished: false,
        };
        busy.car.set_leds(LedColor::Red)?;

        Ok(busy)
    }

    fn finish(mut self) -> Result<()> {
        self.finished = true;
        self.car.set_leds(LedColor::Green)
    }
}

impl<B: Board> Deref for Busy<'_, B> {
    type Target = DerbyCar<B>;

    fn deref(&self) -> &Self::Target {
        self.car
    }
}

impl<B: Board> DerefMut for Busy<'_, B> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.car
    }
}

impl<B: Board> Drop for Busy<'_, B> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        if let Err(err) = self.car.set_leds(LedColor::Green) {
            warn!("Couldn't reset eyes after a failed command: {err:#}");
        }
    }
}
