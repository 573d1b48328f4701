/// Named gripper servo positions, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GripperPosition {
    FullOpen,
    FullClose,
    /// Partly closed, holds the derby ball without crushing it
    Grab,
}

impl GripperPosition {
    pub const fn degrees(self) -> u8 {
        match self {
            GripperPosition::FullOpen => 90,
            GripperPosition::FullClose => 0,
            GripperPosition::Grab => 40,
        }
    }
}

/// Where `gripper_open` moves the servo
pub const OPEN: GripperPosition = GripperPosition::FullOpen;
/// Where `gripper_close` moves the servo
///
/// Closing stops at the grab position, `FullClose` is never commanded.
pub const CLOSE: GripperPosition = GripperPosition::Grab;
