use crate::types::{EncoderPosition, Milimeters};

/// A straight drive with an obstacle stop limit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionRequest {
    /// Positive drives forward, negative backward
    pub requested: Milimeters,
    /// Readings at or under this stop the car
    pub stop_limit_mm: u32,
}

impl MotionRequest {
    pub fn new(requested_mm: f32, stop_limit_mm: u32) -> Self {
        MotionRequest {
            requested: Milimeters(requested_mm),
            stop_limit_mm,
        }
    }

    pub fn obstacle_stop(&self) -> ObstacleStop {
        ObstacleStop::new(self.requested, self.stop_limit_mm)
    }
}

/// What happened during a `drive`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionOutcome {
    pub obstacle_detected: bool,
    /// Encoder positions the motors were told to hold, when stopped early
    pub stopped_at: Option<EncoderPosition>,
    /// The reading that stopped the car
    pub obstacle_mm: Option<f32>,
    /// Number of sensor polls before the drive ended
    pub ticks: u32,
}

/// Decides whether a distance reading should end a drive early
///
/// Readings and the requested distance are compared as whole millimeters, truncated toward
/// zero, so noise under a millimeter around the limit is ignored. A drive that was not asked
/// to go further than the limit is never stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObstacleStop {
    armed: bool,
    limit: i64,
}

impl ObstacleStop {
    pub fn new(Milimeters(requested): Milimeters, stop_limit_mm: u32) -> Self {
        let limit = stop_limit_mm as i64;

        ObstacleStop {
            armed: (requested.trunc() as i64) > limit,
            limit,
        }
    }

    /// Whether this drive can be cut short at all
    pub fn armed(&self) -> bool {
        self.armed
    }

    pub fn triggered(&self, reading: Option<f32>) -> bool {
        match reading {
            Some(mm) if self.armed && !mm.is_nan() => (mm.trunc() as i64) <= self.limit,
            _ => false,
        }
    }
}
