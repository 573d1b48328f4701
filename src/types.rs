/// Repersents distance in milimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Milimeters(pub f32);

/// Repersents distance in wheel degrees
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Degrees(pub f32);

impl Degrees {
    /// Rounds to the whole degrees an encoder works in
    pub fn to_encoder(self) -> i32 {
        self.0.round() as i32
    }
}

/// Snapshot of both drive wheel encoders, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncoderPosition {
    pub left: i32,
    pub right: i32,
}

impl EncoderPosition {
    pub fn new(left: i32, right: i32) -> Self {
        EncoderPosition { left, right }
    }

    /// Moves both wheels by the same amount, rounded to whole encoder degrees
    pub fn offset(self, Degrees(deg): Degrees) -> EncoderPosition {
        EncoderPosition {
            left: Degrees(self.left as f32 + deg).to_encoder(),
            right: Degrees(self.right as f32 + deg).to_encoder(),
        }
    }
}

/// An 8 bit per channel color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub trait UnitsExt {
    /// Converts this value to `Milimeters` (distance)
    fn mm(self) -> Milimeters;
    /// Converts this value to `Degrees` (distance)
    fn deg(self) -> Degrees;
}

impl UnitsExt for f32 {
    fn mm(self) -> Milimeters {
        Milimeters(self)
    }

    fn deg(self) -> Degrees {
        Degrees(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoder_rounding() {
        assert_eq!(2727.27_f32.deg().to_encoder(), 2727);
        assert_eq!((-2727.6_f32).deg().to_encoder(), -2728);
    }

    #[test]
    fn offset_is_applied_to_both_wheels() {
        let start = EncoderPosition::new(10, -20);
        assert_eq!(start.offset(90.4_f32.deg()), EncoderPosition::new(100, 70));
    }
}
