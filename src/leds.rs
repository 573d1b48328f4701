//! Status colors shown on the car's two eye LEDs.
//!
//! Red means a motor or servo command is in flight, green means the car is idle.

use anyhow::Context;

use crate::error::Result;
use crate::robot::{Board, Eye};
use crate::types::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedColor {
    Red,
    Yellow,
    Green,
}

impl LedColor {
    /// The triplet written to the eyes for this status
    ///
    /// Red and green keep the other channels at 1 rather than 0.
    pub const fn rgb(self) -> Rgb {
        match self {
            LedColor::Red => Rgb(255, 1, 1),
            LedColor::Yellow => Rgb(255, 255, 0),
            LedColor::Green => Rgb(1, 255, 1),
        }
    }
}

/// Sets both eyes to `color` and makes sure they are on
pub fn show<B: Board + ?Sized>(board: &mut B, color: LedColor) -> Result<()> {
    let rgb = color.rgb();

    for eye in Eye::BOTH {
        board
            .set_eye_color(eye, rgb)
            .with_context(|| format!("Set {eye:?} eye color"))?;
    }
    for eye in Eye::BOTH {
        board
            .open_eye(eye)
            .with_context(|| format!("Open {eye:?} eye"))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{BoardEvent, SimBoard};

    #[test]
    fn triplets() {
        assert_eq!(LedColor::Yellow.rgb(), Rgb(255, 255, 0));
        assert_eq!(LedColor::Green.rgb(), Rgb(1, 255, 1));
        assert_eq!(LedColor::Red.rgb(), Rgb(255, 1, 1));
    }

    #[test]
    fn colors_then_opens_both_eyes() {
        let mut board = SimBoard::new();
        show(&mut board, LedColor::Yellow).unwrap();

        assert_eq!(
            board.events(),
            &[
                BoardEvent::EyeColor(Eye::Left, Rgb(255, 255, 0)),
                BoardEvent::EyeColor(Eye::Right, Rgb(255, 255, 0)),
                BoardEvent::EyeOpen(Eye::Left),
                BoardEvent::EyeOpen(Eye::Right),
            ]
        );
        assert_eq!(board.eye(Eye::Left), Some(Rgb(255, 255, 0)));
        assert_eq!(board.eye(Eye::Right), Some(Rgb(255, 255, 0)));
    }

    #[test]
    fn idempotent() {
        let mut board = SimBoard::new();
        show(&mut board, LedColor::Green).unwrap();
        show(&mut board, LedColor::Green).unwrap();

        assert_eq!(board.eye(Eye::Left), Some(LedColor::Green.rgb()));
        assert_eq!(board.events().len(), 8);
    }
}
