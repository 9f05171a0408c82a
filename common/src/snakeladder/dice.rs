use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const DIE_SIDES: u8 = 6;

#[derive(Error, Debug, PartialEq)]
#[error("Die face {0} is not between 1 and 6")]
pub struct DieFaceError(pub u8);

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(try_from = "u8", into = "u8")]
pub struct DieFace(u8);

impl DieFace {
    pub fn new(value: u8) -> Result<Self, DieFaceError> {
        if (1..=DIE_SIDES).contains(&value) {
            Ok(DieFace(value))
        } else {
            Err(DieFaceError(value))
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for DieFace {
    type Error = DieFaceError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        DieFace::new(value)
    }
}

impl From<DieFace> for u8 {
    fn from(face: DieFace) -> Self {
        face.0
    }
}

impl fmt::Display for DieFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of die rolls. Tests substitute a scripted implementation.
pub trait DiceRng {
    fn roll(&mut self) -> DieFace;
}

#[derive(Debug)]
pub struct StdDice {
    rng: StdRng,
}

impl StdDice {
    pub fn seeded(seed: u64) -> Self {
        StdDice {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for StdDice {
    fn default() -> Self {
        StdDice {
            rng: StdRng::from_entropy(),
        }
    }
}

impl DiceRng for StdDice {
    fn roll(&mut self) -> DieFace {
        DieFace(self.rng.gen_range(1..=DIE_SIDES))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_die_face_bounds() {
        assert_eq!(DieFace::new(0), Err(DieFaceError(0)));
        assert_eq!(DieFace::new(7), Err(DieFaceError(7)));
        for value in 1..=6 {
            assert_eq!(DieFace::new(value).unwrap().get(), value);
        }
    }

    #[test]
    fn test_dice_roll() {
        let mut dice = StdDice::default();
        let mut seen = [false; 6];
        for _ in 0..1000 {
            let face = dice.roll().get();
            assert!((1..=6).contains(&face));
            seen[usize::from(face - 1)] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_seeded_dice_repeat() {
        let mut a = StdDice::seeded(7);
        let mut b = StdDice::seeded(7);
        for _ in 0..50 {
            assert_eq!(a.roll(), b.roll());
        }
    }

    #[test]
    fn test_die_face_serde() {
        assert_eq!(serde_json::to_string(&DieFace::new(4).unwrap()).unwrap(), "4");
        assert!(serde_json::from_str::<DieFace>("9").is_err());
    }
}
