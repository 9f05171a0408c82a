use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PlayerNum {
    P1,
    P2,
}

impl PlayerNum {
    pub const ALL: [PlayerNum; 2] = [PlayerNum::P1, PlayerNum::P2];

    pub fn opponent(&self) -> PlayerNum {
        match self {
            PlayerNum::P1 => PlayerNum::P2,
            PlayerNum::P2 => PlayerNum::P1,
        }
    }
}

impl fmt::Display for PlayerNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerNum::P1 => write!(f, "P1"),
            PlayerNum::P2 => write!(f, "P2"),
        }
    }
}

// Per-player values, serialized as {"P1": .., "P2": ..}
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct Players<T> {
    #[serde(rename = "P1")]
    p1: T,
    #[serde(rename = "P2")]
    p2: T,
}

impl<T: Clone> Players<T> {
    pub fn both(value: T) -> Self {
        Players {
            p1: value.clone(),
            p2: value,
        }
    }
}

impl<T> Index<PlayerNum> for Players<T> {
    type Output = T;
    fn index(&self, index: PlayerNum) -> &Self::Output {
        match index {
            PlayerNum::P1 => &self.p1,
            PlayerNum::P2 => &self.p2,
        }
    }
}

impl<T> IndexMut<PlayerNum> for Players<T> {
    fn index_mut(&mut self, index: PlayerNum) -> &mut Self::Output {
        match index {
            PlayerNum::P1 => &mut self.p1,
            PlayerNum::P2 => &mut self.p2,
        }
    }
}
