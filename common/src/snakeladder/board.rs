use crate::messages::{BoardResponse, JumpView};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub const BOARD_SIZE: u8 = 10;
const LAST_CELL: u8 = BOARD_SIZE * BOARD_SIZE;

// (trigger, destination)
pub const SNAKES: [(u8, u8); 4] = [(99, 54), (70, 55), (52, 42), (25, 2)];
pub const LADDERS: [(u8, u8); 4] = [(6, 25), (11, 40), (60, 85), (46, 90)];

#[derive(Error, Debug, PartialEq)]
#[error("Cell {0} is not on the board (1..=100)")]
pub struct CellError(pub u8);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JumpKind {
    Snake,
    Ladder,
}

impl fmt::Display for JumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JumpKind::Snake => write!(f, "snake"),
            JumpKind::Ladder => write!(f, "ladder"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum BoardError {
    #[error(transparent)]
    InvalidCell(#[from] CellError),
    #[error("The {kind} at {from} leads back to itself")]
    SelfLoop { kind: JumpKind, from: Cell },
    #[error("The {kind} from {from} to {to} goes the wrong way")]
    WrongDirection { kind: JumpKind, from: Cell, to: Cell },
    #[error("A {kind} cannot start on cell {from}")]
    ReservedTrigger { kind: JumpKind, from: Cell },
    #[error("More than one {kind} starts on cell {from}")]
    DuplicateTrigger { kind: JumpKind, from: Cell },
    #[error("Cell {0} is both a snake and a ladder trigger")]
    SharedTrigger(Cell),
}

/// A cell number on the board, always within 1..=100.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub struct Cell(u8);

impl Cell {
    pub const START: Cell = Cell(1);
    pub const FINISH: Cell = Cell(LAST_CELL);

    pub fn new(num: u8) -> Result<Self, CellError> {
        if (Self::START.0..=Self::FINISH.0).contains(&num) {
            Ok(Cell(num))
        } else {
            Err(CellError(num))
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    // None when the move would run past the last cell
    pub fn advance(self, steps: u8) -> Option<Cell> {
        match self.0.checked_add(steps) {
            Some(target) if target <= LAST_CELL => Some(Cell(target)),
            _ => None,
        }
    }

    /// Number of steps left until the last cell.
    pub fn distance_to_finish(&self) -> u8 {
        LAST_CELL - self.0
    }

    // Cells snake back and forth: even rows run left to right, odd rows right to left.
    pub fn coordinate(&self) -> BoardCoordinate {
        let idx = self.0 - 1;
        let y = idx / BOARD_SIZE;
        let col = idx % BOARD_SIZE;
        let x = if y % 2 == 0 { col } else { BOARD_SIZE - 1 - col };
        BoardCoordinate { x, y }
    }

    pub fn at(coordinate: BoardCoordinate) -> Option<Cell> {
        let BoardCoordinate { x, y } = coordinate;
        if x >= BOARD_SIZE || y >= BOARD_SIZE {
            return None;
        }
        let col = if y % 2 == 0 { x } else { BOARD_SIZE - 1 - x };
        Some(Cell(y * BOARD_SIZE + col + 1))
    }
}

impl TryFrom<u8> for Cell {
    type Error = CellError;

    fn try_from(num: u8) -> Result<Self, Self::Error> {
        Cell::new(num)
    }
}

impl From<Cell> for u8 {
    fn from(cell: Cell) -> Self {
        cell.0
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// x counts columns from the left, y counts rows from the bottom
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub struct BoardCoordinate {
    pub x: u8,
    pub y: u8,
}

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub struct Jump {
    pub from: Cell,
    pub to: Cell,
}

impl Jump {
    fn view(&self) -> JumpView {
        JumpView {
            from: self.from,
            to: self.to,
            start: self.from.coordinate(),
            end: self.to.coordinate(),
        }
    }
}

/// Where a move ends after the board has had its say.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Landing {
    Plain(Cell),
    Snake(Jump),
    Ladder(Jump),
}

impl Landing {
    pub fn cell(&self) -> Cell {
        match self {
            Landing::Plain(cell) => *cell,
            Landing::Snake(jump) | Landing::Ladder(jump) => jump.to,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Board {
    snakes: BTreeMap<Cell, Cell>,
    ladders: BTreeMap<Cell, Cell>,
}

impl Default for Board {
    fn default() -> Self {
        let jumps = |pairs: &[(u8, u8)]| -> BTreeMap<Cell, Cell> {
            pairs
                .iter()
                .map(|&(from, to)| (Cell(from), Cell(to)))
                .collect()
        };
        Board {
            snakes: jumps(&SNAKES),
            ladders: jumps(&LADDERS),
        }
    }
}

impl Board {
    // Ensure that the given jumps meet the following criteria:
    // - every cell is on the board
    // - no jump starts on the first or the last cell
    // - snakes only go down and ladders only go up
    // - no cell triggers more than one jump
    pub fn new(snakes: &[(u8, u8)], ladders: &[(u8, u8)]) -> Result<Self, BoardError> {
        let snakes = collect_jumps(JumpKind::Snake, snakes)?;
        let ladders = collect_jumps(JumpKind::Ladder, ladders)?;
        if let Some(shared) = snakes.keys().find(|from| ladders.contains_key(*from)) {
            return Err(BoardError::SharedTrigger(*shared));
        }
        Ok(Board { snakes, ladders })
    }

    /// Applies the snake or ladder starting on `cell`, if any.
    ///
    /// Snakes are looked up before ladders. Jumps do not chain: the
    /// destination is final even when it triggers another jump.
    pub fn resolve(&self, cell: Cell) -> Landing {
        if let Some(&to) = self.snakes.get(&cell) {
            Landing::Snake(Jump { from: cell, to })
        } else if let Some(&to) = self.ladders.get(&cell) {
            Landing::Ladder(Jump { from: cell, to })
        } else {
            Landing::Plain(cell)
        }
    }

    pub fn snakes(&self) -> impl Iterator<Item = Jump> + '_ {
        self.snakes.iter().map(|(&from, &to)| Jump { from, to })
    }

    pub fn ladders(&self) -> impl Iterator<Item = Jump> + '_ {
        self.ladders.iter().map(|(&from, &to)| Jump { from, to })
    }

    // Rows as they are drawn, top row first
    pub fn rows(&self) -> Vec<Vec<Cell>> {
        (0..BOARD_SIZE)
            .rev()
            .map(|y| {
                (0..BOARD_SIZE)
                    .filter_map(|x| Cell::at(BoardCoordinate { x, y }))
                    .collect()
            })
            .collect()
    }

    pub fn view(&self) -> BoardResponse {
        BoardResponse {
            size: BOARD_SIZE,
            rows: self.rows(),
            snakes: self.snakes().map(|jump| jump.view()).collect(),
            ladders: self.ladders().map(|jump| jump.view()).collect(),
        }
    }
}

fn collect_jumps(kind: JumpKind, pairs: &[(u8, u8)]) -> Result<BTreeMap<Cell, Cell>, BoardError> {
    let mut jumps = BTreeMap::new();
    for &(from, to) in pairs {
        let from = Cell::new(from)?;
        let to = Cell::new(to)?;
        if from == to {
            return Err(BoardError::SelfLoop { kind, from });
        }
        if from == Cell::START || from == Cell::FINISH {
            return Err(BoardError::ReservedTrigger { kind, from });
        }
        let wrong_way = match kind {
            JumpKind::Snake => to > from,
            JumpKind::Ladder => to < from,
        };
        if wrong_way {
            return Err(BoardError::WrongDirection { kind, from, to });
        }
        if jumps.insert(from, to).is_some() {
            return Err(BoardError::DuplicateTrigger { kind, from });
        }
    }
    Ok(jumps)
}
