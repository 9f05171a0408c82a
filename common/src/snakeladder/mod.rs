mod board;
mod dice;
mod game_state;
mod player;

pub use board::{
    Board, BoardCoordinate, BoardError, Cell, CellError, Jump, JumpKind, Landing, BOARD_SIZE,
    LADDERS, SNAKES,
};
pub use dice::{DiceRng, DieFace, DieFaceError, StdDice};
pub use game_state::{GameState, Outcome, RollReport, Status, START_MESSAGE};
pub use player::{PlayerNum, Players};
