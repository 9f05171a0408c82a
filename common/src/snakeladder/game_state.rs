use crate::messages::StateResponse;
use crate::snakeladder::board::{Board, Cell, Jump, Landing};
use crate::snakeladder::dice::{DiceRng, DieFace};
use crate::snakeladder::player::{PlayerNum, Players};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::debug;

pub const START_MESSAGE: &str = "Player 1 starts!";

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Status {
    InProgress { turn: PlayerNum },
    Finished { winner: PlayerNum },
}

/// What a single call to [`GameState::roll`] did.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Moved { to: Cell },
    BittenBySnake { from: Cell, to: Cell },
    ClimbedLadder { from: Cell, to: Cell },
    // The roll would have run past the last cell
    StayedInPlace { at: Cell },
    Won,
    // Nothing happened, the game was already over
    AlreadyFinished { winner: PlayerNum },
}

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub struct RollReport {
    pub player: PlayerNum,
    pub roll: Option<DieFace>,
    pub outcome: Outcome,
    pub status: Status,
}

#[derive(Debug)]
pub struct GameState<R: Debug> {
    board: Board,
    positions: Players<Cell>,
    turn_counts: Players<u32>,
    wins: Players<u32>,
    status: Status,
    last_roll: Option<DieFace>,
    message: String,
    rng: R,
}

impl<R: DiceRng + Default + Debug> Default for GameState<R> {
    fn default() -> Self {
        GameState::new(Board::default(), R::default())
    }
}

impl<R: DiceRng + Debug> GameState<R> {
    pub fn new(board: Board, rng: R) -> Self {
        GameState {
            board,
            positions: Players::both(Cell::START),
            turn_counts: Players::both(0),
            wins: Players::both(0),
            status: Status::InProgress {
                turn: PlayerNum::P1,
            },
            last_roll: None,
            message: START_MESSAGE.to_string(),
            rng,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn position(&self, player_num: PlayerNum) -> Cell {
        self.positions[player_num]
    }

    pub fn turn_count(&self, player_num: PlayerNum) -> u32 {
        self.turn_counts[player_num]
    }

    pub fn wins(&self, player_num: PlayerNum) -> u32 {
        self.wins[player_num]
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn winner(&self) -> Option<PlayerNum> {
        match self.status {
            Status::Finished { winner } => Some(winner),
            Status::InProgress { .. } => None,
        }
    }

    pub fn last_roll(&self) -> Option<DieFace> {
        self.last_roll
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Rolls the die for the player whose turn it is and applies the board.
    ///
    /// Once somebody has won this changes nothing and reports
    /// [`Outcome::AlreadyFinished`] until [`GameState::reset`] is called.
    pub fn roll(&mut self) -> RollReport {
        let player = match self.status {
            Status::Finished { winner } => {
                debug!(%winner, "roll ignored, game is finished");
                return RollReport {
                    player: winner,
                    roll: None,
                    outcome: Outcome::AlreadyFinished { winner },
                    status: self.status,
                };
            }
            Status::InProgress { turn } => turn,
        };

        let roll = self.rng.roll();
        self.last_roll = Some(roll);
        self.turn_counts[player] += 1;

        let current = self.positions[player];
        let landing = current
            .advance(roll.get())
            .map(|candidate| self.board.resolve(candidate));
        let destination = landing.map_or(current, |l| l.cell());
        self.positions[player] = destination;

        let outcome = if destination == Cell::FINISH {
            self.status = Status::Finished { winner: player };
            self.wins[player] += 1;
            Outcome::Won
        } else {
            self.status = Status::InProgress {
                turn: player.opponent(),
            };
            match landing {
                None => Outcome::StayedInPlace { at: current },
                Some(Landing::Plain(to)) => Outcome::Moved { to },
                Some(Landing::Snake(Jump { from, to })) => Outcome::BittenBySnake { from, to },
                Some(Landing::Ladder(Jump { from, to })) => Outcome::ClimbedLadder { from, to },
            }
        };
        self.message = describe(player, roll, outcome, self.status);
        debug!(%player, %roll, from = %current, to = %destination, "{}", self.message);

        RollReport {
            player,
            roll: Some(roll),
            outcome,
            status: self.status,
        }
    }

    // Starts a new game. Wins carry over.
    pub fn reset(&mut self) {
        self.positions = Players::both(Cell::START);
        self.turn_counts = Players::both(0);
        self.status = Status::InProgress {
            turn: PlayerNum::P1,
        };
        self.last_roll = None;
        self.message = START_MESSAGE.to_string();
    }

    pub fn view(&self) -> StateResponse {
        StateResponse {
            positions: self.positions,
            status: self.status,
            last_roll: self.last_roll,
            message: self.message.clone(),
            turn_counts: self.turn_counts,
            wins: self.wins,
        }
    }
}

fn describe(player: PlayerNum, roll: DieFace, outcome: Outcome, status: Status) -> String {
    let summary = match outcome {
        Outcome::Won | Outcome::AlreadyFinished { .. } => {
            return format!("{} WINS the game!", player);
        }
        Outcome::Moved { to } => format!("{} moved to {}", player, to),
        Outcome::BittenBySnake { from, to } => {
            format!("{} got bitten by a snake at {}, down to {}", player, from, to)
        }
        Outcome::ClimbedLadder { from, to } => {
            format!("{} climbed a ladder at {}, up to {}", player, from, to)
        }
        Outcome::StayedInPlace { at } => format!(
            "{} rolled {} but needs exactly {} to reach 100, stays at {}",
            player,
            roll,
            at.distance_to_finish(),
            at
        ),
    };
    match status {
        Status::InProgress { turn } => format!("{} | {}'s turn.", summary, turn),
        Status::Finished { .. } => summary,
    }
}
