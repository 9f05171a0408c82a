use common::messages::{BoardResponse, RollResponse, StateResponse};
use common::{DiceRng, GameState, Outcome, StdDice};
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

pub type SharedGame = Arc<RwLock<Game<StdDice>>>;

/// The one game session this server hosts.
#[derive(Debug)]
pub struct Game<R: DiceRng + Debug> {
    game_state: GameState<R>,
    // Faces shown while the die "tumbles"; independent of the real roll
    animation_dice: R,
    animation_frames: usize,
}

impl<R: DiceRng + Debug> Game<R> {
    pub fn new(game_state: GameState<R>, animation_dice: R, animation_frames: usize) -> Self {
        Game {
            game_state,
            animation_dice,
            animation_frames,
        }
    }

    pub fn roll(&mut self) -> RollResponse {
        let report = self.game_state.roll();
        let animation = match report.outcome {
            Outcome::AlreadyFinished { .. } => Vec::new(),
            _ => (0..self.animation_frames)
                .map(|_| self.animation_dice.roll())
                .collect(),
        };
        info!(
            player = %report.player,
            outcome = ?report.outcome,
            "{}",
            self.game_state.message()
        );
        RollResponse {
            report,
            animation,
            state: self.game_state.view(),
        }
    }

    pub fn reset(&mut self) -> StateResponse {
        self.game_state.reset();
        info!("game reset");
        self.game_state.view()
    }

    pub fn state(&self) -> StateResponse {
        self.game_state.view()
    }

    pub fn board(&self) -> BoardResponse {
        self.game_state.board().view()
    }
}
