use crate::snakeladder::{BoardCoordinate, Cell, DieFace, Players, RollReport, Status};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StateResponse {
    pub positions: Players<Cell>,
    pub status: Status,
    pub last_roll: Option<DieFace>,
    pub message: String,
    pub turn_counts: Players<u32>,
    pub wins: Players<u32>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RollResponse {
    pub report: RollReport,
    // Faces to flash before showing the real roll
    pub animation: Vec<DieFace>,
    pub state: StateResponse,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct JumpView {
    pub from: Cell,
    pub to: Cell,
    pub start: BoardCoordinate,
    pub end: BoardCoordinate,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BoardResponse {
    pub size: u8,
    pub rows: Vec<Vec<Cell>>,
    pub snakes: Vec<JumpView>,
    pub ladders: Vec<JumpView>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum Response {
    State(StateResponse),
    Roll(RollResponse),
    Error(String),
}
