use serde::{Deserialize, Serialize};

use crate::models::player_qna::PlayerQnA;

/// A player action applied to a game. Operations that carry an answer own it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", content = "player_qna", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameOperation {
    CalculateScore(PlayerQnA),
    GameOver,
    ReportStatus(PlayerQnA),
    RejectGame,
    UpdateRound,
}

impl GameOperation {
    pub fn name(&self) -> &'static str {
        match self {
            GameOperation::CalculateScore(_) => "CALCULATE_SCORE",
            GameOperation::GameOver => "GAME_OVER",
            GameOperation::ReportStatus(_) => "REPORT_STATUS",
            GameOperation::RejectGame => "REJECT_GAME",
            GameOperation::UpdateRound => "UPDATE_ROUND",
        }
    }
}
