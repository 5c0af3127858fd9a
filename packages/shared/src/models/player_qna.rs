use serde::{Deserialize, Serialize};

/// One answer attempt by a player. `player_answer_in_seconds` stays empty until the
/// player actually submits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerQnA {
    pub question_id: String,
    pub player_id: String,
    #[serde(default)]
    pub player_answer_id: Option<String>,
    #[serde(default)]
    pub answer_correct: bool,
    #[serde(default)]
    pub player_answer_in_seconds: Option<u32>,
    #[serde(default)]
    pub round: Option<u32>,
}

impl PlayerQnA {
    /// A question handed to a player that has not been answered yet.
    pub fn asked(question_id: &str, player_id: &str) -> Self {
        PlayerQnA {
            question_id: question_id.to_string(),
            player_id: player_id.to_string(),
            player_answer_id: None,
            answer_correct: false,
            player_answer_in_seconds: None,
            round: None,
        }
    }

    pub fn answered(
        question_id: &str,
        player_id: &str,
        answer_id: &str,
        answer_correct: bool,
        seconds: u32,
    ) -> Self {
        PlayerQnA {
            question_id: question_id.to_string(),
            player_id: player_id.to_string(),
            player_answer_id: Some(answer_id.to_string()),
            answer_correct,
            player_answer_in_seconds: Some(seconds),
            round: None,
        }
    }

    pub fn is_answered(&self) -> bool {
        self.player_answer_in_seconds.is_some()
    }
}
