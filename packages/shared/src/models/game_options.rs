use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerMode {
    Single,
    Opponent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OpponentType {
    #[default]
    None,
    Random,
    Friend,
}

impl OpponentType {
    /// Random and friend games have a second human player who can be notified.
    pub fn has_human_opponent(&self) -> bool {
        matches!(self, OpponentType::Random | OpponentType::Friend)
    }
}

/// Options chosen by the creator when a game is started. Captured once and never
/// changed for the lifetime of the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOptions {
    pub player_mode: PlayerMode,
    #[serde(default)]
    pub opponent_type: OpponentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friend_id: Option<String>,
    #[serde(default)]
    pub rematch: bool,
}

impl GameOptions {
    pub fn single() -> Self {
        GameOptions {
            player_mode: PlayerMode::Single,
            opponent_type: OpponentType::None,
            friend_id: None,
            rematch: false,
        }
    }

    pub fn random() -> Self {
        GameOptions {
            player_mode: PlayerMode::Opponent,
            opponent_type: OpponentType::Random,
            friend_id: None,
            rematch: false,
        }
    }

    pub fn friend(friend_id: &str) -> Self {
        GameOptions {
            player_mode: PlayerMode::Opponent,
            opponent_type: OpponentType::Friend,
            friend_id: Some(friend_id.to_string()),
            rematch: false,
        }
    }

    pub fn with_rematch(mut self) -> Self {
        self.rematch = true;
        self
    }

    pub fn is_opponent_mode(&self) -> bool {
        self.player_mode == PlayerMode::Opponent
    }
}
