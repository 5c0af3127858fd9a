use serde::{Deserialize, Serialize};

use crate::models::game::Game;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationCategory {
    #[serde(rename = "turn-notification")]
    GamePlay,
    #[serde(rename = "remaining-time-notification")]
    RemainingTime,
}

/// Payload pushed to a player's live connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameNotification {
    pub event: NotificationCategory,
    pub game_id: String,
    pub player_id: String,
    pub message: String,
}

impl GameNotification {
    pub fn new(game: &Game, player_id: &str, category: NotificationCategory) -> Self {
        let message = match category {
            NotificationCategory::RemainingTime => {
                "Time is running out to play your turn".to_string()
            }
            NotificationCategory::GamePlay if game.game_over => {
                if game.winner_player_id.as_deref() == Some(player_id) {
                    "You won the game".to_string()
                } else {
                    "The game is over".to_string()
                }
            }
            NotificationCategory::GamePlay => "It's your turn to play".to_string(),
        };

        GameNotification {
            event: category,
            game_id: game.id.clone(),
            player_id: player_id.to_string(),
            message,
        }
    }
}
