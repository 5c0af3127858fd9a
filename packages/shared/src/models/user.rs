use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::game_options::GameOptions;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub last_game_play_option: Option<GameOptions>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: &str) -> Self {
        User {
            id: id.to_string(),
            display_name: None,
            last_game_play_option: None,
            created_at: Utc::now(),
        }
    }
}
