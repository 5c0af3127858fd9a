use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::game_options::{GameOptions, PlayerMode};
use crate::models::player_qna::PlayerQnA;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    WaitingForFriendInvitationAcceptance,
    WaitingForRandomPlayerInvitationAcceptance,
    Started,
    Restarted,
    JoinedGame,
    Completed,
    Rejected,
    TimeExpired,
    InvitationTimeout,
}

impl GameStatus {
    /// Statuses a game can only reach once `game_over` is set.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GameStatus::Completed
                | GameStatus::Rejected
                | GameStatus::TimeExpired
                | GameStatus::InvitationTimeout
        )
    }

    pub fn is_waiting_for_invitation(&self) -> bool {
        matches!(
            self,
            GameStatus::WaitingForFriendInvitationAcceptance
                | GameStatus::WaitingForRandomPlayerInvitationAcceptance
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStat {
    pub score: u32,
    pub answered: u32,
    pub wrong_answers: u32,
    pub avg_answer_time: u32,
    pub consecutive_correct: u32,
    pub round: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    /// Empty until the record has been created in storage.
    #[serde(default)]
    pub id: String,
    pub player_ids: Vec<String>,
    pub game_options: GameOptions,
    /// Empty while a random game is waiting for an opponent.
    pub next_turn_player_id: String,
    #[serde(default)]
    pub player_qnas: Vec<PlayerQnA>,
    #[serde(default)]
    pub round: Option<u32>,
    #[serde(default)]
    pub stats: HashMap<String, PlayerStat>,
    pub turn_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub game_over: bool,
    #[serde(default)]
    pub winner_player_id: Option<String>,
    pub status: GameStatus,
    /// Optimistic concurrency counter, bumped on every conditional update.
    #[serde(default)]
    pub version: u64,
}

impl Game {
    pub fn new(
        game_options: GameOptions,
        player_ids: Vec<String>,
        next_turn_player_id: &str,
        status: GameStatus,
    ) -> Self {
        let now = Utc::now();
        Game {
            id: String::new(),
            player_ids,
            game_options,
            next_turn_player_id: next_turn_player_id.to_string(),
            player_qnas: vec![],
            round: None,
            stats: HashMap::new(),
            turn_at: now,
            created_at: now,
            game_over: false,
            winner_player_id: None,
            status,
            version: 0,
        }
    }

    pub fn creator_id(&self) -> Option<&str> {
        self.player_ids.first().map(String::as_str)
    }

    pub fn is_player(&self, player_id: &str) -> bool {
        self.player_ids.iter().any(|id| id == player_id)
    }

    /// The first player in the game who is not `player_id`.
    pub fn other_player(&self, player_id: &str) -> Option<&str> {
        self.player_ids
            .iter()
            .find(|id| id.as_str() != player_id)
            .map(String::as_str)
    }

    pub fn is_awaiting_opponent(&self) -> bool {
        self.next_turn_player_id.is_empty()
    }

    pub fn find_qna_index(&self, question_id: &str) -> Option<usize> {
        self.player_qnas
            .iter()
            .position(|qna| qna.question_id == question_id)
    }

    /// Latest record submitted by `player_id`.
    pub fn last_qna_of(&self, player_id: &str) -> Option<&PlayerQnA> {
        self.player_qnas
            .iter()
            .rev()
            .find(|qna| qna.player_id == player_id)
    }

    /// Hands the turn to the opponent after a wrong answer. Correct answers keep the
    /// turn with the acting player, and single player games never change hands.
    /// Answers from anyone but the current turn holder are ignored.
    pub fn decide_next_turn(&mut self, answer: &PlayerQnA, acting_player_id: &str) {
        if self.game_options.player_mode != PlayerMode::Opponent {
            return;
        }
        if self.next_turn_player_id != acting_player_id || !self.is_player(acting_player_id) {
            return;
        }
        if answer.answer_correct {
            return;
        }

        self.next_turn_player_id = self
            .other_player(acting_player_id)
            .unwrap_or_default()
            .to_string();
    }

    /// Picks the highest scoring player. A tie goes to the current turn holder, or to
    /// the creator when nobody holds the turn.
    pub fn decide_winner(&mut self) {
        let score = |player_id: &str| self.stats.get(player_id).map_or(0, |stat| stat.score);

        let mut winner: Option<&str> = None;
        for player_id in &self.player_ids {
            winner = match winner {
                None => Some(player_id.as_str()),
                Some(current) if score(player_id.as_str()) > score(current) => {
                    Some(player_id.as_str())
                }
                Some(current)
                    if score(player_id.as_str()) == score(current)
                        && *player_id == self.next_turn_player_id =>
                {
                    Some(player_id.as_str())
                }
                keep => keep,
            };
        }

        self.winner_player_id = winner.map(str::to_string);
    }

    pub fn calculate_stat(&mut self, player_id: &str) {
        let qnas: Vec<&PlayerQnA> = self
            .player_qnas
            .iter()
            .filter(|qna| qna.player_id == player_id)
            .collect();

        let answered: Vec<&&PlayerQnA> = qnas.iter().filter(|qna| qna.is_answered()).collect();
        let score = qnas.iter().filter(|qna| qna.answer_correct).count() as u32;
        let wrong_answers = answered.iter().filter(|qna| !qna.answer_correct).count() as u32;
        let total_time: u64 = answered
            .iter()
            .filter_map(|qna| qna.player_answer_in_seconds)
            .map(u64::from)
            .sum();
        let avg_answer_time = if answered.is_empty() {
            0
        } else {
            (total_time / answered.len() as u64) as u32
        };
        let consecutive_correct = qnas
            .iter()
            .rev()
            .take_while(|qna| qna.answer_correct)
            .count() as u32;

        let stat = PlayerStat {
            score,
            answered: answered.len() as u32,
            wrong_answers,
            avg_answer_time,
            consecutive_correct,
            round: self.round.unwrap_or(1),
        };
        self.stats.insert(player_id.to_string(), stat);
    }

    /// Seats a second player. Ignored if the player is already seated or the game is
    /// full.
    pub fn add_player(&mut self, player_id: &str) {
        if self.is_player(player_id) || self.player_ids.len() >= 2 {
            return;
        }
        self.player_ids.push(player_id.to_string());
    }

    pub fn generate_default_stat(&mut self) {
        for player_id in &self.player_ids {
            self.stats.insert(
                player_id.clone(),
                PlayerStat {
                    round: 1,
                    ..PlayerStat::default()
                },
            );
        }
    }
}
