use std::sync::Arc;

use rand::Rng;
use tracing::{error, info, warn};

use crate::models::game::{Game, GameStatus};
use crate::models::game_options::{GameOptions, OpponentType, PlayerMode};
use crate::repositories::errors::game_repository_errors::GameRepositoryError;
use crate::repositories::game_repository::GameRepository;
use crate::services::errors::matchmaking_service_errors::MatchmakingServiceError;
use crate::services::user_service::UserService;

/// Starts new games and seats players into open random games.
#[derive(Clone)]
pub struct MatchmakingService {
    games: Arc<dyn GameRepository + Send + Sync>,
    user_service: Arc<UserService>,
}

impl MatchmakingService {
    pub fn new(
        games: Arc<dyn GameRepository + Send + Sync>,
        user_service: Arc<UserService>,
    ) -> Self {
        MatchmakingService {
            games,
            user_service,
        }
    }

    /// Creates or joins a game for `user_id` and returns its id.
    pub async fn create_new_game(
        &self,
        user_id: &str,
        game_options: &GameOptions,
    ) -> Result<String, MatchmakingServiceError> {
        validate_options(user_id, game_options)?;

        self.user_service
            .update_last_game_play_option(user_id, game_options)
            .await?;

        let game_id = match game_options.player_mode {
            PlayerMode::Opponent if game_options.rematch => {
                let friend_id = friend_of(game_options)?;
                self.create_friend_user_game(friend_id, GameStatus::Restarted, user_id, game_options)
                    .await?
            }
            PlayerMode::Opponent => match game_options.opponent_type {
                OpponentType::Random => self.join_game(user_id, game_options).await?,
                OpponentType::Friend => {
                    let friend_id = friend_of(game_options)?;
                    self.create_friend_user_game(
                        friend_id,
                        GameStatus::Started,
                        user_id,
                        game_options,
                    )
                    .await?
                }
                OpponentType::None => {
                    return Err(MatchmakingServiceError::ValidationError(
                        "Opponent games need an opponent type".to_string(),
                    ))
                }
            },
            PlayerMode::Single => {
                let status = if game_options.rematch {
                    GameStatus::Restarted
                } else {
                    GameStatus::Started
                };
                self.create_single_and_random_user_game(status, user_id, game_options)
                    .await?
            }
        };

        info!(
            "Player {} is in game {} ({:?})",
            user_id, game_id, game_options.player_mode
        );
        Ok(game_id)
    }

    async fn join_game(
        &self,
        user_id: &str,
        game_options: &GameOptions,
    ) -> Result<String, MatchmakingServiceError> {
        let games = self.games.get_available_games().await.map_err(|e| {
            error!("Failed to load available games for player {}: {}", user_id, e);
            MatchmakingServiceError::from(e)
        })?;

        if games.is_empty() {
            return self
                .create_single_and_random_user_game(GameStatus::Started, user_id, game_options)
                .await;
        }
        self.pick_random_game(games, user_id, game_options).await
    }

    /// Tries candidates in uniformly random order until one can be joined. Each miss,
    /// including a lost race with another joiner, removes the candidate, so the loop
    /// ends after at most one pass. Falls back to a fresh game when nothing is left.
    async fn pick_random_game(
        &self,
        mut candidates: Vec<Game>,
        user_id: &str,
        game_options: &GameOptions,
    ) -> Result<String, MatchmakingServiceError> {
        while !candidates.is_empty() {
            let index = rand::thread_rng().gen_range(0..candidates.len());
            let mut game = candidates.swap_remove(index);

            if game.creator_id() == Some(user_id) || !game.is_awaiting_opponent() {
                continue;
            }

            match self.seat_player(&mut game, user_id).await {
                Ok(()) => {
                    info!("Player {} joined game {}", user_id, game.id);
                    return Ok(game.id);
                }
                Err(GameRepositoryError::Conflict(game_id)) => {
                    warn!(
                        "Game {} was taken by another player, {} candidates left for {}",
                        game_id,
                        candidates.len(),
                        user_id
                    );
                }
                Err(e) => {
                    error!("Failed to join player {} to game {}: {}", user_id, game.id, e);
                    return Err(e.into());
                }
            }
        }

        info!("No open game for player {}, creating a new one", user_id);
        self.create_single_and_random_user_game(GameStatus::Started, user_id, game_options)
            .await
    }

    async fn seat_player(&self, game: &mut Game, user_id: &str) -> Result<(), GameRepositoryError> {
        game.next_turn_player_id = user_id.to_string();
        game.status = GameStatus::JoinedGame;
        game.add_player(user_id);
        for player_id in game.player_ids.clone() {
            game.calculate_stat(&player_id);
        }

        self.games.update_game(game).await?;
        game.version += 1;
        Ok(())
    }

    /// Single player games start with the creator's turn. Random games wait for an
    /// opponent with nobody holding the turn.
    async fn create_single_and_random_user_game(
        &self,
        status: GameStatus,
        user_id: &str,
        game_options: &GameOptions,
    ) -> Result<String, MatchmakingServiceError> {
        let next_turn_player_id = if game_options.is_opponent_mode()
            && game_options.opponent_type == OpponentType::Random
        {
            ""
        } else {
            user_id
        };

        let game = Game::new(
            game_options.clone(),
            vec![user_id.to_string()],
            next_turn_player_id,
            status,
        );
        self.create_game(game).await
    }

    async fn create_friend_user_game(
        &self,
        friend_id: &str,
        status: GameStatus,
        user_id: &str,
        game_options: &GameOptions,
    ) -> Result<String, MatchmakingServiceError> {
        let game = Game::new(
            game_options.clone(),
            vec![user_id.to_string(), friend_id.to_string()],
            user_id,
            status,
        );
        self.create_game(game).await
    }

    /// Inserts the record to obtain its id, then writes it again with the id set.
    async fn create_game(&self, mut game: Game) -> Result<String, MatchmakingServiceError> {
        game.generate_default_stat();

        let game_id = self.games.create_game(&game).await.map_err(|e| {
            error!("Failed to create game: {}", e);
            MatchmakingServiceError::from(e)
        })?;
        game.id = game_id.clone();

        self.games.set_game(&game).await.map_err(|e| {
            error!("Failed to store id on game {}: {}", game_id, e);
            MatchmakingServiceError::from(e)
        })?;

        Ok(game_id)
    }
}

fn validate_options(user_id: &str, game_options: &GameOptions) -> Result<(), MatchmakingServiceError> {
    if user_id.is_empty() {
        return Err(MatchmakingServiceError::ValidationError(
            "User ID cannot be empty".to_string(),
        ));
    }
    if game_options.is_opponent_mode() {
        if game_options.opponent_type == OpponentType::None {
            return Err(MatchmakingServiceError::ValidationError(
                "Opponent games need an opponent type".to_string(),
            ));
        }
        let needs_friend =
            game_options.rematch || game_options.opponent_type == OpponentType::Friend;
        if needs_friend && friend_of(game_options)? == user_id {
            return Err(MatchmakingServiceError::ValidationError(
                "Players cannot invite themselves".to_string(),
            ));
        }
    }
    Ok(())
}

fn friend_of(game_options: &GameOptions) -> Result<&str, MatchmakingServiceError> {
    game_options
        .friend_id
        .as_deref()
        .filter(|friend_id| !friend_id.is_empty())
        .ok_or_else(|| {
            MatchmakingServiceError::ValidationError("A friend_id is required".to_string())
        })
}
