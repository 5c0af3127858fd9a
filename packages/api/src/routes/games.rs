use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use shared::models::game::Game;
use shared::models::game_operation::GameOperation;
use shared::models::game_options::GameOptions;
use shared::services::errors::game_service_errors::GameServiceError;
use tracing::{info, warn};

use crate::{error::ApiError, middleware::auth::AuthenticatedUser, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/games", post(create_game))
        .route("/games/{game_id}", get(get_game))
        .route("/games/{game_id}/operations", post(apply_operation))
        .route("/games/{game_id}/turn-timeout", post(turn_timeout))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateGameResponse {
    pub game_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TurnTimeoutResponse {
    pub turn_was_already_complete: bool,
}

async fn create_game(
    State(state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    Json(game_options): Json<GameOptions>,
) -> Result<(StatusCode, Json<CreateGameResponse>), ApiError> {
    let game_id = state
        .matchmaking_service
        .create_new_game(&authenticated_user.user_id, &game_options)
        .await?;

    Ok((StatusCode::CREATED, Json(CreateGameResponse { game_id })))
}

async fn get_game(
    State(state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    Path(game_id): Path<String>,
) -> Result<Json<Game>, ApiError> {
    let game = load_player_game(&state, &authenticated_user, &game_id).await?;
    Ok(Json(game))
}

async fn apply_operation(
    State(state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    Path(game_id): Path<String>,
    Json(operation): Json<GameOperation>,
) -> Result<Json<Game>, ApiError> {
    let user_id = &authenticated_user.user_id;
    let mut game = load_player_game(&state, &authenticated_user, &game_id).await?;
    check_operation(user_id, &game, &operation)?;

    state
        .game_play_service
        .apply_operation(user_id, &mut game, operation)
        .await?;

    Ok(Json(game))
}

async fn turn_timeout(
    State(state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    Path(game_id): Path<String>,
) -> Result<Json<TurnTimeoutResponse>, ApiError> {
    let mut game = load_player_game(&state, &authenticated_user, &game_id).await?;

    let turn_was_already_complete = state.game_play_service.change_the_turn(&mut game).await?;
    info!(
        "Turn timeout for game {} requested by {}, already complete: {}",
        game_id, authenticated_user.user_id, turn_was_already_complete
    );

    Ok(Json(TurnTimeoutResponse {
        turn_was_already_complete,
    }))
}

async fn load_player_game(
    state: &AppState,
    authenticated_user: &AuthenticatedUser,
    game_id: &str,
) -> Result<Game, ApiError> {
    let game = state.game_play_service.get_game(game_id).await?;
    ensure_player(&game, &authenticated_user.user_id)?;
    Ok(game)
}

fn ensure_player(game: &Game, user_id: &str) -> Result<(), ApiError> {
    if !game.is_player(user_id) {
        warn!("Player {} is not part of game {}", user_id, game.id);
        return Err(ApiError::Forbidden);
    }
    Ok(())
}

/// Answers may only be submitted for the caller. Finished games accept nothing but
/// status reports.
fn check_operation(
    user_id: &str,
    game: &Game,
    operation: &GameOperation,
) -> Result<(), ApiError> {
    if game.game_over && !matches!(operation, GameOperation::ReportStatus(_)) {
        return Err(GameServiceError::GameAlreadyOver(game.id.clone()).into());
    }
    if let GameOperation::CalculateScore(answer) | GameOperation::ReportStatus(answer) = operation {
        if answer.player_id != user_id {
            warn!(
                "Player {} tried to submit an answer for {} in game {}",
                user_id, answer.player_id, game.id
            );
            return Err(ApiError::Forbidden);
        }
    }
    Ok(())
}
