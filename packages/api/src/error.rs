use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::repositories::errors::game_repository_errors::GameRepositoryError;
use shared::services::errors::{
    game_service_errors::GameServiceError, matchmaking_service_errors::MatchmakingServiceError,
    user_service_errors::UserServiceError,
};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug)]
pub enum ApiError {
    Matchmaking(MatchmakingServiceError),
    GamePlay(GameServiceError),
    /// The caller is not one of the game's players.
    Forbidden,
    Unauthorized,
}

impl From<MatchmakingServiceError> for ApiError {
    fn from(error: MatchmakingServiceError) -> Self {
        ApiError::Matchmaking(error)
    }
}

impl From<GameServiceError> for ApiError {
    fn from(error: GameServiceError) -> Self {
        ApiError::GamePlay(error)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Matchmaking(err) => write!(f, "{}", err),
            ApiError::GamePlay(err) => write!(f, "{}", err),
            ApiError::Forbidden => write!(f, "Not a player of this game"),
            ApiError::Unauthorized => write!(f, "Missing player identity"),
        }
    }
}

fn repository_status(error: &GameRepositoryError) -> StatusCode {
    match error {
        GameRepositoryError::NotFound(_) => StatusCode::NOT_FOUND,
        GameRepositoryError::Conflict(_) => StatusCode::CONFLICT,
        GameRepositoryError::Serialization(_) | GameRepositoryError::DynamoDb(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Matchmaking(MatchmakingServiceError::ValidationError(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Matchmaking(MatchmakingServiceError::RepositoryError(err)) => {
                repository_status(err)
            }
            ApiError::Matchmaking(MatchmakingServiceError::UserServiceError(err)) => match err {
                UserServiceError::UserNotFound => StatusCode::NOT_FOUND,
                UserServiceError::ValidationError(_) => StatusCode::BAD_REQUEST,
                UserServiceError::RepositoryError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },

            ApiError::GamePlay(GameServiceError::RepositoryError(err)) => repository_status(err),
            ApiError::GamePlay(GameServiceError::QuestionNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::GamePlay(GameServiceError::GameAlreadyOver(_)) => StatusCode::CONFLICT,
            ApiError::GamePlay(GameServiceError::ValidationError(_)) => StatusCode::BAD_REQUEST,
            ApiError::GamePlay(
                GameServiceError::NotificationError(_)
                | GameServiceError::AccountError(_)
                | GameServiceError::SystemStatsError(_),
            ) => StatusCode::INTERNAL_SERVER_ERROR,

            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
