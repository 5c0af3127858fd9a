use crate::repositories::errors::game_repository_errors::GameRepositoryError;
use crate::services::errors::user_service_errors::UserServiceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchmakingServiceError {
    RepositoryError(GameRepositoryError),
    UserServiceError(UserServiceError),
    ValidationError(String),
}

impl std::fmt::Display for MatchmakingServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchmakingServiceError::RepositoryError(err) => write!(f, "Repository error: {}", err),
            MatchmakingServiceError::UserServiceError(err) => {
                write!(f, "User service error: {}", err)
            }
            MatchmakingServiceError::ValidationError(msg) => {
                write!(f, "Validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for MatchmakingServiceError {}

impl From<GameRepositoryError> for MatchmakingServiceError {
    fn from(err: GameRepositoryError) -> Self {
        MatchmakingServiceError::RepositoryError(err)
    }
}

impl From<UserServiceError> for MatchmakingServiceError {
    fn from(err: UserServiceError) -> Self {
        MatchmakingServiceError::UserServiceError(err)
    }
}
