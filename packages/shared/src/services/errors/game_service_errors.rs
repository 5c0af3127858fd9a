use crate::repositories::errors::{
    account_repository_errors::AccountRepositoryError,
    game_repository_errors::GameRepositoryError,
    system_stats_repository_errors::SystemStatsRepositoryError,
};
use crate::services::errors::notification_service_errors::NotificationServiceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameServiceError {
    RepositoryError(GameRepositoryError),
    NotificationError(NotificationServiceError),
    AccountError(AccountRepositoryError),
    SystemStatsError(SystemStatsRepositoryError),
    /// An answer update targeted a question the game never asked.
    QuestionNotFound(String),
    GameAlreadyOver(String),
    ValidationError(String),
}

impl std::fmt::Display for GameServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameServiceError::RepositoryError(err) => write!(f, "Repository error: {}", err),
            GameServiceError::NotificationError(err) => write!(f, "Notification error: {}", err),
            GameServiceError::AccountError(err) => write!(f, "Account error: {}", err),
            GameServiceError::SystemStatsError(err) => write!(f, "System stats error: {}", err),
            GameServiceError::QuestionNotFound(question_id) => {
                write!(f, "Question not found in game: {}", question_id)
            }
            GameServiceError::GameAlreadyOver(game_id) => {
                write!(f, "Game is already over: {}", game_id)
            }
            GameServiceError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for GameServiceError {}

impl From<GameRepositoryError> for GameServiceError {
    fn from(err: GameRepositoryError) -> Self {
        GameServiceError::RepositoryError(err)
    }
}

impl From<NotificationServiceError> for GameServiceError {
    fn from(err: NotificationServiceError) -> Self {
        GameServiceError::NotificationError(err)
    }
}

impl From<AccountRepositoryError> for GameServiceError {
    fn from(err: AccountRepositoryError) -> Self {
        GameServiceError::AccountError(err)
    }
}

impl From<SystemStatsRepositoryError> for GameServiceError {
    fn from(err: SystemStatsRepositoryError) -> Self {
        GameServiceError::SystemStatsError(err)
    }
}
