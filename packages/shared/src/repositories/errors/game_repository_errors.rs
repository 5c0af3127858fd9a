#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameRepositoryError {
    NotFound(String),
    /// The record changed since it was read.
    Conflict(String),
    Serialization(String),
    DynamoDb(String),
}

impl std::fmt::Display for GameRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameRepositoryError::NotFound(game_id) => write!(f, "Game not found: {}", game_id),
            GameRepositoryError::Conflict(game_id) => {
                write!(f, "Game {} was modified concurrently", game_id)
            }
            GameRepositoryError::Serialization(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
            GameRepositoryError::DynamoDb(msg) => write!(f, "DynamoDB error: {}", msg),
        }
    }
}

impl std::error::Error for GameRepositoryError {}
