#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemStatsRepositoryError {
    DynamoDb(String),
}

impl std::fmt::Display for SystemStatsRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SystemStatsRepositoryError::DynamoDb(msg) => write!(f, "DynamoDB error: {}", msg),
        }
    }
}

impl std::error::Error for SystemStatsRepositoryError {}
