#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountRepositoryError {
    DynamoDb(String),
}

impl std::fmt::Display for AccountRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountRepositoryError::DynamoDb(msg) => write!(f, "DynamoDB error: {}", msg),
        }
    }
}

impl std::error::Error for AccountRepositoryError {}
