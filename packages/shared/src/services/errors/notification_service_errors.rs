#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationServiceError {
    Connection(String),
    Delivery(String),
    Serialization(String),
}

impl std::fmt::Display for NotificationServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationServiceError::Connection(msg) => write!(f, "Connection lookup error: {}", msg),
            NotificationServiceError::Delivery(msg) => write!(f, "Delivery error: {}", msg),
            NotificationServiceError::Serialization(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for NotificationServiceError {}
