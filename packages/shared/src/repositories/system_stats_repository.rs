use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;

#[cfg(test)]
use mockall::automock;

use crate::repositories::errors::system_stats_repository_errors::SystemStatsRepositoryError;

pub const GAME_PLAYED_COUNTER: &str = "game_played";

const SYSTEM_STATS_KEY: &str = "system";

/// Global counters shared by every game.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SystemStatsRepository: Send + Sync {
    async fn increment(&self, counter: &str) -> Result<(), SystemStatsRepositoryError>;
}

pub struct DynamoDbSystemStatsRepository {
    pub client: Client,
    pub table_name: String,
}

impl DynamoDbSystemStatsRepository {
    pub fn new(client: Client, table_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
        }
    }
}

#[async_trait]
impl SystemStatsRepository for DynamoDbSystemStatsRepository {
    async fn increment(&self, counter: &str) -> Result<(), SystemStatsRepositoryError> {
        self.client
            .update_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(SYSTEM_STATS_KEY.to_string()))
            .update_expression("ADD #counter :one")
            .expression_attribute_names("#counter", counter)
            .expression_attribute_values(":one", AttributeValue::N("1".to_string()))
            .send()
            .await
            .map_err(|e| SystemStatsRepositoryError::DynamoDb(e.to_string()))?;
        Ok(())
    }
}
