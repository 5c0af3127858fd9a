use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;

#[cfg(test)]
use mockall::automock;

use crate::repositories::errors::account_repository_errors::AccountRepositoryError;

const BITS_PER_CORRECT_ANSWER: i64 = 1;
const BYTES_PER_WIN: i64 = 1;

/// In-game currency ledger. Bits are earned per correct answer, bytes per win.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn credit_on_correct_answer(&self, player_id: &str)
        -> Result<(), AccountRepositoryError>;
    async fn credit_on_win(&self, player_id: &str) -> Result<(), AccountRepositoryError>;
}

pub struct DynamoDbAccountRepository {
    pub client: Client,
    pub table_name: String,
}

impl DynamoDbAccountRepository {
    pub fn new(client: Client, table_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
        }
    }

    async fn add(
        &self,
        player_id: &str,
        attribute: &str,
        amount: i64,
    ) -> Result<(), AccountRepositoryError> {
        self.client
            .update_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(player_id.to_string()))
            .update_expression("ADD #balance :amount")
            .expression_attribute_names("#balance", attribute)
            .expression_attribute_values(":amount", AttributeValue::N(amount.to_string()))
            .send()
            .await
            .map_err(|e| AccountRepositoryError::DynamoDb(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl AccountRepository for DynamoDbAccountRepository {
    async fn credit_on_correct_answer(
        &self,
        player_id: &str,
    ) -> Result<(), AccountRepositoryError> {
        self.add(player_id, "bits", BITS_PER_CORRECT_ANSWER).await
    }

    async fn credit_on_win(&self, player_id: &str) -> Result<(), AccountRepositoryError> {
        self.add(player_id, "bytes", BYTES_PER_WIN).await
    }
}
