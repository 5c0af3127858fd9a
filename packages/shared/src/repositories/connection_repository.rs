use async_trait::async_trait;
use aws_sdk_apigatewaymanagement::{primitives::Blob, Client as ApiGatewayClient};
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use tracing::info;

#[cfg(test)]
use mockall::automock;

/// Live WebSocket connections of players, used to push game events.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ConnectionRepository: Send + Sync {
    async fn get_connection_id(
        &self,
        player_id: &str,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>>;

    async fn send_message(
        &self,
        connection_id: &str,
        message: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

pub struct DynamoDbConnectionRepository {
    dynamodb_client: DynamoDbClient,
    api_gateway_client: ApiGatewayClient,
    table_name: String,
}

impl DynamoDbConnectionRepository {
    /// `api_gateway_client` must already point at the WebSocket API endpoint.
    pub fn new(
        dynamodb_client: DynamoDbClient,
        api_gateway_client: ApiGatewayClient,
        table_name: &str,
    ) -> Self {
        Self {
            dynamodb_client,
            api_gateway_client,
            table_name: table_name.to_string(),
        }
    }
}

#[async_trait]
impl ConnectionRepository for DynamoDbConnectionRepository {
    async fn get_connection_id(
        &self,
        player_id: &str,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>> {
        let result = self
            .dynamodb_client
            .get_item()
            .table_name(&self.table_name)
            .key("player_id", AttributeValue::S(player_id.to_string()))
            .send()
            .await?;

        if let Some(item) = result.item {
            if let Some(AttributeValue::S(connection_id)) = item.get("connection_id") {
                return Ok(Some(connection_id.clone()));
            }
        }

        Ok(None)
    }

    async fn send_message(
        &self,
        connection_id: &str,
        message: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.api_gateway_client
            .post_to_connection()
            .connection_id(connection_id)
            .data(Blob::new(message.as_bytes()))
            .send()
            .await?;

        info!("Sent message to connection: {}", connection_id);
        Ok(())
    }
}
