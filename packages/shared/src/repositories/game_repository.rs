use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use serde_dynamo::aws_sdk_dynamodb_1::{from_item, to_item};
use uuid::Uuid;

use crate::models::game::Game;
use crate::repositories::errors::game_repository_errors::GameRepositoryError;

#[async_trait]
pub trait GameRepository: Send + Sync {
    /// Inserts a new record and returns the identifier it was stored under.
    async fn create_game(&self, game: &Game) -> Result<String, GameRepositoryError>;

    /// Writes the record as-is under `game.id`.
    async fn set_game(&self, game: &Game) -> Result<(), GameRepositoryError>;

    /// Writes the record only if the stored version still equals `game.version`. The
    /// stored copy gets `game.version + 1`.
    async fn update_game(&self, game: &Game) -> Result<(), GameRepositoryError>;

    async fn get_game(&self, game_id: &str) -> Result<Game, GameRepositoryError>;

    /// Random opponent games still waiting for a second player.
    async fn get_available_games(&self) -> Result<Vec<Game>, GameRepositoryError>;

    /// Every game that is not over yet.
    async fn get_games_needing_expiry_check(&self) -> Result<Vec<Game>, GameRepositoryError>;
}

pub struct DynamoDbGameRepository {
    pub client: Client,
    pub table_name: String,
}

impl DynamoDbGameRepository {
    pub fn new(client: Client, table_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
        }
    }

    async fn scan_games(
        &self,
        filter_expression: &str,
        values: HashMap<String, AttributeValue>,
    ) -> Result<Vec<Game>, GameRepositoryError> {
        let mut games = Vec::new();
        let mut exclusive_start_key = None;

        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table_name)
                .filter_expression(filter_expression)
                .set_expression_attribute_values(Some(values.clone()))
                .set_exclusive_start_key(exclusive_start_key)
                .send()
                .await
                .map_err(|e| GameRepositoryError::DynamoDb(e.to_string()))?;

            for item in output.items.unwrap_or_default() {
                let game: Game = from_item(item)
                    .map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;
                games.push(game);
            }

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => exclusive_start_key = Some(key),
                _ => break,
            }
        }

        Ok(games)
    }
}

#[async_trait]
impl GameRepository for DynamoDbGameRepository {
    async fn create_game(&self, game: &Game) -> Result<String, GameRepositoryError> {
        let game_id = Uuid::new_v4().to_string();
        let mut record = game.clone();
        record.id = game_id.clone();

        let item =
            to_item(&record).map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(id)")
            .send()
            .await
            .map_err(|e| GameRepositoryError::DynamoDb(e.to_string()))?;

        Ok(game_id)
    }

    async fn set_game(&self, game: &Game) -> Result<(), GameRepositoryError> {
        let item = to_item(game).map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| GameRepositoryError::DynamoDb(e.to_string()))?;

        Ok(())
    }

    async fn update_game(&self, game: &Game) -> Result<(), GameRepositoryError> {
        let mut record = game.clone();
        record.version = game.version + 1;

        let item =
            to_item(&record).map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;

        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression(
                "attribute_exists(id) AND (attribute_not_exists(#version) OR #version = :expected)",
            )
            .expression_attribute_names("#version", "version")
            .expression_attribute_values(":expected", AttributeValue::N(game.version.to_string()))
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                if let SdkError::ServiceError(service_err) = &e {
                    if service_err.err().is_conditional_check_failed_exception() {
                        return Err(GameRepositoryError::Conflict(game.id.clone()));
                    }
                }
                Err(GameRepositoryError::DynamoDb(e.to_string()))
            }
        }
    }

    async fn get_game(&self, game_id: &str) -> Result<Game, GameRepositoryError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(game_id.to_string()))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| GameRepositoryError::DynamoDb(e.to_string()))?;

        match result.item {
            Some(item) => {
                from_item(item).map_err(|e| GameRepositoryError::Serialization(e.to_string()))
            }
            None => Err(GameRepositoryError::NotFound(game_id.to_string())),
        }
    }

    async fn get_available_games(&self) -> Result<Vec<Game>, GameRepositoryError> {
        let values = HashMap::from([
            (":game_over".to_string(), AttributeValue::Bool(false)),
            (
                ":player_mode".to_string(),
                AttributeValue::S("Opponent".to_string()),
            ),
            (
                ":opponent_type".to_string(),
                AttributeValue::S("Random".to_string()),
            ),
            (":empty".to_string(), AttributeValue::S(String::new())),
            (":one".to_string(), AttributeValue::N("1".to_string())),
        ]);

        self.scan_games(
            "game_over = :game_over \
             AND game_options.player_mode = :player_mode \
             AND game_options.opponent_type = :opponent_type \
             AND next_turn_player_id = :empty \
             AND size(player_ids) = :one",
            values,
        )
        .await
    }

    async fn get_games_needing_expiry_check(&self) -> Result<Vec<Game>, GameRepositoryError> {
        let values = HashMap::from([(":game_over".to_string(), AttributeValue::Bool(false))]);

        self.scan_games("game_over = :game_over", values).await
    }
}
