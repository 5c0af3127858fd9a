use std::sync::Arc;

use aws_config::SdkConfig;
use lambda_runtime::Error;
use shared::config::{websocket_api_endpoint, GameRulesConfig, TableConfig};
use shared::repositories::connection_repository::DynamoDbConnectionRepository;
use shared::repositories::game_repository::DynamoDbGameRepository;
use shared::services::expiry_service::{ExpiryService, SweepSummary};
use shared::services::notification_service::PushNotificationService;
use tracing::{error, info};

#[derive(Clone)]
pub struct ExpiryProcessor {
    service: ExpiryService,
}

impl ExpiryProcessor {
    pub fn new(service: ExpiryService) -> Self {
        Self { service }
    }

    pub fn from_env(config: &SdkConfig) -> Result<Self, Error> {
        let tables = TableConfig::from_env()?;
        let rules = GameRulesConfig::from_env()?;
        info!("Expiry rules: {:?}", rules);

        let client = aws_sdk_dynamodb::Client::new(config);
        let api_gateway_config = aws_sdk_apigatewaymanagement::config::Builder::from(config)
            .endpoint_url(websocket_api_endpoint()?)
            .build();
        let api_gateway_client =
            aws_sdk_apigatewaymanagement::Client::from_conf(api_gateway_config);

        let games = Arc::new(DynamoDbGameRepository::new(
            client.clone(),
            &tables.games_table,
        ));
        let connections = Arc::new(DynamoDbConnectionRepository::new(
            client,
            api_gateway_client,
            &tables.player_connections_table,
        ));
        let notifier = Arc::new(PushNotificationService::new(connections));

        Ok(Self::new(ExpiryService::new(games, notifier, rules)))
    }

    /// Runs one sweep. A failed sweep fails the invocation so the scheduler's retry
    /// policy picks it up.
    pub async fn process_tick(&self) -> Result<SweepSummary, Error> {
        match self.service.do_game_over_operations().await {
            Ok(summary) => Ok(summary),
            Err(e) => {
                error!("Expiry sweep failed: {}", e);
                Err(e.into())
            }
        }
    }
}
