use axum::{routing::get, Router};
use lambda_http::{run, tracing, Error};
use std::env::set_var;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use shared::config::{websocket_api_endpoint, TableConfig};
use shared::repositories::account_repository::DynamoDbAccountRepository;
use shared::repositories::connection_repository::DynamoDbConnectionRepository;
use shared::repositories::game_repository::DynamoDbGameRepository;
use shared::repositories::system_stats_repository::DynamoDbSystemStatsRepository;
use shared::repositories::user_repository::DynamoDbUserRepository;
use shared::services::game_play_service::GamePlayService;
use shared::services::matchmaking_service::MatchmakingService;
use shared::services::notification_service::PushNotificationService;
use shared::services::user_service::UserService;

#[tokio::main]
async fn main() -> Result<(), Error> {
    set_var("AWS_LAMBDA_HTTP_IGNORE_STAGE_IN_PATH", "true");

    // required to enable CloudWatch error logging by the runtime
    tracing::init_default_subscriber();

    let tables = TableConfig::from_env()?;
    let config = aws_config::load_from_env().await;
    let client = aws_sdk_dynamodb::Client::new(&config);
    let api_gateway_config = aws_sdk_apigatewaymanagement::config::Builder::from(&config)
        .endpoint_url(websocket_api_endpoint()?)
        .build();
    let api_gateway_client = aws_sdk_apigatewaymanagement::Client::from_conf(api_gateway_config);

    let game_repository = Arc::new(DynamoDbGameRepository::new(
        client.clone(),
        &tables.games_table,
    ));
    let user_repository = Arc::new(DynamoDbUserRepository::new(
        client.clone(),
        &tables.users_table,
    ));
    let account_repository = Arc::new(DynamoDbAccountRepository::new(
        client.clone(),
        &tables.accounts_table,
    ));
    let system_stats_repository = Arc::new(DynamoDbSystemStatsRepository::new(
        client.clone(),
        &tables.system_stats_table,
    ));
    let connection_repository = Arc::new(DynamoDbConnectionRepository::new(
        client.clone(),
        api_gateway_client,
        &tables.player_connections_table,
    ));

    let user_service = Arc::new(UserService::new(user_repository));
    let notifier = Arc::new(PushNotificationService::new(connection_repository));
    let matchmaking_service = Arc::new(MatchmakingService::new(
        game_repository.clone(),
        user_service,
    ));
    let game_play_service = Arc::new(GamePlayService::new(
        game_repository,
        account_repository,
        system_stats_repository,
        notifier,
    ));

    let app_state = state::AppState {
        matchmaking_service,
        game_play_service,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .merge(routes::games::routes())
        .layer(cors)
        .with_state(app_state);

    run(app).await
}
