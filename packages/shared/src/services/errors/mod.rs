pub mod game_service_errors;
pub mod matchmaking_service_errors;
pub mod notification_service_errors;
pub mod user_service_errors;
