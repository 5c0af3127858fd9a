pub mod account_repository_errors;
pub mod game_repository_errors;
pub mod system_stats_repository_errors;
pub mod user_repository_errors;
