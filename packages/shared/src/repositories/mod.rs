pub mod account_repository;
pub mod connection_repository;
pub mod errors;
pub mod game_repository;
pub mod system_stats_repository;
pub mod user_repository;
