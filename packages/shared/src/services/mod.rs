pub mod errors;
pub mod expiry_service;
pub mod game_play_service;
pub mod matchmaking_service;
pub mod notification_service;
pub mod round_progression;
pub mod user_service;
