use std::sync::Arc;

use shared::services::game_play_service::GamePlayService;
use shared::services::matchmaking_service::MatchmakingService;

#[derive(Clone)]
pub struct AppState {
    pub matchmaking_service: Arc<MatchmakingService>,
    pub game_play_service: Arc<GamePlayService>,
}
