use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

#[cfg(test)]
use mockall::automock;

use crate::models::game::Game;
use crate::models::notification::{GameNotification, NotificationCategory};
use crate::repositories::connection_repository::ConnectionRepository;
use crate::services::errors::notification_service_errors::NotificationServiceError;

/// Delivers game events to a single player.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GameNotifier: Send + Sync {
    async fn send_game_play_notification(
        &self,
        game: &Game,
        player_id: &str,
        category: NotificationCategory,
    ) -> Result<(), NotificationServiceError>;
}

/// Pushes notifications over the player's WebSocket connection. Players without a
/// live connection are skipped.
#[derive(Clone)]
pub struct PushNotificationService {
    repository: Arc<dyn ConnectionRepository>,
}

impl PushNotificationService {
    pub fn new(repository: Arc<dyn ConnectionRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl GameNotifier for PushNotificationService {
    async fn send_game_play_notification(
        &self,
        game: &Game,
        player_id: &str,
        category: NotificationCategory,
    ) -> Result<(), NotificationServiceError> {
        let connection_id = self
            .repository
            .get_connection_id(player_id)
            .await
            .map_err(|e| NotificationServiceError::Connection(e.to_string()))?;

        let Some(connection_id) = connection_id else {
            info!(
                "Player {} is not connected, skipping notification for game {}",
                player_id, game.id
            );
            return Ok(());
        };

        let notification = GameNotification::new(game, player_id, category);
        let message = serde_json::to_string(&notification)
            .map_err(|e| NotificationServiceError::Serialization(e.to_string()))?;

        info!(
            "Sending {:?} notification to player {} for game {}",
            category, player_id, game.id
        );
        self.repository
            .send_message(&connection_id, &message)
            .await
            .map_err(|e| NotificationServiceError::Delivery(e.to_string()))
    }
}
