use std::sync::Arc;

use tracing::error;

use crate::models::game_options::GameOptions;
use crate::models::user::User;
use crate::repositories::user_repository::UserRepository;
use crate::services::errors::user_service_errors::UserServiceError;

pub struct UserService {
    repository: Arc<dyn UserRepository + Send + Sync>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository + Send + Sync>) -> Self {
        UserService { repository }
    }

    pub async fn get_user_by_id(&self, user_id: &str) -> Result<User, UserServiceError> {
        if user_id.is_empty() {
            return Err(UserServiceError::ValidationError(
                "User ID cannot be empty".to_string(),
            ));
        }
        self.repository
            .get_user_by_id(user_id)
            .await
            .map_err(UserServiceError::from)
    }

    /// Remembers the options the user last started a game with.
    pub async fn update_last_game_play_option(
        &self,
        user_id: &str,
        game_options: &GameOptions,
    ) -> Result<User, UserServiceError> {
        let mut user = self.get_user_by_id(user_id).await?;
        user.last_game_play_option = Some(game_options.clone());

        self.repository.update_user(&user).await.map_err(|e| {
            error!("Failed to update last game option of user {}: {}", user_id, e);
            UserServiceError::from(e)
        })?;

        Ok(user)
    }
}
