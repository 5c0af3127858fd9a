use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;

/// Header the upstream authorizer sets to the verified player id.
pub const PLAYER_ID_HEADER: &str = "x-player-id";

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(PLAYER_ID_HEADER)
            .ok_or(ApiError::Unauthorized)?
            .to_str()
            .map_err(|_| ApiError::Unauthorized)?
            .trim();

        if user_id.is_empty() {
            return Err(ApiError::Unauthorized);
        }

        Ok(AuthenticatedUser {
            user_id: user_id.to_string(),
        })
    }
}
