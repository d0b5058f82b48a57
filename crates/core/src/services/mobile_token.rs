//! Mobile push token service.

use support_common::{AppError, AppResult};
use support_db::{entities::mobile_token, repositories::MobileTokenRepository};

/// Maximum accepted device token length.
const MAX_TOKEN_LENGTH: usize = 512;

/// Service for registering device tokens.
#[derive(Clone)]
pub struct MobileTokenService {
    token_repo: MobileTokenRepository,
}

impl MobileTokenService {
    /// Create a new mobile token service.
    #[must_use]
    pub const fn new(token_repo: MobileTokenRepository) -> Self {
        Self { token_repo }
    }

    /// Register (or replace) the device token of a user.
    pub async fn register_token(
        &self,
        user_id: &str,
        token: &str,
    ) -> AppResult<mobile_token::Model> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::Validation("Mobile token is required".to_string()));
        }
        if token.len() > MAX_TOKEN_LENGTH {
            return Err(AppError::Validation("Mobile token too long".to_string()));
        }

        let model = self.token_repo.upsert(user_id, token).await?;
        tracing::debug!(user_id = user_id, "Mobile token registered");
        Ok(model)
    }

    /// The device token of a user, if one is registered.
    pub async fn get_token(&self, user_id: &str) -> AppResult<Option<String>> {
        Ok(self
            .token_repo
            .find_by_user(user_id)
            .await?
            .map(|m| m.mobile_token))
    }
}
