//! Mobile push token repository.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::entities::mobile_token::{ActiveModel, Entity, Model};
use support_common::{AppError, AppResult};

/// Repository for per-user device tokens.
#[derive(Clone)]
pub struct MobileTokenRepository {
    db: Arc<DatabaseConnection>,
}

impl MobileTokenRepository {
    /// Create a new mobile token repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the token registered for a user.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Option<Model>> {
        Entity::find_by_id(user_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store `token` for `user_id`, replacing any previous one.
    pub async fn upsert(&self, user_id: &str, token: &str) -> AppResult<Model> {
        let now = Utc::now();

        if let Some(existing) = self.find_by_user(user_id).await? {
            let mut active: ActiveModel = existing.into();
            active.mobile_token = Set(token.to_string());
            active.updated_at = Set(now.into());
            return active
                .update(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()));
        }

        let model = ActiveModel {
            user_id: Set(user_id.to_string()),
            mobile_token: Set(token.to_string()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
