//! Strike profile repository.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait, sea_query::OnConflict,
};

use crate::entities::strike_profile::{ActiveModel, Column, Entity, Model};
use support_common::{AppError, AppResult};

/// Repository for per-user strike profiles.
#[derive(Clone)]
pub struct StrikeRepository {
    db: Arc<DatabaseConnection>,
}

impl StrikeRepository {
    /// Create a new strike repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the profile of a user.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Option<Model>> {
        Entity::find_by_id(user_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a new profile.
    ///
    /// Returns [`AppError::Conflict`] when a profile for the same user already
    /// exists, so a caller that lost a creation race can re-read instead of
    /// failing.
    pub async fn create(&self, model: Model) -> AppResult<Model> {
        let active = ActiveModel {
            user_id: Set(model.user_id.clone()),
            strikes: Set(model.strikes.clone()),
            suspensions: Set(model.suspensions.clone()),
            suspension_ends: Set(model.suspension_ends),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
        };

        let inserted = Entity::insert(active)
            .on_conflict(
                OnConflict::column(Column::UserId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| map_insert_error(&model.user_id, e))?;

        if inserted == 0 {
            return Err(conflict(&model.user_id));
        }
        Ok(model)
    }

    /// Apply `f` to the profile of `user_id` under a row lock.
    ///
    /// The profile is read with `SELECT ... FOR UPDATE` inside a transaction,
    /// handed to `f` for mutation and written back in the same transaction, so
    /// concurrent writers for the same user are serialized and no partial
    /// update is ever visible. Nothing is written when `f` leaves the profile
    /// unchanged.
    ///
    /// Returns `None` when the user has no profile.
    pub async fn modify<F, R>(&self, user_id: &str, f: F) -> AppResult<Option<(Model, R)>>
    where
        F: FnOnce(&mut Model) -> R + Send,
        R: Send,
    {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let Some(current) = Entity::find_by_id(user_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        else {
            txn.rollback()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Ok(None);
        };

        let mut next = current.clone();
        let outcome = f(&mut next);

        let saved = if next == current {
            current
        } else {
            let mut active: ActiveModel = current.into();
            active.strikes = Set(next.strikes);
            active.suspensions = Set(next.suspensions);
            active.suspension_ends = Set(next.suspension_ends);
            active.updated_at = Set(next.updated_at);
            active
                .update(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?
        };

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(Some((saved, outcome)))
    }

    /// User IDs whose suspension window is still open at `now`.
    pub async fn find_suspended_at(&self, now: DateTime<Utc>) -> AppResult<Vec<String>> {
        let profiles = Entity::find()
            .filter(Column::SuspensionEnds.gt(now))
            .order_by_asc(Column::UserId)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(profiles.into_iter().map(|p| p.user_id).collect())
    }
}

fn conflict(user_id: &str) -> AppError {
    AppError::Conflict(format!("Strike profile for {user_id} already exists"))
}

fn map_insert_error(user_id: &str, err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => conflict(user_id),
        _ => AppError::Database(err.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::strike_profile::{Strike, StrikeList};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_strike(report_tk: &str, value: f64) -> Strike {
        let now = Utc::now();
        Strike {
            report_tk: report_tk.to_string(),
            strike_value: value,
            strike_reason: "Test strike".to_string(),
            amended: false,
            amended_reason: String::new(),
            strike_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_find_by_user() {
        let profile = Model::empty("user1", Utc::now());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[profile.clone()]])
                .into_connection(),
        );

        let repo = StrikeRepository::new(db);
        let result = repo.find_by_user("user1").await.unwrap();

        assert_eq!(result, Some(profile));
    }

    #[tokio::test]
    async fn test_find_by_user_missing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<Model>::new()])
                .into_connection(),
        );

        let repo = StrikeRepository::new(db);
        assert!(repo.find_by_user("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_storage_failure_is_database_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_errors([DbErr::Custom("connection reset".to_string())])
                .into_connection(),
        );

        let repo = StrikeRepository::new(db);
        let result = repo.create(Model::empty("user1", Utc::now())).await;

        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn test_create_inserts_profile() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = StrikeRepository::new(db);
        let profile = repo.create(Model::empty("user1", Utc::now())).await.unwrap();

        assert_eq!(profile.user_id, "user1");
        assert!(profile.strikes.is_empty());
    }

    #[tokio::test]
    async fn test_create_existing_profile_is_conflict() {
        // ON CONFLICT DO NOTHING reports zero inserted rows.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = StrikeRepository::new(db);
        let result = repo.create(Model::empty("user1", Utc::now())).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_modify_writes_changes_in_transaction() {
        let profile = Model::empty("user1", Utc::now());
        let mut updated = profile.clone();
        updated.strikes = StrikeList(vec![create_test_strike("report1", 1.5)]);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[profile.clone()]])
                .append_query_results([[updated.clone()]])
                .into_connection(),
        );

        let repo = StrikeRepository::new(db);
        let (saved, outcome) = repo
            .modify("user1", |p| {
                p.strikes.0.push(create_test_strike("report1", 1.5));
                p.strikes.len()
            })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(outcome, 1);
        assert_eq!(saved, updated);
    }

    #[tokio::test]
    async fn test_modify_missing_profile() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<Model>::new()])
                .into_connection(),
        );

        let repo = StrikeRepository::new(db);
        let result = repo.modify("ghost", |_| true).await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_modify_without_changes_skips_update() {
        let profile = Model::empty("user1", Utc::now());

        // Only the locked read is queued; an UPDATE would exhaust the mock.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[profile.clone()]])
                .into_connection(),
        );

        let repo = StrikeRepository::new(db);
        let (saved, changed) = repo.modify("user1", |_| false).await.unwrap().unwrap();

        assert!(!changed);
        assert_eq!(saved, profile);
    }

    #[tokio::test]
    async fn test_find_suspended_at() {
        let now = Utc::now();
        let mut suspended = Model::empty("user1", now);
        suspended.suspension_ends = Some((now + chrono::Duration::days(90)).into());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[suspended]])
                .into_connection(),
        );

        let repo = StrikeRepository::new(db);
        let result = repo.find_suspended_at(now).await.unwrap();

        assert_eq!(result, vec!["user1".to_string()]);
    }
}
