//! Report repository.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::report::{ActiveModel, Column, Entity, Model, ReportType};
use support_common::{AppError, AppResult};

/// Repository for user-submitted reports.
#[derive(Clone)]
pub struct ReportRepository {
    db: Arc<DatabaseConnection>,
}

impl ReportRepository {
    /// Create a new report repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new report.
    pub async fn create(&self, model: ActiveModel) -> AppResult<Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a report by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<Model>> {
        Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a report by ID or return an error.
    pub async fn get_by_id(&self, id: &str) -> AppResult<Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {id} not found")))
    }

    /// Reports filed against a target, newest first.
    pub async fn find_by_target(
        &self,
        report_type: ReportType,
        target_identifier: &str,
    ) -> AppResult<Vec<Model>> {
        Entity::find()
            .filter(Column::ReportType.eq(report_type))
            .filter(Column::TargetIdentifier.eq(target_identifier))
            .order_by_desc(Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count unresolved reports filed against a target.
    pub async fn count_open_by_target(
        &self,
        report_type: ReportType,
        target_identifier: &str,
    ) -> AppResult<u64> {
        Entity::find()
            .filter(Column::ReportType.eq(report_type))
            .filter(Column::TargetIdentifier.eq(target_identifier))
            .filter(Column::Resolved.eq(false))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Mark a report as resolved.
    pub async fn resolve(&self, id: &str) -> AppResult<Model> {
        let report = self.get_by_id(id).await?;

        let mut active: ActiveModel = report.into();
        active.resolved = Set(true);
        active.updated_at = Set(Utc::now().into());

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a report. Returns whether a row was removed.
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}
