//! Moderation service for handling reports and strikes.

use chrono::Utc;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use support_common::{AppError, AppResult, IdGenerator};
use support_db::{
    entities::report::{self, ReportType},
    repositories::ReportRepository,
};
use validator::Validate;

use crate::services::notifier::NotifierService;
use crate::services::strike::{StrikeLedger, StrikeSeverity};

/// Input for creating a report.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReportInput {
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    #[validate(length(min = 1, max = 4096))]
    pub description: String,
    /// The user filing the report.
    #[validate(length(min = 1, max = 128))]
    pub complainant: String,
}

/// Input for adding a strike.
#[derive(Debug, Deserialize, Validate)]
pub struct AddStrikeInput {
    #[validate(length(min = 1))]
    pub report_tk: String,
    /// One of `HIGH`, `MEDIUM`, `LOW`.
    #[validate(length(min = 1))]
    pub strike_type: String,
    #[validate(length(min = 1, max = 2048))]
    pub strike_reason: String,
}

/// Input for amending a strike.
#[derive(Debug, Deserialize, Validate)]
pub struct AmendStrikeInput {
    #[validate(length(min = 1))]
    pub report_tk: String,
    #[validate(length(min = 1, max = 2048))]
    pub amend_reason: String,
}

/// Result of adding a strike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StrikeOutcome {
    /// Whether the strike triggered a suspension.
    pub suspended: bool,
}

/// Moderation service for handling reports and strikes.
#[derive(Clone)]
pub struct ModerationService {
    report_repo: ReportRepository,
    ledger: StrikeLedger,
    notifier: Option<NotifierService>,
    id_gen: IdGenerator,
}

impl ModerationService {
    /// Create a new moderation service.
    #[must_use]
    pub const fn new(report_repo: ReportRepository, ledger: StrikeLedger) -> Self {
        Self {
            report_repo,
            ledger,
            notifier: None,
            id_gen: IdGenerator::new(),
        }
    }

    /// Set the notifier used to tell users about strikes and suspensions.
    pub fn set_notifier(&mut self, notifier: NotifierService) {
        self.notifier = Some(notifier);
    }

    // ========== Reports ==========

    /// File a report against an account or a service.
    pub async fn create_report(
        &self,
        report_type: ReportType,
        target_identifier: &str,
        input: CreateReportInput,
    ) -> AppResult<report::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let target_identifier = target_identifier.trim();
        if target_identifier.is_empty() {
            return Err(AppError::BadRequest("Report target is required".to_string()));
        }

        let now = Utc::now();
        let model = report::ActiveModel {
            id: Set(self.id_gen.generate_uuid_v4()),
            report_type: Set(report_type),
            target_identifier: Set(target_identifier.to_string()),
            title: Set(input.title),
            description: Set(input.description),
            complainant: Set(input.complainant),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            resolved: Set(false),
        };

        let report = self.report_repo.create(model).await?;
        tracing::info!(
            report_id = %report.id,
            report_type = ?report.report_type,
            target = %report.target_identifier,
            "Report created"
        );
        Ok(report)
    }

    /// Get a report by ID.
    pub async fn get_report(&self, id: &str) -> AppResult<report::Model> {
        self.report_repo.get_by_id(id).await
    }

    /// Reports filed against a target, newest first.
    pub async fn get_reports_for_target(
        &self,
        report_type: ReportType,
        target_identifier: &str,
    ) -> AppResult<Vec<report::Model>> {
        self.report_repo
            .find_by_target(report_type, target_identifier)
            .await
    }

    /// Number of unresolved reports against a target.
    pub async fn count_open_reports_for_target(
        &self,
        report_type: ReportType,
        target_identifier: &str,
    ) -> AppResult<u64> {
        self.report_repo
            .count_open_by_target(report_type, target_identifier)
            .await
    }

    /// Mark a report as resolved.
    pub async fn resolve_report(&self, id: &str) -> AppResult<report::Model> {
        let report = self.report_repo.resolve(id).await?;
        tracing::info!(report_id = id, "Report resolved");
        Ok(report)
    }

    /// Delete a report.
    pub async fn delete_report(&self, id: &str) -> AppResult<()> {
        if !self.report_repo.delete(id).await? {
            return Err(AppError::NotFound(format!("Report {id} not found")));
        }
        Ok(())
    }

    // ========== Strikes ==========

    /// Give a user a strike justified by a report they are involved in.
    ///
    /// The user is notified of the strike and, if it fired one, of the
    /// suspension. Notification failures are logged and do not undo the
    /// strike.
    pub async fn add_strike(&self, user_id: &str, input: AddStrikeInput) -> AppResult<StrikeOutcome> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let severity: StrikeSeverity = input.strike_type.parse()?;

        let report = self.report_repo.get_by_id(&input.report_tk).await?;
        if !report.involves(user_id) {
            return Err(AppError::BadRequest(
                "User not involved in the report".to_string(),
            ));
        }

        let suspended = self
            .ledger
            .add_strike(
                user_id,
                &input.report_tk,
                &input.strike_type,
                &input.strike_reason,
            )
            .await?;

        self.notify(
            user_id,
            "New Strike",
            &format!("You have received a new {severity} strike"),
        )
        .await;
        if suspended {
            self.notify(
                user_id,
                "Account Suspended",
                "Your account has been suspended for some time",
            )
            .await;
        }

        Ok(StrikeOutcome { suspended })
    }

    /// Amend one of a user's current strikes.
    pub async fn amend_strike(&self, user_id: &str, input: AmendStrikeInput) -> AppResult<bool> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.ledger
            .amend_strike(user_id, &input.report_tk, &input.amend_reason)
            .await
    }

    async fn notify(&self, user_id: &str, title: &str, body: &str) {
        let Some(ref notifier) = self.notifier else {
            return;
        };
        if let Err(e) = notifier.notify(user_id, title, body).await {
            tracing::warn!(error = %e, user_id = user_id, title = title, "Failed to notify user");
        }
    }
}
