//! Report entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What a report is filed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportType {
    /// Another user's account.
    #[sea_orm(string_value = "ACCOUNT")]
    Account,
    /// A service listing.
    #[sea_orm(string_value = "SERVICE")]
    Service,
}

/// Report model.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "report")]
pub struct Model {
    /// Report ticket (UUID v4).
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Kind of target.
    pub report_type: ReportType,
    /// Username or service id being reported.
    #[sea_orm(indexed)]
    pub target_identifier: String,
    /// Short summary.
    pub title: String,
    /// What happened, as told by the complainant.
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// The user who submitted the report.
    pub complainant: String,
    /// When the report was filed.
    pub created_at: DateTimeWithTimeZone,
    /// When the report was last changed.
    pub updated_at: DateTimeWithTimeZone,
    /// Whether support closed the report.
    pub resolved: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether `user_id` filed the report or is its target.
    #[must_use]
    pub fn involves(&self, user_id: &str) -> bool {
        self.complainant == user_id || self.target_identifier == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_involves_complainant_and_target() {
        let report = Model {
            id: "report1".to_string(),
            report_type: ReportType::Account,
            target_identifier: "bob".to_string(),
            title: "Harassment".to_string(),
            description: "Repeated insults".to_string(),
            complainant: "alice".to_string(),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
            resolved: false,
        };

        assert!(report.involves("alice"));
        assert!(report.involves("bob"));
        assert!(!report.involves("carol"));
    }
}
