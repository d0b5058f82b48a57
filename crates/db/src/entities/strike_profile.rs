//! Strike profile entity.
//!
//! One row per user. The active strikes and the suspension history are stored
//! as JSONB lists on the row so that a strike append, a suspension and the
//! strike reset can be written in a single row update.

use chrono::{DateTime, Utc};
use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A single recorded infraction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Strike {
    /// Report ticket that justified the strike.
    pub report_tk: String,
    /// Severity weight, reduced once by an amendment.
    pub strike_value: f64,
    /// Moderator's justification.
    pub strike_reason: String,
    /// Whether the strike has been amended (at most once).
    #[serde(default)]
    pub amended: bool,
    /// Justification for the amendment, empty until amended.
    #[serde(default)]
    pub amended_reason: String,
    /// When the strike was recorded.
    pub strike_at: DateTime<Utc>,
    /// When the strike was last changed.
    pub updated_at: DateTime<Utc>,
}

/// A suspension issued once the strike total crossed the threshold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Suspension {
    /// When the suspension fired.
    pub suspension_at: DateTime<Utc>,
    /// Snapshot of the strikes that caused the suspension.
    pub suspension_strikes: Vec<Strike>,
}

/// Ordered list of active strikes (insertion order is chronological).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct StrikeList(pub Vec<Strike>);

impl StrikeList {
    /// Sum of the strike values.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.0.iter().map(|s| s.strike_value).sum()
    }

    /// First strike recorded for `report_tk`.
    pub fn find_mut(&mut self, report_tk: &str) -> Option<&mut Strike> {
        self.0.iter_mut().find(|s| s.report_tk == report_tk)
    }

    /// Number of current strikes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no current strikes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Append-only suspension history.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct SuspensionList(pub Vec<Suspension>);

impl SuspensionList {
    /// Number of suspensions ever issued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the user was never suspended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Most recent suspension.
    #[must_use]
    pub fn last(&self) -> Option<&Suspension> {
        self.0.last()
    }
}

/// Strike profile model.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "strike_profile")]
pub struct Model {
    /// The user the strikes belong to.
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    /// Strikes accrued since the last suspension.
    #[sea_orm(column_type = "JsonBinary")]
    pub strikes: StrikeList,
    /// Every suspension ever issued to the user.
    #[sea_orm(column_type = "JsonBinary")]
    pub suspensions: SuspensionList,
    /// When the latest suspension lifts.
    #[sea_orm(nullable, indexed)]
    pub suspension_ends: Option<DateTimeWithTimeZone>,
    /// When the profile was created (first strike).
    pub created_at: DateTimeWithTimeZone,
    /// When the profile was last changed.
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// A fresh profile with no strikes and no suspension history.
    #[must_use]
    pub fn empty(user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            strikes: StrikeList::default(),
            suspensions: SuspensionList::default(),
            suspension_ends: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn strike(report_tk: &str, value: f64) -> Strike {
        let now = Utc::now();
        Strike {
            report_tk: report_tk.to_string(),
            strike_value: value,
            strike_reason: "spam".to_string(),
            amended: false,
            amended_reason: String::new(),
            strike_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_empty_profile_sums_to_zero() {
        let profile = Model::empty("user1", Utc::now());
        assert_eq!(profile.strikes.total(), 0.0);
        assert!(profile.suspensions.is_empty());
        assert!(profile.suspension_ends.is_none());
    }

    #[test]
    fn test_find_mut_returns_first_match() {
        let mut list = StrikeList(vec![
            strike("report1", 1.5),
            strike("report2", 0.5),
            strike("report1", 1.0),
        ]);

        let found = list.find_mut("report1").map(|s| s.strike_value);
        assert_eq!(found, Some(1.5));
        assert!(list.find_mut("report3").is_none());
        assert_eq!(list.total(), 3.0);
    }

    #[test]
    fn test_strike_json_defaults() {
        let json = serde_json::json!({
            "report_tk": "report1",
            "strike_value": 1.0,
            "strike_reason": "abuse",
            "strike_at": "2023-01-01T00:00:00Z",
            "updated_at": "2023-01-01T00:00:00Z",
        });
        let parsed: Strike = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.report_tk, "report1");
        assert!(!parsed.amended);
        assert!(parsed.amended_reason.is_empty());
    }
}
