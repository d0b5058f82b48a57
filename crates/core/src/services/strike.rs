//! Strike ledger.
//!
//! Accrues weighted strikes per user and turns them into suspensions:
//!
//! ```text
//! UNSUSPENDED (strikes accruing)
//!     -- total > max_strikes --> SUSPENDED (strikes cleared, suspension_ends set)
//!     -- now >= suspension_ends --> UNSUSPENDED (accruing again from zero)
//! ```
//!
//! The state transitions are plain functions over a [`strike_profile::Model`]
//! so they can be exercised without a database; the async operations run
//! them inside [`StrikeRepository::modify`], which serializes writers for the
//! same user.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use support_common::{AppError, AppResult, StrikeConfig};
use support_db::{
    entities::strike_profile::{self, Strike, Suspension},
    repositories::StrikeRepository,
};

/// Severity of a strike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeSeverity {
    High,
    Medium,
    Low,
}

impl FromStr for StrikeSeverity {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HIGH" => Ok(Self::High),
            "MEDIUM" => Ok(Self::Medium),
            "LOW" => Ok(Self::Low),
            other => Err(AppError::Validation(format!(
                "Invalid strike type '{other}', must be one of HIGH, MEDIUM, LOW"
            ))),
        }
    }
}

impl fmt::Display for StrikeSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        };
        write!(f, "{s}")
    }
}

/// Strike ledger service.
#[derive(Clone)]
pub struct StrikeLedger {
    strike_repo: StrikeRepository,
    config: StrikeConfig,
}

impl StrikeLedger {
    /// Create a new strike ledger with the given accrual policy.
    #[must_use]
    pub const fn new(strike_repo: StrikeRepository, config: StrikeConfig) -> Self {
        Self {
            strike_repo,
            config,
        }
    }

    /// Weight of a severity under the current policy.
    #[must_use]
    pub const fn severity_value(&self, severity: StrikeSeverity) -> f64 {
        match severity {
            StrikeSeverity::High => self.config.severity.high,
            StrikeSeverity::Medium => self.config.severity.medium,
            StrikeSeverity::Low => self.config.severity.low,
        }
    }

    // ========== State transitions ==========

    /// Append a strike and fire a suspension if the total now exceeds the
    /// threshold. Returns whether a suspension fired.
    ///
    /// The profile is left untouched when the suspension end cannot be
    /// represented.
    pub fn record_strike(
        &self,
        profile: &mut strike_profile::Model,
        report_tk: &str,
        severity: StrikeSeverity,
        strike_reason: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let ends = self.suspension_end(now)?;

        profile.strikes.0.push(Strike {
            report_tk: report_tk.to_string(),
            strike_value: self.severity_value(severity),
            strike_reason: strike_reason.to_string(),
            amended: false,
            amended_reason: String::new(),
            strike_at: now,
            updated_at: now,
        });
        profile.updated_at = now.into();

        // Strictly greater: reaching the threshold exactly does not suspend.
        if profile.strikes.total() > self.config.max_strikes {
            Self::fire_suspension(profile, now, ends);
            return Ok(true);
        }
        Ok(false)
    }

    fn suspension_end(&self, now: DateTime<Utc>) -> AppResult<DateTime<Utc>> {
        Duration::try_days(i64::from(self.config.suspend_days))
            .and_then(|length| now.checked_add_signed(length))
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "Suspension of {} days overflows the calendar",
                    self.config.suspend_days
                ))
            })
    }

    fn fire_suspension(
        profile: &mut strike_profile::Model,
        now: DateTime<Utc>,
        ends: DateTime<Utc>,
    ) {
        let snapshot = std::mem::take(&mut profile.strikes.0);
        profile.suspensions.0.push(Suspension {
            suspension_at: now,
            suspension_strikes: snapshot,
        });
        profile.suspension_ends = Some(ends.into());
        profile.updated_at = now.into();
    }

    /// Amend the first current strike recorded for `report_tk`.
    ///
    /// Returns `false` without touching the profile when there is nothing to
    /// amend or the strike was already amended. Suspension is not
    /// re-evaluated.
    pub fn amend(
        &self,
        profile: &mut strike_profile::Model,
        report_tk: &str,
        amend_reason: &str,
        now: DateTime<Utc>,
    ) -> bool {
        let user_id = profile.user_id.clone();
        let Some(strike) = profile.strikes.find_mut(report_tk) else {
            tracing::warn!(
                user_id = %user_id,
                report_tk = report_tk,
                "Report ticket not found in current strikes"
            );
            return false;
        };
        if strike.amended {
            tracing::warn!(
                user_id = %user_id,
                report_tk = report_tk,
                "Strike already amended"
            );
            return false;
        }

        // No floor at zero.
        strike.strike_value -= self.config.amend_credit;
        strike.amended = true;
        strike.amended_reason = amend_reason.to_string();
        strike.updated_at = now;
        profile.updated_at = now.into();
        true
    }

    /// End of the suspension `profile` is serving at `now`, if any.
    #[must_use]
    pub fn active_suspension_end(
        profile: &strike_profile::Model,
        now: DateTime<Utc>,
    ) -> Option<DateTimeWithTimeZone> {
        if profile.suspensions.is_empty() {
            return None;
        }
        profile.suspension_ends.filter(|ends| *ends > now)
    }

    // ========== Operations ==========

    /// Get a user's strike profile.
    pub async fn get_profile(&self, user_id: &str) -> AppResult<Option<strike_profile::Model>> {
        self.strike_repo.find_by_user(user_id).await
    }

    /// Return the user's profile, creating an empty one on first use.
    ///
    /// Fails with [`AppError::Conflict`] when another request created the
    /// profile between the lookup and the insert.
    pub async fn ensure_profile(&self, user_id: &str) -> AppResult<strike_profile::Model> {
        if let Some(profile) = self.strike_repo.find_by_user(user_id).await? {
            return Ok(profile);
        }

        let profile = self
            .strike_repo
            .create(strike_profile::Model::empty(user_id, Utc::now()))
            .await?;
        tracing::info!(user_id = user_id, "Strike profile created");
        Ok(profile)
    }

    /// Record a strike against a user.
    ///
    /// Returns `Ok(true)` when this strike triggered a suspension and
    /// `Ok(false)` when it was recorded without one. An unknown
    /// `strike_type` is rejected with [`AppError::Validation`] before
    /// anything is written; storage failures are returned as errors, never
    /// as `false`.
    pub async fn add_strike(
        &self,
        user_id: &str,
        report_tk: &str,
        strike_type: &str,
        strike_reason: &str,
    ) -> AppResult<bool> {
        let severity: StrikeSeverity = strike_type.parse()?;

        match self.ensure_profile(user_id).await {
            Ok(_) => {}
            // Lost the creation race; the locked read below picks up the winner's row.
            Err(AppError::Conflict(_)) => {
                tracing::debug!(user_id = user_id, "Strike profile created concurrently");
            }
            Err(e) => return Err(e),
        }

        let now = Utc::now();
        let (profile, recorded) = self
            .strike_repo
            .modify(user_id, |profile| {
                self.record_strike(profile, report_tk, severity, strike_reason, now)
            })
            .await?
            .ok_or_else(|| {
                AppError::Database(format!("Strike profile for {user_id} could not be read"))
            })?;
        let suspended = recorded?;

        tracing::info!(
            user_id = user_id,
            report_tk = report_tk,
            severity = %severity,
            suspended = suspended,
            "Strike added"
        );
        if suspended {
            tracing::info!(
                user_id = user_id,
                suspensions = profile.suspensions.len(),
                suspension_at = ?profile.suspensions.last().map(|s| s.suspension_at),
                suspension_ends = ?profile.suspension_ends,
                "Suspension fired"
            );
        }

        Ok(suspended)
    }

    /// Amend a user's current strike for `report_tk`.
    ///
    /// Returns `false` when the profile is missing, has no current strikes,
    /// has no strike for `report_tk`, or that strike was already amended.
    pub async fn amend_strike(
        &self,
        user_id: &str,
        report_tk: &str,
        amend_reason: &str,
    ) -> AppResult<bool> {
        let now = Utc::now();
        let amended = self
            .strike_repo
            .modify(user_id, |profile| {
                !profile.strikes.is_empty() && self.amend(profile, report_tk, amend_reason, now)
            })
            .await?
            .is_some_and(|(_, amended)| amended);

        if amended {
            tracing::info!(user_id = user_id, report_tk = report_tk, "Strike amended");
        }
        Ok(amended)
    }

    /// When the user's current suspension lifts, or `None` if the user is not
    /// suspended right now.
    pub async fn check_suspension(&self, user_id: &str) -> AppResult<Option<DateTimeWithTimeZone>> {
        let Some(profile) = self.strike_repo.find_by_user(user_id).await? else {
            return Ok(None);
        };
        Ok(Self::active_suspension_end(&profile, Utc::now()))
    }

    /// Whether the user is inside an active suspension window.
    pub async fn is_suspended(&self, user_id: &str) -> AppResult<bool> {
        Ok(self.check_suspension(user_id).await?.is_some())
    }

    /// Every user currently inside an active suspension window.
    pub async fn list_suspended_now(&self) -> AppResult<HashSet<String>> {
        let users = self.strike_repo.find_suspended_at(Utc::now()).await?;
        tracing::debug!(count = users.len(), "Listed suspended users");
        Ok(users.into_iter().collect())
    }
}
