//! User notification sink.
//!
//! Core services report "strike added" and "suspension started" events
//! through this trait; delivery (push transport) is provided elsewhere.

use async_trait::async_trait;
use std::sync::Arc;
use support_common::AppResult;

/// Trait for delivering a short message to a user.
///
/// Delivery is fire-and-forget from the caller's point of view: a failed
/// notification never rolls back the action it reports.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send `title` / `body` to `user_id`.
    async fn notify(&self, user_id: &str, title: &str, body: &str) -> AppResult<()>;
}

/// A no-op implementation of Notifier for testing or when notifications are disabled.
#[derive(Clone, Default)]
pub struct NoOpNotifier;

#[async_trait]
impl Notifier for NoOpNotifier {
    async fn notify(&self, _user_id: &str, _title: &str, _body: &str) -> AppResult<()> {
        Ok(())
    }
}

/// Wrapper for boxed Notifier trait object.
pub type NotifierService = Arc<dyn Notifier>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_notifier_accepts_everything() {
        let notifier: NotifierService = Arc::new(NoOpNotifier);
        notifier
            .notify("user1", "Account Suspended", "Your account has been suspended for some time")
            .await
            .unwrap();
    }
}
