//! Business logic services.

#![allow(missing_docs)]

pub mod mobile_token;
pub mod moderation;
pub mod notifier;
pub mod strike;

pub use mobile_token::MobileTokenService;
pub use moderation::{
    AddStrikeInput, AmendStrikeInput, CreateReportInput, ModerationService, StrikeOutcome,
};
pub use notifier::{NoOpNotifier, Notifier, NotifierService};
pub use strike::{StrikeLedger, StrikeSeverity};
