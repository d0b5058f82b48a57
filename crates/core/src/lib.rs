//! Core business logic for the support desk.
//!
//! The centre of the crate is the [`StrikeLedger`]: it accrues weighted
//! strikes per user, amends them, and fires time-boxed suspensions once the
//! accrued weight crosses the configured threshold.

pub mod services;

pub use services::*;
