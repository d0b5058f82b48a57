//! Common utilities and shared types for the support desk.
//!
//! This crate provides foundational components used across all support desk crates:
//!
//! - **Configuration**: Application settings via [`Config`], including the
//!   strike accrual policy ([`StrikeConfig`])
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **Logging**: `tracing` subscriber setup via [`init_tracing`]
//! - **ID Generation**: UUID identifiers via [`IdGenerator`]
//!
//! # Example
//!
//! ```no_run
//! use support_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let report_id = id_gen.generate_uuid_v4();
//!     println!("Suspensions last {} days, report {report_id}", config.strikes.suspend_days);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod logging;

pub use config::{Config, SeverityTable, StrikeConfig};
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use logging::init_tracing;
