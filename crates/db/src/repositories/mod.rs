//! Database repositories.

mod mobile_token;
mod report;
mod strike;

pub use mobile_token::MobileTokenRepository;
pub use report::ReportRepository;
pub use strike::StrikeRepository;
