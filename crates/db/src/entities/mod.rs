//! Database entities.

pub mod mobile_token;
pub mod report;
pub mod strike_profile;

pub use mobile_token::Entity as MobileToken;
pub use report::Entity as Report;
pub use strike_profile::Entity as StrikeProfile;
