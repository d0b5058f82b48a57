//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Strike accrual policy.
    #[serde(default)]
    pub strikes: StrikeConfig,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Weight assigned to each strike severity.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SeverityTable {
    /// Weight of a HIGH strike.
    #[serde(default = "default_high")]
    pub high: f64,
    /// Weight of a MEDIUM strike.
    #[serde(default = "default_medium")]
    pub medium: f64,
    /// Weight of a LOW strike.
    #[serde(default = "default_low")]
    pub low: f64,
}

impl Default for SeverityTable {
    fn default() -> Self {
        Self {
            high: default_high(),
            medium: default_medium(),
            low: default_low(),
        }
    }
}

/// Strike accrual and suspension policy.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct StrikeConfig {
    /// Severity weights.
    #[serde(default)]
    pub severity: SeverityTable,
    /// A suspension fires once the strike total is strictly above this value.
    #[serde(default = "default_max_strikes")]
    pub max_strikes: f64,
    /// Amount subtracted from a strike when it is amended.
    #[serde(default = "default_amend_credit")]
    pub amend_credit: f64,
    /// Length of a suspension in days.
    #[serde(default = "default_suspend_days")]
    pub suspend_days: u32,
}

impl Default for StrikeConfig {
    fn default() -> Self {
        Self {
            severity: SeverityTable::default(),
            max_strikes: default_max_strikes(),
            amend_credit: default_amend_credit(),
            suspend_days: default_suspend_days(),
        }
    }
}

impl StrikeConfig {
    /// Check that the policy is usable.
    ///
    /// Severities and the threshold must be positive, the amendment credit
    /// must not be negative (an amendment may never raise a strike) and a
    /// suspension must last between one day and [`MAX_SUSPEND_DAYS`].
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let weights = [
            ("high", self.severity.high),
            ("medium", self.severity.medium),
            ("low", self.severity.low),
            ("max_strikes", self.max_strikes),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value <= 0.0 {
                return Err(config::ConfigError::Message(format!(
                    "strikes.{name} must be a positive number, got {value}"
                )));
            }
        }
        if !self.amend_credit.is_finite() || self.amend_credit < 0.0 {
            return Err(config::ConfigError::Message(format!(
                "strikes.amend_credit must not be negative, got {}",
                self.amend_credit
            )));
        }
        if !(1..=MAX_SUSPEND_DAYS).contains(&self.suspend_days) {
            return Err(config::ConfigError::Message(format!(
                "strikes.suspend_days must be between 1 and {MAX_SUSPEND_DAYS}, got {}",
                self.suspend_days
            )));
        }
        Ok(())
    }
}

/// Longest suspension a configuration may ask for (about a century).
pub const MAX_SUSPEND_DAYS: u32 = 36_500;

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_high() -> f64 {
    1.5
}

const fn default_medium() -> f64 {
    1.0
}

const fn default_low() -> f64 {
    0.5
}

const fn default_max_strikes() -> f64 {
    3.0
}

const fn default_amend_credit() -> f64 {
    0.5
}

const fn default_suspend_days() -> u32 {
    90
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` in the working directory (if present)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `SUPPORT_ENV`)
    /// 4. Environment variables with `SUPPORT_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let env = std::env::var("SUPPORT_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("SUPPORT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::finish(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("SUPPORT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::finish(config)
    }

    fn finish(raw: config::Config) -> Result<Self, config::ConfigError> {
        let config: Self = raw.try_deserialize()?;
        config.strikes.validate()?;
        tracing::debug!(
            max_strikes = config.strikes.max_strikes,
            suspend_days = config.strikes.suspend_days,
            "Configuration loaded"
        );
        Ok(config)
    }
}
