//! # Service Configuration
//!
//! Loaded once at startup from `TALLY_*` environment variables, read-only
//! afterwards.
//!
//! ## Variables
//! ```text
//! TALLY_DATABASE_PATH       ./tally.db
//! TALLY_MAX_CONNECTIONS     5
//! TALLY_STOCK_POLICY        allow_negative | reject_negative
//! TALLY_HISTORY_LIMIT       100      (ledger history page size)
//! TALLY_RECENT_SALES        5        (dashboard recent sales)
//! TALLY_MAX_ITEM_QUANTITY   999      (per basket line, decimal units)
//! ```

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;
use tally_core::{BasketLimits, Quantity, StockPolicy, MAX_BASKET_LINES, MAX_LINE_UNITS};

/// Service configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    pub database_path: PathBuf,

    pub max_connections: u32,

    /// Whether a sale may take stock below zero.
    pub stock_policy: StockPolicy,

    /// Default and maximum page size for ledger history.
    pub history_limit: u32,

    /// Number of sales shown on the dashboard.
    pub recent_sales: u32,

    /// Largest quantity accepted on a single basket line.
    pub max_item_quantity: Quantity,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            database_path: PathBuf::from("./tally.db"),
            max_connections: 5,
            stock_policy: StockPolicy::default(),
            history_limit: 100,
            recent_sales: 5,
            max_item_quantity: Quantity::from_units(MAX_LINE_UNITS),
        }
    }
}

impl ServiceConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ServiceConfig::default();

        if let Some(path) = lookup("TALLY_DATABASE_PATH") {
            if path.trim().is_empty() {
                return Err(ConfigError::invalid("TALLY_DATABASE_PATH", path));
            }
            config.database_path = PathBuf::from(path);
        }

        if let Some(value) = lookup("TALLY_MAX_CONNECTIONS") {
            config.max_connections = parse_positive("TALLY_MAX_CONNECTIONS", &value)?;
        }

        if let Some(value) = lookup("TALLY_STOCK_POLICY") {
            config.stock_policy = StockPolicy::from_str(value.trim())
                .map_err(|_| ConfigError::invalid("TALLY_STOCK_POLICY", value))?;
        }

        if let Some(value) = lookup("TALLY_HISTORY_LIMIT") {
            config.history_limit = parse_positive("TALLY_HISTORY_LIMIT", &value)?;
        }

        if let Some(value) = lookup("TALLY_RECENT_SALES") {
            config.recent_sales = parse_positive("TALLY_RECENT_SALES", &value)?;
        }

        if let Some(value) = lookup("TALLY_MAX_ITEM_QUANTITY") {
            config.max_item_quantity = value
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Quantity::from_decimal)
                .filter(|q| q.is_positive())
                .ok_or_else(|| ConfigError::invalid("TALLY_MAX_ITEM_QUANTITY", value))?;
        }

        Ok(config)
    }

    /// Basket limits derived from this configuration.
    pub fn basket_limits(&self) -> BasketLimits {
        BasketLimits {
            max_lines: MAX_BASKET_LINES,
            max_line_quantity: self.max_item_quantity,
        }
    }
}

fn parse_positive(key: &'static str, value: &str) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::invalid(key, value)),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

impl ConfigError {
    fn invalid(key: &'static str, value: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key,
            value: value.into(),
        }
    }
}
