use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so the tool runs without a config file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub data: DataSettings,
    pub kpi: KpiSettings,
    pub risk: RiskSettings,
    pub report: ReportSettings,
    pub logging: LoggingSettings,
    pub server: ServerSettings,
}

/// Where the transaction dataset lives.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DataSettings {
    /// Path to a `.csv` or `.parquet` file.
    pub path: PathBuf,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/bearcart_orders.csv"),
        }
    }
}

/// Settings for the KPI calculator.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KpiSettings {
    /// Profit figure shown next to the computed KPIs.
    ///
    /// This number is supplied by finance and is NOT derived from the dataset.
    pub reported_profit_usd: Decimal,
}

impl Default for KpiSettings {
    fn default() -> Self {
        Self {
            reported_profit_usd: dec!(1222335.29),
        }
    }
}

/// Row order of the refund risk summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum RiskSortOrder {
    /// Catalog order: product id ascending.
    #[default]
    ProductId,
    /// Risk-priority order: refund rate descending, ties by product id.
    RefundRate,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RiskSettings {
    pub sort_order: RiskSortOrder,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportSettings {
    pub title: String,
    pub caption: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            title: "BearCart Business Analytics Dashboard".to_string(),
            caption: "Strategic Operations & Financial Performance Overview".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is not set (e.g. "info", "analytics=debug").
    pub level: String,
    /// When set, logs go to a daily rolling file in this directory instead of stderr.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl ServerSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    /// Rejects settings that would only fail later, deep inside a command.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data.path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "data.path must not be empty".to_string(),
            ));
        }
        if self.kpi.reported_profit_usd.is_sign_negative() {
            return Err(ConfigError::ValidationError(format!(
                "kpi.reported_profit_usd must not be negative, got {}",
                self.kpi.reported_profit_usd
            )));
        }
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be between 1 and 65535".to_string(),
            ));
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "logging.level must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
