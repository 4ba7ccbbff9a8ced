use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    Config, DataSettings, KpiSettings, LoggingSettings, ReportSettings, RiskSettings,
    RiskSortOrder, ServerSettings,
};

/// The file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "bearcart.toml";

/// Prefix of the environment variables that override file settings,
/// e.g. `BEARCART__DATA__PATH` or `BEARCART__RISK__SORT_ORDER`.
pub const ENV_PREFIX: &str = "BEARCART";

/// Loads the application configuration.
///
/// Sources, lowest priority first: built-in defaults, the TOML file, then
/// `BEARCART__*` environment variables. An explicitly given file must exist;
/// the default `bearcart.toml` is optional.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}
