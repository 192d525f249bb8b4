//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod allocator;
pub mod logging;
pub mod store;

use serde::{Deserialize, Serialize};

use self::allocator::{CounterConfig, RoomIdConfig, SequentialIdConfig};
use self::logging::LoggingConfig;
use self::store::StoreConfig;

use crate::error::AppError;

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "IDPOOL";

/// Separator between prefix, section and key, as in
/// `IDPOOL__ROOM_IDS__MAX_VALUE`.
pub const ENV_SEPARATOR: &str = "__";

/// Environment variable source for `IDPOOL__SECTION__KEY` overrides.
fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
}

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Coordination store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Defaults for random room id pools.
    #[serde(default)]
    pub room_ids: RoomIdConfig,
    /// Defaults for sequential id pools.
    #[serde(default)]
    pub sequential_ids: SequentialIdConfig,
    /// Defaults for plain atomic counters.
    #[serde(default)]
    pub counter: CounterConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and `IDPOOL__SECTION__KEY` environment variables.
    pub fn load(env: &str) -> Result<Self, AppError> {
        tracing::debug!(env, "Loading configuration");
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(env_source())
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from an in-memory TOML document.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject ranges that no allocator could serve.
    pub fn validate(&self) -> Result<(), AppError> {
        self.room_ids.range()?;
        self.sequential_ids.range()?;
        if self.counter.initial_value < 0 {
            return Err(AppError::configuration(format!(
                "counter.initial_value must be non-negative, got {}",
                self.counter.initial_value
            )));
        }
        Ok(())
    }
}
