use anyhow::Result;
use config::Config;
use serde::Deserialize;
use url::Url;

use crate::constants::{
    DEFAULT_MAX_CHILD_RESOURCE_COUNT, DEFAULT_MAX_COLLECTION_DEPTH, DEFAULT_UNIT_URL,
};
use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub unit: UnitConfig,
    pub limits: LimitsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnitConfig {
    /// Base URL every Cell URL (and so every role URL) is derived from.
    pub url: String,
}

impl UnitConfig {
    /// ## Summary
    /// Parses the unit URL, normalising it to end with a slash so that cell
    /// names join as child segments.
    ///
    /// ## Errors
    /// Returns `ConfigError` if the URL does not parse or cannot be a base.
    pub fn base_url(&self) -> CoreResult<Url> {
        let raw = if self.url.ends_with('/') {
            self.url.clone()
        } else {
            format!("{}/", self.url)
        };
        let url = Url::parse(&raw)
            .map_err(|e| CoreError::ConfigError(format!("invalid unit url '{raw}': {e}")))?;
        if url.cannot_be_a_base() {
            return Err(CoreError::ConfigError(format!(
                "unit url '{raw}' cannot be a base"
            )));
        }
        Ok(url)
    }
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_UNIT_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LimitsConfig {
    /// Deepest allowed collection level below a Box (a collection directly in
    /// the Box is level 1).
    pub max_collection_depth: usize,
    /// Most files plus collections a single parent may hold.
    pub max_child_resource_count: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_collection_depth: DEFAULT_MAX_COLLECTION_DEPTH,
            max_child_resource_count: DEFAULT_MAX_CHILD_RESOURCE_COUNT,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "debug".to_string(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            unit: UnitConfig::default(),
            limits: LimitsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Settings {
    /// ## Summary
    /// Loads configuration from `.env` file and environment variables into a `Settings`.
    /// Environment variables take precedence over `.env` file values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        let max_depth = i64::try_from(DEFAULT_MAX_COLLECTION_DEPTH)?;
        let max_children = i64::try_from(DEFAULT_MAX_CHILD_RESOURCE_COUNT)?;

        Ok(Config::builder()
            .set_default("unit.url", DEFAULT_UNIT_URL)?
            .set_default("limits.max_collection_depth", max_depth)?
            .set_default("limits.max_child_resource_count", max_children)?
            .set_default("logging.level", "debug")?
            // Env file
            .add_source(
                config::Environment::default()
                    .convert_case(config::Case::Snake)
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            .build()?
            .try_deserialize::<Settings>()?)
    }

    /// ## Summary
    /// Checks values that deserialize fine but make no sense to the engine.
    ///
    /// ## Errors
    /// Returns `ConfigError` for a zero limit or an unusable unit URL.
    pub fn validate(&self) -> CoreResult<()> {
        if self.limits.max_collection_depth == 0 {
            return Err(CoreError::ConfigError(
                "limits.max_collection_depth must be at least 1".to_string(),
            ));
        }
        if self.limits.max_child_resource_count == 0 {
            return Err(CoreError::ConfigError(
                "limits.max_child_resource_count must be at least 1".to_string(),
            ));
        }
        self.unit.base_url().map(|_| ())
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    settings.validate()?;
    tracing::debug!(
        max_collection_depth = settings.limits.max_collection_depth,
        max_child_resource_count = settings.limits.max_child_resource_count,
        "Configuration validated"
    );
    Ok(settings)
}
