//! Configuration for the Consult client.
//!
//! Uses `figment` for layered configuration: defaults -> user config file ->
//! working-directory `consult.toml` -> `CONSULT_`-prefixed environment
//! variables. The API base URL is an explicit value injected into the ask
//! client at construction; request logic never reads the environment.

use crate::error::ConfigError;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default backend during local development.
const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Reference year for the recency filters. Kept configurable rather than
/// hardcoded; flagged for product confirmation.
const DEFAULT_REFERENCE_YEAR: i32 = 2024;

/// Top-level configuration for the Consult client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultConfig {
    /// Base URL of the ask API. A trailing slash is stripped by the client.
    pub api_base_url: String,
    /// Reference year the recency filters compare publication years against.
    pub reference_year: i32,
}

impl Default for ConsultConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            reference_year: DEFAULT_REFERENCE_YEAR,
        }
    }
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with `CONSULT_`)
/// 2. Working-directory config (`consult.toml`)
/// 3. User config (`~/.config/consult/config.toml`)
/// 4. Built-in defaults
pub fn load_config(working_dir: Option<&Path>) -> Result<ConsultConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(ConsultConfig::default()));

    if let Some(dirs) = directories::ProjectDirs::from("", "", "consult") {
        let user_config = dirs.config_dir().join("config.toml");
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(dir) = working_dir {
        let local_config = dir.join("consult.toml");
        if local_config.exists() {
            figment = figment.merge(Toml::file(&local_config));
        }
    }

    figment = figment.merge(Env::prefixed("CONSULT_"));

    figment.extract().map_err(|e| ConfigError::ParseError {
        message: e.to_string(),
    })
}
